use imagerelay::logger::{self, LoggerConfig};
use imagerelay::{server, Config, Pipeline};

#[actix_web::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // The logger reads its settings from the environment, so .env goes first.
    let dotenv_loaded = dotenv::dotenv().is_ok();

    logger::init(LoggerConfig::from_env())?;

    if dotenv_loaded {
        log::info!("✅ .env file loaded successfully");
    } else {
        log::warn!("⚠️  No .env file found, using system environment variables");
    }

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            log::error!("❌ {}", e);
            return Err(e.into());
        }
    };
    logger::log_config_info(&config);

    let pipeline = Pipeline::from_config(&config)?;

    logger::log_startup_info(
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        config.port,
    );
    server::run(&config, pipeline).await?;

    Ok(())
}
