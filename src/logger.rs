use chrono::{DateTime, Utc};
use colored::*;
use log::{Level, LevelFilter, Metadata, Record};
use once_cell::sync::Lazy;
use serde::Serialize;
use std::env;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::sync::Mutex;
use std::time::{Duration, Instant};
use uuid::Uuid;

use crate::config::Config;

static RELAY_LOGGER: Lazy<RelayLogger> = Lazy::new(RelayLogger::new);

/// Module prefix of this crate; everything else counts as a dependency.
const CRATE_TARGET: &str = "imagerelay";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// Installs the global logger. Fails if a logger is already set.
pub fn init(config: LoggerConfig) -> Result<(), String> {
    let max_level = config.min_level;
    RELAY_LOGGER.update_config(config);

    log::set_logger(&*RELAY_LOGGER).map_err(|e| format!("Failed to set logger: {:?}", e))?;
    log::set_max_level(max_level);
    Ok(())
}

fn badge(level: Level) -> (&'static str, Color) {
    match level {
        Level::Trace => ("🔍", Color::Cyan),
        Level::Debug => ("🐛", Color::Blue),
        Level::Info => ("💡", Color::Green),
        Level::Warn => ("⚠️", Color::Yellow),
        Level::Error => ("❌", Color::Red),
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LogEntry {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub level: &'static str,
    pub module: String,
    pub message: String,
    #[serde(skip)]
    severity: Level,
    #[serde(skip)]
    location: String,
}

impl LogEntry {
    fn from_record(record: &Record) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            level: record.level().as_str(),
            module: record.module_path().unwrap_or(record.target()).to_string(),
            message: record.args().to_string(),
            severity: record.level(),
            location: format!(
                "{}:{}",
                record.file().unwrap_or("unknown"),
                record.line().unwrap_or(0)
            ),
        }
    }

    /// One console line. `colored` also switches the level emoji on.
    fn render(&self, colored: bool, show_location: bool) -> String {
        let timestamp = self.timestamp.format(TIMESTAMP_FORMAT).to_string();
        let location = if show_location {
            format!(" ({})", self.location)
        } else {
            String::new()
        };

        if !colored {
            return format!(
                "{} [{}] {}: {}{}",
                timestamp, self.level, self.module, self.message, location
            );
        }

        let (emoji, color) = badge(self.severity);
        format!(
            "{} [{}] {}: {}{}",
            timestamp.bright_black(),
            format!("{} {}", emoji, self.level).color(color).bold(),
            self.module.bright_blue(),
            self.message.white().bold(),
            location.bright_black()
        )
    }
}

#[derive(Debug, Clone)]
pub struct LoggerConfig {
    pub min_level: LevelFilter,
    /// Threshold for records coming from other crates (actix, reqwest, ...).
    pub dependency_level: LevelFilter,
    pub colored: bool,
    pub show_location: bool,
    pub json: bool,
    pub log_file: Option<String>,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            min_level: LevelFilter::Info,
            dependency_level: LevelFilter::Info,
            colored: true,
            show_location: false,
            json: false,
            log_file: None,
        }
    }
}

impl LoggerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_level(mut self, level: LevelFilter) -> Self {
        self.min_level = level;
        self
    }

    pub fn with_colors(mut self, enabled: bool) -> Self {
        self.colored = enabled;
        self
    }

    pub fn with_file_output(mut self, path: &str) -> Self {
        self.log_file = Some(path.to_string());
        self
    }

    pub fn production() -> Self {
        Self {
            colored: false,
            json: true,
            ..Default::default()
        }
    }

    pub fn development() -> Self {
        Self {
            min_level: LevelFilter::Debug,
            show_location: true,
            ..Default::default()
        }
    }

    /// `LOG_FORMAT=json` picks the production preset, anything else the
    /// development one at info level. `LOG_LEVEL` and `LOG_FILE` override on top.
    pub fn from_env() -> Self {
        let mut config = match env::var("LOG_FORMAT").ok().as_deref() {
            Some("json") => Self::production(),
            _ => Self::development().with_level(LevelFilter::Info),
        };

        if let Some(level) = env::var("LOG_LEVEL").ok().and_then(|l| l.trim().parse().ok()) {
            config.min_level = level;
        }
        if let Ok(path) = env::var("LOG_FILE") {
            if !path.is_empty() {
                config = config.with_file_output(&path);
            }
        }
        config
    }

    fn threshold(&self, target: &str) -> LevelFilter {
        if target.starts_with(CRATE_TARGET) {
            self.min_level
        } else {
            self.min_level.min(self.dependency_level)
        }
    }

    fn line(&self, entry: &LogEntry, colored: bool) -> String {
        if self.json {
            serde_json::to_string(entry).unwrap_or_default()
        } else {
            entry.render(colored, self.show_location)
        }
    }
}

pub struct RelayLogger {
    config: Mutex<LoggerConfig>,
    log_file: Mutex<Option<File>>,
}

impl RelayLogger {
    pub fn new() -> Self {
        Self {
            config: Mutex::new(LoggerConfig::default()),
            log_file: Mutex::new(None),
        }
    }

    pub fn update_config(&self, new_config: LoggerConfig) {
        let file = new_config.log_file.as_deref().and_then(|path| {
            OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|e| eprintln!("Failed to open log file {}: {}", path, e))
                .ok()
        });

        if let Ok(mut log_file) = self.log_file.lock() {
            *log_file = file;
        }
        if let Ok(mut config) = self.config.lock() {
            *config = new_config;
        }
    }
}

impl Default for RelayLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl log::Log for RelayLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        match self.config.lock() {
            Ok(config) => metadata.level() <= config.threshold(metadata.target()),
            Err(_) => true,
        }
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let entry = LogEntry::from_record(record);

        if let Ok(config) = self.config.lock() {
            println!("{}", config.line(&entry, config.colored));

            if let Ok(mut file) = self.log_file.lock() {
                if let Some(file) = file.as_mut() {
                    let _ = writeln!(file, "{}", config.line(&entry, false));
                }
            }
        }
    }

    fn flush(&self) {
        let _ = io::stdout().flush();
        if let Ok(mut file) = self.log_file.lock() {
            if let Some(file) = file.as_mut() {
                let _ = file.flush();
            }
        }
    }
}

/// Logs how long a scope took when dropped.
pub struct Timer {
    start: Instant,
    name: String,
}

impl Timer {
    pub fn new(name: &str) -> Self {
        log::debug!("⏱️  Starting {}", name);
        Self {
            start: Instant::now(),
            name: name.to_string(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        log::info!(
            "⏱️  {} finished in {}ms",
            self.name,
            self.elapsed().as_millis()
        );
    }
}

pub fn timer(name: &str) -> Timer {
    Timer::new(name)
}

pub fn log_startup_info(app_name: &str, version: &str, port: u16) {
    log::info!("🚀 Starting {} v{}", app_name, version);
    log::info!("🌐 Listening on http://0.0.0.0:{}", port);
}

/// Never prints secrets, only whether they are set.
pub fn log_config_info(config: &Config) {
    let set = |value: &Option<String>| if value.is_some() { "✅" } else { "❌" };

    log::info!("⚙️  Configuration loaded:");
    log::info!("   Port: {}", config.port);
    log::info!("   Generation service: {}", config.ideogram.base_url);
    log::info!("   Generation API key: {}", set(&config.ideogram.api_key));
    log::info!(
        "   Media store: {} (cloud: {})",
        config.cloudinary.base_url,
        config.cloudinary.cloud_name.as_deref().unwrap_or("-")
    );
    log::info!(
        "   Media store credentials: {}",
        set(&config.cloudinary.api_secret)
    );
    log::info!(
        "   Media store signing: {}",
        config.cloudinary.signature_algorithm.as_str()
    );
}
