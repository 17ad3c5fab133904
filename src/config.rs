use std::{env, str::FromStr};

use crate::error::{RelayError, Result};

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_IDEOGRAM_BASE_URL: &str = "https://api.ideogram.ai/v1";
pub const DEFAULT_CLOUDINARY_BASE_URL: &str = "https://api.cloudinary.com";

#[derive(Debug, Clone)]
pub struct IdeogramConfig {
    pub api_key: Option<String>,
    pub base_url: String,
}

/// Digest used to sign uploads. Must match the account's signing setting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SignatureAlgorithm {
    #[default]
    Sha1,
    Sha256,
}

impl SignatureAlgorithm {
    pub fn as_str(&self) -> &'static str {
        match self {
            SignatureAlgorithm::Sha1 => "sha1",
            SignatureAlgorithm::Sha256 => "sha256",
        }
    }
}

impl FromStr for SignatureAlgorithm {
    type Err = RelayError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sha1" | "sha-1" => Ok(SignatureAlgorithm::Sha1),
            "sha256" | "sha-256" => Ok(SignatureAlgorithm::Sha256),
            other => Err(RelayError::ConfigError(format!(
                "unsupported CLOUDINARY_SIGNATURE_ALGORITHM '{}' (expected sha1 or sha256)",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CloudinaryConfig {
    pub cloud_name: Option<String>,
    pub api_key: Option<String>,
    pub api_secret: Option<String>,
    pub signature_algorithm: SignatureAlgorithm,
    pub base_url: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub ideogram: IdeogramConfig,
    pub cloudinary: CloudinaryConfig,
}

impl Default for IdeogramConfig {
    fn default() -> Self {
        IdeogramConfig {
            api_key: None,
            base_url: DEFAULT_IDEOGRAM_BASE_URL.to_string(),
        }
    }
}

impl IdeogramConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let api_key = env::var("IDEOGRAM_API_KEY").ok();
        let base_url = env::var("IDEOGRAM_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_IDEOGRAM_BASE_URL.to_string());

        IdeogramConfig { api_key, base_url }
    }

    pub fn with_credentials(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

impl Default for CloudinaryConfig {
    fn default() -> Self {
        CloudinaryConfig {
            cloud_name: None,
            api_key: None,
            api_secret: None,
            signature_algorithm: SignatureAlgorithm::default(),
            base_url: DEFAULT_CLOUDINARY_BASE_URL.to_string(),
        }
    }
}

impl CloudinaryConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Result<Self> {
        let cloud_name = env::var("CLOUDINARY_CLOUD_NAME").ok();
        let api_key = env::var("CLOUDINARY_API_KEY").ok();
        let api_secret = env::var("CLOUDINARY_API_SECRET").ok();
        let signature_algorithm = match env::var("CLOUDINARY_SIGNATURE_ALGORITHM") {
            Ok(value) if !value.trim().is_empty() => value.parse()?,
            _ => SignatureAlgorithm::default(),
        };
        let base_url = env::var("CLOUDINARY_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_CLOUDINARY_BASE_URL.to_string());

        Ok(CloudinaryConfig {
            cloud_name,
            api_key,
            api_secret,
            signature_algorithm,
            base_url,
        })
    }

    pub fn with_credentials(
        mut self,
        cloud_name: impl Into<String>,
        api_key: impl Into<String>,
        api_secret: impl Into<String>,
    ) -> Self {
        self.cloud_name = Some(cloud_name.into());
        self.api_key = Some(api_key.into());
        self.api_secret = Some(api_secret.into());
        self
    }

    pub fn with_signature_algorithm(mut self, algorithm: SignatureAlgorithm) -> Self {
        self.signature_algorithm = algorithm;
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            port: DEFAULT_PORT,
            ideogram: IdeogramConfig::default(),
            cloudinary: CloudinaryConfig::default(),
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads every setting from the process environment and fails if a
    /// required credential is absent.
    pub fn from_env() -> Result<Self> {
        let port = env::var("PORT")
            .ok()
            .and_then(|port| port.parse().ok())
            .unwrap_or(DEFAULT_PORT);

        let config = Config {
            port,
            ideogram: IdeogramConfig::from_env(),
            cloudinary: CloudinaryConfig::from_env()?,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn with_ideogram(mut self, config: IdeogramConfig) -> Self {
        self.ideogram = config;
        self
    }

    pub fn with_cloudinary(mut self, config: CloudinaryConfig) -> Self {
        self.cloudinary = config;
        self
    }

    /// Presence check only; values are not verified against the services.
    pub fn validate(&self) -> Result<()> {
        let required = [
            ("CLOUDINARY_CLOUD_NAME", &self.cloudinary.cloud_name),
            ("CLOUDINARY_API_KEY", &self.cloudinary.api_key),
            ("CLOUDINARY_API_SECRET", &self.cloudinary.api_secret),
            ("IDEOGRAM_API_KEY", &self.ideogram.api_key),
        ];

        let missing: Vec<&str> = required
            .iter()
            .filter(|(_, value)| value.as_deref().map_or(true, str::is_empty))
            .map(|(name, _)| *name)
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(RelayError::ConfigError(format!(
                "missing required environment variables: {}",
                missing.join(", ")
            )))
        }
    }
}
