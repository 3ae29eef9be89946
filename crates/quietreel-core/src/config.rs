//! Configuration module
//!
//! Configuration is read from the environment (and an optional `.env` file) once at
//! startup. Every setting has a default so the service runs with no configuration at all.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

const SERVER_PORT: u16 = 8080;
const MAX_UPLOAD_SIZE_MB: u64 = 100;
const TRANSCODE_TIMEOUT_SECS: u64 = 600;
const MAX_CONCURRENT_TRANSCODES: usize = 2;
const STAGING_SUBDIR: &str = "video-processor";
const DEFAULT_VIDEO_CODEC: &str = "libx264";

/// Base configuration for the HTTP server
#[derive(Clone, Debug)]
pub struct BaseConfig {
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub environment: String,
    /// Prebuilt frontend bundle served for every non-API path
    pub static_dir: Option<PathBuf>,
    pub ping_message: String,
    /// Emit logs as JSON lines instead of human-readable text
    pub log_json: bool,
}

/// Media processor configuration
#[derive(Clone, Debug)]
pub struct MediaProcessorConfig {
    pub base: BaseConfig,
    pub staging_dir: PathBuf,
    pub max_upload_size_bytes: u64,
    pub ffmpeg_path: String,
    pub video_codec: String,
    pub transcode_timeout_secs: u64,
    pub max_concurrent_transcodes: usize,
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config(pub Box<MediaProcessorConfig>);

impl Config {
    fn as_media(&self) -> &MediaProcessorConfig {
        &self.0
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        is_production_env(&self.as_media().base.environment)
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        let config = MediaProcessorConfig::from_lookup(|key| env::var(key).ok())?;
        Ok(Config(Box::new(config)))
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        self.as_media().validate()
    }

    pub fn server_port(&self) -> u16 {
        self.as_media().base.server_port
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.as_media().base.cors_origins
    }

    pub fn environment(&self) -> &str {
        &self.as_media().base.environment
    }

    pub fn static_dir(&self) -> Option<&PathBuf> {
        self.as_media().base.static_dir.as_ref()
    }

    pub fn ping_message(&self) -> &str {
        &self.as_media().base.ping_message
    }

    pub fn log_json(&self) -> bool {
        self.as_media().base.log_json
    }

    pub fn staging_dir(&self) -> &PathBuf {
        &self.as_media().staging_dir
    }

    pub fn max_upload_size_bytes(&self) -> u64 {
        self.as_media().max_upload_size_bytes
    }

    pub fn ffmpeg_path(&self) -> &str {
        &self.as_media().ffmpeg_path
    }

    pub fn video_codec(&self) -> &str {
        &self.as_media().video_codec
    }

    pub fn transcode_timeout(&self) -> Duration {
        Duration::from_secs(self.as_media().transcode_timeout_secs)
    }

    pub fn max_concurrent_transcodes(&self) -> usize {
        self.as_media().max_concurrent_transcodes
    }
}

impl MediaProcessorConfig {
    /// Build the configuration from a key lookup (the process environment in production).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = lookup("ENVIRONMENT")
            .or_else(|| lookup("APP_ENV"))
            .unwrap_or_else(|| "development".to_string());

        let cors_origins_str = lookup("CORS_ORIGINS").unwrap_or_else(|| "*".to_string());
        if is_production_env(&environment) && cors_origins_str.trim() == "*" {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }
        let cors_origins: Vec<String> = cors_origins_str
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let server_port = match lookup("SERVER_PORT").or_else(|| lookup("PORT")) {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|e| anyhow::anyhow!("Invalid SERVER_PORT '{}': {}", raw, e))?,
            None => SERVER_PORT,
        };

        let max_upload_size_mb = lookup("MAX_UPLOAD_SIZE_MB")
            .and_then(|s| s.trim().parse::<u64>().ok())
            .unwrap_or(MAX_UPLOAD_SIZE_MB);

        let transcode_timeout_secs = lookup("TRANSCODE_TIMEOUT_SECS")
            .and_then(|s| s.trim().parse::<u64>().ok())
            .unwrap_or(TRANSCODE_TIMEOUT_SECS);

        let max_concurrent_transcodes = lookup("MAX_CONCURRENT_TRANSCODES")
            .and_then(|s| s.trim().parse::<usize>().ok())
            .unwrap_or(MAX_CONCURRENT_TRANSCODES);

        let staging_dir = lookup("STAGING_DIR")
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| env::temp_dir().join(STAGING_SUBDIR));

        let static_dir = lookup("STATIC_DIR")
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from);

        Ok(Self {
            base: BaseConfig {
                server_port,
                cors_origins,
                environment,
                static_dir,
                ping_message: lookup("PING_MESSAGE").unwrap_or_else(|| "pong".to_string()),
                log_json: lookup("LOG_FORMAT")
                    .map(|s| s.trim().eq_ignore_ascii_case("json"))
                    .unwrap_or(false),
            },
            staging_dir,
            max_upload_size_bytes: max_upload_size_mb * 1024 * 1024,
            ffmpeg_path: lookup("FFMPEG_PATH").unwrap_or_else(|| "ffmpeg".to_string()),
            video_codec: lookup("TRANSCODE_VIDEO_CODEC")
                .unwrap_or_else(|| DEFAULT_VIDEO_CODEC.to_string()),
            transcode_timeout_secs,
            max_concurrent_transcodes,
        })
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.max_upload_size_bytes == 0 {
            return Err(anyhow::anyhow!("MAX_UPLOAD_SIZE_MB must be greater than 0"));
        }

        if self.transcode_timeout_secs == 0 {
            return Err(anyhow::anyhow!(
                "TRANSCODE_TIMEOUT_SECS must be greater than 0"
            ));
        }

        if self.max_concurrent_transcodes == 0 {
            return Err(anyhow::anyhow!(
                "MAX_CONCURRENT_TRANSCODES must be at least 1"
            ));
        }

        if self.ffmpeg_path.trim().is_empty() {
            return Err(anyhow::anyhow!("FFMPEG_PATH must not be empty"));
        }

        if !self
            .video_codec
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(anyhow::anyhow!(
                "TRANSCODE_VIDEO_CODEC contains invalid characters: {}",
                self.video_codec
            ));
        }

        if let Some(dir) = &self.base.static_dir {
            if !dir.is_dir() {
                return Err(anyhow::anyhow!(
                    "STATIC_DIR {} is not a directory",
                    dir.display()
                ));
            }
        }

        Ok(())
    }
}

fn is_production_env(environment: &str) -> bool {
    let env = environment.to_lowercase();
    env == "production" || env == "prod"
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn from_pairs(pairs: &[(&str, &str)]) -> Result<MediaProcessorConfig, anyhow::Error> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        MediaProcessorConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn defaults_apply_without_environment() {
        let config = from_pairs(&[]).unwrap();
        assert_eq!(config.base.server_port, 8080);
        assert_eq!(config.max_upload_size_bytes, 100 * 1024 * 1024);
        assert_eq!(config.ffmpeg_path, "ffmpeg");
        assert_eq!(config.video_codec, "libx264");
        assert_eq!(config.transcode_timeout_secs, 600);
        assert_eq!(config.max_concurrent_transcodes, 2);
        assert!(config.staging_dir.ends_with("video-processor"));
        assert_eq!(config.base.cors_origins, vec!["*".to_string()]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn overrides_are_parsed() {
        let config = from_pairs(&[
            ("PORT", "3000"),
            ("MAX_UPLOAD_SIZE_MB", "5"),
            ("STAGING_DIR", "/srv/staging"),
            ("TRANSCODE_TIMEOUT_SECS", "30"),
            ("CORS_ORIGINS", "https://a.example, https://b.example"),
        ])
        .unwrap();
        assert_eq!(config.base.server_port, 3000);
        assert_eq!(config.max_upload_size_bytes, 5 * 1024 * 1024);
        assert_eq!(config.staging_dir, PathBuf::from("/srv/staging"));
        assert_eq!(config.transcode_timeout_secs, 30);
        assert_eq!(config.base.cors_origins.len(), 2);
    }

    #[test]
    fn wildcard_cors_rejected_in_production() {
        let result = from_pairs(&[("ENVIRONMENT", "production")]);
        assert!(result.is_err());
    }

    #[test]
    fn invalid_port_is_an_error() {
        assert!(from_pairs(&[("SERVER_PORT", "not-a-port")]).is_err());
    }

    #[test]
    fn validate_rejects_zero_limits_and_odd_codecs() {
        let config = from_pairs(&[("MAX_CONCURRENT_TRANSCODES", "0")]).unwrap();
        assert!(config.validate().is_err());

        let config = from_pairs(&[("TRANSCODE_VIDEO_CODEC", "libx264; rm -rf /")]).unwrap();
        assert!(config.validate().is_err());
    }
}
