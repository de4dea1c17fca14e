use crate::core::gesture::{SpringParams, SwipeConfig};
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub places: PlacesSettings,
    #[serde(default)]
    pub database: DatabaseSettings,
    #[serde(default)]
    pub cache: CacheSettings,
    #[serde(default)]
    pub deck: DeckSettings,
    #[serde(default)]
    pub session: SessionSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlacesSettings {
    pub endpoint: String,
    pub api_key: String,
    #[serde(default = "default_radius_m")]
    pub radius_m: u32,
    #[serde(default = "default_photo_max_width")]
    pub photo_max_width: u32,
    #[serde(default = "default_places_timeout")]
    pub timeout_secs: u64,
}

fn default_radius_m() -> u32 { 1500 }
fn default_photo_max_width() -> u32 { 400 }
fn default_places_timeout() -> u64 { 10 }

/// Saved-list database; without a URL the saved list lives in memory
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DatabaseSettings {
    pub url: Option<String>,
    pub max_connections: Option<u32>,
    pub min_connections: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheSettings {
    pub redis_url: Option<String>,
    #[serde(default = "default_l1_cache_size")]
    pub l1_cache_size: u64,
    #[serde(default = "default_cache_ttl")]
    pub ttl_secs: u64,
    #[serde(default = "default_location_precision")]
    pub location_precision: u32,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            redis_url: None,
            l1_cache_size: default_l1_cache_size(),
            ttl_secs: default_cache_ttl(),
            location_precision: default_location_precision(),
        }
    }
}

fn default_l1_cache_size() -> u64 { 1000 }
fn default_cache_ttl() -> u64 { 300 }
fn default_location_precision() -> u32 { 3 }

#[derive(Debug, Clone, Deserialize)]
pub struct DeckSettings {
    #[serde(default = "default_reference_width")]
    pub reference_width: f64,
    #[serde(default = "default_threshold_fraction")]
    pub threshold_fraction: f64,
    #[serde(default = "default_rotation_per_width")]
    pub rotation_per_width_deg: f64,
    #[serde(default = "default_exit_distance_factor")]
    pub exit_distance_factor: f64,
    #[serde(default = "default_exit_rotation")]
    pub exit_rotation_deg: f64,
    #[serde(default = "default_commit_duration")]
    pub commit_duration_ms: u64,
    #[serde(default = "default_spring_damping")]
    pub spring_damping: f64,
    #[serde(default = "default_spring_stiffness")]
    pub spring_stiffness: f64,
}

impl Default for DeckSettings {
    fn default() -> Self {
        Self {
            reference_width: default_reference_width(),
            threshold_fraction: default_threshold_fraction(),
            rotation_per_width_deg: default_rotation_per_width(),
            exit_distance_factor: default_exit_distance_factor(),
            exit_rotation_deg: default_exit_rotation(),
            commit_duration_ms: default_commit_duration(),
            spring_damping: default_spring_damping(),
            spring_stiffness: default_spring_stiffness(),
        }
    }
}

fn default_reference_width() -> f64 { 390.0 }
fn default_threshold_fraction() -> f64 { 0.4 }
fn default_rotation_per_width() -> f64 { 20.0 }
fn default_exit_distance_factor() -> f64 { 1.5 }
fn default_exit_rotation() -> f64 { 45.0 }
fn default_commit_duration() -> u64 { 250 }
fn default_spring_damping() -> f64 { 20.0 }
fn default_spring_stiffness() -> f64 { 200.0 }

impl DeckSettings {
    pub fn swipe_config(&self) -> SwipeConfig {
        SwipeConfig {
            reference_width: self.reference_width,
            threshold_fraction: self.threshold_fraction,
            rotation_per_width_deg: self.rotation_per_width_deg,
            exit_distance_factor: self.exit_distance_factor,
            exit_rotation_deg: self.exit_rotation_deg,
            commit_duration_ms: self.commit_duration_ms,
            spring: SpringParams {
                damping: self.spring_damping,
                stiffness: self.spring_stiffness,
            },
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionSettings {
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,
    #[serde(default = "default_max_sessions")]
    pub max_sessions: u64,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            idle_timeout_secs: default_idle_timeout(),
            max_sessions: default_max_sessions(),
        }
    }
}

fn default_idle_timeout() -> u64 { 1800 }
fn default_max_sessions() -> u64 { 10_000 }

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "json".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (prefixed with BITESWIPE)
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., BITESWIPE__SERVER__PORT -> server.port
            .add_source(env_source())
            .build()?;

        substitute_env_vars(settings)?.try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(env_source())
            .build()?;

        settings.try_deserialize()
    }
}

fn env_source() -> Environment {
    Environment::with_prefix("BITESWIPE")
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
}

/// Apply the conventional unprefixed variables on top of the layered config
fn substitute_env_vars(settings: Config) -> Result<Config, ConfigError> {
    use std::env;

    let mut builder = Config::builder().add_source(settings);

    if let Ok(url) = env::var("DATABASE_URL") {
        builder = builder.set_override("database.url", url)?;
    }
    if let Ok(url) = env::var("REDIS_URL") {
        builder = builder.set_override("cache.redis_url", url)?;
    }
    if let Ok(key) = env::var("PLACES_API_KEY") {
        builder = builder.set_override("places.api_key", key)?;
    }

    builder.build()
}
