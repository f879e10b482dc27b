use chrono::NaiveTime;
use serde::Deserialize;
use std::env;

use snowline_core::services::ReservationPolicy;
use snowline_order::LessonRules;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub business_rules: BusinessRules,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BusinessRules {
    #[serde(default = "default_max_rental_days")]
    pub max_rental_days: u32,
    #[serde(default = "default_max_lesson_participants")]
    pub max_lesson_participants: u32,
    pub lesson_day_start: NaiveTime,
    pub lesson_day_end: NaiveTime,
    pub languages: Vec<String>,
    pub currency: String,
}

fn default_max_rental_days() -> u32 { 14 }

fn default_max_lesson_participants() -> u32 { 6 }

impl BusinessRules {
    pub fn policy(&self) -> ReservationPolicy {
        ReservationPolicy {
            max_rental_days: self.max_rental_days,
            lesson: LessonRules {
                max_participants: self.max_lesson_participants,
                day_start: self.lesson_day_start,
                day_end: self.lesson_day_end,
                languages: self.languages.iter().map(|l| l.to_lowercase()).collect(),
            },
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub jwt_expiration_seconds: u64,
    pub admin_username: String,
    pub admin_password: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Postgres,
    /// Volatile, seeded with demo data; for local runs without a database
    Memory,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub backend: StorageBackend,
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 { 5 }

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            // Per-environment overrides, optional
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Local overrides, not checked in
            .add_source(config::File::with_name("config/local").required(false))
            // Eg. `SNOWLINE_DATABASE__URL=postgres://...`
            .add_source(config::Environment::with_prefix("SNOWLINE").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
