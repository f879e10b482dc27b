use std::sync::Arc;

use chrono::NaiveDate;
use sha2::{Digest, Sha256};
use snowline_core::services::ReservationPolicy;
use snowline_core::Repositories;
use snowline_store::app_config::{BusinessRules, Config};

#[derive(Clone)]
pub struct AuthConfig {
    pub secret: String,
    pub expiration: u64,
    pub admin_username: String,
    admin_password_digest: [u8; 32],
}

impl AuthConfig {
    pub fn new(secret: String, expiration: u64, admin_username: String, admin_password: &str) -> Self {
        Self {
            secret,
            expiration,
            admin_username,
            admin_password_digest: Sha256::digest(admin_password.as_bytes()).into(),
        }
    }

    /// Compares SHA-256 digests so the time taken does not depend on how much of the password matched
    pub fn verify_admin(&self, username: &str, password: &str) -> bool {
        let digest: [u8; 32] = Sha256::digest(password.as_bytes()).into();
        let password_ok = digest == self.admin_password_digest;
        password_ok && username == self.admin_username
    }
}

#[derive(Clone)]
pub struct AppState {
    pub repos: Repositories,
    pub auth: AuthConfig,
    pub business_rules: BusinessRules,
    pub policy: Arc<ReservationPolicy>,
}

impl AppState {
    pub fn new(repos: Repositories, config: &Config) -> Self {
        Self {
            repos,
            auth: AuthConfig::new(
                config.auth.jwt_secret.clone(),
                config.auth.jwt_expiration_seconds,
                config.auth.admin_username.clone(),
                &config.auth.admin_password,
            ),
            business_rules: config.business_rules.clone(),
            policy: Arc::new(config.business_rules.policy()),
        }
    }

    /// Local calendar date used for the "not in the past" checks
    pub fn today(&self) -> NaiveDate {
        chrono::Local::now().date_naive()
    }
}
