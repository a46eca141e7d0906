//! Authentication Configuration
//!
//! All configuration values are loaded from environment variables.
//! No hardcoded secrets or sensitive data.

use crate::error::AuthError;
use std::env;

/// Authentication configuration loaded from environment
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Session inactivity timeout in seconds (from SESSION_TIMEOUT env var)
    pub session_timeout: i64,

    /// Password reset token lifetime in seconds (from PASSWORD_RESET_EXPIRATION env var)
    pub password_reset_expiration: i64,

    /// Minimum password length (from MIN_PASSWORD_LENGTH env var)
    pub min_password_length: usize,

    /// Argon2 memory cost in KiB (from ARGON2_MEMORY_COST env var)
    pub argon2_memory_cost: u32,

    /// Argon2 time cost (iterations) (from ARGON2_TIME_COST env var)
    pub argon2_time_cost: u32,

    /// Argon2 parallelism (from ARGON2_PARALLELISM env var)
    pub argon2_parallelism: u32,

    /// Include the raw reset token in the reset-request response
    /// (from RETURN_RESET_TOKEN env var). Keep disabled in production;
    /// token delivery belongs to the email collaborator.
    pub return_reset_token: bool,
}

impl AuthConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            session_timeout: env::var("SESSION_TIMEOUT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3600), // 1 hour default

            password_reset_expiration: env::var("PASSWORD_RESET_EXPIRATION")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3600), // 1 hour

            min_password_length: env::var("MIN_PASSWORD_LENGTH")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(8),

            argon2_memory_cost: env::var("ARGON2_MEMORY_COST")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(65536), // 64 MiB

            argon2_time_cost: env::var("ARGON2_TIME_COST")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3),

            argon2_parallelism: env::var("ARGON2_PARALLELISM")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(4),

            return_reset_token: env::var("RETURN_RESET_TOKEN")
                .ok()
                .map(|v| v.to_lowercase() == "true")
                .unwrap_or(false),
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), AuthError> {
        if self.session_timeout <= 0 {
            return Err(AuthError::Config(
                "SESSION_TIMEOUT must be positive".to_string(),
            ));
        }

        if self.password_reset_expiration <= 0 {
            return Err(AuthError::Config(
                "PASSWORD_RESET_EXPIRATION must be positive".to_string(),
            ));
        }

        if self.min_password_length < 8 {
            return Err(AuthError::Config(
                "MIN_PASSWORD_LENGTH must be at least 8".to_string(),
            ));
        }

        if self.argon2_memory_cost < 8 || self.argon2_time_cost == 0 || self.argon2_parallelism == 0
        {
            return Err(AuthError::Config(
                "Argon2 parameters out of range".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_validation() {
        let config = AuthConfig {
            session_timeout: 3600,
            password_reset_expiration: 3600,
            min_password_length: 8,
            argon2_memory_cost: 65536,
            argon2_time_cost: 3,
            argon2_parallelism: 4,
            return_reset_token: false,
        };

        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation_short_password_minimum() {
        let config = AuthConfig {
            session_timeout: 3600,
            password_reset_expiration: 3600,
            min_password_length: 4,
            argon2_memory_cost: 65536,
            argon2_time_cost: 3,
            argon2_parallelism: 4,
            return_reset_token: false,
        };

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_nonpositive_timeout() {
        let config = AuthConfig {
            session_timeout: 0,
            password_reset_expiration: 3600,
            min_password_length: 8,
            argon2_memory_cost: 65536,
            argon2_time_cost: 3,
            argon2_parallelism: 4,
            return_reset_token: false,
        };

        assert!(config.validate().is_err());
    }
}
