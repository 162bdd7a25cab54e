use crate::domain::credentials::HashCost;
use crate::error::{Result, StoreError};
use std::{env, fmt::Display, path::PathBuf, str::FromStr};
use tracing::{info, warn};

/// Runtime settings read from `GROCER_*` environment variables.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub admin_username: String,
    pub admin_password: String,
    pub upload_dir: PathBuf,
    pub hash_cost: HashCost,
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a config from any key lookup. Unset keys fall back to defaults;
    /// values that do not parse are an error.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let admin_password = match lookup("GROCER_ADMIN_PASSWORD") {
            Some(password) => password,
            None => {
                warn!(
                    "GROCER_ADMIN_PASSWORD not set, the default admin uses the built-in password"
                );
                "admin".to_string()
            }
        };
        Ok(Self {
            admin_username: try_load(&lookup, "GROCER_ADMIN_USERNAME", "admin")?,
            admin_password,
            upload_dir: try_load(&lookup, "GROCER_UPLOAD_DIR", "static/uploads")?,
            hash_cost: HashCost {
                memory_kib: try_load(&lookup, "GROCER_ARGON2_M_COST", "19456")?,
                iterations: try_load(&lookup, "GROCER_ARGON2_T_COST", "2")?,
            },
        })
    }
}

fn try_load<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: &str,
) -> Result<T>
where
    T::Err: Display,
{
    lookup(key)
        .unwrap_or_else(|| {
            info!("{key} not set, using default: {default}");
            default.to_string()
        })
        .parse()
        .map_err(|e| {
            warn!("Invalid {key} value: {e}");
            StoreError::ValidationError(format!("Invalid {key} value: {e}"))
        })
}
