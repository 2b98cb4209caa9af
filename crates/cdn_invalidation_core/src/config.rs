use thiserror::Error;

pub const DISTRIBUTION_ID_VAR: &str = "DISTRIBUTION_ID";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{variable} environment variable is not set")]
    MissingVariable { variable: &'static str },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerConfig {
    pub distribution_id: String,
}

impl HandlerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads the configuration through `lookup`, treating blank values as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let distribution_id = lookup(DISTRIBUTION_ID_VAR)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .ok_or(ConfigError::MissingVariable {
                variable: DISTRIBUTION_ID_VAR,
            })?;

        Ok(Self { distribution_id })
    }
}
