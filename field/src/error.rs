use thiserror::Error;

/// Reasons a [`FieldConfig`](crate::FieldConfig) can be rejected.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("particleCount must be greater than zero")]
    NoParticles,

    /// A tunable that must lie in a range did not.
    #[error("{name} must be {expected}, got {value}")]
    OutOfRange {
        name: &'static str,
        expected: &'static str,
        value: f32,
    },

    #[error("invalid color {0:?}, expected #rgb, #rrggbb or #rrggbbaa")]
    InvalidColor(String),

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
}
