//! Configuration error types.

/// Result type alias for config operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Errors that can occur while loading or persisting configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read a config file.
    #[error("failed to read config file '{path}': {source}")]
    ReadFile {
        path: String,
        source: std::io::Error,
    },

    /// Failed to write a config file.
    #[error("failed to write config file '{path}': {source}")]
    WriteFile {
        path: String,
        source: std::io::Error,
    },

    /// Failed to parse TOML.
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Failed to serialize config.
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// Project manifest file is missing.
    #[error("project manifest not found: {path}")]
    ManifestNotFound { path: String },

    /// Project manifest is not valid JSON.
    #[error("failed to parse manifest '{path}': {source}")]
    ManifestParse {
        path: String,
        source: serde_json::Error,
    },

    /// A required manifest field is missing or empty.
    #[error("missing required field '{field}' in project manifest")]
    MissingField { field: String },

    /// Manifest declares no component folder mappings at all.
    #[error("project manifest declares no component folders under 'paths'")]
    NoComponentMappings,

    /// Referenced domain does not exist.
    #[error("domain '{0}' not found")]
    DomainNotFound(String),

    /// Domain already exists.
    #[error("domain '{0}' already exists")]
    DomainExists(String),

    /// Attempt to modify a reserved key or domain.
    #[error("{0}")]
    Reserved(String),

    /// Unknown config key passed to `config set`.
    #[error("unknown config key '{0}'")]
    UnknownKey(String),

    /// Config value failed to parse (e.g. non-numeric port).
    #[error("invalid value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}
