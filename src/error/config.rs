use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    /// One or more required environment variables are not set.
    ///
    /// Every missing key is collected so the operator can fix them in one pass.
    #[error("Missing required environment variables: {}", .0.join(", "))]
    MissingEnvVars(Vec<String>),

    /// An environment variable is set but cannot be parsed.
    #[error("Invalid value '{value}' for environment variable {name}")]
    InvalidEnvVar {
        /// Name of the variable
        name: String,
        /// The raw value that failed to parse
        value: String,
    },
}
