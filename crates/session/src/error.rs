use gpu::GpuError;
use runtime::InvalidTransition;

#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    Parse(String),
    Invalid { field: &'static str, reason: String },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Parse(msg) => write!(f, "config parse error: {msg}"),
            ConfigError::Invalid { field, reason } => write!(f, "invalid config `{field}`: {reason}"),
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionError {
    Config(ConfigError),
    Lifecycle(InvalidTransition),
    Gpu(GpuError),
}

impl std::fmt::Display for SessionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionError::Config(e) => write!(f, "{e}"),
            SessionError::Lifecycle(e) => write!(f, "{e}"),
            SessionError::Gpu(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for SessionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SessionError::Config(e) => Some(e),
            SessionError::Lifecycle(e) => Some(e),
            SessionError::Gpu(e) => Some(e),
        }
    }
}

impl From<ConfigError> for SessionError {
    fn from(e: ConfigError) -> Self {
        SessionError::Config(e)
    }
}

impl From<InvalidTransition> for SessionError {
    fn from(e: InvalidTransition) -> Self {
        SessionError::Lifecycle(e)
    }
}

impl From<GpuError> for SessionError {
    fn from(e: GpuError) -> Self {
        SessionError::Gpu(e)
    }
}
