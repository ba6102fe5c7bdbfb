use thiserror::Error;

/// Coarse error kinds surfaced by settings parsing, weight I/O, and agent
/// construction. Every constructor in this crate returns `Result` rather
/// than exiting or panicking; only `main` decides to exit on one of these.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("config parse error at line {line_no}: {line}")]
    ConfigParse { line_no: usize, line: String },

    #[error("missing required setting: {key}")]
    MissingStrictSetting { key: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("unknown {kind}: {value}")]
    UnknownVariant { kind: &'static str, value: String },

    #[error("numeric error: {detail}")]
    NumericFailure { detail: String },
}

pub type Result<T> = std::result::Result<T, AgentError>;
