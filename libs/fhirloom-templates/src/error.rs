use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("template not found: {0}")]
    NotFound(String),

    #[error("invalid template at '{path}': {reason}")]
    Invalid { path: String, reason: String },

    #[error("yaml error in '{path}': {source}")]
    Yaml {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("io error reading '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error(
        "reference cycle detected while resolving '{0}' (depth limit {1} exceeded)"
    )]
    CycleDetected(String, u32),
}
