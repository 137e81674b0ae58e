pub type SightlineResult<T> = Result<T, SightlineError>;

#[derive(thiserror::Error, Debug)]
pub enum SightlineError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("schedule error: {0}")]
    Schedule(String),

    #[error("script error: {0}")]
    Script(String),

    #[error("serialization error: {0}")]
    Serde(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SightlineError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn schedule(msg: impl Into<String>) -> Self {
        Self::Schedule(msg.into())
    }

    pub fn script(msg: impl Into<String>) -> Self {
        Self::Script(msg.into())
    }

    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}
