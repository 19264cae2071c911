pub type QuotecardResult<T> = Result<T, QuotecardError>;

#[derive(thiserror::Error, Debug)]
pub enum QuotecardError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("render error: {0}")]
    Render(String),

    #[error("schedule error: {0}")]
    Schedule(String),

    #[error("quote error: {0}")]
    Quote(String),

    #[error("publish error: {0}")]
    Publish(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl QuotecardError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    pub fn schedule(msg: impl Into<String>) -> Self {
        Self::Schedule(msg.into())
    }

    pub fn quote(msg: impl Into<String>) -> Self {
        Self::Quote(msg.into())
    }

    pub fn publish(msg: impl Into<String>) -> Self {
        Self::Publish(msg.into())
    }
}
