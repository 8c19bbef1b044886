use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("pipeline error: {context}")]
    Pipeline { context: &'static str },

    #[error("stage `{stage}` error: {message}")]
    Stage {
        stage: &'static str,
        message: String,
    },

    #[error("{service} reported errors: {message}")]
    Service {
        service: &'static str,
        message: String,
    },

    #[error("http error: {0}")]
    Http(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("pipeline cancelled")]
    Cancelled,
}

impl Error {
    pub fn pipeline(context: &'static str) -> Self {
        Self::Pipeline { context }
    }

    pub fn stage(stage: &'static str, message: impl Into<String>) -> Self {
        Self::Stage {
            stage,
            message: message.into(),
        }
    }

    pub fn service(service: &'static str, message: impl Into<String>) -> Self {
        Self::Service {
            service,
            message: message.into(),
        }
    }
}
