use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("connection is not open")]
    NotConnected,

    #[error("connection was already established for this session")]
    AlreadyConnected,

    #[error("could not open connection: {0}")]
    Connect(String),

    #[error("send failed: {0}")]
    Send(String),

    #[error("contact does not exist: {0}")]
    InvalidContact(String),

    #[error("failed to load chat history: {0}")]
    HistoryLoad(String),

    #[error("failed to load contact list: {0}")]
    DirectoryLoad(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, ChatError>;
