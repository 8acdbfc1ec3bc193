use crate::client::parser::ParserError;
use crate::http::error::HeaderError;

#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    #[error("request already executed")]
    AlreadyExecuted,

    #[error("could not get connection URI: {0}")]
    InvalidUri(#[from] url::ParseError),

    #[error("unsupported URL scheme {0:?}, only http is supported")]
    UnsupportedScheme(String),

    #[error("invalid request header {name:?}: {reason}")]
    InvalidHeader { name: String, reason: &'static str },

    #[error("unknown status code {0}")]
    UnknownStatus(u16),

    #[error(transparent)]
    Header(#[from] HeaderError),

    #[error("malformed response: {0}")]
    Parser(#[from] ParserError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
