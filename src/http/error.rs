//! Errors raised by [`HttpHeaders`](crate::http::headers::HttpHeaders) and the
//! helpers it relies on.
//!
//! Every variant is an argument or state violation reported synchronously to
//! the caller. Nothing is retried and nothing is partially applied.

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HeaderError {
    #[error("headers are read-only")]
    ReadOnly,

    #[error("header '{0}' cannot be set to an empty list of values")]
    EmptyValues(String),

    #[error("'Content-Type' cannot contain wildcard type '*'")]
    WildcardType,

    #[error("'Content-Type' cannot contain wildcard subtype '*'")]
    WildcardSubtype,

    #[error("invalid ETag {0:?}, does not start with W/ or \"")]
    InvalidETagStart(String),

    #[error("invalid ETag {0:?}, does not end with \"")]
    InvalidETagEnd(String),

    #[error("cannot parse date value {value:?} for {name:?} header")]
    InvalidDate { name: String, value: String },

    #[error("date {0}ms is outside the range of HTTP dates")]
    DateOutOfRange(i64),

    #[error("invalid media type {value:?}: {reason}")]
    InvalidMediaType { value: String, reason: &'static str },

    #[error("charset should be UTF-8 or ISO-8859-1, got {0:?}")]
    UnsupportedCharset(String),
}

impl HeaderError {
    pub(crate) fn media_type(value: &str, reason: &'static str) -> Self {
        HeaderError::InvalidMediaType {
            value: value.to_string(),
            reason,
        }
    }
}
