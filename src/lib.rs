pub mod client;
pub mod config;
pub mod http;

pub use http::HttpMethod;
pub use http::error::HeaderError;
pub use http::headers::HttpHeaders;
pub use http::media_type::MediaType;
