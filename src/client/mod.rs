//! Blocking HTTP client built around [`BufferingRequest`].
//!
//! A [`RequestFactory`] opens a [`TcpConnection`] for a URI and method and
//! wraps it in a [`BufferingRequest`]. Executing the request returns a
//! [`ClientResponse`] that reads status, headers and body from the same
//! connection. Any other transport can be plugged in by implementing
//! [`HttpConnection`].

pub mod connection;
pub mod error;
pub mod factory;
pub mod parser;
pub mod request;
pub mod response;
pub mod tcp;

pub use connection::HttpConnection;
pub use error::RequestError;
pub use factory::RequestFactory;
pub use request::BufferingRequest;
pub use response::ClientResponse;
pub use tcp::TcpConnection;
