//! The low-level connection handle a [`BufferingRequest`] is bound to.
//!
//! A connection is created with its method and target URL already set. The
//! request configures it (request properties, output mode, streaming mode),
//! connects, writes the body, and then hands it to a [`ClientResponse`],
//! which reads the response through the same handle.
//!
//! [`BufferingRequest`]: crate::client::request::BufferingRequest
//! [`ClientResponse`]: crate::client::response::ClientResponse

use crate::client::error::RequestError;
use crate::http::headers::HttpHeaders;

pub trait HttpConnection {
    /// Method name as sent on the wire.
    fn request_method(&self) -> &str;

    /// Target URL as configured when the connection was opened.
    fn url(&self) -> &str;

    /// Replaces every value of a request header.
    fn set_request_property(&mut self, name: &str, value: &str);

    /// Appends a value to a request header.
    fn add_request_property(&mut self, name: &str, value: &str);

    fn do_output(&self) -> bool;

    fn set_do_output(&mut self, do_output: bool);

    /// Announce the exact body size up front.
    fn set_fixed_length_streaming_mode(&mut self, length: u64);

    fn connect(&mut self) -> Result<(), RequestError>;

    /// Sends the request head if needed, then `body`. Only valid when output
    /// is enabled.
    fn write_body(&mut self, body: &[u8]) -> Result<(), RequestError>;

    /// Sends the request if not sent yet and reads the response status.
    fn response_code(&mut self) -> Result<u16, RequestError>;

    fn response_message(&mut self) -> Result<String, RequestError>;

    fn response_headers(&mut self) -> Result<HttpHeaders, RequestError>;

    /// Takes the response body. Later calls return an empty body.
    fn response_body(&mut self) -> Result<Vec<u8>, RequestError>;

    fn disconnect(&mut self);
}
