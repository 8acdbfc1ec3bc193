//! A client request that buffers its body in memory and sends it in one go.
//!
//! The request is bound to a single [`HttpConnection`] whose method and URL
//! are already set. Callers fill in headers and body, then call
//! [`execute`](BufferingRequest::execute) exactly once. After that the
//! headers are a read-only snapshot and the body buffer is gone.

use url::Url;

use crate::client::connection::HttpConnection;
use crate::client::error::RequestError;
use crate::client::response::ClientResponse;
use crate::http::HttpMethod;
use crate::http::headers::HttpHeaders;
use crate::http::names;

const DEFAULT_BUFFER_SIZE: usize = 1024;

pub struct BufferingRequest<C: HttpConnection> {
    connection: Option<C>,
    method: String,
    url: String,
    output_streaming: bool,

    headers: HttpHeaders,
    body: Option<Vec<u8>>,
    executed: bool,
}

impl<C: HttpConnection> BufferingRequest<C> {
    pub fn new(connection: C, output_streaming: bool) -> Self {
        Self::with_buffer_size(connection, output_streaming, DEFAULT_BUFFER_SIZE)
    }

    pub fn with_buffer_size(connection: C, output_streaming: bool, buffer_size: usize) -> Self {
        Self {
            method: connection.request_method().to_string(),
            url: connection.url().to_string(),
            connection: Some(connection),
            output_streaming,
            headers: HttpHeaders::new(),
            body: Some(Vec::with_capacity(buffer_size)),
            executed: false,
        }
    }

    /// The request method, `None` if the connection uses a method outside
    /// [`HttpMethod`].
    pub fn method(&self) -> Option<HttpMethod> {
        HttpMethod::resolve(&self.method)
    }

    pub fn uri(&self) -> Result<Url, RequestError> {
        Ok(Url::parse(&self.url)?)
    }

    pub fn is_executed(&self) -> bool {
        self.executed
    }

    /// Writable before execution, a read-only snapshot after.
    pub fn headers(&self) -> &HttpHeaders {
        &self.headers
    }

    /// Mutations fail with [`HeaderError::ReadOnly`](crate::http::error::HeaderError::ReadOnly)
    /// once the request is executed.
    pub fn headers_mut(&mut self) -> &mut HttpHeaders {
        &mut self.headers
    }

    /// The body buffer, to be written through [`std::io::Write`].
    pub fn body(&mut self) -> Result<&mut Vec<u8>, RequestError> {
        self.assert_not_executed()?;
        self.body.as_mut().ok_or(RequestError::AlreadyExecuted)
    }

    fn assert_not_executed(&self) -> Result<(), RequestError> {
        if self.executed {
            return Err(RequestError::AlreadyExecuted);
        }
        Ok(())
    }

    /// Sends the request and returns a view over the response.
    ///
    /// On a transport error the request stays unexecuted and may be
    /// executed again.
    pub fn execute(&mut self) -> Result<ClientResponse<C>, RequestError> {
        self.assert_not_executed()?;
        let (Some(connection), Some(body)) = (self.connection.as_mut(), self.body.as_ref()) else {
            return Err(RequestError::AlreadyExecuted);
        };

        if self.headers.content_length() < 0 {
            self.headers.set_content_length(body.len() as u64)?;
        }

        add_headers(connection, &self.headers);

        // some transports refuse an output stream for an empty DELETE
        if HttpMethod::resolve(&self.method) == Some(HttpMethod::Delete) && body.is_empty() {
            connection.set_do_output(false);
        }
        if !connection.do_output() && !body.is_empty() {
            log::warn!(
                "{} {} does not send a body, dropping {} buffered bytes",
                self.method,
                self.url,
                body.len()
            );
        }
        if connection.do_output() && self.output_streaming {
            connection.set_fixed_length_streaming_mode(body.len() as u64);
        }

        log::debug!(
            "Executing {} {} with {} body bytes",
            self.method,
            self.url,
            body.len()
        );
        connection.connect()?;
        if connection.do_output() {
            connection.write_body(body)?;
        } else {
            // trigger the request even though nothing is written
            connection.response_code()?;
        }

        let connection = self.connection.take().ok_or(RequestError::AlreadyExecuted)?;
        self.executed = true;
        self.headers = HttpHeaders::read_only(&self.headers);
        self.body = None;
        Ok(ClientResponse::new(connection))
    }
}

/// Copies `headers` onto `connection`.
///
/// Cookie values are joined with `"; "` into a single value (RFC 6265);
/// every other value is sent on its own. The first value of each name
/// replaces what the connection already holds, so copying twice onto the
/// same connection sends each header once.
pub fn add_headers<C: HttpConnection>(connection: &mut C, headers: &HttpHeaders) {
    for (name, values) in headers {
        if name.eq_ignore_ascii_case(names::COOKIE) {
            connection.set_request_property(name, &values.join("; "));
            continue;
        }
        let mut values = values.iter();
        if let Some(first) = values.next() {
            connection.set_request_property(name, first);
        }
        for value in values {
            connection.add_request_property(name, value);
        }
    }
}
