use crate::client::connection::HttpConnection;
use crate::client::error::RequestError;
use crate::http::headers::HttpHeaders;
use crate::http::status::HttpStatus;

/// View over the response of an executed request.
///
/// Everything is read lazily through the connection the request was sent
/// on. Headers are read-only.
pub struct ClientResponse<C: HttpConnection> {
    connection: C,
    headers: Option<HttpHeaders>,
}

impl<C: HttpConnection> ClientResponse<C> {
    pub fn new(connection: C) -> Self {
        Self {
            connection,
            headers: None,
        }
    }

    pub fn status_code(&mut self) -> Result<u16, RequestError> {
        self.connection.response_code()
    }

    pub fn status(&mut self) -> Result<HttpStatus, RequestError> {
        let code = self.status_code()?;
        HttpStatus::from_code(code).ok_or(RequestError::UnknownStatus(code))
    }

    pub fn status_text(&mut self) -> Result<String, RequestError> {
        self.connection.response_message()
    }

    pub fn headers(&mut self) -> Result<&HttpHeaders, RequestError> {
        if self.headers.is_none() {
            let headers = self.connection.response_headers()?;
            self.headers = Some(HttpHeaders::read_only(&headers));
        }
        Ok(self.headers.get_or_insert_with(HttpHeaders::new))
    }

    pub fn body(&mut self) -> Result<Vec<u8>, RequestError> {
        self.connection.response_body()
    }

    pub fn connection(&self) -> &C {
        &self.connection
    }

    pub fn close(mut self) {
        self.connection.disconnect();
    }
}
