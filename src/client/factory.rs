use crate::client::connection::HttpConnection;
use crate::client::error::RequestError;
use crate::client::request::BufferingRequest;
use crate::client::tcp::TcpConnection;
use crate::config::{ClientConfig, config};
use crate::http::HttpMethod;

/// Creates [`BufferingRequest`]s over fresh [`TcpConnection`]s.
pub struct RequestFactory {
    config: ClientConfig,
}

impl Default for RequestFactory {
    /// Uses the process-wide [`config`].
    fn default() -> Self {
        Self::new(config().clone())
    }
}

impl RequestFactory {
    pub fn new(config: ClientConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn create_request(
        &self,
        uri: &str,
        method: HttpMethod,
    ) -> Result<BufferingRequest<TcpConnection>, RequestError> {
        let mut connection = TcpConnection::open(uri, method.as_str(), &self.config)?;
        connection.set_do_output(method.has_output());

        Ok(BufferingRequest::with_buffer_size(
            connection,
            self.config.output_streaming,
            self.config.body_buffer_size,
        ))
    }
}
