//! Blocking HTTP/1.1 connection over a plain TCP stream.
//!
//! The request head is sent lazily: on the first body write, or when the
//! response is first asked for. The response is then read in full through a
//! [`ResponseParser`] and served from memory. Every request carries
//! `Connection: close`, so close-delimited bodies are always well defined.

use std::io::{Read, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use url::Url;

use crate::client::connection::HttpConnection;
use crate::client::error::RequestError;
use crate::client::parser::{ParsedResponse, ParserOk, ResponseParser};
use crate::config::ClientConfig;
use crate::http::headers::HttpHeaders;
use crate::http::media_type::is_token;
use crate::http::names;

pub struct TcpConnection {
    url: Url,
    raw_url: String,
    method: String,
    properties: HttpHeaders,
    do_output: bool,
    fixed_length: Option<u64>,

    connect_timeout: Duration,
    read_timeout: Duration,
    read_buffer_size: usize,
    max_header_size: usize,

    stream: Option<TcpStream>,
    head_sent: bool,
    response: Option<ParsedResponse>,
}

impl TcpConnection {
    /// Prepares a connection to `url`. Nothing is sent until
    /// [`connect`](HttpConnection::connect) is called.
    pub fn open(url: &str, method: &str, config: &ClientConfig) -> Result<Self, RequestError> {
        let parsed = Url::parse(url)?;
        if parsed.scheme() != "http" {
            return Err(RequestError::UnsupportedScheme(parsed.scheme().to_string()));
        }

        Ok(Self {
            url: parsed,
            raw_url: url.to_string(),
            method: method.to_string(),
            properties: HttpHeaders::new(),
            do_output: false,
            fixed_length: None,
            connect_timeout: config.connect_timeout,
            read_timeout: config.read_timeout,
            read_buffer_size: config.read_buffer_size,
            max_header_size: config.max_header_size,
            stream: None,
            head_sent: false,
            response: None,
        })
    }

    /// Request headers set so far.
    pub fn request_properties(&self) -> &HttpHeaders {
        &self.properties
    }

    fn host_header(&self) -> String {
        let host = self.url.host_str().unwrap_or_default();
        match self.url.port() {
            Some(port) => format!("{host}:{port}"),
            None => host.to_string(),
        }
    }

    fn stream(&mut self) -> Result<&mut TcpStream, RequestError> {
        self.connect()?;
        self.stream.as_mut().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::NotConnected, "connection is closed").into()
        })
    }

    // <METHOD> <path>?<query> HTTP/1.1\r\n
    // <header_name>: <header_value>\r\n
    // ...
    // \r\n
    fn build_head(&self) -> Result<String, RequestError> {
        let mut target = self.url.path().to_string();
        if let Some(query) = self.url.query() {
            target.push('?');
            target.push_str(query);
        }

        let mut head = format!("{} {} HTTP/1.1\r\n", self.method, target);
        if !self.properties.contains_key(names::HOST) {
            head.push_str(&format!("{}: {}\r\n", names::HOST, self.host_header()));
        }
        for (name, values) in &self.properties {
            let is_length = name.eq_ignore_ascii_case(names::CONTENT_LENGTH);
            // a fixed length replaces whatever length the caller set
            if is_length && self.fixed_length.is_some() {
                continue;
            }
            for value in values {
                check_header(name, value)?;
                // no body follows when output is disabled
                if is_length && !self.do_output && value.trim() != "0" {
                    log::debug!("Dropping {}: {} from a request without body", name, value);
                    continue;
                }
                head.push_str(&format!("{}: {}\r\n", name, value));
            }
        }
        if let Some(length) = self.fixed_length {
            head.push_str(&format!("{}: {}\r\n", names::CONTENT_LENGTH, length));
        }
        if !self.properties.contains_key(names::CONNECTION) {
            head.push_str(&format!("{}: close\r\n", names::CONNECTION));
        }
        head.push_str("\r\n");
        Ok(head)
    }

    fn send_head(&mut self) -> Result<(), RequestError> {
        if self.head_sent {
            return Ok(());
        }
        let head = self.build_head()?;
        log::debug!("Sending {} {}", self.method, self.raw_url);
        self.stream()?.write_all(head.as_bytes())?;
        self.head_sent = true;
        Ok(())
    }

    fn read_response(&mut self) -> Result<&mut ParsedResponse, RequestError> {
        if self.response.is_none() {
            self.send_head()?;
            let expect_body = self.method != "HEAD";
            let mut parser = ResponseParser::new(expect_body, self.max_header_size);
            let mut buffer = vec![0; self.read_buffer_size.max(1)];
            let stream = self.stream()?;
            stream.flush()?;

            loop {
                let n = match stream.read(&mut buffer) {
                    Ok(n) => n,
                    Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                    Err(e) => return Err(e.into()),
                };
                if n == 0 {
                    parser.finish()?;
                    break;
                }
                if parser.feed(&buffer[..n])? == ParserOk::Done {
                    break;
                }
            }

            let response = parser.into_response();
            log::debug!("Received {} {}", response.status, response.reason);
            self.response = Some(response);
        }
        // just filled above
        self.response
            .as_mut()
            .ok_or_else(|| std::io::Error::other("response unavailable").into())
    }
}

/// Rejects names that are not RFC 7230 tokens and values that would break
/// out of their header line.
fn check_header(name: &str, value: &str) -> Result<(), RequestError> {
    let reason = if !is_token(name) {
        "name is not a token"
    } else if value.bytes().any(|b| matches!(b, b'\r' | b'\n' | b'\0')) {
        "value contains CR, LF or NUL"
    } else {
        return Ok(());
    };
    Err(RequestError::InvalidHeader {
        name: name.to_string(),
        reason,
    })
}

impl HttpConnection for TcpConnection {
    fn request_method(&self) -> &str {
        &self.method
    }

    fn url(&self) -> &str {
        &self.raw_url
    }

    fn set_request_property(&mut self, name: &str, value: &str) {
        // `properties` is never made read-only and a single value is never
        // empty, so neither call can fail
        let _ = self.properties.set(name, value);
    }

    fn add_request_property(&mut self, name: &str, value: &str) {
        // see set_request_property
        let _ = self.properties.add(name, value);
    }

    fn do_output(&self) -> bool {
        self.do_output
    }

    fn set_do_output(&mut self, do_output: bool) {
        self.do_output = do_output;
    }

    fn set_fixed_length_streaming_mode(&mut self, length: u64) {
        self.fixed_length = Some(length);
    }

    fn connect(&mut self) -> Result<(), RequestError> {
        if self.stream.is_some() {
            return Ok(());
        }

        let host = self.url.host_str().unwrap_or_default();
        let port = self.url.port_or_known_default().unwrap_or(80);
        let mut last_err = None;
        for addr in (host, port).to_socket_addrs()? {
            match TcpStream::connect_timeout(&addr, self.connect_timeout) {
                Ok(stream) => {
                    stream.set_read_timeout(Some(self.read_timeout))?;
                    log::debug!("Connected to {}", addr);
                    self.stream = Some(stream);
                    return Ok(());
                }
                Err(err) => last_err = Some(err),
            }
        }

        Err(last_err
            .unwrap_or_else(|| {
                std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("no address found for {host}"),
                )
            })
            .into())
    }

    fn write_body(&mut self, body: &[u8]) -> Result<(), RequestError> {
        if !self.do_output {
            return Err(std::io::Error::new(
                std::io::ErrorKind::Unsupported,
                "output is disabled for this connection",
            )
            .into());
        }
        self.send_head()?;
        let stream = self.stream()?;
        stream.write_all(body)?;
        stream.flush()?;
        Ok(())
    }

    fn response_code(&mut self) -> Result<u16, RequestError> {
        Ok(self.read_response()?.status)
    }

    fn response_message(&mut self) -> Result<String, RequestError> {
        Ok(self.read_response()?.reason.clone())
    }

    fn response_headers(&mut self) -> Result<HttpHeaders, RequestError> {
        Ok(HttpHeaders::read_only(&self.read_response()?.headers))
    }

    fn response_body(&mut self) -> Result<Vec<u8>, RequestError> {
        Ok(std::mem::take(&mut self.read_response()?.body))
    }

    fn disconnect(&mut self) {
        if let Some(stream) = self.stream.take() {
            let _ = stream.shutdown(std::net::Shutdown::Both);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_http_schemes() {
        let err = TcpConnection::open("https://example.com/", "GET", &ClientConfig::default());
        assert!(matches!(err, Err(RequestError::UnsupportedScheme(s)) if s == "https"));
        assert!(matches!(
            TcpConnection::open("not a url", "GET", &ClientConfig::default()),
            Err(RequestError::InvalidUri(_))
        ));
    }

    #[test]
    fn head_with_fixed_length() {
        let mut conn =
            TcpConnection::open("http://example.com:8080/a/b?x=1", "POST", &ClientConfig::default())
                .unwrap();
        conn.add_request_property("Content-Length", "99");
        conn.add_request_property("Accept", "text/plain");
        conn.add_request_property("Accept", "text/html");
        conn.set_fixed_length_streaming_mode(3);

        assert_eq!(
            conn.build_head().unwrap(),
            "POST /a/b?x=1 HTTP/1.1\r\n\
             Host: example.com:8080\r\n\
             Accept: text/plain\r\n\
             Accept: text/html\r\n\
             Content-Length: 3\r\n\
             Connection: close\r\n\
             \r\n"
        );
    }

    #[test]
    fn head_keeps_caller_host() {
        let mut conn =
            TcpConnection::open("http://example.com/", "GET", &ClientConfig::default()).unwrap();
        conn.set_request_property("host", "other.example");
        assert_eq!(
            conn.build_head().unwrap(),
            "GET / HTTP/1.1\r\nhost: other.example\r\nConnection: close\r\n\r\n"
        );
    }

    #[test]
    fn head_drops_body_length_without_output() {
        let mut conn =
            TcpConnection::open("http://example.com/", "GET", &ClientConfig::default()).unwrap();
        conn.set_request_property("Content-Length", "5");
        assert_eq!(
            conn.build_head().unwrap(),
            "GET / HTTP/1.1\r\nHost: example.com\r\nConnection: close\r\n\r\n"
        );

        conn.set_request_property("Content-Length", "0");
        assert!(conn.build_head().unwrap().contains("\r\nContent-Length: 0\r\n"));
    }

    #[test]
    fn head_rejects_line_breaks_in_values() {
        let mut conn =
            TcpConnection::open("http://example.com/", "GET", &ClientConfig::default()).unwrap();
        conn.set_request_property("X-A", "v\r\nX-Injected: evil");
        assert!(matches!(
            conn.build_head(),
            Err(RequestError::InvalidHeader { name, .. }) if name == "X-A"
        ));

        conn.set_request_property("X-A", "v\0");
        assert!(conn.build_head().is_err());
    }

    #[test]
    fn head_rejects_invalid_names() {
        for name in ["X A", "X:A", "", "X\r\nY"] {
            let mut conn =
                TcpConnection::open("http://example.com/", "GET", &ClientConfig::default())
                    .unwrap();
            conn.add_request_property(name, "1");
            assert!(
                matches!(conn.build_head(), Err(RequestError::InvalidHeader { .. })),
                "{name:?}"
            );
        }
    }
}
