//! Incremental HTTP/1.x response parser.
//!
//! Bytes are fed as they arrive from the stream; the parser keeps whatever
//! it cannot consume yet and moves through the status line, the header
//! block and the body. Bodies are delimited by `Content-Length` or, when it
//! is absent, by the peer closing the connection (see [`ResponseParser::finish`]).
//! Chunked transfer coding is not supported.

use crate::http::headers::HttpHeaders;
use crate::http::names;
use crate::http::status::HttpStatus;

#[derive(Debug, Default)]
pub struct ParsedResponse {
    pub status: u16,
    pub reason: String,
    pub headers: HttpHeaders,
    pub body: Vec<u8>,
}

#[derive(PartialEq, Debug)]
pub enum ParserOk {
    Incomplete,
    Done,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParserError {
    #[error("malformed status line")]
    MalformedStatusLine,

    #[error("unsupported HTTP version {0:?}")]
    UnsupportedVersion(String),

    #[error("malformed header field")]
    MalformedHeader,

    #[error("response head exceeds {0} bytes")]
    HeadersTooLarge(usize),

    #[error("invalid Content-Length")]
    InvalidContentLength,

    #[error("unsupported transfer coding {0:?}")]
    UnsupportedTransferEncoding(String),

    #[error("connection closed before the response was complete")]
    UnexpectedEof,
}

#[derive(PartialEq, PartialOrd, Debug)]
enum ParserState {
    StatusLine,
    Headers,
    Body,
    Done,
}

pub struct ResponseParser {
    buf: Vec<u8>,
    state: ParserState,
    expect_body: bool,
    max_header_size: usize,
    head_size: usize,
    content_length: Option<usize>,
    response: ParsedResponse,
}

impl ResponseParser {
    /// `expect_body` is false for responses to HEAD requests.
    pub fn new(expect_body: bool, max_header_size: usize) -> Self {
        Self {
            buf: Vec::new(),
            state: ParserState::StatusLine,
            expect_body,
            max_header_size,
            head_size: 0,
            content_length: None,
            response: ParsedResponse::default(),
        }
    }

    pub fn is_done(&self) -> bool {
        self.state == ParserState::Done
    }

    pub fn feed(&mut self, data: &[u8]) -> Result<ParserOk, ParserError> {
        self.buf.extend_from_slice(data);

        // Iteratively parse based on current state while data is available
        loop {
            match self.state {
                ParserState::StatusLine | ParserState::Headers => {
                    let Some(line_end) = find_crlf(&self.buf) else {
                        self.check_head_size(self.head_size + self.buf.len())?;
                        return Ok(ParserOk::Incomplete);
                    };
                    self.head_size += line_end + 2;
                    self.check_head_size(self.head_size)?;

                    let line = self.buf[..line_end].to_vec();
                    self.buf.drain(..line_end + 2);

                    if self.state == ParserState::StatusLine {
                        self.parse_status_line(&line)?;
                        self.state = ParserState::Headers;
                    } else if line.is_empty() {
                        self.on_headers_done()?;
                    } else {
                        self.parse_header(&line)?;
                    }
                }
                ParserState::Body => return Ok(self.parse_body()),
                ParserState::Done => return Ok(ParserOk::Done),
            }
        }
    }

    /// Signals that the peer closed the connection.
    pub fn finish(&mut self) -> Result<(), ParserError> {
        match self.state {
            ParserState::Done => Ok(()),
            ParserState::Body if self.content_length.is_none() => {
                self.state = ParserState::Done;
                Ok(())
            }
            _ => Err(ParserError::UnexpectedEof),
        }
    }

    pub fn into_response(self) -> ParsedResponse {
        self.response
    }

    fn check_head_size(&self, size: usize) -> Result<(), ParserError> {
        if size > self.max_header_size {
            return Err(ParserError::HeadersTooLarge(self.max_header_size));
        }
        Ok(())
    }

    // Status line: HTTP/<major>.<minor> <code> [<reason>]
    fn parse_status_line(&mut self, line: &[u8]) -> Result<(), ParserError> {
        let line = std::str::from_utf8(line).map_err(|_| ParserError::MalformedStatusLine)?;
        let (version, rest) = line
            .split_once(' ')
            .ok_or(ParserError::MalformedStatusLine)?;
        if !matches!(version, "HTTP/1.0" | "HTTP/1.1") {
            return Err(ParserError::UnsupportedVersion(version.to_string()));
        }

        let (code, reason) = rest.split_once(' ').unwrap_or((rest, ""));
        if code.len() != 3 || !code.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ParserError::MalformedStatusLine);
        }
        let status = code
            .parse::<u16>()
            .map_err(|_| ParserError::MalformedStatusLine)?;
        if status < 100 {
            return Err(ParserError::MalformedStatusLine);
        }

        self.response.status = status;
        self.response.reason = reason.trim().to_string();
        Ok(())
    }

    fn parse_header(&mut self, line: &[u8]) -> Result<(), ParserError> {
        // obsolete line folding is not accepted
        if line.starts_with(b" ") || line.starts_with(b"\t") {
            return Err(ParserError::MalformedHeader);
        }
        let line = std::str::from_utf8(line).map_err(|_| ParserError::MalformedHeader)?;
        let (name, value) = line.split_once(':').ok_or(ParserError::MalformedHeader)?;
        if name.is_empty() || name.ends_with(char::is_whitespace) {
            return Err(ParserError::MalformedHeader);
        }

        self.response
            .headers
            .add(name, value.trim())
            .map_err(|_| ParserError::MalformedHeader)
    }

    fn on_headers_done(&mut self) -> Result<(), ParserError> {
        if !self.expect_body || HttpStatus::forbids_body(self.response.status) {
            self.state = ParserState::Done;
            return Ok(());
        }

        let headers = &self.response.headers;
        if let Some(coding) = headers
            .values_as_list(names::TRANSFER_ENCODING)
            .into_iter()
            .map(|token| token.trim().to_ascii_lowercase())
            .find(|token| !token.is_empty() && token != "identity")
        {
            return Err(ParserError::UnsupportedTransferEncoding(coding));
        }

        self.content_length = match headers.get(names::CONTENT_LENGTH) {
            None => None,
            Some(values) => {
                let mut lengths = values.iter().map(|v| v.trim().parse::<usize>());
                let first = lengths
                    .next()
                    .and_then(Result::ok)
                    .ok_or(ParserError::InvalidContentLength)?;
                // repeated values must agree
                if lengths.any(|l| l != Ok(first)) {
                    return Err(ParserError::InvalidContentLength);
                }
                Some(first)
            }
        };

        self.state = match self.content_length {
            Some(0) => ParserState::Done,
            _ => ParserState::Body,
        };
        log::debug!(
            "Response head parsed: {} {}, body length {:?}",
            self.response.status,
            self.response.reason,
            self.content_length
        );
        Ok(())
    }

    fn parse_body(&mut self) -> ParserOk {
        let body = &mut self.response.body;
        match self.content_length {
            Some(length) => {
                let to_copy = std::cmp::min(self.buf.len(), length - body.len());
                body.extend(self.buf.drain(..to_copy));
                if body.len() == length {
                    self.state = ParserState::Done;
                    return ParserOk::Done;
                }
            }
            None => body.append(&mut self.buf),
        }
        ParserOk::Incomplete
    }
}

fn find_crlf(buf: &[u8]) -> Option<usize> {
    buf.windows(2).position(|w| w == b"\r\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_all(input: &[u8]) -> Result<ParsedResponse, ParserError> {
        let mut parser = ResponseParser::new(true, 1024);
        parser.feed(input)?;
        parser.finish()?;
        Ok(parser.into_response())
    }

    #[test]
    fn content_length_body() {
        let res = parse_all(
            b"HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\nContent-Length: 5\r\n\r\nhello",
        )
        .unwrap();
        assert_eq!(res.status, 200);
        assert_eq!(res.reason, "OK");
        assert_eq!(res.headers.first("content-type"), Some("text/plain"));
        assert_eq!(res.body, b"hello");
    }

    #[test]
    fn byte_by_byte() {
        let input = b"HTTP/1.0 404 Not Found\r\nContent-Length: 3\r\nX-A: 1\r\nx-a: 2\r\n\r\nabcTRAILING";
        let mut parser = ResponseParser::new(true, 1024);
        let mut outcome = ParserOk::Incomplete;
        for b in input.iter() {
            outcome = parser.feed(std::slice::from_ref(b)).unwrap();
        }
        assert_eq!(outcome, ParserOk::Done);
        let res = parser.into_response();
        assert_eq!(res.status, 404);
        assert_eq!(res.reason, "Not Found");
        assert_eq!(res.headers.get("X-A").unwrap(), ["1", "2"]);
        assert_eq!(res.body, b"abc");
    }

    #[test]
    fn close_delimited_body() {
        let mut parser = ResponseParser::new(true, 1024);
        assert_eq!(parser.feed(b"HTTP/1.1 200 OK\r\n\r\npart one, ").unwrap(), ParserOk::Incomplete);
        assert_eq!(parser.feed(b"part two").unwrap(), ParserOk::Incomplete);
        parser.finish().unwrap();
        assert!(parser.is_done());
        assert_eq!(parser.into_response().body, b"part one, part two");
    }

    #[test]
    fn no_body_for_head_and_204() {
        let mut parser = ResponseParser::new(false, 1024);
        assert_eq!(
            parser.feed(b"HTTP/1.1 200 OK\r\nContent-Length: 10\r\n\r\n").unwrap(),
            ParserOk::Done
        );

        let res = parse_all(b"HTTP/1.1 204 No Content\r\n\r\n").unwrap();
        assert_eq!(res.status, 204);
        assert!(res.body.is_empty());
    }

    #[test]
    fn missing_reason_phrase() {
        let res = parse_all(b"HTTP/1.1 200\r\nContent-Length: 0\r\n\r\n").unwrap();
        assert_eq!(res.status, 200);
        assert_eq!(res.reason, "");
    }

    #[test]
    fn errors() {
        assert_eq!(
            parse_all(b"HTTP/2 200 OK\r\n\r\n").unwrap_err(),
            ParserError::UnsupportedVersion("HTTP/2".to_string())
        );
        assert_eq!(
            parse_all(b"HTTP/1.1 2000 OK\r\n\r\n").unwrap_err(),
            ParserError::MalformedStatusLine
        );
        assert_eq!(
            parse_all(b"HTTP/1.1 200 OK\r\nNoColon\r\n\r\n").unwrap_err(),
            ParserError::MalformedHeader
        );
        assert_eq!(
            parse_all(b"HTTP/1.1 200 OK\r\nContent-Length: x\r\n\r\n").unwrap_err(),
            ParserError::InvalidContentLength
        );
        assert_eq!(
            parse_all(b"HTTP/1.1 200 OK\r\nContent-Length: 1\r\nContent-Length: 2\r\n\r\n").unwrap_err(),
            ParserError::InvalidContentLength
        );
        assert_eq!(
            parse_all(b"HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\n\r\n").unwrap_err(),
            ParserError::UnsupportedTransferEncoding("chunked".to_string())
        );
        assert_eq!(
            parse_all(b"HTTP/1.1 200 OK\r\nContent-Length: 10\r\n\r\nshort").unwrap_err(),
            ParserError::UnexpectedEof
        );
        assert_eq!(
            parse_all(b"HTTP/1.1 200 OK\r\nContent-").unwrap_err(),
            ParserError::UnexpectedEof
        );
    }

    #[test]
    fn head_too_large() {
        let mut parser = ResponseParser::new(true, 32);
        let err = parser
            .feed(b"HTTP/1.1 200 OK\r\nX-Long: aaaaaaaaaaaaaaaaaaaa\r\n\r\n")
            .unwrap_err();
        assert_eq!(err, ParserError::HeadersTooLarge(32));
    }
}
