#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpStatus {
    Continue = 100,
    SwitchingProtocols = 101,

    Ok = 200,
    Created = 201,
    Accepted = 202,
    NoContent = 204,
    PartialContent = 206,

    MovedPermanently = 301,
    Found = 302,
    SeeOther = 303,
    NotModified = 304,
    TemporaryRedirect = 307,
    PermanentRedirect = 308,

    BadRequest = 400,
    Unauthorized = 401,
    Forbidden = 403,
    NotFound = 404,
    MethodNotAllowed = 405,
    Conflict = 409,
    Gone = 410,
    LengthRequired = 411,
    PreconditionFailed = 412,
    PayloadTooLarge = 413,
    UriTooLong = 414,
    UnsupportedMediaType = 415,
    TooManyRequests = 429,

    InternalServerError = 500,
    NotImplemented = 501,
    BadGateway = 502,
    ServiceUnavailable = 503,
    GatewayTimeout = 504,
    HttpVersionNotSupported = 505,
}

impl HttpStatus {
    pub fn from_code(code: u16) -> Option<HttpStatus> {
        let status = match code {
            100 => Self::Continue,
            101 => Self::SwitchingProtocols,
            200 => Self::Ok,
            201 => Self::Created,
            202 => Self::Accepted,
            204 => Self::NoContent,
            206 => Self::PartialContent,
            301 => Self::MovedPermanently,
            302 => Self::Found,
            303 => Self::SeeOther,
            304 => Self::NotModified,
            307 => Self::TemporaryRedirect,
            308 => Self::PermanentRedirect,
            400 => Self::BadRequest,
            401 => Self::Unauthorized,
            403 => Self::Forbidden,
            404 => Self::NotFound,
            405 => Self::MethodNotAllowed,
            409 => Self::Conflict,
            410 => Self::Gone,
            411 => Self::LengthRequired,
            412 => Self::PreconditionFailed,
            413 => Self::PayloadTooLarge,
            414 => Self::UriTooLong,
            415 => Self::UnsupportedMediaType,
            429 => Self::TooManyRequests,
            500 => Self::InternalServerError,
            501 => Self::NotImplemented,
            502 => Self::BadGateway,
            503 => Self::ServiceUnavailable,
            504 => Self::GatewayTimeout,
            505 => Self::HttpVersionNotSupported,
            _ => return None,
        };
        Some(status)
    }

    pub fn code(self) -> u16 {
        self as u16
    }

    pub fn reason_phrase(self) -> &'static str {
        match self {
            HttpStatus::Continue => "Continue",                                   // 100
            HttpStatus::SwitchingProtocols => "Switching Protocols",              // 101

            HttpStatus::Ok => "OK",                                               // 200
            HttpStatus::Created => "Created",                                     // 201
            HttpStatus::Accepted => "Accepted",                                   // 202
            HttpStatus::NoContent => "No Content",                                // 204
            HttpStatus::PartialContent => "Partial Content",                      // 206

            HttpStatus::MovedPermanently => "Moved Permanently",                  // 301
            HttpStatus::Found => "Found",                                         // 302
            HttpStatus::SeeOther => "See Other",                                  // 303
            HttpStatus::NotModified => "Not Modified",                            // 304
            HttpStatus::TemporaryRedirect => "Temporary Redirect",                // 307
            HttpStatus::PermanentRedirect => "Permanent Redirect",                // 308

            HttpStatus::BadRequest => "Bad Request",                              // 400
            HttpStatus::Unauthorized => "Unauthorized",                           // 401
            HttpStatus::Forbidden => "Forbidden",                                 // 403
            HttpStatus::NotFound => "Not Found",                                  // 404
            HttpStatus::MethodNotAllowed => "Method Not Allowed",                 // 405
            HttpStatus::Conflict => "Conflict",                                   // 409
            HttpStatus::Gone => "Gone",                                           // 410
            HttpStatus::LengthRequired => "Length Required",                      // 411
            HttpStatus::PreconditionFailed => "Precondition Failed",              // 412
            HttpStatus::PayloadTooLarge => "Payload Too Large",                   // 413
            HttpStatus::UriTooLong => "URI Too Long",                             // 414
            HttpStatus::UnsupportedMediaType => "Unsupported Media Type",         // 415
            HttpStatus::TooManyRequests => "Too Many Requests",                   // 429

            HttpStatus::InternalServerError => "Internal Server Error",           // 500
            HttpStatus::NotImplemented => "Not Implemented",                      // 501
            HttpStatus::BadGateway => "Bad Gateway",                              // 502
            HttpStatus::ServiceUnavailable => "Service Unavailable",              // 503
            HttpStatus::GatewayTimeout => "Gateway Timeout",                      // 504
            HttpStatus::HttpVersionNotSupported => "HTTP Version Not Supported",  // 505
        }
    }

    pub fn is_success(self) -> bool {
        (200..300).contains(&self.code())
    }

    /// Responses with these statuses never carry a body.
    pub fn forbids_body(code: u16) -> bool {
        (100..200).contains(&code) || code == 204 || code == 304
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_code() {
        assert_eq!(HttpStatus::from_code(404), Some(HttpStatus::NotFound));
        assert_eq!(HttpStatus::from_code(299), None);
        assert_eq!(HttpStatus::NotFound.code(), 404);
        assert_eq!(HttpStatus::UriTooLong.reason_phrase(), "URI Too Long");
        assert!(HttpStatus::NoContent.is_success());
        assert!(HttpStatus::forbids_body(304));
        assert!(!HttpStatus::forbids_body(200));
    }
}
