//! Structured media types, as carried by `Accept` and `Content-Type`.
//!
//! A media type is `type/subtype` followed by optional `;name=value`
//! parameters. Type and subtype are case-insensitive and stored lower-cased.
//! Parameter values keep their casing and any surrounding quotes.

use std::fmt;

use indexmap::IndexMap;

use crate::http::error::HeaderError;

const WILDCARD: &str = "*";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaType {
    type_: String,
    subtype: String,
    params: IndexMap<String, String>,
}

impl MediaType {
    pub fn new(type_: &str, subtype: &str) -> Self {
        Self {
            type_: type_.to_ascii_lowercase(),
            subtype: subtype.to_ascii_lowercase(),
            params: IndexMap::new(),
        }
    }

    pub fn all() -> Self {
        Self::new(WILDCARD, WILDCARD)
    }

    pub fn with_param(mut self, name: &str, value: &str) -> Self {
        self.params
            .insert(name.to_ascii_lowercase(), value.to_string());
        self
    }

    pub fn type_(&self) -> &str {
        &self.type_
    }

    pub fn subtype(&self) -> &str {
        &self.subtype
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn charset(&self) -> Option<&str> {
        self.param("charset").map(unquote)
    }

    /// The `q` parameter, 1.0 when absent or malformed.
    pub fn quality(&self) -> f64 {
        self.param("q")
            .and_then(|q| q.parse::<f64>().ok())
            .filter(|q| (0.0..=1.0).contains(q))
            .unwrap_or(1.0)
    }

    pub fn is_wildcard_type(&self) -> bool {
        self.type_ == WILDCARD
    }

    /// True for `*` and for suffixed wildcards such as `*+xml`.
    pub fn is_wildcard_subtype(&self) -> bool {
        self.subtype == WILDCARD || self.subtype.starts_with("*+")
    }

    pub fn is_concrete(&self) -> bool {
        !self.is_wildcard_type() && !self.is_wildcard_subtype()
    }

    /// Parses a single media type. A bare `*` is read as `*/*`.
    pub fn parse(value: &str) -> Result<Self, HeaderError> {
        let mut parts = split_outside_quotes(value, ';').into_iter();
        let full_type = parts.next().unwrap_or("").trim();
        if full_type.is_empty() {
            return Err(HeaderError::media_type(value, "'mime type' must not be empty"));
        }

        let full_type = if full_type == WILDCARD { "*/*" } else { full_type };
        let (type_, subtype) = full_type
            .split_once('/')
            .ok_or_else(|| HeaderError::media_type(value, "does not contain '/'"))?;
        if subtype.is_empty() {
            return Err(HeaderError::media_type(value, "does not contain subtype after '/'"));
        }
        if !is_token(type_) || !is_token(subtype) {
            return Err(HeaderError::media_type(value, "contains an invalid character"));
        }
        if type_ == WILDCARD && subtype != WILDCARD {
            return Err(HeaderError::media_type(
                value,
                "wildcard type is legal only in '*/*' (all mime types)",
            ));
        }

        let mut media_type = MediaType::new(type_, subtype);
        for param in parts {
            let param = param.trim();
            if param.is_empty() {
                continue;
            }
            let (name, param_value) = param
                .split_once('=')
                .ok_or_else(|| HeaderError::media_type(value, "parameter without '='"))?;
            let name = name.trim();
            if !is_token(name) {
                return Err(HeaderError::media_type(value, "invalid parameter name"));
            }
            media_type = media_type.with_param(name, param_value.trim());
        }
        Ok(media_type)
    }

    /// Parses a comma-separated list. An empty or blank input yields an
    /// empty list.
    pub fn parse_list(value: &str) -> Result<Vec<Self>, HeaderError> {
        split_outside_quotes(value, ',')
            .into_iter()
            .filter(|token| !token.trim().is_empty())
            .map(MediaType::parse)
            .collect()
    }

    /// Parses every header value as a list and flattens the result.
    pub fn parse_all<S: AsRef<str>>(values: &[S]) -> Result<Vec<Self>, HeaderError> {
        let mut result = Vec::new();
        for value in values {
            result.extend(MediaType::parse_list(value.as_ref())?);
        }
        Ok(result)
    }

    pub fn join(types: &[MediaType]) -> String {
        types
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.type_, self.subtype)?;
        for (name, value) in &self.params {
            write!(f, ";{}={}", name, value)?;
        }
        Ok(())
    }
}

impl std::str::FromStr for MediaType {
    type Err = HeaderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MediaType::parse(s)
    }
}

fn unquote(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
}

/// RFC 7230 `token`.
pub(crate) fn is_token(s: &str) -> bool {
    !s.is_empty()
        && s.bytes().all(|b| {
            b.is_ascii_alphanumeric()
                || matches!(
                    b,
                    b'!' | b'#' | b'$' | b'%' | b'&' | b'\'' | b'*' | b'+' | b'-' | b'.' | b'^'
                        | b'_' | b'`' | b'|' | b'~'
                )
        })
}

fn split_outside_quotes(value: &str, sep: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut quoted = false;
    let mut start = 0;
    for (i, c) in value.char_indices() {
        match c {
            '"' => quoted = !quoted,
            c if c == sep && !quoted => {
                parts.push(&value[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(&value[start..]);
    parts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_simple() {
        let mt = MediaType::parse("Text/HTML").unwrap();
        assert_eq!(mt.type_(), "text");
        assert_eq!(mt.subtype(), "html");
        assert_eq!(mt.to_string(), "text/html");
    }

    #[test]
    fn parse_params() {
        let mt = MediaType::parse("text/plain; charset=\"UTF-8\"; q=0.5").unwrap();
        assert_eq!(mt.charset(), Some("UTF-8"));
        assert_eq!(mt.quality(), 0.5);
        assert_eq!(mt.to_string(), "text/plain;charset=\"UTF-8\";q=0.5");
    }

    #[test]
    fn wildcards() {
        assert!(MediaType::parse("*").unwrap().is_wildcard_type());
        assert!(MediaType::parse("*/*").unwrap().is_wildcard_subtype());
        assert!(MediaType::parse("text/*").unwrap().is_wildcard_subtype());
        assert!(MediaType::parse("application/*+xml").unwrap().is_wildcard_subtype());
        assert!(MediaType::parse("text/plain").unwrap().is_concrete());
    }

    #[test]
    fn invalid() {
        assert!(MediaType::parse("").is_err());
        assert!(MediaType::parse("text").is_err());
        assert!(MediaType::parse("text/").is_err());
        assert!(MediaType::parse("*/plain").is_err());
        assert!(MediaType::parse("text/pl ain").is_err());
        assert!(MediaType::parse("text/plain;charset").is_err());
    }

    #[test]
    fn list_respects_quotes() {
        let types = MediaType::parse_list("text/html, application/x;a=\"1,2\", */*;q=0.1").unwrap();
        assert_eq!(types.len(), 3);
        assert_eq!(types[1].param("a"), Some("\"1,2\""));
        assert_eq!(
            MediaType::join(&types),
            "text/html, application/x;a=\"1,2\", */*;q=0.1"
        );
        assert!(MediaType::parse_list("  ").unwrap().is_empty());
    }
}
