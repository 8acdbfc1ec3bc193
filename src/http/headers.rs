//! HTTP headers abstraction for [`BufferingRequest`](crate::client::request::BufferingRequest)
//! and [`ClientResponse`](crate::client::response::ClientResponse).
//!
//! Headers are stored in an ordered map to preserve insertion order. Each
//! name maps to a non-empty list of values, so repeated header fields are
//! kept side by side.
//!
//! Names are case-insensitive: the map is keyed by the lower-cased name and
//! the casing supplied on first insertion is kept for iteration and display.
//!
//! A read-only copy is obtained with [`HttpHeaders::read_only`]. It supports
//! every read and rejects every mutation with [`HeaderError::ReadOnly`].
//!
//! On top of the raw multi-map sit typed accessors for the well-known fields
//! (`Accept`, `Content-Length`, `Content-Type`, dates and `ETag`). Header
//! values themselves are not validated unless a typed setter requires it.

use std::fmt;
use std::hash::{DefaultHasher, Hash, Hasher};

use indexmap::IndexMap;

use crate::http::date;
use crate::http::error::HeaderError;
use crate::http::media_type::MediaType;
use crate::http::names;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct HeaderEntry {
    name: String,
    values: Vec<String>,
}

#[derive(Clone, Default)]
pub struct HttpHeaders {
    headers: IndexMap<String, HeaderEntry>,
    read_only: bool,
}

fn normalize(name: &str) -> String {
    name.to_lowercase()
}

impl HttpHeaders {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a read-only deep copy of `headers`.
    pub fn read_only(headers: &HttpHeaders) -> Self {
        Self {
            headers: headers.headers.clone(),
            read_only: true,
        }
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    fn check_writable(&self) -> Result<(), HeaderError> {
        if self.read_only {
            return Err(HeaderError::ReadOnly);
        }
        Ok(())
    }

    /// Returns the first value of `name`, if any.
    pub fn first(&self, name: &str) -> Option<&str> {
        self.get(name)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// Appends `value` to the values of `name`.
    pub fn add(&mut self, name: &str, value: impl Into<String>) -> Result<(), HeaderError> {
        self.check_writable()?;
        self.headers
            .entry(normalize(name))
            .or_insert_with(|| HeaderEntry {
                name: name.to_string(),
                values: Vec::new(),
            })
            .values
            .push(value.into());
        Ok(())
    }

    /// Replaces the values of `name` with the single `value`.
    pub fn set(&mut self, name: &str, value: impl Into<String>) -> Result<(), HeaderError> {
        self.put(name, vec![value.into()]).map(|_| ())
    }

    /// Calls [`set`](Self::set) for every pair, in iteration order.
    pub fn set_all<I, K, V>(&mut self, values: I) -> Result<(), HeaderError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        self.check_writable()?;
        for (name, value) in values {
            self.set(name.as_ref(), value)?;
        }
        Ok(())
    }

    /// Returns the first value of every header, in insertion order.
    pub fn to_single_value_map(&self) -> IndexMap<String, String> {
        self.headers
            .values()
            .filter_map(|entry| {
                let first = entry.values.first()?;
                Some((entry.name.clone(), first.clone()))
            })
            .collect()
    }

    /// Returns every value of `name` split on `,`, flattened in order.
    ///
    /// Tokens are returned as they appear, without trimming.
    pub fn values_as_list(&self, name: &str) -> Vec<String> {
        self.get(name)
            .map(|values| {
                values
                    .iter()
                    .flat_map(|value| value.split(','))
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    // ===== Map operations =====

    pub fn len(&self) -> usize {
        self.headers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.headers.contains_key(&normalize(name))
    }

    /// True if some header holds exactly `values`.
    pub fn contains_value<S: AsRef<str>>(&self, values: &[S]) -> bool {
        self.headers.values().any(|entry| {
            entry.values.len() == values.len()
                && entry
                    .values
                    .iter()
                    .zip(values)
                    .all(|(a, b)| a == b.as_ref())
        })
    }

    pub fn get(&self, name: &str) -> Option<&[String]> {
        self.headers
            .get(&normalize(name))
            .map(|entry| entry.values.as_slice())
    }

    /// Replaces the values of `name`, returning the previous ones.
    ///
    /// The casing and position of an existing name are kept.
    pub fn put(
        &mut self,
        name: &str,
        values: Vec<String>,
    ) -> Result<Option<Vec<String>>, HeaderError> {
        self.check_writable()?;
        if values.is_empty() {
            return Err(HeaderError::EmptyValues(name.to_string()));
        }
        match self.headers.get_mut(&normalize(name)) {
            Some(entry) => Ok(Some(std::mem::replace(&mut entry.values, values))),
            None => {
                self.headers.insert(
                    normalize(name),
                    HeaderEntry {
                        name: name.to_string(),
                        values,
                    },
                );
                Ok(None)
            }
        }
    }

    pub fn put_all<I, K>(&mut self, headers: I) -> Result<(), HeaderError>
    where
        I: IntoIterator<Item = (K, Vec<String>)>,
        K: AsRef<str>,
    {
        self.check_writable()?;
        let headers: Vec<(K, Vec<String>)> = headers.into_iter().collect();
        if let Some((name, _)) = headers.iter().find(|(_, values)| values.is_empty()) {
            return Err(HeaderError::EmptyValues(name.as_ref().to_string()));
        }
        for (name, values) in headers {
            self.put(name.as_ref(), values)?;
        }
        Ok(())
    }

    pub fn remove(&mut self, name: &str) -> Result<Option<Vec<String>>, HeaderError> {
        self.check_writable()?;
        Ok(self
            .headers
            .shift_remove(&normalize(name))
            .map(|entry| entry.values))
    }

    pub fn clear(&mut self) -> Result<(), HeaderError> {
        self.check_writable()?;
        self.headers.clear();
        Ok(())
    }

    /// Header names, in the casing of their first insertion.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.headers.values().map(|entry| entry.name.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &[String]> {
        self.headers.values().map(|entry| entry.values.as_slice())
    }

    pub fn iter(&self) -> Iter<'_> {
        Iter {
            inner: self.headers.values(),
        }
    }

    // ===== Typed accessors =====

    pub fn set_accept(&mut self, types: &[MediaType]) -> Result<(), HeaderError> {
        self.set(names::ACCEPT, MediaType::join(types))
    }

    /// Every media type listed in `Accept`, or an empty list when unset.
    pub fn accept(&self) -> Result<Vec<MediaType>, HeaderError> {
        match self.get(names::ACCEPT) {
            Some(values) => MediaType::parse_all(values),
            None => Ok(Vec::new()),
        }
    }

    pub fn set_content_length(&mut self, length: u64) -> Result<(), HeaderError> {
        self.set(names::CONTENT_LENGTH, length.to_string())
    }

    /// The body length in bytes, or -1 when unknown.
    pub fn content_length(&self) -> i64 {
        let Some(value) = self.first(names::CONTENT_LENGTH) else {
            return -1;
        };
        match value.trim().parse::<i64>() {
            Ok(length) if length >= 0 => length,
            _ => {
                log::debug!("Ignoring malformed Content-Length {:?}", value);
                -1
            }
        }
    }

    /// Sets `Content-Type`. Wildcard types and subtypes are rejected.
    pub fn set_content_type(&mut self, media_type: &MediaType) -> Result<(), HeaderError> {
        if media_type.is_wildcard_type() {
            return Err(HeaderError::WildcardType);
        }
        if media_type.is_wildcard_subtype() {
            return Err(HeaderError::WildcardSubtype);
        }
        self.set(names::CONTENT_TYPE, media_type.to_string())
    }

    /// `None` when `Content-Type` is unset or empty.
    pub fn content_type(&self) -> Result<Option<MediaType>, HeaderError> {
        match self.first(names::CONTENT_TYPE) {
            Some(value) if !value.is_empty() => MediaType::parse(value).map(Some),
            _ => Ok(None),
        }
    }

    pub fn set_date(&mut self, millis: i64) -> Result<(), HeaderError> {
        self.set_date_header(names::DATE, millis)
    }

    pub fn date(&self) -> Result<i64, HeaderError> {
        self.first_date(names::DATE)
    }

    pub fn set_last_modified(&mut self, millis: i64) -> Result<(), HeaderError> {
        self.set_date_header(names::LAST_MODIFIED, millis)
    }

    pub fn last_modified(&self) -> Result<i64, HeaderError> {
        self.first_date(names::LAST_MODIFIED)
    }

    pub fn set_expires(&mut self, millis: i64) -> Result<(), HeaderError> {
        self.set_date_header(names::EXPIRES, millis)
    }

    pub fn expires(&self) -> Result<i64, HeaderError> {
        self.first_date(names::EXPIRES)
    }

    /// Sets `name` to `millis` (since the epoch) formatted as an HTTP date.
    pub fn set_date_header(&mut self, name: &str, millis: i64) -> Result<(), HeaderError> {
        self.check_writable()?;
        self.set(name, date::format_http_date(millis)?)
    }

    /// Parses the first value of `name` as an HTTP date.
    ///
    /// Returns -1 when the header is absent and an error when it cannot be
    /// parsed.
    pub fn first_date(&self, name: &str) -> Result<i64, HeaderError> {
        let Some(value) = self.first(name) else {
            return Ok(-1);
        };
        date::parse_http_date(value).ok_or_else(|| HeaderError::InvalidDate {
            name: name.to_string(),
            value: value.to_string(),
        })
    }

    /// Like [`first_date`](Self::first_date), but an unparsable value is
    /// reported as -1.
    pub fn first_date_lenient(&self, name: &str) -> i64 {
        self.first_date(name).unwrap_or_else(|err| {
            log::debug!("{}", err);
            -1
        })
    }

    /// Sets `ETag`. The tag must be quoted, optionally behind `W/`.
    pub fn set_etag(&mut self, etag: &str) -> Result<(), HeaderError> {
        if !(etag.starts_with('"') || etag.starts_with("W/")) {
            return Err(HeaderError::InvalidETagStart(etag.to_string()));
        }
        if !etag.ends_with('"') {
            return Err(HeaderError::InvalidETagEnd(etag.to_string()));
        }
        self.set(names::ETAG, etag)
    }

    pub fn etag(&self) -> Option<&str> {
        self.first(names::ETAG)
    }
}

pub struct Iter<'a> {
    inner: indexmap::map::Values<'a, String, HeaderEntry>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = (&'a str, &'a [String]);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner
            .next()
            .map(|entry| (entry.name.as_str(), entry.values.as_slice()))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<'a> IntoIterator for &'a HttpHeaders {
    type Item = (&'a str, &'a [String]);
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Headers are equal when they hold the same values under the same
/// case-insensitive names, regardless of order, casing or read-only state.
impl PartialEq for HttpHeaders {
    fn eq(&self, other: &Self) -> bool {
        self.headers.len() == other.headers.len()
            && self.headers.iter().all(|(key, entry)| {
                other
                    .headers
                    .get(key)
                    .is_some_and(|o| o.values == entry.values)
            })
    }
}

impl Eq for HttpHeaders {}

impl Hash for HttpHeaders {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // order-independent, to agree with PartialEq
        let mut sum: u64 = 0;
        for (key, entry) in &self.headers {
            let mut hasher = DefaultHasher::new();
            key.hash(&mut hasher);
            entry.values.hash(&mut hasher);
            sum = sum.wrapping_add(hasher.finish());
        }
        state.write_usize(self.headers.len());
        state.write_u64(sum);
    }
}

impl fmt::Display for HttpHeaders {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (name, values)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}=[{}]", name, values.join(", "))?;
        }
        f.write_str("}")
    }
}

impl fmt::Debug for HttpHeaders {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}
