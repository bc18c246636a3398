//! The header table shared by requests and responses.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use log::debug;

/// Header names the server recognizes.
///
/// Anything outside this set is dropped while parsing. Names are matched
/// case-sensitively, exactly as they are written here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum HeaderName {
    Allow,
    AcceptEncoding,
    ContentEncoding,
    ContentType,
    ContentLength,
    UserAgent,
    Connection,
}

impl HeaderName {
    pub fn as_str(&self) -> &'static str {
        match self {
            HeaderName::Allow => "Allow",
            HeaderName::AcceptEncoding => "Accept-Encoding",
            HeaderName::ContentEncoding => "Content-Encoding",
            HeaderName::ContentType => "Content-Type",
            HeaderName::ContentLength => "Content-Length",
            HeaderName::UserAgent => "User-Agent",
            HeaderName::Connection => "Connection",
        }
    }
}

/// Returned when a header name is not in the recognized set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownHeader(pub String);

impl FromStr for HeaderName {
    type Err = UnknownHeader;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Allow" => Ok(HeaderName::Allow),
            "Accept-Encoding" => Ok(HeaderName::AcceptEncoding),
            "Content-Encoding" => Ok(HeaderName::ContentEncoding),
            "Content-Type" => Ok(HeaderName::ContentType),
            "Content-Length" => Ok(HeaderName::ContentLength),
            "User-Agent" => Ok(HeaderName::UserAgent),
            "Connection" => Ok(HeaderName::Connection),
            _ => Err(UnknownHeader(s.to_string())),
        }
    }
}

impl fmt::Display for HeaderName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A mapping from header name to one or more values.
///
/// A name is never kept with zero values. Repeated headers append to the
/// existing values; [`Headers::set`] replaces them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    entries: BTreeMap<HeaderName, Vec<String>>,
}

impl Headers {
    /// Create an empty header table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a header table from raw header lines.
    ///
    /// Each line is split on its first `": "` (or bare `":"`). Lines without a
    /// separator, lines naming an unrecognized header and `Content-Length`
    /// values that are not a non-negative integer are skipped; none of them
    /// fail the parse. `Accept-Encoding` is split into trimmed tokens.
    pub fn parse<'a, I>(lines: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut headers = Self::new();

        for line in lines {
            let (name, value) = match split_header_line(line) {
                Some(parts) => parts,
                None => {
                    debug!("cannot parse header line, skipping: {line:?}");
                    continue;
                }
            };

            let name = match HeaderName::from_str(name) {
                Ok(name) => name,
                Err(UnknownHeader(name)) => {
                    debug!("unrecognized header, skipping: {name}");
                    continue;
                }
            };

            match name {
                HeaderName::AcceptEncoding => {
                    value
                        .split(',')
                        .map(str::trim)
                        .filter(|token| !token.is_empty())
                        .for_each(|token| headers.append(name, token));
                }
                HeaderName::ContentLength => match value.trim().parse::<usize>() {
                    Ok(length) => headers.set(name, length.to_string()),
                    Err(_) => debug!("invalid Content-Length, skipping: {value:?}"),
                },
                _ => headers.append(name, value),
            }
        }

        headers
    }

    /// The first value registered for `name`.
    pub fn get(&self, name: HeaderName) -> Option<&str> {
        self.entries
            .get(&name)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// All values registered for `name`, in insertion order.
    pub fn get_all(&self, name: HeaderName) -> &[String] {
        self.entries.get(&name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains(&self, name: HeaderName) -> bool {
        self.entries.contains_key(&name)
    }

    /// Whether one of the values of `name` equals `token` exactly.
    pub fn contains_token(&self, name: HeaderName, token: &str) -> bool {
        self.get_all(name).iter().any(|value| value == token)
    }

    /// The parsed `Content-Length`, if present.
    pub fn content_length(&self) -> Option<usize> {
        self.get(HeaderName::ContentLength)
            .and_then(|value| value.parse().ok())
    }

    /// Add a value, keeping the ones already registered.
    pub fn append(&mut self, name: HeaderName, value: impl Into<String>) {
        self.entries.entry(name).or_default().push(value.into());
    }

    /// Replace all values of `name` with `value`.
    pub fn set(&mut self, name: HeaderName, value: impl Into<String>) {
        self.entries.insert(name, vec![value.into()]);
    }

    /// Remove `name`, returning its values.
    pub fn remove(&mut self, name: HeaderName) -> Option<Vec<String>> {
        self.entries.remove(&name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (HeaderName, &[String])> {
        self.entries
            .iter()
            .map(|(name, values)| (*name, values.as_slice()))
    }

    /// Serialize to wire form: one `Name: value\r\n` line per name, with
    /// multiple values comma-joined.
    pub fn to_wire(&self) -> String {
        let mut wire = String::new();
        for (name, values) in self.iter() {
            wire.push_str(name.as_str());
            wire.push_str(": ");
            wire.push_str(&values.join(", "));
            wire.push_str("\r\n");
        }
        wire
    }
}

fn split_header_line(line: &str) -> Option<(&str, &str)> {
    line.split_once(": ")
        .or_else(|| line.split_once(':'))
        .map(|(name, value)| (name, value.trim()))
}
