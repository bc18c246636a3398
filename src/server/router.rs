//! Path and method dispatch.
//!
//! Routes are keyed by a pattern and a method. A pattern is either an exact
//! path or a one-level prefix:
//!
//! - `/` and any pattern without a trailing slash match the request path
//!   exactly.
//! - `/echo/` and `/echo/*` match every path whose first segment is `echo`,
//!   however deep the rest of the path goes (`/echo/abc`, `/echo/a/b`).
//!
//! Exact patterns win over prefix patterns when both match the same path.

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::future::Future;

use log::info;

use crate::parser::{HttpRequest, Method};
use crate::server::error::Error;
use crate::server::handler::Route;
use crate::server::response::HttpResponse;

/// A registered route key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pattern {
    /// Matches a path equal to the string.
    Exact(String),
    /// Matches a path whose base path equals the string, which always has
    /// the form `/segment/`.
    Prefix(String),
}

impl Pattern {
    /// Parse a pattern as written at registration.
    pub fn parse(pattern: &str) -> Result<Self, Error> {
        if !pattern.starts_with('/') {
            return Err(Error::InvalidPattern(pattern.to_string()));
        }
        if pattern == "/" {
            return Ok(Pattern::Exact(pattern.to_string()));
        }

        let prefix = pattern.strip_suffix('*').unwrap_or(pattern);
        if prefix.ends_with('/') {
            // Only one level of nesting below the root is supported
            if prefix.len() < 3 || prefix[1..prefix.len() - 1].contains('/') {
                return Err(Error::InvalidPattern(pattern.to_string()));
            }
            return Ok(Pattern::Prefix(prefix.to_string()));
        }
        if prefix.len() != pattern.len() {
            // A wildcard that does not follow a slash
            return Err(Error::InvalidPattern(pattern.to_string()));
        }

        Ok(Pattern::Exact(pattern.to_string()))
    }

    /// Check whether the pattern matches a request path.
    pub fn matches(&self, path: &str) -> bool {
        match self {
            Pattern::Exact(exact) => exact == path,
            Pattern::Prefix(prefix) => base_path(path) == prefix,
        }
    }

    fn is_exact(&self) -> bool {
        matches!(self, Pattern::Exact(_))
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pattern::Exact(path) | Pattern::Prefix(path) => f.write_str(path),
        }
    }
}

/// The first path segment plus its trailing slash, or the whole path when it
/// has no second slash.
///
/// `/files/a/b` and `/files/a` both reduce to `/files/`.
pub fn base_path(path: &str) -> &str {
    match path.get(1..).and_then(|rest| rest.find('/')) {
        Some(slash) => &path[..slash + 2],
        None => path,
    }
}

/// One pattern with the handlers registered for each method.
struct RouteEntry {
    pattern: Pattern,
    methods: HashMap<Method, Route>,
}

/// The outcome of looking up a request.
pub enum Resolution<'a> {
    /// A handler is registered for the path and method.
    Found(&'a Route),
    /// The path is known but not for this method; carries every method that
    /// is registered for it.
    MethodNotAllowed(Vec<Method>),
    /// No pattern matches the path.
    NotFound,
}

/// The dispatch table.
///
/// Built once at startup; the server only reads it afterwards.
#[derive(Default)]
pub struct Router {
    entries: Vec<RouteEntry>,
}

impl Router {
    /// Create an empty router.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for a pattern and method.
    ///
    /// Registering the same pattern and method twice is an error.
    pub fn add_route<F, Fut>(&mut self, pattern: &str, method: Method, handler: F) -> Result<(), Error>
    where
        F: Fn(HttpRequest) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<HttpResponse, Error>> + Send + 'static,
    {
        self.insert(pattern, method, Route::new(handler, false))
    }

    /// Register a handler whose response body is gzip-compressed when the
    /// client accepts it.
    pub fn add_compressed_route<F, Fut>(&mut self, pattern: &str, method: Method, handler: F) -> Result<(), Error>
    where
        F: Fn(HttpRequest) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<HttpResponse, Error>> + Send + 'static,
    {
        self.insert(pattern, method, Route::new(handler, true))
    }

    fn insert(&mut self, pattern: &str, method: Method, route: Route) -> Result<(), Error> {
        let pattern = Pattern::parse(pattern)?;

        let index = match self.entries.iter().position(|entry| entry.pattern == pattern) {
            Some(index) => index,
            None => {
                self.entries.push(RouteEntry {
                    pattern: pattern.clone(),
                    methods: HashMap::new(),
                });
                self.entries.len() - 1
            }
        };

        let entry = &mut self.entries[index];
        if entry.methods.contains_key(&method) {
            return Err(Error::DuplicateRoute {
                method,
                pattern: pattern.to_string(),
            });
        }
        entry.methods.insert(method, route);

        info!("path registered: {method} {pattern}");
        Ok(())
    }

    /// Find the handler for a request path and method.
    pub fn resolve(&self, path: &str, method: Method) -> Resolution<'_> {
        // Exact patterns are consulted before prefix patterns
        let mut matching: Vec<&RouteEntry> = self
            .entries
            .iter()
            .filter(|entry| entry.pattern.matches(path))
            .collect();
        matching.sort_by_key(|entry| !entry.pattern.is_exact());

        if matching.is_empty() {
            return Resolution::NotFound;
        }

        if let Some(route) = matching.iter().find_map(|entry| entry.methods.get(&method)) {
            return Resolution::Found(route);
        }

        let allowed: BTreeSet<Method> = matching
            .iter()
            .flat_map(|entry| entry.methods.keys().copied())
            .collect();
        Resolution::MethodNotAllowed(allowed.into_iter().collect())
    }

    /// Registered patterns and their methods, in registration order.
    pub fn routes(&self) -> impl Iterator<Item = (&Pattern, Vec<Method>)> {
        self.entries.iter().map(|entry| {
            let methods: BTreeSet<Method> = entry.methods.keys().copied().collect();
            (&entry.pattern, methods.into_iter().collect())
        })
    }
}
