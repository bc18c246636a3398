//! The stock routes served by the `rawhttpd` binary.
//!
//! | Route               | Behaviour                                         |
//! |---------------------|---------------------------------------------------|
//! | `GET /`             | empty 200                                         |
//! | `GET /echo/<s>`     | `<s>` as text, gzip-compressed when accepted      |
//! | `GET /user-agent`   | the client's `User-Agent`                         |
//! | `GET /files/<f>`    | contents of `<f>` in the served directory         |
//! | `POST /files/<f>`   | create `<f>` from the request body                |

use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use log::{info, warn};
use serde::{Deserialize, Serialize};
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;

use crate::parser::{HeaderName, HttpRequest, Method};
use crate::server::{Error, HttpResponse, Router, StatusCode};

mod tests;

const ECHO_PREFIX: &str = "/echo/";
const FILES_PREFIX: &str = "/files/";

/// Respond with 200 and no body.
pub async fn root(_req: HttpRequest) -> Result<HttpResponse, Error> {
    Ok(HttpResponse::new(StatusCode::Ok))
}

/// Respond with the part of the target after `/echo/`.
pub async fn echo(req: HttpRequest) -> Result<HttpResponse, Error> {
    let text = req.target.strip_prefix(ECHO_PREFIX).unwrap_or_default();

    Ok(HttpResponse::new(StatusCode::Ok)
        .with_content_type("text/plain")
        .with_body_string(text))
}

/// Respond with the `User-Agent` header, or 404 when the client sent none.
pub async fn user_agent(req: HttpRequest) -> Result<HttpResponse, Error> {
    let Some(agent) = req.header(HeaderName::UserAgent) else {
        return Ok(HttpResponse::new(StatusCode::NotFound).with_body_bytes(Vec::new()));
    };

    Ok(HttpResponse::new(StatusCode::Ok)
        .with_content_type("text/plain")
        .with_body_string(agent))
}

/// The directory the `/files/` routes read from and write to.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServeDir {
    /// Directory files are served from.
    pub directory: PathBuf,
    /// Largest body accepted by `POST /files/`, in bytes.
    pub max_file_size: usize,
}

impl Default for ServeDir {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("/tmp/data/codecrafters.io/http-server-tester/"),
            max_file_size: 1_000_000,
        }
    }
}

impl ServeDir {
    pub fn new(directory: impl Into<PathBuf>, max_file_size: usize) -> Self {
        Self {
            directory: directory.into(),
            max_file_size,
        }
    }

    /// Map a request path under `/files/` to a file inside the directory.
    ///
    /// Returns `None` for an empty name or one that would leave the directory.
    fn file_path(&self, req: &HttpRequest) -> Option<PathBuf> {
        let name = req.path().strip_prefix(FILES_PREFIX)?;
        let name = Path::new(name);

        let contained = name
            .components()
            .all(|component| matches!(component, Component::Normal(_)));
        if name.as_os_str().is_empty() || !contained {
            return None;
        }

        Some(self.directory.join(name))
    }

    /// Serve a file as `application/octet-stream`.
    pub async fn read_file(&self, req: HttpRequest) -> Result<HttpResponse, Error> {
        let not_found = || -> Result<HttpResponse, Error> {
            Ok(HttpResponse::new(StatusCode::NotFound).with_body_bytes(Vec::new()))
        };

        let Some(path) = self.file_path(&req) else {
            warn!("rejected file name in {target}", target = req.target);
            return not_found();
        };

        let data = match tokio::fs::read(&path).await {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!("file not found: {}", path.display());
                return not_found();
            }
            Err(e) => return Err(Error::IoError(e)),
        };

        Ok(HttpResponse::new(StatusCode::Ok)
            .with_content_type("application/octet-stream")
            .with_body_bytes(data))
    }

    /// Create a new file from the request body.
    ///
    /// Existing files are never overwritten.
    pub async fn write_file(&self, req: HttpRequest) -> Result<HttpResponse, Error> {
        let respond = |status: StatusCode| -> Result<HttpResponse, Error> {
            Ok(HttpResponse::new(status).with_body_bytes(Vec::new()))
        };

        let Some(length) = req.content_length() else {
            warn!("content-length header not received");
            return respond(StatusCode::LengthRequired);
        };
        if length > self.max_file_size {
            warn!("content too large: {length} > {max} bytes", max = self.max_file_size);
            return respond(StatusCode::ContentTooLarge);
        }
        if req.body.len() < length {
            warn!("incomplete body: {received} of {length} bytes", received = req.body.len());
            return respond(StatusCode::BadRequest);
        }

        let Some(path) = self.file_path(&req) else {
            warn!("rejected file name in {target}", target = req.target);
            return respond(StatusCode::Forbidden);
        };

        let mut file = match OpenOptions::new().write(true).create_new(true).open(&path).await {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                warn!("file already exists: {}", path.display());
                return respond(StatusCode::Forbidden);
            }
            Err(e) => {
                warn!("error creating file {}: {e}", path.display());
                return respond(StatusCode::InternalServerError);
            }
        };

        let written = async {
            file.write_all(&req.body).await?;
            file.flush().await
        };
        if let Err(e) = written.await {
            warn!("error writing to file {}: {e}", path.display());
            return respond(StatusCode::InternalServerError);
        }

        info!("{length} bytes written to {}", path.display());
        respond(StatusCode::Created)
    }
}

/// Build the router with every stock route, file routes backed by `serve_dir`.
pub fn routes(serve_dir: ServeDir) -> Result<Router, Error> {
    let serve_dir = Arc::new(serve_dir);
    let mut router = Router::new();

    router.add_route("/", Method::GET, root)?;
    router.add_route("/user-agent", Method::GET, user_agent)?;
    router.add_compressed_route(ECHO_PREFIX, Method::GET, echo)?;

    let dir = serve_dir.clone();
    router.add_route(FILES_PREFIX, Method::GET, move |req| {
        let dir = dir.clone();
        async move { dir.read_file(req).await }
    })?;

    let dir = serve_dir;
    router.add_route(FILES_PREFIX, Method::POST, move |req| {
        let dir = dir.clone();
        async move { dir.write_file(req).await }
    })?;

    Ok(router)
}
