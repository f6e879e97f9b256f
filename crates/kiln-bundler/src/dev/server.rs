//! HTTP side of the dev server.

use std::fs;
use std::path::{Component, Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};
use std::thread;

use tiny_http::{Header, Request, Response, Server};
use tracing::{debug, warn};

use crate::build::BuildOutput;
use crate::bundle::STATUS_PATH;
use crate::error::{Error, Result};

/// Latest successful build, shared between the rebuild loop and handlers.
#[derive(Debug, Clone, Default)]
pub struct ArtifactStore {
    current: Arc<RwLock<Option<Arc<BuildOutput>>>>,
}

impl ArtifactStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn publish(&self, output: BuildOutput) {
        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
        *current = Some(Arc::new(output));
    }

    pub fn current(&self) -> Option<Arc<BuildOutput>> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Current build id for the live-reload client.
    Status(String),
    Memory {
        content: Vec<u8>,
        content_type: &'static str,
    },
    File(PathBuf),
    NotFound,
}

/// Decide what answers `url`: in-memory artifacts first, then each static
/// root in order.
pub fn route(url: &str, store: &ArtifactStore, static_roots: &[PathBuf]) -> Reply {
    let path = url.split(['?', '#']).next().unwrap_or_default();
    if path == STATUS_PATH {
        let id = store
            .current()
            .map(|output| output.build_id.clone())
            .unwrap_or_else(|| "pending".into());
        return Reply::Status(id);
    }

    let current = store.current();
    let relative = path.trim_start_matches('/');
    let relative = if relative.is_empty() {
        current
            .as_ref()
            .and_then(|output| output.html_filename.clone())
            .unwrap_or_else(|| "index.html".into())
    } else {
        relative.to_owned()
    };
    if !is_safe(Path::new(&relative)) {
        return Reply::NotFound;
    }

    if let Some(artifact) = current.as_ref().and_then(|output| output.get(&relative)) {
        return Reply::Memory {
            content: artifact.content.clone(),
            content_type: content_type(&relative),
        };
    }
    static_roots
        .iter()
        .map(|root| root.join(&relative))
        .find(|candidate| candidate.is_file())
        .map_or(Reply::NotFound, Reply::File)
}

fn is_safe(path: &Path) -> bool {
    path.components().all(|c| matches!(c, Component::Normal(_)))
}

pub fn content_type(name: &str) -> &'static str {
    let ext = Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    match ext.as_str() {
        "html" => "text/html; charset=utf-8",
        "js" | "mjs" => "application/javascript; charset=utf-8",
        "css" => "text/css; charset=utf-8",
        "json" | "map" => "application/json",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "ico" => "image/x-icon",
        "woff" => "font/woff",
        "woff2" => "font/woff2",
        "ttf" => "font/ttf",
        "eot" => "application/vnd.ms-fontobject",
        "txt" => "text/plain; charset=utf-8",
        _ => "application/octet-stream",
    }
}

pub struct DevServer {
    server: Arc<Server>,
    store: ArtifactStore,
    static_roots: Vec<PathBuf>,
}

impl DevServer {
    pub fn bind(address: &str, store: ArtifactStore, static_roots: Vec<PathBuf>) -> Result<Self> {
        let server = Server::http(address).map_err(|e| Error::Server(format!("{address}: {e}")))?;
        Ok(Self {
            server: Arc::new(server),
            store,
            static_roots,
        })
    }

    /// Bound address, with the real port when bound to port 0.
    pub fn local_addr(&self) -> String {
        self.server
            .server_addr()
            .to_ip()
            .map(|addr| addr.to_string())
            .unwrap_or_default()
    }

    /// Answer requests on `workers` threads until [`DevServer::unblock`].
    pub fn serve(&self, workers: usize) {
        thread::scope(|scope| {
            for _ in 0..workers.max(1) {
                scope.spawn(|| {
                    while let Ok(request) = self.server.recv() {
                        self.respond(request);
                    }
                    // One wake-up per call; hand it on to the next worker.
                    self.server.unblock();
                });
            }
        });
    }

    /// Wake every worker blocked in [`DevServer::serve`] so it returns.
    pub fn unblock(&self) {
        self.server.unblock();
    }

    fn respond(&self, request: Request) {
        let url = request.url().to_owned();
        let reply = route(&url, &self.store, &self.static_roots);
        debug!(url = %url, kind = reply_kind(&reply), "request");
        let result = match reply {
            Reply::Status(id) => {
                let response = with_header(Response::from_string(id), "Content-Type", "text/plain");
                request.respond(with_header(response, "Cache-Control", "no-store"))
            }
            Reply::Memory {
                content,
                content_type,
            } => request.respond(with_header(
                Response::from_data(content),
                "Content-Type",
                content_type,
            )),
            Reply::File(path) => match fs::read(&path) {
                Ok(content) => request.respond(with_header(
                    Response::from_data(content),
                    "Content-Type",
                    content_type(&path.to_string_lossy()),
                )),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "static file unreadable");
                    request.respond(Response::from_string("not found").with_status_code(404))
                }
            },
            Reply::NotFound => {
                request.respond(Response::from_string("not found").with_status_code(404))
            }
        };
        if let Err(e) = result {
            debug!(url = %url, error = %e, "client went away");
        }
    }
}

fn reply_kind(reply: &Reply) -> &'static str {
    match reply {
        Reply::Status(_) => "status",
        Reply::Memory { .. } => "memory",
        Reply::File(_) => "file",
        Reply::NotFound => "not-found",
    }
}

fn with_header<R: std::io::Read>(response: Response<R>, name: &str, value: &str) -> Response<R> {
    match Header::from_bytes(name.as_bytes(), value.as_bytes()) {
        Ok(header) => response.with_header(header),
        Err(()) => response,
    }
}
