//! Offline support.
//!
//! Writes `sw.js`, a service worker that precaches the site shell on install.
//! Pages are served network first and fall back to the cache, then to the app
//! shell page. Other same-origin files are served cache first.

use std::{
    fs,
    path::{Path, PathBuf},
};

use thiserror::Error;
use tracing::debug;

use crate::{
    pipeline::OfflineOptions,
    template::{Template, TemplateContext, TemplateError},
};

/// File name of the service worker in the output root.
pub const SERVICE_WORKER_FILE: &str = "sw.js";

/// Offline support errors.
#[derive(Debug, Error)]
pub enum OfflineError {
    /// Precache list encoding error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Template error.
    #[error("template error: {0}")]
    Template(#[from] TemplateError),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for offline support.
pub type Result<T> = std::result::Result<T, OfflineError>;

const SERVICE_WORKER_TEMPLATE: &str = r#"var CACHE = "{{ cache_name }}";
var APP_SHELL = "{{ app_shell }}";
var PRECACHE = {{ precache }};

self.addEventListener("install", function (event) {
    event.waitUntil(
        caches.open(CACHE)
            .then(function (cache) { return cache.addAll(PRECACHE); })
            .then(function () { return self.skipWaiting(); })
    );
});

self.addEventListener("activate", function (event) {
    event.waitUntil(
        caches.keys()
            .then(function (keys) {
                return Promise.all(keys
                    .filter(function (key) { return key !== CACHE; })
                    .map(function (key) { return caches.delete(key); }));
            })
            .then(function () { return self.clients.claim(); })
    );
});

function isPage(request) {
    return request.mode === "navigate"
        || (request.headers.get("Accept") || "").indexOf("text/html") !== -1;
}

function store(request, response) {
    if (response.ok) {
        var copy = response.clone();
        caches.open(CACHE).then(function (cache) { cache.put(request, copy); });
    }
    return response;
}

self.addEventListener("fetch", function (event) {
    var request = event.request;
    if (request.method !== "GET" || new URL(request.url).origin !== self.location.origin) return;

    if (isPage(request)) {
        event.respondWith(
            fetch(request)
                .then(function (response) { return store(request, response); })
                .catch(function () {
                    return caches.match(request).then(function (cached) {
                        return cached || caches.match(APP_SHELL);
                    });
                })
        );
        return;
    }

    event.respondWith(
        caches.match(request).then(function (cached) {
            return cached || fetch(request).then(function (response) {
                return store(request, response);
            });
        })
    );
});
"#;

/// `<script>` that registers the service worker.
#[must_use]
pub fn registration_script() -> String {
    format!(
        r#"<script>if ("serviceWorker" in navigator) {{ window.addEventListener("load", function () {{ navigator.serviceWorker.register("/{SERVICE_WORKER_FILE}"); }}); }}</script>"#
    )
}

/// Service worker generator.
#[derive(Debug, Clone)]
pub struct ServiceWorker {
    options: OfflineOptions,
}

impl ServiceWorker {
    #[must_use]
    pub fn new(options: OfflineOptions) -> Self {
        Self { options }
    }

    /// Site paths cached on install: the home page, the app shell, the
    /// manifest and the copied static files.
    #[must_use]
    pub fn precache(&self, manifest: Option<&str>, assets: &[PathBuf]) -> Vec<String> {
        let mut paths = vec!["/".to_string(), self.options.app_shell.clone()];
        paths.extend(manifest.map(|file| format!("/{file}")));
        paths.extend(assets.iter().map(|asset| {
            let parts: Vec<_> = asset
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect();
            format!("/{}", parts.join("/"))
        }));
        paths.dedup();
        paths
    }

    /// Render the service worker script. `version` names the cache, so each
    /// build replaces the previous cache.
    pub fn script(&self, version: &str, precache: &[String]) -> Result<String> {
        let ctx = TemplateContext::new()
            .with_var("cache_name", format!("{}-{version}", self.options.cache_prefix))
            .with_var("app_shell", &self.options.app_shell)
            .with_var("precache", serde_json::to_string(precache)?);

        Ok(Template::new("service-worker", SERVICE_WORKER_TEMPLATE).render(&ctx)?)
    }

    /// Write `sw.js` into `output_dir`.
    pub fn write(&self, output_dir: &Path, version: &str, precache: &[String]) -> Result<PathBuf> {
        let path = output_dir.join(SERVICE_WORKER_FILE);
        fs::write(&path, self.script(version, precache)?)?;
        debug!(path = %path.display(), entries = precache.len(), "wrote service worker");
        Ok(path)
    }
}
