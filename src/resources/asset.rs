//! Asset retrieval: where the bytes of a scene come from.
//!
//! Native builds read from a local asset directory or over HTTP. On the web
//! relative references resolve against the page origin, like every other
//! request the page makes.

use log::debug;

use crate::error::{Error, Result};

/// External binary storage for scene assets, addressed by opaque file id or URL.
#[allow(async_fn_in_trait)]
pub trait AssetStore {
    /// Fetches the raw bytes behind `reference`.
    async fn fetch(&self, reference: &str) -> Result<Vec<u8>>;

    /// A URL (or path) under which the file with `file_id` can be viewed.
    fn view_url(&self, file_id: &str) -> String;
}

/**
 * Extracts the file id from a stored model path or view URL: the last
 * `/`-separated segment, or the whole input if that segment is empty.
 */
pub fn file_id_from_path(path: &str) -> &str {
    path.rsplit('/')
        .next()
        .filter(|segment| !segment.is_empty())
        .unwrap_or(path)
}

/// Reads assets from a local directory (`./assets` by default).
#[cfg(not(target_arch = "wasm32"))]
#[derive(Clone, Debug)]
pub struct FsAssetStore {
    root: std::path::PathBuf,
}

#[cfg(not(target_arch = "wasm32"))]
impl FsAssetStore {
    pub fn new(root: impl Into<std::path::PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &std::path::Path {
        &self.root
    }

    /// Maps `reference` into the asset root. References that would leave it
    /// (`..`, drive prefixes) resolve to nothing.
    fn resolve(&self, reference: &str) -> Option<std::path::PathBuf> {
        use std::path::Component;

        let relative = std::path::Path::new(reference.trim_start_matches('/'));
        let mut path = self.root.clone();
        for component in relative.components() {
            match component {
                Component::Normal(segment) => path.push(segment),
                Component::CurDir => {}
                Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
            }
        }
        Some(path)
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl Default for FsAssetStore {
    fn default() -> Self {
        Self::new(std::path::Path::new("./").join("assets"))
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl AssetStore for FsAssetStore {
    async fn fetch(&self, reference: &str) -> Result<Vec<u8>> {
        let Some(path) = self.resolve(reference) else {
            debug!("Refusing asset reference outside the asset root: {reference}");
            return Err(Error::AssetNotFound(reference.to_string()));
        };
        debug!("Reading asset {}", path.display());
        tokio::fs::read(&path).await.map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => Error::AssetNotFound(reference.to_string()),
            _ => Error::AssetUnavailable {
                reference: reference.to_string(),
                reason: e.to_string(),
            },
        })
    }

    fn view_url(&self, file_id: &str) -> String {
        self.root.join(file_id).display().to_string()
    }
}

/// Fetches assets over HTTP. Absolute URLs are used as-is, anything else is joined onto the base URL.
#[derive(Clone, Debug)]
pub struct HttpAssetStore {
    base: reqwest::Url,
    client: reqwest::Client,
}

impl HttpAssetStore {
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_client(base_url, reqwest::Client::new())
    }

    /// Uses a preconfigured client, e.g. one with custom proxy or timeout settings.
    pub fn with_client(base_url: &str, client: reqwest::Client) -> Result<Self> {
        let mut base = base_url.to_string();
        // Url::join drops the last path segment unless the base ends in '/'
        if !base.ends_with('/') {
            base.push('/');
        }
        let base = reqwest::Url::parse(&base)
            .map_err(|e| Error::Config(format!("invalid asset base url '{base_url}': {e}")))?;
        Ok(Self { base, client })
    }

    /// Resolves relative references against `<origin>/assets/` of the current page.
    #[cfg(target_arch = "wasm32")]
    pub fn from_origin() -> Result<Self> {
        let origin = web_sys::window()
            .and_then(|window| window.location().origin().ok())
            .ok_or_else(|| Error::Config("no window location available".to_string()))?;
        Self::new(&format!("{origin}/assets/"))
    }

    pub fn base(&self) -> &reqwest::Url {
        &self.base
    }

    fn resolve(&self, reference: &str) -> Result<reqwest::Url> {
        let resolved = if reference.contains("://") {
            reqwest::Url::parse(reference)
        } else {
            self.base.join(reference.trim_start_matches('/'))
        };
        resolved.map_err(|_| Error::AssetNotFound(reference.to_string()))
    }
}

impl AssetStore for HttpAssetStore {
    async fn fetch(&self, reference: &str) -> Result<Vec<u8>> {
        let url = self.resolve(reference)?;
        debug!("GET {url}");
        let unavailable = |reason: String| Error::AssetUnavailable {
            reference: reference.to_string(),
            reason,
        };
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| unavailable(e.to_string()))?;
        if let Some(e) = status_error(reference, response.status()) {
            return Err(e);
        }
        let bytes = response
            .bytes()
            .await
            .map_err(|e| unavailable(e.to_string()))?;
        Ok(bytes.to_vec())
    }

    fn view_url(&self, file_id: &str) -> String {
        self.resolve(file_id)
            .map(|url| url.to_string())
            .unwrap_or_else(|_| file_id.to_string())
    }
}

/// Error for a response status that carries no asset: 404 is a missing asset, any other non-success is transient.
fn status_error(reference: &str, status: reqwest::StatusCode) -> Option<Error> {
    if status == reqwest::StatusCode::NOT_FOUND {
        Some(Error::AssetNotFound(reference.to_string()))
    } else if !status.is_success() {
        Some(Error::AssetUnavailable {
            reference: reference.to_string(),
            reason: format!("HTTP {status}"),
        })
    } else {
        None
    }
}
