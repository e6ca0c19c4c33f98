use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use rayon::prelude::*;

use crate::assets::decode::decode_icon;
use crate::foundation::error::{PipevizError, PipevizResult};
use crate::session::cancel::CancelToken;

/// Decoded icon in premultiplied RGBA8 form.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IconImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Pixel bytes in row-major premultiplied RGBA8.
    pub rgba8_premul: Arc<Vec<u8>>,
}

impl IconImage {
    /// Wrap already premultiplied pixels.
    pub fn from_premul(width: u32, height: u32, rgba8_premul: Vec<u8>) -> Self {
        Self {
            width,
            height,
            rgba8_premul: Arc::new(rgba8_premul),
        }
    }

    /// Single-color icon, mostly useful for tests and placeholder providers.
    pub fn solid(width: u32, height: u32, premul: [u8; 4]) -> Self {
        Self::from_premul(width, height, premul.repeat(width as usize * height as usize))
    }
}

/// Outcome of a single icon request. A failure is not an error: the slot just stays empty.
#[derive(Clone, Debug)]
pub enum IconLoad {
    /// The icon was fetched and decoded.
    Loaded(IconImage),
    /// The icon could not be produced; the string says why.
    Failed(String),
}

/// Source of icon images keyed by name.
///
/// Requests are independent and may run concurrently; implementations must not assume any
/// ordering between keys.
pub trait IconProvider: Send + Sync {
    /// Fetch and decode the icon `key` from `source`.
    fn load(&self, key: &str, source: &str) -> IconLoad;

    /// Raw bytes of the font file at `source`. Providers that only serve images refuse.
    fn load_font(&self, source: &str) -> PipevizResult<Vec<u8>> {
        Err(PipevizError::asset(format!(
            "this provider does not serve fonts (requested '{source}')"
        )))
    }
}

/// Loads icons from files relative to an assets root.
#[derive(Clone, Debug)]
pub struct FsIconProvider {
    root: PathBuf,
}

impl FsIconProvider {
    /// Resolve icon sources against `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn read(&self, source: &str) -> PipevizResult<Vec<u8>> {
        let norm = normalize_rel_path(source)?;
        let p = self.root.join(Path::new(&norm));
        std::fs::read(&p).map_err(|e| {
            PipevizError::asset(format!("failed to read asset '{}': {e}", p.display()))
        })
    }
}

impl IconProvider for FsIconProvider {
    fn load(&self, _key: &str, source: &str) -> IconLoad {
        match self
            .read(source)
            .and_then(|bytes| decode_icon(source, &bytes))
        {
            Ok(img) => IconLoad::Loaded(img),
            Err(e) => IconLoad::Failed(e.to_string()),
        }
    }

    fn load_font(&self, source: &str) -> PipevizResult<Vec<u8>> {
        self.read(source)
    }
}

/// Icon key to loaded image. Keys whose load failed are simply absent.
#[derive(Clone, Debug, Default)]
pub struct IconCache {
    images: HashMap<String, IconImage>,
}

impl IconCache {
    /// Look up a loaded icon.
    pub fn get(&self, key: &str) -> Option<&IconImage> {
        self.images.get(key)
    }

    /// Number of icons that loaded successfully.
    pub fn len(&self) -> usize {
        self.images.len()
    }

    /// Return `true` when no icon loaded.
    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub(crate) fn insert(&mut self, key: String, image: IconImage) {
        self.images.insert(key, image);
    }
}

/// Result of the icon-load barrier.
#[derive(Clone, Debug, Default)]
pub struct IconLoadReport {
    /// Successfully loaded icons.
    pub cache: IconCache,
    /// Requests that settled (loaded or failed). Equals the number requested.
    pub settled: usize,
    /// Requests that failed.
    pub failed: usize,
}

/// Issue every icon request independently and wait for all of them to settle.
///
/// Individual failures are logged and counted, never propagated. Returns `None` when `cancel` is
/// tripped before the barrier releases; results that arrive after that point are discarded.
#[tracing::instrument(skip_all, fields(icons = sources.len()))]
pub fn load_icons(
    provider: &dyn IconProvider,
    sources: &BTreeMap<String, String>,
    cancel: &CancelToken,
) -> Option<IconLoadReport> {
    let settled = AtomicUsize::new(0);

    let results: Vec<(&String, IconLoad)> = sources
        .par_iter()
        .map(|(key, source)| {
            let outcome = if cancel.is_cancelled() {
                IconLoad::Failed("cancelled".to_owned())
            } else {
                provider.load(key, source)
            };
            settled.fetch_add(1, Ordering::AcqRel);
            (key, outcome)
        })
        .collect();

    if cancel.is_cancelled() {
        tracing::debug!("icon loading cancelled; discarding results");
        return None;
    }

    let mut report = IconLoadReport {
        settled: settled.into_inner(),
        ..IconLoadReport::default()
    };
    for (key, outcome) in results {
        match outcome {
            IconLoad::Loaded(img) => report.cache.insert(key.clone(), img),
            IconLoad::Failed(reason) => {
                tracing::warn!(icon = %key, %reason, "icon failed to load; drawing without it");
                report.failed += 1;
            }
        }
    }
    Some(report)
}

/// Normalize and validate asset paths relative to the assets root.
///
/// The normalized result uses `/` separators, removes `.` segments, and rejects absolute paths or
/// parent traversals (`..`).
pub(crate) fn normalize_rel_path(source: &str) -> PipevizResult<String> {
    let s = source.replace('\\', "/");
    if s.starts_with('/') {
        return Err(PipevizError::asset("asset paths must be relative"));
    }
    if s.is_empty() {
        return Err(PipevizError::asset("asset path must be non-empty"));
    }

    let mut out = Vec::<&str>::new();
    for part in s.split('/') {
        if part.is_empty() || part == "." {
            continue;
        }
        if part == ".." {
            return Err(PipevizError::asset("asset paths must not contain '..'"));
        }
        out.push(part);
    }

    if out.is_empty() {
        return Err(PipevizError::asset("asset path must contain a file name"));
    }

    Ok(out.join("/"))
}

#[cfg(test)]
#[path = "../../tests/unit/assets/icons.rs"]
mod tests;
