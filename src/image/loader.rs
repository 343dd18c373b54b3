//! Background image probing.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender};

/// Outcome of probing one image source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeResult {
    pub src: String,
    /// Pixel dimensions, or `None` when the image could not be read.
    pub dimensions: Option<(u32, u32)>,
}

/// Probes image headers on worker threads and remembers the results.
///
/// Each source is probed at most once until [`ImageLoader::clear`].
pub struct ImageLoader {
    base_path: PathBuf,
    requested: HashSet<String>,
    sizes: HashMap<String, Option<(u32, u32)>>,
    tx: Sender<ProbeResult>,
    rx: Receiver<ProbeResult>,
}

impl ImageLoader {
    /// Create a loader resolving relative sources against `base_path`.
    pub fn new(base_path: PathBuf) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            base_path,
            requested: HashSet::new(),
            sizes: HashMap::new(),
            tx,
            rx,
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Start probing `src` unless it was already requested.
    ///
    /// Returns whether a probe was started. Remote sources are never
    /// fetched and resolve to `None` straight away.
    pub fn request(&mut self, src: &str) -> bool {
        if !self.requested.insert(src.to_string()) {
            return false;
        }
        let src = src.to_string();
        if super::is_remote(&src) {
            crate::perf::log_event("image.probe", format!("src={src} remote=true"));
            let _ = self.tx.send(ProbeResult {
                src,
                dimensions: None,
            });
            return true;
        }

        let path = super::resolve_path(&self.base_path, &src);
        let tx = self.tx.clone();
        std::thread::spawn(move || {
            let dimensions = match image::image_dimensions(&path) {
                Ok(dims) => Some(dims),
                Err(err) => {
                    tracing::debug!(path = %path.display(), %err, "image probe failed");
                    None
                }
            };
            // The receiver is gone once the app has exited.
            let _ = tx.send(ProbeResult { src, dimensions });
        });
        true
    }

    /// Collect finished probes without blocking.
    pub fn drain(&mut self) -> Vec<ProbeResult> {
        let results: Vec<ProbeResult> = self.rx.try_iter().collect();
        for result in &results {
            self.sizes.insert(result.src.clone(), result.dimensions);
        }
        results
    }

    /// Dimensions of a probed source. `None` while pending or on failure.
    pub fn dimensions(&self, src: &str) -> Option<(u32, u32)> {
        self.sizes.get(src).copied().flatten()
    }

    /// Every finished probe so far.
    pub fn probed(&self) -> impl Iterator<Item = (&str, Option<(u32, u32)>)> {
        self.sizes.iter().map(|(src, dims)| (src.as_str(), *dims))
    }

    pub fn is_requested(&self, src: &str) -> bool {
        self.requested.contains(src)
    }

    /// Forget every result so sources are probed again, e.g. after the
    /// files on disk changed.
    pub fn clear(&mut self) {
        self.requested.clear();
        self.sizes.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    fn drain_until(loader: &mut ImageLoader, count: usize) -> Vec<ProbeResult> {
        let deadline = Instant::now() + Duration::from_secs(5);
        let mut results = Vec::new();
        while results.len() < count && Instant::now() < deadline {
            results.extend(loader.drain());
            std::thread::sleep(Duration::from_millis(5));
        }
        results
    }

    #[test]
    fn test_probe_reads_png_dimensions() {
        let dir = tempfile::tempdir().unwrap();
        image::RgbImage::new(24, 12)
            .save(dir.path().join("pic.png"))
            .unwrap();

        let mut loader = ImageLoader::new(dir.path().to_path_buf());
        assert!(loader.request("pic.png"));
        let results = drain_until(&mut loader, 1);
        assert_eq!(results[0].dimensions, Some((24, 12)));
        assert_eq!(loader.dimensions("pic.png"), Some((24, 12)));
    }

    #[test]
    fn test_missing_image_resolves_to_none() {
        let dir = tempfile::tempdir().unwrap();
        let mut loader = ImageLoader::new(dir.path().to_path_buf());
        loader.request("nope.png");
        let results = drain_until(&mut loader, 1);
        assert_eq!(results[0].dimensions, None);
        assert_eq!(loader.dimensions("nope.png"), None);
    }

    #[test]
    fn test_requests_are_deduplicated() {
        let mut loader = ImageLoader::new(PathBuf::from("/base"));
        assert!(loader.request("https://example.com/a.png"));
        assert!(!loader.request("https://example.com/a.png"));
        assert!(loader.is_requested("https://example.com/a.png"));

        loader.clear();
        assert!(!loader.is_requested("https://example.com/a.png"));
        assert!(loader.request("https://example.com/a.png"));
    }

    #[test]
    fn test_remote_image_is_not_fetched() {
        let mut loader = ImageLoader::new(PathBuf::from("/base"));
        loader.request("https://example.com/a.png");
        let results = loader.drain();
        assert_eq!(
            results,
            vec![ProbeResult {
                src: "https://example.com/a.png".to_string(),
                dimensions: None,
            }]
        );
    }
}
