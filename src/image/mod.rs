//! Image header probing for the preview pane.
//!
//! Images are not drawn; the preview reserves rows for them once their
//! dimensions are known, which is what the render-side extraction waits for.

mod loader;

pub use loader::{ImageLoader, ProbeResult};

use std::path::{Path, PathBuf};

/// Approximate pixel size of one terminal cell.
const CELL_WIDTH_PX: u64 = 8;
const CELL_HEIGHT_PX: u64 = 16;

/// Rows an image of `dimensions` pixels occupies in a pane `pane_width`
/// columns wide. Never less than one row.
pub fn rows_for(dimensions: (u32, u32), pane_width: u16) -> usize {
    let (width, height) = (u64::from(dimensions.0), u64::from(dimensions.1));
    if width == 0 || height == 0 {
        return 1;
    }
    let columns = width.div_ceil(CELL_WIDTH_PX).min(u64::from(pane_width.max(1)));
    let rows = (height * columns * CELL_WIDTH_PX).div_ceil(width * CELL_HEIGHT_PX);
    usize::try_from(rows.max(1)).unwrap_or(usize::MAX)
}

/// Whether `src` points off the local filesystem.
pub fn is_remote(src: &str) -> bool {
    let lower = src.to_ascii_lowercase();
    ["http://", "https://", "data:"]
        .iter()
        .any(|scheme| lower.starts_with(scheme))
}

/// Resolve a possibly relative image path against `base`.
pub fn resolve_path(base: &Path, src: &str) -> PathBuf {
    let path = Path::new(src);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}
