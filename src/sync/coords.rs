//! Coordinate sequences and their cached encoding.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::SyncError;
use super::pane::Dataset;

/// Dataset key under which each pane caches its coordinate sequence.
pub const COORDINATES_KEY: &str = "coordinates";

/// Scroll offsets of one pane, one per landmark plus the start and end
/// sentinels.
///
/// Sequences are rebuilt on every recomputation and never edited in place,
/// so there is no mutable access to the offsets.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CoordinateSequence(Vec<f64>);

impl CoordinateSequence {
    pub const fn new(offsets: Vec<f64>) -> Self {
        Self(offsets)
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The end sentinel, if any.
    pub fn last(&self) -> Option<f64> {
        self.0.last().copied()
    }

    /// Whether every offset is at least the one before it.
    pub fn is_non_decreasing(&self) -> bool {
        self.0.windows(2).all(|pair| pair[0] <= pair[1])
    }

    /// Encode as a JSON array of numbers.
    pub fn to_attribute(&self) -> String {
        // Serializing a Vec<f64> cannot fail; non-finite values become null
        // and are rejected on the way back in.
        serde_json::to_string(&self.0).unwrap_or_else(|_| "[]".to_string())
    }

    /// Decode a cached JSON array.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::MalformedCoordinates`] when the text is not an
    /// array of finite numbers.
    pub fn from_attribute(text: &str) -> Result<Self, SyncError> {
        Ok(Self(serde_json::from_str(text)?))
    }

    /// Read the sequence cached on a pane. Malformed data reads as absent.
    pub fn load(dataset: &impl Dataset) -> Option<Self> {
        let raw = dataset.data(COORDINATES_KEY)?;
        match Self::from_attribute(raw) {
            Ok(sequence) => Some(sequence),
            Err(err) => {
                debug!(%err, "ignoring cached coordinates");
                None
            }
        }
    }

    /// Cache the sequence on a pane.
    pub fn store(&self, dataset: &mut impl Dataset) {
        dataset.set_data(COORDINATES_KEY, self.to_attribute());
    }
}

impl From<Vec<f64>> for CoordinateSequence {
    fn from(offsets: Vec<f64>) -> Self {
        Self(offsets)
    }
}

/// A source sequence and a render sequence that are safe to map between.
#[derive(Debug, Clone, PartialEq)]
pub struct CoordinatePair {
    source: CoordinateSequence,
    render: CoordinateSequence,
}

impl CoordinatePair {
    /// Pair two sequences.
    ///
    /// # Errors
    ///
    /// Fails when either sequence has fewer than 2 entries or when their
    /// lengths differ; a half-updated pair must never be mapped.
    pub fn new(source: CoordinateSequence, render: CoordinateSequence) -> Result<Self, SyncError> {
        if source.len() != render.len() {
            return Err(SyncError::LengthMismatch {
                source_len: source.len(),
                render_len: render.len(),
            });
        }
        if source.len() < 2 {
            return Err(SyncError::TooShort(source.len()));
        }
        Ok(Self { source, render })
    }

    /// Read both cached sequences, or `None` if either is missing, malformed
    /// or the two disagree in length.
    pub fn load(source: &impl Dataset, render: &impl Dataset) -> Option<Self> {
        let source = CoordinateSequence::load(source)?;
        let render = CoordinateSequence::load(render)?;
        match Self::new(source, render) {
            Ok(pair) => Some(pair),
            Err(err) => {
                debug!(%err, "coordinate pair unusable");
                None
            }
        }
    }

    /// Cache both sequences on their panes.
    pub fn store(&self, source: &mut impl Dataset, render: &mut impl Dataset) {
        self.source.store(source);
        self.render.store(render);
    }

    pub const fn source(&self) -> &CoordinateSequence {
        &self.source
    }

    pub const fn render(&self) -> &CoordinateSequence {
        &self.render
    }
}
