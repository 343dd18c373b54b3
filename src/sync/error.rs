use thiserror::Error;

use super::events::{Channel, Owner};

/// Failures inside the sync core.
///
/// None of these reach the user. Callers log them and leave the panes
/// untouched until the next trigger recomputes everything.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("cached coordinates are malformed: {0}")]
    MalformedCoordinates(#[from] serde_json::Error),

    #[error("coordinate sequences differ in length (source {source_len}, render {render_len})")]
    LengthMismatch { source_len: usize, render_len: usize },

    #[error("coordinate sequence needs at least 2 entries, got {0}")]
    TooShort(usize),

    #[error("{channel:?} is claimed by {owner:?}")]
    ChannelClaimed { channel: Channel, owner: Owner },
}
