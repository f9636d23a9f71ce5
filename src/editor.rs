//! Outbound side of the bridge: messages sent to editor views and the channels carrying them.

use serde::Serialize;
use std::fmt::{Display, Formatter};

/// Identity of an open editor view, assigned by the host.
#[derive(Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord, Debug)]
pub struct ViewId(u64);

impl ViewId {
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl From<u64> for ViewId {
    fn from(id: u64) -> Self {
        ViewId(id)
    }
}

impl Display for ViewId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "view#{}", self.0)
    }
}

/// Message posted to an editor view.
///
/// Serialized form is `{"type": "<variant>", ...}`, the shape the view side expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum EditorMessage {
    /// Move the cursor (focused byte) to `offset`.
    SetFocusedByte { offset: u64 },
    /// Scroll to `offset` without committing a navigation.
    GoToOffset { offset: u64 },
    /// Push the currently displayed offset onto the view's history.
    StashDisplayedOffset,
    /// Restore the offset pushed by the last [`EditorMessage::StashDisplayedOffset`].
    PopDisplayedOffset,
    /// Drop cached bytes and read them again from the backing document.
    ReloadFromDisk,
}

/// Message endpoint bound to exactly one open editor view.
pub trait Channel {
    /// View this channel belongs to.
    fn view(&self) -> ViewId;

    /// Post a message to the view.
    fn post(&self, message: EditorMessage) -> anyhow::Result<()>;
}
