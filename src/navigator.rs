//! Interactive navigation: go to a typed offset or to the address of a variable.
//!
//! Variable picker transitions:
//!
//! | state      | input                        | next       | posted               |
//! |------------|------------------------------|------------|----------------------|
//! | idle       | show                         | prompting  | StashDisplayedOffset |
//! | prompting  | highlight resolvable item    | prompting  | GoToOffset           |
//! | prompting  | highlight unresolvable item  | prompting  | -                    |
//! | prompting  | accept, offset within a page | committed  | SetFocusedByte       |
//! | prompting  | accept, offset further away  | committed  | - (new memory view)  |
//! | prompting  | accept, nothing resolved     | cancelled  | PopDisplayedOffset   |
//! | prompting  | hide or drop                 | cancelled  | PopDisplayedOffset   |
//! | committed  | memory view not opened       | cancelled  | PopDisplayedOffset   |
//! | committed, cancelled | anything else      | unchanged  | -                    |

use crate::editor::{Channel, EditorMessage};
use crate::interceptor::VariableCache;
use crate::offset::{parse_offset, validate_offset_input, OffsetSelection};
use crate::registry::{ChannelFallback, EditorRegistry};
use crate::weak_error;
use std::rc::Rc;
use strum_macros::Display;

pub const SELECT_VARIABLE_PLACEHOLDER: &str = "Select variable";
pub const NO_VARIABLES_PLACEHOLDER: &str =
    "No variables found, make sure they are expanded in the variables view.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum SessionState {
    Idle,
    Prompting,
    Committed,
    Cancelled,
}

impl SessionState {
    pub fn is_finished(self) -> bool {
        matches!(self, SessionState::Committed | SessionState::Cancelled)
    }
}

fn post(channel: &dyn Channel, message: EditorMessage) {
    log::debug!(target: "navigator", "{} <- {message:?}", channel.view());
    weak_error!(channel.post(message), "navigation message:");
}

/// Prompt for a typed offset.
pub struct OffsetPrompt {
    channel: Rc<dyn Channel>,
    state: SessionState,
}

impl OffsetPrompt {
    pub fn new(channel: Rc<dyn Channel>) -> Self {
        Self {
            channel,
            state: SessionState::Prompting,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Validation hint for the text typed so far.
    pub fn on_input_changed(&self, text: &str) -> Option<&'static str> {
        validate_offset_input(text)
    }

    /// Confirm `text`. Invalid text is ignored and the prompt stays open.
    /// Return true if the offset was accepted.
    pub fn submit(&mut self, text: &str) -> bool {
        if self.state != SessionState::Prompting {
            return false;
        }
        let Some(selection) = parse_offset(text) else {
            log::debug!(target: "navigator", "offset {text:?} ignored");
            return false;
        };

        log::debug!(
            target: "navigator",
            "go to {:#x} ({})",
            selection.offset,
            selection.origin
        );
        post(
            self.channel.as_ref(),
            EditorMessage::SetFocusedByte {
                offset: selection.offset,
            },
        );
        self.state = SessionState::Committed;
        true
    }

    pub fn on_hide(&mut self) {
        if self.state == SessionState::Prompting {
            self.state = SessionState::Cancelled;
        }
    }
}

/// Item of the variable picker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickItem {
    pub label: String,
    pub description: Option<String>,
}

/// How an accepted variable must be shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitAction {
    /// Cursor already moved in the current view.
    Focused(u64),
    /// Target is too far from the current view, a new memory view must be opened.
    OpenMemoryView(u64),
}

/// Picker over the variables fetched since the last stop.
///
/// Live previews move the view without committing. If the picker ends without a
/// commit, or is dropped while open, the view is told to restore its offset.
pub struct VariablePicker {
    channel: Rc<dyn Channel>,
    base_address: u64,
    page_size: u64,
    items: Vec<PickItem>,
    last_value: Option<OffsetSelection>,
    state: SessionState,
}

impl VariablePicker {
    pub fn new(
        channel: Rc<dyn Channel>,
        base_address: u64,
        cache: &VariableCache,
        page_size: u64,
    ) -> Self {
        let items = cache
            .iter()
            .map(|var| PickItem {
                label: var.name.clone(),
                description: var.memory_reference.clone(),
            })
            .collect();

        Self {
            channel,
            base_address,
            page_size,
            items,
            last_value: None,
            state: SessionState::Idle,
        }
    }

    pub fn items(&self) -> &[PickItem] {
        &self.items
    }

    pub fn placeholder(&self) -> &'static str {
        if self.items.is_empty() {
            NO_VARIABLES_PLACEHOLDER
        } else {
            SELECT_VARIABLE_PLACEHOLDER
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn last_value(&self) -> Option<OffsetSelection> {
        self.last_value
    }

    pub fn base_address(&self) -> u64 {
        self.base_address
    }

    pub fn show(&mut self) {
        if self.state != SessionState::Idle {
            return;
        }
        post(self.channel.as_ref(), EditorMessage::StashDisplayedOffset);
        self.state = SessionState::Prompting;
    }

    /// Highlighted item changed (`None` when nothing is highlighted).
    pub fn on_active_changed(&mut self, item: Option<&PickItem>) {
        if self.state != SessionState::Prompting {
            return;
        }

        let reference = item.and_then(|item| item.description.as_deref());
        match reference {
            None | Some("") => {
                self.last_value = None;
            }
            Some(reference) => {
                let Some(selection) = OffsetSelection::from_reference(reference) else {
                    return;
                };
                self.last_value = Some(selection);
                post(
                    self.channel.as_ref(),
                    EditorMessage::GoToOffset {
                        offset: selection.offset,
                    },
                );
            }
        }
    }

    /// Highlight the item at `idx`, out of range index clears the highlight.
    pub fn highlight(&mut self, idx: usize) {
        let item = self.items.get(idx).cloned();
        self.on_active_changed(item.as_ref());
    }

    /// Commit the previewed offset.
    pub fn on_accept(&mut self) -> Option<CommitAction> {
        if self.state != SessionState::Prompting {
            log::debug!(target: "navigator", "accept ignored, picker is {}", self.state);
            return None;
        }

        let Some(selection) = self.last_value else {
            self.cancel();
            return None;
        };

        self.state = SessionState::Committed;
        let offset = selection.offset;
        if offset.abs_diff(self.base_address) <= self.page_size {
            post(
                self.channel.as_ref(),
                EditorMessage::SetFocusedByte { offset },
            );
            Some(CommitAction::Focused(offset))
        } else {
            log::debug!(
                target: "navigator",
                "{offset:#x} is more than {} bytes away from {:#x}",
                self.page_size,
                self.base_address
            );
            Some(CommitAction::OpenMemoryView(offset))
        }
    }

    pub fn on_hide(&mut self) {
        if self.state == SessionState::Prompting {
            self.cancel();
        }
    }

    /// Revert a commit whose memory view could not be opened.
    pub fn abort_commit(&mut self) {
        if self.state == SessionState::Committed {
            log::debug!(target: "navigator", "commit aborted, restoring displayed offset");
            self.cancel();
        }
    }

    fn cancel(&mut self) {
        self.state = SessionState::Cancelled;
        post(self.channel.as_ref(), EditorMessage::PopDisplayedOffset);
    }
}

impl Drop for VariablePicker {
    fn drop(&mut self) {
        self.on_hide();
    }
}

/// Entry points of the navigation commands.
pub struct Navigator {
    page_size: u64,
}

impl Navigator {
    pub fn new(page_size: u64) -> Self {
        Self { page_size }
    }

    /// Open an offset prompt against the active view, or any view if none is active.
    pub fn go_to_offset(&self, registry: &EditorRegistry) -> Option<OffsetPrompt> {
        let Some(channel) = registry.channel_for(ChannelFallback::AnyRegistered) else {
            log::debug!(target: "navigator", "go to offset: no open editor");
            return None;
        };
        Some(OffsetPrompt::new(channel))
    }

    /// Open and show a variable picker against the active view, or any view if none is active.
    pub fn go_to_variable(
        &self,
        registry: &EditorRegistry,
        cache: &VariableCache,
    ) -> Option<VariablePicker> {
        let Some(channel) = registry.channel_for(ChannelFallback::AnyRegistered) else {
            log::debug!(target: "navigator", "go to variable: no open editor");
            return None;
        };
        let base_address = registry
            .document(channel.view())
            .map(|doc| doc.base_address)
            .unwrap_or_default();

        let mut picker = VariablePicker::new(channel, base_address, cache, self.page_size);
        picker.show();
        Some(picker)
    }
}
