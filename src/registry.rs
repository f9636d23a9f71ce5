use crate::editor::{Channel, EditorMessage, ViewId};
use crate::weak_error;
use indexmap::IndexMap;
use std::rc::Rc;

/// Metadata of the document shown in a view.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActiveDocument {
    /// Address of the first byte of the document (0 for plain files).
    pub base_address: u64,
    /// Resource locator the view was opened with, if known.
    pub uri: Option<String>,
}

/// What to do when a caller needs a channel and no view has reported focus yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelFallback {
    /// Only the active view will do.
    ActiveOnly,
    /// Any registered view will do, the earliest registered one is chosen.
    AnyRegistered,
}

struct Entry {
    channel: Rc<dyn Channel>,
    document: ActiveDocument,
}

/// Catalog of open editor views and their channels.
///
/// Invariants:
/// - one channel per view
/// - `active`, if set, is a registered view
#[derive(Default)]
pub struct EditorRegistry {
    entries: IndexMap<ViewId, Entry>,
    active: Option<ViewId>,
}

impl EditorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a view with an empty document (base address 0).
    pub fn register(&mut self, view: ViewId, channel: Rc<dyn Channel>) {
        self.register_with_document(view, channel, ActiveDocument::default());
    }

    /// Register a view. A view registered twice keeps only the latest channel.
    /// A channel that belongs to another view is rejected.
    pub fn register_with_document(
        &mut self,
        view: ViewId,
        channel: Rc<dyn Channel>,
        document: ActiveDocument,
    ) {
        if channel.view() != view {
            log::warn!(
                target: "bridge",
                "channel of {} can not be registered for {view}",
                channel.view()
            );
            return;
        }
        let entry = Entry { channel, document };
        if self.entries.insert(view, entry).is_some() {
            log::warn!(target: "bridge", "{view} registered twice, previous channel replaced");
        } else {
            log::debug!(target: "bridge", "{view} registered");
        }
    }

    /// Remove a view. No-op for unknown views.
    pub fn unregister(&mut self, view: ViewId) {
        if self.entries.shift_remove(&view).is_none() {
            return;
        }
        if self.active == Some(view) {
            self.active = None;
        }
        log::debug!(target: "bridge", "{view} unregistered");
    }

    /// Mark a view as the active one. Return false (and keep the previous active view)
    /// if the view is not registered.
    pub fn set_active(&mut self, view: ViewId) -> bool {
        if !self.entries.contains_key(&view) {
            log::debug!(target: "bridge", "focus reported by unknown {view}, ignored");
            return false;
        }
        self.active = Some(view);
        true
    }

    pub fn set_document(&mut self, view: ViewId, document: ActiveDocument) -> bool {
        match self.entries.get_mut(&view) {
            Some(entry) => {
                entry.document = document;
                true
            }
            None => false,
        }
    }

    pub fn active_view(&self) -> Option<ViewId> {
        self.active
    }

    pub fn active_channel(&self) -> Option<Rc<dyn Channel>> {
        self.active.and_then(|view| self.channel(view))
    }

    pub fn active_document(&self) -> Option<&ActiveDocument> {
        self.active
            .and_then(|view| self.entries.get(&view))
            .map(|entry| &entry.document)
    }

    pub fn channel(&self, view: ViewId) -> Option<Rc<dyn Channel>> {
        self.entries.get(&view).map(|entry| entry.channel.clone())
    }

    pub fn document(&self, view: ViewId) -> Option<&ActiveDocument> {
        self.entries.get(&view).map(|entry| &entry.document)
    }

    /// Resolve a channel: the active one first, then whatever `fallback` allows.
    pub fn channel_for(&self, fallback: ChannelFallback) -> Option<Rc<dyn Channel>> {
        if let Some(channel) = self.active_channel() {
            return Some(channel);
        }
        match fallback {
            ChannelFallback::ActiveOnly => None,
            ChannelFallback::AnyRegistered => self.all_channels().next(),
        }
    }

    pub fn all_channels(&self) -> impl Iterator<Item = Rc<dyn Channel>> + '_ {
        self.entries.values().map(|entry| entry.channel.clone())
    }

    /// Ask every registered view to reload its bytes.
    pub fn refresh_all_editors(&self) {
        log::debug!(target: "bridge", "refresh {} editor(s)", self.entries.len());
        for (view, entry) in &self.entries {
            weak_error!(
                entry.channel.post(EditorMessage::ReloadFromDisk),
                "refresh failed:"
            );
            log::trace!(target: "bridge", "reload sent to {view}");
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, view: ViewId) -> bool {
        self.entries.contains_key(&view)
    }
}
