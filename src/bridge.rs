use crate::config::BridgeConfig;
use crate::editor::{Channel, ViewId};
use crate::interceptor::{Effect, SessionInterceptor, VariableCache};
use crate::memory_view::{DeferredFocus, MemoryLocator, MemoryViewManager, Workbench};
use crate::navigator::{CommitAction, Navigator, OffsetPrompt, VariablePicker};
use crate::protocol::ProtocolMessage;
use crate::registry::{ActiveDocument, EditorRegistry};
use crate::scheduler::DeferredQueue;
use crate::weak_error;
use serde_json::Value;
use std::rc::Rc;
use std::time::Instant;

/// Debug session memory bridge.
///
/// Every method is a reaction to one host input and completes its effects before
/// returning. Deferred work is picked up by [`Bridge::poll`].
pub struct Bridge {
    config: BridgeConfig,
    registry: EditorRegistry,
    session: Option<SessionInterceptor>,
    navigator: Navigator,
    memory: MemoryViewManager,
    deferred: DeferredQueue<DeferredFocus>,
    empty_cache: VariableCache,
}

impl Bridge {
    pub fn new(config: BridgeConfig) -> Self {
        Self {
            registry: EditorRegistry::new(),
            session: None,
            navigator: Navigator::new(config.page_size),
            memory: MemoryViewManager::new(&config),
            deferred: DeferredQueue::new(),
            empty_cache: VariableCache::new(),
            config,
        }
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    pub fn registry(&self) -> &EditorRegistry {
        &self.registry
    }

    /// Begin a debug session. Variables of a previous session are dropped.
    pub fn start_session(&mut self, session_id: impl Into<String>) {
        let session = SessionInterceptor::new(session_id, &self.config);
        log::info!(target: "bridge", "debug session {} started", session.session_id());
        self.session = Some(session);
    }

    pub fn end_session(&mut self) {
        if let Some(session) = self.session.take() {
            log::info!(target: "bridge", "debug session {} ended", session.session_id());
        }
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.session_id())
    }

    pub fn variables(&self) -> &VariableCache {
        self.session
            .as_ref()
            .map(|s| s.variables())
            .unwrap_or(&self.empty_cache)
    }

    /// Observe one protocol message. Ignored if no session is active.
    pub fn on_protocol_message(&mut self, message: &ProtocolMessage) -> Effect {
        match self.session.as_mut() {
            Some(session) => session.on_message(message, &self.registry),
            None => Effect::Ignored,
        }
    }

    pub fn on_raw_protocol_message(&mut self, message: Value) -> Effect {
        match self.session.as_mut() {
            Some(session) => session.on_raw_message(message, &self.registry),
            None => Effect::Ignored,
        }
    }

    /// A view was opened. Views opened on a memory locator take its base address.
    pub fn view_opened(&mut self, view: ViewId, channel: Rc<dyn Channel>, uri: Option<String>) {
        let base_address = uri
            .as_deref()
            .filter(|uri| uri.starts_with(&format!("{}://", self.config.memory_scheme)))
            .and_then(|uri| weak_error!(uri.parse::<MemoryLocator>()))
            .map(|locator| locator.base_address)
            .unwrap_or_default();

        self.registry.register_with_document(
            view,
            channel,
            ActiveDocument { base_address, uri },
        );
    }

    pub fn view_closed(&mut self, view: ViewId) {
        self.registry.unregister(view);
    }

    pub fn view_focused(&mut self, view: ViewId) {
        self.registry.set_active(view);
    }

    /// A view finished initialization, a pending focus for it runs now.
    pub fn view_ready(&mut self, view: ViewId) {
        if let Some(focus) = self.memory.on_view_ready(view, &mut self.deferred) {
            focus.run(&self.registry);
        }
    }

    pub fn go_to_offset(&self) -> Option<OffsetPrompt> {
        self.navigator.go_to_offset(&self.registry)
    }

    pub fn go_to_variable(&self) -> Option<VariablePicker> {
        self.navigator.go_to_variable(&self.registry, self.variables())
    }

    /// Accept the picker selection, opening a memory view if it is required.
    ///
    /// If the memory view cannot be opened the picker is cancelled and [`None`] is returned.
    pub fn commit_variable(
        &mut self,
        picker: &mut VariablePicker,
        workbench: &mut dyn Workbench,
        now: Instant,
    ) -> Option<CommitAction> {
        let action = picker.on_accept()?;
        if let CommitAction::OpenMemoryView(address) = action {
            if self.open_memory_view(address, workbench, now).is_none() {
                picker.abort_commit();
                return None;
            }
        }
        Some(action)
    }

    /// Open the single memory view of the current session at `address`.
    pub fn open_memory_view(
        &mut self,
        address: u64,
        workbench: &mut dyn Workbench,
        now: Instant,
    ) -> Option<ViewId> {
        let Some(session) = self.session.as_ref() else {
            log::warn!(target: "memory", "no active debug session, memory view not opened");
            return None;
        };
        weak_error!(self.memory.open_memory_view(
            address,
            session.session_id(),
            workbench,
            &mut self.deferred,
            now,
        ))
    }

    /// Run deferred work that is due at `now`.
    pub fn poll(&mut self, now: Instant) {
        for (task, focus) in self.deferred.take_due(now) {
            self.memory.on_task_fired(task);
            focus.run(&self.registry);
        }
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.deferred.next_deadline()
    }
}
