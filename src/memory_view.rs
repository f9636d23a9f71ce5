//! Memory inspection views: at most one is open at a time.

use crate::config::BridgeConfig;
use crate::editor::{EditorMessage, ViewId};
use crate::error::Error;
use crate::registry::EditorRegistry;
use crate::scheduler::{DeferredQueue, TaskId};
use crate::weak_error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use std::time::{Duration, Instant};

const LOCATOR_PATH: &str = "/memory.bin";
const BASE_ADDRESS_PARAM: &str = "baseAddress";

/// Resource locator of a memory view: `<scheme>://<session>/memory.bin?baseAddress=<decimal>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryLocator {
    pub scheme: String,
    pub session_id: String,
    pub base_address: u64,
}

impl Display for MemoryLocator {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}://{}{LOCATOR_PATH}?{BASE_ADDRESS_PARAM}={}",
            self.scheme, self.session_id, self.base_address
        )
    }
}

impl FromStr for MemoryLocator {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || Error::InvalidLocator(s.to_string());

        let (scheme, rest) = s.split_once("://").ok_or_else(invalid)?;
        let (path, query) = rest.split_once('?').ok_or_else(invalid)?;
        let session_id = path.strip_suffix(LOCATOR_PATH).ok_or_else(invalid)?;
        if scheme.is_empty() || session_id.is_empty() {
            return Err(invalid());
        }

        let base_address = query
            .split('&')
            .filter_map(|pair| pair.split_once('='))
            .find(|(key, _)| *key == BASE_ADDRESS_PARAM)
            .and_then(|(_, value)| value.parse::<u64>().ok())
            .ok_or_else(invalid)?;

        Ok(MemoryLocator {
            scheme: scheme.to_string(),
            session_id: session_id.to_string(),
            base_address,
        })
    }
}

/// Host side of view management.
///
/// Calls may suspend inside the host, the bridge does not assume anything is
/// ready when they return.
pub trait Workbench {
    /// All open views of `view_type`, across every layout group.
    fn open_views(&self, view_type: &str) -> Vec<ViewId>;

    fn close_view(&mut self, view: ViewId) -> anyhow::Result<()>;

    /// Open a view of `view_type` for `locator`.
    fn open_view(&mut self, locator: &str, view_type: &str) -> anyhow::Result<ViewId>;

    /// Move a view into the layout group next to the current one.
    fn move_to_adjacent_group(&mut self, view: ViewId) -> anyhow::Result<()>;
}

/// Focus of the requested byte once a freshly opened memory view is initialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeferredFocus {
    pub view: ViewId,
    pub address: u64,
}

impl DeferredFocus {
    /// Post the focus to the opened view, or to the active one if the opened view
    /// has not registered (yet). Nothing happens if neither is known.
    pub fn run(&self, registry: &EditorRegistry) {
        let Some(channel) = registry
            .channel(self.view)
            .or_else(|| registry.active_channel())
        else {
            log::debug!(
                target: "memory",
                "no channel for deferred focus at {:#x}",
                self.address
            );
            return;
        };
        weak_error!(
            channel.post(EditorMessage::SetFocusedByte {
                offset: self.address
            }),
            "deferred focus:"
        );
    }
}

pub struct MemoryViewManager {
    view_type: String,
    scheme: String,
    focus_delay: Duration,
    pending: Option<(TaskId, ViewId)>,
}

impl MemoryViewManager {
    pub fn new(config: &BridgeConfig) -> Self {
        Self {
            view_type: config.memory_view_type.clone(),
            scheme: config.memory_scheme.clone(),
            focus_delay: config.focus_delay(),
            pending: None,
        }
    }

    pub fn view_type(&self) -> &str {
        &self.view_type
    }

    pub fn locator(&self, session_id: &str, address: u64) -> MemoryLocator {
        MemoryLocator {
            scheme: self.scheme.clone(),
            session_id: session_id.to_string(),
            base_address: address,
        }
    }

    /// Replace any open memory views with a single one anchored at `address`.
    ///
    /// Stale views are closed best-effort, a close failure does not stop the new view
    /// from opening. Focus of `address` is scheduled for after the view initializes.
    /// Caller must make sure a debug session with `session_id` is active.
    pub fn open_memory_view(
        &mut self,
        address: u64,
        session_id: &str,
        workbench: &mut dyn Workbench,
        queue: &mut DeferredQueue<DeferredFocus>,
        now: Instant,
    ) -> Result<ViewId, Error> {
        if let Some((task, _)) = self.pending.take() {
            queue.cancel(task);
        }

        for view in workbench.open_views(&self.view_type) {
            log::debug!(target: "memory", "close stale memory {view}");
            weak_error!(workbench.close_view(view), "close stale memory view:");
        }

        let locator = self.locator(session_id, address).to_string();
        let view = workbench
            .open_view(&locator, &self.view_type)
            .map_err(Error::Workbench)?;
        log::info!(target: "memory", "memory {view} opened at {locator}");

        weak_error!(
            workbench.move_to_adjacent_group(view),
            "move memory view:"
        );

        let task = queue.schedule(now, self.focus_delay, DeferredFocus { view, address });
        self.pending = Some((task, view));
        Ok(view)
    }

    /// Host reported that `view` finished initialization. If a focus is pending for it,
    /// its timer is cancelled and the focus is returned for immediate execution.
    pub fn on_view_ready(
        &mut self,
        view: ViewId,
        queue: &mut DeferredQueue<DeferredFocus>,
    ) -> Option<DeferredFocus> {
        match self.pending {
            Some((task, pending_view)) if pending_view == view => {
                self.pending = None;
                queue.cancel(task)
            }
            _ => None,
        }
    }

    /// Forget a pending focus that was taken from the queue.
    pub fn on_task_fired(&mut self, task: TaskId) {
        if matches!(self.pending, Some((pending, _)) if pending == task) {
            self.pending = None;
        }
    }

    pub fn pending_view(&self) -> Option<ViewId> {
        self.pending.map(|(_, view)| view)
    }
}
