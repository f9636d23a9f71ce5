//! Replay recorded debug adapter traffic through the memory bridge.
//!
//! Every editor message the bridge would send to open views is printed to stdout,
//! which makes it easy to check why a view did (or did not) refresh.

use anyhow::{anyhow, bail, Context};
use clap::Parser;
use log::warn;
use membridge::bridge::Bridge;
use membridge::config::BridgeConfig;
use membridge::editor::{Channel, EditorMessage, ViewId};
use membridge::interceptor::Effect;
use membridge::memory_view::{MemoryLocator, Workbench};
use membridge::offset::parse_offset;
use membridge::transport::{FramedReader, JsonLinesReader, MessageSource};
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::rc::Rc;
use std::time::Instant;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Recorded DAP traffic (Content-Length framed unless --jsonl is set).
    trace: PathBuf,

    /// Input contains one JSON message per line.
    #[clap(long)]
    jsonl: bool,

    /// Number of editor views to simulate.
    #[clap(long, default_value_t = 1)]
    views: u64,

    /// Debug session id used in memory view locators.
    #[clap(long, default_value = "replay")]
    session: String,

    /// Base address of the first view (hex with 0x prefix, or decimal).
    #[clap(long)]
    base_address: Option<String>,

    /// After the replay, navigate to this variable like the variable picker does.
    #[clap(long)]
    goto_variable: Option<String>,

    /// Bridge config file (default: ~/.config/membridge/config.toml).
    #[clap(long, env = "MEMBRIDGE_CONFIG")]
    config: Option<PathBuf>,
}

struct StdoutChannel {
    view: ViewId,
}

impl Channel for StdoutChannel {
    fn view(&self) -> ViewId {
        self.view
    }

    fn post(&self, message: EditorMessage) -> anyhow::Result<()> {
        println!("{} <- {}", self.view, serde_json::to_string(&message)?);
        Ok(())
    }
}

/// Workbench that only prints what it is asked to do.
struct PrintingWorkbench {
    next_view: u64,
    memory_views: Vec<ViewId>,
    opened: Vec<(ViewId, String)>,
    closed: Vec<ViewId>,
}

impl PrintingWorkbench {
    fn new(first_view: u64, memory_views: Vec<ViewId>) -> Self {
        Self {
            next_view: first_view,
            memory_views,
            opened: vec![],
            closed: vec![],
        }
    }
}

impl Workbench for PrintingWorkbench {
    fn open_views(&self, _view_type: &str) -> Vec<ViewId> {
        self.memory_views.clone()
    }

    fn close_view(&mut self, view: ViewId) -> anyhow::Result<()> {
        println!("close {view}");
        self.memory_views.retain(|v| *v != view);
        self.closed.push(view);
        Ok(())
    }

    fn open_view(&mut self, locator: &str, view_type: &str) -> anyhow::Result<ViewId> {
        let view = ViewId::from(self.next_view);
        self.next_view += 1;
        println!("open {view} ({view_type}) at {locator}");
        self.memory_views.push(view);
        self.opened.push((view, locator.to_string()));
        Ok(view)
    }

    fn move_to_adjacent_group(&mut self, view: ViewId) -> anyhow::Result<()> {
        println!("move {view} to the adjacent group");
        Ok(())
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_default_env().init();

    let args = Args::parse();
    let config = BridgeConfig::from_file(args.config.as_deref()).context("load bridge config")?;

    let base_address = match args.base_address.as_deref() {
        Some(text) => {
            parse_offset(text)
                .ok_or_else(|| anyhow!("invalid base address: {text}"))?
                .offset
        }
        None => 0,
    };

    let mut bridge = Bridge::new(config.clone());
    bridge.start_session(args.session.clone());

    for id in 1..=args.views {
        let view = ViewId::from(id);
        let uri = (id == 1 && base_address != 0).then(|| {
            MemoryLocator {
                scheme: config.memory_scheme.clone(),
                session_id: args.session.clone(),
                base_address,
            }
            .to_string()
        });
        bridge.view_opened(view, Rc::new(StdoutChannel { view }), uri);
    }
    bridge.view_focused(ViewId::from(1));

    let file = File::open(&args.trace)
        .with_context(|| format!("open trace {}", args.trace.display()))?;
    let reader = BufReader::new(file);
    let mut source: Box<dyn MessageSource> = if args.jsonl {
        Box::new(JsonLinesReader::new(reader))
    } else {
        Box::new(FramedReader::new(reader))
    };

    let mut count = 0;
    loop {
        let message = match source.read_message() {
            Ok(Some(message)) => message,
            Ok(None) => break,
            Err(err) if err.is_fatal() => {
                return Err(err).context(format!("read message #{}", count + 1))
            }
            Err(err) => {
                warn!(target: "bridge", "message #{} skipped: {err:#}", count + 1);
                count += 1;
                continue;
            }
        };
        count += 1;

        let effect = bridge.on_raw_protocol_message(message);
        if effect != Effect::Ignored {
            println!("#{count}: {effect:?}");
        }
    }

    println!("{count} message(s) replayed, {} variable(s) cached", bridge.variables().len());
    for var in bridge.variables().iter() {
        println!(
            "  {} = {}",
            var.name,
            var.memory_reference.as_deref().unwrap_or("-")
        );
    }

    if let Some(name) = args.goto_variable.as_deref() {
        goto_variable(&mut bridge, name, args.views + 1)?;
    }

    Ok(())
}

fn goto_variable(bridge: &mut Bridge, name: &str, first_free_view: u64) -> anyhow::Result<()> {
    let Some(mut picker) = bridge.go_to_variable() else {
        bail!("no open editor view");
    };

    match picker.items().iter().position(|item| item.label == name) {
        Some(idx) => picker.highlight(idx),
        None => warn!(target: "navigator", "variable {name} not found"),
    }

    let memory_views = (1..first_free_view)
        .map(ViewId::from)
        .filter(|view| {
            bridge
                .registry()
                .document(*view)
                .is_some_and(|doc| doc.uri.is_some())
        })
        .collect();
    let mut workbench = PrintingWorkbench::new(first_free_view, memory_views);
    let now = Instant::now();
    let action = bridge.commit_variable(&mut picker, &mut workbench, now);
    drop(picker);
    println!("go to {name}: {action:?}");

    for view in workbench.closed.drain(..) {
        bridge.view_closed(view);
    }
    for (view, locator) in workbench.opened.drain(..) {
        bridge.view_opened(view, Rc::new(StdoutChannel { view }), Some(locator));
        bridge.view_focused(view);
    }
    let deadline = now + bridge.config().focus_delay();
    bridge.poll(deadline);

    Ok(())
}
