//! Command-line interface and REPL
//!
//! Each input line is either raw MIDI as hex bytes (`90 3C 64`) or a REPL
//! command. Routed commands are applied to the session like a host would.

use anyhow::{bail, Context, Result};
use colored::*;
use groovebox_router::config::AppConfig;
use groovebox_router::engine::ConsoleEngine;
use groovebox_router::learn::LearnTarget;
use groovebox_router::midi::{format_hex, parse_hex, RawMessage};
use groovebox_router::router::{RouteOutcome, Router};
use groovebox_router::routing::TargetKind;
use groovebox_router::scale::note_name;
use groovebox_router::state::RoutingState;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tokio::sync::mpsc;
use tracing::{debug, warn};

const HELP: &str = "\
  <hex bytes>                 route a raw message, e.g. 90 3C 64
  state                       show the session
  learn <kind> <id> [label]   arm a learn target (track | global | macro)
  stats                       router counters
  help                        this text
  quit                        exit";

/// What the main loop should do after a line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplAction {
    Continue,
    Quit,
}

/// Read lines on a dedicated thread (rustyline blocks).
///
/// The channel closes on Ctrl+C / Ctrl+D.
pub fn spawn_line_reader(prompt: &'static str) -> Result<mpsc::UnboundedReceiver<String>> {
    let mut rl = DefaultEditor::new().context("Failed to initialize line editor")?;
    let (tx, rx) = mpsc::unbounded_channel();

    std::thread::Builder::new()
        .name("repl".to_string())
        .spawn(move || loop {
            match rl.readline(prompt) {
                Ok(line) => {
                    if !line.trim().is_empty() {
                        let _ = rl.add_history_entry(line.as_str());
                    }
                    if tx.send(line).is_err() {
                        break;
                    }
                }
                Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
                Err(e) => {
                    warn!("Readline error: {}", e);
                    break;
                }
            }
        })
        .context("Failed to spawn REPL thread")?;

    Ok(rx)
}

/// Interactive session: router + host state + console engine
pub struct Repl {
    router: Router,
    state: RoutingState,
    engine: ConsoleEngine,
    json: bool,
    /// `--echo` given: the self-test stays on across reloads
    force_echo: bool,
}

impl Repl {
    pub fn new(state: RoutingState, json: bool) -> Self {
        Self {
            router: Router::new(),
            state,
            engine: ConsoleEngine::new("console"),
            json,
            force_echo: false,
        }
    }

    /// Keep the echo self-test on regardless of the config file
    pub fn with_forced_echo(mut self) -> Self {
        self.force_echo = true;
        self.state.echo_test = true;
        self
    }

    pub fn state(&self) -> &RoutingState {
        &self.state
    }

    /// Apply a reloaded configuration
    pub fn reload(&mut self, config: &AppConfig) {
        config.apply_to(&mut self.state);
        if self.force_echo {
            self.state.echo_test = true;
        }
    }

    pub fn handle_line(&mut self, line: &str) -> Result<ReplAction> {
        let mut words = line.split_whitespace();
        let Some(first) = words.next() else {
            return Ok(ReplAction::Continue);
        };

        match first.to_ascii_lowercase().as_str() {
            "quit" | "exit" => return Ok(ReplAction::Quit),
            "help" | "?" => println!("{}", HELP),
            "state" => self.print_state(),
            "stats" => {
                let stats = self.router.stats();
                println!("  received {} / dropped {}", stats.received, stats.dropped);
            }
            "learn" => {
                let words: Vec<&str> = words.collect();
                let target = parse_learn_target(&words)?;
                println!("  {} {:?} #{} '{}'", "armed".yellow(), target.kind, target.id, target.label);
                self.state.arm_learn(target);
            }
            _ => {
                let bytes = parse_hex(line).with_context(|| format!("Not a command or hex bytes: {}", line))?;
                self.route(&bytes)?;
            }
        }

        Ok(ReplAction::Continue)
    }

    /// Route one raw message, dispatch it and apply the commands
    pub fn route(&mut self, bytes: &[u8]) -> Result<RouteOutcome> {
        let outcome = self.router.route(bytes, &self.state);
        debug!("{} → {} commands", format_hex(bytes), outcome.commands.len());

        if self.json {
            println!("{}", serde_json::to_string(&outcome).context("Failed to serialize outcome")?);
        } else {
            print_outcome(bytes, &outcome);
        }

        outcome.dispatch(&mut self.engine);
        self.state.apply_all(&outcome.commands);
        Ok(outcome)
    }

    fn print_state(&self) {
        let state = &self.state;
        println!("{}", "Session".bold().cyan());
        println!(
            "  bank {}  scale {} {}  echo {}  learn {}",
            state.bank,
            note_name(state.root_note),
            state.scale.display_name(),
            state.echo_test,
            if state.learn.is_active() { "on".green() } else { "off".normal() }
        );
        println!(
            "  transport: playing {} recording {}  engine calls {}",
            state.transport.playing,
            state.transport.recording,
            self.engine.call_count()
        );

        for (index, track) in state.tracks.iter().enumerate() {
            let marker = if index == state.selected_track { "▶" } else { " " };
            println!(
                "  {} track {} {:<12} midi_in {:>2} vol {:.2}",
                marker.green(),
                index,
                track.engine.to_string(),
                track.midi_in.as_raw(),
                track.volume
            );
        }

        for (layer, slot, entry) in state.routing.bindings() {
            println!(
                "  {} slot {} → {:?} #{} '{}' [{}, {}]",
                layer.to_string().yellow(),
                slot,
                entry.target,
                entry.target_id,
                entry.label,
                entry.min,
                entry.max
            );
        }
    }
}

fn parse_learn_target(words: &[&str]) -> Result<LearnTarget> {
    let [kind, id, label @ ..] = words else {
        bail!("usage: learn <track|global|macro> <id> [label]");
    };

    let kind = match kind.to_ascii_lowercase().as_str() {
        "track" | "param" => TargetKind::TrackParameter,
        "global" | "fx" => TargetKind::GlobalEffect,
        "macro" => TargetKind::Macro,
        other => bail!("unknown target kind '{}'", other),
    };
    let id: i32 = id.parse().with_context(|| format!("invalid target id '{}'", id))?;
    let label = if label.is_empty() { format!("{:?} {}", kind, id) } else { label.join(" ") };

    Ok(LearnTarget::new(kind, id, label))
}

fn print_outcome(bytes: &[u8], outcome: &RouteOutcome) {
    let decoded = RawMessage::decode(bytes)
        .map(|msg| msg.to_string())
        .unwrap_or_else(|| "short buffer".to_string());
    println!("{} {} ({})", "IN ".green(), format_hex(bytes), decoded.dimmed());

    if outcome.is_empty() {
        println!("    {}", "(dropped)".dimmed());
    }
    for command in &outcome.commands {
        println!("    {} {}", "CMD".cyan(), command);
    }
    for call in &outcome.engine_calls {
        println!("    {} {}", "ENG".magenta(), call);
    }
    for echo in &outcome.echo {
        println!("    {} {}", "OUT".red(), format_hex(echo));
    }
}
