//! CLI entry point for agentdeck.

use std::cell::RefCell;
use std::io::IsTerminal;
use std::rc::Rc;

use anyhow::{Result, bail};
use clap::{Parser, Subcommand};

mod core;
mod demo;
mod logging;
mod settings;
mod term;
mod tui;

use crate::core::bus::EventBus;
use crate::core::events::{EventKind, UiEvent};
use crate::demo::DemoFeed;
use crate::settings::Settings;
use crate::term::TermCaps;

#[derive(Parser, Debug)]
#[command(
    name = "agentdeck",
    author,
    version,
    about = "Multi-pane terminal dashboard for an AI coding agent"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Drive the UI with a scripted event feed (no backend required)
    #[arg(long)]
    demo: bool,

    /// Disable all color output
    #[arg(long)]
    no_color: bool,

    /// Override the render tick interval in milliseconds
    #[arg(long)]
    tick_ms: Option<u64>,

    /// Log filter directive, e.g. "info" or "agentdeck=debug"
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Inspect or change persistent settings
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },
}

#[derive(Subcommand, Debug)]
enum SettingsAction {
    /// Print all settings and their current values
    List,
    /// Print one setting's current value
    Get { key: String },
    /// Set one setting and save
    Set { key: String, value: String },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(Commands::Settings { action }) = cli.command {
        return handle_settings(&action);
    }

    let log_path = logging::init(&cli.log_level)?;

    let mut settings = Settings::load().unwrap_or_else(|err| {
        eprintln!("warning: {err:#}; using default settings");
        Settings::default()
    });
    if let Some(tick) = cli.tick_ms {
        settings.tick_ms = tick.clamp(1, 1000);
    }

    let mut caps = TermCaps::detect();
    if cli.no_color || settings.theme == "mono" {
        caps = caps.without_color();
    }

    if !std::io::stdout().is_terminal() {
        bail!("agentdeck needs an interactive terminal; stdout is not a tty");
    }

    tracing::info!(?caps, log = %log_path.display(), demo = cli.demo, "starting");

    let bus = Rc::new(EventBus::new());
    let feed = cli.demo.then(|| Rc::new(RefCell::new(DemoFeed::new())));
    if let Some(feed) = &feed {
        // Bridge the outward UserInput event back into the scripted feed,
        // the same seam a real agent backend would attach to.
        let feed = Rc::clone(feed);
        bus.subscribe(EventKind::UserInput, move |event| {
            if let UiEvent::UserInput { text } = event {
                feed.borrow_mut().note_user_input(text);
            }
        });
    }

    tui::run(&bus, &settings, caps, feed)?;
    println!("agentdeck closed. goodbye");
    Ok(())
}

fn handle_settings(action: &SettingsAction) -> Result<()> {
    match action {
        SettingsAction::List => {
            let settings = Settings::load()?;
            for (key, value) in settings.entries() {
                println!("{key} = {value}");
            }
        }
        SettingsAction::Get { key } => {
            let settings = Settings::load()?;
            match settings.entries().iter().find(|(k, _)| *k == key.as_str()) {
                Some((_, value)) => println!("{value}"),
                None => bail!("unknown setting '{key}'"),
            }
        }
        SettingsAction::Set { key, value } => {
            let mut settings = Settings::load()?;
            settings.set(key, value)?;
            settings.save()?;
            println!("saved {key}");
        }
    }
    Ok(())
}
