//! CLI tool to step through a nested script.
//!
//! Usage:
//!   qwalk --script show.json [--steps next,next,skip:2,goto:/1.0,run] [--arg value]... [--json]

mod logging;
mod script;
mod steps;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;

use nestqueue::Position;
use script::{Fired, Transcript};
use steps::Step;

#[derive(Parser, Debug)]
#[command(
    name = "qwalk",
    about = "Replay cursor commands against a nested JSON script",
    version
)]
struct Args {
    /// Script file: a JSON array of step names and nested arrays
    #[arg(short, long, env = "QWALK_SCRIPT")]
    script: PathBuf,

    /// Comma separated commands: run, next, skip[:N], goto:[/]I.J.K, reset, down, up
    #[arg(
        short = 't',
        long,
        env = "QWALK_STEPS",
        value_delimiter = ',',
        default_value = "run"
    )]
    steps: Vec<Step>,

    /// Argument forwarded to every invoked step (repeatable)
    #[arg(short, long = "arg")]
    args: Vec<String>,

    /// Print the transcript as JSON
    #[arg(long, default_value = "false")]
    json: bool,
}

/// One line of output: the command, where it left the cursor, and what ran.
#[derive(Debug, Serialize)]
struct Line {
    step: String,
    position: Option<Position>,
    fired: Option<Fired>,
}

fn main() -> Result<()> {
    logging::init();
    let args = Args::parse();

    let nodes = script::load(&args.script)?;
    let mut queue = script::build(nodes);
    tracing::debug!(slots = queue.len(), path = %args.script.display(), "script loaded");

    let transcript = Transcript::default();
    let mut lines = Vec::with_capacity(args.steps.len());
    for step in &args.steps {
        let fired = step
            .apply(&mut queue, &transcript, &args.args)
            .with_context(|| format!("Step '{}' failed", step))?;
        lines.push(Line {
            step: step.to_string(),
            position: queue.position(),
            fired: if fired { transcript.last() } else { None },
        });
    }

    tracing::debug!(fired = transcript.len(), "replay finished");

    if args.json {
        println!("{}", serde_json::to_string_pretty(&lines)?);
        return Ok(());
    }

    for line in &lines {
        let position = line
            .position
            .as_ref()
            .map(|p| p.to_string())
            .unwrap_or_else(|| "-".to_string());
        match &line.fired {
            Some(fired) if fired.args.is_empty() => {
                println!("{:<14} @ {:<10} {}", line.step, position, fired.label)
            }
            Some(fired) => println!(
                "{:<14} @ {:<10} {} ({})",
                line.step,
                position,
                fired.label,
                fired.args.join(", ")
            ),
            None => println!("{:<14} @ {}", line.step, position),
        }
    }

    Ok(())
}
