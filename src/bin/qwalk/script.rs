//! Script files for `qwalk`.
//!
//! A script is a JSON array. Strings are steps, nested arrays are blocks:
//!
//! ```json
//! ["intro", ["verse", "chorus"], "outro"]
//! ```

use std::cell::RefCell;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use nestqueue::{Sequencer, Slot};

/// One entry of a script file.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum ScriptNode {
    Step(String),
    Block(Vec<ScriptNode>),
}

/// A step invocation as seen by the step itself.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Fired {
    pub label: String,
    pub args: Vec<String>,
}

/// Context handed to every step: collects what ran.
#[derive(Debug, Default)]
pub struct Transcript {
    fired: RefCell<Vec<Fired>>,
}

impl Transcript {
    fn record(&self, label: &str, args: &[String]) {
        self.fired.borrow_mut().push(Fired {
            label: label.to_string(),
            args: args.to_vec(),
        });
    }

    pub fn len(&self) -> usize {
        self.fired.borrow().len()
    }

    pub fn last(&self) -> Option<Fired> {
        self.fired.borrow().last().cloned()
    }
}

pub type ScriptQueue = Sequencer<Transcript, String>;

/// Parses a script from JSON text.
pub fn parse(json: &str) -> Result<Vec<ScriptNode>> {
    serde_json::from_str(json).context("Script must be a JSON array of strings and nested arrays")
}

/// Reads and parses a script file.
pub fn load(path: &Path) -> Result<Vec<ScriptNode>> {
    if !path.exists() {
        anyhow::bail!("Script file does not exist: {}", path.display());
    }
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read script {}", path.display()))?;
    parse(&json)
}

fn slot(node: ScriptNode) -> Slot<Transcript, String> {
    match node {
        ScriptNode::Step(label) => Slot::action(move |transcript: &Transcript, args: &[String]| {
            transcript.record(&label, args);
            Ok(())
        }),
        ScriptNode::Block(nodes) => Slot::branch(nodes.into_iter().map(slot)),
    }
}

/// Builds the queue for a parsed script.
pub fn build(nodes: Vec<ScriptNode>) -> ScriptQueue {
    nodes.into_iter().map(slot).collect()
}
