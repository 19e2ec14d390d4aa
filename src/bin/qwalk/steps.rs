//! Cursor commands accepted on the `qwalk` command line.

use std::fmt;
use std::str::FromStr;

use nestqueue::QueueResult;

use crate::script::{ScriptQueue, Transcript};

/// A single replayed command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// `run`: invoke the action under the cursor (or the next one found).
    Advance,
    /// `next`: move past the last action run and invoke the following one.
    Next,
    /// `skip` or `skip:N`.
    Skip(isize),
    /// `goto:1.0.2` moves relative to the current list, `goto:/1.0.2` from the root.
    Goto { route: Vec<usize>, from_root: bool },
    Reset,
    /// `down`
    Descend,
    /// `up`
    Ascend,
}

impl Step {
    /// Applies the command. Returns true if it invoked an action.
    pub fn apply(&self, queue: &mut ScriptQueue, transcript: &Transcript, args: &[String]) -> QueueResult<bool> {
        match self {
            Self::Advance => {
                queue.advance(transcript, args)?;
                return Ok(true);
            }
            Self::Next => {
                queue.run_next(transcript, args)?;
                return Ok(true);
            }
            Self::Skip(count) => {
                queue.skip(*count);
            }
            Self::Goto { route, from_root } => {
                queue.goto_path(route.clone(), *from_root)?;
            }
            Self::Reset => {
                queue.reset();
            }
            Self::Descend => {
                queue.descend()?;
            }
            Self::Ascend => {
                queue.ascend();
            }
        }
        Ok(false)
    }
}

impl FromStr for Step {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (name, arg) = match s.split_once(':') {
            Some((name, arg)) => (name, Some(arg)),
            None => (s, None),
        };
        match (name, arg) {
            ("run", None) => Ok(Self::Advance),
            ("next", None) => Ok(Self::Next),
            ("reset", None) => Ok(Self::Reset),
            ("down", None) => Ok(Self::Descend),
            ("up", None) => Ok(Self::Ascend),
            ("skip", None) => Ok(Self::Skip(1)),
            ("skip", Some(count)) => count
                .parse()
                .map(Self::Skip)
                .map_err(|e| format!("invalid skip count '{}': {}", count, e)),
            ("goto", Some(target)) => {
                let (from_root, target) = match target.strip_prefix('/') {
                    Some(rest) => (true, rest),
                    None => (false, target),
                };
                let route = target
                    .split('.')
                    .map(|part| part.parse::<usize>())
                    .collect::<Result<Vec<_>, _>>()
                    .map_err(|e| format!("invalid goto route '{}': {}", target, e))?;
                Ok(Self::Goto { route, from_root })
            }
            _ => Err(format!(
                "unknown step '{}' (expected run, next, skip[:N], goto:[/]I.J.K, reset, down or up)",
                s
            )),
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Advance => f.write_str("run"),
            Self::Next => f.write_str("next"),
            Self::Skip(count) => write!(f, "skip:{}", count),
            Self::Goto { route, from_root } => {
                let route: Vec<String> = route.iter().map(|i| i.to_string()).collect();
                write!(f, "goto:{}{}", if *from_root { "/" } else { "" }, route.join("."))
            }
            Self::Reset => f.write_str("reset"),
            Self::Descend => f.write_str("down"),
            Self::Ascend => f.write_str("up"),
        }
    }
}
