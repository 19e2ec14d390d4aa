//! nestqueue - Cursor-driven sequencer for nested action lists.
//!
//! A queue is a tree of actions and branches (child queues). Nothing runs on
//! its own: every call to [`Sequencer::advance`] or [`Sequencer::run_next`]
//! walks the tree depth-first to the next action and invokes exactly that one.
//! Between calls the cursor can be moved with `skip`, `goto_path`, `reset`,
//! `descend` and `ascend`.
//!
//! # Example
//!
//! ```rust
//! use std::cell::Cell;
//! use nestqueue::{Sequencer, Slot};
//!
//! // A slideshow: title, two chapters with their own slides, credits.
//! let show = |slide: u32| {
//!     Slot::action(move |screen: &Cell<u32>, _: &[()]| {
//!         screen.set(slide);
//!         Ok(())
//!     })
//! };
//! let mut deck = Sequencer::new(vec![
//!     show(1),
//!     Slot::branch(vec![show(10), show(11)]),
//!     Slot::branch(vec![show(20)]),
//!     show(99),
//! ]);
//!
//! let screen = Cell::new(0);
//! deck.run_next(&screen, &[]).unwrap();
//! assert_eq!(screen.get(), 1);
//!
//! // Jump straight to the second chapter, then click on.
//! deck.goto_path([2, 0], true).unwrap().advance(&screen, &[]).unwrap();
//! assert_eq!(screen.get(), 20);
//! deck.run_next(&screen, &[]).unwrap();
//! assert_eq!(screen.get(), 99);
//! ```

pub mod error;

// Queue module
pub mod queue;

// Re-exports for convenience
pub use error::{ActionError, QueueError, QueueResult};
pub use queue::{Action, ActionResult, Position, Route, Sequencer, SharedSequencer, Slot, WeakSequencer};

#[cfg(feature = "wasm")]
pub use queue::JsSequencer;
