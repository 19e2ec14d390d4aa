//! Nested action queue module.
//!
//! Provides the cursor-driven sequencer that walks a tree of actions one step
//! at a time.

pub mod model;
mod cursor;
pub mod sequencer;
pub mod shared;

#[cfg(feature = "wasm")]
pub mod wasm;

// Re-exports for convenience
pub use model::{Action, ActionResult, Position, Route, Slot};
pub use sequencer::Sequencer;
pub use shared::{SharedSequencer, WeakSequencer};

#[cfg(feature = "wasm")]
pub use wasm::JsSequencer;
