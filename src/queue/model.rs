//! Data model for nested action queues.
//!
//! A queue is a tree of [`Slot`]s: actions (leaves) and branches (child
//! queues). Cursor snapshots and goto routes live here too.

use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::error::ActionError;

/// Result returned by an action.
pub type ActionResult = Result<(), ActionError>;

// =============================================================================
// ACTION
// =============================================================================

/// An invokable unit of work.
///
/// Called with the context and argument slice handed to
/// [`Sequencer::advance`](super::Sequencer::advance). Cloning is cheap: the
/// callable is reference counted so it can be taken out of the tree before
/// it runs.
pub struct Action<C, A> {
    f: Rc<dyn Fn(&C, &[A]) -> ActionResult>,
}

impl<C, A> Action<C, A> {
    /// Wraps a callable.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&C, &[A]) -> ActionResult + 'static,
    {
        Self { f: Rc::new(f) }
    }

    /// Invokes the action.
    pub fn call(&self, ctx: &C, args: &[A]) -> ActionResult {
        (self.f)(ctx, args)
    }

    /// Returns true if both handles point at the same callable.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.f, &other.f)
    }
}

impl<C, A> Clone for Action<C, A> {
    fn clone(&self) -> Self {
        Self { f: Rc::clone(&self.f) }
    }
}

impl<C, A> fmt::Debug for Action<C, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Action(..)")
    }
}

// =============================================================================
// SLOT
// =============================================================================

/// One entry of an action list.
pub enum Slot<C, A> {
    /// A leaf, invoked when the cursor reaches it.
    Action(Action<C, A>),
    /// A child list, entered when the cursor reaches it.
    Branch(Vec<Slot<C, A>>),
}

impl<C, A> Slot<C, A> {
    /// Builds an action slot from a callable.
    pub fn action<F>(f: F) -> Self
    where
        F: Fn(&C, &[A]) -> ActionResult + 'static,
    {
        Self::Action(Action::new(f))
    }

    /// Builds a branch from any sequence of slots.
    pub fn branch(slots: impl IntoIterator<Item = Slot<C, A>>) -> Self {
        Self::Branch(slots.into_iter().collect())
    }

    pub fn is_action(&self) -> bool {
        matches!(self, Self::Action(_))
    }

    pub fn is_branch(&self) -> bool {
        matches!(self, Self::Branch(_))
    }

    pub fn as_action(&self) -> Option<&Action<C, A>> {
        match self {
            Self::Action(action) => Some(action),
            Self::Branch(_) => None,
        }
    }

    pub fn as_branch(&self) -> Option<&[Slot<C, A>]> {
        match self {
            Self::Branch(slots) => Some(slots.as_slice()),
            Self::Action(_) => None,
        }
    }

    /// Mutable access to a branch's slots, for appending or removing steps.
    pub fn as_branch_mut(&mut self) -> Option<&mut Vec<Slot<C, A>>> {
        match self {
            Self::Branch(slots) => Some(slots),
            Self::Action(_) => None,
        }
    }
}

impl<C, A> Clone for Slot<C, A> {
    fn clone(&self) -> Self {
        match self {
            Self::Action(action) => Self::Action(action.clone()),
            Self::Branch(slots) => Self::Branch(slots.clone()),
        }
    }
}

impl<C, A> fmt::Debug for Slot<C, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Action(action) => fmt::Debug::fmt(action, f),
            Self::Branch(slots) => f.debug_list().entries(slots).finish(),
        }
    }
}

impl<C, A> From<Action<C, A>> for Slot<C, A> {
    fn from(action: Action<C, A>) -> Self {
        Self::Action(action)
    }
}

impl<C, A> From<Vec<Slot<C, A>>> for Slot<C, A> {
    fn from(slots: Vec<Slot<C, A>>) -> Self {
        Self::Branch(slots)
    }
}

// =============================================================================
// POSITION
// =============================================================================

/// Snapshot of a cursor.
///
/// `path` holds the index of every branch descended through, starting at the
/// root; it identifies the current list. `index` is the slot to consider
/// next in that list. A detached cursor has no position.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Position {
    pub path: Vec<usize>,
    pub index: usize,
}

impl Position {
    pub fn new(path: Vec<usize>, index: usize) -> Self {
        Self { path, index }
    }

    /// Nesting depth below the root.
    pub fn depth(&self) -> usize {
        self.path.len()
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for step in &self.path {
            write!(f, "{}.", step)?;
        }
        write!(f, "{}", self.index)
    }
}

// =============================================================================
// ROUTE
// =============================================================================

/// Destination for [`Sequencer::goto_path`](super::Sequencer::goto_path).
///
/// A single index only moves within the current list. A list of indices is a
/// descent route: `[2, 1, 0]` selects slot 2, enters it, selects slot 1,
/// enters it and selects slot 0.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Route {
    Index(usize),
    Path(Vec<usize>),
}

impl Route {
    pub fn as_slice(&self) -> &[usize] {
        match self {
            Self::Index(index) => std::slice::from_ref(index),
            Self::Path(path) => path,
        }
    }
}

impl From<usize> for Route {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

impl From<Vec<usize>> for Route {
    fn from(path: Vec<usize>) -> Self {
        Self::Path(path)
    }
}

impl From<&[usize]> for Route {
    fn from(path: &[usize]) -> Self {
        Self::Path(path.to_vec())
    }
}

impl<const N: usize> From<[usize; N]> for Route {
    fn from(path: [usize; N]) -> Self {
        Self::Path(path.to_vec())
    }
}

// =============================================================================
// TESTS
// =============================================================================
