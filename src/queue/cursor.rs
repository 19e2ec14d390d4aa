//! Cursor state: the current list, the index inside it, and the ancestor stack.
//!
//! The current list is never stored as a reference. Each saved [`Frame`]
//! records the index of the branch that was entered from its parent list, so
//! the chain of frames is the route from the root to the current list.
//! Pushing and popping a frame therefore always moves the list and the index
//! together.

use crate::error::{QueueError, QueueResult};
use super::model::{Position, Slot};

/// A saved ancestor position, pushed on descent and popped on ascent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Frame {
    /// Index of the branch slot inside the parent list.
    pub index: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Cursor {
    frames: Vec<Frame>,
    index: usize,
    /// Set by an ascent with an empty stack. The cursor then points at no list
    /// until the next reset.
    detached: bool,
    /// Clear only on a fresh or reset cursor. Any move or run settles it,
    /// and `run_next` moves past settled slots before advancing.
    settled: bool,
}

impl Cursor {
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn is_detached(&self) -> bool {
        self.detached
    }

    pub fn is_settled(&self) -> bool {
        self.settled
    }

    pub fn settle(&mut self) {
        self.settled = true;
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Route from the root to the current list.
    pub fn path(&self) -> Vec<usize> {
        self.frames.iter().map(|frame| frame.index).collect()
    }

    pub fn position(&self) -> Option<Position> {
        if self.detached {
            return None;
        }
        Some(Position::new(self.path(), self.index))
    }

    /// Resolves the current list inside `root`. `None` while detached.
    pub fn list<'t, C, A>(&self, root: &'t [Slot<C, A>]) -> QueueResult<Option<&'t [Slot<C, A>]>> {
        if self.detached {
            return Ok(None);
        }
        let mut list = root;
        for (depth, frame) in self.frames.iter().enumerate() {
            list = match list.get(frame.index) {
                Some(Slot::Branch(slots)) => slots.as_slice(),
                _ => return Err(QueueError::broken_cursor(self.path()[..=depth].to_vec())),
            };
        }
        Ok(Some(list))
    }

    /// The slot under the cursor, `None` when past the end or detached.
    pub fn slot<'t, C, A>(&self, root: &'t [Slot<C, A>]) -> QueueResult<Option<&'t Slot<C, A>>> {
        Ok(self.list(root)?.and_then(|list| list.get(self.index)))
    }

    /// Enters the branch under the cursor. The caller checks the slot shape.
    pub fn enter(&mut self) {
        self.frames.push(Frame { index: self.index });
        self.index = 0;
        self.settled = true;
    }

    /// Restores the last saved frame. With nothing saved the cursor detaches
    /// and `false` is returned.
    pub fn leave(&mut self) -> bool {
        match self.frames.pop() {
            Some(frame) => {
                self.index = frame.index;
                self.settled = true;
                true
            }
            None => {
                self.detached = true;
                self.index = 0;
                self.settled = false;
                false
            }
        }
    }

    /// Moves to `index` in the current list.
    pub fn move_to(&mut self, index: usize) {
        self.index = index;
        self.settled = true;
    }

    /// Puts a detached cursor back on the root so that a move has a list to
    /// apply to.
    pub fn attach(&mut self) {
        if self.detached {
            self.reset();
        }
    }

    pub fn step(&mut self) {
        self.move_to(self.index.saturating_add(1));
    }

    pub fn reset(&mut self) {
        self.frames.clear();
        self.index = 0;
        self.detached = false;
        self.settled = false;
    }
}
