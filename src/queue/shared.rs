//! Shared handle over a sequencer.
//!
//! `SharedSequencer` is what callbacks hold on to: every clone and every
//! closure produced by [`SharedSequencer::advance_callback`] acts on the same
//! queue, however it is invoked. The borrow on the queue is released before
//! the action runs, so actions may re-enter the queue they belong to.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::error::{QueueError, QueueResult};
use super::model::Position;
use super::sequencer::Sequencer;

/// Reference-counted handle to a [`Sequencer`].
pub struct SharedSequencer<C, A> {
    inner: Rc<RefCell<Sequencer<C, A>>>,
}

/// Non-owning handle, for actions that drive the queue they live in.
pub struct WeakSequencer<C, A> {
    inner: Weak<RefCell<Sequencer<C, A>>>,
}

impl<C, A> SharedSequencer<C, A> {
    pub fn new(queue: Sequencer<C, A>) -> Self {
        Self {
            inner: Rc::new(RefCell::new(queue)),
        }
    }

    /// Runs `f` with exclusive access to the queue.
    ///
    /// Navigation, tree mutation and inspection all go through here. Do not
    /// advance from inside `f`; use [`advance`](Self::advance) instead.
    pub fn update<R, F>(&self, f: F) -> R
    where
        F: FnOnce(&mut Sequencer<C, A>) -> R,
    {
        f(&mut self.inner.borrow_mut())
    }

    pub fn position(&self) -> Option<Position> {
        self.inner.borrow().position()
    }

    /// Same as [`Sequencer::advance`], invoking the action without holding
    /// the queue borrowed.
    pub fn advance(&self, ctx: &C, args: &[A]) -> QueueResult<()> {
        let action = self.inner.borrow_mut().claim()?;
        action.call(ctx, args).map_err(QueueError::action)
    }

    /// Same as [`Sequencer::run_next`], invoking the action without holding
    /// the queue borrowed.
    pub fn run_next(&self, ctx: &C, args: &[A]) -> QueueResult<()> {
        let action = {
            let mut queue = self.inner.borrow_mut();
            queue.step_past_settled();
            queue.claim()?
        };
        action.call(ctx, args).map_err(QueueError::action)
    }

    /// Closure bound to this queue that behaves like [`advance`](Self::advance).
    pub fn advance_callback(&self) -> impl Fn(&C, &[A]) -> QueueResult<()> {
        let queue = self.clone();
        move |ctx: &C, args: &[A]| queue.advance(ctx, args)
    }

    /// Closure bound to this queue that behaves like [`run_next`](Self::run_next).
    pub fn run_next_callback(&self) -> impl Fn(&C, &[A]) -> QueueResult<()> {
        let queue = self.clone();
        move |ctx: &C, args: &[A]| queue.run_next(ctx, args)
    }

    pub fn downgrade(&self) -> WeakSequencer<C, A> {
        WeakSequencer {
            inner: Rc::downgrade(&self.inner),
        }
    }

    /// Takes the sequencer back if this is the last handle.
    pub fn try_unwrap(self) -> Result<Sequencer<C, A>, Self> {
        Rc::try_unwrap(self.inner)
            .map(RefCell::into_inner)
            .map_err(|inner| Self { inner })
    }
}

impl<C, A> Clone for SharedSequencer<C, A> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<C, A> From<Sequencer<C, A>> for SharedSequencer<C, A> {
    fn from(queue: Sequencer<C, A>) -> Self {
        Self::new(queue)
    }
}

impl<C, A> WeakSequencer<C, A> {
    pub fn upgrade(&self) -> Option<SharedSequencer<C, A>> {
        self.inner.upgrade().map(|inner| SharedSequencer { inner })
    }
}

impl<C, A> Clone for WeakSequencer<C, A> {
    fn clone(&self) -> Self {
        Self {
            inner: Weak::clone(&self.inner),
        }
    }
}
