//! The traversal engine.
//!
//! `Sequencer` owns the root action list and a cursor into it. Advancing walks
//! the tree depth-first until it meets an action, entering branches and
//! climbing out of exhausted ones on the way, then invokes that action.

use tracing::{debug, trace, warn};

use crate::error::{QueueError, QueueResult};
use super::cursor::Cursor;
use super::model::{Action, Position, Route, Slot};
use super::shared::SharedSequencer;

/// Cursor-driven walker over a tree of actions.
///
/// `C` is the context handed to every action, `A` the argument type.
///
/// ```
/// use std::cell::RefCell;
/// use nestqueue::{Sequencer, Slot};
///
/// let say = |word: &'static str| {
///     Slot::action(move |log: &RefCell<Vec<&'static str>>, _: &[()]| {
///         log.borrow_mut().push(word);
///         Ok(())
///     })
/// };
/// let mut queue = Sequencer::new(vec![
///     say("intro"),
///     Slot::branch(vec![say("verse"), say("chorus")]),
///     say("outro"),
/// ]);
///
/// let log = RefCell::new(Vec::new());
/// queue.advance(&log, &[]).unwrap();
/// for _ in 0..4 {
///     queue.run_next(&log, &[]).unwrap();
/// }
/// assert_eq!(*log.borrow(), ["intro", "verse", "chorus", "outro", "intro"]);
/// ```
pub struct Sequencer<C, A> {
    root: Vec<Slot<C, A>>,
    cursor: Cursor,
}

enum Lookup<C, A> {
    PastEnd,
    Branch,
    Action(Action<C, A>),
}

impl<C, A> Sequencer<C, A> {
    // =========================================================================
    // INITIALIZATION
    // =========================================================================

    /// Creates a sequencer over `slots` with the cursor on the first slot.
    pub fn new(slots: impl IntoIterator<Item = Slot<C, A>>) -> Self {
        Self {
            root: slots.into_iter().collect(),
            cursor: Cursor::default(),
        }
    }

    /// Moves the sequencer behind a shared handle, for bound callbacks and
    /// actions that drive their own queue.
    pub fn into_shared(self) -> SharedSequencer<C, A> {
        SharedSequencer::new(self)
    }

    // =========================================================================
    // TREE ACCESS
    // =========================================================================

    pub fn root(&self) -> &[Slot<C, A>] {
        &self.root
    }

    /// Mutable access to the root list.
    ///
    /// The cursor addresses lists by route, so after a mutation it points at
    /// whatever now sits on that route. Advancing through a route that no
    /// longer leads to a branch fails with [`QueueError::BrokenCursor`].
    pub fn root_mut(&mut self) -> &mut Vec<Slot<C, A>> {
        &mut self.root
    }

    pub fn push(&mut self, slot: impl Into<Slot<C, A>>) -> &mut Self {
        self.root.push(slot.into());
        self
    }

    pub fn len(&self) -> usize {
        self.root.len()
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    // =========================================================================
    // CURSOR INSPECTION
    // =========================================================================

    /// Current cursor position, `None` while detached.
    pub fn position(&self) -> Option<Position> {
        self.cursor.position()
    }

    /// Index of the next slot to consider in the current list.
    pub fn index(&self) -> usize {
        self.cursor.index()
    }

    /// Number of branches currently descended through.
    pub fn depth(&self) -> usize {
        self.cursor.depth()
    }

    /// True after [`ascend`](Self::ascend) was called at the root. The next
    /// advance starts over from the root.
    pub fn is_detached(&self) -> bool {
        self.cursor.is_detached()
    }

    /// Slot under the cursor, `None` when past the end or detached.
    pub fn current_slot(&self) -> QueueResult<Option<&Slot<C, A>>> {
        self.cursor.slot(&self.root)
    }

    // =========================================================================
    // ADVANCING
    // =========================================================================

    /// Moves the cursor onto the next action and returns it without invoking.
    ///
    /// If the cursor already rests on an action it stays there. Exhausted
    /// lists are left and the parent moves past the branch; exhausting the
    /// root starts over from its first slot. A second wrap in the same search
    /// means the tree holds no action at all.
    pub fn seek(&mut self) -> QueueResult<Action<C, A>> {
        let mut wrapped = false;
        loop {
            let found = match self.cursor.slot(&self.root)? {
                None => Lookup::PastEnd,
                Some(Slot::Branch(_)) => Lookup::Branch,
                Some(Slot::Action(action)) => Lookup::Action(action.clone()),
            };

            match found {
                Lookup::Action(action) => return Ok(action),
                Lookup::Branch => {
                    self.cursor.enter();
                    trace!(depth = self.cursor.depth(), "entered branch");
                }
                Lookup::PastEnd => {
                    if self.cursor.leave() {
                        self.cursor.step();
                        trace!(
                            depth = self.cursor.depth(),
                            index = self.cursor.index(),
                            "left exhausted branch"
                        );
                        continue;
                    }
                    if wrapped {
                        self.cursor.reset();
                        warn!(slots = self.root.len(), "queue holds no reachable action");
                        return Err(QueueError::NoReachableAction);
                    }
                    wrapped = true;
                    self.cursor.reset();
                    trace!("wrapped to root");
                }
            }
        }
    }

    /// Finds the next action from the cursor and invokes it with `ctx` and
    /// `args`.
    ///
    /// The cursor stays on the invoked action; use [`run_next`](Self::run_next)
    /// to move past it. An action error is returned unchanged as
    /// [`QueueError::Action`].
    pub fn advance(&mut self, ctx: &C, args: &[A]) -> QueueResult<&mut Self> {
        let action = self.claim()?;
        action.call(ctx, args).map_err(QueueError::action)?;
        Ok(self)
    }

    /// Moves the index one slot forward, then behaves like
    /// [`advance`](Self::advance).
    ///
    /// A fresh or reset queue has nothing to move past, so there the first
    /// slot runs. After `skip`, `goto`, `goto_path` or `descend` the slot
    /// the cursor was placed on is skipped; use `advance` to run it.
    pub fn run_next(&mut self, ctx: &C, args: &[A]) -> QueueResult<&mut Self> {
        self.step_past_settled();
        self.advance(ctx, args)
    }

    /// Seeks the next action and marks it as run before it is invoked, so
    /// that an action re-entering the queue sees itself as done.
    pub(crate) fn claim(&mut self) -> QueueResult<Action<C, A>> {
        let action = self.seek()?;
        self.cursor.settle();
        debug!(position = ?self.cursor.position(), "invoking action");
        Ok(action)
    }

    pub(crate) fn step_past_settled(&mut self) {
        if self.cursor.is_settled() {
            self.cursor.step();
        }
    }

    // =========================================================================
    // NAVIGATION
    // =========================================================================

    /// Enters the branch under the cursor.
    pub fn descend(&mut self) -> QueueResult<&mut Self> {
        let is_branch = matches!(self.cursor.slot(&self.root)?, Some(Slot::Branch(_)));
        if !is_branch {
            return Err(QueueError::not_a_branch(self.cursor.path(), self.cursor.index()));
        }
        self.cursor.enter();
        Ok(self)
    }

    /// Returns to the position the last descent started from. The branch slot
    /// counts as run, so the following `run_next` moves past it.
    ///
    /// At the root there is nothing to return to: the cursor detaches and the
    /// next advance starts over from the root.
    pub fn ascend(&mut self) -> &mut Self {
        if !self.cursor.leave() {
            debug!("ascended above the root, cursor detached");
        }
        self
    }

    /// Puts the cursor back on the first root slot and forgets every saved
    /// ancestor.
    pub fn reset(&mut self) -> &mut Self {
        self.cursor.reset();
        debug!("cursor reset");
        self
    }

    /// Moves the index `count` slots forward, or backward when negative.
    /// Zero counts as one. Moving backward stops at the first slot.
    pub fn skip(&mut self, count: isize) -> &mut Self {
        let count = if count == 0 { 1 } else { count };
        self.cursor.attach();
        self.cursor
            .move_to(self.cursor.index().saturating_add_signed(count));
        debug!(count, index = self.cursor.index(), "skipped");
        self
    }

    /// Sets the index within the current list, or within the root list while
    /// detached.
    pub fn goto(&mut self, index: usize) -> &mut Self {
        self.cursor.attach();
        self.cursor.move_to(index);
        self
    }

    /// Moves the cursor along `route`, optionally starting from the root.
    ///
    /// A detached cursor applies the route from the root either way. Every
    /// index but the last must address a branch; otherwise
    /// [`QueueError::NotABranch`] is returned and the cursor does not move.
    pub fn goto_path(&mut self, route: impl Into<Route>, from_root: bool) -> QueueResult<&mut Self> {
        let route = route.into();
        let mut cursor = self.cursor.clone();
        if from_root {
            cursor.reset();
        }
        cursor.attach();
        for (step, &index) in route.as_slice().iter().enumerate() {
            if step > 0 {
                match cursor.slot(&self.root)? {
                    Some(Slot::Branch(_)) => cursor.enter(),
                    _ => return Err(QueueError::not_a_branch(cursor.path(), cursor.index())),
                }
            }
            cursor.move_to(index);
        }
        self.cursor = cursor;
        debug!(route = ?route.as_slice(), from_root, position = ?self.cursor.position(), "moved cursor");
        Ok(self)
    }
}

impl<C, A> Default for Sequencer<C, A> {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl<C, A> FromIterator<Slot<C, A>> for Sequencer<C, A> {
    fn from_iter<I: IntoIterator<Item = Slot<C, A>>>(iter: I) -> Self {
        Self::new(iter)
    }
}

impl<C, A> Extend<Slot<C, A>> for Sequencer<C, A> {
    fn extend<I: IntoIterator<Item = Slot<C, A>>>(&mut self, iter: I) {
        self.root.extend(iter);
    }
}

impl<C, A> std::fmt::Debug for Sequencer<C, A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sequencer")
            .field("root", &self.root)
            .field("cursor", &self.cursor)
            .finish()
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    type Log = RefCell<Vec<String>>;

    fn say(name: &'static str) -> Slot<Log, i32> {
        Slot::action(move |log: &Log, args: &[i32]| {
            if args.is_empty() {
                log.borrow_mut().push(name.to_string());
            } else {
                log.borrow_mut().push(format!("{}{:?}", name, args));
            }
            Ok(())
        })
    }

    fn run(queue: &mut Sequencer<Log, i32>, times: usize) -> Vec<String> {
        let log = Log::default();
        for _ in 0..times {
            queue.run_next(&log, &[]).unwrap();
        }
        log.into_inner()
    }

    #[test]
    fn test_linear_traversal_wraps() {
        let mut queue = Sequencer::new(vec![say("a"), say("b"), say("c")]);
        let log = Log::default();
        queue.advance(&log, &[]).unwrap();
        queue.run_next(&log, &[]).unwrap().run_next(&log, &[]).unwrap();
        queue.run_next(&log, &[]).unwrap();
        assert_eq!(*log.borrow(), ["a", "b", "c", "a"]);
    }

    #[test]
    fn test_run_next_linear_traversal() {
        let mut queue = Sequencer::new(vec![say("a"), say("b"), say("c")]);
        assert_eq!(run(&mut queue, 4), ["a", "b", "c", "a"]);
    }

    #[test]
    fn test_run_next_nested_traversal() {
        let mut queue = Sequencer::new(vec![
            say("a"),
            Slot::branch(vec![say("b"), say("c")]),
            say("d"),
        ]);
        assert_eq!(run(&mut queue, 5), ["a", "b", "c", "d", "a"]);
    }

    #[test]
    fn test_run_next_moves_past_repositioned_slot() {
        let mut queue = Sequencer::new(vec![say("a"), say("b"), say("c"), say("d")]);
        queue.skip(2);
        assert_eq!(run(&mut queue, 1), ["d"]);

        let log = Log::default();
        queue.reset().advance(&log, &[]).unwrap();
        queue.goto(1).run_next(&log, &[]).unwrap();
        assert_eq!(*log.borrow(), ["a", "c"]);

        queue.goto_path(vec![0], true).unwrap();
        assert_eq!(run(&mut queue, 1), ["b"]);

        // Reset restores the fresh state: the first slot runs.
        queue.reset();
        assert_eq!(run(&mut queue, 1), ["a"]);
    }

    #[test]
    fn test_run_next_after_descend_moves_past_first_child() {
        let mut queue = Sequencer::new(vec![Slot::branch(vec![say("b"), say("c")])]);
        queue.descend().unwrap();
        assert_eq!(run(&mut queue, 1), ["c"]);

        let log = Log::default();
        queue.reset().descend().unwrap().advance(&log, &[]).unwrap();
        assert_eq!(*log.borrow(), ["b"]);
    }

    #[test]
    fn test_run_next_after_ascend_leaves_branch() {
        let mut queue = Sequencer::new(vec![
            say("a"),
            Slot::branch(vec![say("b"), say("c")]),
            say("d"),
        ]);
        assert_eq!(run(&mut queue, 2), ["a", "b"]);
        queue.ascend();
        assert_eq!(run(&mut queue, 1), ["d"]);
    }

    #[test]
    fn test_nested_descent() {
        let mut queue = Sequencer::new(vec![
            say("a"),
            Slot::branch(vec![say("b"), say("c")]),
            say("d"),
        ]);
        let log = Log::default();
        queue.advance(&log, &[]).unwrap();
        for _ in 0..4 {
            queue.run_next(&log, &[]).unwrap();
        }
        assert_eq!(*log.borrow(), ["a", "b", "c", "d", "a"]);
    }

    #[test]
    fn test_deep_and_empty_branches_are_crossed() {
        let mut queue = Sequencer::new(vec![
            Slot::branch(vec![]),
            Slot::branch(vec![Slot::branch(vec![say("a")]), Slot::branch(vec![])]),
            Slot::branch(vec![Slot::branch(vec![Slot::branch(vec![say("b")])])]),
        ]);
        let log = Log::default();
        queue.advance(&log, &[]).unwrap();
        assert_eq!(queue.position(), Some(Position::new(vec![1, 0], 0)));
        queue.run_next(&log, &[]).unwrap();
        assert_eq!(queue.position(), Some(Position::new(vec![2, 0, 0], 0)));
        queue.run_next(&log, &[]).unwrap();
        assert_eq!(*log.borrow(), ["a", "b", "a"]);
    }

    #[test]
    fn test_advance_stays_on_current_action() {
        let mut queue = Sequencer::new(vec![say("a"), say("b")]);
        let log = Log::default();
        queue.advance(&log, &[]).unwrap().advance(&log, &[]).unwrap();
        assert_eq!(*log.borrow(), ["a", "a"]);
    }

    #[test]
    fn test_skip() {
        let mut queue = Sequencer::new(vec![say("a"), say("b"), say("c"), say("d")]);
        let log = Log::default();
        queue.skip(2).advance(&log, &[]).unwrap();
        assert_eq!(*log.borrow(), ["c"]);

        queue.reset().skip(0).advance(&log, &[]).unwrap();
        queue.reset().skip(1).advance(&log, &[]).unwrap();
        assert_eq!(*log.borrow(), ["c", "b", "b"]);
    }

    #[test]
    fn test_skip_backward_saturates() {
        let mut queue = Sequencer::new(vec![say("a"), say("b"), say("c")]);
        queue.goto(2).skip(-1);
        assert_eq!(queue.index(), 1);
        queue.skip(-10);
        assert_eq!(queue.index(), 0);
    }

    #[test]
    fn test_skip_past_end_wraps() {
        let mut queue = Sequencer::new(vec![say("a"), say("b")]);
        let log = Log::default();
        queue.skip(5).advance(&log, &[]).unwrap();
        assert_eq!(*log.borrow(), ["a"]);
    }

    #[test]
    fn test_goto_path_from_root() {
        let mut queue = Sequencer::new(vec![
            say("a"),
            Slot::branch(vec![say("b"), Slot::branch(vec![say("c")])]),
            say("d"),
        ]);
        let log = Log::default();
        queue.goto_path([1, 1, 0], true).unwrap().advance(&log, &[]).unwrap();
        assert_eq!(*log.borrow(), ["c"]);
        assert_eq!(queue.depth(), 2);

        queue.run_next(&log, &[]).unwrap();
        assert_eq!(*log.borrow(), ["c", "d"]);
    }

    #[test]
    fn test_goto_path_relative_and_single_index() {
        let mut queue = Sequencer::new(vec![
            say("a"),
            Slot::branch(vec![say("b"), Slot::branch(vec![say("c"), say("e")])]),
        ]);
        queue.goto_path(1, false).unwrap().descend().unwrap();
        queue.goto_path(vec![1, 1], false).unwrap();
        assert_eq!(queue.position(), Some(Position::new(vec![1, 1], 1)));

        queue.goto_path(0, false).unwrap();
        assert_eq!(queue.position(), Some(Position::new(vec![1, 1], 0)));
    }

    #[test]
    fn test_goto_path_through_action_fails_without_moving() {
        let mut queue = Sequencer::new(vec![say("a"), Slot::branch(vec![say("b")])]);
        queue.goto(1);
        let err = queue.goto_path([0, 0], true).unwrap_err();
        assert!(matches!(err, QueueError::NotABranch { ref path, index: 0 } if path.is_empty()));
        assert_eq!(queue.position(), Some(Position::new(vec![], 1)));
    }

    #[test]
    fn test_descend_ascend_symmetry() {
        let mut queue = Sequencer::new(vec![
            say("a"),
            Slot::branch(vec![say("b"), Slot::branch(vec![say("c")])]),
        ]);
        queue.goto_path([1, 1], true).unwrap();
        let before = queue.position();
        queue.descend().unwrap();
        assert_eq!(queue.position(), Some(Position::new(vec![1, 1], 0)));
        queue.ascend();
        assert_eq!(queue.position(), before);
    }

    #[test]
    fn test_descend_on_action_fails() {
        let mut queue = Sequencer::new(vec![say("a")]);
        let err = queue.descend().unwrap_err();
        assert!(matches!(err, QueueError::NotABranch { index: 0, .. }));
        assert_eq!(queue.depth(), 0);
    }

    #[test]
    fn test_ascend_at_root_detaches_then_restarts() {
        let mut queue = Sequencer::new(vec![say("a"), say("b")]);
        queue.goto(1).ascend();
        assert!(queue.is_detached());
        assert_eq!(queue.position(), None);

        let log = Log::default();
        queue.advance(&log, &[]).unwrap();
        assert_eq!(*log.borrow(), ["a"]);
        assert!(!queue.is_detached());
    }

    #[test]
    fn test_moves_on_detached_cursor_start_from_root() {
        let mut queue = Sequencer::new(vec![say("a"), Slot::branch(vec![say("b"), say("c")])]);
        queue.goto_path([1, 0], true).unwrap().ascend().ascend();
        assert!(queue.is_detached());

        queue.goto_path(1, false).unwrap();
        assert!(!queue.is_detached());
        assert_eq!(queue.position(), Some(Position::new(vec![], 1)));

        queue.ascend().goto_path([1, 1], false).unwrap();
        let log = Log::default();
        queue.advance(&log, &[]).unwrap();
        assert_eq!(*log.borrow(), ["c"]);

        queue.ascend().ascend().goto(1);
        assert_eq!(queue.position(), Some(Position::new(vec![], 1)));
        queue.ascend().skip(1);
        assert_eq!(queue.position(), Some(Position::new(vec![], 1)));
    }

    #[test]
    fn test_reset_is_idempotent_and_clears_ancestors() {
        let mut queue = Sequencer::new(vec![
            say("a"),
            Slot::branch(vec![say("b"), Slot::branch(vec![say("c")])]),
        ]);
        queue.goto_path([1, 1, 0], true).unwrap();
        queue.reset();
        let once = queue.position();
        queue.reset();
        assert_eq!(queue.position(), once);
        assert_eq!(once, Some(Position::default()));

        // No stale ancestor is left to return to.
        queue.ascend();
        assert!(queue.is_detached());
    }

    #[derive(Default)]
    struct Recorder {
        name: &'static str,
        seen: RefCell<Option<(&'static str, Vec<i32>)>>,
    }

    #[test]
    fn test_argument_forwarding() {
        let mut queue: Sequencer<Recorder, i32> =
            Sequencer::new(vec![Slot::action(|ctx: &Recorder, args: &[i32]| {
                *ctx.seen.borrow_mut() = Some((ctx.name, args.to_vec()));
                Ok(())
            })]);
        let ctx = Recorder {
            name: "ctx",
            ..Recorder::default()
        };
        queue.advance(&ctx, &[7, 9]).unwrap();
        assert_eq!(ctx.seen.into_inner(), Some(("ctx", vec![7, 9])));
    }

    #[test]
    fn test_empty_queue_reports_no_action() {
        let mut queue: Sequencer<Log, i32> = Sequencer::default();
        let err = queue.advance(&Log::default(), &[]).unwrap_err();
        assert!(matches!(err, QueueError::NoReachableAction));

        let mut queue: Sequencer<Log, i32> =
            Sequencer::new(vec![Slot::branch(vec![]), Slot::branch(vec![Slot::branch(vec![])])]);
        let err = queue.run_next(&Log::default(), &[]).unwrap_err();
        assert!(matches!(err, QueueError::NoReachableAction));
        assert_eq!(queue.position(), Some(Position::default()));
    }

    #[test]
    fn test_action_error_propagates() {
        let mut queue: Sequencer<Log, i32> = Sequencer::new(vec![
            say("a"),
            Slot::action(|_: &Log, _: &[i32]| Err("boom".into())),
        ]);
        let log = Log::default();
        queue.advance(&log, &[]).unwrap();
        let err = queue.run_next(&log, &[]).unwrap_err();
        assert!(matches!(err, QueueError::Action(_)));
        assert_eq!(err.to_string(), "boom");
        // The cursor rests on the failed action and moves past it next time.
        assert_eq!(queue.index(), 1);
        queue.run_next(&log, &[]).unwrap();
        assert_eq!(*log.borrow(), ["a", "a"]);
    }

    #[test]
    fn test_appended_slots_are_reached() {
        let mut queue = Sequencer::new(vec![say("a")]);
        queue.push(say("b"));
        queue.extend(vec![Slot::branch(vec![say("c")])]);
        if let Some(branch) = queue.root_mut()[2].as_branch_mut() {
            branch.push(say("d"));
        }
        assert_eq!(queue.len(), 3);
        assert_eq!(run(&mut queue, 4), ["a", "b", "c", "d"]);
    }

    #[test]
    fn test_mutation_breaking_cursor_route() {
        let mut queue = Sequencer::new(vec![say("a"), Slot::branch(vec![say("b")])]);
        queue.goto_path([1, 0], true).unwrap();
        queue.root_mut()[1] = say("x");
        let err = queue.advance(&Log::default(), &[]).unwrap_err();
        assert!(matches!(err, QueueError::BrokenCursor { ref path } if path == &vec![1]));
    }

    #[test]
    fn test_forwarded_args_reach_every_step() {
        let mut queue = Sequencer::new(vec![say("a"), Slot::branch(vec![say("b")])]);
        let log = Log::default();
        queue.advance(&log, &[1]).unwrap().run_next(&log, &[2, 3]).unwrap();
        assert_eq!(*log.borrow(), ["a[1]", "b[2, 3]"]);
    }

    #[test]
    fn test_collect_from_iterator() {
        let queue: Sequencer<Log, i32> = ["a", "b"].into_iter().map(say).collect();
        assert_eq!(queue.len(), 2);
        assert!(!queue.is_empty());
        assert!(queue.current_slot().unwrap().unwrap().is_action());
    }
}
