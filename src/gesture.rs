//! Continuous-gesture coalescing.
//!
//! Pointer-move events arrive faster than frames are painted. A
//! [`DragCoalescer`] keeps only the latest pending update and asks its owner
//! to schedule at most one frame callback at a time:
//!
//! ```text
//! move(a) -> push(a) == true   schedule callback
//! move(b) -> push(b) == false  a dropped, callback already pending
//! move(c) -> push(c) == false  b dropped
//! callback -> take() == Some(c)
//! ```
//!
//! # Examples
//!
//! ```
//! use ansicanvas::gesture::DragCoalescer;
//!
//! let mut drag = DragCoalescer::new();
//! assert!(drag.push((1, 1)));
//! assert!(!drag.push((2, 3)));
//! assert_eq!(drag.take(), Some((2, 3)));
//! assert_eq!(drag.take(), None);
//! ```

/// Latest-pending-wins update slot with a single scheduled flag.
#[derive(Clone, Debug)]
pub struct DragCoalescer<T> {
    pending: Option<T>,
    scheduled: bool,
    dropped: u64,
}

impl<T> DragCoalescer<T> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            pending: None,
            scheduled: false,
            dropped: 0,
        }
    }

    /// Store `update`, replacing any unapplied one.
    ///
    /// Returns `true` when the caller must schedule a frame callback, i.e.
    /// when none is pending yet.
    pub fn push(&mut self, update: T) -> bool {
        if self.pending.replace(update).is_some() {
            self.dropped = self.dropped.saturating_add(1);
        }
        if self.scheduled {
            return false;
        }
        self.scheduled = true;
        true
    }

    /// Run from the frame callback: clears the scheduled flag and returns
    /// the most recent update.
    pub fn take(&mut self) -> Option<T> {
        self.scheduled = false;
        self.pending.take()
    }

    /// Drop any pending update, e.g. when the gesture is cancelled.
    pub fn cancel(&mut self) {
        self.pending = None;
        self.scheduled = false;
    }

    #[must_use]
    pub fn is_scheduled(&self) -> bool {
        self.scheduled
    }

    #[must_use]
    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Updates overwritten before they were applied.
    #[must_use]
    pub fn dropped(&self) -> u64 {
        self.dropped
    }
}

impl<T> Default for DragCoalescer<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_schedule_per_frame() {
        let mut drag = DragCoalescer::new();
        assert!(drag.push(1));
        assert!(!drag.push(2));
        assert!(!drag.push(3));
        assert!(drag.is_scheduled());
        assert_eq!(drag.take(), Some(3));
        assert_eq!(drag.dropped(), 2);
        assert!(!drag.is_scheduled());

        assert!(drag.push(4), "new frame after the callback ran");
    }

    #[test]
    fn test_take_without_pending() {
        let mut drag: DragCoalescer<u8> = DragCoalescer::default();
        assert_eq!(drag.take(), None);
        assert!(!drag.has_pending());
    }

    #[test]
    fn test_cancel_discards() {
        let mut drag = DragCoalescer::new();
        drag.push("a");
        drag.cancel();
        assert!(!drag.has_pending());
        assert!(!drag.is_scheduled());
        assert!(drag.push("b"));
    }
}
