//! One-way latch coordinating the discovery → transfer hand-off.
//!
//! # Why a latch and not a channel? (for beginners)
//!
//! The broadcaster and the transfer server need to agree on exactly one bit
//! of information: "a receiver has connected (or we gave up), stop
//! advertising".  The bit only ever goes from `false` to `true`, is polled
//! rather than awaited (the broadcaster checks it between sleep slices), and
//! is shared by reference between two tasks.  An `AtomicBool` expresses that
//! directly; a channel would add buffering and ownership machinery for a
//! value that never needs either.
//!
//! # Scope
//!
//! A [`ConnectedSignal`] belongs to a single transfer run: the use case
//! creates one, hands an `Arc` clone to the broadcaster, and keeps one for
//! the server.  Nothing here is `static` — two sequential runs in the same
//! process cannot observe each other's latch.

use std::sync::atomic::{AtomicBool, Ordering};

/// Edge-triggered "a receiver connected" latch, set at most once per run.
///
/// # Examples
///
/// ```rust
/// use lansend_core::ConnectedSignal;
///
/// let signal = ConnectedSignal::new();
/// assert!(!signal.is_set());
/// assert!(signal.set(), "first set performs the transition");
/// assert!(!signal.set(), "later sets are no-ops");
/// assert!(signal.is_set());
/// ```
pub struct ConnectedSignal {
    connected: AtomicBool,
}

impl ConnectedSignal {
    /// Creates an unset latch.
    pub fn new() -> Self {
        Self {
            connected: AtomicBool::new(false),
        }
    }

    /// Flips the latch, returning `true` only for the call that performed
    /// the `false → true` transition.
    ///
    /// Both the accept path and the timeout path call this; the return value
    /// lets whichever got there first log the hand-off exactly once.
    ///
    /// # Atomic ordering
    ///
    /// The `AcqRel` swap pairs with the `Acquire` load in [`is_set`]: writes
    /// made before `set()` are visible to any thread that observes the latch
    /// as set.
    pub fn set(&self) -> bool {
        !self.connected.swap(true, Ordering::AcqRel)
    }

    /// Returns whether the latch has been set.
    pub fn is_set(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }
}

impl Default for ConnectedSignal {
    fn default() -> Self {
        Self::new()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_connected_signal_starts_unset() {
        // Arrange / Act
        let signal = ConnectedSignal::new();

        // Assert
        assert!(!signal.is_set());
    }

    #[test]
    fn test_set_reports_transition_only_once() {
        // Arrange
        let signal = ConnectedSignal::new();

        // Act
        let first = signal.set();
        let second = signal.set();
        let third = signal.set();

        // Assert
        assert!(first, "first set must report the edge");
        assert!(!second);
        assert!(!third);
        assert!(signal.is_set());
    }

    #[test]
    fn test_exactly_one_thread_observes_the_edge() {
        // Arrange
        let signal = Arc::new(ConnectedSignal::new());
        let thread_count = 8;

        // Act – race many setters against each other
        let handles: Vec<_> = (0..thread_count)
            .map(|_| {
                let s = Arc::clone(&signal);
                thread::spawn(move || s.set())
            })
            .collect();

        let edges: Vec<bool> = handles
            .into_iter()
            .map(|h| h.join().expect("thread panicked"))
            .collect();

        // Assert – exactly one thread won the transition
        assert_eq!(
            edges.iter().filter(|&&e| e).count(),
            1,
            "the edge must be observed by exactly one setter"
        );
        assert!(signal.is_set());
    }

    #[test]
    fn test_two_signals_are_independent() {
        // Two runs in one process must not share latch state.
        let first_run = ConnectedSignal::new();
        let second_run = ConnectedSignal::new();

        first_run.set();

        assert!(first_run.is_set());
        assert!(!second_run.is_set());
    }

    #[test]
    fn test_default_creates_unset_signal() {
        assert!(!ConnectedSignal::default().is_set());
    }
}
