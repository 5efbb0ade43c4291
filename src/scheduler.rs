//! Single-slot tick scheduler
//!
//! The scan loop never chains callbacks: the controller owns one
//! [`TickSlot`] and at most one [`PendingTick`] is outstanding at any time.
//! Scheduling replaces (cancels) whatever was pending, and a tick only runs
//! if it is still the one in the slot when its turn comes.

/// Opaque handle to the next scheduled capture attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PendingTick(u64);

impl PendingTick {
    /// Sequence number (monotonic per slot)
    pub fn id(&self) -> u64 {
        self.0
    }
}

/// Holder of the single outstanding tick
#[derive(Debug, Default)]
pub struct TickSlot {
    next_id: u64,
    pending: Option<PendingTick>,
}

impl TickSlot {
    /// Create an empty slot
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule a new tick, cancelling any tick already pending
    pub fn schedule(&mut self) -> PendingTick {
        self.cancel();
        self.next_id += 1;
        let tick = PendingTick(self.next_id);
        self.pending = Some(tick);
        tick
    }

    /// Cancel the pending tick. Returns true if one was outstanding.
    pub fn cancel(&mut self) -> bool {
        self.pending.take().is_some()
    }

    /// Consume `tick` if it is the one pending.
    ///
    /// A cancelled or superseded tick returns false and must not run.
    pub fn claim(&mut self, tick: PendingTick) -> bool {
        if self.pending == Some(tick) {
            self.pending = None;
            true
        } else {
            false
        }
    }

    /// The outstanding tick, if any
    pub fn pending(&self) -> Option<PendingTick> {
        self.pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schedule_replaces_pending() {
        let mut slot = TickSlot::new();
        let first = slot.schedule();
        let second = slot.schedule();
        assert_ne!(first, second);
        assert_eq!(slot.pending(), Some(second));

        // The superseded tick can no longer run
        assert!(!slot.claim(first));
        assert!(slot.claim(second));
        assert_eq!(slot.pending(), None);
    }

    #[test]
    fn test_claim_is_single_use() {
        let mut slot = TickSlot::new();
        let tick = slot.schedule();
        assert!(slot.claim(tick));
        assert!(!slot.claim(tick));
    }

    #[test]
    fn test_cancel_prevents_run() {
        let mut slot = TickSlot::new();
        let tick = slot.schedule();
        assert!(slot.cancel());
        assert!(!slot.cancel());
        assert!(!slot.claim(tick));
    }
}
