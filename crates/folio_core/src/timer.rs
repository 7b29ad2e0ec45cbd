//! Timer queue
//!
//! One-shot timeouts and repeating intervals on the page's virtual
//! millisecond clock. Timers fire in due-time order; ties fire in the order
//! they were scheduled. A callback is taken out of the queue while it runs so
//! it can freely schedule or clear timers (including itself) through the
//! [`Page`] it receives.

use slotmap::{new_key_type, SlotMap};

use crate::page::Page;

new_key_type! {
    /// Handle to a scheduled timeout or interval
    pub struct TimerId;
}

/// Timer callback; receives the page and its own id
pub type TimerCallback = Box<dyn FnMut(&mut Page, TimerId)>;

struct TimerEntry {
    due: u64,
    seq: u64,
    period: Option<u64>,
    /// `None` while the callback is running
    callback: Option<TimerCallback>,
}

#[derive(Default)]
pub(crate) struct Timers {
    entries: SlotMap<TimerId, TimerEntry>,
    next_seq: u64,
}

impl Timers {
    pub(crate) fn insert(
        &mut self,
        due: u64,
        period: Option<u64>,
        callback: TimerCallback,
    ) -> TimerId {
        let seq = self.bump_seq();
        self.entries.insert(TimerEntry {
            due,
            seq,
            period,
            callback: Some(callback),
        })
    }

    fn bump_seq(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }

    pub(crate) fn clear(&mut self, id: TimerId) -> bool {
        self.entries.remove(id).is_some()
    }

    pub(crate) fn contains(&self, id: TimerId) -> bool {
        self.entries.contains_key(id)
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    /// Earliest runnable timer due at or before `deadline`
    pub(crate) fn next_due(&self, deadline: u64) -> Option<TimerId> {
        self.entries
            .iter()
            .filter(|(_, entry)| entry.callback.is_some() && entry.due <= deadline)
            .min_by_key(|(_, entry)| (entry.due, entry.seq))
            .map(|(id, _)| id)
    }

    /// Take a timer's callback out for execution
    pub(crate) fn take(&mut self, id: TimerId) -> Option<(u64, TimerCallback)> {
        let entry = self.entries.get_mut(id)?;
        let callback = entry.callback.take()?;
        Some((entry.due, callback))
    }

    /// Return a callback after it ran
    ///
    /// Timeouts are dropped. Intervals are rescheduled one period later unless
    /// the callback cleared them while running.
    pub(crate) fn finish(&mut self, id: TimerId, callback: TimerCallback) {
        let seq = self.bump_seq();
        let Some(entry) = self.entries.get_mut(id) else {
            return;
        };
        match entry.period {
            Some(period) => {
                entry.due += period;
                entry.seq = seq;
                entry.callback = Some(callback);
            }
            None => {
                self.entries.remove(id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop() -> TimerCallback {
        Box::new(|_, _| {})
    }

    #[test]
    fn test_next_due_orders_by_time_then_sequence() {
        let mut timers = Timers::default();
        let late = timers.insert(50, None, noop());
        let first = timers.insert(10, None, noop());
        let second = timers.insert(10, None, noop());

        assert_eq!(timers.next_due(100), Some(first));
        timers.clear(first);
        assert_eq!(timers.next_due(100), Some(second));
        timers.clear(second);
        assert_eq!(timers.next_due(40), None);
        assert_eq!(timers.next_due(50), Some(late));
    }

    #[test]
    fn test_finish_reschedules_interval() {
        let mut timers = Timers::default();
        let id = timers.insert(30, Some(30), noop());
        let (due, callback) = timers.take(id).unwrap();
        assert_eq!(due, 30);
        assert_eq!(timers.next_due(1000), None);

        timers.finish(id, callback);
        assert!(timers.contains(id));
        assert_eq!(timers.next_due(59), None);
        assert_eq!(timers.next_due(60), Some(id));
    }

    #[test]
    fn test_finish_drops_timeout_and_cleared_interval() {
        let mut timers = Timers::default();
        let timeout = timers.insert(5, None, noop());
        let (_, callback) = timers.take(timeout).unwrap();
        timers.finish(timeout, callback);
        assert!(!timers.contains(timeout));

        let interval = timers.insert(5, Some(5), noop());
        let (_, callback) = timers.take(interval).unwrap();
        timers.clear(interval);
        timers.finish(interval, callback);
        assert_eq!(timers.len(), 0);
    }
}
