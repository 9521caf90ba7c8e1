// Copyright 2026 the Framelock Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Cancellable deadlines keyed by name.
//!
//! [`NamedTimers`] holds at most one outstanding deadline per name:
//! scheduling a name again replaces its deadline. The map only does the
//! bookkeeping; the host decides how to wake up (a `setTimeout`, an
//! animation tick, a test stepping the clock) and then calls
//! [`take_due`](NamedTimers::take_due).

use alloc::collections::BTreeMap;
use alloc::vec::Vec;

use crate::time::HostTime;

/// Timers the playback controller schedules.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TimerName {
    /// Hide the control strip after pointer inactivity.
    HideControls,
}

/// At most one pending deadline per name.
#[derive(Clone, Debug)]
pub struct NamedTimers<K> {
    deadlines: BTreeMap<K, HostTime>,
}

impl<K> Default for NamedTimers<K> {
    fn default() -> Self {
        Self {
            deadlines: BTreeMap::new(),
        }
    }
}

impl<K: Ord + Copy> NamedTimers<K> {
    /// Creates an empty set of timers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedules `name` to fire at `deadline`, replacing any pending
    /// deadline for the same name.
    pub fn schedule(&mut self, name: K, deadline: HostTime) {
        self.deadlines.insert(name, deadline);
    }

    /// Cancels `name`. Returns `true` if it was pending.
    pub fn cancel(&mut self, name: K) -> bool {
        self.deadlines.remove(&name).is_some()
    }

    /// Cancels everything.
    pub fn clear(&mut self) {
        self.deadlines.clear();
    }

    /// Pending deadline for `name`.
    #[must_use]
    pub fn deadline(&self, name: K) -> Option<HostTime> {
        self.deadlines.get(&name).copied()
    }

    /// Earliest pending deadline.
    #[must_use]
    pub fn next_deadline(&self) -> Option<HostTime> {
        self.deadlines.values().min().copied()
    }

    /// Removes and returns every timer whose deadline is at or before `now`,
    /// earliest first.
    pub fn take_due(&mut self, now: HostTime) -> Vec<K> {
        let mut due: Vec<(HostTime, K)> = self
            .deadlines
            .iter()
            .filter(|&(_, &deadline)| deadline <= now)
            .map(|(&name, &deadline)| (deadline, name))
            .collect();
        due.sort_by_key(|&(deadline, _)| deadline);
        for (_, name) in &due {
            self.deadlines.remove(name);
        }
        due.into_iter().map(|(_, name)| name).collect()
    }

    /// Returns `true` if nothing is pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.deadlines.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
    enum Name {
        A,
        B,
    }

    #[test]
    fn reschedule_replaces() {
        let mut timers = NamedTimers::new();
        timers.schedule(Name::A, HostTime(100));
        timers.schedule(Name::A, HostTime(500));
        assert_eq!(timers.deadline(Name::A), Some(HostTime(500)));
        assert!(timers.take_due(HostTime(200)).is_empty());
        assert_eq!(timers.take_due(HostTime(500)), [Name::A]);
        assert!(timers.is_empty());
    }

    #[test]
    fn cancel_prevents_firing() {
        let mut timers = NamedTimers::new();
        timers.schedule(Name::A, HostTime(100));
        assert!(timers.cancel(Name::A));
        assert!(!timers.cancel(Name::A));
        assert!(timers.take_due(HostTime(1_000)).is_empty());
    }

    #[test]
    fn due_in_deadline_order() {
        let mut timers = NamedTimers::new();
        timers.schedule(Name::A, HostTime(300));
        timers.schedule(Name::B, HostTime(100));
        assert_eq!(timers.next_deadline(), Some(HostTime(100)));
        assert_eq!(timers.take_due(HostTime(400)), [Name::B, Name::A]);
        assert_eq!(timers.next_deadline(), None);
    }
}
