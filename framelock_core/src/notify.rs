// Copyright 2026 the Framelock Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Outbound notifications.
//!
//! The controller announces loading, frame advances, hover transitions, and
//! errors to any number of subscribers. A subscriber can stop a cancellable
//! notification by returning [`Propagation::Stop`]; the controller then skips
//! its own default reaction (e.g. hiding the controls on pointer leave).

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt;

/// What a subscriber sees about the player on hover transitions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HoverContext {
    /// The player is a thumbnail.
    pub thumbnail: bool,
    /// Frame on screen.
    pub frame_number: u64,
    /// Playback is intended.
    pub playing: bool,
}

/// A notification from the controller.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Notification {
    /// Media data loaded and the first frame is shown.
    Load,
    /// The playback position advanced.
    TimeUpdate {
        /// Frame at the new position.
        frame_number: u64,
    },
    /// The pointer entered the player. Cancellable: a thumbnail then stays
    /// paused.
    MouseEnter(HoverContext),
    /// The pointer left the player. Cancellable.
    MouseLeave(HoverContext),
    /// The media failed to load.
    Error,
}

/// A subscriber's verdict on a notification.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Propagation {
    /// Let the controller's default reaction proceed.
    Continue,
    /// Cancel the default reaction.
    Stop,
}

/// Handle returned by [`Observers::subscribe`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(u64);

type Handler = Box<dyn FnMut(&Notification) -> Propagation>;

/// Subscribers to controller notifications.
#[derive(Default)]
pub struct Observers {
    handlers: Vec<(SubscriptionId, Handler)>,
    next_id: u64,
}

impl fmt::Debug for Observers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observers")
            .field("handlers_len", &self.handlers.len())
            .field("next_id", &self.next_id)
            .finish()
    }
}

impl Observers {
    /// Creates an empty subscriber list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a subscriber.
    pub fn subscribe(
        &mut self,
        handler: impl FnMut(&Notification) -> Propagation + 'static,
    ) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.handlers.push((id, Box::new(handler)));
        id
    }

    /// Removes a subscriber. Returns `true` if it was subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.handlers.len();
        self.handlers.retain(|(sub, _)| *sub != id);
        self.handlers.len() != before
    }

    /// Removes every subscriber.
    pub fn clear(&mut self) {
        self.handlers.clear();
    }

    /// Delivers `notification` to every subscriber in subscription order.
    ///
    /// Returns `false` if any subscriber asked to stop. All subscribers run
    /// regardless.
    pub fn dispatch(&mut self, notification: &Notification) -> bool {
        let mut proceed = true;
        for (_, handler) in &mut self.handlers {
            if handler(notification) == Propagation::Stop {
                proceed = false;
            }
        }
        proceed
    }

    /// Number of subscribers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Returns `true` if there are no subscribers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::rc::Rc;
    use core::cell::Cell;

    #[test]
    fn stop_cancels_but_everyone_hears() {
        let heard = Rc::new(Cell::new(0));
        let mut observers = Observers::new();
        let h = Rc::clone(&heard);
        observers.subscribe(move |_| {
            h.set(h.get() + 1);
            Propagation::Stop
        });
        let h = Rc::clone(&heard);
        observers.subscribe(move |_| {
            h.set(h.get() + 1);
            Propagation::Continue
        });

        assert!(!observers.dispatch(&Notification::Load));
        assert_eq!(heard.get(), 2);
    }

    #[test]
    fn unsubscribe_removes_handler() {
        let mut observers = Observers::new();
        let id = observers.subscribe(|_| Propagation::Stop);
        assert!(!observers.dispatch(&Notification::Error));
        assert!(observers.unsubscribe(id));
        assert!(!observers.unsubscribe(id));
        assert!(observers.dispatch(&Notification::Error));
        assert!(observers.is_empty());
    }
}
