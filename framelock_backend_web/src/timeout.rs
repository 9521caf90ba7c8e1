// Copyright 2026 the Framelock Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A single re-armable `setTimeout`.
//!
//! The controller keeps its named timers as deadlines; the host only needs
//! one browser timeout aimed at the earliest of them. [`Timeout::arm`] moves
//! that timeout when the earliest deadline changes.

use alloc::boxed::Box;
use core::cell::Cell;

use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;

use framelock_core::time::HostTime;

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_name = "setTimeout")]
    fn set_timeout(callback: &JsValue, millis: i32) -> i32;

    #[wasm_bindgen(js_name = "clearTimeout")]
    fn clear_timeout(id: i32);
}

pub(crate) struct Timeout {
    closure: Closure<dyn FnMut()>,
    /// Browser handle and the deadline it was armed for.
    pending: Cell<Option<(i32, HostTime)>>,
}

impl Timeout {
    pub(crate) fn new(callback: impl FnMut() + 'static) -> Self {
        Self {
            closure: Closure::wrap(Box::new(callback) as Box<dyn FnMut()>),
            pending: Cell::new(None),
        }
    }

    /// Aims the timeout at `deadline`, or cancels it for `None`.
    pub(crate) fn arm(&self, deadline: Option<HostTime>, now: HostTime) {
        let current = self.pending.get();
        if current.map(|(_, at)| at) == deadline {
            return;
        }
        self.cancel();
        if let Some(deadline) = deadline {
            let id = set_timeout(
                self.closure.as_ref().unchecked_ref(),
                delay_millis(now, deadline),
            );
            self.pending.set(Some((id, deadline)));
        }
    }

    /// Forgets the fired timeout so the next [`arm`](Self::arm) re-arms.
    pub(crate) fn fired(&self) {
        self.pending.set(None);
    }

    pub(crate) fn cancel(&self) {
        if let Some((id, _)) = self.pending.take() {
            clear_timeout(id);
        }
    }
}

impl Drop for Timeout {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Whole milliseconds from `now` until `deadline`, rounded up so the
/// timeout never fires early.
fn delay_millis(now: HostTime, deadline: HostTime) -> i32 {
    let micros = deadline.saturating_duration_since(now).ticks();
    i32::try_from(micros.div_ceil(1_000)).unwrap_or(i32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delay_rounds_up() {
        assert_eq!(delay_millis(HostTime(0), HostTime(2_500_000)), 2_500);
        assert_eq!(delay_millis(HostTime(0), HostTime(1_001)), 2);
        assert_eq!(delay_millis(HostTime(5_000), HostTime(1_000)), 0);
    }

    #[test]
    fn delay_saturates() {
        assert_eq!(delay_millis(HostTime(0), HostTime(u64::MAX)), i32::MAX);
    }
}
