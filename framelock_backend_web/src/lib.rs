// Copyright 2026 the Framelock Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Browser backend for framelock.
//!
//! This crate connects a [`PlaybackController`] to the DOM:
//!
//! - [`VideoElement`] and [`SeekInput`]: the `<video>` and `<input type=range>`
//!   collaborators
//! - [`DomView`]: frame/time labels, play button, control strip, and an
//!   optional [`OverlayRenderer`]
//! - [`AnimationLoop`]: `requestAnimationFrame` ticks that run while the
//!   controller asks for them
//! - [`WebPlayer`]: wires all of the above with event listeners and a
//!   `setTimeout` for named timers
//! - [`ConsoleLogger`]: a `log` backend writing to the browser console
//!
//! [`PlaybackController`]: framelock_core::controller::PlaybackController

#![no_std]
#![cfg_attr(
    not(target_arch = "wasm32"),
    allow(dead_code, reason = "this crate only runs in the browser")
)]

extern crate alloc;

mod listener;
mod logger;
mod media;
mod player;
mod raf;
mod timeout;
mod view;

pub use listener::EventListener;
pub use logger::{ConsoleLogger, init_logger};
pub use media::{SeekInput, VideoElement};
pub use player::{PlayerElements, WebPlayer};
pub use raf::AnimationLoop;
pub use view::{DomView, OverlayRenderer};

use framelock_core::time::HostTime;

/// Returns the current host time from `performance.now()`.
#[must_use]
pub fn now() -> HostTime {
    HostTime::from_millis_f64(raf::performance_now())
}
