// Copyright 2026 the Framelock Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Conversions between continuous media time and discrete frame numbers.
//!
//! Frame numbers are 1-based: the frame shown at `t = 0` is frame
//! [`FRAME_ZERO_OFFSET`]. All functions here are pure and total for finite,
//! non-negative inputs with `frame_rate > 0`; anything else is the caller's
//! responsibility (the controller substitutes [`FALLBACK_FRAME_RATE`] while
//! the real rate is unknown).
//!
//! ```text
//!   time ──frame_number_from_time──► frame ──time_from_frame_number──► time'
//!   (continuous)                     (1-based)                  (frame start + ε)
//! ```

use alloc::format;
use alloc::string::String;
#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;

/// Offset between a zero-based frame index and the displayed frame number.
pub const FRAME_ZERO_OFFSET: u64 = 1;

/// Frame rate assumed when none was supplied and none can be inferred.
pub const FALLBACK_FRAME_RATE: f64 = 30.0;

/// Fraction of a frame added past the frame boundary by
/// [`time_from_frame_number`].
///
/// Landing *exactly* on a boundary makes some renderers show the previous
/// frame.
pub const FRAME_EPSILON: f64 = 0.01;

/// Returns `true` if `frame_rate` can be used for conversions.
#[inline]
#[must_use]
pub fn is_valid_frame_rate(frame_rate: f64) -> bool {
    frame_rate.is_finite() && frame_rate > 0.0
}

/// Converts a media time to the 1-based number of the frame shown at it.
///
/// When `time == duration` the time is pulled back by half a frame first, so
/// the terminal timestamp maps onto the last real frame instead of one past
/// it.
#[must_use]
#[expect(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "frame counts of finite non-negative media times fit in u64"
)]
pub fn frame_number_from_time(time: f64, duration: f64, frame_rate: f64) -> u64 {
    let mut time = time;
    if time == duration {
        time -= 0.5 / frame_rate;
    }
    (time * frame_rate + FRAME_ZERO_OFFSET as f64).floor() as u64
}

/// Converts a 1-based frame number to a media time just past the frame's
/// start.
#[must_use]
pub fn time_from_frame_number(frame_number: u64, frame_rate: f64) -> f64 {
    let index = frame_number.saturating_sub(FRAME_ZERO_OFFSET) as f64;
    (index + FRAME_EPSILON) / frame_rate
}

/// Snaps `current_time` to the start of the frame that contains it.
#[must_use]
pub fn clamped_time(current_time: f64, duration: f64, frame_rate: f64) -> f64 {
    time_from_frame_number(
        frame_number_from_time(current_time, duration, frame_rate),
        frame_rate,
    )
}

/// Total number of frames in a resource of the given duration.
#[must_use]
pub fn frame_count(duration: f64, frame_rate: f64) -> u64 {
    frame_number_from_time(duration, duration, frame_rate)
}

/// Formats `"<frame> / <total>"`.
#[must_use]
pub fn frame_count_string(frame_number: u64, duration: f64, frame_rate: f64) -> String {
    format!("{frame_number} / {}", frame_count(duration, frame_rate))
}

/// Formats the start of `frame_number` as `MM:SS.s`, or `HH:MM:SS.s` when the
/// resource is at least an hour long.
///
/// The time is rounded to tenths before it is split into segments, so a
/// value such as `59.96` s renders as `01:00.0`, never `00:60.0`.
#[must_use]
#[expect(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "tenths of a second of a finite non-negative time fit in u64"
)]
pub fn time_display_string(frame_number: u64, frame_rate: f64, duration: f64) -> String {
    let render_hours = (duration / 3600.0).floor() > 0.0;
    let time = time_from_frame_number(frame_number, frame_rate);
    let tenths = (time * 10.0).round() as u64;

    let hours = tenths / 36_000;
    let within_hour = tenths % 36_000;
    let minutes = within_hour / 600;
    let seconds = within_hour % 600;

    let mmss = format!("{minutes:02}:{:02}.{}", seconds / 10, seconds % 10);
    if render_hours {
        format!("{hours:02}:{mmss}")
    } else {
        mmss
    }
}
