// Copyright 2026 the Framelock Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Frame-accurate playback control for media viewers.
//!
//! `framelock_core` keeps a playable media element, a seek bar, and an
//! overlay view in agreement about which *frame* is on screen. It is `no_std`
//! compatible (with `alloc`) and talks to the platform only through the
//! traits in [`media`], so the same controller drives a browser `<video>`
//! element or a test double.
//!
//! # Architecture
//!
//! ```text
//!   host events (media, seek bar, pointer, keys, animation ticks)
//!       │
//!       ▼
//!   PlaybackController ──► PlaybackState (one Copy value)
//!       │        │
//!       │        └──► frame::* (time ↔ frame number, labels)
//!       ▼
//!   MediaElement / SeekBar / PlayerView ──► Observers, TraceSink
//! ```
//!
//! **[`frame`]**: pure conversions between continuous media time and
//! 1-based frame numbers, plus the frame and time display strings.
//!
//! **[`fragment`]**: W3C temporal media-fragment parsing (`#t=10,20`).
//!
//! **[`state`]**: [`PlaybackState`](state::PlaybackState), the grouped
//! playback, loading, and hover flags, and [`PlayerConfig`](state::PlayerConfig).
//!
//! **[`controller`]**: [`PlaybackController`](controller::PlaybackController),
//! the single writer of playback state.
//!
//! **[`media`]**: collaborator traits and the event enums the host feeds in.
//!
//! **[`timer`]**: cancellable deadlines keyed by name.
//!
//! **[`notify`]**: outbound notifications with cancellable propagation.
//!
//! **[`trace`]**: [`TraceSink`](trace::TraceSink) trait and the zero-overhead
//! [`Tracer`](trace::Tracer) wrapper.
//!
//! **[`time`]**: microsecond host time and durations.
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one branch
//!   per call site).

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

pub mod controller;
pub mod fragment;
pub mod frame;
pub mod media;
pub mod notify;
pub mod state;
pub mod time;
pub mod timer;
pub mod trace;
