// Copyright 2026 the Framelock Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Recording, pretty-printing, and Chrome trace export for framelock
//! diagnostics.
//!
//! This crate provides [`TraceSink`](framelock_core::trace::TraceSink)
//! implementations for development and post-mortem analysis of a
//! [`PlaybackController`](framelock_core::controller::PlaybackController):
//!
//! - [`pretty::PrettyPrintSink`]: one human-readable line per event.
//! - [`recorder::RecorderSink`]: compact timestamped binary recording with
//!   [`recorder::decode`] for playback.
//! - [`chrome::export`]: Chrome Trace Event Format JSON from recorded bytes.

pub mod chrome;
pub mod pretty;
pub mod recorder;
