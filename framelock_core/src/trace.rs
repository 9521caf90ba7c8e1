// Copyright 2026 the Framelock Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing and diagnostics for the playback controller.
//!
//! [`TraceSink`] has one method per controller decision worth seeing when a
//! player misbehaves: media events as they arrive, seeks the controller
//! issues, fragment resets, intent flips, frame-rate changes, and why the
//! animation loop stopped. All methods default to no-ops.
//!
//! The controller owns a [`Tracer`]. When the `trace` feature is **off**, the
//! tracer holds nothing and every method compiles away. When **on**, each
//! method performs a single `Option` branch before dispatching.
//!
//! `framelock_debug` provides ready-made sinks (pretty printer, recorder,
//! Chrome trace export).

use alloc::boxed::Box;

use crate::fragment::FragmentError;
use crate::media::MediaEvent;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Why the controller moved the playback position.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SeekCause {
    /// Initial positioning after data loaded.
    Load,
    /// Seek bar value committed.
    SeekBar,
    /// Seek handle released while playing.
    Drag,
    /// Frame stepping from the keyboard.
    Key,
    /// Snapping to a frame boundary after a pause.
    Snap,
    /// Looping back to the start of a locked fragment.
    FragmentLoop,
}

/// Why intended playback changed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum IntentCause {
    /// Autoplay was consumed.
    Autoplay,
    /// Play/pause button or space bar.
    Toggle,
    /// The media ended without looping.
    Ended,
    /// A locked fragment ended without looping.
    FragmentEnd,
    /// A thumbnail was hovered or left.
    Hover,
}

/// Where a frame rate came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FrameRateSource {
    /// Supplied by the host.
    Configured,
    /// Overlay frame count divided by the duration.
    Overlay,
    /// No usable count; assumed 30 FPS worth of frames.
    Fallback,
}

/// Why the animation loop stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TickStopReason {
    /// The media element is paused or ended.
    MediaIdle,
    /// The user is dragging the seek handle.
    ManualSeek,
}

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Emitted when a media event reaches the controller.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MediaEventTrace {
    /// Which event.
    pub event: MediaEvent,
    /// Element position when the event was handled.
    pub current_time: f64,
    /// Whether the element was paused.
    pub paused: bool,
}

/// Emitted when the controller moves the playback position.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SeekTrace {
    /// Target in seconds.
    pub target: f64,
    /// Why.
    pub cause: SeekCause,
}

/// Emitted when a frame is handed to the view.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameTrace {
    /// Processed frame.
    pub frame_number: u64,
}

/// Emitted when a locked fragment's end is reached.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FragmentResetTrace {
    /// Frame that reached the end.
    pub candidate: u64,
    /// Fragment end frame.
    pub end_frame: u64,
    /// Whether playback looped back to the fragment start.
    pub looped: bool,
}

/// Emitted when intended playback flips.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IntentTrace {
    /// New intent.
    pub playing: bool,
    /// Why.
    pub cause: IntentCause,
}

/// Emitted when the frame rate is set or inferred.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameRateTrace {
    /// Frames per second.
    pub frame_rate: f64,
    /// Where it came from.
    pub source: FrameRateSource,
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives trace events from the controller.
///
/// All methods have default no-op implementations, so you only need to
/// override the events you care about.
pub trait TraceSink {
    /// Called when a media event is handled.
    fn on_media_event(&mut self, e: &MediaEventTrace) {
        _ = e;
    }

    /// Called when the controller seeks.
    fn on_seek(&mut self, e: &SeekTrace) {
        _ = e;
    }

    /// Called when a frame is processed.
    fn on_frame(&mut self, e: &FrameTrace) {
        _ = e;
    }

    /// Called when a locked fragment's end is reached.
    fn on_fragment_reset(&mut self, e: &FragmentResetTrace) {
        _ = e;
    }

    /// Called when intended playback flips.
    fn on_intent(&mut self, e: &IntentTrace) {
        _ = e;
    }

    /// Called when the frame rate changes.
    fn on_frame_rate(&mut self, e: &FrameRateTrace) {
        _ = e;
    }

    /// Called when the animation loop is told to stop.
    fn on_tick_stopped(&mut self, reason: TickStopReason) {
        _ = reason;
    }

    /// Called when the fragment is permanently unlocked by a scrub.
    fn on_fragment_unlocked(&mut self) {}

    /// Called when the source's media fragment could not be parsed.
    fn on_fragment_error(&mut self, error: &FragmentError) {
        _ = error;
    }
}

// ---------------------------------------------------------------------------
// NoopSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

// ---------------------------------------------------------------------------
// Tracer wrapper
// ---------------------------------------------------------------------------

/// Owning wrapper around an optional [`TraceSink`].
///
/// When the `trace` feature is **off**, the sink is dropped on
/// [`set_sink`](Self::set_sink) and every method compiles to nothing.
#[derive(Default)]
pub struct Tracer {
    #[cfg(feature = "trace")]
    sink: Option<Box<dyn TraceSink>>,
}

impl core::fmt::Debug for Tracer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

macro_rules! dispatch {
    ($self:ident, $method:ident($($arg:expr),*)) => {{
        #[cfg(feature = "trace")]
        if let Some(sink) = &mut $self.sink {
            sink.$method($($arg),*);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = ($($arg,)*);
        }
    }};
}

impl Tracer {
    /// Creates a tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// Installs `sink`, replacing the previous one.
    pub fn set_sink(&mut self, sink: Box<dyn TraceSink>) {
        #[cfg(feature = "trace")]
        {
            self.sink = Some(sink);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = sink;
        }
    }

    /// Removes and returns the installed sink.
    pub fn take_sink(&mut self) -> Option<Box<dyn TraceSink>> {
        #[cfg(feature = "trace")]
        {
            self.sink.take()
        }
        #[cfg(not(feature = "trace"))]
        {
            None
        }
    }

    /// Emits a [`MediaEventTrace`].
    #[inline]
    pub fn media_event(&mut self, e: &MediaEventTrace) {
        dispatch!(self, on_media_event(e));
    }

    /// Emits a [`SeekTrace`].
    #[inline]
    pub fn seek(&mut self, e: &SeekTrace) {
        dispatch!(self, on_seek(e));
    }

    /// Emits a [`FrameTrace`].
    #[inline]
    pub fn frame(&mut self, e: &FrameTrace) {
        dispatch!(self, on_frame(e));
    }

    /// Emits a [`FragmentResetTrace`].
    #[inline]
    pub fn fragment_reset(&mut self, e: &FragmentResetTrace) {
        dispatch!(self, on_fragment_reset(e));
    }

    /// Emits an [`IntentTrace`].
    #[inline]
    pub fn intent(&mut self, e: &IntentTrace) {
        dispatch!(self, on_intent(e));
    }

    /// Emits a [`FrameRateTrace`].
    #[inline]
    pub fn frame_rate(&mut self, e: &FrameRateTrace) {
        dispatch!(self, on_frame_rate(e));
    }

    /// Reports that the animation loop was told to stop.
    #[inline]
    pub fn tick_stopped(&mut self, reason: TickStopReason) {
        dispatch!(self, on_tick_stopped(reason));
    }

    /// Reports that a scrub released the fragment lock.
    #[inline]
    pub fn fragment_unlocked(&mut self) {
        dispatch!(self, on_fragment_unlocked());
    }

    /// Reports a fragment parse failure.
    #[inline]
    pub fn fragment_error(&mut self, error: &FragmentError) {
        dispatch!(self, on_fragment_error(error));
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noop_sink_compiles() {
        let mut sink = NoopSink;
        sink.on_media_event(&MediaEventTrace {
            event: MediaEvent::Play,
            current_time: 0.0,
            paused: false,
        });
        sink.on_tick_stopped(TickStopReason::MediaIdle);
        sink.on_fragment_unlocked();
    }

    #[test]
    fn tracer_none_does_nothing() {
        let mut tracer = Tracer::none();
        tracer.frame(&FrameTrace { frame_number: 3 });
        tracer.fragment_unlocked();
        assert!(tracer.take_sink().is_none());
    }

    #[cfg(feature = "trace")]
    #[test]
    fn tracer_dispatches_to_sink() {
        use alloc::rc::Rc;
        use alloc::vec::Vec;
        use core::cell::RefCell;

        struct RecordingSink {
            frames: Rc<RefCell<Vec<u64>>>,
        }
        impl TraceSink for RecordingSink {
            fn on_frame(&mut self, e: &FrameTrace) {
                self.frames.borrow_mut().push(e.frame_number);
            }
        }

        let frames = Rc::new(RefCell::new(Vec::new()));
        let mut tracer = Tracer::none();
        tracer.set_sink(Box::new(RecordingSink {
            frames: Rc::clone(&frames),
        }));
        tracer.frame(&FrameTrace { frame_number: 42 });
        tracer.seek(&SeekTrace {
            target: 1.0,
            cause: SeekCause::SeekBar,
        });
        assert_eq!(*frames.borrow(), [42]);
    }
}
