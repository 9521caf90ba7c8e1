// Copyright 2026 the Framelock Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compact binary event recording and decoding.
//!
//! [`RecorderSink`] implements [`TraceSink`] and encodes each event into a
//! `Vec<u8>` as a tag, a host-time stamp, and little-endian fields.
//! [`decode`] reads them back as an iterator of [`Recorded`] events.
//!
//! Trace events carry no time of their own; the recorder stamps them with its
//! clock (wall time since creation by default).

use std::time::Instant;

use framelock_core::fragment::FragmentError;
use framelock_core::media::MediaEvent;
use framelock_core::time::HostTime;
use framelock_core::trace::{
    FragmentResetTrace, FrameRateSource, FrameRateTrace, FrameTrace, IntentCause, IntentTrace,
    MediaEventTrace, SeekCause, SeekTrace, TickStopReason, TraceSink,
};

// ---------------------------------------------------------------------------
// Event type discriminants
// ---------------------------------------------------------------------------

const TAG_MEDIA_EVENT: u8 = 1;
const TAG_SEEK: u8 = 2;
const TAG_FRAME: u8 = 3;
const TAG_FRAGMENT_RESET: u8 = 4;
const TAG_INTENT: u8 = 5;
const TAG_FRAME_RATE: u8 = 6;
const TAG_TICK_STOPPED: u8 = 7;
const TAG_FRAGMENT_UNLOCKED: u8 = 8;
const TAG_FRAGMENT_ERROR: u8 = 9;

// ---------------------------------------------------------------------------
// RecorderSink
// ---------------------------------------------------------------------------

type Clock = Box<dyn FnMut() -> HostTime>;

/// A [`TraceSink`] that encodes timestamped events into a binary buffer.
pub struct RecorderSink {
    buf: Vec<u8>,
    clock: Clock,
}

impl std::fmt::Debug for RecorderSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecorderSink")
            .field("len", &self.buf.len())
            .finish_non_exhaustive()
    }
}

impl Default for RecorderSink {
    fn default() -> Self {
        Self::new()
    }
}

impl RecorderSink {
    /// Creates an empty recorder stamping events with time since creation.
    #[must_use]
    pub fn new() -> Self {
        let start = Instant::now();
        Self::with_clock(move || {
            let micros = start.elapsed().as_micros();
            HostTime(u64::try_from(micros).unwrap_or(u64::MAX))
        })
    }

    /// Creates an empty recorder stamping events with `clock`.
    #[must_use]
    pub fn with_clock(clock: impl FnMut() -> HostTime + 'static) -> Self {
        Self {
            buf: Vec::new(),
            clock: Box::new(clock),
        }
    }

    /// Returns a view of the recorded bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Consumes the recorder and returns the recorded bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    // -- encoding helpers --------------------------------------------------

    fn begin(&mut self, tag: u8) {
        let at = (self.clock)();
        self.write_u8(tag);
        self.write_u64(at.ticks());
    }

    fn write_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    fn write_bool(&mut self, v: bool) {
        self.write_u8(u8::from(v));
    }

    fn write_u64(&mut self, v: u64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_f64(&mut self, v: f64) {
        self.write_u64(v.to_bits());
    }
}

fn media_event_code(event: MediaEvent) -> u8 {
    match event {
        MediaEvent::LoadedMetadata => 0,
        MediaEvent::LoadedData => 1,
        MediaEvent::Ended => 2,
        MediaEvent::Pause => 3,
        MediaEvent::TimeUpdate => 4,
        MediaEvent::Play => 5,
        MediaEvent::Seeked => 6,
        MediaEvent::Error => 7,
    }
}

fn seek_cause_code(cause: SeekCause) -> u8 {
    match cause {
        SeekCause::Load => 0,
        SeekCause::SeekBar => 1,
        SeekCause::Drag => 2,
        SeekCause::Key => 3,
        SeekCause::Snap => 4,
        SeekCause::FragmentLoop => 5,
    }
}

fn intent_cause_code(cause: IntentCause) -> u8 {
    match cause {
        IntentCause::Autoplay => 0,
        IntentCause::Toggle => 1,
        IntentCause::Ended => 2,
        IntentCause::FragmentEnd => 3,
        IntentCause::Hover => 4,
    }
}

fn frame_rate_source_code(source: FrameRateSource) -> u8 {
    match source {
        FrameRateSource::Configured => 0,
        FrameRateSource::Overlay => 1,
        FrameRateSource::Fallback => 2,
    }
}

impl TraceSink for RecorderSink {
    fn on_media_event(&mut self, e: &MediaEventTrace) {
        self.begin(TAG_MEDIA_EVENT);
        self.write_u8(media_event_code(e.event));
        self.write_f64(e.current_time);
        self.write_bool(e.paused);
    }

    fn on_seek(&mut self, e: &SeekTrace) {
        self.begin(TAG_SEEK);
        self.write_f64(e.target);
        self.write_u8(seek_cause_code(e.cause));
    }

    fn on_frame(&mut self, e: &FrameTrace) {
        self.begin(TAG_FRAME);
        self.write_u64(e.frame_number);
    }

    fn on_fragment_reset(&mut self, e: &FragmentResetTrace) {
        self.begin(TAG_FRAGMENT_RESET);
        self.write_u64(e.candidate);
        self.write_u64(e.end_frame);
        self.write_bool(e.looped);
    }

    fn on_intent(&mut self, e: &IntentTrace) {
        self.begin(TAG_INTENT);
        self.write_bool(e.playing);
        self.write_u8(intent_cause_code(e.cause));
    }

    fn on_frame_rate(&mut self, e: &FrameRateTrace) {
        self.begin(TAG_FRAME_RATE);
        self.write_f64(e.frame_rate);
        self.write_u8(frame_rate_source_code(e.source));
    }

    fn on_tick_stopped(&mut self, reason: TickStopReason) {
        self.begin(TAG_TICK_STOPPED);
        self.write_u8(match reason {
            TickStopReason::MediaIdle => 0,
            TickStopReason::ManualSeek => 1,
        });
    }

    fn on_fragment_unlocked(&mut self) {
        self.begin(TAG_FRAGMENT_UNLOCKED);
    }

    fn on_fragment_error(&mut self, error: &FragmentError) {
        self.begin(TAG_FRAGMENT_ERROR);
        let (kind, start, end) = match *error {
            FragmentError::UnsupportedFormat => (0, 0.0, 0.0),
            FragmentError::InvalidTime => (1, 0.0, 0.0),
            FragmentError::InvertedRange { start, end } => (2, start, end),
        };
        self.write_u8(kind);
        self.write_f64(start);
        self.write_f64(end);
    }
}

// ---------------------------------------------------------------------------
// Decoder
// ---------------------------------------------------------------------------

/// A decoded event with the time it was recorded.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Recorded {
    /// Recorder clock at the time of the event.
    pub at: HostTime,
    /// The event.
    pub event: RecordedEvent,
}

/// A decoded event from a binary recording.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RecordedEvent {
    /// A [`MediaEventTrace`].
    MediaEvent(MediaEventTrace),
    /// A [`SeekTrace`].
    Seek(SeekTrace),
    /// A [`FrameTrace`].
    Frame(FrameTrace),
    /// A [`FragmentResetTrace`].
    FragmentReset(FragmentResetTrace),
    /// An [`IntentTrace`].
    Intent(IntentTrace),
    /// A [`FrameRateTrace`].
    FrameRate(FrameRateTrace),
    /// The animation loop was told to stop.
    TickStopped(TickStopReason),
    /// A scrub released the fragment lock.
    FragmentUnlocked,
    /// The source's fragment could not be parsed.
    FragmentError(FragmentError),
}

impl RecordedEvent {
    /// Short event name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::MediaEvent(e) => e.event.dom_name(),
            Self::Seek(_) => "seek",
            Self::Frame(_) => "frame",
            Self::FragmentReset(_) => "fragment-reset",
            Self::Intent(_) => "intent",
            Self::FrameRate(_) => "frame-rate",
            Self::TickStopped(_) => "tick-stopped",
            Self::FragmentUnlocked => "fragment-unlocked",
            Self::FragmentError(_) => "fragment-error",
        }
    }
}

/// Decodes a byte slice produced by [`RecorderSink`] into an iterator of
/// [`Recorded`] events.
///
/// Iteration stops at the first truncated record or unknown tag.
pub fn decode(bytes: &[u8]) -> DecodeIter<'_> {
    DecodeIter {
        data: bytes,
        pos: 0,
    }
}

/// Iterator over decoded events.
#[derive(Debug)]
pub struct DecodeIter<'a> {
    data: &'a [u8],
    pos: usize,
}

impl DecodeIter<'_> {
    fn read_u8(&mut self) -> Option<u8> {
        let v = *self.data.get(self.pos)?;
        self.pos += 1;
        Some(v)
    }

    fn read_bool(&mut self) -> Option<bool> {
        Some(self.read_u8()? != 0)
    }

    fn read_u64(&mut self) -> Option<u64> {
        let bytes = self.data.get(self.pos..self.pos + 8)?;
        let v = u64::from_le_bytes(bytes.try_into().ok()?);
        self.pos += 8;
        Some(v)
    }

    fn read_f64(&mut self) -> Option<f64> {
        self.read_u64().map(f64::from_bits)
    }

    fn read_media_event(&mut self) -> Option<MediaEvent> {
        Some(match self.read_u8()? {
            0 => MediaEvent::LoadedMetadata,
            1 => MediaEvent::LoadedData,
            2 => MediaEvent::Ended,
            3 => MediaEvent::Pause,
            4 => MediaEvent::TimeUpdate,
            5 => MediaEvent::Play,
            6 => MediaEvent::Seeked,
            7 => MediaEvent::Error,
            _ => return None,
        })
    }

    fn read_seek_cause(&mut self) -> Option<SeekCause> {
        Some(match self.read_u8()? {
            0 => SeekCause::Load,
            1 => SeekCause::SeekBar,
            2 => SeekCause::Drag,
            3 => SeekCause::Key,
            4 => SeekCause::Snap,
            5 => SeekCause::FragmentLoop,
            _ => return None,
        })
    }

    fn read_intent_cause(&mut self) -> Option<IntentCause> {
        Some(match self.read_u8()? {
            0 => IntentCause::Autoplay,
            1 => IntentCause::Toggle,
            2 => IntentCause::Ended,
            3 => IntentCause::FragmentEnd,
            4 => IntentCause::Hover,
            _ => return None,
        })
    }

    fn read_frame_rate_source(&mut self) -> Option<FrameRateSource> {
        Some(match self.read_u8()? {
            0 => FrameRateSource::Configured,
            1 => FrameRateSource::Overlay,
            2 => FrameRateSource::Fallback,
            _ => return None,
        })
    }

    fn decode_event(&mut self, tag: u8) -> Option<RecordedEvent> {
        Some(match tag {
            TAG_MEDIA_EVENT => RecordedEvent::MediaEvent(MediaEventTrace {
                event: self.read_media_event()?,
                current_time: self.read_f64()?,
                paused: self.read_bool()?,
            }),
            TAG_SEEK => RecordedEvent::Seek(SeekTrace {
                target: self.read_f64()?,
                cause: self.read_seek_cause()?,
            }),
            TAG_FRAME => RecordedEvent::Frame(FrameTrace {
                frame_number: self.read_u64()?,
            }),
            TAG_FRAGMENT_RESET => RecordedEvent::FragmentReset(FragmentResetTrace {
                candidate: self.read_u64()?,
                end_frame: self.read_u64()?,
                looped: self.read_bool()?,
            }),
            TAG_INTENT => RecordedEvent::Intent(IntentTrace {
                playing: self.read_bool()?,
                cause: self.read_intent_cause()?,
            }),
            TAG_FRAME_RATE => RecordedEvent::FrameRate(FrameRateTrace {
                frame_rate: self.read_f64()?,
                source: self.read_frame_rate_source()?,
            }),
            TAG_TICK_STOPPED => RecordedEvent::TickStopped(match self.read_u8()? {
                0 => TickStopReason::MediaIdle,
                _ => TickStopReason::ManualSeek,
            }),
            TAG_FRAGMENT_UNLOCKED => RecordedEvent::FragmentUnlocked,
            TAG_FRAGMENT_ERROR => {
                let kind = self.read_u8()?;
                let start = self.read_f64()?;
                let end = self.read_f64()?;
                RecordedEvent::FragmentError(match kind {
                    0 => FragmentError::UnsupportedFormat,
                    1 => FragmentError::InvalidTime,
                    _ => FragmentError::InvertedRange { start, end },
                })
            }
            // Unknown tag; stop iteration.
            _ => return None,
        })
    }
}

impl Iterator for DecodeIter<'_> {
    type Item = Recorded;

    fn next(&mut self) -> Option<Self::Item> {
        let tag = self.read_u8()?;
        let at = HostTime(self.read_u64()?);
        let event = self.decode_event(tag)?;
        Some(Recorded { at, event })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
