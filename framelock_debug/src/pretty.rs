// Copyright 2026 the Framelock Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per event
//! to a [`Write`](std::io::Write) destination (default: stderr).

use std::io::Write;

use framelock_core::fragment::FragmentError;
use framelock_core::trace::{
    FragmentResetTrace, FrameRateTrace, FrameTrace, IntentTrace, MediaEventTrace, SeekTrace,
    TickStopReason, TraceSink,
};

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink").finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self {
            writer: Box::new(std::io::stderr()),
        }
    }

    /// Creates a sink that writes to a boxed writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write>) -> Self {
        Self { writer }
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W) -> Self {
        Self { writer }
    }

    /// Consumes the sink and returns its writer.
    #[must_use]
    pub fn into_writer(self) -> W {
        self.writer
    }
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_media_event(&mut self, e: &MediaEventTrace) {
        let _ = writeln!(
            self.writer,
            "[media] {} at {:.3}s paused={}",
            e.event.dom_name(),
            e.current_time,
            e.paused,
        );
    }

    fn on_seek(&mut self, e: &SeekTrace) {
        let _ = writeln!(self.writer, "[seek] {:.3}s cause={:?}", e.target, e.cause);
    }

    fn on_frame(&mut self, e: &FrameTrace) {
        let _ = writeln!(self.writer, "[frame] {}", e.frame_number);
    }

    fn on_fragment_reset(&mut self, e: &FragmentResetTrace) {
        let action = if e.looped { "loop" } else { "stop" };
        let _ = writeln!(
            self.writer,
            "[fragment] frame={} end={} {action}",
            e.candidate, e.end_frame,
        );
    }

    fn on_intent(&mut self, e: &IntentTrace) {
        let intent = if e.playing { "play" } else { "pause" };
        let _ = writeln!(self.writer, "[intent] {intent} cause={:?}", e.cause);
    }

    fn on_frame_rate(&mut self, e: &FrameRateTrace) {
        let _ = writeln!(
            self.writer,
            "[fps] {:.3} source={:?}",
            e.frame_rate, e.source,
        );
    }

    fn on_tick_stopped(&mut self, reason: TickStopReason) {
        let _ = writeln!(self.writer, "[ticks] stopped reason={reason:?}");
    }

    fn on_fragment_unlocked(&mut self) {
        let _ = writeln!(self.writer, "[fragment] unlocked");
    }

    fn on_fragment_error(&mut self, error: &FragmentError) {
        let _ = writeln!(self.writer, "[fragment] ignored: {error}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use framelock_core::media::MediaEvent;
    use framelock_core::trace::{IntentCause, SeekCause};

    fn output(sink: PrettyPrintSink<Vec<u8>>) -> String {
        String::from_utf8(sink.into_writer()).unwrap()
    }

    #[test]
    fn pretty_print_media_event() {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new());
        sink.on_media_event(&MediaEventTrace {
            event: MediaEvent::LoadedData,
            current_time: 2.0,
            paused: true,
        });
        let output = output(sink);
        assert_eq!(output, "[media] loadeddata at 2.000s paused=true\n");
    }

    #[test]
    fn pretty_print_session() {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new());
        sink.on_seek(&SeekTrace {
            target: 0.5,
            cause: SeekCause::FragmentLoop,
        });
        sink.on_fragment_reset(&FragmentResetTrace {
            candidate: 11,
            end_frame: 10,
            looped: false,
        });
        sink.on_intent(&IntentTrace {
            playing: false,
            cause: IntentCause::FragmentEnd,
        });
        sink.on_fragment_error(&FragmentError::InvalidTime);

        let output = output(sink);
        let lines: Vec<_> = output.lines().collect();
        assert_eq!(lines.len(), 4, "got: {output}");
        assert_eq!(lines[0], "[seek] 0.500s cause=FragmentLoop");
        assert_eq!(lines[1], "[fragment] frame=11 end=10 stop");
        assert_eq!(lines[2], "[intent] pause cause=FragmentEnd");
        assert!(lines[3].contains("invalid media fragment time"), "got: {output}");
    }
}
