// Copyright 2026 the Framelock Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chrome Trace Event Format exporter.
//!
//! [`export`] reads recorded bytes from a [`RecorderSink`](super::recorder::RecorderSink)
//! and writes [Chrome Trace Event Format][format] JSON to the given writer.
//!
//! Frame numbers and intended playback become counter tracks; everything
//! else is an instant event.
//!
//! [format]: https://docs.google.com/document/d/1CvAClvFfyA5R-PhYUmn5OOQtYMH4h6I0nSsKchNAySU

use std::io::{self, Write};

use serde_json::{Value, json};

use framelock_core::time::HostTime;

use crate::recorder::{Recorded, RecordedEvent, decode};

/// Exports recorded events as Chrome Trace Event Format JSON.
///
/// The output is a complete JSON array of trace event objects, suitable for
/// loading into `chrome://tracing` or [Perfetto](https://ui.perfetto.dev/).
pub fn export(bytes: &[u8], writer: &mut dyn Write) -> io::Result<()> {
    let events: Vec<Value> = decode(bytes).map(trace_event).collect();
    serde_json::to_writer_pretty(writer, &events)?;
    Ok(())
}

fn trace_event(recorded: Recorded) -> Value {
    let ts = ts_us(recorded.at);
    let name = recorded.event.name();
    match recorded.event {
        RecordedEvent::Frame(e) => counter(name, ts, json!({ "frame": e.frame_number })),
        RecordedEvent::Intent(e) => {
            let mut event = counter(name, ts, json!({ "playing": u8::from(e.playing) }));
            event["args"]["cause"] = json!(format!("{:?}", e.cause));
            event
        }
        RecordedEvent::MediaEvent(e) => instant(
            name,
            "Media",
            ts,
            json!({
                "current_time": e.current_time,
                "paused": e.paused,
            }),
        ),
        RecordedEvent::Seek(e) => instant(
            name,
            "Controller",
            ts,
            json!({
                "target": e.target,
                "cause": format!("{:?}", e.cause),
            }),
        ),
        RecordedEvent::FragmentReset(e) => instant(
            name,
            "Fragment",
            ts,
            json!({
                "candidate": e.candidate,
                "end_frame": e.end_frame,
                "looped": e.looped,
            }),
        ),
        RecordedEvent::FrameRate(e) => instant(
            name,
            "Controller",
            ts,
            json!({
                "frame_rate": e.frame_rate,
                "source": format!("{:?}", e.source),
            }),
        ),
        RecordedEvent::TickStopped(reason) => instant(
            name,
            "Controller",
            ts,
            json!({ "reason": format!("{reason:?}") }),
        ),
        RecordedEvent::FragmentUnlocked => instant(name, "Fragment", ts, json!({})),
        RecordedEvent::FragmentError(error) => instant(
            name,
            "Fragment",
            ts,
            json!({ "error": error.to_string() }),
        ),
    }
}

fn instant(name: &str, cat: &str, ts: f64, args: Value) -> Value {
    json!({
        "ph": "i",
        "name": name,
        "cat": cat,
        "ts": ts,
        "pid": 0,
        "tid": 0,
        "s": "t",
        "args": args,
    })
}

fn counter(name: &str, ts: f64, args: Value) -> Value {
    json!({
        "ph": "C",
        "name": name,
        "ts": ts,
        "pid": 0,
        "tid": 0,
        "args": args,
    })
}

#[expect(
    clippy::cast_precision_loss,
    reason = "trace timestamps stay far below 2^53 µs"
)]
fn ts_us(at: HostTime) -> f64 {
    at.ticks() as f64
}
