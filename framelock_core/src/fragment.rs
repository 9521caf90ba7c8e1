// Copyright 2026 the Framelock Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Temporal media fragments.
//!
//! A media source may carry a [W3C temporal fragment][mf] restricting
//! playback to a clip, e.g. `clip.mp4#t=10,20` or `clip.mp4#t=npt:0:10,0:20`.
//! [`parse_media_fragment`] extracts the range in seconds; [`MediaFragment`]
//! is that range resolved against a duration and frame rate.
//!
//! Only normal play time (`npt`) is supported. SMPTE and wall-clock formats
//! are rejected with [`FragmentError::UnsupportedFormat`].
//!
//! [mf]: https://www.w3.org/TR/media-frags/#naming-time

use core::fmt;

use crate::frame::frame_number_from_time;

/// A temporal range in seconds, as written in the fragment.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TimeRange {
    /// Start of the range in seconds.
    pub start: f64,
    /// End of the range in seconds, or `None` for "until the end".
    pub end: Option<f64>,
}

/// Errors from [`parse_media_fragment`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FragmentError {
    /// The `t` value uses a time format other than normal play time.
    UnsupportedFormat,
    /// A time in the `t` value could not be parsed.
    InvalidTime,
    /// The range ends before it starts.
    InvertedRange {
        /// Parsed start, in seconds.
        start: f64,
        /// Parsed end, in seconds.
        end: f64,
    },
}

impl fmt::Display for FragmentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedFormat => write!(f, "unsupported media fragment time format"),
            Self::InvalidTime => write!(f, "invalid media fragment time"),
            Self::InvertedRange { start, end } => {
                write!(f, "media fragment ends ({end}s) before it starts ({start}s)")
            }
        }
    }
}

impl core::error::Error for FragmentError {}

/// Parses the temporal fragment (`#t=…`) of a media URI.
///
/// Returns `Ok(None)` when the URI has no fragment or the fragment has no
/// `t` dimension. When `t` appears more than once, the first occurrence
/// wins.
pub fn parse_media_fragment(uri: &str) -> Result<Option<TimeRange>, FragmentError> {
    let Some((_, fragment)) = uri.split_once('#') else {
        return Ok(None);
    };

    let Some(value) = fragment
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find_map(|(name, value)| (name == "t").then_some(value))
    else {
        return Ok(None);
    };

    parse_time_value(value).map(Some)
}

fn parse_time_value(value: &str) -> Result<TimeRange, FragmentError> {
    let value = value.strip_prefix("npt:").unwrap_or(value);
    if value.starts_with(|c: char| c.is_ascii_alphabetic()) {
        return Err(FragmentError::UnsupportedFormat);
    }

    let (start, end) = match value.split_once(',') {
        Some((start, end)) => (start, Some(end)),
        None => (value, None),
    };

    let start = if start.is_empty() {
        0.0
    } else {
        parse_npt(start)?
    };
    let end = match end {
        None | Some("") => None,
        Some(end) => Some(parse_npt(end)?),
    };

    if let Some(end) = end
        && end < start
    {
        return Err(FragmentError::InvertedRange { start, end });
    }

    Ok(TimeRange { start, end })
}

/// Parses `ss[.f]`, `mm:ss[.f]`, or `hh:mm:ss[.f]` into seconds.
fn parse_npt(text: &str) -> Result<f64, FragmentError> {
    let mut parts = text.rsplit(':');
    let seconds = parts.next().ok_or(FragmentError::InvalidTime)?;
    let minutes = parts.next();
    let hours = parts.next();
    if parts.next().is_some() {
        return Err(FragmentError::InvalidTime);
    }

    let seconds = parse_decimal(seconds)?;
    let Some(minutes) = minutes else {
        return Ok(seconds);
    };

    let minutes = parse_whole(minutes)?;
    if seconds >= 60.0 || minutes >= 60 {
        return Err(FragmentError::InvalidTime);
    }
    let hours = match hours {
        Some(hours) => parse_whole(hours)?,
        None => 0,
    };

    Ok(f64::from(hours) * 3600.0 + f64::from(minutes) * 60.0 + seconds)
}

fn parse_decimal(text: &str) -> Result<f64, FragmentError> {
    let well_formed = !text.is_empty()
        && text.bytes().all(|b| b.is_ascii_digit() || b == b'.')
        && text.bytes().any(|b| b.is_ascii_digit());
    if !well_formed {
        return Err(FragmentError::InvalidTime);
    }
    text.parse().map_err(|_| FragmentError::InvalidTime)
}

fn parse_whole(text: &str) -> Result<u32, FragmentError> {
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return Err(FragmentError::InvalidTime);
    }
    text.parse().map_err(|_| FragmentError::InvalidTime)
}

/// A fragment resolved to frame numbers.
///
/// Invariant: `begin_frame <= end_frame`. Equal frames mean the fragment
/// selects a single frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MediaFragment {
    /// Range as parsed from the source.
    pub range: TimeRange,
    /// Start time in seconds, clamped to the duration when known.
    pub begin_time: f64,
    /// End time in seconds. Infinite while an open-ended fragment waits for
    /// the duration.
    pub end_time: f64,
    /// Frame containing `begin_time`.
    pub begin_frame: u64,
    /// Frame containing `end_time`.
    pub end_frame: u64,
}

impl MediaFragment {
    /// Resolves `range` against `duration` (possibly NaN while unknown) and a
    /// valid `frame_rate`.
    #[must_use]
    pub fn resolve(range: TimeRange, duration: f64, frame_rate: f64) -> Self {
        // `f64::min` ignores a NaN duration, leaving the parsed times intact.
        let end_time = range.end.unwrap_or(f64::INFINITY).min(duration);
        let begin_time = range.start.min(end_time);
        Self {
            range,
            begin_time,
            end_time,
            begin_frame: frame_number_from_time(begin_time, duration, frame_rate),
            end_frame: frame_number_from_time(end_time, duration, frame_rate),
        }
    }

    /// Returns `true` if the fragment covers exactly one frame.
    #[must_use]
    pub fn is_single_frame(&self) -> bool {
        self.begin_frame == self.end_frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range(start: f64, end: Option<f64>) -> Option<TimeRange> {
        Some(TimeRange { start, end })
    }

    #[test]
    fn no_fragment() {
        assert_eq!(parse_media_fragment("https://host/v.mp4"), Ok(None));
        assert_eq!(parse_media_fragment("v.mp4#xywh=0,0,10,10"), Ok(None));
    }

    #[test]
    fn seconds_range() {
        assert_eq!(
            parse_media_fragment("v.mp4#t=10,20"),
            Ok(range(10.0, Some(20.0)))
        );
        assert_eq!(
            parse_media_fragment("v.mp4#t=1.5,2.25"),
            Ok(range(1.5, Some(2.25)))
        );
    }

    #[test]
    fn open_ends() {
        assert_eq!(parse_media_fragment("v.mp4#t=10"), Ok(range(10.0, None)));
        assert_eq!(parse_media_fragment("v.mp4#t=10,"), Ok(range(10.0, None)));
        assert_eq!(
            parse_media_fragment("v.mp4#t=,20"),
            Ok(range(0.0, Some(20.0)))
        );
    }

    #[test]
    fn npt_clock_forms() {
        assert_eq!(
            parse_media_fragment("v.mp4#t=npt:0:10,1:00:02.5"),
            Ok(range(10.0, Some(3602.5)))
        );
        assert_eq!(
            parse_media_fragment("v.mp4#xywh=1,2,3,4&t=npt:5"),
            Ok(range(5.0, None))
        );
    }

    #[test]
    fn first_t_wins() {
        assert_eq!(
            parse_media_fragment("v.mp4#t=1,2&t=3,4"),
            Ok(range(1.0, Some(2.0)))
        );
    }

    #[test]
    fn rejects_bad_input() {
        assert_eq!(
            parse_media_fragment("v.mp4#t=smpte:00:00:01:00"),
            Err(FragmentError::UnsupportedFormat)
        );
        assert_eq!(
            parse_media_fragment("v.mp4#t=inf"),
            Err(FragmentError::UnsupportedFormat)
        );
        assert_eq!(
            parse_media_fragment("v.mp4#t=-1,2"),
            Err(FragmentError::InvalidTime)
        );
        assert_eq!(
            parse_media_fragment("v.mp4#t=0:75,2"),
            Err(FragmentError::InvalidTime)
        );
        assert_eq!(
            parse_media_fragment("v.mp4#t=5,2"),
            Err(FragmentError::InvertedRange {
                start: 5.0,
                end: 2.0
            })
        );
    }

    #[test]
    fn resolves_frames() {
        let f = MediaFragment::resolve(
            TimeRange {
                start: 2.0,
                end: Some(4.0),
            },
            10.0,
            25.0,
        );
        assert_eq!(f.begin_frame, 51);
        assert_eq!(f.end_frame, 101);
        assert!(!f.is_single_frame());
    }

    #[test]
    fn open_end_waits_for_duration() {
        let r = TimeRange {
            start: 2.0,
            end: None,
        };
        let pending = MediaFragment::resolve(r, f64::NAN, 30.0);
        assert_eq!(pending.end_time, f64::INFINITY);
        assert_eq!(pending.end_frame, u64::MAX);

        let known = MediaFragment::resolve(r, 10.0, 25.0);
        assert_eq!(known.end_time, 10.0);
        assert_eq!(known.end_frame, 250);
    }

    #[test]
    fn tiny_range_is_single_frame() {
        let f = MediaFragment::resolve(
            TimeRange {
                start: 1.0,
                end: Some(1.01),
            },
            10.0,
            25.0,
        );
        assert!(f.is_single_frame());
    }
}
