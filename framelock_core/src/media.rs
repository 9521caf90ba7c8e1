// Copyright 2026 the Framelock Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Collaborator contracts for the playback controller.
//!
//! The controller never touches a platform API directly. A host provides:
//!
//! - a [`MediaElement`]: the playable resource (e.g. `HTMLVideoElement`);
//! - a [`SeekBar`]: a range control with a value in `0..=seek_bar_max`;
//! - a [`PlayerView`]: the overlay, the frame/time labels, and the
//!   play/pause and controls affordances.
//!
//! and forwards platform events as [`MediaEvent`], [`SeekBarEvent`], and
//! [`Key`] values.
//!
//! All three traits are implemented by `framelock_backend_web` for the DOM
//! and by simple doubles in this crate's tests.

use alloc::string::String;
use kurbo::{Point, Rect};

/// A playable media resource.
pub trait MediaElement {
    /// Length of the resource in seconds; NaN until metadata has loaded.
    fn duration(&self) -> f64;

    /// Current playback position in seconds.
    fn current_time(&self) -> f64;

    /// Moves the playback position. Completion is reported later as
    /// [`MediaEvent::Seeked`].
    fn set_current_time(&mut self, time: f64);

    /// Whether playback is paused.
    fn paused(&self) -> bool;

    /// Whether playback reached the end of the resource.
    fn ended(&self) -> bool;

    /// Whether a seek is still in flight.
    fn seeking(&self) -> bool;

    /// Requests playback.
    fn play(&mut self);

    /// Requests a pause.
    fn pause(&mut self);

    /// Source URI, including any media fragment.
    fn source(&self) -> String;

    /// Replaces the displayed poster image.
    fn set_poster(&mut self, url: &str);

    /// Removes the element from display.
    fn remove(&mut self);
}

/// A seek bar whose value spans `0..=PlayerConfig::seek_bar_max`.
///
/// [`PlayerConfig::seek_bar_max`]: crate::state::PlayerConfig::seek_bar_max
pub trait SeekBar {
    /// Current value.
    fn value(&self) -> f64;

    /// Moves the handle.
    fn set_value(&mut self, value: f64);
}

/// Everything shown for a processed frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameDisplay {
    /// 1-based frame number.
    pub frame_number: u64,
    /// `"<frame> / <total>"`.
    pub frame_label: String,
    /// `MM:SS.s` or `HH:MM:SS.s`.
    pub time_label: String,
}

/// The visual side of a player: overlay and controls.
pub trait PlayerView {
    /// Number of frames with overlay data, or `None` if there is no overlay
    /// data at all.
    fn overlay_frame_count(&self) -> Option<usize>;

    /// Prepares overlay data for rendering. Called at most once, after the
    /// media metadata has loaded.
    fn prepare_overlay(&mut self);

    /// Renders the overlay and labels for a frame.
    fn render_frame(&mut self, frame: &FrameDisplay);

    /// Clears any rendered overlay.
    fn clear_overlay(&mut self);

    /// Shows the play (`false`) or pause (`true`) affordance.
    fn set_play_button(&mut self, playing: bool);

    /// Shows or hides the control strip.
    fn set_controls_visible(&mut self, visible: bool);

    /// Bounds of the control strip in the same coordinates as pointer
    /// events, if it is laid out.
    fn controls_bounds(&self) -> Option<Rect>;
}

/// Events emitted by a [`MediaElement`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MediaEvent {
    /// Duration and dimensions are known (`loadedmetadata`).
    LoadedMetadata,
    /// The first frame is available (`loadeddata`).
    LoadedData,
    /// Playback reached the end (`ended`).
    Ended,
    /// Playback paused (`pause`).
    Pause,
    /// The playback position advanced (`timeupdate`).
    TimeUpdate,
    /// Playback started (`play`).
    Play,
    /// A seek completed (`seeked`).
    Seeked,
    /// Loading failed (`error`).
    Error,
}

impl MediaEvent {
    /// All events, in DOM listener registration order.
    pub const ALL: [Self; 8] = [
        Self::LoadedMetadata,
        Self::LoadedData,
        Self::Ended,
        Self::Pause,
        Self::TimeUpdate,
        Self::Play,
        Self::Seeked,
        Self::Error,
    ];

    /// The DOM event type name.
    #[must_use]
    pub const fn dom_name(self) -> &'static str {
        match self {
            Self::LoadedMetadata => "loadedmetadata",
            Self::LoadedData => "loadeddata",
            Self::Ended => "ended",
            Self::Pause => "pause",
            Self::TimeUpdate => "timeupdate",
            Self::Play => "play",
            Self::Seeked => "seeked",
            Self::Error => "error",
        }
    }
}

/// User interaction with a [`SeekBar`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SeekBarEvent {
    /// The user committed a new value (`change`).
    Change,
    /// The user grabbed the handle (`mousedown`).
    PointerDown,
    /// The user released the handle (`mouseup`).
    PointerUp {
        /// Pointer position at release.
        pointer: Point,
        /// Bounds of the seek bar, in the same coordinates as `pointer`.
        bounds: Rect,
    },
}

/// Keys the controller reacts to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    /// Toggle play/pause.
    Space,
    /// Step one frame back while paused.
    ArrowLeft,
    /// Step one frame forward while paused.
    ArrowRight,
}

impl Key {
    /// Maps a DOM `KeyboardEvent.key` value.
    #[must_use]
    pub fn from_dom_key(key: &str) -> Option<Self> {
        match key {
            " " | "Spacebar" => Some(Self::Space),
            "ArrowLeft" => Some(Self::ArrowLeft),
            "ArrowRight" => Some(Self::ArrowRight),
            _ => None,
        }
    }
}

/// Tells the host whether to keep delivering animation ticks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TickControl {
    /// Request another tick.
    Continue,
    /// Stop ticking until playback starts again.
    Stop,
}

/// Returns where `pointer` falls along `bounds` horizontally, in `0.0..=1.0`.
///
/// Degenerate bounds yield `0.0`.
#[must_use]
pub fn horizontal_fraction(pointer: Point, bounds: Rect) -> f64 {
    let width = bounds.width();
    if !(width.is_finite() && width > 0.0) {
        return 0.0;
    }
    ((pointer.x - bounds.x0) / width).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fraction_of_bounds() {
        let bounds = Rect::new(100.0, 0.0, 300.0, 10.0);
        assert_eq!(horizontal_fraction(Point::new(150.0, 5.0), bounds), 0.25);
        assert_eq!(horizontal_fraction(Point::new(20.0, 5.0), bounds), 0.0);
        assert_eq!(horizontal_fraction(Point::new(900.0, 5.0), bounds), 1.0);
        assert_eq!(
            horizontal_fraction(Point::new(150.0, 5.0), Rect::ZERO),
            0.0
        );
    }

    #[test]
    fn dom_names() {
        assert_eq!(MediaEvent::LoadedData.dom_name(), "loadeddata");
        assert_eq!(Key::from_dom_key(" "), Some(Key::Space));
        assert_eq!(Key::from_dom_key("Enter"), None);
    }
}
