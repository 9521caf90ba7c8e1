// Copyright 2026 the Framelock Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Playback state and player configuration.
//!
//! [`PlaybackState`] groups every flag the controller reasons about into one
//! `Copy` value. Only [`PlaybackController`] writes it; hosts and tests read
//! snapshots through [`PlaybackController::state`].
//!
//! [`PlaybackController`]: crate::controller::PlaybackController
//! [`PlaybackController::state`]: crate::controller::PlaybackController::state

use alloc::string::String;

use crate::fragment::MediaFragment;
use crate::frame::{FALLBACK_FRAME_RATE, FRAME_ZERO_OFFSET, is_valid_frame_rate};
use crate::time::Duration;

/// Loading-readiness flags.
///
/// These are independent flags, not exclusive states: each becomes true on
/// its own and stays true.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LoadingState {
    /// Duration and dimensions are known.
    pub metadata_loaded: bool,
    /// The first frame is available.
    pub data_loaded: bool,
    /// The host has laid out the player.
    pub size_prepared: bool,
    /// The host has rendered the player.
    pub rendered: bool,
    /// Overlay preparation may start.
    pub overlay_can_be_prepared: bool,
    /// Overlay data is ready to render (or there is none).
    pub overlay_prepared: bool,
    /// Frames may be processed.
    pub ready_to_process_frames: bool,
}

/// Pointer hover and control-strip visibility.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HoverState {
    /// The pointer is over the player.
    pub hovering: bool,
    /// The control strip is shown.
    pub show_controls: bool,
    /// The options panel is open; controls stay visible while it is.
    pub show_video_options: bool,
}

/// The complete playback state of one attached media element.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlaybackState {
    /// Frames per second, or `None` while unknown.
    pub frame_rate: Option<f64>,
    /// 1-based number of the last processed frame.
    pub frame_number: u64,
    /// Playback is intended.
    pub playing: bool,
    /// Restart at the end (of the fragment, when locked).
    pub looping: bool,
    /// Start playing as soon as the player is ready; consumed once.
    pub autoplay: bool,
    /// The user is dragging the seek handle.
    pub manual_seeking: bool,
    /// The fragment selects a single frame; playback is suppressed.
    pub single_frame: bool,
    /// Playback is confined to [`fragment`](Self::fragment).
    ///
    /// Cleared for good once the user scrubs.
    pub lock_to_fragment: bool,
    /// Fragment parsed from the media source, if any.
    pub fragment: Option<MediaFragment>,
    /// Loading readiness.
    pub loading: LoadingState,
    /// Hover and controls.
    pub hover: HoverState,
}

impl PlaybackState {
    /// Creates the initial state for a newly attached element.
    #[must_use]
    pub fn new(config: &PlayerConfig) -> Self {
        Self {
            frame_rate: config.frame_rate.filter(|&rate| is_valid_frame_rate(rate)),
            frame_number: FRAME_ZERO_OFFSET,
            playing: false,
            looping: config.looping,
            autoplay: config.autoplay,
            manual_seeking: false,
            single_frame: false,
            lock_to_fragment: false,
            fragment: None,
            loading: LoadingState::default(),
            hover: HoverState::default(),
        }
    }

    /// The frame rate to convert with: the known rate, or
    /// [`FALLBACK_FRAME_RATE`].
    #[must_use]
    pub fn effective_frame_rate(&self) -> f64 {
        self.frame_rate.unwrap_or(FALLBACK_FRAME_RATE)
    }

    /// Duration of one frame in seconds.
    #[must_use]
    pub fn frame_duration(&self) -> f64 {
        1.0 / self.effective_frame_rate()
    }

    /// Returns `true` if a fragment is present and still confines playback.
    #[must_use]
    pub fn is_locked_to_fragment(&self) -> bool {
        self.fragment.is_some() && self.lock_to_fragment
    }
}

/// Player configuration.
#[derive(Clone, Debug, PartialEq)]
pub struct PlayerConfig {
    /// Frames per second, if known up front.
    pub frame_rate: Option<f64>,
    /// Start playing once ready.
    pub autoplay: bool,
    /// Loop at the end of the media (or of a locked fragment).
    pub looping: bool,
    /// Thumbnail mode: no controls; hovering plays, leaving stops.
    pub thumbnail: bool,
    /// Value of a seek bar at the end of the media.
    pub seek_bar_max: f64,
    /// How long controls stay visible after the last pointer activity.
    pub hide_controls_after: Duration,
    /// Poster shown in place of media that failed to load. Without one the
    /// element is removed.
    pub not_found_poster: Option<String>,
}

impl PlayerConfig {
    /// Default seek bar scale.
    pub const DEFAULT_SEEK_BAR_MAX: f64 = 100.0;

    /// Default controls timeout.
    pub const DEFAULT_HIDE_CONTROLS_AFTER: Duration = Duration::from_millis(2_500);

    /// Configuration for a hover-to-play thumbnail.
    #[must_use]
    pub fn thumbnail() -> Self {
        Self {
            thumbnail: true,
            looping: true,
            ..Self::default()
        }
    }
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            frame_rate: None,
            autoplay: false,
            looping: false,
            thumbnail: false,
            seek_bar_max: Self::DEFAULT_SEEK_BAR_MAX,
            hide_controls_after: Self::DEFAULT_HIDE_CONTROLS_AFTER,
            not_found_poster: None,
        }
    }
}
