// Copyright 2026 the Framelock Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The playback controller.
//!
//! [`PlaybackController`] owns a [`PlaybackState`] and the three
//! collaborators ([`MediaElement`], [`SeekBar`], [`PlayerView`]). The host
//! forwards every platform event to it; each handler runs to completion and
//! leaves the media element, seek bar, and view consistent with what the
//! user asked for.
//!
//! # Event flow
//!
//! ```text
//!   loadedmetadata ─► update_from_loading_state ─► prepare overlay, infer fps
//!   loadeddata ─────► seek to fragment/frame 1 ─► process_frame ─► "load"
//!   play ───────────► on_animation_tick ─► (tick ... tick) ─► Stop when idle
//!   pause ──────────► check_for_fragment_reset ─► resume if still intended
//!   seek bar ───────► snap to frame ─► unlock fragment ─► update_frame
//!   anything else ──► reconcile_playback_intent
//! ```
//!
//! # Fragment lock
//!
//! A source such as `clip.mp4#t=2,4` confines playback to its fragment: the
//! first frame shown is the fragment's first frame, and reaching its end
//! either loops back (when looping) or stops. The first time the user
//! scrubs, the lock is released for the rest of the session.

use alloc::boxed::Box;
use core::fmt;

use kurbo::Point;

use crate::fragment::{MediaFragment, parse_media_fragment};
use crate::frame::{
    clamped_time, frame_count_string, frame_number_from_time, is_valid_frame_rate,
    time_display_string,
};
use crate::media::{
    FrameDisplay, Key, MediaElement, MediaEvent, PlayerView, SeekBar, SeekBarEvent, TickControl,
    horizontal_fraction,
};
use crate::notify::{HoverContext, Notification, Observers, Propagation, SubscriptionId};
use crate::state::{PlaybackState, PlayerConfig};
use crate::time::HostTime;
use crate::timer::{NamedTimers, TimerName};
use crate::trace::{
    FragmentResetTrace, FrameRateSource, FrameRateTrace, FrameTrace, IntentCause, IntentTrace,
    MediaEventTrace, SeekCause, SeekTrace, TickStopReason, TraceSink, Tracer,
};

/// Frames per second assumed when inferring a frame count from the duration.
const ASSUMED_FPS_FOR_COUNT: f64 = 30.0;

/// Keeps a media element, seek bar, and view in sync, frame by frame.
pub struct PlaybackController<M, S, V> {
    media: M,
    seek_bar: S,
    view: V,
    config: PlayerConfig,
    state: PlaybackState,
    timers: NamedTimers<TimerName>,
    observers: Observers,
    tracer: Tracer,
}

impl<M, S, V> fmt::Debug for PlaybackController<M, S, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlaybackController")
            .field("config", &self.config)
            .field("state", &self.state)
            .field("timers", &self.timers)
            .field("observers", &self.observers)
            .finish_non_exhaustive()
    }
}

impl<M: MediaElement, S: SeekBar, V: PlayerView> PlaybackController<M, S, V> {
    /// Attaches to a media element, parsing any fragment in its source.
    #[must_use]
    pub fn attach(media: M, seek_bar: S, view: V, config: PlayerConfig) -> Self {
        Self::attach_with_tracer(media, seek_bar, view, config, Tracer::none())
    }

    /// Like [`attach`](Self::attach), but traces from the first decision on
    /// (including fragment parse failures).
    #[must_use]
    pub fn attach_with_tracer(
        media: M,
        seek_bar: S,
        view: V,
        config: PlayerConfig,
        tracer: Tracer,
    ) -> Self {
        let state = PlaybackState::new(&config);
        let mut controller = Self {
            media,
            seek_bar,
            view,
            config,
            state,
            timers: NamedTimers::new(),
            observers: Observers::new(),
            tracer,
        };
        if let Some(rate) = controller.state.frame_rate {
            controller.tracer.frame_rate(&FrameRateTrace {
                frame_rate: rate,
                source: FrameRateSource::Configured,
            });
        }
        controller.set_media_fragment();
        controller
    }

    /// Detaches, cancelling timers and dropping subscribers, and hands the
    /// collaborators back.
    pub fn detach(mut self) -> (M, S, V) {
        self.timers.clear();
        self.observers.clear();
        (self.media, self.seek_bar, self.view)
    }

    // -- accessors ---------------------------------------------------------

    /// Snapshot of the playback state.
    #[must_use]
    pub fn state(&self) -> PlaybackState {
        self.state
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &PlayerConfig {
        &self.config
    }

    /// The media element.
    #[must_use]
    pub fn media(&self) -> &M {
        &self.media
    }

    /// The media element, mutably.
    pub fn media_mut(&mut self) -> &mut M {
        &mut self.media
    }

    /// The seek bar.
    #[must_use]
    pub fn seek_bar(&self) -> &S {
        &self.seek_bar
    }

    /// The view.
    #[must_use]
    pub fn view(&self) -> &V {
        &self.view
    }

    /// The view, mutably.
    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    /// Installs a trace sink.
    pub fn set_trace_sink(&mut self, sink: Box<dyn TraceSink>) {
        self.tracer.set_sink(sink);
    }

    /// Subscribes to notifications.
    ///
    /// Handlers run inside controller calls and must not call back into the
    /// controller.
    pub fn subscribe(
        &mut self,
        handler: impl FnMut(&Notification) -> Propagation + 'static,
    ) -> SubscriptionId {
        self.observers.subscribe(handler)
    }

    /// Removes a subscriber.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.observers.unsubscribe(id)
    }

    /// Earliest pending named-timer deadline.
    #[must_use]
    pub fn next_timer_deadline(&self) -> Option<HostTime> {
        self.timers.next_deadline()
    }

    /// Pending deadline for one timer.
    #[must_use]
    pub fn timer_deadline(&self, name: TimerName) -> Option<HostTime> {
        self.timers.deadline(name)
    }

    // -- host readiness ----------------------------------------------------

    /// The host has rendered the player.
    pub fn mark_rendered(&mut self) {
        self.state.loading.rendered = true;
        self.update_from_loading_state();
        self.reconcile_playback_intent();
    }

    /// The host has laid out the player.
    pub fn mark_size_prepared(&mut self) {
        self.state.loading.size_prepared = true;
        self.update_from_loading_state();
        self.reconcile_playback_intent();
    }

    /// Overlay data arrived or changed.
    ///
    /// Any current overlay is prepared again before its first render, and an
    /// inferred frame rate is re-derived from its frame count.
    pub fn overlay_data_changed(&mut self) {
        if self.view.overlay_frame_count().is_some() {
            self.state.loading.overlay_prepared = false;
            if self.config.frame_rate.is_none() {
                self.state.frame_rate = None;
            }
        }
        self.update_from_loading_state();
        self.reconcile_playback_intent();
    }

    /// Supplies (or replaces) the frame rate. `None` leaves the current rate.
    pub fn set_frame_rate(&mut self, frame_rate: Option<f64>) {
        self.config.frame_rate = frame_rate;
        self.reconcile_playback_intent();
    }

    /// Opens or closes the options panel; controls stay visible while open.
    pub fn set_show_video_options(&mut self, open: bool) {
        self.state.hover.show_video_options = open;
        self.reconcile_playback_intent();
    }

    // -- media events ------------------------------------------------------

    /// Handles a media element event.
    ///
    /// Returns `Some` for [`MediaEvent::Play`]: whether the host should run
    /// animation ticks ([`on_animation_tick`](Self::on_animation_tick)).
    pub fn handle_media_event(&mut self, event: MediaEvent) -> Option<TickControl> {
        self.tracer.media_event(&MediaEventTrace {
            event,
            current_time: self.media.current_time(),
            paused: self.media.paused(),
        });
        match event {
            MediaEvent::LoadedMetadata => self.on_loaded_metadata(),
            MediaEvent::LoadedData => self.on_loaded_data(),
            MediaEvent::Ended => self.on_ended(),
            MediaEvent::Pause => self.on_pause(),
            MediaEvent::TimeUpdate => self.on_time_update(),
            MediaEvent::Play => return Some(self.on_animation_tick()),
            MediaEvent::Seeked => self.update_state_from_time_change(),
            MediaEvent::Error => self.on_error(),
        }
        None
    }

    fn on_loaded_metadata(&mut self) {
        self.state.loading.metadata_loaded = true;
        self.resolve_fragment();
        self.update_from_loading_state();
        self.reconcile_playback_intent();
    }

    fn on_loaded_data(&mut self) {
        self.state.loading.data_loaded = true;
        self.resolve_fragment();

        if self.state.autoplay {
            self.set_playing(true, IntentCause::Autoplay);
        } else if let Some(fragment) = self.state.fragment {
            self.seek(fragment.begin_time, SeekCause::Load);
            self.state.frame_number = fragment.begin_frame;
        } else {
            self.seek(0.0, SeekCause::Load);
            self.state.frame_number = 1;
        }

        self.update_from_loading_state();

        if self.state.single_frame
            && let Some(fragment) = self.state.fragment
        {
            self.seek(fragment.begin_time, SeekCause::Load);
            self.state.frame_number = fragment.begin_frame;
        }

        if self.state.autoplay {
            self.reconcile_playback_intent();
        } else {
            self.process_frame();
        }

        self.observers.dispatch(&Notification::Load);
    }

    fn on_ended(&mut self) {
        if self.state.looping {
            self.media.play();
        } else {
            self.set_playing(false, IntentCause::Ended);
            self.reconcile_playback_intent();
        }
    }

    fn on_pause(&mut self) {
        let frame_number = self.compute_frame_number();
        self.check_for_fragment_reset(frame_number);
        // Hosts pause on their own (e.g. buffering); resume if we still mean
        // to play and the user isn't holding the seek handle.
        if self.state.playing && !self.state.manual_seeking && !self.media.ended() {
            self.media.play();
        }
    }

    fn on_time_update(&mut self) {
        let duration = self.media.duration();
        if duration.is_finite() && duration > 0.0 {
            let value = (self.config.seek_bar_max / duration) * self.media.current_time();
            self.seek_bar.set_value(value);
        }
        let frame_number = self.compute_frame_number();
        self.observers
            .dispatch(&Notification::TimeUpdate { frame_number });
    }

    fn on_error(&mut self) {
        if let Some(poster) = &self.config.not_found_poster {
            self.media.set_poster(poster);
        } else {
            self.media.remove();
        }
        self.observers.dispatch(&Notification::Error);
    }

    /// Advances the displayed frame while playing.
    ///
    /// Call once when playback starts and then on every animation frame for
    /// as long as this returns [`TickControl::Continue`].
    pub fn on_animation_tick(&mut self) -> TickControl {
        if self.media.paused() || self.media.ended() {
            self.update_frame();
            self.tracer.tick_stopped(TickStopReason::MediaIdle);
            return TickControl::Stop;
        }
        self.update_state_from_time_change();
        if self.state.manual_seeking {
            self.tracer.tick_stopped(TickStopReason::ManualSeek);
            TickControl::Stop
        } else {
            TickControl::Continue
        }
    }

    // -- seek bar ----------------------------------------------------------

    /// Handles seek bar interaction.
    pub fn handle_seek_bar_event(&mut self, event: SeekBarEvent) {
        match event {
            SeekBarEvent::Change => self.on_seek_bar_change(),
            SeekBarEvent::PointerDown => self.on_seek_bar_pointer_down(),
            SeekBarEvent::PointerUp { pointer, bounds } => {
                self.on_seek_bar_pointer_up(horizontal_fraction(pointer, bounds));
            }
        }
    }

    fn on_seek_bar_change(&mut self) {
        let duration = self.media.duration();
        if !(duration.is_finite() && duration > 0.0) {
            return;
        }
        let time = duration * (self.seek_bar.value() / self.config.seek_bar_max);
        let target = self.clamp_time_to_frame_start(time);
        self.seek(target, SeekCause::SeekBar);
        // The user wants to browse the whole video from here on.
        self.unlock_fragment();
        self.state.single_frame = false;
        self.update_state_from_time_change();
    }

    fn on_seek_bar_pointer_down(&mut self) {
        if self.config.thumbnail {
            return;
        }
        self.state.manual_seeking = true;
        self.unlock_fragment();
        self.media.pause();
    }

    fn on_seek_bar_pointer_up(&mut self, fraction: f64) {
        self.state.manual_seeking = false;
        if !self.config.thumbnail {
            self.unlock_fragment();
        }
        if self.state.playing && self.media.paused() {
            let duration = self.media.duration();
            if duration.is_finite() && duration > 0.0 {
                let time = duration * fraction;
                let target = self.clamp_time_to_frame_start(time);
                self.seek(target, SeekCause::Drag);
                self.seek_bar
                    .set_value(fraction * self.config.seek_bar_max);
            }
            self.media.play();
        }
    }

    // -- user input --------------------------------------------------------

    /// Play/pause button.
    pub fn toggle_play_pause(&mut self) {
        self.set_playing(!self.state.playing, IntentCause::Toggle);
        self.reconcile_playback_intent();
    }

    /// Keyboard input. Returns `true` if the key was handled.
    pub fn on_key(&mut self, key: Key) -> bool {
        match key {
            Key::Space => {
                self.toggle_play_pause();
                true
            }
            Key::ArrowLeft | Key::ArrowRight if self.media.paused() => {
                let step = self.state.frame_duration();
                let base = self.clamp_time_to_frame_start(self.media.current_time());
                let target = if key == Key::ArrowLeft {
                    base - step
                } else {
                    base + step
                };
                let target = self.clamp_to_media(target);
                self.seek(target, SeekCause::Key);
                self.update_state_from_time_change();
                true
            }
            Key::ArrowLeft | Key::ArrowRight => false,
        }
    }

    /// The pointer entered the player.
    pub fn on_pointer_enter(&mut self, now: HostTime) {
        self.state.hover.hovering = true;
        if !self.state.loading.data_loaded {
            return;
        }
        let proceed = self
            .observers
            .dispatch(&Notification::MouseEnter(self.hover_context()));
        if self.config.thumbnail {
            if proceed {
                self.set_playing(true, IntentCause::Hover);
            }
        } else {
            self.show_controls_until(now);
        }
        self.reconcile_playback_intent();
    }

    /// The pointer moved over the player.
    pub fn on_pointer_move(&mut self, now: HostTime, point: Point) {
        if !self.config.thumbnail {
            let over_controls = self
                .view
                .controls_bounds()
                .is_some_and(|bounds| bounds.contains(point));
            if over_controls {
                self.timers.cancel(TimerName::HideControls);
            } else {
                self.show_controls_until(now);
            }
        }
        self.reconcile_playback_intent();
    }

    /// The pointer left the player.
    pub fn on_pointer_leave(&mut self) {
        self.state.hover.hovering = false;
        if !self.state.loading.data_loaded {
            return;
        }
        let proceed = self
            .observers
            .dispatch(&Notification::MouseLeave(self.hover_context()));
        if !proceed {
            return;
        }
        if self.config.thumbnail {
            self.set_playing(false, IntentCause::Hover);
            self.reconcile_playback_intent();
            self.view.clear_overlay();
        } else {
            self.timers.cancel(TimerName::HideControls);
            self.hide_controls();
        }
    }

    /// Runs every named timer due at `now`.
    pub fn fire_due_timers(&mut self, now: HostTime) {
        for name in self.timers.take_due(now) {
            match name {
                TimerName::HideControls => self.hide_controls(),
            }
        }
    }

    fn show_controls_until(&mut self, now: HostTime) {
        self.state.hover.show_controls = true;
        self.timers.schedule(
            TimerName::HideControls,
            now.saturating_add(self.config.hide_controls_after),
        );
    }

    fn hide_controls(&mut self) {
        if self.state.hover.show_video_options {
            return;
        }
        self.state.hover.show_controls = false;
        self.reconcile_playback_intent();
    }

    fn hover_context(&self) -> HoverContext {
        HoverContext {
            thumbnail: self.config.thumbnail,
            frame_number: self.state.frame_number,
            playing: self.state.playing,
        }
    }

    // -- reconciliation ----------------------------------------------------

    /// Brings the media element and view in line with intended playback.
    ///
    /// Idempotent; safe to call after any state change. Does nothing until
    /// the player is rendered and sized.
    pub fn reconcile_playback_intent(&mut self) {
        let loading = self.state.loading;
        if !loading.rendered || !loading.size_prepared {
            return;
        }

        if let Some(rate) = self.config.frame_rate.filter(|&r| is_valid_frame_rate(r))
            && self.state.frame_rate != Some(rate)
        {
            self.apply_frame_rate(rate, FrameRateSource::Configured);
        }

        if self.state.autoplay {
            self.state.autoplay = false;
            self.set_playing(true, IntentCause::Autoplay);
        }

        if self.state.playing {
            if self.media.paused()
                && !self.state.single_frame
                && !self.state.manual_seeking
                && self.state.loading.overlay_prepared
            {
                self.media.play();
            }
        } else if !self.media.paused() && !self.state.single_frame {
            self.media.pause();
            let target = self.clamp_time_to_frame_start(self.media.current_time());
            self.seek(target, SeekCause::Snap);
            self.update_frame();
        }

        self.view.set_play_button(self.state.playing);
        self.view
            .set_controls_visible(self.state.hover.show_controls && !self.config.thumbnail);
        self.process_frame();
    }

    /// Applies the fragment lock to a candidate frame number.
    ///
    /// Only acts while a fragment is present, locked, and playback is
    /// intended. Reaching the fragment's end (or the end of the media) loops
    /// back to the fragment start when looping, returning its first frame;
    /// otherwise playback stops and `frame_number` is returned unchanged.
    pub fn check_for_fragment_reset(&mut self, frame_number: u64) -> u64 {
        let Some(fragment) = self.state.fragment else {
            return frame_number;
        };
        if !self.state.playing || !self.state.lock_to_fragment {
            return frame_number;
        }
        if frame_number < fragment.end_frame && !self.media.ended() {
            return frame_number;
        }

        self.tracer.fragment_reset(&FragmentResetTrace {
            candidate: frame_number,
            end_frame: fragment.end_frame,
            looped: self.state.looping,
        });
        if self.state.looping {
            self.seek(fragment.begin_time, SeekCause::FragmentLoop);
            fragment.begin_frame
        } else {
            self.set_playing(false, IntentCause::FragmentEnd);
            self.reconcile_playback_intent();
            frame_number
        }
    }

    /// Re-reads the frame from the element's position and processes it if it
    /// changed.
    pub fn update_frame(&mut self) {
        let frame_number = self.compute_frame_number();
        let frame_number = self.check_for_fragment_reset(frame_number);
        if frame_number != self.state.frame_number && !self.media.seeking() {
            self.state.frame_number = frame_number;
            self.process_frame();
        }
    }

    fn update_state_from_time_change(&mut self) {
        self.update_frame();
    }

    fn process_frame(&mut self) {
        if !self.state.loading.ready_to_process_frames {
            return;
        }
        let rate = self.state.effective_frame_rate();
        let duration = self.media.duration();
        let frame_number = self.state.frame_number;
        let display = FrameDisplay {
            frame_number,
            frame_label: frame_count_string(frame_number, duration, rate),
            time_label: time_display_string(frame_number, rate, duration),
        };
        self.view.render_frame(&display);
        self.tracer.frame(&FrameTrace { frame_number });
    }

    fn update_from_loading_state(&mut self) {
        let loading = &mut self.state.loading;
        if loading.rendered && loading.size_prepared {
            if loading.data_loaded {
                loading.ready_to_process_frames = true;
            }
            if loading.metadata_loaded {
                match self.view.overlay_frame_count() {
                    Some(_) => loading.overlay_can_be_prepared = true,
                    // Nothing to prepare.
                    None => loading.overlay_prepared = true,
                }
            }
        }

        if loading.overlay_can_be_prepared && !loading.overlay_prepared {
            self.view.prepare_overlay();
            loading.overlay_prepared = true;
        }

        if self.state.loading.overlay_prepared && self.state.frame_rate.is_none() {
            self.infer_frame_rate();
        }
    }

    fn infer_frame_rate(&mut self) {
        let duration = self.media.duration();
        if !(duration.is_finite() && duration > 0.0) {
            return;
        }
        let (frames, source) = match self.view.overlay_frame_count() {
            Some(count) if count > 0 => (count as f64, FrameRateSource::Overlay),
            _ => (duration * ASSUMED_FPS_FOR_COUNT, FrameRateSource::Fallback),
        };
        self.apply_frame_rate(frames / duration, source);
    }

    fn apply_frame_rate(&mut self, rate: f64, source: FrameRateSource) {
        if !is_valid_frame_rate(rate) {
            return;
        }
        self.state.frame_rate = Some(rate);
        self.tracer.frame_rate(&FrameRateTrace {
            frame_rate: rate,
            source,
        });
        self.resolve_fragment();
    }

    // -- fragment ----------------------------------------------------------

    fn set_media_fragment(&mut self) {
        match parse_media_fragment(&self.media.source()) {
            Ok(Some(range)) => {
                let fragment = MediaFragment::resolve(
                    range,
                    self.media.duration(),
                    self.state.effective_frame_rate(),
                );
                self.state.fragment = Some(fragment);
                self.state.lock_to_fragment = true;
                self.state.single_frame = fragment.is_single_frame();
            }
            Ok(None) => {}
            Err(error) => self.tracer.fragment_error(&error),
        }
    }

    /// Re-resolves the fragment after the duration or frame rate changed.
    fn resolve_fragment(&mut self) {
        let Some(fragment) = self.state.fragment else {
            return;
        };
        let fragment = MediaFragment::resolve(
            fragment.range,
            self.media.duration(),
            self.state.effective_frame_rate(),
        );
        self.state.fragment = Some(fragment);
        if self.state.lock_to_fragment {
            self.state.single_frame = fragment.is_single_frame();
        }
    }

    fn unlock_fragment(&mut self) {
        if self.state.lock_to_fragment {
            self.state.lock_to_fragment = false;
            self.tracer.fragment_unlocked();
        }
    }

    // -- helpers -----------------------------------------------------------

    fn set_playing(&mut self, playing: bool, cause: IntentCause) {
        if self.state.playing != playing {
            self.state.playing = playing;
            self.tracer.intent(&IntentTrace { playing, cause });
        }
    }

    fn seek(&mut self, target: f64, cause: SeekCause) {
        self.tracer.seek(&SeekTrace { target, cause });
        self.media.set_current_time(target);
    }

    fn compute_frame_number(&self) -> u64 {
        frame_number_from_time(
            self.media.current_time(),
            self.media.duration(),
            self.state.effective_frame_rate(),
        )
    }

    /// Clamps `time` into the media and snaps it to its frame's start.
    fn clamp_time_to_frame_start(&self, time: f64) -> f64 {
        clamped_time(
            self.clamp_to_media(time),
            self.media.duration(),
            self.state.effective_frame_rate(),
        )
    }

    /// Clamps `time` to `[0, duration]`; only the lower bound while the
    /// duration is unknown.
    fn clamp_to_media(&self, time: f64) -> f64 {
        let time = if time.is_finite() { time.max(0.0) } else { 0.0 };
        let duration = self.media.duration();
        if duration.is_finite() {
            time.min(duration)
        } else {
            time
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::rc::Rc;
    use alloc::string::{String, ToString as _};
    use alloc::vec::Vec;
    use core::cell::RefCell;
    use kurbo::Rect;

    use crate::time::Duration;

    #[derive(Debug)]
    struct FakeMedia {
        duration: f64,
        current_time: f64,
        paused: bool,
        ended: bool,
        seeking: bool,
        source: String,
        poster: Option<String>,
        removed: bool,
        play_calls: u32,
        pause_calls: u32,
    }

    impl FakeMedia {
        fn new(source: &str, duration: f64) -> Self {
            Self {
                duration,
                current_time: 0.0,
                paused: true,
                ended: false,
                seeking: false,
                source: source.to_string(),
                poster: None,
                removed: false,
                play_calls: 0,
                pause_calls: 0,
            }
        }
    }

    impl MediaElement for FakeMedia {
        fn duration(&self) -> f64 {
            self.duration
        }
        fn current_time(&self) -> f64 {
            self.current_time
        }
        fn set_current_time(&mut self, time: f64) {
            self.current_time = time;
        }
        fn paused(&self) -> bool {
            self.paused
        }
        fn ended(&self) -> bool {
            self.ended
        }
        fn seeking(&self) -> bool {
            self.seeking
        }
        fn play(&mut self) {
            self.play_calls += 1;
            self.paused = false;
        }
        fn pause(&mut self) {
            self.pause_calls += 1;
            self.paused = true;
        }
        fn source(&self) -> String {
            self.source.clone()
        }
        fn set_poster(&mut self, url: &str) {
            self.poster = Some(url.to_string());
        }
        fn remove(&mut self) {
            self.removed = true;
        }
    }

    #[derive(Debug, Default)]
    struct FakeSeekBar {
        value: f64,
    }

    impl SeekBar for FakeSeekBar {
        fn value(&self) -> f64 {
            self.value
        }
        fn set_value(&mut self, value: f64) {
            self.value = value;
        }
    }

    #[derive(Debug, Default)]
    struct FakeView {
        overlay_frames: Option<usize>,
        prepared: u32,
        rendered: Vec<FrameDisplay>,
        cleared: u32,
        play_button: Option<bool>,
        controls_visible: bool,
        controls_bounds: Option<Rect>,
    }

    impl PlayerView for FakeView {
        fn overlay_frame_count(&self) -> Option<usize> {
            self.overlay_frames
        }
        fn prepare_overlay(&mut self) {
            self.prepared += 1;
        }
        fn render_frame(&mut self, frame: &FrameDisplay) {
            self.rendered.push(frame.clone());
        }
        fn clear_overlay(&mut self) {
            self.cleared += 1;
        }
        fn set_play_button(&mut self, playing: bool) {
            self.play_button = Some(playing);
        }
        fn set_controls_visible(&mut self, visible: bool) {
            self.controls_visible = visible;
        }
        fn controls_bounds(&self) -> Option<Rect> {
            self.controls_bounds
        }
    }

    type Controller = PlaybackController<FakeMedia, FakeSeekBar, FakeView>;

    fn config(frame_rate: f64) -> PlayerConfig {
        PlayerConfig {
            frame_rate: Some(frame_rate),
            ..PlayerConfig::default()
        }
    }

    /// Attaches, lays out, and loads, like a browser would.
    fn loaded(source: &str, duration: f64, config: PlayerConfig, view: FakeView) -> Controller {
        let mut c = PlaybackController::attach(
            FakeMedia::new(source, duration),
            FakeSeekBar::default(),
            view,
            config,
        );
        c.mark_rendered();
        c.mark_size_prepared();
        c.handle_media_event(MediaEvent::LoadedMetadata);
        c.handle_media_event(MediaEvent::LoadedData);
        c
    }

    fn playing_in_fragment(looping: bool) -> Controller {
        let config = PlayerConfig {
            looping,
            ..config(10.0)
        };
        let mut c = loaded("v.mp4#t=0.5,0.9", 10.0, config, FakeView::default());
        c.toggle_play_pause();
        assert!(!c.media().paused, "playback should have started");
        c
    }

    #[test]
    fn load_without_fragment_shows_first_frame() {
        let c = loaded("v.mp4", 10.0, config(25.0), FakeView::default());
        assert_eq!(c.media().current_time, 0.0);
        let last = c.view().rendered.last().expect("a frame was rendered");
        assert_eq!(last.frame_number, 1);
        assert_eq!(last.frame_label, "1 / 250");
        assert_eq!(last.time_label, "00:00.0");
        assert!(c.state().loading.ready_to_process_frames);
    }

    #[test]
    fn nothing_renders_before_ready() {
        let mut c = PlaybackController::attach(
            FakeMedia::new("v.mp4", 10.0),
            FakeSeekBar::default(),
            FakeView::default(),
            config(25.0),
        );
        c.handle_media_event(MediaEvent::LoadedMetadata);
        c.handle_media_event(MediaEvent::LoadedData);
        assert!(c.view().rendered.is_empty());
        c.mark_rendered();
        assert!(c.view().rendered.is_empty());
        c.mark_size_prepared();
        assert_eq!(c.view().rendered.last().map(|f| f.frame_number), Some(1));
    }

    #[test]
    fn load_with_fragment_starts_at_fragment() {
        let c = loaded("v.mp4#t=2,4", 10.0, config(25.0), FakeView::default());
        let state = c.state();
        let fragment = state.fragment.expect("fragment parsed");
        assert_eq!(fragment.begin_frame, 51);
        assert_eq!(fragment.end_frame, 101);
        assert!(state.lock_to_fragment);
        assert_eq!(c.media().current_time, 2.0);
        assert_eq!(state.frame_number, 51);
    }

    #[test]
    fn load_notifies_observers() {
        let mut c = PlaybackController::attach(
            FakeMedia::new("v.mp4", 10.0),
            FakeSeekBar::default(),
            FakeView::default(),
            config(25.0),
        );
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        c.subscribe(move |n| {
            sink.borrow_mut().push(*n);
            Propagation::Continue
        });
        c.handle_media_event(MediaEvent::LoadedData);
        assert_eq!(*seen.borrow(), [Notification::Load]);
    }

    #[test]
    fn fragment_end_stops_without_loop() {
        let mut c = playing_in_fragment(false);
        assert_eq!(c.state().fragment.map(|f| f.end_frame), Some(10));

        assert_eq!(c.check_for_fragment_reset(11), 11);
        assert!(!c.state().playing);
        assert!(c.media().paused, "element should be paused");
        assert_eq!(c.view().play_button, Some(false));
    }

    #[test]
    fn fragment_end_loops_back() {
        let mut c = playing_in_fragment(true);
        c.media_mut().current_time = 1.05;

        assert_eq!(c.check_for_fragment_reset(11), 6);
        assert!(c.state().playing);
        assert_eq!(c.media().current_time, 0.5);
    }

    #[test]
    fn frames_inside_fragment_pass_through() {
        let mut c = playing_in_fragment(false);
        assert_eq!(c.check_for_fragment_reset(8), 8);
        assert!(c.state().playing);
    }

    #[test]
    fn scrub_releases_fragment_lock_for_good() {
        let mut c = playing_in_fragment(false);
        c.handle_seek_bar_event(SeekBarEvent::PointerDown);
        assert!(c.state().manual_seeking);
        assert!(c.media().paused);
        c.handle_seek_bar_event(SeekBarEvent::PointerUp {
            pointer: Point::new(50.0, 0.0),
            bounds: Rect::new(0.0, 0.0, 100.0, 10.0),
        });
        assert!(!c.state().manual_seeking);
        assert!(!c.media().paused, "released handle resumes playback");
        assert!((c.media().current_time - 5.001).abs() < 1e-9);
        assert_eq!(c.seek_bar().value, 50.0);

        assert_eq!(c.check_for_fragment_reset(11), 11);
        assert!(c.state().playing);
        assert!(!c.state().lock_to_fragment);
    }

    #[test]
    fn seek_bar_change_snaps_and_unlocks() {
        let mut c = loaded("v.mp4#t=1,1.01", 10.0, config(25.0), FakeView::default());
        assert!(c.state().single_frame);

        c.seek_bar.value = 50.0;
        c.handle_seek_bar_event(SeekBarEvent::Change);

        assert!((c.media().current_time - 5.0004).abs() < 1e-9);
        assert!(!c.state().lock_to_fragment);
        assert!(!c.state().single_frame);
        assert_eq!(c.state().frame_number, 126);

        c.toggle_play_pause();
        assert!(!c.media().paused, "no longer a single frame, so it plays");
        assert_eq!(c.check_for_fragment_reset(130), 130);
        assert!(c.state().playing);
    }

    #[test]
    fn seek_bar_change_clamps_out_of_range_values() {
        let mut c = loaded("v.mp4", 10.0, config(25.0), FakeView::default());
        c.seek_bar.value = 140.0;
        c.handle_seek_bar_event(SeekBarEvent::Change);
        assert!(c.media().current_time <= 10.0);
        assert_eq!(c.state().frame_number, 250);
    }

    #[test]
    fn single_frame_fragment_never_plays() {
        let mut c = loaded("v.mp4#t=1,1.01", 10.0, config(25.0), FakeView::default());
        c.toggle_play_pause();
        assert!(c.state().playing);
        assert!(c.media().paused);
        assert_eq!(c.media().play_calls, 0);
    }

    #[test]
    fn autoplay_starts_when_ready() {
        let config = PlayerConfig {
            autoplay: true,
            ..config(25.0)
        };
        let c = loaded("v.mp4", 10.0, config, FakeView::default());
        assert!(c.state().playing);
        assert!(!c.state().autoplay, "autoplay is consumed");
        assert!(!c.media().paused);
    }

    #[test]
    fn unexpected_pause_resumes() {
        let mut c = loaded("v.mp4", 10.0, config(25.0), FakeView::default());
        c.toggle_play_pause();
        let plays = c.media().play_calls;

        c.media_mut().paused = true;
        c.handle_media_event(MediaEvent::Pause);
        assert_eq!(c.media().play_calls, plays + 1);
        assert!(!c.media().paused);
    }

    #[test]
    fn requested_pause_sticks_and_snaps() {
        let mut c = loaded("v.mp4", 10.0, config(25.0), FakeView::default());
        c.toggle_play_pause();
        c.media_mut().current_time = 3.217;
        c.toggle_play_pause();
        assert!(c.media().paused);
        assert!((c.media().current_time - 3.2004).abs() < 1e-9);
        assert_eq!(c.state().frame_number, 81);

        let plays = c.media().play_calls;
        c.handle_media_event(MediaEvent::Pause);
        assert_eq!(c.media().play_calls, plays);
    }

    #[test]
    fn ended_without_loop_stops() {
        let mut c = loaded("v.mp4", 10.0, config(25.0), FakeView::default());
        c.toggle_play_pause();
        c.media_mut().ended = true;
        c.media_mut().paused = true;
        c.handle_media_event(MediaEvent::Ended);
        assert!(!c.state().playing);
        assert_eq!(c.view().play_button, Some(false));
    }

    #[test]
    fn ended_with_loop_replays() {
        let config = PlayerConfig {
            looping: true,
            ..config(25.0)
        };
        let mut c = loaded("v.mp4", 10.0, config, FakeView::default());
        c.toggle_play_pause();
        c.media_mut().paused = true;
        let plays = c.media().play_calls;
        c.handle_media_event(MediaEvent::Ended);
        assert_eq!(c.media().play_calls, plays + 1);
        assert!(c.state().playing);
    }

    #[test]
    fn animation_ticks_follow_playback() {
        let mut c = loaded("v.mp4", 10.0, config(25.0), FakeView::default());
        c.toggle_play_pause();
        assert_eq!(
            c.handle_media_event(MediaEvent::Play),
            Some(TickControl::Continue)
        );

        c.media_mut().current_time = 1.0;
        assert_eq!(c.on_animation_tick(), TickControl::Continue);
        assert_eq!(c.state().frame_number, 26);
        assert_eq!(
            c.view().rendered.last().map(|f| f.time_label.as_str()),
            Some("00:01.0")
        );

        c.media_mut().paused = true;
        assert_eq!(c.on_animation_tick(), TickControl::Stop);
    }

    #[test]
    fn manual_seek_stops_ticks() {
        let mut c = loaded("v.mp4", 10.0, config(25.0), FakeView::default());
        c.toggle_play_pause();
        c.state.manual_seeking = true;
        assert_eq!(c.on_animation_tick(), TickControl::Stop);
    }

    #[test]
    fn mid_seek_frames_are_deferred() {
        let mut c = loaded("v.mp4", 10.0, config(25.0), FakeView::default());
        c.media_mut().seeking = true;
        c.media_mut().current_time = 2.0;
        c.update_frame();
        assert_eq!(c.state().frame_number, 1);

        c.media_mut().seeking = false;
        c.handle_media_event(MediaEvent::Seeked);
        assert_eq!(c.state().frame_number, 51);
    }

    #[test]
    fn time_update_moves_seek_bar_and_notifies() {
        let mut c = loaded("v.mp4", 10.0, config(25.0), FakeView::default());
        let frames = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&frames);
        c.subscribe(move |n| {
            if let Notification::TimeUpdate { frame_number } = n {
                sink.borrow_mut().push(*frame_number);
            }
            Propagation::Continue
        });
        c.media_mut().current_time = 2.5;
        c.handle_media_event(MediaEvent::TimeUpdate);
        assert_eq!(c.seek_bar().value, 25.0);
        assert_eq!(*frames.borrow(), [63]);
    }

    #[test]
    fn error_uses_poster_when_configured() {
        let config = PlayerConfig {
            not_found_poster: Some("missing.png".to_string()),
            ..config(25.0)
        };
        let mut c = loaded("v.mp4", 10.0, config, FakeView::default());
        c.handle_media_event(MediaEvent::Error);
        assert_eq!(c.media().poster.as_deref(), Some("missing.png"));
        assert!(!c.media().removed);
    }

    #[test]
    fn error_removes_element_otherwise() {
        let mut c = loaded("v.mp4", 10.0, config(25.0), FakeView::default());
        let errors = Rc::new(RefCell::new(0));
        let count = Rc::clone(&errors);
        c.subscribe(move |n| {
            if *n == Notification::Error {
                *count.borrow_mut() += 1;
            }
            Propagation::Continue
        });
        c.handle_media_event(MediaEvent::Error);
        assert!(c.media().removed);
        assert_eq!(*errors.borrow(), 1);
    }

    #[test]
    fn frame_rate_inferred_from_overlay() {
        let view = FakeView {
            overlay_frames: Some(250),
            ..FakeView::default()
        };
        let c = loaded("v.mp4", 10.0, PlayerConfig::default(), view);
        assert_eq!(c.state().frame_rate, Some(25.0));
        assert_eq!(c.view().prepared, 1);
        assert!(c.state().loading.overlay_prepared);
    }

    #[test]
    fn replaced_overlay_is_prepared_again() {
        let view = FakeView {
            overlay_frames: Some(250),
            ..FakeView::default()
        };
        let mut c = loaded("v.mp4", 10.0, PlayerConfig::default(), view);
        assert_eq!(c.view().prepared, 1);

        c.view_mut().overlay_frames = Some(300);
        c.overlay_data_changed();
        assert_eq!(c.view().prepared, 2);
        assert!(c.state().loading.overlay_prepared);
        assert_eq!(c.state().frame_rate, Some(30.0));
    }

    #[test]
    fn overlay_added_after_load_is_prepared() {
        let mut c = loaded("v.mp4", 10.0, config(25.0), FakeView::default());
        assert_eq!(c.view().prepared, 0);

        c.view_mut().overlay_frames = Some(250);
        c.overlay_data_changed();
        assert_eq!(c.view().prepared, 1);
        assert_eq!(c.state().frame_rate, Some(25.0), "configured rate is kept");
    }

    #[test]
    fn frame_rate_falls_back_to_thirty() {
        let c = loaded("v.mp4", 8.0, PlayerConfig::default(), FakeView::default());
        assert_eq!(c.state().frame_rate, Some(30.0));
        assert_eq!(c.view().prepared, 0);
    }

    #[test]
    fn configured_frame_rate_change_is_picked_up() {
        let mut c = loaded("v.mp4#t=2,4", 10.0, config(25.0), FakeView::default());
        c.set_frame_rate(Some(50.0));
        assert_eq!(c.state().frame_rate, Some(50.0));
        assert_eq!(c.state().fragment.map(|f| f.begin_frame), Some(101));
    }

    #[test]
    fn hide_controls_timer() {
        let mut c = loaded("v.mp4", 10.0, config(25.0), FakeView::default());
        c.on_pointer_enter(HostTime(1_000));
        assert!(c.view().controls_visible);
        let deadline = HostTime(1_000) + PlayerConfig::DEFAULT_HIDE_CONTROLS_AFTER;
        assert_eq!(c.next_timer_deadline(), Some(deadline));

        c.fire_due_timers(HostTime(2_000));
        assert!(c.view().controls_visible);
        c.fire_due_timers(deadline);
        assert!(!c.view().controls_visible);
        assert_eq!(c.next_timer_deadline(), None);
    }

    #[test]
    fn hovering_controls_keeps_them_visible() {
        let view = FakeView {
            controls_bounds: Some(Rect::new(0.0, 90.0, 100.0, 100.0)),
            ..FakeView::default()
        };
        let mut c = loaded("v.mp4", 10.0, config(25.0), view);
        c.on_pointer_enter(HostTime(0));
        c.on_pointer_move(HostTime(500), Point::new(10.0, 95.0));
        assert_eq!(c.timer_deadline(TimerName::HideControls), None);

        c.on_pointer_move(HostTime(600), Point::new(10.0, 10.0));
        assert_eq!(
            c.timer_deadline(TimerName::HideControls),
            Some(HostTime(600) + Duration::from_millis(2_500))
        );
    }

    #[test]
    fn options_panel_blocks_hiding() {
        let mut c = loaded("v.mp4", 10.0, config(25.0), FakeView::default());
        c.on_pointer_enter(HostTime(0));
        c.set_show_video_options(true);
        c.fire_due_timers(HostTime(10_000_000));
        assert!(c.view().controls_visible);
    }

    #[test]
    fn cancelled_leave_keeps_controls() {
        let mut c = loaded("v.mp4", 10.0, config(25.0), FakeView::default());
        c.subscribe(|n| match n {
            Notification::MouseLeave(_) => Propagation::Stop,
            _ => Propagation::Continue,
        });
        c.on_pointer_enter(HostTime(0));
        c.on_pointer_leave();
        assert!(c.view().controls_visible);
        assert!(c.timer_deadline(TimerName::HideControls).is_some());
    }

    #[test]
    fn leave_hides_controls() {
        let mut c = loaded("v.mp4", 10.0, config(25.0), FakeView::default());
        c.on_pointer_enter(HostTime(0));
        c.on_pointer_leave();
        assert!(!c.view().controls_visible);
        assert_eq!(c.next_timer_deadline(), None);
    }

    #[test]
    fn thumbnail_plays_on_hover() {
        let config = PlayerConfig {
            frame_rate: Some(25.0),
            ..PlayerConfig::thumbnail()
        };
        let mut c = loaded("v.mp4", 10.0, config, FakeView::default());
        c.on_pointer_enter(HostTime(0));
        assert!(c.state().playing);
        assert!(!c.media().paused);
        assert!(!c.view().controls_visible);

        c.on_pointer_leave();
        assert!(!c.state().playing);
        assert!(c.media().paused);
        assert_eq!(c.view().cleared, 1);
    }

    #[test]
    fn cancelled_enter_keeps_thumbnail_paused() {
        let config = PlayerConfig {
            frame_rate: Some(25.0),
            ..PlayerConfig::thumbnail()
        };
        let mut c = loaded("v.mp4", 10.0, config, FakeView::default());
        c.subscribe(|n| match n {
            Notification::MouseEnter(_) => Propagation::Stop,
            _ => Propagation::Continue,
        });
        c.on_pointer_enter(HostTime(0));
        assert!(!c.state().playing);
        assert!(c.media().paused);
    }

    #[test]
    fn hover_before_load_is_ignored() {
        let mut c = PlaybackController::attach(
            FakeMedia::new("v.mp4", 10.0),
            FakeSeekBar::default(),
            FakeView::default(),
            config(25.0),
        );
        c.on_pointer_enter(HostTime(0));
        assert!(c.state().hover.hovering);
        assert_eq!(c.next_timer_deadline(), None);
    }

    #[test]
    fn arrow_keys_step_frames_while_paused() {
        let mut c = loaded("v.mp4", 10.0, config(25.0), FakeView::default());
        assert!(c.on_key(Key::ArrowRight));
        assert_eq!(c.state().frame_number, 2);
        assert!(c.on_key(Key::ArrowRight));
        assert_eq!(c.state().frame_number, 3);
        assert!(c.on_key(Key::ArrowLeft));
        assert_eq!(c.state().frame_number, 2);

        c.media_mut().current_time = 0.0;
        assert!(c.on_key(Key::ArrowLeft));
        assert_eq!(c.media().current_time, 0.0);
    }

    #[test]
    fn arrow_keys_ignored_while_playing() {
        let mut c = loaded("v.mp4", 10.0, config(25.0), FakeView::default());
        assert!(c.on_key(Key::Space));
        assert!(c.state().playing);
        assert!(!c.on_key(Key::ArrowRight));
    }

    #[test]
    fn bad_fragment_is_ignored() {
        let c = loaded("v.mp4#t=5,2", 10.0, config(25.0), FakeView::default());
        assert!(c.state().fragment.is_none());
        assert!(!c.state().lock_to_fragment);
        assert_eq!(c.state().frame_number, 1);
    }

    #[test]
    fn detach_returns_collaborators() {
        let mut c = loaded("v.mp4", 10.0, config(25.0), FakeView::default());
        c.on_pointer_enter(HostTime(0));
        let (media, _, view) = c.detach();
        assert_eq!(media.source, "v.mp4");
        assert!(!view.rendered.is_empty());
    }
}
