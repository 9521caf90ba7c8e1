// Copyright 2026 the Framelock Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A [`PlaybackController`] wired to live DOM elements.
//!
//! [`WebPlayer::attach`] registers listeners for the video's media events,
//! the seek bar, the play button, and pointer/keyboard input on the player
//! root, and forwards each to the controller. Animation ticks run while the
//! controller asks for them; one `setTimeout` tracks the controller's
//! earliest named-timer deadline.

use alloc::boxed::Box;
use alloc::rc::{Rc, Weak};
use alloc::vec::Vec;
use core::cell::RefCell;

use kurbo::Point;
use wasm_bindgen::JsCast as _;
use wasm_bindgen::prelude::*;
use web_sys::{Event, EventTarget, HtmlElement, HtmlInputElement, HtmlVideoElement, KeyboardEvent, MouseEvent};

use framelock_core::controller::PlaybackController;
use framelock_core::media::{Key, MediaEvent, SeekBarEvent, TickControl};
use framelock_core::notify::{Notification, Propagation, SubscriptionId};
use framelock_core::state::{PlaybackState, PlayerConfig};
use framelock_core::trace::{TraceSink, Tracer};

use crate::listener::EventListener;
use crate::media::{SeekInput, VideoElement};
use crate::raf::AnimationLoop;
use crate::timeout::Timeout;
use crate::view::{DomView, OverlayRenderer};

/// `HTMLMediaElement.HAVE_METADATA`.
const HAVE_METADATA: u16 = 1;
/// `HTMLMediaElement.HAVE_CURRENT_DATA`.
const HAVE_CURRENT_DATA: u16 = 2;

type Controller = PlaybackController<VideoElement, SeekInput, DomView>;

/// The DOM elements a [`WebPlayer`] drives.
#[derive(Clone, Debug)]
pub struct PlayerElements {
    /// Receives pointer and keyboard input. Give it a `tabindex` for keys.
    pub root: HtmlElement,
    /// The media.
    pub video: HtmlVideoElement,
    /// `<input type=range>` spanning `0..=PlayerConfig::seek_bar_max`.
    pub seek: HtmlInputElement,
    /// Play/pause button.
    pub play_button: HtmlElement,
    /// Control strip, hidden after pointer inactivity.
    pub controls: HtmlElement,
    /// Receives `"<frame> / <total>"`.
    pub frame_label: HtmlElement,
    /// Receives `MM:SS.s`.
    pub time_label: HtmlElement,
}

struct Shared {
    controller: RefCell<Controller>,
    seek: SeekInput,
    animation: AnimationLoop,
    timeout: Timeout,
}

impl Shared {
    /// Runs `f` on the controller, then re-aims the timer timeout.
    fn with_controller<R>(&self, f: impl FnOnce(&mut Controller) -> R) -> R {
        let result = f(&mut self.controller.borrow_mut());
        self.sync_timeout();
        result
    }

    fn sync_timeout(&self) {
        let deadline = self.controller.borrow().next_timer_deadline();
        self.timeout.arm(deadline, crate::now());
    }

    fn media_event(&self, event: MediaEvent) {
        match self.with_controller(|c| c.handle_media_event(event)) {
            Some(TickControl::Continue) => self.animation.start(),
            Some(TickControl::Stop) => self.animation.stop(),
            None => {}
        }
    }
}

/// A playback controller attached to DOM elements.
///
/// Dropping the player (or calling [`detach`](Self::detach)) removes every
/// listener and cancels pending ticks and timeouts.
pub struct WebPlayer {
    shared: Rc<Shared>,
    listeners: Vec<EventListener>,
}

impl core::fmt::Debug for WebPlayer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("WebPlayer")
            .field("controller", &self.shared.controller)
            .field("animation", &self.shared.animation)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl WebPlayer {
    /// Attaches a controller to `elements`.
    pub fn attach(elements: PlayerElements, config: PlayerConfig) -> Result<Self, JsValue> {
        Self::attach_with_tracer(elements, config, Tracer::none())
    }

    /// Attaches with a trace sink installed before the source is inspected.
    pub fn attach_traced(
        elements: PlayerElements,
        config: PlayerConfig,
        sink: Box<dyn TraceSink>,
    ) -> Result<Self, JsValue> {
        let mut tracer = Tracer::none();
        tracer.set_sink(sink);
        Self::attach_with_tracer(elements, config, tracer)
    }

    fn attach_with_tracer(
        elements: PlayerElements,
        config: PlayerConfig,
        tracer: Tracer,
    ) -> Result<Self, JsValue> {
        let PlayerElements {
            root,
            video,
            seek,
            play_button,
            controls,
            frame_label,
            time_label,
        } = elements;

        let seek = SeekInput::new(seek);
        let view = DomView::new(frame_label, time_label, play_button.clone(), controls);
        let controller = PlaybackController::attach_with_tracer(
            VideoElement::new(video.clone()),
            seek.clone(),
            view,
            config,
            tracer,
        );

        let shared = Rc::new_cyclic(|weak: &Weak<Shared>| {
            let tick = weak.clone();
            let animation = AnimationLoop::new(move |_now| match tick.upgrade() {
                Some(shared) => shared.with_controller(Controller::on_animation_tick),
                None => TickControl::Stop,
            });
            let fire = weak.clone();
            let timeout = Timeout::new(move || {
                if let Some(shared) = fire.upgrade() {
                    shared.timeout.fired();
                    shared.with_controller(|c| c.fire_due_timers(crate::now()));
                }
            });
            Shared {
                controller: RefCell::new(controller),
                seek: seek.clone(),
                animation,
                timeout,
            }
        });

        let mut listeners = Vec::new();

        for event in MediaEvent::ALL {
            listeners.push(listen(&shared, video.as_ref(), event.dom_name(), move |s, _| {
                s.media_event(event);
            })?);
        }

        let seek_target: &EventTarget = seek.element().as_ref();
        listeners.push(listen(&shared, seek_target, "change", |s, _| {
            s.with_controller(|c| c.handle_seek_bar_event(SeekBarEvent::Change));
        })?);
        listeners.push(listen(&shared, seek_target, "mousedown", |s, _| {
            s.with_controller(|c| c.handle_seek_bar_event(SeekBarEvent::PointerDown));
        })?);
        listeners.push(listen(&shared, seek_target, "mouseup", |s, event| {
            let Some(pointer) = client_point(&event) else {
                return;
            };
            let bounds = s.seek.bounds();
            s.with_controller(|c| {
                c.handle_seek_bar_event(SeekBarEvent::PointerUp { pointer, bounds });
            });
        })?);

        listeners.push(listen(&shared, play_button.as_ref(), "click", |s, _| {
            s.with_controller(Controller::toggle_play_pause);
        })?);

        let root_target: &EventTarget = root.as_ref();
        listeners.push(listen(&shared, root_target, "mouseenter", |s, _| {
            s.with_controller(|c| c.on_pointer_enter(crate::now()));
        })?);
        listeners.push(listen(&shared, root_target, "mousemove", |s, event| {
            if let Some(point) = client_point(&event) {
                s.with_controller(|c| c.on_pointer_move(crate::now(), point));
            }
        })?);
        listeners.push(listen(&shared, root_target, "mouseleave", |s, _| {
            s.with_controller(Controller::on_pointer_leave);
        })?);
        listeners.push(listen(&shared, root_target, "keydown", |s, event| {
            let Some(key) = event
                .dyn_ref::<KeyboardEvent>()
                .and_then(|e| Key::from_dom_key(&e.key()))
            else {
                return;
            };
            if s.with_controller(|c| c.on_key(key)) {
                event.prevent_default();
            }
        })?);

        shared.with_controller(|c| {
            c.mark_rendered();
            c.mark_size_prepared();
        });

        // The element may have loaded before we started listening.
        let ready_state = video.ready_state();
        if ready_state >= HAVE_METADATA {
            shared.media_event(MediaEvent::LoadedMetadata);
        }
        if ready_state >= HAVE_CURRENT_DATA {
            shared.media_event(MediaEvent::LoadedData);
        }

        log::debug!("attached player to {}", video.src());
        Ok(Self { shared, listeners })
    }

    /// Snapshot of the playback state.
    #[must_use]
    pub fn state(&self) -> PlaybackState {
        self.shared.controller.borrow().state()
    }

    /// Subscribes to notifications. The handler must not call back into
    /// this player.
    pub fn subscribe(
        &self,
        handler: impl FnMut(&Notification) -> Propagation + 'static,
    ) -> SubscriptionId {
        self.shared.controller.borrow_mut().subscribe(handler)
    }

    /// Removes a subscriber.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.shared.controller.borrow_mut().unsubscribe(id)
    }

    /// Installs (or removes) the overlay renderer.
    pub fn set_overlay(&self, overlay: Option<Box<dyn OverlayRenderer>>) {
        self.shared.with_controller(|c| {
            c.view_mut().set_overlay(overlay);
            c.overlay_data_changed();
        });
    }

    /// Supplies the frame rate; `None` keeps the current one.
    pub fn set_frame_rate(&self, frame_rate: Option<f64>) {
        self.shared.with_controller(|c| c.set_frame_rate(frame_rate));
    }

    /// Opens or closes the options panel.
    pub fn set_show_video_options(&self, open: bool) {
        self.shared
            .with_controller(|c| c.set_show_video_options(open));
    }

    /// Toggles intended playback.
    pub fn toggle_play_pause(&self) {
        self.shared.with_controller(Controller::toggle_play_pause);
    }

    /// Installs a trace sink.
    pub fn set_trace_sink(&self, sink: Box<dyn TraceSink>) {
        self.shared.controller.borrow_mut().set_trace_sink(sink);
    }

    /// Detaches from the DOM.
    pub fn detach(self) {
        drop(self);
    }
}

impl Drop for WebPlayer {
    fn drop(&mut self) {
        self.listeners.clear();
        self.shared.animation.stop();
        self.shared.timeout.cancel();
        log::debug!("detached player");
    }
}

/// Registers a listener that forwards to `shared` while it is alive.
fn listen(
    shared: &Rc<Shared>,
    target: &EventTarget,
    event_type: &'static str,
    handler: impl Fn(&Shared, Event) + 'static,
) -> Result<EventListener, JsValue> {
    let weak = Rc::downgrade(shared);
    EventListener::new(target, event_type, move |event| {
        if let Some(shared) = weak.upgrade() {
            handler(&shared, event);
        }
    })
}

fn client_point(event: &Event) -> Option<Point> {
    let mouse = event.dyn_ref::<MouseEvent>()?;
    Some(Point::new(
        f64::from(mouse.client_x()),
        f64::from(mouse.client_y()),
    ))
}
