//! The face engine: the one stateful controller behind the whole dial.
//!
//! Every host callback arrives as a [`FaceEvent`]; every outbound effect
//! leaves as a [`HostRequest`] on a bounded queue the host drains after each
//! event. All entry points run on the host's single render thread, so the
//! engine owns its state exclusively and never locks.

use chrono::{DateTime, NaiveDateTime, Timelike};
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use heapless::Deque;
use log::{debug, warn};

use crate::complications::{ComplicationData, Complications, SlotId, TapOutcome};
use crate::config::FaceConfig;
use crate::dial::{Hands, Ticks};
use crate::geometry::{
    FRAME_PERIOD_MS, frame_aligned_delay, hour_rotation, minute_rotation, second_rotation,
};
use crate::status::{StatusInputs, StatusOverlay};
use crate::style;

/// Second-hand beats per second in interactive mode.
const BEATS_PER_SECOND: u64 = 1;

/// Bound on undrained outbound requests.
const REQUEST_QUEUE_DEPTH: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TapKind {
    Touch,
    TouchCancel,
    Tap,
}

/// Host notification filter; `Priority` is what the face shows as muted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterruptionFilter {
    All,
    Priority,
    Alarms,
    None,
}

/// Inbound host callbacks, one variant per signal the face consumes.
#[derive(Debug, Clone, PartialEq)]
pub enum FaceEvent {
    SurfaceResized { width: u32, height: u32 },
    AmbientChanged(bool),
    PropertiesChanged {
        low_bit_ambient: bool,
        burn_in_protection: bool,
    },
    /// Host-periodic tick, at least once per minute.
    TimeTick,
    /// The wake-up previously requested via [`HostRequest::ScheduleWakeup`].
    Wakeup { now_ms: u64 },
    Tap { kind: TapKind, x: i32, y: i32 },
    ComplicationUpdate {
        slot: SlotId,
        data: Option<ComplicationData>,
    },
    NotificationCountChanged(u32),
    InterruptionFilterChanged(InterruptionFilter),
    TimeZoneChanged { utc_offset_secs: i32 },
    BatteryChanged { charging: bool, level: u8 },
    ConnectivityChanged(bool),
    VisibilityChanged(bool),
}

/// Outbound effects the host performs on the engine's behalf.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostRequest {
    /// Repaint the surface.
    Invalidate,
    /// Deliver a [`FaceEvent::Wakeup`] after `delay_ms`.
    ScheduleWakeup { delay_ms: u64 },
    /// Drop any pending wake-up; at most one may be outstanding.
    CancelWakeup,
    /// Announce which complication slots the face supports.
    SetActiveSlots([SlotId; 4]),
    LaunchProviderChooser(SlotId),
    LaunchPermissionRequest(SlotId),
    InvokeComplicationAction(SlotId),
    /// Re-deliver time-zone, battery, and connectivity state.
    RefreshEnvironment,
}

pub struct FaceEngine {
    config: FaceConfig,

    hands: Hands,
    ticks: Ticks,
    complications: Complications,
    status: StatusOverlay,

    visible: bool,
    ambient: bool,
    low_bit_ambient: bool,
    burn_in_protection: bool,
    mute: bool,

    charging: bool,
    charging_level: u8,
    connected: bool,
    unread_count: u32,
    utc_offset_secs: i32,

    surface_centre: Point,
    face_origin: Point,
    radius: f32,

    background: Rgb565,
    accent: Rgb565,

    requests: Deque<HostRequest, REQUEST_QUEUE_DEPTH>,
}

impl FaceEngine {
    pub fn new(config: FaceConfig) -> Self {
        let mut engine = Self {
            config,
            hands: Hands::new(),
            ticks: Ticks::new(),
            complications: Complications::new(),
            status: StatusOverlay::new(),
            visible: false,
            ambient: false,
            low_bit_ambient: false,
            burn_in_protection: false,
            mute: false,
            charging: false,
            charging_level: 100,
            connected: false,
            unread_count: 0,
            utc_offset_secs: 0,
            surface_centre: Point::zero(),
            face_origin: Point::zero(),
            radius: 0.0,
            background: Rgb565::BLACK,
            accent: style::DEFAULT_ACCENT,
            requests: Deque::new(),
        };
        engine.push(HostRequest::SetActiveSlots(SlotId::ALL));
        engine.update_paints();
        engine
    }

    /// Next undrained outbound request, oldest first.
    pub fn next_request(&mut self) -> Option<HostRequest> {
        self.requests.pop_front()
    }

    /// Swap in freshly read preferences (call on visibility regained).
    pub fn reload_config(&mut self, config: FaceConfig) {
        if config != self.config {
            debug!("preferences changed, repainting");
        }
        self.config = config;
        self.update_paints();
        self.update_watch_hand_style();
        self.push(HostRequest::Invalidate);
    }

    /// Tear down on host destroy: drop the pending wake-up.
    pub fn teardown(&mut self) {
        self.push(HostRequest::CancelWakeup);
    }

    pub fn handle_event(&mut self, event: FaceEvent) {
        match event {
            FaceEvent::SurfaceResized { width, height } => {
                self.radius = width.min(height) as f32 / 2.0;
                self.surface_centre = Point::new(width as i32 / 2, height as i32 / 2);
                let r = libm::roundf(self.radius) as i32;
                self.face_origin = self.surface_centre - Point::new(r, r);

                self.hands.set_watch_face_radius(self.radius);
                self.ticks.set_watch_face_radius(self.radius);
                self.complications.set_watch_face_radius(self.radius);
                self.status.set_surface(self.surface_centre);
            }
            FaceEvent::AmbientChanged(ambient) => {
                self.ambient = ambient;
                self.update_watch_hand_style();
                self.complications.set_ambient(ambient);
                self.update_timer();
            }
            FaceEvent::PropertiesChanged {
                low_bit_ambient,
                burn_in_protection,
            } => {
                self.low_bit_ambient = low_bit_ambient;
                self.burn_in_protection = burn_in_protection;
                self.complications.set_low_bit_ambient(self.low_bit_ambient);
                self.complications
                    .set_burn_in_protection(self.burn_in_protection);
                // Hands, ticks, and the overlay carry their own anti-alias
                // state; a property change must re-sync it too.
                self.update_watch_hand_style();
            }
            FaceEvent::TimeTick => {
                self.push(HostRequest::Invalidate);
            }
            FaceEvent::Wakeup { now_ms } => {
                self.push(HostRequest::Invalidate);
                if self.should_timer_run() {
                    self.push(HostRequest::ScheduleWakeup {
                        delay_ms: frame_aligned_delay(now_ms, FRAME_PERIOD_MS),
                    });
                }
            }
            FaceEvent::Tap { kind, x, y } => {
                if kind == TapKind::Tap {
                    let local = Point::new(x, y) - self.face_origin;
                    match self.complications.tap(local) {
                        Some(TapOutcome::LaunchChooser(slot)) => {
                            self.push(HostRequest::LaunchProviderChooser(slot));
                        }
                        Some(TapOutcome::RequestPermission(slot)) => {
                            self.push(HostRequest::LaunchPermissionRequest(slot));
                        }
                        Some(TapOutcome::InvokeAction(slot)) => {
                            self.push(HostRequest::InvokeComplicationAction(slot));
                        }
                        None => {}
                    }
                }
                self.push(HostRequest::Invalidate);
            }
            FaceEvent::ComplicationUpdate { slot, data } => {
                self.complications.update_data(slot, data);
                self.push(HostRequest::Invalidate);
            }
            FaceEvent::NotificationCountChanged(count) => {
                self.unread_count = count;
                self.push(HostRequest::Invalidate);
            }
            FaceEvent::InterruptionFilterChanged(filter) => {
                self.mute = filter == InterruptionFilter::Priority;
                self.push(HostRequest::Invalidate);
            }
            FaceEvent::TimeZoneChanged { utc_offset_secs } => {
                self.utc_offset_secs = utc_offset_secs;
                self.push(HostRequest::Invalidate);
            }
            FaceEvent::BatteryChanged { charging, level } => {
                self.charging = charging;
                self.charging_level = level;
                self.push(HostRequest::Invalidate);
            }
            FaceEvent::ConnectivityChanged(connected) => {
                self.connected = connected;
                self.push(HostRequest::Invalidate);
            }
            FaceEvent::VisibilityChanged(visible) => {
                self.visible = visible;
                if visible {
                    // Environment may have drifted while hidden; ask the
                    // host's receivers to re-deliver, then repaint.
                    self.push(HostRequest::RefreshEnvironment);
                    self.update_paints();
                    self.update_watch_hand_style();
                    self.push(HostRequest::Invalidate);
                }
                self.update_timer();
            }
        }
    }

    /// Paint the whole face for the wall-clock instant `now_unix_ms`.
    pub fn draw<D: DrawTarget<Color = Rgb565>>(
        &mut self,
        target: &mut D,
        now_unix_ms: u64,
    ) -> Result<(), D::Error> {
        let local = self.local_time(now_unix_ms);

        let background = if self.ambient {
            style::AMBIENT_BACKGROUND
        } else {
            self.background
        };
        target.clear(background)?;

        {
            let mut face = target.translated(self.face_origin);
            self.ticks.draw(&mut face)?;
            self.complications.draw(&mut face, now_unix_ms)?;
        }

        // Ambient full mute hides the auxiliary overlays while ambient and
        // muted; interactive frames always show them.
        let suppress_overlays = self.config.ambient_full_mute && self.mute && self.ambient;
        if !suppress_overlays {
            self.status.draw_status_row(target, &self.status_inputs())?;
            self.status.draw_notification_dot(target, self.unread_count)?;
        }

        self.draw_hands(target, &local, now_unix_ms)
    }

    fn draw_hands<D: DrawTarget<Color = Rgb565>>(
        &mut self,
        target: &mut D,
        local: &NaiveDateTime,
        now_ms: u64,
    ) -> Result<(), D::Error> {
        let second = local.second();

        // Quantise sub-second millis to the second-hand beat; the sweep
        // animation covers the gap between beats.
        let normalizer = 1000 / BEATS_PER_SECOND;
        let millis = now_ms % 1000 / normalizer * normalizer;

        let (second_deg, previous_second_deg) = if self.ambient {
            (None, None)
        } else {
            (
                Some(second_rotation(second, millis as u32)),
                Some((second as f32 + (millis as f32 - normalizer as f32) / 1000.0) * 6.0),
            )
        };

        let hour_deg = hour_rotation(local.hour(), local.minute());
        let minute_deg = minute_rotation(local.minute(), second);

        let mut face = target.translated(self.face_origin);
        self.hands.draw(
            &mut face,
            hour_deg,
            minute_deg,
            second_deg,
            previous_second_deg,
            now_ms,
        )
    }

    fn local_time(&self, now_unix_ms: u64) -> NaiveDateTime {
        let shifted = now_unix_ms as i64 + self.utc_offset_secs as i64 * 1000;
        DateTime::from_timestamp_millis(shifted)
            .map(|instant| instant.naive_utc())
            .unwrap_or_default()
    }

    fn status_inputs(&self) -> StatusInputs {
        StatusInputs {
            mute: self.mute,
            ambient: self.ambient,
            charging: self.charging,
            charging_level: self.charging_level,
            connected: self.connected,
        }
    }

    /// Apply the interactive palette from the current preferences.
    fn update_paints(&mut self) {
        self.accent = self.config.accent.colour_or(style::DEFAULT_ACCENT);
        self.background = self.config.background.colour_or(Rgb565::BLACK);

        self.hands.set_primary_colour(style::WHITE);
        self.hands.set_accent_colour(self.accent);
        self.hands.set_anti_alias(true);
        self.hands.set_animated(self.config.animated_second_hand);

        self.ticks.set_colour(style::WHITE);
        self.ticks.set_anti_alias(true);

        self.status.set_accent(self.accent);
        self.status.set_anti_alias(true);
    }

    /// Swap hand/tick style between the ambient and interactive palettes.
    ///
    /// While ambient, anti-alias always mirrors the low-bit property so a
    /// property change landing mid-ambient takes effect immediately.
    fn update_watch_hand_style(&mut self) {
        if self.ambient {
            self.hands.set_ambient_colour(style::WHITE);
            self.ticks.set_colour(style::WHITE);
            self.hands.set_anti_alias(!self.low_bit_ambient);
            self.ticks.set_anti_alias(!self.low_bit_ambient);
            self.status.set_anti_alias(!self.low_bit_ambient);
        } else {
            self.hands.set_primary_colour(style::WHITE);
            self.hands.set_accent_colour(self.accent);
            self.ticks.set_colour(style::WHITE);
            self.hands.set_anti_alias(true);
            self.ticks.set_anti_alias(true);
            self.status.set_anti_alias(true);
        }
    }

    /// Cancel-then-reschedule keeps at most one wake-up outstanding.
    fn update_timer(&mut self) {
        self.push(HostRequest::CancelWakeup);
        if self.should_timer_run() {
            self.push(HostRequest::ScheduleWakeup { delay_ms: 0 });
        }
    }

    /// The interactive repaint timer runs only while actually watched.
    fn should_timer_run(&self) -> bool {
        self.visible && !self.ambient
    }

    fn push(&mut self, request: HostRequest) {
        if self.requests.push_back(request).is_err() {
            warn!("request queue full, dropping {:?}", request);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_graphics::mock_display::MockDisplay;

    fn drain(engine: &mut FaceEngine) -> std::vec::Vec<HostRequest> {
        let mut requests = std::vec::Vec::new();
        while let Some(request) = engine.next_request() {
            requests.push(request);
        }
        requests
    }

    fn engine() -> FaceEngine {
        let mut engine = FaceEngine::new(FaceConfig::default());
        engine.handle_event(FaceEvent::SurfaceResized {
            width: 64,
            height: 64,
        });
        drain(&mut engine);
        engine
    }

    fn display() -> MockDisplay<Rgb565> {
        let mut display = MockDisplay::new();
        display.set_allow_overdraw(true);
        display.set_allow_out_of_bounds_drawing(true);
        display
    }

    #[test]
    fn test_new_engine_announces_slots() {
        let mut engine = FaceEngine::new(FaceConfig::default());
        assert_eq!(
            engine.next_request(),
            Some(HostRequest::SetActiveSlots(SlotId::ALL))
        );
    }

    #[test]
    fn test_timer_follows_visibility_and_ambient() {
        let mut engine = engine();

        engine.handle_event(FaceEvent::VisibilityChanged(true));
        let requests = drain(&mut engine);
        assert!(requests.contains(&HostRequest::CancelWakeup));
        assert!(requests.contains(&HostRequest::ScheduleWakeup { delay_ms: 0 }));

        // Ambient cancels without rescheduling.
        engine.handle_event(FaceEvent::AmbientChanged(true));
        let requests = drain(&mut engine);
        assert!(requests.contains(&HostRequest::CancelWakeup));
        assert!(
            !requests
                .iter()
                .any(|request| matches!(request, HostRequest::ScheduleWakeup { .. }))
        );

        // Back to interactive while still visible: the timer resumes.
        engine.handle_event(FaceEvent::AmbientChanged(false));
        let requests = drain(&mut engine);
        assert!(requests.contains(&HostRequest::ScheduleWakeup { delay_ms: 0 }));
    }

    #[test]
    fn test_hidden_face_never_schedules() {
        let mut engine = engine();
        engine.handle_event(FaceEvent::VisibilityChanged(false));
        let requests = drain(&mut engine);
        assert!(requests.contains(&HostRequest::CancelWakeup));
        assert!(
            !requests
                .iter()
                .any(|request| matches!(request, HostRequest::ScheduleWakeup { .. }))
        );
    }

    #[test]
    fn test_wakeup_repaints_and_realigns() {
        let mut engine = engine();
        engine.handle_event(FaceEvent::VisibilityChanged(true));
        drain(&mut engine);

        engine.handle_event(FaceEvent::Wakeup { now_ms: 1003 });
        let requests = drain(&mut engine);
        assert_eq!(requests[0], HostRequest::Invalidate);
        assert_eq!(
            requests[1],
            HostRequest::ScheduleWakeup {
                delay_ms: FRAME_PERIOD_MS - 1003 % FRAME_PERIOD_MS
            }
        );
    }

    #[test]
    fn test_wakeup_while_ambient_does_not_reschedule() {
        let mut engine = engine();
        engine.handle_event(FaceEvent::VisibilityChanged(true));
        engine.handle_event(FaceEvent::AmbientChanged(true));
        drain(&mut engine);

        engine.handle_event(FaceEvent::Wakeup { now_ms: 500 });
        let requests = drain(&mut engine);
        assert_eq!(requests, [HostRequest::Invalidate]);
    }

    #[test]
    fn test_ambient_disables_anti_alias_only_with_low_bit() {
        let mut engine = engine();
        engine.handle_event(FaceEvent::AmbientChanged(true));
        assert!(engine.hands.anti_alias());
        assert!(engine.ticks.anti_alias());

        engine.handle_event(FaceEvent::AmbientChanged(false));
        engine.handle_event(FaceEvent::PropertiesChanged {
            low_bit_ambient: true,
            burn_in_protection: false,
        });
        engine.handle_event(FaceEvent::AmbientChanged(true));
        assert!(!engine.hands.anti_alias());
        assert!(!engine.ticks.anti_alias());
        assert!(!engine.status.anti_alias());

        engine.handle_event(FaceEvent::AmbientChanged(false));
        assert!(engine.hands.anti_alias());
        assert!(engine.ticks.anti_alias());
        assert!(engine.status.anti_alias());
    }

    #[test]
    fn test_ambient_draw_has_no_accent_pixels() {
        let mut engine = engine();

        let mut interactive = display();
        engine.draw(&mut interactive, 0).unwrap();
        let accent = engine.accent;
        let count = |display: &MockDisplay<Rgb565>| {
            let mut pixels = 0;
            for y in 0..64 {
                for x in 0..64 {
                    if display.get_pixel(Point::new(x, y)) == Some(accent) {
                        pixels += 1;
                    }
                }
            }
            pixels
        };
        assert!(count(&interactive) > 0);

        engine.handle_event(FaceEvent::AmbientChanged(true));
        let mut ambient = display();
        engine.draw(&mut ambient, 0).unwrap();
        assert_eq!(count(&ambient), 0);
    }

    #[test]
    fn test_tap_on_empty_slot_requests_chooser() {
        let mut engine = engine();
        engine.handle_event(FaceEvent::ComplicationUpdate {
            slot: SlotId::Left,
            data: None,
        });
        drain(&mut engine);

        // Face-local LEFT slot centre at radius 32 is (16, 32).
        engine.handle_event(FaceEvent::Tap {
            kind: TapKind::Tap,
            x: 16,
            y: 32,
        });
        let requests = drain(&mut engine);
        assert!(requests.contains(&HostRequest::LaunchProviderChooser(SlotId::Left)));
    }

    #[test]
    fn test_touch_events_do_not_hit_test() {
        let mut engine = engine();
        engine.handle_event(FaceEvent::ComplicationUpdate {
            slot: SlotId::Left,
            data: None,
        });
        drain(&mut engine);

        engine.handle_event(FaceEvent::Tap {
            kind: TapKind::Touch,
            x: 16,
            y: 32,
        });
        let requests = drain(&mut engine);
        assert_eq!(requests, [HostRequest::Invalidate]);
    }

    #[test]
    fn test_visibility_regain_refreshes_environment() {
        let mut engine = engine();
        engine.handle_event(FaceEvent::VisibilityChanged(true));
        let requests = drain(&mut engine);
        assert_eq!(requests[0], HostRequest::RefreshEnvironment);
    }

    #[test]
    fn test_ambient_full_mute_suppresses_overlay() {
        let mut config = FaceConfig::default();
        config.ambient_full_mute = true;
        let mut engine = FaceEngine::new(config);
        engine.handle_event(FaceEvent::SurfaceResized {
            width: 64,
            height: 64,
        });
        engine.handle_event(FaceEvent::InterruptionFilterChanged(
            InterruptionFilter::Priority,
        ));
        engine.handle_event(FaceEvent::NotificationCountChanged(2));
        engine.handle_event(FaceEvent::AmbientChanged(true));
        drain(&mut engine);

        // Muted + ambient + full mute: only black background, white ticks
        // and hands remain.
        let mut muted = display();
        engine.draw(&mut muted, 0).unwrap();
        for y in 0..64 {
            for x in 0..64 {
                let pixel = muted.get_pixel(Point::new(x, y));
                assert!(
                    pixel == Some(style::WHITE) || pixel == Some(Rgb565::BLACK) || pixel.is_none(),
                    "unexpected overlay pixel at ({x}, {y})"
                );
            }
        }
    }

    #[test]
    fn test_low_bit_toggle_while_ambient_resyncs_anti_alias() {
        let mut engine = engine();
        engine.handle_event(FaceEvent::AmbientChanged(true));
        engine.handle_event(FaceEvent::PropertiesChanged {
            low_bit_ambient: true,
            burn_in_protection: false,
        });
        assert!(!engine.hands.anti_alias());
        assert!(!engine.ticks.anti_alias());
        assert!(!engine.status.anti_alias());

        engine.handle_event(FaceEvent::PropertiesChanged {
            low_bit_ambient: false,
            burn_in_protection: false,
        });
        assert!(engine.hands.anti_alias());
        assert!(engine.ticks.anti_alias());
        assert!(engine.status.anti_alias());
    }

    #[test]
    fn test_interactive_full_mute_keeps_notification_dot() {
        let mut config = FaceConfig::default();
        config.ambient_full_mute = true;
        let mut engine = FaceEngine::new(config);
        engine.handle_event(FaceEvent::SurfaceResized {
            width: 64,
            height: 64,
        });
        engine.handle_event(FaceEvent::InterruptionFilterChanged(
            InterruptionFilter::Priority,
        ));
        engine.handle_event(FaceEvent::NotificationCountChanged(2));
        drain(&mut engine);

        // Muted with the preference set, but interactive: the dot stays. At
        // midnight every hand points up, so accent pixels in the lower third
        // can only be the dot.
        let mut interactive = display();
        engine.draw(&mut interactive, 0).unwrap();
        let accent = engine.accent;
        let mut dot_pixels = 0;
        for y in 50..64 {
            for x in 0..64 {
                if interactive.get_pixel(Point::new(x, y)) == Some(accent) {
                    dot_pixels += 1;
                }
            }
        }
        assert!(dot_pixels > 0);
    }

    #[test]
    fn test_draw_before_first_resize_is_harmless() {
        let mut engine = FaceEngine::new(FaceConfig::default());
        let mut display = display();
        engine.draw(&mut display, 1_700_000_000_000).unwrap();
    }

    #[test]
    fn test_teardown_cancels_wakeup() {
        let mut engine = engine();
        engine.teardown();
        assert_eq!(drain(&mut engine), [HostRequest::CancelWakeup]);
    }
}
