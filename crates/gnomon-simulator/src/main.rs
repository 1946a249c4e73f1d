//! Desktop simulator host for the gnomon-rs watch face.
//!
//! Drives [`gnomon_core::engine::FaceEngine`] in an SDL2 window via
//! `embedded-graphics-simulator`, standing in for the wearable runtime:
//! it owns the surface, services wake-up requests, and forwards input and
//! environment changes as face events.
//!
//! # Key bindings
//!
//! | Key | Action                              |
//! |-----|-------------------------------------|
//! | A   | Toggle ambient mode                 |
//! | M   | Toggle mute (priority filter)       |
//! | C   | Toggle charging                     |
//! | B   | Cycle battery level                 |
//! | N   | Cycle unread notification count     |
//! | O   | Toggle connectivity                 |
//! | V   | Toggle visibility                   |
//! | L   | Toggle low-bit ambient property     |
//! | Q   | Quit                                |
//!
//! Mouse press/release is forwarded as touch/tap.

use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use chrono::Local;
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics_simulator::{
    OutputSettingsBuilder, SimulatorDisplay, SimulatorEvent, Window, sdl2::Keycode,
};
use log::info;

use gnomon_core::complications::{ComplicationData, SlotId};
use gnomon_core::config::FaceConfig;
use gnomon_core::engine::{FaceEngine, FaceEvent, HostRequest, InterruptionFilter, TapKind};

/// Square surface edge, a typical round-watch frame buffer.
const FACE_SIZE: u32 = 400;

/// Window pixel scale.
const WINDOW_SCALE: u32 = 1;

/// Event-loop poll interval; well under the 16 ms interactive frame.
const POLL_INTERVAL: Duration = Duration::from_millis(4);

/// Battery levels the B key cycles through, one per charging glyph bucket.
const BATTERY_LEVELS: [u8; 6] = [100, 95, 85, 70, 40, 20];

/// Host-side mirror of the environment signals the face consumes.
struct HostEnvironment {
    ambient: bool,
    visible: bool,
    mute: bool,
    charging: bool,
    battery_index: usize,
    connected: bool,
    unread_count: u32,
    low_bit_ambient: bool,
    utc_offset_secs: i32,
}

impl HostEnvironment {
    fn new() -> Self {
        Self {
            ambient: false,
            visible: true,
            mute: false,
            charging: false,
            battery_index: 0,
            connected: true,
            unread_count: 0,
            low_bit_ambient: false,
            utc_offset_secs: Local::now().offset().local_minus_utc(),
        }
    }

    fn battery_level(&self) -> u8 {
        BATTERY_LEVELS[self.battery_index]
    }

    /// The thin-receiver re-delivery the core asks for on visibility gain.
    fn refresh_events(&self) -> [FaceEvent; 3] {
        [
            FaceEvent::TimeZoneChanged {
                utc_offset_secs: self.utc_offset_secs,
            },
            FaceEvent::BatteryChanged {
                charging: self.charging,
                level: self.battery_level(),
            },
            FaceEvent::ConnectivityChanged(self.connected),
        ]
    }
}

/// Stand-in provider data for the chooser flow each slot would launch.
fn demo_data(slot: SlotId) -> ComplicationData {
    match slot {
        SlotId::Left => ComplicationData::ranged_value(68.0, 0.0, 100.0),
        SlotId::Top => ComplicationData::short_text("MON").with_tap_action(),
        SlotId::Right => ComplicationData::short_text("21C"),
        SlotId::Bottom => ComplicationData::no_permission(),
    }
}

fn unix_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

fn main() {
    env_logger::init();

    let mut display = SimulatorDisplay::<Rgb565>::new(Size::new(FACE_SIZE, FACE_SIZE));
    let output_settings = OutputSettingsBuilder::new().scale(WINDOW_SCALE).build();
    let mut window = Window::new("gnomon", &output_settings);

    let mut env = HostEnvironment::new();
    let mut engine = FaceEngine::new(FaceConfig::default());
    engine.handle_event(FaceEvent::SurfaceResized {
        width: FACE_SIZE,
        height: FACE_SIZE,
    });
    for event in env.refresh_events() {
        engine.handle_event(event);
    }
    engine.handle_event(FaceEvent::VisibilityChanged(true));

    let mut wakeup_deadline: Option<Instant> = None;
    let mut needs_redraw = true;
    let mut last_minute = unix_ms() / 60_000;

    'running: loop {
        // Drain the engine's outbound requests before anything else.
        let mut requests = Vec::new();
        while let Some(request) = engine.next_request() {
            requests.push(request);
        }
        for request in requests {
            match request {
                HostRequest::Invalidate => needs_redraw = true,
                HostRequest::ScheduleWakeup { delay_ms } => {
                    wakeup_deadline = Some(Instant::now() + Duration::from_millis(delay_ms));
                }
                HostRequest::CancelWakeup => wakeup_deadline = None,
                HostRequest::SetActiveSlots(slots) => {
                    info!("face supports {} complication slots", slots.len());
                }
                HostRequest::LaunchProviderChooser(slot) => {
                    // No chooser UI here: pretend the user picked a provider.
                    info!("provider chooser for {slot:?}, installing demo data");
                    engine.handle_event(FaceEvent::ComplicationUpdate {
                        slot,
                        data: Some(demo_data(slot)),
                    });
                }
                HostRequest::LaunchPermissionRequest(slot) => {
                    info!("permission request for {slot:?}, granting");
                    engine.handle_event(FaceEvent::ComplicationUpdate {
                        slot,
                        data: Some(ComplicationData::short_text("OK")),
                    });
                }
                HostRequest::InvokeComplicationAction(slot) => {
                    info!("tap action fired for {slot:?}");
                }
                HostRequest::RefreshEnvironment => {
                    for event in env.refresh_events() {
                        engine.handle_event(event);
                    }
                }
            }
        }

        if let Some(deadline) = wakeup_deadline
            && Instant::now() >= deadline
        {
            wakeup_deadline = None;
            engine.handle_event(FaceEvent::Wakeup { now_ms: unix_ms() });
        }

        let minute = unix_ms() / 60_000;
        if minute != last_minute {
            last_minute = minute;
            engine.handle_event(FaceEvent::TimeTick);
        }

        if needs_redraw {
            needs_redraw = false;
            engine
                .draw(&mut display, unix_ms())
                .expect("simulator display is infallible");
        }
        window.update(&display);

        for event in window.events() {
            match event {
                SimulatorEvent::Quit => break 'running,
                SimulatorEvent::MouseButtonDown { point, .. } => {
                    engine.handle_event(FaceEvent::Tap {
                        kind: TapKind::Touch,
                        x: point.x,
                        y: point.y,
                    });
                }
                SimulatorEvent::MouseButtonUp { point, .. } => {
                    engine.handle_event(FaceEvent::Tap {
                        kind: TapKind::Tap,
                        x: point.x,
                        y: point.y,
                    });
                }
                SimulatorEvent::KeyDown { keycode, .. } => match keycode {
                    Keycode::Q => break 'running,
                    Keycode::A => {
                        env.ambient = !env.ambient;
                        engine.handle_event(FaceEvent::AmbientChanged(env.ambient));
                        needs_redraw = true;
                    }
                    Keycode::M => {
                        env.mute = !env.mute;
                        let filter = if env.mute {
                            InterruptionFilter::Priority
                        } else {
                            InterruptionFilter::All
                        };
                        engine.handle_event(FaceEvent::InterruptionFilterChanged(filter));
                    }
                    Keycode::C => {
                        env.charging = !env.charging;
                        engine.handle_event(FaceEvent::BatteryChanged {
                            charging: env.charging,
                            level: env.battery_level(),
                        });
                    }
                    Keycode::B => {
                        env.battery_index = (env.battery_index + 1) % BATTERY_LEVELS.len();
                        engine.handle_event(FaceEvent::BatteryChanged {
                            charging: env.charging,
                            level: env.battery_level(),
                        });
                    }
                    Keycode::N => {
                        env.unread_count = (env.unread_count + 1) % 4;
                        engine.handle_event(FaceEvent::NotificationCountChanged(env.unread_count));
                    }
                    Keycode::O => {
                        env.connected = !env.connected;
                        engine.handle_event(FaceEvent::ConnectivityChanged(env.connected));
                    }
                    Keycode::V => {
                        env.visible = !env.visible;
                        engine.handle_event(FaceEvent::VisibilityChanged(env.visible));
                        if env.visible {
                            // Preferences may have changed while hidden.
                            engine.reload_config(FaceConfig::default());
                        }
                    }
                    Keycode::L => {
                        env.low_bit_ambient = !env.low_bit_ambient;
                        engine.handle_event(FaceEvent::PropertiesChanged {
                            low_bit_ambient: env.low_bit_ambient,
                            burn_in_protection: false,
                        });
                    }
                    _ => {}
                },
                _ => {}
            }
        }

        std::thread::sleep(POLL_INTERVAL);
    }

    engine.teardown();
    info!("simulator shut down");
}
