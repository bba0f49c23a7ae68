//! The watchface application
//!
//! [`Watchface`] owns the display state and the window. Platform callbacks
//! arrive as [`Event`]s and are handled one at a time; each handler updates
//! the state and marks the affected surfaces dirty. Drawing happens in
//! [`Watchface::render`].

use chrono::{NaiveDate, NaiveDateTime, Timelike};
use embedded_graphics::draw_target::DrawTarget;

use crate::{
    config::WatchfaceConfig,
    event::{BatteryChargeState, Event, HealthEventType},
    message::{self, InboxMessage, MessageError, MAX_MESSAGE_LEN},
    platform::Platform,
    state::{BatteryState, DisplayState},
    ui::{
        window::{SurfaceId, Window},
        ColorMode,
    },
};

/// Calendar minute a tick belongs to
type Minute = (NaiveDate, u32, u32);

fn minute_of(now: &NaiveDateTime) -> Minute {
    (now.date(), now.hour(), now.minute())
}

pub struct Watchface {
    config: WatchfaceConfig,
    state: DisplayState,
    window: Option<Window>,
    last_tick: Option<Minute>,
}

impl Watchface {
    pub fn new(config: WatchfaceConfig) -> Self {
        Self {
            config,
            state: DisplayState::new(config.step_goal()),
            window: None,
            last_tick: None,
        }
    }

    /// Create the window and bring every peripheral label up to date.
    ///
    /// Runs once at startup: shows the clock, then pulls the current step
    /// count, battery and connection state through the same handlers the
    /// platform events use. No weather is requested until the first tick
    /// on a refresh minute.
    pub fn launch<P: Platform>(
        config: WatchfaceConfig,
        now: NaiveDateTime,
        battery: BatteryChargeState,
        connected: bool,
        platform: &mut P,
    ) -> Self {
        let mut watchface = Self::new(config);
        watchface.load();
        watchface.update_time(&now);
        watchface.handle(Event::Health(HealthEventType::MovementUpdate), platform);
        watchface.handle(Event::BatteryChanged(battery), platform);
        watchface.handle(Event::ConnectionChanged(connected), platform);
        info!("Watchface launched");
        watchface
    }

    /// Build all surfaces. Calling it on a loaded watchface is a no-op.
    pub fn load(&mut self) {
        if self.window.is_some() {
            return;
        }

        let mut window = Window::load();
        window.set_hidden(SurfaceId::ChargingIcon, !self.state.battery.charging);
        window.set_hidden(SurfaceId::BluetoothIcon, self.state.connectivity.connected);
        self.window = Some(window);
        debug!("Window loaded");
    }

    /// Release the window and every surface it owns.
    pub fn unload(&mut self) {
        if self.window.take().is_some() {
            debug!("Window unloaded");
        }
    }

    pub fn state(&self) -> &DisplayState {
        &self.state
    }

    pub fn window(&self) -> Option<&Window> {
        self.window.as_ref()
    }

    /// Whether the next [`render`](Self::render) has anything to paint
    pub fn needs_redraw(&self) -> bool {
        self.window.as_ref().is_some_and(Window::is_dirty)
    }

    /// Paint every dirty surface. Returns the number of repainted surfaces.
    pub fn render<D>(&mut self, target: &mut D) -> Result<usize, D::Error>
    where
        D: DrawTarget<Color = ColorMode>,
    {
        match self.window.as_mut() {
            Some(window) => window.render(&self.state, target),
            None => Ok(0),
        }
    }

    pub fn handle<P: Platform>(&mut self, event: Event, platform: &mut P) {
        match event {
            Event::Tick(now) => self.on_tick(&now, platform),
            Event::BatteryChanged(charge) => self.on_battery(charge),
            Event::ConnectionChanged(connected) => self.on_connection(connected, platform),
            Event::Health(kind) => self.on_health(kind, platform),
            Event::InboxReceived(message) => self.on_inbox(&message),
            Event::InboxDropped(err) => error!("Message dropped: {:?}", err),
            Event::OutboxSent => info!("Outbox send success"),
            Event::OutboxFailed(err) => error!("Outbox send failed: {:?}", err),
        }
    }

    fn mark_dirty(&mut self, id: SurfaceId) {
        if let Some(window) = self.window.as_mut() {
            window.mark_dirty(id);
        }
    }

    fn set_hidden(&mut self, id: SurfaceId, hidden: bool) {
        if let Some(window) = self.window.as_mut() {
            window.set_hidden(id, hidden);
        }
    }

    fn update_time(&mut self, now: &NaiveDateTime) {
        self.state.clock.set(now);
        self.mark_dirty(SurfaceId::Clock);
        self.mark_dirty(SurfaceId::Date);
    }

    /// A second tick within the same minute (after a time sync) only
    /// refreshes the labels.
    fn on_tick<P: Platform>(&mut self, now: &NaiveDateTime, platform: &mut P) {
        self.update_time(now);

        let minute = minute_of(now);
        if self.last_tick.replace(minute) == Some(minute) {
            return;
        }
        if self.config.weather_due(now.minute()) {
            self.request_weather(platform);
        }
    }

    fn request_weather<P: Platform>(&mut self, platform: &mut P) {
        let mut buf = [0u8; MAX_MESSAGE_LEN];
        let result = message::encode_weather_request(&mut buf)
            .map_err(MessageError::from)
            .and_then(|request| platform.outbox_send(request));

        match result {
            Ok(()) => debug!("Weather requested"),
            Err(err) => error!("Weather request failed: {:?}", err),
        }
    }

    fn on_battery(&mut self, charge: BatteryChargeState) {
        self.state.battery = BatteryState::from(charge);
        self.mark_dirty(SurfaceId::BatteryGauge);
        self.set_hidden(SurfaceId::ChargingIcon, !self.state.battery.charging);
    }

    fn on_connection<P: Platform>(&mut self, connected: bool, platform: &mut P) {
        self.state.connectivity.connected = connected;
        self.set_hidden(SurfaceId::BluetoothIcon, connected);
        if !connected {
            platform.vibes_double_pulse();
        }
    }

    fn on_health<P: Platform>(&mut self, kind: HealthEventType, platform: &mut P) {
        if kind != HealthEventType::MovementUpdate {
            return;
        }

        self.state.activity.steps = platform.steps_today();
        self.mark_dirty(SurfaceId::Steps);
        self.mark_dirty(SurfaceId::StepLine);
    }

    fn on_inbox(&mut self, message: &InboxMessage) {
        if self.state.weather.apply(message) {
            self.mark_dirty(SurfaceId::Temperature);
            self.mark_dirty(SurfaceId::City);
        } else if message.weather().is_none() {
            warn!("Incomplete weather message ignored");
        }

        // The icon is looked up again after every message, complete or not
        if self.state.weather.resolve_icon() {
            self.mark_dirty(SurfaceId::WeatherIcon);
        } else if !self.state.weather.icon_code.is_empty() {
            warn!("Unknown weather icon: {}", self.state.weather.icon_code.as_str());
        }
        info!("Inbox message received");
    }
}

impl Drop for Watchface {
    fn drop(&mut self) {
        self.unload();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        message::{truncated, Dictionary, Value, KEY_REQUEST},
        ui::canvas::Canvas,
        weather::IconCode,
    };
    use chrono::NaiveDate;

    #[derive(Default)]
    struct MockPlatform {
        steps: u32,
        pulses: usize,
        sent: Vec<Vec<u8>>,
        fail_sends: bool,
    }

    impl Platform for MockPlatform {
        fn steps_today(&mut self) -> u32 {
            self.steps
        }

        fn vibes_double_pulse(&mut self) {
            self.pulses += 1;
        }

        fn outbox_send(&mut self, message: &[u8]) -> Result<(), MessageError> {
            if self.fail_sends {
                return Err(MessageError::NotConnected);
            }
            self.sent.push(message.to_vec());
            Ok(())
        }
    }

    fn at(hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 2)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    fn battery(percent: u8, is_charging: bool, is_plugged: bool) -> BatteryChargeState {
        BatteryChargeState {
            charge_percent: percent,
            is_charging,
            is_plugged,
        }
    }

    fn weather(city: &str, temp: Option<&str>, icon: &str) -> Event {
        Event::InboxReceived(InboxMessage {
            city: Some(truncated(city)),
            temperature: temp.map(truncated),
            icon: Some(truncated(icon)),
        })
    }

    fn launched(platform: &mut MockPlatform) -> Watchface {
        Watchface::launch(
            WatchfaceConfig::default(),
            at(9, 5),
            battery(50, false, false),
            true,
            platform,
        )
    }

    #[test]
    fn test_launch_refreshes_everything() {
        let mut platform = MockPlatform {
            steps: 4_200,
            ..Default::default()
        };
        let watchface = Watchface::launch(
            WatchfaceConfig::default(),
            at(0, 30),
            battery(73, false, true),
            true,
            &mut platform,
        );

        let state = watchface.state();
        assert_eq!(state.clock.time.as_str(), "12:30");
        assert_eq!(state.activity.steps, 4_200);
        assert_eq!(state.battery.percent, 73);
        assert!(state.battery.charging);
        assert!(state.connectivity.connected);

        let window = watchface.window().unwrap();
        assert!(!window.surface(SurfaceId::ChargingIcon).is_hidden());
        assert!(window.surface(SurfaceId::BluetoothIcon).is_hidden());
        assert!(watchface.needs_redraw());

        // No request at startup even on a refresh minute, no alert while connected
        assert!(platform.sent.is_empty());
        assert_eq!(platform.pulses, 0);
    }

    #[test]
    fn test_launch_while_disconnected_alerts_once() {
        let mut platform = MockPlatform::default();
        let watchface = Watchface::launch(
            WatchfaceConfig::default(),
            at(9, 5),
            battery(50, false, false),
            false,
            &mut platform,
        );
        assert_eq!(platform.pulses, 1);
        assert!(!watchface.window().unwrap().surface(SurfaceId::BluetoothIcon).is_hidden());
    }

    #[test]
    fn test_disconnect_pulses_and_shows_icon() {
        let mut platform = MockPlatform::default();
        let mut watchface = launched(&mut platform);

        watchface.handle(Event::ConnectionChanged(false), &mut platform);
        assert_eq!(platform.pulses, 1);
        assert!(!watchface.window().unwrap().surface(SurfaceId::BluetoothIcon).is_hidden());

        watchface.handle(Event::ConnectionChanged(true), &mut platform);
        assert_eq!(platform.pulses, 1);
        assert!(watchface.window().unwrap().surface(SurfaceId::BluetoothIcon).is_hidden());

        // Every disconnect event alerts, even a repeated one
        watchface.handle(Event::ConnectionChanged(false), &mut platform);
        watchface.handle(Event::ConnectionChanged(false), &mut platform);
        assert_eq!(platform.pulses, 3);
    }

    #[test]
    fn test_battery_event_toggles_charging_icon() {
        let mut platform = MockPlatform::default();
        let mut watchface = launched(&mut platform);
        let mut canvas = Canvas::new();
        watchface.render(&mut canvas).unwrap();

        watchface.handle(Event::BatteryChanged(battery(100, true, false)), &mut platform);
        let window = watchface.window().unwrap();
        assert!(!window.surface(SurfaceId::ChargingIcon).is_hidden());
        assert!(window.surface(SurfaceId::BatteryGauge).is_dirty());
        assert_eq!(watchface.state().battery.percent, 100);

        watchface.render(&mut canvas).unwrap();
        watchface.handle(Event::BatteryChanged(battery(99, false, false)), &mut platform);
        assert!(watchface.window().unwrap().surface(SurfaceId::ChargingIcon).is_hidden());
    }

    #[test]
    fn test_only_movement_updates_read_steps() {
        let mut platform = MockPlatform::default();
        let mut watchface = launched(&mut platform);
        let mut canvas = Canvas::new();
        watchface.render(&mut canvas).unwrap();

        platform.steps = 1_234;
        watchface.handle(Event::Health(HealthEventType::SleepUpdate), &mut platform);
        watchface.handle(Event::Health(HealthEventType::SignificantUpdate), &mut platform);
        assert_eq!(watchface.state().activity.steps, 0);
        assert!(!watchface.needs_redraw());

        watchface.handle(Event::Health(HealthEventType::MovementUpdate), &mut platform);
        assert_eq!(watchface.state().activity.steps, 1_234);
        let window = watchface.window().unwrap();
        assert!(window.surface(SurfaceId::Steps).is_dirty());
        assert!(window.surface(SurfaceId::StepLine).is_dirty());
    }

    #[test]
    fn test_tick_requests_weather_on_the_half_hour() {
        let mut platform = MockPlatform::default();
        let mut watchface = launched(&mut platform);

        watchface.handle(Event::Tick(at(9, 29)), &mut platform);
        assert!(platform.sent.is_empty());
        assert_eq!(watchface.state().clock.time.as_str(), " 9:29");

        watchface.handle(Event::Tick(at(9, 30)), &mut platform);
        assert_eq!(platform.sent.len(), 1);

        let request = Dictionary::parse(&platform.sent[0]).unwrap();
        assert_eq!(request.len(), 1);
        assert_eq!(request.find(KEY_REQUEST).unwrap().value, Value::Uint(0));
    }

    #[test]
    fn test_second_tick_in_a_minute_requests_nothing() {
        let mut platform = MockPlatform::default();
        let mut watchface = launched(&mut platform);
        let resync = at(10, 30) + chrono::Duration::seconds(45);

        watchface.handle(Event::Tick(at(10, 30)), &mut platform);
        watchface.handle(Event::Tick(resync), &mut platform);
        assert_eq!(platform.sent.len(), 1);
        assert_eq!(watchface.state().clock.time.as_str(), "10:30");

        // Same wall clock minute on another day is a new tick
        let tomorrow = at(10, 30) + chrono::Duration::days(1);
        watchface.handle(Event::Tick(tomorrow), &mut platform);
        assert_eq!(platform.sent.len(), 2);
    }

    #[test]
    fn test_send_failure_is_not_retried() {
        let mut platform = MockPlatform {
            fail_sends: true,
            ..Default::default()
        };
        let mut watchface = launched(&mut platform);

        watchface.handle(Event::Tick(at(10, 0)), &mut platform);
        watchface.handle(Event::OutboxFailed(MessageError::SendFailed), &mut platform);
        platform.fail_sends = false;
        watchface.handle(Event::Tick(at(10, 1)), &mut platform);

        assert!(platform.sent.is_empty());
        assert_eq!(watchface.state().clock.time.as_str(), "10:01");
    }

    #[test]
    fn test_complete_weather_message_updates_labels_and_icon() {
        let mut platform = MockPlatform::default();
        let mut watchface = launched(&mut platform);
        let mut canvas = Canvas::new();
        watchface.render(&mut canvas).unwrap();

        watchface.handle(weather("Austin", Some("98°"), "partly-cloudy-day"), &mut platform);
        let state = watchface.state();
        assert_eq!(state.weather.city.as_str(), "Austin");
        assert_eq!(state.weather.temperature.as_str(), "98°");
        assert_eq!(state.weather.icon, Some(IconCode::PartlyCloudyDay));

        assert_eq!(watchface.render(&mut canvas).unwrap(), 3);
        let icon = watchface.window().unwrap().surface(SurfaceId::WeatherIcon).bounds();
        assert!(canvas.count_lit(icon) > 0);
    }

    #[test]
    fn test_partial_weather_message_is_ignored() {
        let mut platform = MockPlatform::default();
        let mut watchface = launched(&mut platform);
        watchface.handle(weather("Austin", Some("98°"), "clear-day"), &mut platform);
        let before = watchface.state().weather.clone();

        watchface.handle(weather("Boston", None, "snow"), &mut platform);
        assert_eq!(watchface.state().weather, before);
    }

    #[test]
    fn test_repeated_weather_message_is_idempotent() {
        let mut platform = MockPlatform::default();
        let mut watchface = launched(&mut platform);

        watchface.handle(weather("Austin", Some("98°"), "fog"), &mut platform);
        let first = watchface.state().clone();
        watchface.handle(weather("Austin", Some("98°"), "fog"), &mut platform);
        assert_eq!(*watchface.state(), first);
    }

    #[test]
    fn test_unknown_icon_keeps_current_icon() {
        let mut platform = MockPlatform::default();
        let mut watchface = launched(&mut platform);

        watchface.handle(weather("Austin", Some("98°"), "rain"), &mut platform);
        watchface.handle(weather("Austin", Some("97°"), "tornado"), &mut platform);
        let state = watchface.state();
        assert_eq!(state.weather.temperature.as_str(), "97°");
        assert_eq!(state.weather.icon, Some(IconCode::Rain));
    }

    #[test]
    fn test_delivery_reports_change_nothing() {
        let mut platform = MockPlatform::default();
        let mut watchface = launched(&mut platform);
        let before = watchface.state().clone();

        watchface.handle(Event::OutboxSent, &mut platform);
        watchface.handle(Event::InboxDropped(MessageError::Busy), &mut platform);
        assert_eq!(*watchface.state(), before);
        assert_eq!(platform.pulses, 0);
    }

    #[test]
    fn test_events_without_window_update_state_only() {
        let mut platform = MockPlatform::default();
        let mut watchface = Watchface::new(WatchfaceConfig::default());
        let mut canvas = Canvas::new();

        watchface.handle(Event::Tick(at(9, 5)), &mut platform);
        watchface.handle(Event::BatteryChanged(battery(40, false, false)), &mut platform);
        assert_eq!(watchface.render(&mut canvas).unwrap(), 0);
        assert!(!canvas.any_written());

        // Loading picks up the state gathered so far
        watchface.load();
        assert!(watchface.window().unwrap().surface(SurfaceId::ChargingIcon).is_hidden());
        assert_eq!(watchface.render(&mut canvas).unwrap(), SurfaceId::ALL.len());

        watchface.unload();
        assert!(watchface.window().is_none());
        assert!(!watchface.needs_redraw());
    }
}
