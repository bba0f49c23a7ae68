#![no_std]
#![no_main]

mod peripherals;
mod system;

// Panic handler and debugging
use defmt::unwrap;

use defmt_rtt as _;
use panic_probe as _;

// Core
use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

// Device
use embassy_executor::Spawner;
use embassy_futures::select::{select, Either};
use embassy_nrf::{
    bind_interrupts,
    gpio::{Input, Level, Output, OutputDrive, Pull},
    peripherals::{SPI2, TWISPI1},
    saadc::{self, ChannelConfig, Resolution, Saadc},
    spim,
    twim::{self, Twim},
};
use embassy_sync::{blocking_mutex::raw::ThreadModeRawMutex, channel::Channel, signal::Signal};
use embassy_time::{Duration, Instant, Ticker, Timer};
use nrf_softdevice::{
    ble::{gatt_server, peripheral, Connection},
    Softdevice,
};
use static_cell::StaticCell;

bind_interrupts!(struct Irqs {
    SAADC => saadc::InterruptHandler;
    SPIM1_SPIS1_TWIM1_TWIS1_SPI1_TWI1 => twim::InterruptHandler<TWISPI1>;
    SPIM2_SPIS2_SPI2 => spim::InterruptHandler<SPI2>;
});

// Crate
use peripherals::{
    accelerometer::Accelerometer,
    backlight::{Backlight, MAX_BRIGHTNESS},
    battery::Battery,
    display::Display,
    vibration::{VibrationMotor, PULSE_MS},
};
use pinetime_watchface::{
    clock,
    message::{DictionaryError, InboxMessage, MessageError},
    pedometer::StepCounter,
    BatteryChargeState, Event, HealthEventType, Platform, Watchface, WatchfaceConfig,
};
use system::{
    bluetooth::{
        self, BatteryServiceEvent, CurrentTimeServiceEvent, Payload, Server, ServerEvent,
        WeatherServiceEvent, ADV_DATA, SCAN_DATA,
    },
    time::TimeManager,
};

// Others
use chrono::{NaiveDateTime, Timelike};

// Include current UTC epoch at compile time
include!(concat!(env!("OUT_DIR"), "/utc.rs"));

// Communication channels
static EVENTS: Channel<ThreadModeRawMutex, Event, 8> = Channel::new();
static NOTIFY: Signal<ThreadModeRawMutex, u8> = Signal::new();
static OUTBOX: Signal<ThreadModeRawMutex, Payload> = Signal::new();
static TIME_SYNC: Signal<ThreadModeRawMutex, NaiveDateTime> = Signal::new();
static STEP_RESET: Signal<ThreadModeRawMutex, ()> = Signal::new();

// Shared status
static CONNECTED: AtomicBool = AtomicBool::new(false);
static STEPS: AtomicU32 = AtomicU32::new(0);

static SERVER: StaticCell<Server> = StaticCell::new();

/// Services the watchface calls back into
struct FirmwarePlatform;

impl Platform for FirmwarePlatform {
    fn steps_today(&mut self) -> u32 {
        STEPS.load(Ordering::Relaxed)
    }

    fn vibes_double_pulse(&mut self) {
        NOTIFY.signal(2);
    }

    fn outbox_send(&mut self, message: &[u8]) -> Result<(), MessageError> {
        if !CONNECTED.load(Ordering::Relaxed) {
            return Err(MessageError::NotConnected);
        }
        if OUTBOX.signaled() {
            return Err(MessageError::Busy);
        }

        let payload = Payload::from_slice(message)
            .map_err(|_| MessageError::Malformed(DictionaryError::BufferFull))?;
        OUTBOX.signal(payload);
        Ok(())
    }
}

#[embassy_executor::task]
async fn softdevice_task(sd: &'static Softdevice) -> ! {
    sd.run().await
}

/// Run the watchface on every incoming event
#[embassy_executor::task(pool_size = 1)]
async fn watchface_task(
    mut display: Display<'static, SPI2>,
    _backlight: Backlight<'static>,
    config: WatchfaceConfig,
    now: NaiveDateTime,
    battery: BatteryChargeState,
) {
    let mut platform = FirmwarePlatform;
    let mut watchface = Watchface::launch(
        config,
        now,
        battery,
        CONNECTED.load(Ordering::Relaxed),
        &mut platform,
    );

    loop {
        if watchface.needs_redraw() {
            match display.draw(&mut watchface) {
                Ok(count) => defmt::debug!("Repainted {} surfaces", count),
                Err(err) => defmt::error!("Display update failed: {:?}", err),
            }
        }

        let event = EVENTS.receive().await;
        watchface.handle(event, &mut platform);
    }
}

/// Play vibration patterns requested by the watchface
#[embassy_executor::task(pool_size = 1)]
async fn notify(mut motor: VibrationMotor<'static>) {
    loop {
        // Vibrate signaled amount of times
        let count = NOTIFY.wait().await;
        motor.pulse_times(Some(PULSE_MS), count).await;
    }
}

/// Fetch the battery status from the hardware.
#[embassy_executor::task(pool_size = 1)]
async fn update_battery_status(
    mut battery: Battery<'static>,
    server: &'static Server,
    mut last: BatteryChargeState,
) {
    let mut tick = Ticker::every(Duration::from_secs(10));
    loop {
        // Re-schedule the timer interrupt in 10s
        tick.next().await;

        let status = battery.read().await;
        if status == last {
            continue;
        }
        defmt::info!(
            "Battery status: {}% ({})",
            status.charge_percent,
            if status.is_charging {
                "charging"
            } else {
                "discharging"
            }
        );
        if let Err(err) = server.bas.battery_level_set(&status.charge_percent) {
            defmt::warn!("Battery level not published: {:?}", err);
        }

        last = status;
        EVENTS.send(Event::BatteryChanged(status)).await;
    }
}

/// Tick on every minute boundary, or right away after a time sync
#[embassy_executor::task(pool_size = 1)]
async fn update_time(mut time: TimeManager) {
    let mut last_minute = None;
    loop {
        match select(Timer::after(time.until_next_minute()), TIME_SYNC.wait()).await {
            Either::First(()) => {}
            Either::Second(local) => {
                time.set_local_time(local);
                defmt::info!("Time synchronized");
            }
        }

        let Some(now) = time.local_time() else {
            defmt::error!("Clock out of range");
            continue;
        };
        let minute = (now.date(), now.hour(), now.minute());
        let new_minute = last_minute.replace(minute) != Some(minute);
        if new_minute && now.hour() == 0 && now.minute() == 0 {
            STEP_RESET.signal(());
        }
        EVENTS.send(Event::Tick(now)).await;
    }
}

/// Sample the accelerometer at 50 Hz and count steps
#[embassy_executor::task(pool_size = 1)]
async fn count_steps(mut accel: Accelerometer<'static, TWISPI1>) {
    let mut counter = StepCounter::default();
    let mut tick = Ticker::every(Duration::from_millis(20));
    loop {
        tick.next().await;

        if STEP_RESET.try_take().is_some() {
            counter.reset();
            STEPS.store(0, Ordering::Relaxed);
            let _ = EVENTS.try_send(Event::Health(HealthEventType::SignificantUpdate));
            let _ = EVENTS.try_send(Event::Health(HealthEventType::MovementUpdate));
        }

        let sample = match accel.read_sample().await {
            Ok(sample) => sample,
            Err(err) => {
                defmt::warn!("Accelerometer read failed: {:?}", err);
                continue;
            }
        };
        if counter.update(Instant::now().as_millis(), &sample) {
            STEPS.store(counter.steps(), Ordering::Relaxed);
            // A later step retries when the queue is full
            let _ = EVENTS.try_send(Event::Health(HealthEventType::MovementUpdate));
        }
    }
}

/// Advertise, then serve one companion connection at a time
#[embassy_executor::task(pool_size = 1)]
async fn ble_task(sd: &'static Softdevice, server: &'static Server) {
    let config = peripheral::Config::default();
    loop {
        let adv = peripheral::ConnectableAdvertisement::ScannableUndirected {
            adv_data: &ADV_DATA,
            scan_data: &SCAN_DATA,
        };
        let conn = match peripheral::advertise_connectable(sd, adv, &config).await {
            Ok(conn) => conn,
            Err(err) => {
                defmt::error!("Advertising failed: {:?}", err);
                Timer::after_secs(1).await;
                continue;
            }
        };

        defmt::info!("Companion connected");
        OUTBOX.reset();
        CONNECTED.store(true, Ordering::Relaxed);
        EVENTS.send(Event::ConnectionChanged(true)).await;

        let gatt = gatt_server::run(&conn, server, on_gatt_event);
        select(gatt, forward_outbox(&conn, server)).await;

        defmt::info!("Companion disconnected");
        CONNECTED.store(false, Ordering::Relaxed);
        EVENTS.send(Event::ConnectionChanged(false)).await;
    }
}

/// Notify queued outbox messages and report the delivery result
async fn forward_outbox(conn: &Connection, server: &Server) -> ! {
    loop {
        let payload = OUTBOX.wait().await;
        let event = match server.weather.outbox_notify(conn, &payload) {
            Ok(()) => Event::OutboxSent,
            Err(err) => {
                defmt::warn!("Outbox notify failed: {:?}", err);
                Event::OutboxFailed(MessageError::SendFailed)
            }
        };
        EVENTS.send(event).await;
    }
}

fn on_gatt_event(event: ServerEvent) {
    match event {
        ServerEvent::Bas(BatteryServiceEvent::BatteryLevelCccdWrite { notifications }) => {
            defmt::debug!("Battery notifications: {}", notifications);
        }
        ServerEvent::Cts(CurrentTimeServiceEvent::CurrentTimeWrite(record)) => {
            match clock::from_cts_bytes(&record) {
                Ok(local) => TIME_SYNC.signal(local),
                Err(err) => defmt::warn!("Rejected time record: {:?}", err),
            }
        }
        ServerEvent::Weather(WeatherServiceEvent::InboxWrite(payload)) => {
            let event = match InboxMessage::decode(&payload) {
                Ok(message) => Event::InboxReceived(message),
                Err(err) => Event::InboxDropped(err.into()),
            };
            if EVENTS.try_send(event).is_err() {
                defmt::warn!("Event queue full, inbox message lost");
            }
        }
        ServerEvent::Weather(WeatherServiceEvent::OutboxCccdWrite { notifications }) => {
            defmt::debug!("Outbox notifications: {}", notifications);
        }
    }
}

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    let mut p = embassy_nrf::init(system::config::embassy_config());
    system::config::set_peripheral_priorities();
    defmt::info!("Initializing");

    let config = WatchfaceConfig::default();

    // Initialize SAADC
    let mut saadc_config = saadc::Config::default();
    // Set resolution to 12bit, necessary for correct battery status calculation
    saadc_config.resolution = Resolution::_12BIT;
    // Pin P0.31: Voltage level
    let channel_config = ChannelConfig::single_ended(&mut p.P0_31);
    let saadc = Saadc::new(p.SAADC, Irqs, saadc_config, [channel_config]);
    saadc.calibrate().await;

    // Initialize Battery
    let mut battery = Battery::init(
        saadc,
        Input::new(p.P0_12, Pull::None),
        Input::new(p.P0_19, Pull::None),
    );
    let battery_status = battery.read().await;

    // Initialize Backlight
    let backlight = unwrap!(Backlight::init(
        Output::new(p.P0_14, Level::High, OutputDrive::Standard),
        Output::new(p.P0_22, Level::High, OutputDrive::Standard),
        Output::new(p.P0_23, Level::High, OutputDrive::Standard),
        MAX_BRIGHTNESS / 2,
    ));

    // Initialize vibration motor
    let vibration = VibrationMotor::init(Output::new(p.P0_16, Level::High, OutputDrive::Standard));

    // Initialize I2C
    let mut i2c_config = twim::Config::default();
    // Use I2C at 400KHz (the fastest clock available on the nRF52832),
    i2c_config.frequency = twim::Frequency::K400;

    let i2c = Twim::new(p.TWISPI1, Irqs, p.P0_06, p.P0_07, i2c_config);

    // Initialize SPI
    let mut spim_config = spim::Config::default();
    // Use SPI at 8MHz (the fastest clock available on the nRF52832),
    // otherwise refreshing will be super slow.
    spim_config.frequency = spim::Frequency::M8;
    // SPI must be used in mode 3. Mode 0 (the default) won't work.
    spim_config.mode = spim::MODE_3;

    let spim = spim::Spim::new(p.SPI2, Irqs, p.P0_02, p.P0_04, p.P0_03, spim_config);

    // Initialize LCD
    let display = unwrap!(Display::init(
        spim,
        Output::new(p.P0_25, Level::Low, OutputDrive::Standard),
        Output::new(p.P0_18, Level::Low, OutputDrive::Standard),
        Output::new(p.P0_26, Level::Low, OutputDrive::Standard),
    ));

    // Initialize Bluetooth
    let sd = Softdevice::enable(&bluetooth::softdevice_config());
    let server: &'static Server = SERVER.init(unwrap!(Server::new(sd)));
    unwrap!(server.bas.battery_level_set(&battery_status.charge_percent));

    // Initialize clock from the build time
    let time = TimeManager::init(UTC_EPOCH, config.utc_offset_secs());
    let now = unwrap!(time.local_time());

    defmt::info!("Initialization finished");

    // Schedule tasks
    unwrap!(spawner.spawn(softdevice_task(sd)));
    unwrap!(spawner.spawn(watchface_task(
        display,
        backlight,
        config,
        now,
        battery_status
    )));
    unwrap!(spawner.spawn(notify(vibration)));
    unwrap!(spawner.spawn(update_battery_status(battery, server, battery_status)));
    unwrap!(spawner.spawn(update_time(time)));
    unwrap!(spawner.spawn(ble_task(sd, server)));

    match Accelerometer::init(i2c).await {
        Ok(accel) => unwrap!(spawner.spawn(count_steps(accel))),
        Err(err) => defmt::error!("Step counting disabled: {:?}", err),
    }
}
