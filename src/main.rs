//! PetFeeder Firmware: Main Entry Point
//!
//! Hexagonal architecture driven by a single non-blocking poll loop.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  HardwareAdapter            CloudTelemetry    LogEventSink     │
//! │  (Environment+Touch+Act.)   (Telemetry)       (EventSink)      │
//! │  WifiAdapter                Esp32TimeAdapter                   │
//! │  (Connectivity)             (clock)                            │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              ControlLoop (pure logic)                  │    │
//! │  │  Sweep · Segments · Gesture · Humidity alert           │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use std::sync::Mutex;

use anyhow::{Context, Result};
use embedded_hal_bus::i2c::MutexDevice;
use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_hal::delay::{Delay, FreeRtos};
use esp_idf_hal::gpio::PinDriver;
use esp_idf_hal::i2c::{I2cConfig, I2cDriver};
use esp_idf_hal::ledc::{config::TimerConfig, LedcDriver, LedcTimerDriver, Resolution};
use esp_idf_hal::modem::Modem;
use esp_idf_hal::peripherals::Peripherals;
use esp_idf_hal::units::Hertz;
use esp_idf_svc::nvs::EspDefaultNvsPartition;
use esp_idf_svc::wifi::{BlockingWifi, EspWifi};
use log::{error, info, warn};

use petfeeder::adapters::cloud::CloudTelemetry;
use petfeeder::adapters::device_id::DeviceIdentity;
use petfeeder::adapters::hardware::HardwareAdapter;
use petfeeder::adapters::log_sink::LogEventSink;
use petfeeder::adapters::time::Esp32TimeAdapter;
use petfeeder::adapters::wifi::{ConnectivityPort, WifiAdapter};
use petfeeder::app::service::ControlLoop;
use petfeeder::app::startup;
use petfeeder::config::FeederConfig;
use petfeeder::drivers::indicator::Indicator;
use petfeeder::drivers::servo::Servo;
use petfeeder::drivers::{hw_init, watchdog::Watchdog};
use petfeeder::pins;
use petfeeder::sensors::{aht20::Aht20, cap1188::Cap1188};
use petfeeder::timer::IntervalTimer;

/// Wait between environment-sensor probes while it is missing.
const SENSOR_REPROBE_SECS: u32 = 5;
/// Period of the one-line status report.
const STATUS_INTERVAL_MS: u32 = 60_000;

// ── Build-time configuration ──────────────────────────────────

fn fill<const N: usize>(dst: &mut heapless::String<N>, value: Option<&str>, name: &str) {
    let Some(value) = value else { return };
    dst.clear();
    if dst.push_str(value).is_err() {
        warn!("{} longer than {} bytes, ignored", name, N);
        dst.clear();
    }
}

/// Full-variant defaults plus the credentials compiled in from `FEEDER_*`.
fn build_config() -> FeederConfig {
    let mut config = FeederConfig::default();
    fill(&mut config.network.ssid, option_env!("FEEDER_WIFI_SSID"), "FEEDER_WIFI_SSID");
    fill(
        &mut config.network.password,
        option_env!("FEEDER_WIFI_PASSWORD"),
        "FEEDER_WIFI_PASSWORD",
    );
    fill(&mut config.telemetry.host, option_env!("FEEDER_CLOUD_HOST"), "FEEDER_CLOUD_HOST");
    fill(&mut config.telemetry.sas_token, option_env!("FEEDER_SAS_TOKEN"), "FEEDER_SAS_TOKEN");

    if config.telemetry.enabled && config.telemetry.host.is_empty() {
        warn!("No collector host compiled in, telemetry disabled");
        config.telemetry.enabled = false;
    }
    config
}

// ── Network ───────────────────────────────────────────────────

/// Start the station and connect once.  A failed connection is not an
/// error: the adapter is returned with the link down.
fn bring_up_network(
    modem: Modem,
    sys_loop: EspSystemEventLoop,
    nvs: EspDefaultNvsPartition,
    config: &FeederConfig,
    hostname: &str,
) -> Result<WifiAdapter> {
    let mut esp_wifi = EspWifi::new(modem, sys_loop.clone(), Some(nvs))?;
    if let Err(e) = esp_wifi.sta_netif_mut().set_hostname(hostname) {
        warn!("WiFi: hostname not set: {}", e);
    }
    let mut wifi = WifiAdapter::new(BlockingWifi::wrap(esp_wifi, sys_loop)?);

    let connected = wifi
        .set_credentials(&config.network.ssid, &config.network.password)
        .and_then(|()| wifi.connect_within(config.network.connect_window_secs));
    if let Err(e) = connected {
        warn!("WiFi unavailable ({}), telemetry records will be dropped", e);
    }
    Ok(wifi)
}

// ── Main ──────────────────────────────────────────────────────

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  PetFeeder v{}                       ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    let config = build_config();
    config.validate()?;

    let peripherals = Peripherals::take().context("Peripherals::take")?;
    let sys_loop = EspSystemEventLoop::take().context("event loop")?;
    let nvs = EspDefaultNvsPartition::take().context("nvs partition")?;

    // ── 2. Peripherals ────────────────────────────────────────
    hw_init::init_peripherals()?;
    let mut watchdog = Watchdog::default();
    let clock = Esp32TimeAdapter::new();

    let i2c = I2cDriver::new(
        peripherals.i2c0,
        peripherals.pins.gpio41,
        peripherals.pins.gpio40,
        &I2cConfig::new().baudrate(Hertz(pins::I2C_BAUDRATE_HZ)),
    )
    .context("I2cDriver::new")?;
    let bus = Mutex::new(i2c);

    let servo_timer = LedcTimerDriver::new(
        peripherals.ledc.timer0,
        &TimerConfig {
            frequency: Hertz(pins::SERVO_PWM_FREQ_HZ),
            resolution: Resolution::Bits14,
            ..Default::default()
        },
    )?;
    let servo_channel =
        LedcDriver::new(peripherals.ledc.channel0, &servo_timer, peripherals.pins.gpio19)?;
    let led = PinDriver::output(peripherals.pins.gpio5).context("PinDriver::output(LED)")?;

    let mut hw = HardwareAdapter::new(
        Aht20::new(MutexDevice::new(&bus), Delay::new_default()),
        Cap1188::new(MutexDevice::new(&bus)),
        Servo::new(servo_channel),
        Indicator::new(led),
        clock,
    );

    // ── 3. Sensor bring-up ────────────────────────────────────
    let report = loop {
        match startup::bring_up(&mut hw, config.gesture_enabled) {
            Ok(report) => break report,
            Err(e) => {
                error!("Startup halted: {} (retrying in {} s)", e, SENSOR_REPROBE_SECS);
                for _ in 0..SENSOR_REPROBE_SECS {
                    watchdog.feed();
                    FreeRtos::delay_ms(1_000);
                }
            }
        }
    };

    startup::home(&mut hw, &mut Delay::new_default());

    // ── 4. Identity + network ─────────────────────────────────
    let ident = DeviceIdentity::from_factory_mac(&config.telemetry.device_id);
    info!("Device ID: {} (hostname: {})", ident.id, ident.hostname);

    let wifi = if config.telemetry.enabled {
        Some(bring_up_network(peripherals.modem, sys_loop, nvs, &config, &ident.hostname)?)
    } else {
        None
    };
    let link_up = wifi.as_ref().is_some_and(ConnectivityPort::is_connected);
    let mut cloud = CloudTelemetry::new(&config.telemetry, &ident.id, link_up, clock);

    // ── 5. Control loop ───────────────────────────────────────
    let poll_interval_ms = config.poll_interval_ms;
    let mut control = ControlLoop::new(config, &ident.id, clock.uptime_ms())?;
    let mut sink = LogEventSink::new();
    control.start(report, &mut sink);

    let mut status = IntervalTimer::new(STATUS_INTERVAL_MS, clock.uptime_ms());
    info!("System ready. Entering poll loop.");

    loop {
        let now_ms = clock.uptime_ms();
        control.poll(now_ms, &mut hw, &mut cloud, &mut sink);
        hw.service();

        if status.fire_if_due(now_ms) {
            if let Some(wifi) = wifi.as_ref() {
                cloud.set_link_up(wifi.is_connected());
            }
            let stats = cloud.stats();
            info!(
                "STATUS | ticks={} dispenses={} segment={} cloud sent={} failed={} dropped={}",
                control.tick_count(),
                control.dispense_count(),
                control.segment_index(),
                stats.sent,
                stats.failed,
                stats.dropped
            );
        }

        watchdog.feed();
        FreeRtos::delay_ms(poll_interval_ms);
    }
}
