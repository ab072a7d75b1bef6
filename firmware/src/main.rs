//! WaveSense Firmware — Main Entry Point
//!
//! Single-threaded cooperative loop over three ports:
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                    Adapters (outer ring)                   │
//! │                                                            │
//! │  UsbSerialLink     UartRadar        AdcLightSensor         │
//! │  (SerialLink)      (RadarPort)      (LightPort)            │
//! │                                                            │
//! │  ─────────────── Port Trait Boundary ──────────────────    │
//! │                                                            │
//! │  ┌──────────────────────────────────────────────────────┐  │
//! │  │            AppService (pure logic)                   │  │
//! │  │  Framing · Dispatch · Fusion · Telemetry             │  │
//! │  └──────────────────────────────────────────────────────┘  │
//! └────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every iteration pumps inbound bytes first, so host commands are
//! never starved by a quiet radar. The radar poll bounds the wait; a
//! miss skips straight back to the pump.
#![deny(unused_must_use)]

use anyhow::Result;
use log::info;

use wavesense::adapters::time::MonotonicClock;
use wavesense::app::ports::RadarPort;
use wavesense::app::service::AppService;
use wavesense::config::Tuning;

/// Bounded wait for one radar frame per iteration.
const RADAR_POLL_MS: u32 = 100;

fn main() -> Result<()> {
    // ── 1. Platform bootstrap ─────────────────────────────────
    #[cfg(target_os = "espidf")]
    {
        esp_idf_svc::sys::link_patches();
        esp_idf_svc::log::EspLogger::initialize_default();
    }

    info!("╔══════════════════════════════════════╗");
    info!("║  WaveSense v{}                     ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    let clock = MonotonicClock::new();

    // ── 2. Construct adapters ─────────────────────────────────
    #[cfg(target_os = "espidf")]
    let (mut link, mut radar, mut light) = espidf_adapters()?;

    #[cfg(not(target_os = "espidf"))]
    let (mut link, mut radar, mut light) = host_adapters();

    // ── 3. Application service ────────────────────────────────
    let mut app = AppService::new(Tuning::default());
    app.hello(&mut link);

    info!("System ready. Entering sense loop.");

    // ── 4. Sense loop ─────────────────────────────────────────
    loop {
        // Inbound first: command handling never waits on the sensor.
        app.pump_serial(&mut link, clock.now_ms());

        if let Some(frame) = radar.poll_frame(RADAR_POLL_MS) {
            app.on_radar_frame(&frame, &mut link, clock.now_ms());
        }

        app.poll_light(&mut light, &mut link, clock.now_ms());

        // The sim radar returns instantly; pace the desktop build to
        // the radar's real cadence.
        #[cfg(not(target_os = "espidf"))]
        std::thread::sleep(std::time::Duration::from_millis(RADAR_POLL_MS as u64));
    }
}

// ── Adapter construction ──────────────────────────────────────

#[cfg(target_os = "espidf")]
fn espidf_adapters() -> Result<(
    wavesense::adapters::serial::UsbSerialLink,
    wavesense::adapters::radar::UartRadar,
    wavesense::adapters::light::AdcLightSensor,
)> {
    use esp_idf_svc::hal::adc::oneshot::{config::AdcChannelConfig, AdcChannelDriver, AdcDriver};
    use esp_idf_svc::hal::peripherals::Peripherals;
    use esp_idf_svc::hal::uart::{config::Config as UartConfig, UartDriver};
    use esp_idf_svc::hal::units::Hertz;
    use esp_idf_svc::hal::usb_serial::{UsbSerialConfig, UsbSerialDriver};
    use std::rc::Rc;

    let peripherals = Peripherals::take()?;

    let usb = UsbSerialDriver::new(
        peripherals.usb_serial,
        peripherals.pins.gpio19,
        peripherals.pins.gpio20,
        &UsbSerialConfig::new(),
    )?;

    let uart = UartDriver::new(
        peripherals.uart1,
        peripherals.pins.gpio17,
        peripherals.pins.gpio18,
        Option::<esp_idf_svc::hal::gpio::AnyIOPin>::None,
        Option::<esp_idf_svc::hal::gpio::AnyIOPin>::None,
        &UartConfig::default().baudrate(Hertz(256_000)),
    )?;

    let adc = Rc::new(AdcDriver::new(peripherals.adc1)?);
    let light_channel =
        AdcChannelDriver::new(adc, peripherals.pins.gpio3, &AdcChannelConfig::default())?;

    Ok((
        wavesense::adapters::serial::UsbSerialLink::new(usb),
        wavesense::adapters::radar::UartRadar::new(uart),
        wavesense::adapters::light::AdcLightSensor::new(light_channel),
    ))
}

#[cfg(not(target_os = "espidf"))]
fn host_adapters() -> (
    wavesense::adapters::serial::LoopbackLink,
    wavesense::adapters::radar::SimRadar,
    wavesense::adapters::light::SimLightSensor,
) {
    (
        wavesense::adapters::serial::LoopbackLink::new(),
        wavesense::adapters::radar::SimRadar::new(),
        wavesense::adapters::light::SimLightSensor::default(),
    )
}
