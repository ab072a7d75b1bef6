//! Ambient light sensor adapter.
//!
//! A photodiode on an ADC channel, converted to an approximate lux
//! figure. The reading feeds the `EVT_LIGHT` side channel only; the
//! presence engine never sees it.

use crate::app::ports::{LightPort, LightSample};

// ───────────────────────────────────────────────────────────────
// ESP-IDF implementation
// ───────────────────────────────────────────────────────────────

#[cfg(target_os = "espidf")]
pub struct AdcLightSensor {
    channel: esp_idf_svc::hal::adc::oneshot::AdcChannelDriver<
        'static,
        esp_idf_svc::hal::gpio::Gpio3,
        std::rc::Rc<esp_idf_svc::hal::adc::oneshot::AdcDriver<'static, esp_idf_svc::hal::adc::ADC1>>,
    >,
    /// Two-point calibration: counts at darkness and lux per count.
    dark_counts: u16,
    lux_per_count: f32,
}

#[cfg(target_os = "espidf")]
impl AdcLightSensor {
    pub fn new(
        channel: esp_idf_svc::hal::adc::oneshot::AdcChannelDriver<
            'static,
            esp_idf_svc::hal::gpio::Gpio3,
            std::rc::Rc<
                esp_idf_svc::hal::adc::oneshot::AdcDriver<'static, esp_idf_svc::hal::adc::ADC1>,
            >,
        >,
    ) -> Self {
        Self {
            channel,
            dark_counts: 40,
            lux_per_count: 0.6,
        }
    }
}

#[cfg(target_os = "espidf")]
impl LightPort for AdcLightSensor {
    fn read_lux(&mut self) -> LightSample {
        match self.channel.read() {
            Ok(counts) => LightSample {
                lux: counts.saturating_sub(self.dark_counts) as f32 * self.lux_per_count,
                valid: true,
            },
            Err(_) => LightSample {
                lux: 0.0,
                valid: false,
            },
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Host simulation
// ───────────────────────────────────────────────────────────────

/// Fixed-value light source for tests and the desktop build.
#[cfg(not(target_os = "espidf"))]
pub struct SimLightSensor {
    pub lux: f32,
    pub valid: bool,
}

#[cfg(not(target_os = "espidf"))]
impl Default for SimLightSensor {
    fn default() -> Self {
        Self {
            lux: 150.0,
            valid: true,
        }
    }
}

#[cfg(not(target_os = "espidf"))]
impl LightPort for SimLightSensor {
    fn read_lux(&mut self) -> LightSample {
        LightSample {
            lux: self.lux,
            valid: self.valid,
        }
    }
}
