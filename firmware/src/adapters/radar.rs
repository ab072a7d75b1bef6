//! mmWave radar module adapter.
//!
//! The radar DSP runs on the module itself and reports fused results
//! over UART as small tagged records: presence flag, clustered target
//! list, tracked distance, breath rate, heart rate. This adapter
//! assembles one [`RadarFrame`] per report burst; all signal processing
//! stays on the module.
//!
//! On the host, [`SimRadar`] replays scripted frames for tests and the
//! desktop build.

use crate::app::ports::RadarPort;
use crate::engine::RadarFrame;

// ───────────────────────────────────────────────────────────────
// ESP-IDF implementation (module UART)
// ───────────────────────────────────────────────────────────────

#[cfg(target_os = "espidf")]
mod esp {
    use super::*;
    use crate::engine::Target;
    use esp_idf_svc::hal::uart::UartDriver;
    use log::debug;

    /// Record tags in the module's report burst. A burst is
    /// `[0xAA, tag, len, payload...]*` terminated by the frame-end tag.
    const TAG_SYNC: u8 = 0xAA;
    const TAG_PRESENCE: u8 = 0x01;
    const TAG_TARGET: u8 = 0x02;
    const TAG_DISTANCE: u8 = 0x03;
    const TAG_BREATH: u8 = 0x04;
    const TAG_HEART: u8 = 0x05;
    const TAG_FRAME_END: u8 = 0x0F;

    pub struct UartRadar {
        uart: UartDriver<'static>,
        frame: RadarFrame,
    }

    impl UartRadar {
        pub fn new(uart: UartDriver<'static>) -> Self {
            Self {
                uart,
                frame: RadarFrame::default(),
            }
        }

        fn read_exact(&mut self, buf: &mut [u8], timeout_ms: u32) -> bool {
            let ticks = timeout_ms / portTICK_PERIOD_MS();
            let mut got = 0;
            while got < buf.len() {
                match self.uart.read(&mut buf[got..], ticks) {
                    Ok(n) if n > 0 => got += n,
                    _ => return false,
                }
            }
            true
        }

        fn apply_record(&mut self, tag: u8, payload: &[u8]) -> bool {
            match (tag, payload.len()) {
                (TAG_PRESENCE, 1) => self.frame.human = payload[0] != 0,
                (TAG_TARGET, 6) => {
                    let cluster_id = i16::from_le_bytes([payload[0], payload[1]]);
                    let x_mm = i16::from_le_bytes([payload[2], payload[3]]);
                    let y_mm = i16::from_le_bytes([payload[4], payload[5]]);
                    let _ = self.frame.targets.push(Target {
                        cluster_id,
                        x_m: x_mm as f32 / 1000.0,
                        y_m: y_mm as f32 / 1000.0,
                        doppler_index: 0,
                    });
                }
                (TAG_DISTANCE, 2) => {
                    let mm = u16::from_le_bytes([payload[0], payload[1]]);
                    self.frame.distance_cm = Some(mm as f32 / 10.0);
                }
                (TAG_BREATH, 2) => {
                    let centi = u16::from_le_bytes([payload[0], payload[1]]);
                    self.frame.breath_bpm = Some(centi as f32 / 100.0);
                }
                (TAG_HEART, 2) => {
                    let centi = u16::from_le_bytes([payload[0], payload[1]]);
                    self.frame.heart_bpm = Some(centi as f32 / 100.0);
                }
                (TAG_FRAME_END, 0) => return true,
                _ => debug!("radar: unknown record tag 0x{tag:02X}"),
            }
            false
        }
    }

    impl RadarPort for UartRadar {
        fn poll_frame(&mut self, timeout_ms: u32) -> Option<RadarFrame> {
            self.frame = RadarFrame::default();

            loop {
                let mut head = [0u8; 3];
                if !self.read_exact(&mut head, timeout_ms) {
                    return None;
                }
                if head[0] != TAG_SYNC {
                    continue;
                }
                let (tag, len) = (head[1], head[2] as usize);
                let mut payload = [0u8; 32];
                if len > payload.len() || !self.read_exact(&mut payload[..len], timeout_ms) {
                    return None;
                }
                if self.apply_record(tag, &payload[..len]) {
                    return Some(self.frame.clone());
                }
            }
        }
    }

    #[allow(non_snake_case)]
    fn portTICK_PERIOD_MS() -> u32 {
        1000 / esp_idf_svc::sys::configTICK_RATE_HZ
    }
}

#[cfg(target_os = "espidf")]
pub use esp::UartRadar;

// ───────────────────────────────────────────────────────────────
// Host simulation
// ───────────────────────────────────────────────────────────────

/// Scripted radar for tests: frames are popped in push order, one per
/// poll; an empty script times out.
#[cfg(not(target_os = "espidf"))]
#[derive(Default)]
pub struct SimRadar {
    script: std::collections::VecDeque<RadarFrame>,
}

#[cfg(not(target_os = "espidf"))]
impl SimRadar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_frame(&mut self, frame: RadarFrame) {
        self.script.push_back(frame);
    }
}

#[cfg(not(target_os = "espidf"))]
impl RadarPort for SimRadar {
    fn poll_frame(&mut self, _timeout_ms: u32) -> Option<RadarFrame> {
        self.script.pop_front()
    }
}
