//! Host serial link.
//!
//! On ESP-IDF the link is the USB Serial/JTAG peripheral: the driver's
//! interrupt fills an internal FIFO that [`read_byte`] drains without
//! blocking, and writes block until the frame is queued. On the host a
//! loopback shim backs tests and the desktop simulation.
//!
//! [`read_byte`]: crate::app::ports::SerialLink::read_byte

use crate::app::ports::SerialLink;
use crate::error::LinkError;

// ───────────────────────────────────────────────────────────────
// ESP-IDF implementation (USB Serial/JTAG)
// ───────────────────────────────────────────────────────────────

#[cfg(target_os = "espidf")]
pub struct UsbSerialLink {
    driver: esp_idf_svc::hal::usb_serial::UsbSerialDriver<'static>,
}

#[cfg(target_os = "espidf")]
impl UsbSerialLink {
    pub fn new(
        driver: esp_idf_svc::hal::usb_serial::UsbSerialDriver<'static>,
    ) -> Self {
        Self { driver }
    }
}

#[cfg(target_os = "espidf")]
impl SerialLink for UsbSerialLink {
    fn read_byte(&mut self) -> Option<u8> {
        let mut byte = [0u8; 1];
        match self.driver.read(&mut byte, 0) {
            Ok(1) => Some(byte[0]),
            _ => None,
        }
    }

    fn write_frame(&mut self, frame: &[u8]) -> Result<(), LinkError> {
        let mut written = 0;
        while written < frame.len() {
            match self
                .driver
                .write(&frame[written..], esp_idf_svc::hal::delay::BLOCK)
            {
                Ok(n) if n > 0 => written += n,
                _ => return Err(LinkError::WriteFailed),
            }
        }
        Ok(())
    }
}

// ───────────────────────────────────────────────────────────────
// Host simulation
// ───────────────────────────────────────────────────────────────

/// In-memory link: tests queue inbound bytes and inspect outbound
/// frames.
#[cfg(not(target_os = "espidf"))]
#[derive(Default)]
pub struct LoopbackLink {
    inbound: std::collections::VecDeque<u8>,
    outbound: Vec<Vec<u8>>,
}

#[cfg(not(target_os = "espidf"))]
impl LoopbackLink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue bytes as if the host had written them.
    pub fn push_inbound(&mut self, bytes: &[u8]) {
        self.inbound.extend(bytes);
    }

    /// Frames written by the firmware, oldest first.
    pub fn outbound(&self) -> &[Vec<u8>] {
        &self.outbound
    }

    pub fn take_outbound(&mut self) -> Vec<Vec<u8>> {
        std::mem::take(&mut self.outbound)
    }
}

#[cfg(not(target_os = "espidf"))]
impl SerialLink for LoopbackLink {
    fn read_byte(&mut self) -> Option<u8> {
        self.inbound.pop_front()
    }

    fn write_frame(&mut self, frame: &[u8]) -> Result<(), LinkError> {
        self.outbound.push(frame.to_vec());
        Ok(())
    }
}
