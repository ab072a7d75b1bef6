//! Application core — dispatcher, telemetry scheduler, service.
//!
//! ```text
//!   RadarPort ──▶ ┌──────────────────────────┐ ──▶ SerialLink
//!                 │        AppService         │
//!  SerialLink ──▶ │  Fusion · Dispatch · Sched│
//!   LightPort ──▶ └──────────────────────────┘
//! ```
//!
//! The service is hardware-agnostic; all I/O flows through the port
//! traits in [`ports`], making the whole loop testable with mocks.

pub mod dispatcher;
pub mod ports;
pub mod service;
pub mod telemetry;
