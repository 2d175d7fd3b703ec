//! # Galvani - Single-Dock EV Charging Session Simulator
//!
//! A Rust implementation of a single electric-vehicle charging dock: it
//! accepts one vehicle connection at a time, negotiates a charging session
//! with a backend authority, runs a time-stepped power-delivery simulation
//! against a tapering charge curve, and reports progress to both the
//! backend and a realtime pub/sub channel until the session completes or
//! is interrupted.
//!
//! ## Features
//!
//! - **Async-first**: event-driven coordinator on the Tokio runtime
//! - **Exclusive dock slot**: a second vehicle is rejected, never queued
//! - **Tapering charge curve**: piecewise-linear power taper above 80% SOC
//! - **Backend reconciliation**: handshake, keep-alive, telemetry log and
//!   session completion with a legacy-endpoint fallback
//! - **Realtime telemetry**: heartbeat, SOC updates and completion events
//!   on a pub/sub channel
//! - **Configuration**: YAML-based configuration with validation
//!
//! ## Architecture
//!
//! The application follows a modular architecture with clear separation of concerns:
//!
//! - `config`: Configuration management and validation
//! - `logging`: Structured logging and tracing
//! - `error`: Error types and constructors
//! - `backend`: Backend API client (handshake, ping, log, sessions)
//! - `channel`: Realtime pub/sub hub and typed inbound events
//! - `vehicle`: Vehicle connection link and message types
//! - `gateway`: TCP JSON-lines listener for vehicle connections
//! - `engine`: Charging simulation and power estimation
//! - `session`: Per-visit session state
//! - `scheduler`: Cancellable periodic tasks
//! - `coordinator`: Session lifecycle state machine
//! - `telemetry`: Telemetry sampling and payload construction

pub mod backend;
pub mod channel;
pub mod config;
pub mod coordinator;
pub mod engine;
pub mod error;
pub mod gateway;
pub mod logging;
pub mod scheduler;
pub mod session;
pub mod telemetry;
pub mod vehicle;


// Re-export commonly used types
pub use config::Config;
pub use coordinator::DockCoordinator;
pub use error::{GalvaniError, Result};
