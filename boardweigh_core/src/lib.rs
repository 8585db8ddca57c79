#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Core weight stabilization logic (transport-agnostic).
//!
//! This crate turns the noisy four-corner sample stream of a balance board
//! into one stable weight estimate with an uncertainty figure. All
//! transport interactions go through the `boardweigh_traits::BoardSource`
//! trait.
//!
//! ## Architecture
//!
//! - **Window**: bounded circular buffer of normalized samples (`window`)
//! - **Calibration**: per-corner zero-load baseline (`calibration`)
//! - **Stabilizer**: the sample-by-sample convergence loop (`stabilizer`)
//! - **Sampler**: background frame thread with stall tracking (`sampler`)
//! - **Runner**: session orchestration, calibrate-then-weigh (`runner`)
//!
//! ## Units
//!
//! The board reports each corner in units of 0.01 kg; normalized samples
//! and estimates stay in those integer board units internally and convert
//! to kilograms only at the reporting edge (`Estimate::kilograms`).

// Module declarations
pub mod calibration;
pub mod config;
pub mod conversions;
pub mod error;
pub mod mocks;
pub mod runner;
pub mod sampler;
pub mod stabilizer;
pub mod window;

pub use calibration::{CornerOffsets, calibrate, calibrate_from, normalize};
pub use config::{CalibrationCfg, CenterMethod, ConvergenceCfg, Timeouts};
pub use error::{BuildError, WeighError};
pub use runner::{SamplingMode, SessionBuilder, WeighSession};
pub use stabilizer::{Estimate, Measurement, StabilizeStatus, Stabilizer, stabilize};
pub use window::SampleWindow;
