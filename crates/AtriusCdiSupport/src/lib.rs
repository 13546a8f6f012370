//! # CDI Support Types
//!
//! This crate provides the foundational types shared across the CDI
//! (Clinical Documentation Integrity) pipeline crates: the common error
//! type, confidence arithmetic, and physiological plausibility bounds.
//!
//! ## Overview
//!
//! The cdi-support crate acts as the leaf layer that allows:
//! - Value parsers to bound-check candidate measurements before they are
//!   stored in an entity bundle
//! - Every pipeline stage to produce confidence scores with uniform
//!   clamping and aggregation rules
//! - The extractor and evaluator crates to share a single error type
//!
//! ## Core Types
//!
//! - [`CdiError`] - Error type for pipeline failures (only missing input
//!   is a hard failure; parse misses never are)
//! - [`MeasurementField`] / [`PhysiologicalRange`] - the plausibility
//!   table used to reject out-of-range parsed values
//! - [`confidence`] - clamping and weighted-mean helpers, all in [0, 1]

pub mod bounds;
pub mod cdi_error;
pub mod confidence;

pub use bounds::{MeasurementField, PhysiologicalRange};
pub use cdi_error::{CdiError, CdiResult};
