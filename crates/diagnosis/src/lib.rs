//! # Diagnosis Crate
//!
//! Classifies a blood-pressure measurement into one of five clinical
//! categories.
//!
//! ## Components
//!
//! - **category**: the `Category` enum and its display labels
//! - **classify**: the ordered decision table, first matching rule wins
//! - **bounds**: plausibility limits applied where readings are collected
//!
//! ## Example Usage
//!
//! ```
//! use diagnosis::{classify, Category};
//!
//! assert_eq!(classify(125, 85), Category::HypertensionStage1);
//! assert_eq!(classify(125, 75).label(), "Elevated");
//! ```
//!
//! `classify` is total over all `i32` pairs. Range checks belong to the
//! input boundary (see [`bounds::validate_measurement`]), never to the
//! classifier itself.

pub mod bounds;
pub mod category;
pub mod classify;

// Re-export main types
pub use bounds::{
    validate_diastolic, validate_measurement, validate_systolic, MeasurementError, DIASTOLIC_RANGE,
    SYSTOLIC_RANGE,
};
pub use category::{Category, UnknownCategory};
pub use classify::classify;
