//! Backend module: the physics side of the workbench
//!
//! The core talks to field data only through the [`DeviceComputeService`]
//! trait. This module defines that seam and ships the production
//! implementation.
//!
//! # Components
//!
//! - [`DeviceComputeService`] - Load, build, correct and analyse devices by handle
//! - [`FieldComputeService`] - Bundled implementation owning every payload
//! - [`FieldMap`] - Trilinear interpolation over a measured `.dat` grid
//! - [`UndulatorModel`] - Analytic field of the parametric device families
//!
//! # Example
//!
//! ```ignore
//! use idanalysis_rs::backend::{DeviceComputeService, FieldComputeService, MagneticFieldInputs};
//! use idanalysis_rs::config::GridSpec;
//!
//! let mut service = FieldComputeService::new();
//! let loaded = service.load_measurement("meas1.dat".as_ref())?;
//! let out = service.magnetic_field(
//!     loaded.payload,
//!     &MagneticFieldInputs { z: GridSpec::new(-100.0, 100.0, 1.0), x: 0.0, y: 0.0 },
//! )?;
//! assert_eq!(out.columns.len(), 4);
//! ```

pub mod compute_trait;
pub mod field_map;
pub mod models;
pub mod service;

pub use compute_trait::{
    AngleCorrection, ComputeOutput, CrossTalkCoefficients, DeviceComputeService,
    FieldIntegralInputs, LoadedDevice, MagneticFieldInputs, PhaseErrorInputs, RollOffInputs,
    TrajectoryInputs,
};
pub use field_map::{load_dat, parse_dat, FieldMap};
pub use models::{halbach_peak_field, hybrid_peak_field, UndulatorModel};
pub use service::FieldComputeService;
