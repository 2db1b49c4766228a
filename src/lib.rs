//! # idanalysis-rs: Insertion Device Analysis Workbench
//!
//! An interactive workbench for magnetic field measurements and parametric
//! models of insertion devices (undulators). Users load Hall-probe field
//! maps, generate models, run a fixed catalogue of analyses on each device
//! and inspect the results as a tree, as charts and as tables.
//!
//! ## Architecture
//!
//! - **Workbench**: GUI-agnostic core owning projects, devices, the analysis
//!   cache and the explore tree
//! - **Backend**: The `DeviceComputeService` seam plus the bundled field map
//!   and model implementation
//! - **Analysis**: Numerical kernels (trajectory, phase error, integrals,
//!   roll-off)
//! - **Frontend**: eframe/egui rendering with an egui_dock visuals panel
//!
//! ## Configuration
//!
//! Preferences and the default analysis parameters are stored in
//! `config.toml` under `dev.idanalysis.workbench` in the platform config
//! directory. Projects are never persisted.
//!
//! ## Example
//!
//! ```ignore
//! use idanalysis_rs::{app::create_app, config::AppConfig};
//!
//! fn main() -> eframe::Result<()> {
//!     let config = AppConfig::load_or_default();
//!     eframe::run_native(
//!         "ID Analysis Workbench",
//!         eframe::NativeOptions::default(),
//!         Box::new(|cc| Ok(Box::new(create_app(cc, config)))),
//!     )
//! }
//! ```

pub mod analysis;
pub mod app;
pub mod backend;
pub mod config;
pub mod error;
pub mod frontend;
pub mod types;
pub mod workbench;

// Re-export commonly used types
pub use app::WorkbenchApp;
pub use backend::{DeviceComputeService, FieldComputeService};
pub use config::{AnalysisParameters, AppConfig, ModelFamily, ModelParameters};
pub use error::{Result, WorkbenchError};
pub use types::{AnalysisKind, AnalysisResult, Device, DeviceKind, FieldGrid};
pub use workbench::{ProjectWorkbench, UiHost};
