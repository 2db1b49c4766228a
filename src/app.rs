//! Application module
//!
//! Re-exports the main application type and wires it to the bundled compute
//! service.

pub use crate::frontend::WorkbenchApp;

use crate::backend::FieldComputeService;
use crate::config::AppConfig;

/// Build the app with the bundled [`FieldComputeService`]
pub fn create_app(cc: &eframe::CreationContext<'_>, config: AppConfig) -> WorkbenchApp {
    WorkbenchApp::new(cc, config, Box::new(FieldComputeService::new()))
}
