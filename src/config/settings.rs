//! Analysis parameters, model presets and runtime settings
//!
//! # Main Types
//!
//! - [`AnalysisParameters`] - The frozen parameter set each analysis consumes
//! - [`GridSpec`] - Evenly spaced 1-D sampling grid
//! - [`ModelFamily`] / [`ModelParameters`] - Geometry of a parametric device
//! - [`RuntimeSettings`] - Session flags such as apply-for-all

use serde::{Deserialize, Serialize};

use crate::error::{Result, WorkbenchError};

/// Most points an analysis grid may hold
pub const MAX_GRID_POINTS: usize = 1_000_000;

/// Evenly spaced grid `start, start + step, ..., stop` (mm)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridSpec {
    pub start: f64,
    pub stop: f64,
    pub step: f64,
}

impl GridSpec {
    pub const fn new(start: f64, stop: f64, step: f64) -> Self {
        Self { start, stop, step }
    }

    /// Number of grid points
    pub fn len(&self) -> usize {
        if !self.is_finite() || self.step <= 0.0 || self.stop < self.start {
            return 0;
        }
        ((self.stop - self.start) / self.step + 1e-9).floor() as usize + 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn is_finite(&self) -> bool {
        self.start.is_finite() && self.stop.is_finite() && self.step.is_finite()
    }

    /// Materialize the grid points, at most [`MAX_GRID_POINTS`] of them
    pub fn points(&self) -> Vec<f64> {
        (0..self.len().min(MAX_GRID_POINTS))
            .map(|i| self.start + i as f64 * self.step)
            .collect()
    }

    fn validate(&self, name: &str) -> Result<()> {
        if !self.is_finite() {
            return Err(WorkbenchError::InvalidParameter(format!(
                "{} bounds and step must be finite",
                name
            )));
        }
        if !(self.step > 0.0) {
            return Err(WorkbenchError::InvalidParameter(format!(
                "{} step must be positive",
                name
            )));
        }
        if self.stop < self.start {
            return Err(WorkbenchError::InvalidParameter(format!(
                "{} must be ascending",
                name
            )));
        }
        if (self.stop - self.start) / self.step >= MAX_GRID_POINTS as f64 {
            return Err(WorkbenchError::InvalidParameter(format!(
                "{} has more than {} points",
                name, MAX_GRID_POINTS
            )));
        }
        Ok(())
    }
}

/// Parameter set consumed by the analyses.
///
/// Values are fixed per project unless edited through
/// `edit_analysis_parameters`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisParameters {
    /// Electron energy (GeV)
    pub energy_gev: f64,
    /// Axial grid for field and integral evaluation (mm)
    pub z_grid: GridSpec,
    /// Transverse grid for roll-off (mm)
    pub x_grid: GridSpec,
    /// Initial trajectory state `(x, y, z, x', y', z')` (mm, rad)
    pub initial_state: [f64; 6],
    /// Trajectory end position (mm)
    pub z_max: f64,
    /// Runge-Kutta step (mm)
    pub rk_step: f64,
    /// Poles dropped at each end before the phase error fit
    pub skip_poles: usize,
}

impl Default for AnalysisParameters {
    fn default() -> Self {
        Self {
            energy_gev: 3.0,
            z_grid: GridSpec::new(-1000.0, 1000.0, 1.0),
            x_grid: GridSpec::new(-10.0, 10.0, 1.0),
            initial_state: [0.0, 0.0, -1000.0, 0.0, 0.0, 1.0],
            z_max: 1000.0,
            rk_step: 0.5,
            skip_poles: 4,
        }
    }
}

impl AnalysisParameters {
    /// Check that the parameter set can drive every analysis
    pub fn validate(&self) -> Result<()> {
        if !(self.energy_gev > 0.0) {
            return Err(WorkbenchError::InvalidParameter(
                "energy must be positive".to_string(),
            ));
        }
        if !(self.rk_step > 0.0) {
            return Err(WorkbenchError::InvalidParameter(
                "Runge-Kutta step must be positive".to_string(),
            ));
        }
        self.z_grid.validate("z grid")?;
        self.x_grid.validate("x grid")?;
        if !self.z_max.is_finite() || self.initial_state.iter().any(|v| !v.is_finite()) {
            return Err(WorkbenchError::InvalidParameter(
                "trajectory start and end must be finite".to_string(),
            ));
        }
        if self.z_max <= self.initial_state[2] {
            return Err(WorkbenchError::InvalidParameter(format!(
                "z_max ({}) must exceed the initial z ({})",
                self.z_max, self.initial_state[2]
            )));
        }
        if self.initial_state[5] <= 0.0 {
            return Err(WorkbenchError::InvalidParameter(
                "initial z' must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Parametric device families the model generator knows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModelFamily {
    AppleIISabia,
    AppleIIUVX,
    AppleX,
    Delta,
    HybridPlanar,
}

impl ModelFamily {
    /// Name used as the device base name
    pub fn display_name(&self) -> &'static str {
        match self {
            ModelFamily::AppleIISabia => "AppleIISabia",
            ModelFamily::AppleIIUVX => "AppleIIUVX",
            ModelFamily::AppleX => "AppleX",
            ModelFamily::Delta => "Delta",
            ModelFamily::HybridPlanar => "HybridPlanar",
        }
    }

    pub fn all() -> &'static [ModelFamily] {
        &[
            ModelFamily::AppleIISabia,
            ModelFamily::AppleIIUVX,
            ModelFamily::AppleX,
            ModelFamily::Delta,
            ModelFamily::HybridPlanar,
        ]
    }

    /// Whether the family is built from pure permanent-magnet blocks
    pub fn is_pure_permanent_magnet(&self) -> bool {
        !matches!(self, ModelFamily::HybridPlanar)
    }

    /// Whether the family can shift rows to produce horizontal field
    pub fn is_elliptical(&self) -> bool {
        !matches!(self, ModelFamily::HybridPlanar)
    }

    /// Preset geometry for the family
    pub fn default_parameters(&self) -> ModelParameters {
        match self {
            ModelFamily::AppleIISabia => ModelParameters {
                period: 50.0,
                nr_periods: 21,
                gap: 13.6,
                block_height: 40.0,
                block_width: 40.0,
                remanence: 1.34,
                phase: 0.0,
            },
            ModelFamily::AppleIIUVX => ModelParameters {
                period: 50.0,
                nr_periods: 21,
                gap: 11.4,
                block_height: 40.0,
                block_width: 40.0,
                remanence: 1.37,
                phase: 0.0,
            },
            ModelFamily::AppleX => ModelParameters {
                period: 50.0,
                nr_periods: 21,
                gap: 13.6,
                block_height: 40.0,
                block_width: 40.0,
                remanence: 1.37,
                phase: 0.0,
            },
            ModelFamily::Delta => ModelParameters {
                period: 52.5,
                nr_periods: 21,
                gap: 13.6,
                block_height: 26.0,
                block_width: 26.0,
                remanence: 1.37,
                phase: 0.0,
            },
            ModelFamily::HybridPlanar => ModelParameters {
                period: 18.5,
                nr_periods: 40,
                gap: 4.2,
                block_height: 30.0,
                block_width: 50.0,
                remanence: 1.24,
                phase: 0.0,
            },
        }
    }
}

impl std::fmt::Display for ModelFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Geometry of a parametric device (lengths in mm, remanence in T)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelParameters {
    pub period: f64,
    pub nr_periods: usize,
    pub gap: f64,
    pub block_height: f64,
    /// Transverse block width, sets the roll-off (mm)
    #[serde(default = "default_block_width")]
    pub block_width: f64,
    pub remanence: f64,
    /// Longitudinal row shift setting the polarization (mm)
    pub phase: f64,
}

fn default_block_width() -> f64 {
    40.0
}

impl ModelParameters {
    pub fn validate(&self) -> Result<()> {
        if !(self.period > 0.0) {
            return Err(WorkbenchError::InvalidParameter(
                "period must be positive".to_string(),
            ));
        }
        if self.nr_periods == 0 {
            return Err(WorkbenchError::InvalidParameter(
                "a model needs at least one period".to_string(),
            ));
        }
        if !(self.gap > 0.0) || !(self.block_height > 0.0) || !(self.block_width > 0.0) {
            return Err(WorkbenchError::InvalidParameter(
                "gap and block dimensions must be positive".to_string(),
            ));
        }
        if !(self.remanence > 0.0) {
            return Err(WorkbenchError::InvalidParameter(
                "remanence must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Magnetic length (mm)
    pub fn length(&self) -> f64 {
        self.period * self.nr_periods as f64
    }
}

/// Runtime settings for the session
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuntimeSettings {
    /// Analysis confirm applies checked analyses to every Data device
    pub apply_for_all: bool,
}
