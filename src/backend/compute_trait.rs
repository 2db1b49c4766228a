//! DeviceComputeService trait for the physics seam
//!
//! The workbench core never touches field data directly. It holds
//! [`PayloadId`] handles and asks an implementation of this trait to load,
//! build, correct and analyse devices. The bundled
//! [`FieldComputeService`](super::FieldComputeService) is the production
//! implementation; tests substitute deterministic fakes or mocks.

use std::path::Path;

use crate::config::{GridSpec, ModelFamily, ModelParameters};
use crate::error::Result;
use crate::types::{AnalysisResult, FieldGrid, PayloadId};

/// Payload handle plus the raw grid of a freshly parsed measurement
#[derive(Debug, Clone)]
pub struct LoadedDevice {
    pub payload: PayloadId,
    pub grid: FieldGrid,
}

/// Raw output of an analysis: vector columns in label order, then scalars.
///
/// All columns have the same length. Field integrals carry no scalars: their
/// terminal values are read from the last row of each column.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComputeOutput {
    pub columns: Vec<Vec<f64>>,
    pub scalars: Vec<f64>,
}

impl ComputeOutput {
    pub fn new(columns: Vec<Vec<f64>>) -> Self {
        Self {
            columns,
            scalars: Vec::new(),
        }
    }

    pub fn with_scalars(mut self, scalars: Vec<f64>) -> Self {
        self.scalars = scalars;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MagneticFieldInputs {
    pub z: GridSpec,
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrajectoryInputs {
    pub energy_gev: f64,
    /// `(x, y, z, x', y', z')`
    pub initial: [f64; 6],
    pub z_max: f64,
    pub rk_step: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhaseErrorInputs {
    pub energy_gev: f64,
    pub skip_poles: usize,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldIntegralInputs {
    pub z: GridSpec,
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RollOffInputs {
    pub z: GridSpec,
    pub x: GridSpec,
    pub y: f64,
}

/// Sensor misalignment angles (deg). `xy` is the tilt of the x probe towards y.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AngleCorrection {
    pub xy: f64,
    pub xz: f64,
    pub yx: f64,
    pub yz: f64,
    pub zx: f64,
    pub zy: f64,
}

/// Quadratic dependence of the y and z probes on `Bx`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CrossTalkCoefficients {
    pub ky: [f64; 3],
    pub kz: [f64; 3],
}

/// Unified interface for the physics library
///
/// All calls are synchronous and run on the UI thread.
pub trait DeviceComputeService {
    /// Parse a measurement file and register its payload
    fn load_measurement(&mut self, path: &Path) -> Result<LoadedDevice>;

    /// Synthesize a parametric device
    fn build_model(&mut self, family: ModelFamily, params: &ModelParameters) -> Result<PayloadId>;

    /// Current raw grid of a measured payload, `None` for models
    fn raw_grid(&self, payload: PayloadId) -> Option<FieldGrid>;

    /// `(z, Bx, By, Bz)` along the axial grid
    fn magnetic_field(
        &mut self,
        payload: PayloadId,
        inputs: &MagneticFieldInputs,
    ) -> Result<ComputeOutput>;

    /// `(x, y, z, x', y', z')` of the electron
    fn trajectory(&mut self, payload: PayloadId, inputs: &TrajectoryInputs)
        -> Result<ComputeOutput>;

    /// `(z_poles, PhaseErr)` and `(RMS, Bx_amp, By_amp, K_h, K_v)`
    fn phase_error(
        &mut self,
        payload: PayloadId,
        inputs: &PhaseErrorInputs,
        trajectory: &AnalysisResult,
    ) -> Result<ComputeOutput>;

    /// `(IBx, IBy, IBz, IIBx, IIBy, IIBz)`
    fn field_integrals(
        &mut self,
        payload: PayloadId,
        inputs: &FieldIntegralInputs,
        field: &AnalysisResult,
    ) -> Result<ComputeOutput>;

    /// `(ROPx, ROPy, ROPz)` in percent
    fn roll_off_peaks(&mut self, payload: PayloadId, inputs: &RollOffInputs)
        -> Result<ComputeOutput>;

    /// `(ROAx, ROAy, ROAz)` in percent
    fn roll_off_amp(&mut self, payload: PayloadId, inputs: &RollOffInputs)
        -> Result<ComputeOutput>;

    /// Rotate the field components to undo probe misalignment
    fn correct_angles(&mut self, payload: PayloadId, angles: &AngleCorrection) -> Result<()>;

    /// Remove the quadratic cross-talk of the y and z probes
    fn correct_cross_talk(
        &mut self,
        payload: PayloadId,
        coefficients: &CrossTalkCoefficients,
    ) -> Result<()>;

    /// Put back a grid captured with [`raw_grid`](Self::raw_grid)
    fn restore_grid(&mut self, payload: PayloadId, grid: FieldGrid) -> Result<()>;
}
