//! Deterministic compute service for integration tests
//!
//! Returns correctly shaped arrays derived from the inputs and records every
//! call in a log shared with the test through `Rc<RefCell<..>>`.

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::Path;
use std::rc::Rc;

use idanalysis_rs::backend::{
    AngleCorrection, ComputeOutput, CrossTalkCoefficients, DeviceComputeService,
    FieldIntegralInputs, LoadedDevice, MagneticFieldInputs, PhaseErrorInputs, RollOffInputs,
    TrajectoryInputs,
};
use idanalysis_rs::config::{ModelFamily, ModelParameters};
use idanalysis_rs::types::{AnalysisResult, FieldGrid, PayloadId};
use idanalysis_rs::Result;

/// Scalars returned by every phase error call
pub const PHASE_ERROR_SCALARS: [f64; 5] = [2.345, 0.81, 1.24, 2.04, 0.0];

/// Shared record of service calls
#[derive(Debug, Clone, Default)]
pub struct CallLog(Rc<RefCell<Vec<&'static str>>>);

impl CallLog {
    pub fn record(&self, call: &'static str) {
        self.0.borrow_mut().push(call);
    }

    pub fn count(&self, call: &str) -> usize {
        self.0.borrow().iter().filter(|c| **c == call).count()
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.0.borrow().clone()
    }
}

/// Rows of a small measured grid along z, `x = y = 0`
pub fn line_grid(points: usize) -> FieldGrid {
    let half = (points / 2) as f64;
    FieldGrid::new(
        (0..points)
            .map(|i| {
                let z = i as f64 - half;
                [0.0, 0.0, z, 0.01 * z, (z * 0.5).cos(), 0.0]
            })
            .collect(),
    )
}

#[derive(Debug, Default)]
pub struct FakeComputeService {
    next_payload: u32,
    grids: HashMap<PayloadId, FieldGrid>,
    log: CallLog,
}

impl FakeComputeService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Service plus a handle on its call log
    pub fn with_log() -> (Self, CallLog) {
        let service = Self::new();
        let log = service.log.clone();
        (service, log)
    }

    fn allocate(&mut self) -> PayloadId {
        self.next_payload += 1;
        PayloadId(self.next_payload)
    }

    fn columns(count: usize, len: usize, scale: f64) -> Vec<Vec<f64>> {
        (0..count)
            .map(|c| (0..len).map(|i| scale * (c + 1) as f64 * i as f64).collect())
            .collect()
    }
}

impl DeviceComputeService for FakeComputeService {
    fn load_measurement(&mut self, _path: &Path) -> Result<LoadedDevice> {
        self.log.record("load_measurement");
        let payload = self.allocate();
        let grid = line_grid(11);
        self.grids.insert(payload, grid.clone());
        Ok(LoadedDevice { payload, grid })
    }

    fn build_model(&mut self, _family: ModelFamily, _params: &ModelParameters) -> Result<PayloadId> {
        self.log.record("build_model");
        Ok(self.allocate())
    }

    fn raw_grid(&self, payload: PayloadId) -> Option<FieldGrid> {
        self.grids.get(&payload).cloned()
    }

    fn magnetic_field(
        &mut self,
        _payload: PayloadId,
        inputs: &MagneticFieldInputs,
    ) -> Result<ComputeOutput> {
        self.log.record("magnetic_field");
        let z = inputs.z.points();
        let bx = z.iter().map(|z| 0.01 * z).collect();
        let by = z.iter().map(|z| (z * 0.5).cos()).collect();
        let bz = vec![0.0; z.len()];
        Ok(ComputeOutput::new(vec![z, bx, by, bz]))
    }

    fn trajectory(&mut self, _payload: PayloadId, inputs: &TrajectoryInputs) -> Result<ComputeOutput> {
        self.log.record("trajectory");
        let len = ((inputs.z_max - inputs.initial[2]) / inputs.rk_step).round() as usize + 1;
        Ok(ComputeOutput::new(Self::columns(6, len, 1e-3)))
    }

    fn phase_error(
        &mut self,
        _payload: PayloadId,
        _inputs: &PhaseErrorInputs,
        trajectory: &AnalysisResult,
    ) -> Result<ComputeOutput> {
        self.log.record("phase_error");
        assert!(trajectory.vector("z").is_some());
        Ok(ComputeOutput::new(Self::columns(2, 5, 1.0)).with_scalars(PHASE_ERROR_SCALARS.to_vec()))
    }

    fn field_integrals(
        &mut self,
        _payload: PayloadId,
        inputs: &FieldIntegralInputs,
        _field: &AnalysisResult,
    ) -> Result<ComputeOutput> {
        self.log.record("field_integrals");
        Ok(ComputeOutput::new(Self::columns(6, inputs.z.len(), 0.5)))
    }

    fn roll_off_peaks(&mut self, _payload: PayloadId, inputs: &RollOffInputs) -> Result<ComputeOutput> {
        self.log.record("roll_off_peaks");
        Ok(ComputeOutput::new(Self::columns(3, inputs.x.len(), 0.1)))
    }

    fn roll_off_amp(&mut self, _payload: PayloadId, inputs: &RollOffInputs) -> Result<ComputeOutput> {
        self.log.record("roll_off_amp");
        Ok(ComputeOutput::new(Self::columns(3, inputs.x.len(), 0.2)))
    }

    fn correct_angles(&mut self, _payload: PayloadId, _angles: &AngleCorrection) -> Result<()> {
        self.log.record("correct_angles");
        Ok(())
    }

    fn correct_cross_talk(
        &mut self,
        payload: PayloadId,
        _coefficients: &CrossTalkCoefficients,
    ) -> Result<()> {
        self.log.record("correct_cross_talk");
        if let Some(grid) = self.grids.get_mut(&payload) {
            for row in grid.rows_mut() {
                row[4] += 1.0;
            }
        }
        Ok(())
    }

    fn restore_grid(&mut self, payload: PayloadId, grid: FieldGrid) -> Result<()> {
        self.log.record("restore_grid");
        self.grids.insert(payload, grid);
        Ok(())
    }
}
