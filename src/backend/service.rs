//! Bundled compute service
//!
//! Owns every payload, measured or synthesized, and runs the kernels from
//! [`crate::analysis`] against them.

use std::path::Path;

use crate::analysis::{
    phase_error, roll_off_amplitude, roll_off_peaks, trajectory, FieldIntegrals,
    FieldSource, HarmonicAnalyzer, Trajectory, TrajectoryConfig,
};
use crate::config::{ModelFamily, ModelParameters};
use crate::error::{Result, WorkbenchError};
use crate::types::{AnalysisResult, FieldGrid, PayloadId};

use super::compute_trait::{
    AngleCorrection, ComputeOutput, CrossTalkCoefficients, DeviceComputeService,
    FieldIntegralInputs, LoadedDevice, MagneticFieldInputs, PhaseErrorInputs, RollOffInputs,
    TrajectoryInputs,
};
use super::field_map::{load_dat, FieldMap};
use super::models::UndulatorModel;

enum Payload {
    Measurement { grid: FieldGrid, map: FieldMap },
    Model(UndulatorModel),
}

impl Payload {
    fn source(&self) -> &dyn FieldSource {
        match self {
            Payload::Measurement { map, .. } => map as &dyn FieldSource,
            Payload::Model(model) => model as &dyn FieldSource,
        }
    }
}

/// Production implementation of [`DeviceComputeService`]
#[derive(Default)]
pub struct FieldComputeService {
    payloads: Vec<Payload>,
    analyzer: HarmonicAnalyzer,
}

impl FieldComputeService {
    pub fn new() -> Self {
        Self::default()
    }

    fn register(&mut self, payload: Payload) -> PayloadId {
        let id = PayloadId(self.payloads.len() as u32);
        self.payloads.push(payload);
        id
    }

    fn payload(&self, id: PayloadId) -> Result<&Payload> {
        self.payloads
            .get(id.0 as usize)
            .ok_or_else(|| WorkbenchError::Compute(format!("unknown payload {:?}", id)))
    }

    fn measurement_mut(&mut self, id: PayloadId, operation: &str) -> Result<&mut FieldGrid> {
        match self.payloads.get_mut(id.0 as usize) {
            Some(Payload::Measurement { grid, .. }) => Ok(grid),
            Some(Payload::Model(_)) => Err(WorkbenchError::NotImplemented(format!(
                "{} for model devices",
                operation
            ))),
            None => Err(WorkbenchError::Compute(format!("unknown payload {:?}", id))),
        }
    }

    /// Rebuild the interpolation after the raw grid changed
    fn refresh_map(&mut self, id: PayloadId) -> Result<()> {
        if let Some(Payload::Measurement { grid, map }) = self.payloads.get_mut(id.0 as usize) {
            *map = FieldMap::from_grid(grid)?;
        }
        Ok(())
    }
}

fn column<'a>(result: &'a AnalysisResult, label: &str) -> Result<&'a [f64]> {
    result.vector(label).ok_or_else(|| {
        WorkbenchError::Compute(format!(
            "{} result for '{}' has no '{}' column",
            result.kind, result.device_name, label
        ))
    })
}

/// Samples taken at the same z positions, within rounding
fn same_grid(a: &[f64], b: &[f64]) -> bool {
    const TOLERANCE: f64 = 1e-9;
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| (x - y).abs() <= TOLERANCE)
}

impl DeviceComputeService for FieldComputeService {
    fn load_measurement(&mut self, path: &Path) -> Result<LoadedDevice> {
        let grid = load_dat(path)?;
        let map = FieldMap::from_grid(&grid)?;
        tracing::info!("Loaded {} samples from {}", grid.len(), path.display());
        let payload = self.register(Payload::Measurement {
            grid: grid.clone(),
            map,
        });
        Ok(LoadedDevice { payload, grid })
    }

    fn build_model(&mut self, family: ModelFamily, params: &ModelParameters) -> Result<PayloadId> {
        let model = UndulatorModel::new(family, params)?;
        Ok(self.register(Payload::Model(model)))
    }

    fn raw_grid(&self, payload: PayloadId) -> Option<FieldGrid> {
        match self.payloads.get(payload.0 as usize)? {
            Payload::Measurement { grid, .. } => Some(grid.clone()),
            Payload::Model(_) => None,
        }
    }

    fn magnetic_field(
        &mut self,
        payload: PayloadId,
        inputs: &MagneticFieldInputs,
    ) -> Result<ComputeOutput> {
        let source = self.payload(payload)?.source();
        let z = inputs.z.points();
        let [bx, by, bz] = source.field_along_z(inputs.x, inputs.y, &z);
        Ok(ComputeOutput::new(vec![z, bx, by, bz]))
    }

    fn trajectory(
        &mut self,
        payload: PayloadId,
        inputs: &TrajectoryInputs,
    ) -> Result<ComputeOutput> {
        let source = self.payload(payload)?.source();
        let config = TrajectoryConfig {
            energy_gev: inputs.energy_gev,
            initial: inputs.initial,
            z_max: inputs.z_max,
            step: inputs.rk_step,
        };
        let trajectory = trajectory::integrate(source, &config)?;
        Ok(ComputeOutput::new(trajectory.into_columns()))
    }

    fn phase_error(
        &mut self,
        payload: PayloadId,
        inputs: &PhaseErrorInputs,
        trajectory: &AnalysisResult,
    ) -> Result<ComputeOutput> {
        let source = self.payload(payload)?.source();
        let trajectory = Trajectory::from_columns([
            column(trajectory, "x")?,
            column(trajectory, "y")?,
            column(trajectory, "z")?,
            column(trajectory, "x'")?,
            column(trajectory, "y'")?,
            column(trajectory, "z'")?,
        ]);
        let report =
            phase_error::compute(source, &trajectory, inputs.energy_gev, inputs.skip_poles)?;
        Ok(
            ComputeOutput::new(vec![report.z_poles, report.phase_error]).with_scalars(vec![
                report.rms,
                report.bx_amp,
                report.by_amp,
                report.k_h,
                report.k_v,
            ]),
        )
    }

    fn field_integrals(
        &mut self,
        payload: PayloadId,
        inputs: &FieldIntegralInputs,
        field: &AnalysisResult,
    ) -> Result<ComputeOutput> {
        // Prefer the cached field when it was sampled on the same grid
        let z = inputs.z.points();
        let cached = column(field, "z").ok().filter(|cz| same_grid(cz, &z));
        let integrals = match cached {
            Some(cz) => FieldIntegrals::compute(
                cz,
                [column(field, "Bx")?, column(field, "By")?, column(field, "Bz")?],
            ),
            None => {
                let [bx, by, bz] = self
                    .payload(payload)?
                    .source()
                    .field_along_z(inputs.x, inputs.y, &z);
                FieldIntegrals::compute(&z, [&bx, &by, &bz])
            }
        };
        Ok(ComputeOutput::new(integrals.into_columns()))
    }

    fn roll_off_peaks(
        &mut self,
        payload: PayloadId,
        inputs: &RollOffInputs,
    ) -> Result<ComputeOutput> {
        let source = self.payload(payload)?.source();
        let columns = roll_off_peaks(source, &inputs.z.points(), &inputs.x.points(), inputs.y);
        Ok(ComputeOutput::new(columns.into()))
    }

    fn roll_off_amp(&mut self, payload: PayloadId, inputs: &RollOffInputs) -> Result<ComputeOutput> {
        let Self { payloads, analyzer } = self;
        let source = payloads
            .get(payload.0 as usize)
            .ok_or_else(|| WorkbenchError::Compute(format!("unknown payload {:?}", payload)))?
            .source();
        let columns = roll_off_amplitude(
            analyzer,
            source,
            &inputs.z.points(),
            &inputs.x.points(),
            inputs.y,
        );
        Ok(ComputeOutput::new(columns.into()))
    }

    fn correct_angles(&mut self, payload: PayloadId, angles: &AngleCorrection) -> Result<()> {
        let grid = self.measurement_mut(payload, "Angle correction")?;
        let s = |deg: f64| deg.to_radians().sin();
        for row in grid.rows_mut() {
            let [bx, by, bz] = [row[3], row[4], row[5]];
            row[3] = bx - s(angles.xy) * by - s(angles.xz) * bz;
            row[4] = by - s(angles.yx) * bx - s(angles.yz) * bz;
            row[5] = bz - s(angles.zx) * bx - s(angles.zy) * by;
        }
        self.refresh_map(payload)
    }

    fn correct_cross_talk(
        &mut self,
        payload: PayloadId,
        coefficients: &CrossTalkCoefficients,
    ) -> Result<()> {
        let grid = self.measurement_mut(payload, "Cross-talk correction")?;
        let [ky0, ky1, ky2] = coefficients.ky;
        let [kz0, kz1, kz2] = coefficients.kz;
        for row in grid.rows_mut() {
            let bx = row[3];
            row[4] -= ky0 + ky1 * bx + ky2 * bx * bx;
            row[5] -= kz0 + kz1 * bx + kz2 * bx * bx;
        }
        self.refresh_map(payload)
    }

    fn restore_grid(&mut self, payload: PayloadId, grid: FieldGrid) -> Result<()> {
        *self.measurement_mut(payload, "Grid restore")? = grid;
        self.refresh_map(payload)
    }
}
