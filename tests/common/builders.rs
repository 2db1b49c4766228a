//! Test data builders for creating test objects

use std::fs;
use std::path::{Path, PathBuf};

use idanalysis_rs::config::GridSpec;
use idanalysis_rs::{AnalysisParameters, DeviceComputeService, ProjectWorkbench};

use super::fake_service::{CallLog, FakeComputeService};

/// Builder for small analysis parameter sets
pub struct ParametersBuilder {
    params: AnalysisParameters,
}

impl ParametersBuilder {
    /// An 11-point axial grid and a 5-point roll-off grid
    pub fn new() -> Self {
        Self {
            params: AnalysisParameters {
                energy_gev: 3.0,
                z_grid: GridSpec::new(-5.0, 5.0, 1.0),
                x_grid: GridSpec::new(-2.0, 2.0, 1.0),
                initial_state: [0.0, 0.0, -5.0, 0.0, 0.0, 1.0],
                z_max: 5.0,
                rk_step: 1.0,
                skip_poles: 0,
            },
        }
    }

    pub fn energy(mut self, energy_gev: f64) -> Self {
        self.params.energy_gev = energy_gev;
        self
    }

    pub fn z_grid(mut self, start: f64, stop: f64, step: f64) -> Self {
        self.params.z_grid = GridSpec::new(start, stop, step);
        self
    }

    pub fn build(self) -> AnalysisParameters {
        self.params
    }
}

impl Default for ParametersBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Workbench over the fake service with small parameters
pub fn fake_workbench() -> (ProjectWorkbench, CallLog) {
    let (service, log) = FakeComputeService::with_log();
    (workbench_with(Box::new(service)), log)
}

pub fn workbench_with(service: Box<dyn DeviceComputeService>) -> ProjectWorkbench {
    ProjectWorkbench::new(service, ParametersBuilder::new().build())
}

/// Write a `.dat` measurement file with the given rows
pub fn write_field_map(dir: &Path, name: &str, rows: &[[f64; 6]]) -> PathBuf {
    let mut contents = String::from("X[mm]\tY[mm]\tZ[mm]\tBx[T]\tBy[T]\tBz[T]\n");
    for row in rows {
        let line: Vec<String> = row.iter().map(|v| format!("{:.6}", v)).collect();
        contents.push_str(&line.join("\t"));
        contents.push('\n');
    }
    let path = dir.join(format!("{}.dat", name));
    fs::write(&path, contents).expect("write field map");
    path
}

/// A sinusoidal on-axis field sampled at integer z in `[-half, half]` mm
pub fn sine_rows(half: i32, period: f64, peak: f64) -> Vec<[f64; 6]> {
    (-half..=half)
        .map(|z| {
            let z = z as f64;
            let by = peak * (2.0 * std::f64::consts::PI * z / period).cos();
            [0.0, 0.0, z, 0.0, by, 0.0]
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parameters_builder() {
        let params = ParametersBuilder::new().energy(1.5).build();
        assert_eq!(params.energy_gev, 1.5);
        assert_eq!(params.z_grid.len(), 11);
        assert!(params.validate().is_ok());
    }
}
