//! Numerical kernels behind the bundled compute service
//!
//! Everything here is pure: kernels receive a [`FieldSource`] and plain
//! parameters and return plain vectors.
//!
//! - [`trajectory`] - RK4 electron trajectory through a field
//! - [`integrals`] - First and second field integrals
//! - [`phase_error`] - Pole detection, phase error and deflection parameters
//! - [`roll_off`] - Transverse roll-off of peaks and of the fundamental amplitude
//! - [`fft`] - Fundamental harmonic estimation

pub mod fft;
pub mod integrals;
pub mod phase_error;
pub mod roll_off;
pub mod trajectory;

pub use fft::{Harmonic, HarmonicAnalyzer, WindowFunction};
pub use integrals::{cumulative_trapezoid, FieldIntegrals};
pub use phase_error::{find_poles, PhaseErrorReport};
pub use roll_off::{roll_off_amplitude, roll_off_peaks};
pub use trajectory::{Trajectory, TrajectoryConfig};

/// Anything that can report the magnetic field `[Bx, By, Bz]` (T) at a point (mm)
pub trait FieldSource {
    fn field(&self, x: f64, y: f64, z: f64) -> [f64; 3];

    /// Sample the field along z at fixed transverse position
    fn field_along_z(&self, x: f64, y: f64, z: &[f64]) -> [Vec<f64>; 3] {
        let mut out = [
            Vec::with_capacity(z.len()),
            Vec::with_capacity(z.len()),
            Vec::with_capacity(z.len()),
        ];
        for &zi in z {
            let b = self.field(x, y, zi);
            for (column, value) in out.iter_mut().zip(b) {
                column.push(value);
            }
        }
        out
    }
}

/// Electron rest energy (GeV)
pub const ELECTRON_REST_ENERGY_GEV: f64 = 0.510_998_95e-3;

/// Magnetic rigidity per GeV of beam energy (T m)
pub const RIGIDITY_PER_GEV: f64 = 3.335_640_952;

/// Lorentz factor for an electron of the given energy
pub fn lorentz_factor(energy_gev: f64) -> f64 {
    energy_gev / ELECTRON_REST_ENERGY_GEV
}

/// Deflection parameter `K = 0.0934 * period[mm] * B[T]`
pub fn deflection_parameter(period_mm: f64, amplitude_t: f64) -> f64 {
    0.093_37 * period_mm * amplitude_t
}
