//! Phase error of an electron trajectory
//!
//! Poles are the extrema of the dominant field component between successive
//! zero crossings. The electron's phase is evaluated at each pole from the
//! slip integral; the ideal advance is linear in the pole index, so the
//! residual of a least-squares line is the phase error.

use crate::error::{Result, WorkbenchError};

use super::{deflection_parameter, lorentz_factor, FieldSource, Trajectory};

/// Extrema smaller than this fraction of the global maximum are ignored
const POLE_THRESHOLD: f64 = 0.2;

/// Outcome of a phase error analysis
#[derive(Debug, Clone, PartialEq)]
pub struct PhaseErrorReport {
    /// z of the poles kept after skipping (mm)
    pub z_poles: Vec<f64>,
    /// Phase error at each kept pole (deg)
    pub phase_error: Vec<f64>,
    /// RMS phase error (deg)
    pub rms: f64,
    /// Mean absolute horizontal field at its poles (T)
    pub bx_amp: f64,
    /// Mean absolute vertical field at its poles (T)
    pub by_amp: f64,
    /// Deflection parameter from `by_amp`
    pub k_h: f64,
    /// Deflection parameter from `bx_amp`
    pub k_v: f64,
}

/// Indices of the pole peaks of `b`.
///
/// One index per half period: the sample with the largest `|b|` between two
/// sign changes, kept when above `POLE_THRESHOLD` of the global maximum.
pub fn find_poles(b: &[f64]) -> Vec<usize> {
    let max = b.iter().fold(0.0f64, |m, v| m.max(v.abs()));
    if max <= f64::EPSILON {
        return Vec::new();
    }
    let threshold = POLE_THRESHOLD * max;

    let mut poles = Vec::new();
    let mut best: Option<usize> = None;
    let mut sign = 0.0f64;
    for (i, &v) in b.iter().enumerate() {
        let s = if v.abs() < threshold { 0.0 } else { v.signum() };
        if s == 0.0 {
            continue;
        }
        if s != sign {
            if let Some(idx) = best.take() {
                poles.push(idx);
            }
            sign = s;
        }
        match best {
            Some(idx) if b[idx].abs() >= v.abs() => {}
            _ => best = Some(i),
        }
    }
    if let Some(idx) = best {
        poles.push(idx);
    }
    poles
}

fn mean_abs_at(b: &[f64], indices: &[usize]) -> f64 {
    if indices.is_empty() {
        return 0.0;
    }
    indices.iter().map(|&i| b[i].abs()).sum::<f64>() / indices.len() as f64
}

fn trim(indices: &[usize], skip: usize) -> &[usize] {
    if indices.len() <= 2 * skip {
        &[]
    } else {
        &indices[skip..indices.len() - skip]
    }
}

/// Residuals of the least-squares line through `(i, y_i)`
fn detrend(y: &[f64]) -> Vec<f64> {
    let n = y.len() as f64;
    let mean_x = (n - 1.0) / 2.0;
    let mean_y = y.iter().sum::<f64>() / n;
    let mut sxy = 0.0;
    let mut sxx = 0.0;
    for (i, v) in y.iter().enumerate() {
        let dx = i as f64 - mean_x;
        sxy += dx * (v - mean_y);
        sxx += dx * dx;
    }
    let slope = if sxx > 0.0 { sxy / sxx } else { 0.0 };
    y.iter()
        .enumerate()
        .map(|(i, v)| v - (mean_y + slope * (i as f64 - mean_x)))
        .collect()
}

/// Compute the phase error along `trajectory` through `field`.
pub fn compute(
    field: &dyn FieldSource,
    trajectory: &Trajectory,
    energy_gev: f64,
    skip_poles: usize,
) -> Result<PhaseErrorReport> {
    if trajectory.len() < 3 {
        return Err(WorkbenchError::Compute(
            "trajectory is too short for a phase error analysis".to_string(),
        ));
    }

    let n = trajectory.len();
    let mut bx = Vec::with_capacity(n);
    let mut by = Vec::with_capacity(n);
    for i in 0..n {
        let b = field.field(trajectory.x[i], trajectory.y[i], trajectory.z[i]);
        bx.push(b[0]);
        by.push(b[1]);
    }

    let bx_poles = find_poles(&bx);
    let by_poles = find_poles(&by);
    let bx_amp = mean_abs_at(&bx, trim(&bx_poles, skip_poles));
    let by_amp = mean_abs_at(&by, trim(&by_poles, skip_poles));

    let dominant = if by_amp >= bx_amp { &by_poles } else { &bx_poles };
    let kept = trim(dominant, skip_poles);
    if kept.len() < 3 {
        return Err(WorkbenchError::Compute(format!(
            "only {} poles left after skipping {} at each end",
            kept.len(),
            skip_poles
        )));
    }

    let z_poles: Vec<f64> = kept.iter().map(|&i| trajectory.z[i]).collect();
    let half_period = (z_poles[z_poles.len() - 1] - z_poles[0]) / (z_poles.len() - 1) as f64;
    let period = 2.0 * half_period;

    let k_h = deflection_parameter(period, by_amp);
    let k_v = deflection_parameter(period, bx_amp);

    let gamma = lorentz_factor(energy_gev);
    let inv_2g2 = 1.0 / (2.0 * gamma * gamma);
    // First harmonic wavelength (mm)
    let wavelength = period * inv_2g2 * (1.0 + (k_h * k_h + k_v * k_v) / 2.0);

    // Slip integral: s(z) = int (1/(2 g^2) + (x'^2 + y'^2)/2) dz
    let mut slip = Vec::with_capacity(n);
    let mut acc = 0.0;
    slip.push(acc);
    for i in 1..n {
        let f = |j: usize| inv_2g2 + 0.5 * (trajectory.xp[j].powi(2) + trajectory.yp[j].powi(2));
        acc += 0.5 * (f(i) + f(i - 1)) * (trajectory.z[i] - trajectory.z[i - 1]);
        slip.push(acc);
    }

    let phase_deg: Vec<f64> = kept
        .iter()
        .map(|&i| 360.0 * slip[i] / wavelength)
        .collect();
    let phase_error = detrend(&phase_deg);
    let rms = (phase_error.iter().map(|v| v * v).sum::<f64>() / phase_error.len() as f64).sqrt();

    Ok(PhaseErrorReport {
        z_poles,
        phase_error,
        rms,
        bx_amp,
        by_amp,
        k_h,
        k_v,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::test_fields::Sinusoid;
    use crate::analysis::trajectory::{integrate, TrajectoryConfig};
    use std::f64::consts::PI;

    #[test]
    fn test_find_poles_of_cosine() {
        let b: Vec<f64> = (0..=400)
            .map(|i| (2.0 * PI * i as f64 / 100.0).cos())
            .collect();
        let poles = find_poles(&b);
        let expected: Vec<usize> = (0..=8).map(|i| i * 50).collect();
        assert_eq!(poles, expected);
    }

    #[test]
    fn test_find_poles_of_zero_field() {
        assert!(find_poles(&[0.0; 10]).is_empty());
    }

    #[test]
    fn test_detrend_removes_line() {
        let residual = detrend(&[1.0, 3.0, 5.0, 7.0]);
        assert!(residual.iter().all(|r| r.abs() < 1e-12));
    }

    #[test]
    fn test_ideal_sinusoid_has_small_phase_error() {
        let field = Sinusoid {
            period: 50.0,
            nr_periods: 20,
            by: 0.8,
            bx: 0.0,
        };
        let config = TrajectoryConfig {
            energy_gev: 3.0,
            initial: [0.0, 0.0, -600.0, 0.0, 0.0, 1.0],
            z_max: 600.0,
            step: 0.5,
        };
        let traj = integrate(&field, &config).unwrap();
        let report = compute(&field, &traj, 3.0, 4).unwrap();

        assert!((report.by_amp - 0.8).abs() < 1e-3);
        assert!(report.bx_amp.abs() < 1e-12);
        assert!((report.k_h - deflection_parameter(50.0, 0.8)).abs() < 0.05);
        assert_eq!(report.z_poles.len(), report.phase_error.len());
        assert!(report.rms < 1.0, "rms = {}", report.rms);
    }

    #[test]
    fn test_too_many_skipped_poles() {
        let field = Sinusoid {
            period: 50.0,
            nr_periods: 2,
            by: 0.8,
            bx: 0.0,
        };
        let config = TrajectoryConfig {
            energy_gev: 3.0,
            initial: [0.0, 0.0, -100.0, 0.0, 0.0, 1.0],
            z_max: 100.0,
            step: 0.5,
        };
        let traj = integrate(&field, &config).unwrap();
        assert!(compute(&field, &traj, 3.0, 4).is_err());
    }
}
