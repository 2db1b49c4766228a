//! Transverse roll-off
//!
//! Both analyses report, per transverse position `x`, the relative change in
//! percent of a field quantity with respect to its value at `x = 0`:
//! `100 * (Q(x) - Q(0)) / Q(0)`. Components whose reference is negligible
//! report zeros.

use super::{find_poles, FieldSource, HarmonicAnalyzer};

/// Reference values below this are treated as an absent component (T)
const NEGLIGIBLE_FIELD: f64 = 1e-9;

fn relative_percent(value: f64, reference: f64) -> f64 {
    if reference.abs() < NEGLIGIBLE_FIELD {
        0.0
    } else {
        100.0 * (value - reference) / reference
    }
}

/// Index of the pole of `b` closest to the middle of `z`
fn central_pole(z: &[f64], b: &[f64]) -> Option<usize> {
    let (first, last) = (z.first()?, z.last()?);
    let center = 0.5 * (first + last);
    find_poles(b).into_iter().min_by(|&a, &c| {
        (z[a] - center)
            .abs()
            .partial_cmp(&(z[c] - center).abs())
            .unwrap_or(std::cmp::Ordering::Equal)
    })
}

/// Roll-off of the central peak of each component, `[ROPx, ROPy, ROPz]` in %.
pub fn roll_off_peaks(field: &dyn FieldSource, z: &[f64], x: &[f64], y: f64) -> [Vec<f64>; 3] {
    let reference = field.field_along_z(0.0, y, z);
    let mut out: [Vec<f64>; 3] = Default::default();

    for (c, column) in out.iter_mut().enumerate() {
        let Some(peak) = central_pole(z, &reference[c]) else {
            *column = vec![0.0; x.len()];
            continue;
        };
        let b0 = reference[c][peak];
        *column = x
            .iter()
            .map(|&xi| relative_percent(field.field(xi, y, z[peak])[c], b0))
            .collect();
    }

    out
}

/// Roll-off of the fundamental harmonic amplitude, `[ROAx, ROAy, ROAz]` in %.
///
/// `z` must be evenly spaced.
pub fn roll_off_amplitude(
    analyzer: &mut HarmonicAnalyzer,
    field: &dyn FieldSource,
    z: &[f64],
    x: &[f64],
    y: f64,
) -> [Vec<f64>; 3] {
    let step = if z.len() >= 2 { z[1] - z[0] } else { 0.0 };
    let mut amplitudes = |xi: f64| -> [f64; 3] {
        let profile = field.field_along_z(xi, y, z);
        std::array::from_fn(|c| {
            analyzer
                .fundamental(&profile[c], step)
                .map_or(0.0, |h| h.amplitude)
        })
    };

    let reference = amplitudes(0.0);
    let mut out: [Vec<f64>; 3] = std::array::from_fn(|_| Vec::with_capacity(x.len()));
    for &xi in x {
        let a = amplitudes(xi);
        for c in 0..3 {
            out[c].push(relative_percent(a[c], reference[c]));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::test_fields::Uniform;
    use std::f64::consts::PI;

    /// Vertical field with cosine transverse profile
    struct Profiled {
        kx: f64,
    }

    impl FieldSource for Profiled {
        fn field(&self, x: f64, _y: f64, z: f64) -> [f64; 3] {
            let kz = 2.0 * PI / 50.0;
            [0.0, (self.kx * x).cos() * (kz * z).cos(), 0.0]
        }
    }

    fn grid(start: f64, stop: f64, step: f64) -> Vec<f64> {
        let n = ((stop - start) / step).round() as usize;
        (0..=n).map(|i| start + i as f64 * step).collect()
    }

    #[test]
    fn test_peak_roll_off_follows_transverse_profile() {
        let field = Profiled { kx: 0.05 };
        let z = grid(-100.0, 100.0, 0.5);
        let x = grid(-10.0, 10.0, 1.0);
        let [rx, ry, rz] = roll_off_peaks(&field, &z, &x, 0.0);

        assert_eq!(ry.len(), x.len());
        assert!(rx.iter().all(|v| *v == 0.0));
        assert!(rz.iter().all(|v| *v == 0.0));
        assert!(ry[10].abs() < 1e-12);
        let expected = 100.0 * ((0.05f64 * 10.0).cos() - 1.0);
        assert!((ry[20] - expected).abs() < 1e-9);
    }

    #[test]
    fn test_amplitude_roll_off_follows_transverse_profile() {
        let field = Profiled { kx: 0.05 };
        let z = grid(-250.0, 249.0, 1.0);
        let x = vec![0.0, 5.0];
        let mut analyzer = HarmonicAnalyzer::default();
        let [_, ry, _] = roll_off_amplitude(&mut analyzer, &field, &z, &x, 0.0);

        assert!(ry[0].abs() < 1e-9);
        let expected = 100.0 * ((0.05f64 * 5.0).cos() - 1.0);
        assert!((ry[1] - expected).abs() < 1e-6);
    }

    #[test]
    fn test_uniform_field_has_no_peaks() {
        let z = grid(-10.0, 10.0, 1.0);
        let [_, ry, _] = roll_off_peaks(&Uniform([0.0, 1.0, 0.0]), &z, &[0.0, 1.0], 0.0);
        // A constant field has one "pole", the first sample
        assert!(ry.iter().all(|v| v.abs() < 1e-12));
    }
}
