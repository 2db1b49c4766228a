//! Analytic undulator models
//!
//! Each model is a pair of potential fields: a vertical part
//! (`By ~ cos(kx x) cosh(ky y) cos(kz z)`, `ky^2 = kx^2 + kz^2`) and a
//! horizontal part in quadrature (`Bx ~ cos(kx y) cosh(k'x x) sin(kz z)`,
//! `k'x^2 = kx^2 + kz^2`). Both are divergence and curl free inside the
//! core; a cosine envelope brings the field to zero over the last period at
//! each end.

use std::f64::consts::{FRAC_PI_4, PI};

use crate::analysis::FieldSource;
use crate::config::{ModelFamily, ModelParameters};
use crate::error::Result;

/// Halbach estimate of the peak on-axis field of a pure permanent-magnet array
pub fn halbach_peak_field(params: &ModelParameters) -> f64 {
    let k = 2.0 * PI / params.period;
    2.0 * params.remanence
        * (FRAC_PI_4.sin() / FRAC_PI_4)
        * (1.0 - (-k * params.block_height).exp())
        * (-k * params.gap / 2.0).exp()
}

/// Empirical peak field of a hybrid planar device, scaled from NdFeB at 1.24 T
pub fn hybrid_peak_field(params: &ModelParameters) -> f64 {
    let r = params.gap / params.period;
    3.694 * (-5.068 * r + 1.520 * r * r).exp() * params.remanence / 1.24
}

/// Analytic field of a parametric insertion device
#[derive(Debug, Clone, PartialEq)]
pub struct UndulatorModel {
    family: ModelFamily,
    params: ModelParameters,
    b0x: f64,
    b0y: f64,
    kz: f64,
    kx: f64,
    /// Vertical decay constant of the vertical part
    ky: f64,
    /// Horizontal decay constant of the horizontal part
    kxh: f64,
}

impl UndulatorModel {
    pub fn new(family: ModelFamily, params: &ModelParameters) -> Result<Self> {
        params.validate()?;

        let b0 = if family.is_pure_permanent_magnet() {
            halbach_peak_field(params)
        } else {
            hybrid_peak_field(params)
        };
        let (b0y, b0x) = if family.is_elliptical() {
            let angle = PI * params.phase / params.period;
            (b0 * angle.cos(), b0 * angle.sin())
        } else {
            (b0, 0.0)
        };

        let kz = 2.0 * PI / params.period;
        let kx = PI / (3.0 * params.block_width);
        let ky = (kx * kx + kz * kz).sqrt();

        tracing::debug!(
            "{} model: B0 = {:.3} T (Bx0 {:.3}, By0 {:.3}), length {} mm",
            family,
            b0,
            b0x,
            b0y,
            params.length()
        );

        Ok(Self {
            family,
            params: *params,
            b0x,
            b0y,
            kz,
            kx,
            ky,
            kxh: ky,
        })
    }

    pub fn family(&self) -> ModelFamily {
        self.family
    }

    pub fn parameters(&self) -> &ModelParameters {
        &self.params
    }

    /// Peak amplitudes `(Bx0, By0)` in the core (T)
    pub fn peak_fields(&self) -> (f64, f64) {
        (self.b0x, self.b0y)
    }

    fn envelope(&self, z: f64) -> f64 {
        let period = self.params.period;
        let flat = self.params.length() / 2.0 - period / 2.0;
        let d = z.abs() - flat;
        if d <= 0.0 {
            1.0
        } else if d >= period {
            0.0
        } else {
            0.5 * (1.0 + (PI * d / period).cos())
        }
    }
}

impl FieldSource for UndulatorModel {
    fn field(&self, x: f64, y: f64, z: f64) -> [f64; 3] {
        let envelope = self.envelope(z);
        if envelope == 0.0 {
            return [0.0; 3];
        }
        let (sz, cz) = (self.kz * z).sin_cos();

        let mut b = [0.0; 3];
        if self.b0y != 0.0 {
            let (sx, cx) = (self.kx * x).sin_cos();
            let (shy, chy) = ((self.ky * y).sinh(), (self.ky * y).cosh());
            b[0] -= self.b0y * (self.kx / self.ky) * sx * shy * cz;
            b[1] += self.b0y * cx * chy * cz;
            b[2] -= self.b0y * (self.kz / self.ky) * cx * shy * sz;
        }
        if self.b0x != 0.0 {
            let (sy, cy) = (self.kx * y).sin_cos();
            let (shx, chx) = ((self.kxh * x).sinh(), (self.kxh * x).cosh());
            b[0] += self.b0x * cy * chx * sz;
            b[1] -= self.b0x * (self.kx / self.kxh) * sy * shx * sz;
            b[2] += self.b0x * (self.kz / self.kxh) * cy * shx * cz;
        }

        b.map(|v| v * envelope)
    }
}
