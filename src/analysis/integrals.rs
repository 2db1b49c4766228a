//! First and second field integrals along z
//!
//! First integrals are reported in G cm, second integrals in kG cm^2.

/// 1 T mm expressed in G cm
const T_MM_TO_G_CM: f64 = 1.0e3;

/// 1 T mm^2 expressed in kG cm^2
const T_MM2_TO_KG_CM2: f64 = 0.1;

/// Running trapezoidal integral of `y` over `x`, starting at zero
pub fn cumulative_trapezoid(x: &[f64], y: &[f64]) -> Vec<f64> {
    let n = x.len().min(y.len());
    let mut out = Vec::with_capacity(n);
    if n == 0 {
        return out;
    }
    let mut acc = 0.0;
    out.push(acc);
    for i in 1..n {
        acc += 0.5 * (y[i] + y[i - 1]) * (x[i] - x[i - 1]);
        out.push(acc);
    }
    out
}

/// Cumulative first and second integrals of the three field components
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldIntegrals {
    /// `IBx, IBy, IBz` (G cm)
    pub first: [Vec<f64>; 3],
    /// `IIBx, IIBy, IIBz` (kG cm^2)
    pub second: [Vec<f64>; 3],
}

impl FieldIntegrals {
    /// Integrate field components `[Bx, By, Bz]` (T) sampled at `z` (mm)
    pub fn compute(z: &[f64], field: [&[f64]; 3]) -> Self {
        let mut first: [Vec<f64>; 3] = Default::default();
        let mut second: [Vec<f64>; 3] = Default::default();
        for (i, b) in field.iter().enumerate() {
            let ib = cumulative_trapezoid(z, b);
            let iib = cumulative_trapezoid(z, &ib);
            first[i] = ib.iter().map(|v| v * T_MM_TO_G_CM).collect();
            second[i] = iib.iter().map(|v| v * T_MM2_TO_KG_CM2).collect();
        }
        Self { first, second }
    }

    /// Columns in `IBx, IBy, IBz, IIBx, IIBy, IIBz` order
    pub fn into_columns(self) -> Vec<Vec<f64>> {
        let [a, b, c] = self.first;
        let [d, e, f] = self.second;
        vec![a, b, c, d, e, f]
    }
}
