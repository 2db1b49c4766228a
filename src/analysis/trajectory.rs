//! Electron trajectory through a magnetic field
//!
//! Integrates `dr/ds = t`, `dt/ds = -(1/Brho) t x B` with a classic
//! fourth-order Runge-Kutta scheme, where `t = (x', y', z')` is the unit
//! tangent. Positions are in mm, angles in rad, fields in T.

use crate::error::{Result, WorkbenchError};

use super::{FieldSource, RIGIDITY_PER_GEV};

/// Upper bound on integration steps, guards against degenerate inputs
const MAX_STEPS: usize = 10_000_000;

/// Inputs of a trajectory integration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrajectoryConfig {
    pub energy_gev: f64,
    /// `(x, y, z, x', y', z')`
    pub initial: [f64; 6],
    pub z_max: f64,
    pub step: f64,
}

/// Sampled trajectory, one entry per RK step
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Trajectory {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub z: Vec<f64>,
    pub xp: Vec<f64>,
    pub yp: Vec<f64>,
    pub zp: Vec<f64>,
}

impl Trajectory {
    fn push(&mut self, s: &[f64; 6]) {
        self.x.push(s[0]);
        self.y.push(s[1]);
        self.z.push(s[2]);
        self.xp.push(s[3]);
        self.yp.push(s[4]);
        self.zp.push(s[5]);
    }

    pub fn len(&self) -> usize {
        self.z.len()
    }

    pub fn is_empty(&self) -> bool {
        self.z.is_empty()
    }

    /// Columns in `x, y, z, x', y', z'` order
    pub fn into_columns(self) -> Vec<Vec<f64>> {
        vec![self.x, self.y, self.z, self.xp, self.yp, self.zp]
    }

    /// Rebuild from columns in `x, y, z, x', y', z'` order
    pub fn from_columns(columns: [&[f64]; 6]) -> Self {
        Self {
            x: columns[0].to_vec(),
            y: columns[1].to_vec(),
            z: columns[2].to_vec(),
            xp: columns[3].to_vec(),
            yp: columns[4].to_vec(),
            zp: columns[5].to_vec(),
        }
    }
}

fn derivative(field: &dyn FieldSource, s: &[f64; 6], inv_rho: f64) -> [f64; 6] {
    let [bx, by, bz] = field.field(s[0], s[1], s[2]);
    let (tx, ty, tz) = (s[3], s[4], s[5]);
    [
        tx,
        ty,
        tz,
        -inv_rho * (ty * bz - tz * by),
        -inv_rho * (tz * bx - tx * bz),
        -inv_rho * (tx * by - ty * bx),
    ]
}

fn advance(s: &[f64; 6], k: &[f64; 6], h: f64) -> [f64; 6] {
    std::array::from_fn(|i| s[i] + h * k[i])
}

/// Integrate the trajectory from `config.initial` until `z >= config.z_max`.
pub fn integrate(field: &dyn FieldSource, config: &TrajectoryConfig) -> Result<Trajectory> {
    if !(config.energy_gev > 0.0) || !(config.step > 0.0) {
        return Err(WorkbenchError::Compute(
            "trajectory needs positive energy and step".to_string(),
        ));
    }
    if config.initial[5] <= 0.0 {
        return Err(WorkbenchError::Compute(
            "trajectory must start moving towards +z".to_string(),
        ));
    }

    // Brho in T mm
    let inv_rho = 1.0 / (RIGIDITY_PER_GEV * config.energy_gev * 1000.0);
    let h = config.step;

    let norm = (config.initial[3].powi(2) + config.initial[4].powi(2) + config.initial[5].powi(2))
        .sqrt();
    let mut s = config.initial;
    for v in &mut s[3..] {
        *v /= norm;
    }

    let mut trajectory = Trajectory::default();
    trajectory.push(&s);

    let mut steps = 0usize;
    while s[2] < config.z_max {
        let k1 = derivative(field, &s, inv_rho);
        let k2 = derivative(field, &advance(&s, &k1, h / 2.0), inv_rho);
        let k3 = derivative(field, &advance(&s, &k2, h / 2.0), inv_rho);
        let k4 = derivative(field, &advance(&s, &k3, h), inv_rho);
        s = std::array::from_fn(|i| s[i] + h / 6.0 * (k1[i] + 2.0 * k2[i] + 2.0 * k3[i] + k4[i]));
        trajectory.push(&s);

        steps += 1;
        if steps >= MAX_STEPS || s[5] <= 0.0 {
            return Err(WorkbenchError::Compute(format!(
                "trajectory did not reach z = {} mm",
                config.z_max
            )));
        }
    }

    Ok(trajectory)
}
