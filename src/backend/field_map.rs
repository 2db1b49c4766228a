//! Measured field maps
//!
//! A `.dat` file holds one sample per line, `X Y Z Bx By Bz` in mm and T,
//! separated by whitespace, tabs or commas. Lines that do not start with a
//! number (headers, comments) are skipped.
//!
//! [`FieldMap`] rebuilds the rectilinear grid behind the rows and evaluates
//! the field anywhere inside it by trilinear interpolation.

use std::path::Path;

use crate::analysis::FieldSource;
use crate::error::{Result, ResultExt, WorkbenchError};
use crate::types::FieldGrid;

/// Coordinates closer than this are the same grid line (mm)
const AXIS_TOLERANCE: f64 = 1e-6;

fn is_separator(c: char) -> bool {
    c.is_whitespace() || c == ','
}

fn starts_numeric(line: &str) -> bool {
    matches!(
        line.trim_start().chars().next(),
        Some(c) if c.is_ascii_digit() || c == '-' || c == '+' || c == '.'
    )
}

/// Parse the contents of a `.dat` file
pub fn parse_dat(contents: &str) -> Result<FieldGrid> {
    let mut rows = Vec::new();
    for (index, line) in contents.lines().enumerate() {
        if !starts_numeric(line) {
            continue;
        }
        let values: Vec<&str> = line.split(is_separator).filter(|s| !s.is_empty()).collect();
        if values.len() != 6 {
            return Err(WorkbenchError::Parse(format!(
                "line {}: expected 6 columns, found {}",
                index + 1,
                values.len()
            )));
        }
        let mut row = [0.0; 6];
        for (slot, text) in row.iter_mut().zip(&values) {
            *slot = text.parse::<f64>().map_err(|e| {
                WorkbenchError::Parse(format!("line {}: '{}': {}", index + 1, text, e))
            })?;
        }
        rows.push(row);
    }

    if rows.is_empty() {
        return Err(WorkbenchError::Parse("no data rows found".to_string()));
    }
    Ok(FieldGrid::new(rows))
}

/// Read and parse a `.dat` file from disk
pub fn load_dat(path: &Path) -> Result<FieldGrid> {
    let contents = std::fs::read_to_string(path)
        .map_err(WorkbenchError::from)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    parse_dat(&contents).with_context(|| format!("Failed to parse {}", path.display()))
}

fn unique_sorted(mut values: Vec<f64>) -> Vec<f64> {
    values.sort_by(|a, b| a.total_cmp(b));
    values.dedup_by(|a, b| (*a - *b).abs() < AXIS_TOLERANCE);
    values
}

fn index_on(axis: &[f64], value: f64) -> Option<usize> {
    let i = axis.partition_point(|a| *a < value - AXIS_TOLERANCE);
    (i < axis.len() && (axis[i] - value).abs() < AXIS_TOLERANCE).then_some(i)
}

/// Bracketing indices and weight of `value` on `axis`, `None` outside
fn bracket(axis: &[f64], value: f64) -> Option<(usize, usize, f64)> {
    let (first, last) = (axis[0], axis[axis.len() - 1]);
    if axis.len() == 1 {
        return Some((0, 0, 0.0));
    }
    if value < first - AXIS_TOLERANCE || value > last + AXIS_TOLERANCE {
        return None;
    }
    let upper = axis.partition_point(|a| *a < value).clamp(1, axis.len() - 1);
    let lower = upper - 1;
    let t = ((value - axis[lower]) / (axis[upper] - axis[lower])).clamp(0.0, 1.0);
    Some((lower, upper, t))
}

/// Interpolating view of a complete rectilinear grid
#[derive(Debug, Clone)]
pub struct FieldMap {
    x: Vec<f64>,
    y: Vec<f64>,
    z: Vec<f64>,
    /// Indexed `[(ix * ny + iy) * nz + iz]`
    values: Vec<[f64; 3]>,
}

impl FieldMap {
    /// Build from raw rows; every `(x, y, z)` combination must be present once.
    pub fn from_grid(grid: &FieldGrid) -> Result<Self> {
        if grid.is_empty() {
            return Err(WorkbenchError::Parse("empty field grid".to_string()));
        }
        let x = unique_sorted(grid.column(0));
        let y = unique_sorted(grid.column(1));
        let z = unique_sorted(grid.column(2));
        let expected = x.len() * y.len() * z.len();
        if expected != grid.len() {
            return Err(WorkbenchError::Parse(format!(
                "grid is not rectilinear: {} x {} x {} axes but {} rows",
                x.len(),
                y.len(),
                z.len(),
                grid.len()
            )));
        }

        let mut values = vec![[0.0; 3]; expected];
        let mut filled = vec![false; expected];
        for row in grid.rows() {
            // Every coordinate came from the axes, lookups cannot miss
            let (Some(ix), Some(iy), Some(iz)) =
                (index_on(&x, row[0]), index_on(&y, row[1]), index_on(&z, row[2]))
            else {
                return Err(WorkbenchError::Parse("grid axis lookup failed".to_string()));
            };
            let slot = (ix * y.len() + iy) * z.len() + iz;
            if filled[slot] {
                return Err(WorkbenchError::Parse(format!(
                    "duplicate sample at ({}, {}, {})",
                    row[0], row[1], row[2]
                )));
            }
            filled[slot] = true;
            values[slot] = [row[3], row[4], row[5]];
        }

        tracing::debug!(
            "Field map {} x {} x {} (z {}..{} mm)",
            x.len(),
            y.len(),
            z.len(),
            z[0],
            z[z.len() - 1]
        );

        Ok(Self { x, y, z, values })
    }

    fn at(&self, ix: usize, iy: usize, iz: usize) -> [f64; 3] {
        self.values[(ix * self.y.len() + iy) * self.z.len() + iz]
    }

    /// Axial sample positions (mm)
    pub fn z_axis(&self) -> &[f64] {
        &self.z
    }

    /// Transverse x sample positions (mm)
    pub fn x_axis(&self) -> &[f64] {
        &self.x
    }
}

impl FieldSource for FieldMap {
    fn field(&self, x: f64, y: f64, z: f64) -> [f64; 3] {
        let (Some((x0, x1, tx)), Some((y0, y1, ty)), Some((z0, z1, tz))) =
            (bracket(&self.x, x), bracket(&self.y, y), bracket(&self.z, z))
        else {
            return [0.0; 3];
        };

        let lerp = |a: [f64; 3], b: [f64; 3], t: f64| -> [f64; 3] {
            std::array::from_fn(|i| a[i] + (b[i] - a[i]) * t)
        };
        let c00 = lerp(self.at(x0, y0, z0), self.at(x1, y0, z0), tx);
        let c10 = lerp(self.at(x0, y1, z0), self.at(x1, y1, z0), tx);
        let c01 = lerp(self.at(x0, y0, z1), self.at(x1, y0, z1), tx);
        let c11 = lerp(self.at(x0, y1, z1), self.at(x1, y1, z1), tx);
        let c0 = lerp(c00, c10, ty);
        let c1 = lerp(c01, c11, ty);
        lerp(c0, c1, tz)
    }
}
