//! Core data types for the ID analysis workbench
//!
//! This module defines the fundamental data structures shared by the
//! compute backend and the workbench core.
//!
//! # Main Types
//!
//! - [`Device`] - A loaded measurement or a parametric model
//! - [`AnalysisKind`] - The six analyses the engine can run
//! - [`AnalysisResult`] - Ordered label → vector/scalar mapping produced by an analysis
//! - [`FieldGrid`] - Raw M×6 measurement grid (X, Y, Z, Bx, By, Bz)

use serde::{Deserialize, Serialize};
use std::fmt;

/// Column header of a raw measurement grid
pub const GRID_HEADER: [&str; 6] = ["X[mm]", "Y[mm]", "Z[mm]", "Bx[T]", "By[T]", "Bz[T]"];

/// Handle to a device payload owned by the compute service
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PayloadId(pub u32);

impl fmt::Debug for PayloadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PayloadId({})", self.0)
    }
}

/// Origin of a device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeviceKind {
    /// Loaded from a measurement file
    Data,
    /// Synthesized from geometric parameters
    Model,
}

impl DeviceKind {
    pub fn display_name(&self) -> &'static str {
        match self {
            DeviceKind::Data => "Data",
            DeviceKind::Model => "Models",
        }
    }
}

/// Analyses the engine knows how to run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AnalysisKind {
    MagneticField,
    Trajectory,
    PhaseError,
    FieldIntegrals,
    RollOffPeaks,
    RollOffAmp,
}

impl AnalysisKind {
    /// Get display name
    pub fn display_name(&self) -> &'static str {
        match self {
            AnalysisKind::MagneticField => "Magnetic Field",
            AnalysisKind::Trajectory => "Trajectory",
            AnalysisKind::PhaseError => "Phase Error",
            AnalysisKind::FieldIntegrals => "Field Integrals",
            AnalysisKind::RollOffPeaks => "Roll Off Peaks",
            AnalysisKind::RollOffAmp => "Roll Off Amplitude",
        }
    }

    /// Get all analysis kinds
    pub fn all() -> &'static [AnalysisKind] {
        &[
            AnalysisKind::MagneticField,
            AnalysisKind::Trajectory,
            AnalysisKind::PhaseError,
            AnalysisKind::FieldIntegrals,
            AnalysisKind::RollOffPeaks,
            AnalysisKind::RollOffAmp,
        ]
    }

    /// Labels of the vector fields, in result order
    pub fn vector_labels(&self) -> &'static [&'static str] {
        match self {
            AnalysisKind::MagneticField => &["z", "Bx", "By", "Bz"],
            AnalysisKind::Trajectory => &["x", "y", "z", "x'", "y'", "z'"],
            AnalysisKind::PhaseError => &["z_poles", "PhaseErr"],
            AnalysisKind::FieldIntegrals => &["IBx", "IBy", "IBz", "IIBx", "IIBy", "IIBz"],
            AnalysisKind::RollOffPeaks => &["ROPx", "ROPy", "ROPz"],
            AnalysisKind::RollOffAmp => &["ROAx", "ROAy", "ROAz"],
        }
    }

    /// Labels of the scalar fields, in result order (after the vectors)
    pub fn scalar_labels(&self) -> &'static [&'static str] {
        match self {
            AnalysisKind::PhaseError => &["RMS", "Bx_amp", "By_amp", "K_h", "K_v"],
            AnalysisKind::FieldIntegrals => &[
                "IBx_end", "IBy_end", "IBz_end", "IIBx_end", "IIBy_end", "IIBz_end",
            ],
            _ => &[],
        }
    }

    /// Analysis whose cached result this one consumes
    pub fn prerequisite(&self) -> Option<AnalysisKind> {
        match self {
            AnalysisKind::PhaseError => Some(AnalysisKind::Trajectory),
            AnalysisKind::FieldIntegrals => Some(AnalysisKind::MagneticField),
            _ => None,
        }
    }
}

impl fmt::Display for AnalysisKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// A single field of an analysis result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FieldValue {
    Vector(Vec<f64>),
    Scalar(f64),
}

impl FieldValue {
    pub fn as_vector(&self) -> Option<&[f64]> {
        match self {
            FieldValue::Vector(v) => Some(v),
            FieldValue::Scalar(_) => None,
        }
    }

    pub fn as_scalar(&self) -> Option<f64> {
        match self {
            FieldValue::Scalar(s) => Some(*s),
            FieldValue::Vector(_) => None,
        }
    }

    pub fn is_vector(&self) -> bool {
        matches!(self, FieldValue::Vector(_))
    }
}

/// Named analysis of a device.
///
/// Fields keep insertion order; the explore tree mirrors that order leaf by
/// leaf.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub device_name: String,
    pub kind: AnalysisKind,
    fields: Vec<(String, FieldValue)>,
}

impl AnalysisResult {
    pub fn new(device_name: impl Into<String>, kind: AnalysisKind) -> Self {
        Self {
            device_name: device_name.into(),
            kind,
            fields: Vec::new(),
        }
    }

    /// Append a vector field (builder style)
    pub fn with_vector(mut self, label: impl Into<String>, values: Vec<f64>) -> Self {
        self.push(label, FieldValue::Vector(values));
        self
    }

    /// Append a scalar field (builder style)
    pub fn with_scalar(mut self, label: impl Into<String>, value: f64) -> Self {
        self.push(label, FieldValue::Scalar(value));
        self
    }

    /// Append a field, replacing an existing one with the same label in place
    pub fn push(&mut self, label: impl Into<String>, value: FieldValue) {
        let label = label.into();
        if let Some(slot) = self.fields.iter_mut().find(|(l, _)| *l == label) {
            slot.1 = value;
        } else {
            self.fields.push((label, value));
        }
    }

    pub fn get(&self, label: &str) -> Option<&FieldValue> {
        self.fields.iter().find(|(l, _)| l == label).map(|(_, v)| v)
    }

    pub fn vector(&self, label: &str) -> Option<&[f64]> {
        self.get(label).and_then(FieldValue::as_vector)
    }

    pub fn scalar(&self, label: &str) -> Option<f64> {
        self.get(label).and_then(FieldValue::as_scalar)
    }

    /// Field labels in order
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(l, _)| l.as_str())
    }

    /// Fields in order
    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(l, v)| (l.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub(crate) fn set_device_name(&mut self, name: &str) {
        self.device_name = name.to_string();
    }
}

/// Raw measurement grid: one `[X, Y, Z, Bx, By, Bz]` row per sample point
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldGrid {
    rows: Vec<[f64; 6]>,
}

impl FieldGrid {
    pub fn new(rows: Vec<[f64; 6]>) -> Self {
        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[[f64; 6]] {
        &self.rows
    }

    pub fn rows_mut(&mut self) -> &mut [[f64; 6]] {
        &mut self.rows
    }

    /// Copy of one column (0..6)
    pub fn column(&self, index: usize) -> Vec<f64> {
        self.rows.iter().map(|r| r[index]).collect()
    }

    /// All six columns
    pub fn columns(&self) -> Vec<Vec<f64>> {
        (0..6).map(|i| self.column(i)).collect()
    }
}

/// An insertion-device instance known to a project
#[derive(Debug, Clone)]
pub struct Device {
    /// Unique within a project
    pub name: String,
    pub kind: DeviceKind,
    /// Handle into the compute service
    pub payload: PayloadId,
    /// Present iff `kind == Data`
    pub raw_grid: Option<FieldGrid>,
}

impl Device {
    pub fn measured(payload: PayloadId, grid: FieldGrid) -> Self {
        Self {
            name: String::new(),
            kind: DeviceKind::Data,
            payload,
            raw_grid: Some(grid),
        }
    }

    pub fn model(payload: PayloadId) -> Self {
        Self {
            name: String::new(),
            kind: DeviceKind::Model,
            payload,
            raw_grid: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_preserves_field_order() {
        let result = AnalysisResult::new("meas1", AnalysisKind::PhaseError)
            .with_vector("z_poles", vec![1.0, 2.0])
            .with_vector("PhaseErr", vec![0.1, -0.1])
            .with_scalar("RMS", 0.1);

        let labels: Vec<_> = result.labels().collect();
        assert_eq!(labels, vec!["z_poles", "PhaseErr", "RMS"]);
        assert_eq!(result.vector("PhaseErr"), Some(&[0.1, -0.1][..]));
        assert_eq!(result.scalar("RMS"), Some(0.1));
        assert!(result.scalar("z_poles").is_none());
    }

    #[test]
    fn test_push_replaces_in_place() {
        let mut result = AnalysisResult::new("d", AnalysisKind::MagneticField)
            .with_vector("z", vec![0.0])
            .with_vector("Bx", vec![0.0]);
        result.push("z", FieldValue::Vector(vec![1.0, 2.0]));

        let labels: Vec<_> = result.labels().collect();
        assert_eq!(labels, vec!["z", "Bx"]);
        assert_eq!(result.vector("z").map(|v| v.len()), Some(2));
    }

    #[test]
    fn test_prerequisites() {
        assert_eq!(
            AnalysisKind::PhaseError.prerequisite(),
            Some(AnalysisKind::Trajectory)
        );
        assert_eq!(
            AnalysisKind::FieldIntegrals.prerequisite(),
            Some(AnalysisKind::MagneticField)
        );
        assert!(AnalysisKind::RollOffAmp.prerequisite().is_none());
    }

    #[test]
    fn test_grid_columns() {
        let grid = FieldGrid::new(vec![
            [0.0, 0.0, -1.0, 0.1, 0.2, 0.3],
            [0.0, 0.0, 1.0, 0.4, 0.5, 0.6],
        ]);
        assert_eq!(grid.column(2), vec![-1.0, 1.0]);
        assert_eq!(grid.columns().len(), 6);
    }
}
