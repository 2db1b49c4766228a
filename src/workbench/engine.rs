//! Analysis engine
//!
//! Binds devices to cached analyses. Each request reads the device name from
//! its tree node, consults the cache, calls the compute service on a miss and
//! then stores the result and mirrors it into the tree. Nothing is stored or
//! inserted unless the computation succeeded.

use crate::backend::{
    AngleCorrection, ComputeOutput, CrossTalkCoefficients, DeviceComputeService,
    FieldIntegralInputs, MagneticFieldInputs, PhaseErrorInputs, RollOffInputs, TrajectoryInputs,
};
use crate::config::AnalysisParameters;
use crate::error::{Result, WorkbenchError};
use crate::types::{AnalysisKind, AnalysisResult, DeviceKind, FieldValue, PayloadId};

use super::cache::AnalysisCache;
use super::explore_tree::{ExploreTree, ItemKind};
use super::host::UiHost;
use super::id::NodeId;
use super::registry::{DeviceRegistry, RenameHook};
use super::toolbar::ChecklistItem;

/// Suffix marking a cross-talk corrected device
pub const CROSS_TALK_SUFFIX: &str = " C";

/// Probe misalignment of the Hall bench (deg)
pub const CROSS_TALK_ANGLES: AngleCorrection = AngleCorrection {
    xy: 0.15,
    xz: -0.21,
    yx: -0.01,
    yz: -0.02,
    zx: 0.01,
    zy: -0.74,
};

pub const CROSS_TALK_COEFFICIENTS: CrossTalkCoefficients = CrossTalkCoefficients {
    ky: [
        -0.006781104386361973,
        -0.01675247563602003,
        7.568631573320983e-06,
    ],
    kz: [
        -0.006170829583118335,
        -0.016051627320478382,
        7.886674928668737e-06,
    ],
};

/// How a request for an already cached pair is handled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DuplicatePolicy {
    /// Emit an `AlreadyComputed` warning
    Warn,
    /// Skip quietly (apply-for-all)
    Silent,
}

/// Result of a single engine request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// New analysis node, or the renamed device node for cross-talk
    Computed(NodeId),
    Skipped,
    Failed,
}

/// Everything one engine request touches
pub struct AnalysisContext<'a> {
    pub registry: &'a mut DeviceRegistry,
    pub cache: &'a mut AnalysisCache,
    pub tree: &'a mut ExploreTree,
    pub service: &'a mut dyn DeviceComputeService,
    pub host: &'a mut dyn UiHost,
}

/// Unit suffix of a scalar leaf
pub fn scalar_unit(label: &str) -> &'static str {
    match label {
        "RMS" => "deg",
        "Bx_amp" | "By_amp" => "T",
        "IBx_end" | "IBy_end" | "IBz_end" => "G.cm",
        "IIBx_end" | "IIBy_end" | "IIBz_end" => "kG.cm2",
        _ => "",
    }
}

/// Second-column text of each result leaf, in field order
pub fn leaf_annotations(result: &AnalysisResult) -> Vec<(String, String)> {
    result
        .fields()
        .map(|(label, value)| {
            let annotation = match value {
                FieldValue::Vector(_) => "List".to_string(),
                FieldValue::Scalar(v) => match scalar_unit(label) {
                    "" => format!("{:.1}", v),
                    unit => format!("{:.1} {}", v, unit),
                },
            };
            (label.to_string(), annotation)
        })
        .collect()
}

/// Label the service output, checking its shape against the analysis kind
pub fn assemble(kind: AnalysisKind, device: &str, output: ComputeOutput) -> Result<AnalysisResult> {
    let vectors = kind.vector_labels();
    let scalar_labels = kind.scalar_labels();
    if output.columns.len() != vectors.len() {
        return Err(WorkbenchError::Compute(format!(
            "{} returned {} columns, expected {}",
            kind,
            output.columns.len(),
            vectors.len()
        )));
    }

    if let Some(expected) = output.columns.first().map(Vec::len) {
        if let Some((label, column)) = vectors
            .iter()
            .zip(&output.columns)
            .find(|(_, column)| column.len() != expected)
        {
            return Err(WorkbenchError::Compute(format!(
                "{} column '{}' has {} values, expected {}",
                kind,
                label,
                column.len(),
                expected
            )));
        }
    }

    let scalars = if kind == AnalysisKind::FieldIntegrals {
        if !output.scalars.is_empty() {
            return Err(WorkbenchError::Compute(format!(
                "{} scalars are taken from the columns, got {} extra",
                kind,
                output.scalars.len()
            )));
        }
        output
            .columns
            .iter()
            .map(|c| c.last().copied().unwrap_or(0.0))
            .collect()
    } else {
        output.scalars
    };
    if scalars.len() != scalar_labels.len() {
        return Err(WorkbenchError::Compute(format!(
            "{} returned {} scalars, expected {}",
            kind,
            scalars.len(),
            scalar_labels.len()
        )));
    }

    let mut result = AnalysisResult::new(device, kind);
    for (label, column) in vectors.iter().zip(output.columns) {
        result.push(*label, FieldValue::Vector(column));
    }
    for (label, value) in scalar_labels.iter().zip(scalars) {
        result.push(*label, FieldValue::Scalar(value));
    }
    Ok(result)
}

#[derive(Debug, Clone, Default)]
pub struct AnalysisEngine {
    params: AnalysisParameters,
}

impl AnalysisEngine {
    pub fn new(params: AnalysisParameters) -> Self {
        Self { params }
    }

    pub fn parameters(&self) -> &AnalysisParameters {
        &self.params
    }

    /// Replace the parameter set. Cached results are kept as they are.
    pub fn set_parameters(&mut self, params: AnalysisParameters) -> Result<()> {
        params.validate()?;
        self.params = params;
        Ok(())
    }

    fn device_name(ctx: &AnalysisContext<'_>, node: NodeId) -> Result<(String, ItemKind)> {
        let n = ctx
            .tree
            .get(node)
            .ok_or_else(|| WorkbenchError::UnknownDevice(node.to_string()))?;
        match n.node_type.item() {
            Some(item) if item.is_device() => Ok((n.label.clone(), item)),
            _ => Err(WorkbenchError::UnknownDevice(n.label.clone())),
        }
    }

    fn run(
        &self,
        ctx: &mut AnalysisContext<'_>,
        kind: AnalysisKind,
        name: &str,
    ) -> Result<ComputeOutput> {
        let payload = ctx.registry.get(name)?.payload;
        let p = &self.params;

        let prerequisite = match kind.prerequisite() {
            Some(required) => Some(ctx.cache.get(required, name).ok_or_else(|| {
                WorkbenchError::MissingDependency {
                    analysis: kind,
                    requires: required,
                    device: name.to_string(),
                }
            })?),
            None => None,
        };

        let service = &mut *ctx.service;
        match (kind, prerequisite) {
            (AnalysisKind::MagneticField, _) => service.magnetic_field(
                payload,
                &MagneticFieldInputs {
                    z: p.z_grid,
                    x: 0.0,
                    y: 0.0,
                },
            ),
            (AnalysisKind::Trajectory, _) => service.trajectory(
                payload,
                &TrajectoryInputs {
                    energy_gev: p.energy_gev,
                    initial: p.initial_state,
                    z_max: p.z_max,
                    rk_step: p.rk_step,
                },
            ),
            (AnalysisKind::PhaseError, Some(trajectory)) => service.phase_error(
                payload,
                &PhaseErrorInputs {
                    energy_gev: p.energy_gev,
                    skip_poles: p.skip_poles,
                },
                trajectory,
            ),
            (AnalysisKind::FieldIntegrals, Some(field)) => service.field_integrals(
                payload,
                &FieldIntegralInputs {
                    z: p.z_grid,
                    x: 0.0,
                    y: 0.0,
                },
                field,
            ),
            (AnalysisKind::RollOffPeaks, _) => service.roll_off_peaks(
                payload,
                &RollOffInputs {
                    z: p.z_grid,
                    x: p.x_grid,
                    y: 0.0,
                },
            ),
            (AnalysisKind::RollOffAmp, _) => service.roll_off_amp(
                payload,
                &RollOffInputs {
                    z: p.z_grid,
                    x: p.x_grid,
                    y: 0.0,
                },
            ),
            // Prerequisite lookups above return early when missing
            (AnalysisKind::PhaseError | AnalysisKind::FieldIntegrals, None) => {
                Err(WorkbenchError::Compute(format!("{} has no input", kind)))
            }
        }
    }

    fn try_compute(
        &self,
        ctx: &mut AnalysisContext<'_>,
        device_node: NodeId,
        kind: AnalysisKind,
        policy: DuplicatePolicy,
    ) -> Result<Outcome> {
        let (name, _) = Self::device_name(ctx, device_node)?;

        if ctx.cache.has(kind, &name) {
            tracing::debug!("{} of '{}' already cached", kind, name);
            return match policy {
                DuplicatePolicy::Warn => Err(WorkbenchError::AlreadyComputed {
                    analysis: kind.display_name().to_string(),
                    device: name,
                }),
                DuplicatePolicy::Silent => Ok(Outcome::Skipped),
            };
        }

        tracing::debug!("Computing {} of '{}'", kind, name);
        let output = self.run(ctx, kind, &name)?;
        let result = assemble(kind, &name, output)?;
        let leaves = leaf_annotations(&result);

        ctx.cache.put(kind, &name, result)?;
        let node = ctx.tree.add_analysis_subtree(device_node, kind, &leaves);
        Ok(Outcome::Computed(node))
    }

    /// Compute `kind` for the device at `device_node`, reporting any error.
    pub fn compute(
        &self,
        ctx: &mut AnalysisContext<'_>,
        device_node: NodeId,
        kind: AnalysisKind,
        policy: DuplicatePolicy,
    ) -> Outcome {
        match self.try_compute(ctx, device_node, kind, policy) {
            Ok(outcome) => outcome,
            Err(err) => {
                ctx.host.report(&err);
                Outcome::Failed
            }
        }
    }

    pub fn compute_magnetic_field(&self, ctx: &mut AnalysisContext<'_>, node: NodeId) -> Outcome {
        self.compute(ctx, node, AnalysisKind::MagneticField, DuplicatePolicy::Warn)
    }

    pub fn compute_trajectory(&self, ctx: &mut AnalysisContext<'_>, node: NodeId) -> Outcome {
        self.compute(ctx, node, AnalysisKind::Trajectory, DuplicatePolicy::Warn)
    }

    pub fn compute_phase_error(&self, ctx: &mut AnalysisContext<'_>, node: NodeId) -> Outcome {
        self.compute(ctx, node, AnalysisKind::PhaseError, DuplicatePolicy::Warn)
    }

    pub fn compute_field_integrals(&self, ctx: &mut AnalysisContext<'_>, node: NodeId) -> Outcome {
        self.compute(ctx, node, AnalysisKind::FieldIntegrals, DuplicatePolicy::Warn)
    }

    pub fn compute_roll_off_peaks(&self, ctx: &mut AnalysisContext<'_>, node: NodeId) -> Outcome {
        self.compute(ctx, node, AnalysisKind::RollOffPeaks, DuplicatePolicy::Warn)
    }

    pub fn compute_roll_off_amp(&self, ctx: &mut AnalysisContext<'_>, node: NodeId) -> Outcome {
        self.compute(ctx, node, AnalysisKind::RollOffAmp, DuplicatePolicy::Warn)
    }

    fn try_correct_crosstalk(
        &self,
        ctx: &mut AnalysisContext<'_>,
        device_node: NodeId,
        policy: DuplicatePolicy,
    ) -> Result<Outcome> {
        let (name, item) = Self::device_name(ctx, device_node)?;
        if item == ItemKind::Model {
            return Err(WorkbenchError::NotImplemented(
                "Cross-talk correction of model devices".to_string(),
            ));
        }
        if name.ends_with(CROSS_TALK_SUFFIX) {
            return match policy {
                DuplicatePolicy::Warn => Err(WorkbenchError::AlreadyComputed {
                    analysis: ChecklistItem::CrossTalk.display_name().to_string(),
                    device: name,
                }),
                DuplicatePolicy::Silent => Ok(Outcome::Skipped),
            };
        }

        let new_name = format!("{}{}", name, CROSS_TALK_SUFFIX);
        ctx.registry
            .check_rename(&name, &new_name, &[&*ctx.cache as &dyn RenameHook])?;

        let payload = ctx.registry.get(&name)?.payload;
        let snapshot = ctx.service.raw_grid(payload);
        if let Err(err) = Self::run_corrections(ctx, payload) {
            // A half-corrected payload must not survive under the old name
            if let Some(grid) = snapshot {
                if let Err(restore) = ctx.service.restore_grid(payload, grid) {
                    tracing::warn!("Failed to restore '{}' after correction error: {}", name, restore);
                }
            }
            return Err(err);
        }
        let grid = ctx.service.raw_grid(payload);

        ctx.registry.get_mut(&name)?.raw_grid = grid;
        ctx.registry
            .rename(&name, &new_name, &mut [&mut *ctx.cache as &mut dyn RenameHook])?;
        ctx.tree.set_label(device_node, &new_name);
        Ok(Outcome::Computed(device_node))
    }

    fn run_corrections(ctx: &mut AnalysisContext<'_>, payload: PayloadId) -> Result<()> {
        ctx.service.correct_angles(payload, &CROSS_TALK_ANGLES)?;
        ctx.service
            .correct_cross_talk(payload, &CROSS_TALK_COEFFICIENTS)
    }

    /// Correct probe angles and cross-talk, then rename the device to `"<name> C"`.
    pub fn correct_crosstalk(
        &self,
        ctx: &mut AnalysisContext<'_>,
        device_node: NodeId,
        policy: DuplicatePolicy,
    ) -> Outcome {
        match self.try_correct_crosstalk(ctx, device_node, policy) {
            Ok(outcome) => outcome,
            Err(err) => {
                ctx.host.report(&err);
                Outcome::Failed
            }
        }
    }

    /// Run every item of `items` on one device, in execution order.
    pub fn apply(
        &self,
        ctx: &mut AnalysisContext<'_>,
        device_node: NodeId,
        items: &[ChecklistItem],
        policy: DuplicatePolicy,
    ) -> Vec<(ChecklistItem, Outcome)> {
        let mut outcomes = Vec::new();
        for &item in ChecklistItem::execution_order() {
            if !items.contains(&item) {
                continue;
            }
            let outcome = match item {
                ChecklistItem::CrossTalk => self.correct_crosstalk(ctx, device_node, policy),
                ChecklistItem::Shimming => {
                    ctx.host
                        .report(&WorkbenchError::NotImplemented("Shimming".to_string()));
                    Outcome::Failed
                }
                other => match other.analysis_kind() {
                    Some(kind) => self.compute(ctx, device_node, kind, policy),
                    None => Outcome::Skipped,
                },
            };
            outcomes.push((item, outcome));
        }
        outcomes
    }

    /// Apply `items` to every device of the Data container, skipping cached pairs quietly.
    pub fn apply_for_all(
        &self,
        ctx: &mut AnalysisContext<'_>,
        items: &[ChecklistItem],
    ) -> Vec<(ChecklistItem, Outcome)> {
        let devices: Vec<NodeId> = ctx.tree.devices(DeviceKind::Data).map(|n| n.id).collect();
        tracing::debug!("Apply for all: {} devices, {:?}", devices.len(), items);
        devices
            .into_iter()
            .flat_map(|node| self.apply(ctx, node, items, DuplicatePolicy::Silent))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_annotations() {
        let result = AnalysisResult::new("meas1", AnalysisKind::PhaseError)
            .with_vector("z_poles", vec![1.0])
            .with_scalar("RMS", 2.345)
            .with_scalar("K_h", 2.04);
        let leaves = leaf_annotations(&result);
        assert_eq!(leaves[0], ("z_poles".to_string(), "List".to_string()));
        assert_eq!(leaves[1], ("RMS".to_string(), "2.3 deg".to_string()));
        assert_eq!(leaves[2], ("K_h".to_string(), "2.0".to_string()));
    }

    #[test]
    fn test_assemble_integrals_adds_terminal_values() {
        let columns = (0..6).map(|i| vec![0.0, i as f64]).collect();
        let result = assemble(
            AnalysisKind::FieldIntegrals,
            "meas1",
            ComputeOutput::new(columns),
        )
        .unwrap();
        assert_eq!(result.len(), 12);
        assert_eq!(result.scalar("IBy_end"), Some(1.0));
        assert_eq!(result.scalar("IIBz_end"), Some(5.0));
    }

    #[test]
    fn test_assemble_rejects_wrong_shape() {
        let err = assemble(
            AnalysisKind::MagneticField,
            "meas1",
            ComputeOutput::new(vec![vec![0.0]]),
        )
        .unwrap_err();
        assert!(matches!(err, WorkbenchError::Compute(_)));

        let err = assemble(
            AnalysisKind::PhaseError,
            "meas1",
            ComputeOutput::new(vec![vec![], vec![]]),
        )
        .unwrap_err();
        assert!(matches!(err, WorkbenchError::Compute(_)));
    }

    #[test]
    fn test_assemble_rejects_ragged_columns() {
        let columns = vec![vec![0.0; 3], vec![0.0; 1], vec![], vec![0.0; 2]];
        let err = assemble(AnalysisKind::MagneticField, "meas1", ComputeOutput::new(columns))
            .unwrap_err();
        match err {
            WorkbenchError::Compute(message) => assert!(message.contains("'Bx'"), "{}", message),
            other => panic!("unexpected {:?}", other),
        }

        // Equal lengths pass, empty columns included
        let columns = vec![vec![]; 4];
        assert!(assemble(AnalysisKind::MagneticField, "meas1", ComputeOutput::new(columns)).is_ok());
    }

    #[test]
    fn test_assemble_rejects_scalars_for_integrals() {
        let columns = vec![vec![0.0, 1.0]; 6];
        let output = ComputeOutput::new(columns).with_scalars(vec![9.0; 6]);
        let err = assemble(AnalysisKind::FieldIntegrals, "meas1", output).unwrap_err();
        assert!(matches!(err, WorkbenchError::Compute(_)));
    }

    #[test]
    fn test_parameters_are_validated() {
        let mut engine = AnalysisEngine::default();
        let mut params = AnalysisParameters::default();
        params.energy_gev = -1.0;
        assert!(engine.set_parameters(params).is_err());
        assert_eq!(engine.parameters().energy_gev, 3.0);
    }
}
