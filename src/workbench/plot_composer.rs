//! Plot composer
//!
//! Turns tree clicks into charts. Pairwise and multicurve plotting both need
//! two successive leaf selections (abscissa, then ordinate); that state lives
//! in [`PairSelection`]. Multicurve overlays every completed pair on one
//! shared chart until the mode changes or the Plot button is released.

use serde::{Deserialize, Serialize};

use crate::error::{Result, WorkbenchError};
use crate::types::AnalysisKind;

use super::cache::AnalysisCache;
use super::explore_tree::{ExploreTree, ItemKind, NodeType};
use super::id::{NodeId, TabId};
use super::visuals::{VisualContent, Visuals};

/// Actions of the Plot button
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PlotMode {
    #[default]
    Single,
    Pairwise,
    Multicurve,
    PairwiseFromTable,
}

impl PlotMode {
    pub fn display_name(&self) -> &'static str {
        match self {
            PlotMode::Single => "Single",
            PlotMode::Pairwise => "Pairwise",
            PlotMode::Multicurve => "Multicurve",
            PlotMode::PairwiseFromTable => "Pairwise from table",
        }
    }

    pub fn all() -> &'static [PlotMode] {
        &[
            PlotMode::Single,
            PlotMode::Pairwise,
            PlotMode::Multicurve,
            PlotMode::PairwiseFromTable,
        ]
    }

    /// Whether result-leaf clicks feed the pair selection
    pub fn takes_leaf_selection(&self) -> bool {
        matches!(self, PlotMode::Pairwise | PlotMode::Multicurve)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Curve {
    pub label: String,
    pub points: Vec<[f64; 2]>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chart {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub grid: bool,
    pub curves: Vec<Curve>,
}

impl Chart {
    pub fn new(title: impl Into<String>, x_label: impl Into<String>, y_label: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            x_label: x_label.into(),
            y_label: y_label.into(),
            grid: true,
            curves: Vec::new(),
        }
    }

    pub fn with_curve(mut self, curve: Curve) -> Self {
        self.curves.push(curve);
        self
    }
}

/// A labeled vector picked by the user
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub label: String,
    /// Device the vector belongs to, if it came from the tree
    pub device: Option<String>,
    pub values: Vec<f64>,
}

impl Selection {
    pub fn new(label: impl Into<String>, values: Vec<f64>) -> Self {
        Self {
            label: label.into(),
            device: None,
            values,
        }
    }
}

/// Two-step abscissa/ordinate selection
#[derive(Debug, Clone, Default, PartialEq)]
pub enum PairSelection {
    #[default]
    Empty,
    Abscissa(Selection),
}

impl PairSelection {
    /// Feed one selection; returns `(x, y)` when the pair is complete and
    /// clears the state.
    pub fn feed(&mut self, selection: Selection) -> Option<(Selection, Selection)> {
        match std::mem::take(self) {
            PairSelection::Empty => {
                *self = PairSelection::Abscissa(selection);
                None
            }
            PairSelection::Abscissa(x) => Some((x, selection)),
        }
    }

    pub fn abscissa(&self) -> Option<&Selection> {
        match self {
            PairSelection::Abscissa(x) => Some(x),
            PairSelection::Empty => None,
        }
    }

    pub fn clear(&mut self) {
        *self = PairSelection::Empty;
    }
}

/// Chart of `y` against `x`, titled `"<y> vs <x>"`
pub fn pair_chart(x: &Selection, y: &Selection) -> Result<Chart> {
    let curve = pair_curve(x, y)?;
    Ok(Chart::new(format!("{} vs {}", y.label, x.label), &x.label, &y.label).with_curve(curve))
}

fn pair_curve(x: &Selection, y: &Selection) -> Result<Curve> {
    if x.values.len() != y.values.len() {
        return Err(WorkbenchError::ShapeMismatch {
            x_len: x.values.len(),
            y_len: y.values.len(),
        });
    }
    let label = match &y.device {
        Some(device) => format!("{}: {}", device, y.label),
        None => y.label.clone(),
    };
    Ok(Curve {
        label,
        points: x
            .values
            .iter()
            .zip(&y.values)
            .map(|(a, b)| [*a, *b])
            .collect(),
    })
}

#[derive(Debug, Default)]
pub struct PlotComposer {
    mode: PlotMode,
    pair: PairSelection,
    shared: Option<TabId>,
}

impl PlotComposer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> PlotMode {
        self.mode
    }

    pub fn pending(&self) -> Option<&Selection> {
        self.pair.abscissa()
    }

    /// Tab of the current multicurve chart
    pub fn shared_chart(&self) -> Option<TabId> {
        self.shared
    }

    /// Switch mode; any change drops the shared chart and a half-made pair
    pub fn set_mode(&mut self, mode: PlotMode) {
        if mode != self.mode {
            tracing::debug!("Plot mode {:?} -> {:?}", self.mode, mode);
            self.mode = mode;
            self.reset_shared();
        }
    }

    /// Next multicurve pair goes to a fresh chart
    pub fn reset_shared(&mut self) {
        self.shared = None;
        self.pair.clear();
    }

    /// Fixed chart for a Trajectory or Phase Error analysis node
    pub fn plot_single(
        &mut self,
        tree: &ExploreTree,
        cache: &AnalysisCache,
        node: NodeId,
        visuals: &mut Visuals,
    ) -> Result<Option<TabId>> {
        let kind = match tree.node_type(node) {
            Some(NodeType::Item(ItemKind::Trajectory)) => AnalysisKind::Trajectory,
            Some(NodeType::Item(ItemKind::PhaseError)) => AnalysisKind::PhaseError,
            _ => return Ok(None),
        };
        let device = tree
            .device_of(node)
            .and_then(|d| tree.label(d))
            .ok_or_else(|| WorkbenchError::UnknownDevice(node.to_string()))?;
        let result = cache
            .get(kind, device)
            .ok_or_else(|| WorkbenchError::UnknownDevice(device.to_string()))?;

        let missing = |label: &str| WorkbenchError::Compute(format!("{} has no '{}'", kind, label));
        let chart = match kind {
            AnalysisKind::Trajectory => {
                let z = result.vector("z").ok_or_else(|| missing("z"))?;
                let xp = result.vector("x'").ok_or_else(|| missing("x'"))?;
                let mut x = Selection::new("z", z.to_vec());
                let mut y = Selection::new("x'", xp.to_vec());
                x.device = Some(device.to_string());
                y.device = Some(device.to_string());
                let mut chart = pair_chart(&x, &y)?;
                chart.x_label = "z [mm]".to_string();
                chart.y_label = "x' [rad]".to_string();
                chart
            }
            _ => {
                let phase = result.vector("PhaseErr").ok_or_else(|| missing("PhaseErr"))?;
                let poles = (1..=phase.len()).map(|i| i as f64).collect();
                let x = Selection::new("Pole", poles);
                let mut y = Selection::new("Phase Error", phase.to_vec());
                y.device = Some(device.to_string());
                let mut chart = pair_chart(&x, &y)?;
                chart.y_label = "Phase Error [deg]".to_string();
                chart
            }
        };

        let title = format!("{} - {}", device, chart.title);
        Ok(Some(visuals.open(title, VisualContent::Chart(chart))))
    }

    /// Feed a result-leaf click to the pair selection.
    ///
    /// Returns the tab that was opened or updated once a pair completes.
    pub fn feed_selection(
        &mut self,
        tree: &ExploreTree,
        cache: &AnalysisCache,
        leaf: NodeId,
        visuals: &mut Visuals,
    ) -> Result<Option<TabId>> {
        let Some(leaf) = tree.resolve_leaf(leaf) else {
            return Ok(None);
        };
        let result = cache
            .get(leaf.kind, &leaf.device)
            .ok_or_else(|| WorkbenchError::UnknownDevice(leaf.device.clone()))?;
        let Some(values) = result.vector(&leaf.label) else {
            tracing::debug!("Ignoring scalar leaf '{}' for plotting", leaf.label);
            return Ok(None);
        };

        let selection = Selection {
            label: leaf.label.clone(),
            device: Some(leaf.device.clone()),
            values: values.to_vec(),
        };
        match self.pair.feed(selection) {
            Some((x, y)) => self.plot_pair(&x, &y, visuals).map(Some),
            None => Ok(None),
        }
    }

    /// Pairwise chart from two table columns
    pub fn plot_from_table(&mut self, x: Selection, y: Selection, visuals: &mut Visuals) -> Result<TabId> {
        let chart = pair_chart(&x, &y)?;
        Ok(visuals.open(chart.title.clone(), VisualContent::Chart(chart)))
    }

    fn plot_pair(&mut self, x: &Selection, y: &Selection, visuals: &mut Visuals) -> Result<TabId> {
        if self.mode == PlotMode::Multicurve {
            if let Some(tab) = self.shared {
                if let Some(chart) = visuals.chart_mut(tab) {
                    chart.curves.push(pair_curve(x, y)?);
                    return Ok(tab);
                }
            }
            let chart = pair_chart(x, y)?;
            let tab = visuals.open(chart.title.clone(), VisualContent::Chart(chart));
            self.shared = Some(tab);
            return Ok(tab);
        }

        let chart = pair_chart(x, y)?;
        Ok(visuals.open(chart.title.clone(), VisualContent::Chart(chart)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AnalysisResult, DeviceKind};

    fn setup() -> (ExploreTree, AnalysisCache, Vec<NodeId>) {
        let mut tree = ExploreTree::new();
        let mut cache = AnalysisCache::new();
        let dev = tree.add_device_node(DeviceKind::Data, "meas1");
        let result = AnalysisResult::new("meas1", AnalysisKind::MagneticField)
            .with_vector("z", vec![0.0, 1.0, 2.0])
            .with_vector("Bx", vec![0.1, 0.2, 0.3])
            .with_vector("By", vec![1.0, 0.0, -1.0])
            .with_vector("Bz", vec![0.0, 0.0])
            .with_scalar("peak", 1.0);
        let leaves: Vec<(String, String)> =
            result.labels().map(|l| (l.to_string(), String::new())).collect();
        let mf = tree.add_analysis_subtree(dev, AnalysisKind::MagneticField, &leaves);
        cache.put(AnalysisKind::MagneticField, "meas1", result).unwrap();
        let ids = tree.children(mf).map(|n| n.id).collect();
        (tree, cache, ids)
    }

    #[test]
    fn test_pair_selection_state_machine() {
        let mut pair = PairSelection::default();
        assert!(pair.feed(Selection::new("z", vec![])).is_none());
        assert_eq!(pair.abscissa().unwrap().label, "z");
        let (x, y) = pair.feed(Selection::new("Bx", vec![])).unwrap();
        assert_eq!((x.label.as_str(), y.label.as_str()), ("z", "Bx"));
        assert_eq!(pair, PairSelection::Empty);
    }

    #[test]
    fn test_pairwise_opens_new_tab_each_time() {
        let (tree, cache, leaves) = setup();
        let mut composer = PlotComposer::new();
        composer.set_mode(PlotMode::Pairwise);
        let mut visuals = Visuals::default();

        assert_eq!(composer.feed_selection(&tree, &cache, leaves[0], &mut visuals).unwrap(), None);
        let first = composer
            .feed_selection(&tree, &cache, leaves[1], &mut visuals)
            .unwrap()
            .unwrap();
        let chart = visuals.chart(first).unwrap();
        assert_eq!(chart.title, "Bx vs z");
        assert_eq!(chart.x_label, "z");
        assert_eq!(chart.y_label, "Bx");
        assert!(chart.grid);
        assert_eq!(chart.curves.len(), 1);

        composer.feed_selection(&tree, &cache, leaves[0], &mut visuals).unwrap();
        let second = composer
            .feed_selection(&tree, &cache, leaves[2], &mut visuals)
            .unwrap()
            .unwrap();
        assert_ne!(first, second);
        assert_eq!(visuals.len(), 2);
    }

    #[test]
    fn test_multicurve_overlays_until_reset() {
        let (tree, cache, leaves) = setup();
        let mut composer = PlotComposer::new();
        composer.set_mode(PlotMode::Multicurve);
        let mut visuals = Visuals::default();

        for y in [1, 2] {
            composer.feed_selection(&tree, &cache, leaves[0], &mut visuals).unwrap();
            composer.feed_selection(&tree, &cache, leaves[y], &mut visuals).unwrap();
        }
        assert_eq!(visuals.len(), 1);
        let shared = composer.shared_chart().unwrap();
        assert_eq!(visuals.chart(shared).unwrap().curves.len(), 2);

        composer.set_mode(PlotMode::Pairwise);
        assert!(composer.shared_chart().is_none());
        composer.set_mode(PlotMode::Multicurve);
        composer.feed_selection(&tree, &cache, leaves[0], &mut visuals).unwrap();
        composer.feed_selection(&tree, &cache, leaves[1], &mut visuals).unwrap();
        assert_eq!(visuals.len(), 2);
    }

    #[test]
    fn test_shape_mismatch() {
        let (tree, cache, leaves) = setup();
        let mut composer = PlotComposer::new();
        composer.set_mode(PlotMode::Pairwise);
        let mut visuals = Visuals::default();

        composer.feed_selection(&tree, &cache, leaves[0], &mut visuals).unwrap();
        let err = composer
            .feed_selection(&tree, &cache, leaves[3], &mut visuals)
            .unwrap_err();
        assert!(matches!(err, WorkbenchError::ShapeMismatch { x_len: 3, y_len: 2 }));
        assert!(visuals.is_empty());
        assert!(composer.pending().is_none());
    }

    #[test]
    fn test_scalar_leaf_is_ignored() {
        let (tree, cache, leaves) = setup();
        let mut composer = PlotComposer::new();
        composer.set_mode(PlotMode::Pairwise);
        let mut visuals = Visuals::default();
        assert_eq!(composer.feed_selection(&tree, &cache, leaves[4], &mut visuals).unwrap(), None);
        assert!(composer.pending().is_none());
    }
}
