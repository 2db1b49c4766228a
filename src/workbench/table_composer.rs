//! Table composer
//!
//! Read-only tabular views of a device's raw grid or of one result vector,
//! plus the selection model that feeds pairwise-from-table plotting.

use std::collections::{BTreeMap, BTreeSet};

use crate::error::{Result, WorkbenchError};
use crate::types::GRID_HEADER;

use super::cache::AnalysisCache;
use super::explore_tree::{ExploreTree, ItemKind, NodeType};
use super::id::{NodeId, TabId};
use super::plot_composer::Selection;
use super::registry::DeviceRegistry;
use super::visuals::{VisualContent, Visuals};

/// `(row, column)` of a table cell
pub type Cell = (usize, usize);

/// Keys that reach a table view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableKey {
    Return,
    Enter,
    Space,
    Other,
}

impl TableKey {
    /// Whether the key publishes the current selection
    pub fn publishes(self) -> bool {
        matches!(self, TableKey::Return | TableKey::Enter | TableKey::Space)
    }
}

/// Format a cell: `%.2e` where the shortest representation uses an
/// exponent, `%.2f` otherwise
pub fn format_cell(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    let magnitude = value.abs();
    let exponent_form = value.is_finite() && value != 0.0 && !(1e-4..1e16).contains(&magnitude);
    if !exponent_form {
        return format!("{:.2}", value);
    }

    let text = format!("{:.2e}", value);
    match text.split_once('e') {
        Some((mantissa, exp)) => {
            let (sign, digits) = match exp.strip_prefix('-') {
                Some(d) => ('-', d),
                None => ('+', exp),
            };
            format!("{}e{}{:0>2}", mantissa, sign, digits)
        }
        None => text,
    }
}

/// Keeps a selection within the first selected column and the active one
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableSelection {
    anchor: Option<usize>,
    cells: BTreeSet<Cell>,
}

impl TableSelection {
    /// Apply a user range selection. Cells outside the anchor column and
    /// `active_column` are dropped.
    pub fn select(&mut self, cells: &[Cell], active_column: usize, extend: bool) {
        if !extend {
            self.clear();
        }
        let anchor = *self
            .anchor
            .get_or_insert_with(|| cells.first().map_or(active_column, |c| c.1));
        self.cells = std::mem::take(&mut self.cells)
            .into_iter()
            .chain(cells.iter().copied())
            .filter(|c| c.1 == anchor || c.1 == active_column)
            .collect();
    }

    pub fn clear(&mut self) {
        self.anchor = None;
        self.cells.clear();
    }

    /// Selected cells in row-major order
    pub fn cells(&self) -> Vec<Cell> {
        self.cells.iter().copied().collect()
    }

    pub fn contains(&self, cell: Cell) -> bool {
        self.cells.contains(&cell)
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableView {
    pub header: Vec<String>,
    pub columns: Vec<Vec<f64>>,
    pub selection: TableSelection,
}

impl TableView {
    pub fn new(header: Vec<String>, columns: Vec<Vec<f64>>) -> Self {
        Self {
            header,
            columns,
            selection: TableSelection::default(),
        }
    }

    pub fn row_count(&self) -> usize {
        self.columns.iter().map(Vec::len).max().unwrap_or(0)
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn value(&self, cell: Cell) -> Option<f64> {
        self.columns.get(cell.1)?.get(cell.0).copied()
    }

    pub fn cell_text(&self, cell: Cell) -> String {
        self.value(cell).map(format_cell).unwrap_or_default()
    }

    /// Interpret a two-column contiguous range as `(x, y)`
    pub fn pair_from_cells(&self, cells: &[Cell]) -> Result<(Selection, Selection)> {
        let mut by_column: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
        for &(row, column) in cells {
            by_column.entry(column).or_default().push(row);
        }
        if by_column.len() != 2 {
            return Err(WorkbenchError::InvalidParameter(format!(
                "select exactly two columns (got {})",
                by_column.len()
            )));
        }

        let mut picked = Vec::with_capacity(2);
        for (column, mut rows) in by_column {
            rows.sort_unstable();
            rows.dedup();
            let contiguous = rows.windows(2).all(|w| w[1] == w[0] + 1);
            if !contiguous {
                return Err(WorkbenchError::InvalidParameter(
                    "selection must be a contiguous range".to_string(),
                ));
            }
            let values = rows
                .iter()
                .filter_map(|&row| self.value((row, column)))
                .collect::<Vec<_>>();
            let label = self
                .header
                .get(column)
                .cloned()
                .unwrap_or_else(|| format!("column {}", column + 1));
            picked.push((rows.first().copied(), Selection::new(label, values)));
        }

        let (y_start, y) = picked.pop().ok_or_else(|| {
            WorkbenchError::InvalidParameter("empty selection".to_string())
        })?;
        let (x_start, x) = picked.pop().ok_or_else(|| {
            WorkbenchError::InvalidParameter("empty selection".to_string())
        })?;
        if x.values.len() != y.values.len() || x_start != y_start {
            return Err(WorkbenchError::ShapeMismatch {
                x_len: x.values.len(),
                y_len: y.values.len(),
            });
        }
        Ok((x, y))
    }
}

#[derive(Debug, Default)]
pub struct TableComposer {
    published: Vec<Cell>,
}

impl TableComposer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Table of the raw grid of a Data device
    pub fn table_of_device(
        &mut self,
        registry: &DeviceRegistry,
        tree: &ExploreTree,
        node: NodeId,
        visuals: &mut Visuals,
    ) -> Result<Option<TabId>> {
        if tree.node_type(node) != Some(NodeType::Item(ItemKind::Data)) {
            return Ok(None);
        }
        let name = tree
            .label(node)
            .ok_or_else(|| WorkbenchError::UnknownDevice(node.to_string()))?;
        let device = registry.get(name)?;
        let Some(grid) = &device.raw_grid else {
            return Ok(None);
        };
        let header = GRID_HEADER.iter().map(|h| h.to_string()).collect();
        let view = TableView::new(header, grid.columns());
        Ok(Some(visuals.open(name, VisualContent::Table(view))))
    }

    /// One-column table of a vector result leaf
    pub fn table_of_result(
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
            tracing::debug!("Scalar leaf '{}' has no table", leaf.label);
            return Ok(None);
        };
        let view = TableView::new(vec![leaf.label.clone()], vec![values.to_vec()]);
        let title = format!("{} - {}", leaf.device, leaf.label);
        Ok(Some(visuals.open(title, VisualContent::Table(view))))
    }

    /// Route a range selection to a table tab
    pub fn select(
        &mut self,
        visuals: &mut Visuals,
        tab: TabId,
        cells: &[Cell],
        active_column: usize,
        extend: bool,
    ) {
        if let Some(table) = visuals.table_mut(tab) {
            table.selection.select(cells, active_column, extend);
        }
    }

    /// Publish the filtered selection on Return/Enter/Space
    pub fn key_pressed(&mut self, visuals: &Visuals, tab: TabId, key: TableKey) -> Option<Vec<Cell>> {
        if !key.publishes() {
            return None;
        }
        let cells = visuals.table(tab)?.selection.cells();
        self.published = cells.clone();
        Some(cells)
    }

    /// Last published selection
    pub fn published(&self) -> &[Cell] {
        &self.published
    }
}
