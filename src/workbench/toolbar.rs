//! Toolbar state: the three mode buttons and the analysis checklist
//!
//! The toolbar holds no behavior of its own. `ProjectWorkbench` reads it to
//! route tree clicks (see `ProjectWorkbench::tree_item_clicked`).

use std::collections::BTreeSet;

use crate::types::AnalysisKind;

use super::plot_composer::PlotMode;

/// Entries of the Analysis checklist
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ChecklistItem {
    MagneticField,
    Trajectory,
    PhaseError,
    FieldIntegrals,
    RollOffPeaks,
    RollOffAmp,
    CrossTalk,
    /// Reserved, has no compute path
    Shimming,
}

impl ChecklistItem {
    /// Checklist display order
    pub fn all() -> &'static [ChecklistItem] {
        &[
            ChecklistItem::MagneticField,
            ChecklistItem::Trajectory,
            ChecklistItem::PhaseError,
            ChecklistItem::FieldIntegrals,
            ChecklistItem::RollOffPeaks,
            ChecklistItem::RollOffAmp,
            ChecklistItem::CrossTalk,
            ChecklistItem::Shimming,
        ]
    }

    /// Order in which checked items run: cross-talk renames the device first,
    /// prerequisites precede their dependents
    pub fn execution_order() -> &'static [ChecklistItem] {
        &[
            ChecklistItem::CrossTalk,
            ChecklistItem::MagneticField,
            ChecklistItem::Trajectory,
            ChecklistItem::PhaseError,
            ChecklistItem::FieldIntegrals,
            ChecklistItem::RollOffPeaks,
            ChecklistItem::RollOffAmp,
            ChecklistItem::Shimming,
        ]
    }

    pub fn analysis_kind(self) -> Option<AnalysisKind> {
        match self {
            ChecklistItem::MagneticField => Some(AnalysisKind::MagneticField),
            ChecklistItem::Trajectory => Some(AnalysisKind::Trajectory),
            ChecklistItem::PhaseError => Some(AnalysisKind::PhaseError),
            ChecklistItem::FieldIntegrals => Some(AnalysisKind::FieldIntegrals),
            ChecklistItem::RollOffPeaks => Some(AnalysisKind::RollOffPeaks),
            ChecklistItem::RollOffAmp => Some(AnalysisKind::RollOffAmp),
            ChecklistItem::CrossTalk | ChecklistItem::Shimming => None,
        }
    }

    pub fn display_name(self) -> &'static str {
        match self.analysis_kind() {
            Some(kind) => kind.display_name(),
            None if self == ChecklistItem::CrossTalk => "Cross Talk",
            None => "Shimming",
        }
    }
}

impl From<AnalysisKind> for ChecklistItem {
    fn from(kind: AnalysisKind) -> Self {
        match kind {
            AnalysisKind::MagneticField => ChecklistItem::MagneticField,
            AnalysisKind::Trajectory => ChecklistItem::Trajectory,
            AnalysisKind::PhaseError => ChecklistItem::PhaseError,
            AnalysisKind::FieldIntegrals => ChecklistItem::FieldIntegrals,
            AnalysisKind::RollOffPeaks => ChecklistItem::RollOffPeaks,
            AnalysisKind::RollOffAmp => ChecklistItem::RollOffAmp,
        }
    }
}

/// Actions of the Table button
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TableMode {
    #[default]
    DeviceTable,
    /// Second action, not wired to anything
    Reserved,
}

/// Icon of the Analysis confirm button
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmIcon {
    Confirm,
    ConfirmAll,
}

#[derive(Debug, Clone, Default)]
pub struct Toolbar {
    pub analysis: bool,
    pub plot: bool,
    pub table: bool,
    pub plot_mode: PlotMode,
    pub table_mode: TableMode,
    checked: BTreeSet<ChecklistItem>,
    select_all: bool,
}

impl Toolbar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether any mode button is toggled
    pub fn any_toggled(&self) -> bool {
        self.analysis || self.plot || self.table
    }

    pub fn is_checked(&self, item: ChecklistItem) -> bool {
        self.checked.contains(&item)
    }

    pub fn set_checked(&mut self, item: ChecklistItem, checked: bool) {
        if checked {
            self.checked.insert(item);
        } else {
            self.checked.remove(&item);
            self.select_all = false;
        }
    }

    /// Check several items at once
    pub fn check_all<I: IntoIterator<Item = ChecklistItem>>(&mut self, items: I) {
        self.checked.extend(items);
    }

    /// SelectAll: toggle every item and swap the confirm icon
    pub fn toggle_select_all(&mut self) {
        self.select_all = !self.select_all;
        if self.select_all {
            self.checked.extend(ChecklistItem::all().iter().copied());
        } else {
            self.checked.clear();
        }
    }

    pub fn select_all(&self) -> bool {
        self.select_all
    }

    pub fn confirm_icon(&self) -> ConfirmIcon {
        if self.select_all {
            ConfirmIcon::ConfirmAll
        } else {
            ConfirmIcon::Confirm
        }
    }

    /// Checked items in execution order
    pub fn checked_items(&self) -> Vec<ChecklistItem> {
        ChecklistItem::execution_order()
            .iter()
            .copied()
            .filter(|i| self.checked.contains(i))
            .collect()
    }
}
