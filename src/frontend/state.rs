//! Shared state types for the frontend
//!
//! Panels never touch the workbench directly: they return `AppAction`s that
//! the app applies after rendering. [`FrontendHost`] is the GUI side of the
//! [`UiHost`] seam.

use std::collections::VecDeque;
use std::path::PathBuf;

use crate::config::{AnalysisParameters, ModelFamily, ModelParameters};
use crate::workbench::{
    Cell, ChecklistItem, Notice, NodeId, PlotMode, TabId, TableKey, TableMode, UiHost,
};

/// Actions that any panel can emit
#[derive(Debug, Clone)]
pub enum AppAction {
    // Files and devices
    OpenFile(PathBuf),
    GenerateModel(ModelFamily, ModelParameters),
    ExportChart(TabId, PathBuf),

    // Toolbar
    ToggleAnalysis(bool),
    TogglePlot(bool),
    ToggleTable(bool),
    SetChecked(ChecklistItem, bool),
    ToggleSelectAll,
    ConfirmAnalysis,
    SetPlotMode(PlotMode),
    SetTableMode(TableMode),

    // Explore tree
    TreeClicked(NodeId),

    // Project tabs
    AddProject,
    CloseProject(usize),
    SelectProject(usize),
    BeginRename(usize),
    CommitRename,
    CancelRename,

    // Visuals
    CloseTab(TabId),
    TableSelect {
        tab: TabId,
        cells: Vec<Cell>,
        active_column: usize,
        extend: bool,
    },
    TableKey(TabId, TableKey),

    // Edit menu
    Undo,
    Redo,
    EditParameters(AnalysisParameters),
    SetApplyForAll(bool),

    // Dialogs
    OpenModelDialog,
    OpenParametersDialog,
    RequestQuit,
}

/// Pending yes/no question raised by the core
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingQuestion {
    pub title: String,
    pub question: String,
}

/// Queues notices for the notice dialog and answers confirmations in two
/// passes: the first call records the question and says no, the dialog then
/// stores the answer for the repeated request.
#[derive(Debug, Default)]
pub struct FrontendHost {
    notices: VecDeque<Notice>,
    pending: Option<PendingQuestion>,
    answer: Option<bool>,
}

impl FrontendHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Notice currently shown, if any
    pub fn current_notice(&self) -> Option<&Notice> {
        self.notices.front()
    }

    pub fn dismiss_notice(&mut self) {
        self.notices.pop_front();
    }

    pub fn pending_question(&self) -> Option<&PendingQuestion> {
        self.pending.as_ref()
    }

    /// Record the user's answer to the pending question
    pub fn answer(&mut self, yes: bool) {
        self.pending = None;
        // Only a yes is replayed to the repeated request
        self.answer = yes.then_some(true);
    }

    /// Notices waiting to be shown
    pub fn len(&self) -> usize {
        self.notices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notices.is_empty()
    }
}

impl UiHost for FrontendHost {
    fn notify(&mut self, notice: Notice) {
        self.notices.push_back(notice);
    }

    fn confirm(&mut self, title: &str, question: &str) -> bool {
        if let Some(answer) = self.answer.take() {
            return answer;
        }
        self.pending = Some(PendingQuestion {
            title: title.to_string(),
            question: question.to_string(),
        });
        false
    }
}
