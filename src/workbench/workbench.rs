//! Project workbench: owns the projects and routes user events to the
//! current one.

use std::path::Path;

use crate::backend::DeviceComputeService;
use crate::config::{AnalysisParameters, ModelFamily, ModelParameters, RuntimeSettings};
use crate::error::{Result, WorkbenchError};
use crate::types::{Device, DeviceKind};

use super::engine::{DuplicatePolicy, Outcome};
use super::explore_tree::{ItemKind, NodeType};
use super::host::{Notice, UiHost};
use super::id::{NodeId, ProjectId, TabId};
use super::plot_composer::PlotMode;
use super::project::Project;
use super::table_composer::{Cell, TableKey};
use super::toolbar::{ChecklistItem, TableMode, Toolbar};

/// In-progress rename of a project tab
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameEditor {
    pub index: usize,
    pub text: String,
}

/// Everything a single tree click changed
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClickEffects {
    pub analyses: Vec<(ChecklistItem, Outcome)>,
    pub opened: Vec<TabId>,
}

pub struct ProjectWorkbench {
    projects: Vec<Project>,
    current: usize,
    service: Box<dyn DeviceComputeService>,
    pub toolbar: Toolbar,
    pub settings: RuntimeSettings,
    defaults: AnalysisParameters,
    rename: Option<RenameEditor>,
    created: usize,
}

impl ProjectWorkbench {
    /// Create a workbench holding one empty project
    pub fn new(service: Box<dyn DeviceComputeService>, defaults: AnalysisParameters) -> Self {
        let mut workbench = Self {
            projects: Vec::new(),
            current: 0,
            service,
            toolbar: Toolbar::new(),
            settings: RuntimeSettings::default(),
            defaults,
            rename: None,
            created: 0,
        };
        workbench.add_project();
        workbench
    }

    // ---- Projects ----

    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current(&self) -> &Project {
        &self.projects[self.current]
    }

    pub fn current_mut(&mut self) -> &mut Project {
        &mut self.projects[self.current]
    }

    pub fn project_by_id(&self, id: ProjectId) -> Option<&Project> {
        self.projects.iter().find(|p| p.id == id)
    }

    pub fn set_current(&mut self, index: usize) {
        if index < self.projects.len() {
            self.current = index;
        }
    }

    /// Append a project and make it current
    pub fn add_project(&mut self) -> usize {
        self.created += 1;
        let name = format!("Project {}", self.created);
        tracing::debug!("Adding {}", name);
        self.projects
            .push(Project::new(name, self.defaults.clone(), self.toolbar.plot_mode));
        self.current = self.projects.len() - 1;
        self.current
    }

    /// Close a project. A no-op when only one project remains.
    pub fn close_project(&mut self, index: usize) -> bool {
        if self.projects.len() <= 1 || index >= self.projects.len() {
            return false;
        }
        let project = self.projects.remove(index);
        tracing::debug!("Closed {}", project.name);
        if self.current >= self.projects.len() || self.current > index {
            self.current = self.current.saturating_sub(1);
        }
        self.rename = None;
        true
    }

    /// Double-click on a project tab
    pub fn begin_rename(&mut self, index: usize) {
        if let Some(project) = self.projects.get(index) {
            self.rename = Some(RenameEditor {
                index,
                text: project.name.clone(),
            });
        }
    }

    pub fn rename_editor(&self) -> Option<&RenameEditor> {
        self.rename.as_ref()
    }

    pub fn rename_editor_mut(&mut self) -> Option<&mut RenameEditor> {
        self.rename.as_mut()
    }

    /// Focus left the rename editor: apply non-blank text
    pub fn commit_rename(&mut self) {
        if let Some(editor) = self.rename.take() {
            let text = editor.text.trim();
            if let (false, Some(project)) = (text.is_empty(), self.projects.get_mut(editor.index)) {
                project.name = text.to_string();
            }
        }
    }

    pub fn cancel_rename(&mut self) {
        self.rename = None;
    }

    // ---- Devices ----

    /// Open a measurement file as a Data device of the current project
    pub fn open_file(&mut self, path: &Path, host: &mut dyn UiHost) -> Option<String> {
        match self.try_open_file(path) {
            Ok(name) => Some(name),
            Err(err) => {
                host.report(&err);
                None
            }
        }
    }

    fn try_open_file(&mut self, path: &Path) -> Result<String> {
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .ok_or_else(|| WorkbenchError::Parse(format!("{} has no file name", path.display())))?;
        let project = &mut self.projects[self.current];
        if project.registry.contains(&name) {
            return Err(WorkbenchError::NameCollision(name));
        }

        let loaded = self.service.load_measurement(path)?;
        let device = Device::measured(loaded.payload, loaded.grid);
        let name = project.registry.insert(device, &name, DeviceKind::Data)?;
        project.tree.add_device_node(DeviceKind::Data, &name);
        project.filenames.insert(path.to_path_buf());
        tracing::info!("Opened '{}' from {}", name, path.display());
        Ok(name)
    }

    /// Build a parametric device and add it under Models
    pub fn generate_model(
        &mut self,
        family: ModelFamily,
        params: &ModelParameters,
        host: &mut dyn UiHost,
    ) -> Option<String> {
        let result = self.service.build_model(family, params).and_then(|payload| {
            let project = &mut self.projects[self.current];
            let name = project.registry.insert(
                Device::model(payload),
                family.display_name(),
                DeviceKind::Model,
            )?;
            project.tree.add_device_node(DeviceKind::Model, &name);
            Ok(name)
        });
        match result {
            Ok(name) => {
                tracing::info!("Generated model '{}'", name);
                Some(name)
            }
            Err(err) => {
                host.report(&err);
                None
            }
        }
    }

    // ---- Toolbar ----

    pub fn set_plot_toggled(&mut self, on: bool) {
        self.toolbar.plot = on;
        if !on {
            for project in &mut self.projects {
                project.plots.reset_shared();
            }
        }
    }

    pub fn set_plot_mode(&mut self, mode: PlotMode) {
        self.toolbar.plot_mode = mode;
        for project in &mut self.projects {
            project.plots.set_mode(mode);
        }
    }

    // ---- Event routing ----

    /// Route a click on a tree node according to the toggled buttons.
    pub fn tree_item_clicked(&mut self, node: NodeId, host: &mut dyn UiHost) -> ClickEffects {
        let mut effects = ClickEffects::default();
        let toolbar = self.toolbar.clone();
        let service = self.service.as_mut();
        let project = &mut self.projects[self.current];
        let Some(NodeType::Item(item)) = project.tree.node_type(node) else {
            return effects;
        };

        if toolbar.analysis && item.is_device() {
            let items = toolbar.checked_items();
            effects.analyses = project.with_engine(service, host, |engine, ctx| {
                engine.apply(ctx, node, &items, DuplicatePolicy::Warn)
            });
        }

        if toolbar.plot {
            let opened = match (toolbar.plot_mode, item) {
                (PlotMode::Single, ItemKind::Trajectory | ItemKind::PhaseError) => project
                    .plots
                    .plot_single(&project.tree, &project.cache, node, &mut project.visuals),
                (PlotMode::Pairwise | PlotMode::Multicurve, ItemKind::Result) => project
                    .plots
                    .feed_selection(&project.tree, &project.cache, node, &mut project.visuals),
                _ => Ok(None),
            };
            match opened {
                Ok(tab) => effects.opened.extend(tab),
                Err(err) => host.report(&err),
            }
        } else {
            project.plots.reset_shared();
        }

        if toolbar.table && toolbar.table_mode == TableMode::DeviceTable {
            let opened = match item {
                ItemKind::Data => project.tables.table_of_device(
                    &project.registry,
                    &project.tree,
                    node,
                    &mut project.visuals,
                ),
                ItemKind::Result => project.tables.table_of_result(
                    &project.tree,
                    &project.cache,
                    node,
                    &mut project.visuals,
                ),
                _ => Ok(None),
            };
            match opened {
                Ok(tab) => effects.opened.extend(tab),
                Err(err) => host.report(&err),
            }
        }

        effects
    }

    /// Analysis confirm button: apply-for-all when the setting is on
    pub fn confirm_analysis(&mut self, host: &mut dyn UiHost) -> Vec<(ChecklistItem, Outcome)> {
        if !self.settings.apply_for_all {
            tracing::debug!("Analysis confirm ignored, apply-for-all is off");
            return Vec::new();
        }
        let items = self.toolbar.checked_items();
        let service = self.service.as_mut();
        self.projects[self.current].with_engine(service, host, |engine, ctx| {
            engine.apply_for_all(ctx, &items)
        })
    }

    /// Range selection inside a table tab of the current project
    pub fn table_selection(&mut self, tab: TabId, cells: &[Cell], active_column: usize, extend: bool) {
        let project = &mut self.projects[self.current];
        project
            .tables
            .select(&mut project.visuals, tab, cells, active_column, extend);
    }

    /// Key press inside a table tab; publishing keys may open a chart
    pub fn table_key(&mut self, tab: TabId, key: TableKey, host: &mut dyn UiHost) -> Option<TabId> {
        let project = &mut self.projects[self.current];
        let cells = project.tables.key_pressed(&project.visuals, tab, key)?;
        if !(self.toolbar.plot && self.toolbar.plot_mode == PlotMode::PairwiseFromTable) {
            return None;
        }

        let result = project
            .visuals
            .table(tab)
            .ok_or_else(|| WorkbenchError::InvalidParameter(format!("{:?} is not a table", tab)))
            .and_then(|table| table.pair_from_cells(&cells))
            .and_then(|(x, y)| project.plots.plot_from_table(x, y, &mut project.visuals));
        match result {
            Ok(tab) => Some(tab),
            Err(err) => {
                host.report(&err);
                None
            }
        }
    }

    /// Close a visuals tab of the current project
    pub fn close_tab(&mut self, tab: TabId) -> bool {
        let project = &mut self.projects[self.current];
        if project.plots.shared_chart() == Some(tab) {
            project.plots.reset_shared();
        }
        project.visuals.close(tab)
    }

    /// Replace the current project's analysis parameters
    pub fn edit_analysis_parameters(&mut self, params: AnalysisParameters, host: &mut dyn UiHost) -> bool {
        match self.current_mut().engine.set_parameters(params) {
            Ok(()) => {
                tracing::info!("Analysis parameters updated for {}", self.current().name);
                true
            }
            Err(err) => {
                host.report(&err);
                false
            }
        }
    }

    pub fn undo(&mut self, host: &mut dyn UiHost) {
        host.notify(Notice::from_error(&WorkbenchError::NotImplemented(
            "Undo".to_string(),
        )));
    }

    pub fn redo(&mut self, host: &mut dyn UiHost) {
        host.notify(Notice::from_error(&WorkbenchError::NotImplemented(
            "Redo".to_string(),
        )));
    }

    /// Ask before leaving; `true` means quit
    pub fn request_quit(&mut self, host: &mut dyn UiHost) -> bool {
        host.confirm("Quit", "Do you really want to quit?")
    }

    /// JSON of a chart tab in the current project
    pub fn export_chart(&self, tab: TabId) -> Result<String> {
        self.current().visuals.export_chart_json(tab)
    }
}
