//! Visuals workspace: one dock per project holding its chart and table tabs
//!
//! The workbench owns tab contents; the dock only arranges [`TabId`]s and is
//! reconciled with the project's [`Visuals`] after every action.

pub mod tab_viewer;

use std::collections::{HashMap, HashSet};

use egui_dock::DockState;

use crate::workbench::{Cell, ProjectId, TabId, Visuals};

/// Dock layouts and per-table click anchors
#[derive(Default)]
pub struct Workspace {
    docks: HashMap<ProjectId, DockState<TabId>>,
    pub anchors: HashMap<TabId, Cell>,
}

impl Workspace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Dock of a project, created empty on first use
    pub fn dock_mut(&mut self, project: ProjectId) -> &mut DockState<TabId> {
        self.docks
            .entry(project)
            .or_insert_with(|| DockState::new(vec![]))
    }

    /// Dock and table anchors, borrowed together for the tab viewer
    pub fn parts_mut(
        &mut self,
        project: ProjectId,
    ) -> (&mut DockState<TabId>, &mut HashMap<TabId, Cell>) {
        let dock = self
            .docks
            .entry(project)
            .or_insert_with(|| DockState::new(vec![]));
        (dock, &mut self.anchors)
    }

    /// Add tabs the project opened and drop tabs it closed.
    pub fn sync(&mut self, project: ProjectId, visuals: &Visuals) {
        let dock = self.dock_mut(project);
        let docked: HashSet<TabId> = dock.iter_all_tabs().map(|(_, tab)| *tab).collect();
        let open: HashSet<TabId> = visuals.ids().into_iter().collect();

        for stale in docked.difference(&open) {
            if let Some(location) = dock.find_tab(stale) {
                dock.remove_tab(location);
            }
        }
        for id in visuals.ids() {
            if !docked.contains(&id) {
                dock.push_to_focused_leaf(id);
            }
        }
        self.anchors.retain(|tab, _| open.contains(tab));
    }

    /// Forget the dock of a closed project
    pub fn remove_project(&mut self, project: ProjectId) {
        self.docks.remove(&project);
    }
}
