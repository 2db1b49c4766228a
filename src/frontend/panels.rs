//! Panel components for the frontend UI
//!
//! # Panels
//!
//! - [`ExplorePanel`] - Two-column explore tree of the current project
//! - [`ProjectTabsPanel`] - Project tab strip with in-place rename

use egui::{Color32, RichText, Ui};

use crate::frontend::state::AppAction;
use crate::workbench::{ExploreTree, NodeId, NodeType, ProjectWorkbench};

/// Renders the explore tree
pub struct ExplorePanel;

impl ExplorePanel {
    pub fn render(ui: &mut Ui, tree: &ExploreTree) -> Vec<AppAction> {
        let mut actions = Vec::new();
        egui::ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                for root in tree.roots() {
                    Self::render_node(ui, tree, root, &mut actions);
                }
            });
        actions
    }

    fn render_node(ui: &mut Ui, tree: &ExploreTree, id: NodeId, actions: &mut Vec<AppAction>) {
        let Some(node) = tree.get(id) else {
            return;
        };

        let has_children = node.first_child.is_valid();
        let is_container = matches!(node.node_type, NodeType::Container(_));

        let header = |ui: &mut Ui, actions: &mut Vec<AppAction>| {
            let text = if is_container {
                RichText::new(&node.label).strong()
            } else {
                RichText::new(&node.label)
            };
            let response = ui.selectable_label(false, text);
            if response.clicked() && !is_container {
                actions.push(AppAction::TreeClicked(id));
            }
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.label(
                    RichText::new(&node.annotation)
                        .small()
                        .color(Color32::from_rgb(150, 150, 170)),
                );
            });
        };

        if !has_children {
            ui.horizontal(|ui| {
                // Align leaves with the collapsing headers above them
                ui.add_space(ui.spacing().indent);
                header(ui, actions);
            });
            return;
        }

        let state = egui::collapsing_header::CollapsingState::load_with_default_open(
            ui.ctx(),
            ui.make_persistent_id(("explore_node", id.0)),
            is_container,
        );
        state
            .show_header(ui, |ui| header(ui, actions))
            .body(|ui| {
                for child in tree.children(id) {
                    Self::render_node(ui, tree, child.id, actions);
                }
            });
    }
}

/// Renders the project tab strip
pub struct ProjectTabsPanel;

impl ProjectTabsPanel {
    pub fn render(ui: &mut Ui, workbench: &mut ProjectWorkbench) -> Vec<AppAction> {
        let mut actions = Vec::new();
        let current = workbench.current_index();
        let names: Vec<String> = workbench.projects().iter().map(|p| p.name.clone()).collect();
        let can_close = names.len() > 1;

        ui.horizontal(|ui| {
            for (index, name) in names.iter().enumerate() {
                let editing = workbench
                    .rename_editor()
                    .is_some_and(|editor| editor.index == index);

                if editing {
                    if let Some(editor) = workbench.rename_editor_mut() {
                        let response = ui.add(
                            egui::TextEdit::singleline(&mut editor.text).desired_width(120.0),
                        );
                        if !response.has_focus() && !response.lost_focus() {
                            response.request_focus();
                        }
                        if ui.input(|i| i.key_pressed(egui::Key::Escape)) {
                            actions.push(AppAction::CancelRename);
                        } else if response.lost_focus() {
                            actions.push(AppAction::CommitRename);
                        }
                    }
                } else {
                    let response = ui.selectable_label(index == current, name);
                    if response.double_clicked() {
                        actions.push(AppAction::BeginRename(index));
                    } else if response.clicked() {
                        actions.push(AppAction::SelectProject(index));
                    }
                }

                if can_close
                    && ui
                        .small_button("x")
                        .on_hover_text("Close project")
                        .clicked()
                {
                    actions.push(AppAction::CloseProject(index));
                }
                ui.separator();
            }

            if ui.button("+").on_hover_text("New project").clicked() {
                actions.push(AppAction::AddProject);
            }
        });

        actions
    }
}
