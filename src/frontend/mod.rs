//! Frontend module for egui UI
//!
//! Renders the workbench with eframe/egui. Panels and dialogs return
//! [`AppAction`]s; the app applies them to the [`ProjectWorkbench`] after the
//! frame's widgets are laid out, then reconciles the visuals dock.
//!
//! # Layout
//!
//! ```text
//! ┌──────────────────────────────────────────────────┐
//! │ File  Edit  View                                 │
//! │ [Analysis] ▾ ✔ │ [Plot] mode │ [Table] mode      │
//! │ Project 1 x │ Project 2 x │ +                    │
//! ├──────────────┬───────────────────────────────────┤
//! │ Data         │ [chart] [table] ...               │
//! │   meas1 Table│                                   │
//! │ Models       │         visuals dock              │
//! ├──────────────┴───────────────────────────────────┤
//! │ status bar                                       │
//! └──────────────────────────────────────────────────┘
//! ```
//!
//! # Submodules
//!
//! - `workspace` - Per-project dock of chart and table tabs
//! - `panels` - Explore tree and project tabs
//! - `plot` - Chart and table rendering
//! - `dialogs` - Notice, model, parameter and quit dialogs

pub mod dialogs;
mod panels;
mod plot;
pub mod state;
mod status_bar;
mod toolbar;
pub mod workspace;

pub use panels::{ExplorePanel, ProjectTabsPanel};
pub use state::{AppAction, FrontendHost, PendingQuestion};

use std::path::Path;

use dialogs::{
    show_dialog, AnalysisParametersAction, AnalysisParametersContext, AnalysisParametersDialog,
    AnalysisParametersState, ModelGeneratorAction, ModelGeneratorContext, ModelGeneratorDialog,
    ModelGeneratorState, NoticeAction, NoticeContext, NoticeDialog, NoticeState,
    QuitConfirmAction, QuitConfirmContext, QuitConfirmDialog, QuitConfirmState,
};
use status_bar::{render_status_bar, StatusBarContext};
use workspace::tab_viewer::VisualsTabViewer;
use workspace::Workspace;

use crate::backend::DeviceComputeService;
use crate::config::{AppConfig, MEASUREMENT_FILE_EXTENSION};
use crate::error::{Result, WorkbenchError};
use crate::workbench::{Notice, ProjectWorkbench, TabId, UiHost};

/// Main application state implementing [`eframe::App`]
pub struct WorkbenchApp {
    workbench: ProjectWorkbench,
    host: FrontendHost,
    config: AppConfig,
    workspace: Workspace,
    last_notice: Option<Notice>,

    // === Dialogs ===
    notice_open: bool,
    notice_state: NoticeState,
    model_open: bool,
    model_state: ModelGeneratorState,
    params_open: bool,
    params_state: AnalysisParametersState,
    quit_open: bool,
    quit_state: QuitConfirmState,
    quit_confirmed: bool,
}

impl WorkbenchApp {
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        config: AppConfig,
        service: Box<dyn DeviceComputeService>,
    ) -> Self {
        let mut style = (*cc.egui_ctx.style()).clone();
        style.text_styles.iter_mut().for_each(|(_, font_id)| {
            font_id.size *= config.ui.font_scale;
        });
        cc.egui_ctx.set_style(style);
        apply_theme(&cc.egui_ctx, config.ui.dark_mode);

        let workbench = ProjectWorkbench::new(service, config.analysis.clone());

        Self {
            workbench,
            host: FrontendHost::new(),
            config,
            workspace: Workspace::new(),
            last_notice: None,
            notice_open: false,
            notice_state: NoticeState::default(),
            model_open: false,
            model_state: ModelGeneratorState::default(),
            params_open: false,
            params_state: AnalysisParametersState::default(),
            quit_open: false,
            quit_state: QuitConfirmState::default(),
            quit_confirmed: false,
        }
    }

    fn handle_action(&mut self, ctx: &egui::Context, action: AppAction) {
        tracing::trace!("Action {:?}", action);
        let wb = &mut self.workbench;
        let host = &mut self.host;

        match action {
            AppAction::OpenFile(path) => {
                if wb.open_file(&path, host).is_some() {
                    self.config.ui.last_directory = path.parent().map(Path::to_path_buf);
                }
            }
            AppAction::GenerateModel(family, params) => {
                wb.generate_model(family, &params, host);
            }
            AppAction::ExportChart(tab, path) => {
                if let Err(err) = export_chart(wb, tab, &path) {
                    host.report(&err);
                } else {
                    host.notify(Notice::info(
                        "Export",
                        format!("Chart written to {}", path.display()),
                    ));
                }
            }

            AppAction::ToggleAnalysis(on) => wb.toolbar.analysis = on,
            AppAction::TogglePlot(on) => wb.set_plot_toggled(on),
            AppAction::ToggleTable(on) => wb.toolbar.table = on,
            AppAction::SetChecked(item, checked) => wb.toolbar.set_checked(item, checked),
            AppAction::ToggleSelectAll => wb.toolbar.toggle_select_all(),
            AppAction::ConfirmAnalysis => {
                wb.confirm_analysis(host);
            }
            AppAction::SetPlotMode(mode) => wb.set_plot_mode(mode),
            AppAction::SetTableMode(mode) => wb.toolbar.table_mode = mode,

            AppAction::TreeClicked(node) => {
                wb.tree_item_clicked(node, host);
            }

            AppAction::AddProject => {
                wb.add_project();
            }
            AppAction::CloseProject(index) => {
                let id = wb.projects().get(index).map(|p| p.id);
                if wb.close_project(index) {
                    if let Some(id) = id {
                        self.workspace.remove_project(id);
                    }
                }
            }
            AppAction::SelectProject(index) => wb.set_current(index),
            AppAction::BeginRename(index) => wb.begin_rename(index),
            AppAction::CommitRename => wb.commit_rename(),
            AppAction::CancelRename => wb.cancel_rename(),

            AppAction::CloseTab(tab) => {
                wb.close_tab(tab);
            }
            AppAction::TableSelect {
                tab,
                cells,
                active_column,
                extend,
            } => wb.table_selection(tab, &cells, active_column, extend),
            AppAction::TableKey(tab, key) => {
                wb.table_key(tab, key, host);
            }

            AppAction::Undo => wb.undo(host),
            AppAction::Redo => wb.redo(host),
            AppAction::EditParameters(params) => {
                wb.edit_analysis_parameters(params, host);
            }
            AppAction::SetApplyForAll(on) => wb.settings.apply_for_all = on,

            AppAction::OpenModelDialog => {
                self.model_state = ModelGeneratorState::default();
                self.model_open = true;
            }
            AppAction::OpenParametersDialog => {
                self.params_state = AnalysisParametersState::with_parameters(
                    wb.current().engine.parameters().clone(),
                );
                self.params_open = true;
            }
            AppAction::RequestQuit => {
                if wb.request_quit(host) {
                    self.quit_confirmed = true;
                    ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                } else if let Some(question) = host.pending_question() {
                    self.quit_state.question = Some(question.clone());
                    self.quit_open = true;
                }
            }
        }

        let project = self.workbench.current();
        self.workspace.sync(project.id, &project.visuals);
    }

    fn handle_keyboard_shortcuts(&mut self, ctx: &egui::Context) -> Vec<AppAction> {
        use egui::Key;

        let mut actions = Vec::new();
        let mut open_file = false;
        ctx.input(|i| {
            if i.key_pressed(Key::O) && i.modifiers.command_only() {
                open_file = true;
            }
            if i.key_pressed(Key::Z) && i.modifiers.command_only() {
                actions.push(AppAction::Undo);
            }
            if i.key_pressed(Key::Y) && i.modifiers.command_only() {
                actions.push(AppAction::Redo);
            }
        });

        // The native dialog blocks, so it runs outside the input lock
        if open_file {
            actions.extend(pick_measurements(self.config.ui.last_directory.as_deref()));
        }
        actions
    }

    fn render_menu_bar(&mut self, ui: &mut egui::Ui) -> Vec<AppAction> {
        let mut actions = Vec::new();
        egui::MenuBar::new().ui(ui, |ui| {
            ui.menu_button("File", |ui| {
                if ui.button("Open Measurement...").clicked() {
                    actions.extend(pick_measurements(self.config.ui.last_directory.as_deref()));
                    ui.close();
                }
                if ui.button("Generate Model...").clicked() {
                    actions.push(AppAction::OpenModelDialog);
                    ui.close();
                }
                ui.separator();
                if ui.button("Quit").clicked() {
                    actions.push(AppAction::RequestQuit);
                    ui.close();
                }
            });

            ui.menu_button("Edit", |ui| {
                if ui.button("Undo").clicked() {
                    actions.push(AppAction::Undo);
                    ui.close();
                }
                if ui.button("Redo").clicked() {
                    actions.push(AppAction::Redo);
                    ui.close();
                }
                ui.separator();
                if ui.button("Analysis Parameters...").clicked() {
                    actions.push(AppAction::OpenParametersDialog);
                    ui.close();
                }
                let mut apply_for_all = self.workbench.settings.apply_for_all;
                if ui.checkbox(&mut apply_for_all, "Apply for all").changed() {
                    actions.push(AppAction::SetApplyForAll(apply_for_all));
                }
            });

            ui.menu_button("View", |ui| {
                if ui.checkbox(&mut self.config.ui.dark_mode, "Dark mode").changed() {
                    apply_theme(ui.ctx(), self.config.ui.dark_mode);
                }
            });
        });
        actions
    }

    fn render_dialogs(&mut self, ctx: &egui::Context) -> Vec<AppAction> {
        let mut actions = Vec::new();

        if !self.notice_open {
            if let Some(notice) = self.host.current_notice() {
                self.last_notice = Some(notice.clone());
                self.notice_state = NoticeState::with_notice(notice.clone());
                self.notice_open = true;
            }
        }
        if let Some(NoticeAction::Dismiss) = show_dialog::<NoticeDialog>(
            ctx,
            &mut self.notice_open,
            &mut self.notice_state,
            NoticeContext,
        ) {
            self.host.dismiss_notice();
        }

        if let Some(ModelGeneratorAction::Generate(family, params)) =
            show_dialog::<ModelGeneratorDialog>(
                ctx,
                &mut self.model_open,
                &mut self.model_state,
                ModelGeneratorContext,
            )
        {
            actions.push(AppAction::GenerateModel(family, params));
        }

        if let Some(AnalysisParametersAction::Apply(params)) =
            show_dialog::<AnalysisParametersDialog>(
                ctx,
                &mut self.params_open,
                &mut self.params_state,
                AnalysisParametersContext,
            )
        {
            actions.push(AppAction::EditParameters(params));
        }

        if let Some(QuitConfirmAction::Answer(yes)) = show_dialog::<QuitConfirmDialog>(
            ctx,
            &mut self.quit_open,
            &mut self.quit_state,
            QuitConfirmContext,
        ) {
            self.host.answer(yes);
            if yes {
                actions.push(AppAction::RequestQuit);
            }
        }

        actions
    }
}

impl eframe::App for WorkbenchApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let mut actions = self.handle_keyboard_shortcuts(ctx);

        if ctx.input(|i| i.viewport().close_requested()) && !self.quit_confirmed {
            ctx.send_viewport_cmd(egui::ViewportCommand::CancelClose);
            actions.push(AppAction::RequestQuit);
        }

        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            actions.extend(self.render_menu_bar(ui));
        });

        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            actions.extend(toolbar::render_toolbar(
                ui,
                &self.workbench.toolbar,
                self.workbench.settings.apply_for_all,
            ));
        });

        egui::TopBottomPanel::top("project_tabs").show(ctx, |ui| {
            actions.extend(ProjectTabsPanel::render(ui, &mut self.workbench));
        });

        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            render_status_bar(
                ui,
                &StatusBarContext {
                    project: self.workbench.current(),
                    toolbar: &self.workbench.toolbar,
                    last_notice: self.last_notice.as_ref(),
                },
            );
        });

        egui::SidePanel::left("explore_tree")
            .resizable(true)
            .default_width(280.0)
            .show(ctx, |ui| {
                ui.heading("Explore");
                ui.separator();
                actions.extend(ExplorePanel::render(ui, &self.workbench.current().tree));
            });

        {
            let project = self.workbench.current();
            let (dock, anchors) = self.workspace.parts_mut(project.id);
            let mut viewer = VisualsTabViewer {
                visuals: &project.visuals,
                anchors,
                actions: Vec::new(),
            };
            egui_dock::DockArea::new(dock)
                .style(egui_dock::Style::from_egui(ctx.style().as_ref()))
                .show_add_buttons(false)
                .show(ctx, &mut viewer);
            actions.extend(viewer.actions);
        }

        actions.extend(self.render_dialogs(ctx));

        for action in actions {
            self.handle_action(ctx, action);
        }
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        if let Err(e) = self.config.save() {
            tracing::warn!("Failed to save config: {}", e);
        }
        tracing::info!("Workbench closed");
    }
}

fn apply_theme(ctx: &egui::Context, dark: bool) {
    if dark {
        ctx.set_visuals(egui::Visuals::dark());
    } else {
        ctx.set_visuals(egui::Visuals::light());
    }
}

fn pick_measurements(start: Option<&Path>) -> Vec<AppAction> {
    let mut dialog = rfd::FileDialog::new()
        .set_title("Open Measurement")
        .add_filter("Field map", &[MEASUREMENT_FILE_EXTENSION]);
    if let Some(dir) = start {
        dialog = dialog.set_directory(dir);
    }
    dialog
        .pick_files()
        .unwrap_or_default()
        .into_iter()
        .map(AppAction::OpenFile)
        .collect()
}

fn export_chart(workbench: &ProjectWorkbench, tab: TabId, path: &Path) -> Result<()> {
    let json = workbench.export_chart(tab)?;
    std::fs::write(path, json).map_err(WorkbenchError::from)?;
    tracing::info!("Exported chart to {}", path.display());
    Ok(())
}
