//! Analysis parameter editor
//!
//! Edits the parameter set of the current project. Results already cached
//! keep the values they were computed with.

use super::{Dialog, DialogAction, DialogState, DialogWindowConfig};
use crate::config::{AnalysisParameters, GridSpec};
use egui::{Color32, Ui};

#[derive(Debug, Default)]
pub struct AnalysisParametersState {
    pub params: AnalysisParameters,
}

impl DialogState for AnalysisParametersState {
    fn is_valid(&self) -> bool {
        self.params.validate().is_ok()
    }
}

impl AnalysisParametersState {
    pub fn with_parameters(params: AnalysisParameters) -> Self {
        Self { params }
    }
}

#[derive(Debug, Clone)]
pub enum AnalysisParametersAction {
    Apply(AnalysisParameters),
}

pub struct AnalysisParametersContext;

pub struct AnalysisParametersDialog;

fn grid_row(ui: &mut Ui, label: &str, grid: &mut GridSpec) {
    ui.label(label);
    ui.horizontal(|ui| {
        ui.add(egui::DragValue::new(&mut grid.start).speed(1.0).prefix("from "));
        ui.add(egui::DragValue::new(&mut grid.stop).speed(1.0).prefix("to "));
        ui.add(egui::DragValue::new(&mut grid.step).speed(0.1).prefix("step "));
    });
    ui.end_row();
}

impl Dialog for AnalysisParametersDialog {
    type State = AnalysisParametersState;
    type Action = AnalysisParametersAction;
    type Context<'a> = AnalysisParametersContext;

    fn title(_state: &Self::State) -> String {
        "Analysis Parameters".to_string()
    }

    fn window_config() -> DialogWindowConfig {
        DialogWindowConfig::centered(420.0)
    }

    fn render(
        state: &mut Self::State,
        _ctx: Self::Context<'_>,
        ui: &mut Ui,
    ) -> DialogAction<Self::Action> {
        let p = &mut state.params;
        egui::Grid::new("analysis_parameters_grid")
            .num_columns(2)
            .spacing([12.0, 4.0])
            .show(ui, |ui| {
                ui.label("Energy [GeV]");
                ui.add(egui::DragValue::new(&mut p.energy_gev).speed(0.01));
                ui.end_row();

                grid_row(ui, "z grid [mm]", &mut p.z_grid);
                grid_row(ui, "x grid [mm]", &mut p.x_grid);

                ui.label("Initial z [mm]");
                ui.add(egui::DragValue::new(&mut p.initial_state[2]).speed(1.0));
                ui.end_row();

                ui.label("Initial x', y' [rad]");
                ui.horizontal(|ui| {
                    ui.add(egui::DragValue::new(&mut p.initial_state[3]).speed(1e-5));
                    ui.add(egui::DragValue::new(&mut p.initial_state[4]).speed(1e-5));
                });
                ui.end_row();

                ui.label("z max [mm]");
                ui.add(egui::DragValue::new(&mut p.z_max).speed(1.0));
                ui.end_row();

                ui.label("RK step [mm]");
                ui.add(egui::DragValue::new(&mut p.rk_step).speed(0.01));
                ui.end_row();

                ui.label("Skipped poles");
                ui.add(egui::DragValue::new(&mut p.skip_poles).range(0..=50));
                ui.end_row();
            });

        if let Err(err) = state.params.validate() {
            ui.colored_label(Color32::LIGHT_RED, err.to_string());
        }
        ui.separator();

        let valid = state.is_valid();
        ui.horizontal(|ui| {
            if ui.add_enabled(valid, egui::Button::new("Apply")).clicked() {
                return DialogAction::CloseWithAction(AnalysisParametersAction::Apply(
                    state.params.clone(),
                ));
            }
            if ui.button("Defaults").clicked() {
                state.params = AnalysisParameters::default();
            }
            if ui.button("Cancel").clicked() {
                return DialogAction::Close;
            }
            DialogAction::None
        })
        .inner
    }
}
