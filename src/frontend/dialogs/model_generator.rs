//! Model generation dialog
//!
//! Pick a device family, adjust its preset geometry and generate a model
//! under the Models container.

use super::{Dialog, DialogAction, DialogState, DialogWindowConfig};
use crate::config::{ModelFamily, ModelParameters};
use egui::{Color32, Ui};

#[derive(Debug)]
pub struct ModelGeneratorState {
    pub family: ModelFamily,
    pub params: ModelParameters,
}

impl Default for ModelGeneratorState {
    fn default() -> Self {
        let family = ModelFamily::AppleIISabia;
        Self {
            family,
            params: family.default_parameters(),
        }
    }
}

impl DialogState for ModelGeneratorState {
    fn is_valid(&self) -> bool {
        self.params.validate().is_ok()
    }
}

#[derive(Debug, Clone)]
pub enum ModelGeneratorAction {
    Generate(ModelFamily, ModelParameters),
}

pub struct ModelGeneratorContext;

pub struct ModelGeneratorDialog;

impl Dialog for ModelGeneratorDialog {
    type State = ModelGeneratorState;
    type Action = ModelGeneratorAction;
    type Context<'a> = ModelGeneratorContext;

    fn title(_state: &Self::State) -> String {
        "Generate Model".to_string()
    }

    fn window_config() -> DialogWindowConfig {
        DialogWindowConfig::centered(320.0)
    }

    fn render(
        state: &mut Self::State,
        _ctx: Self::Context<'_>,
        ui: &mut Ui,
    ) -> DialogAction<Self::Action> {
        egui::ComboBox::from_label("Family")
            .selected_text(state.family.display_name())
            .show_ui(ui, |ui| {
                for &family in ModelFamily::all() {
                    if ui
                        .selectable_label(state.family == family, family.display_name())
                        .clicked()
                        && state.family != family
                    {
                        state.family = family;
                        state.params = family.default_parameters();
                    }
                }
            });

        ui.separator();

        let p = &mut state.params;
        egui::Grid::new("model_generator_grid")
            .num_columns(2)
            .spacing([12.0, 4.0])
            .show(ui, |ui| {
                ui.label("Period [mm]");
                ui.add(egui::DragValue::new(&mut p.period).speed(0.1).range(1.0..=500.0));
                ui.end_row();

                ui.label("Periods");
                ui.add(egui::DragValue::new(&mut p.nr_periods).range(1..=500));
                ui.end_row();

                ui.label("Gap [mm]");
                ui.add(egui::DragValue::new(&mut p.gap).speed(0.1).range(0.1..=100.0));
                ui.end_row();

                ui.label("Block height [mm]");
                ui.add(egui::DragValue::new(&mut p.block_height).speed(0.1).range(0.1..=200.0));
                ui.end_row();

                ui.label("Block width [mm]");
                ui.add(egui::DragValue::new(&mut p.block_width).speed(0.1).range(0.1..=200.0));
                ui.end_row();

                ui.label("Remanence [T]");
                ui.add(egui::DragValue::new(&mut p.remanence).speed(0.01).range(0.1..=2.0));
                ui.end_row();

                ui.label("Phase [mm]");
                ui.add_enabled(
                    state.family.is_elliptical(),
                    egui::DragValue::new(&mut p.phase).speed(0.1),
                );
                ui.end_row();
            });

        if let Err(err) = state.params.validate() {
            ui.colored_label(Color32::LIGHT_RED, err.to_string());
        }
        ui.separator();

        let valid = state.is_valid();
        ui.horizontal(|ui| {
            if ui.add_enabled(valid, egui::Button::new("Generate")).clicked() {
                return DialogAction::CloseWithAction(ModelGeneratorAction::Generate(
                    state.family,
                    state.params,
                ));
            }
            if ui.button("Cancel").clicked() {
                return DialogAction::Close;
            }
            DialogAction::None
        })
        .inner
    }
}
