//! Quit confirmation dialog

use super::{Dialog, DialogAction, DialogState, DialogWindowConfig};
use crate::frontend::state::PendingQuestion;
use egui::Ui;

#[derive(Debug, Default)]
pub struct QuitConfirmState {
    pub question: Option<PendingQuestion>,
}

impl DialogState for QuitConfirmState {}

#[derive(Debug, Clone)]
pub enum QuitConfirmAction {
    Answer(bool),
}

pub struct QuitConfirmContext;

pub struct QuitConfirmDialog;

impl Dialog for QuitConfirmDialog {
    type State = QuitConfirmState;
    type Action = QuitConfirmAction;
    type Context<'a> = QuitConfirmContext;

    fn title(state: &Self::State) -> String {
        state
            .question
            .as_ref()
            .map(|q| q.title.clone())
            .unwrap_or_else(|| "Quit".to_string())
    }

    fn window_config() -> DialogWindowConfig {
        DialogWindowConfig::centered(300.0)
    }

    fn render(
        state: &mut Self::State,
        _ctx: Self::Context<'_>,
        ui: &mut Ui,
    ) -> DialogAction<Self::Action> {
        let Some(question) = &state.question else {
            return DialogAction::Close;
        };
        ui.label(&question.question);
        ui.separator();

        ui.horizontal(|ui| {
            if ui.button("Yes").clicked() {
                return DialogAction::CloseWithAction(QuitConfirmAction::Answer(true));
            }
            if ui.button("No").clicked() {
                return DialogAction::CloseWithAction(QuitConfirmAction::Answer(false));
            }
            DialogAction::None
        })
        .inner
    }
}
