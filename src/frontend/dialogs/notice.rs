//! Notice dialog
//!
//! Shows the oldest queued [`Notice`]; OK dismisses it and the next one
//! appears on the following frame.

use super::{Dialog, DialogAction, DialogState, DialogWindowConfig};
use crate::workbench::{Notice, Severity};
use egui::{Color32, RichText, Ui};

#[derive(Debug, Default)]
pub struct NoticeState {
    pub notice: Option<Notice>,
}

impl DialogState for NoticeState {
    fn is_valid(&self) -> bool {
        self.notice.is_some()
    }
}

impl NoticeState {
    pub fn with_notice(notice: Notice) -> Self {
        Self {
            notice: Some(notice),
        }
    }
}

#[derive(Debug, Clone)]
pub enum NoticeAction {
    Dismiss,
}

pub struct NoticeContext;

pub struct NoticeDialog;

impl Dialog for NoticeDialog {
    type State = NoticeState;
    type Action = NoticeAction;
    type Context<'a> = NoticeContext;

    fn title(state: &Self::State) -> String {
        state
            .notice
            .as_ref()
            .map(|n| n.title.clone())
            .unwrap_or_else(|| "Notice".to_string())
    }

    fn window_config() -> DialogWindowConfig {
        DialogWindowConfig::centered(340.0)
    }

    fn render(
        state: &mut Self::State,
        _ctx: Self::Context<'_>,
        ui: &mut Ui,
    ) -> DialogAction<Self::Action> {
        let Some(notice) = &state.notice else {
            return DialogAction::Close;
        };

        let (icon, color) = match notice.severity {
            Severity::Info => ("ℹ", Color32::from_rgb(100, 150, 255)),
            Severity::Warning => ("⚠", Color32::YELLOW),
            Severity::Error => ("✖", Color32::LIGHT_RED),
        };
        ui.horizontal(|ui| {
            ui.label(RichText::new(icon).color(color).size(20.0));
            ui.label(&notice.message);
        });
        ui.label(
            RichText::new(notice.at.format("%H:%M:%S").to_string())
                .small()
                .weak(),
        );
        ui.separator();

        if ui.button("OK").clicked() || ui.input(|i| i.key_pressed(egui::Key::Enter)) {
            return DialogAction::CloseWithAction(NoticeAction::Dismiss);
        }
        DialogAction::None
    }
}
