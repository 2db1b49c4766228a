//! Modal dialogs of the workbench
//!
//! Every dialog implements [`Dialog`]: its state lives in the app, rendering
//! returns a [`DialogAction`], and [`show_dialog`] owns the window lifecycle.

use egui::{Align2, Context, Ui};

/// What a dialog asks for after a frame
#[derive(Debug, Clone, Default)]
pub enum DialogAction<A> {
    /// Stay open
    #[default]
    None,
    /// Close without acting
    Close,
    /// Close and act
    CloseWithAction(A),
    /// Act and stay open
    Action(A),
}

impl<A> DialogAction<A> {
    pub fn should_close(&self) -> bool {
        matches!(self, DialogAction::Close | DialogAction::CloseWithAction(_))
    }

    pub fn into_action(self) -> Option<A> {
        match self {
            DialogAction::CloseWithAction(a) | DialogAction::Action(a) => Some(a),
            _ => None,
        }
    }
}

/// Dialog state that can be reset when the window closes
pub trait DialogState: Default {
    fn reset(&mut self) {
        *self = Self::default();
    }

    /// Whether the confirm button should be enabled
    fn is_valid(&self) -> bool {
        true
    }
}

/// Window appearance of a dialog
#[derive(Debug, Clone)]
pub struct DialogWindowConfig {
    pub default_width: f32,
    pub resizable: bool,
    pub anchor: Option<(Align2, [f32; 2])>,
}

impl Default for DialogWindowConfig {
    fn default() -> Self {
        Self {
            default_width: 360.0,
            resizable: false,
            anchor: Some((Align2::CENTER_CENTER, [0.0, 0.0])),
        }
    }
}

impl DialogWindowConfig {
    /// Centered, fixed-size window
    pub fn centered(width: f32) -> Self {
        Self {
            default_width: width,
            ..Self::default()
        }
    }
}

/// A dialog with typed state, action and render context.
///
/// ```ignore
/// impl Dialog for NoticeDialog {
///     type State = NoticeState;
///     type Action = NoticeAction;
///     type Context<'a> = NoticeContext;
///
///     fn title(state: &NoticeState) -> String { state.title.clone() }
///     fn render(state: &mut NoticeState, _: NoticeContext, ui: &mut Ui) -> DialogAction<NoticeAction> {
///         ui.label(&state.message);
///         DialogAction::None
///     }
/// }
/// ```
pub trait Dialog {
    type State: DialogState;
    type Action;
    type Context<'a>;

    fn title(state: &Self::State) -> String;

    fn window_config() -> DialogWindowConfig {
        DialogWindowConfig::default()
    }

    fn render(
        state: &mut Self::State,
        ctx: Self::Context<'_>,
        ui: &mut Ui,
    ) -> DialogAction<Self::Action>;
}

/// Show a dialog while `is_open`, closing and resetting it when it asks to.
///
/// Returns the action the dialog produced this frame.
pub fn show_dialog<D: Dialog>(
    ctx: &Context,
    is_open: &mut bool,
    state: &mut D::State,
    dialog_ctx: D::Context<'_>,
) -> Option<D::Action> {
    if !*is_open {
        return None;
    }

    let config = D::window_config();
    let mut window = egui::Window::new(D::title(state))
        .collapsible(false)
        .resizable(config.resizable)
        .default_width(config.default_width);
    if let Some((align, offset)) = config.anchor {
        window = window.anchor(align, offset);
    }

    let mut action = DialogAction::None;
    window.show(ctx, |ui| {
        action = D::render(state, dialog_ctx, ui);
    });

    if action.should_close() {
        *is_open = false;
        state.reset();
    }
    action.into_action()
}

pub mod analysis_parameters;
pub mod model_generator;
pub mod notice;
pub mod quit_confirm;

pub use analysis_parameters::{
    AnalysisParametersAction, AnalysisParametersContext, AnalysisParametersDialog,
    AnalysisParametersState,
};
pub use model_generator::{
    ModelGeneratorAction, ModelGeneratorContext, ModelGeneratorDialog, ModelGeneratorState,
};
pub use notice::{NoticeAction, NoticeContext, NoticeDialog, NoticeState};
pub use quit_confirm::{QuitConfirmAction, QuitConfirmContext, QuitConfirmDialog, QuitConfirmState};
