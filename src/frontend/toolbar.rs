//! Toolbar panel: Analysis/Plot/Table toggles with their option menus.
//!
//! Sits between the menu bar and the project tabs.

use egui::{Color32, RichText, Ui};

use crate::frontend::state::AppAction;
use crate::workbench::{ChecklistItem, ConfirmIcon, PlotMode, TableMode, Toolbar};

/// Render the main application toolbar.
pub fn render_toolbar(ui: &mut Ui, toolbar: &Toolbar, apply_for_all: bool) -> Vec<AppAction> {
    let mut actions = Vec::new();

    ui.horizontal(|ui| {
        ui.spacing_mut().item_spacing.x = 4.0;

        render_analysis_group(ui, toolbar, apply_for_all, &mut actions);
        ui.separator();
        render_plot_group(ui, toolbar, &mut actions);
        ui.separator();
        render_table_group(ui, toolbar, &mut actions);
    });

    actions
}

fn toggle(ui: &mut Ui, label: &str, on: bool, hover: &str) -> bool {
    let text = if on {
        RichText::new(label).color(Color32::WHITE)
    } else {
        RichText::new(label)
    };
    let mut button = egui::Button::new(text).selected(on);
    if on {
        button = button.fill(Color32::from_rgb(50, 100, 160));
    }
    ui.add(button).on_hover_text(hover).clicked()
}

fn render_analysis_group(
    ui: &mut Ui,
    toolbar: &Toolbar,
    apply_for_all: bool,
    actions: &mut Vec<AppAction>,
) {
    if toggle(
        ui,
        "Analysis",
        toolbar.analysis,
        "Click a device in the tree to run the checked analyses",
    ) {
        actions.push(AppAction::ToggleAnalysis(!toolbar.analysis));
    }

    ui.menu_button("Analyses", |ui| {
        for &item in ChecklistItem::all() {
            let mut checked = toolbar.is_checked(item);
            if ui.checkbox(&mut checked, item.display_name()).changed() {
                actions.push(AppAction::SetChecked(item, checked));
            }
        }
        ui.separator();
        let mut all = toolbar.select_all();
        if ui.checkbox(&mut all, "Select all").changed() {
            actions.push(AppAction::ToggleSelectAll);
        }
    });

    let icon = match toolbar.confirm_icon() {
        ConfirmIcon::Confirm => "✔",
        ConfirmIcon::ConfirmAll => "✔✔",
    };
    let hover = if apply_for_all {
        "Apply the checked analyses to every Data device"
    } else {
        "Enable 'Apply for all' in the Edit menu to run on every device"
    };
    if ui.button(icon).on_hover_text(hover).clicked() {
        actions.push(AppAction::ConfirmAnalysis);
    }
}

fn render_plot_group(ui: &mut Ui, toolbar: &Toolbar, actions: &mut Vec<AppAction>) {
    if toggle(ui, "Plot", toolbar.plot, "Click results in the tree to plot them") {
        actions.push(AppAction::TogglePlot(!toolbar.plot));
    }

    egui::ComboBox::from_id_salt("toolbar_plot_mode")
        .selected_text(toolbar.plot_mode.display_name())
        .width(150.0)
        .show_ui(ui, |ui| {
            for &mode in PlotMode::all() {
                if ui
                    .selectable_label(toolbar.plot_mode == mode, mode.display_name())
                    .clicked()
                {
                    actions.push(AppAction::SetPlotMode(mode));
                }
            }
        });
}

fn render_table_group(ui: &mut Ui, toolbar: &Toolbar, actions: &mut Vec<AppAction>) {
    if toggle(ui, "Table", toolbar.table, "Click a device or result to show it as a table") {
        actions.push(AppAction::ToggleTable(!toolbar.table));
    }

    let label = |mode: TableMode| match mode {
        TableMode::DeviceTable => "Device table",
        TableMode::Reserved => "(reserved)",
    };
    egui::ComboBox::from_id_salt("toolbar_table_mode")
        .selected_text(label(toolbar.table_mode))
        .width(110.0)
        .show_ui(ui, |ui| {
            for mode in [TableMode::DeviceTable, TableMode::Reserved] {
                if ui
                    .selectable_label(toolbar.table_mode == mode, label(mode))
                    .clicked()
                {
                    actions.push(AppAction::SetTableMode(mode));
                }
            }
        });
}
