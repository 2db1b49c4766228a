//! Chart and table rendering for the visuals panel
//!
//! Charts are drawn with egui_plot, tables with a virtualized row list so
//! long field maps stay responsive.

use egui::{Color32, RichText, Ui};
use egui_plot::{Legend, Line, Plot, PlotPoints};

use crate::frontend::state::AppAction;
use crate::workbench::{Cell, Chart, TabId, TableKey, TableView};

/// Colors cycled through for the curves of a chart
const CURVE_COLORS: [Color32; 6] = [
    Color32::from_rgb(100, 150, 255),
    Color32::from_rgb(255, 140, 80),
    Color32::from_rgb(110, 200, 110),
    Color32::from_rgb(220, 90, 120),
    Color32::from_rgb(180, 130, 230),
    Color32::from_rgb(230, 200, 80),
];

const CELL_WIDTH: f32 = 90.0;

/// Draw a chart
pub fn render_chart(ui: &mut Ui, tab: TabId, chart: &Chart) {
    if chart.curves.is_empty() {
        ui.centered_and_justified(|ui| {
            ui.label("Nothing to plot");
        });
        return;
    }

    let plot = Plot::new(("visual_chart", tab.0))
        .x_axis_label(chart.x_label.clone())
        .y_axis_label(chart.y_label.clone())
        .show_grid(chart.grid)
        .allow_zoom(true)
        .allow_drag(true)
        .legend(Legend::default().position(egui_plot::Corner::RightTop));

    plot.show(ui, |plot_ui| {
        for (i, curve) in chart.curves.iter().enumerate() {
            let line = Line::new(curve.label.clone(), PlotPoints::from(curve.points.clone()))
                .color(CURVE_COLORS[i % CURVE_COLORS.len()])
                .width(1.5);
            plot_ui.line(line);
        }
    });
}

/// Draw a table and translate clicks and keys into actions.
///
/// Click selects a cell, shift-click a rectangle from the last clicked cell
/// and ctrl-click adds a cell to the selection.
pub fn render_table(ui: &mut Ui, tab: TabId, table: &TableView, anchor: &mut Option<Cell>) -> Vec<AppAction> {
    let mut actions = Vec::new();
    let rows = table.row_count();
    let columns = table.column_count();

    ui.horizontal(|ui| {
        ui.add_sized([40.0, 18.0], egui::Label::new(""));
        for header in &table.header {
            ui.add_sized([CELL_WIDTH, 18.0], egui::Label::new(RichText::new(header).strong()));
        }
    });
    ui.separator();

    let row_height = ui.spacing().interact_size.y;
    egui::ScrollArea::both()
        .id_salt(("visual_table", tab.0))
        .auto_shrink([false, false])
        .show_rows(ui, row_height, rows, |ui, range| {
            for row in range {
                ui.horizontal(|ui| {
                    ui.add_sized(
                        [40.0, row_height],
                        egui::Label::new(RichText::new(format!("{}", row + 1)).weak()),
                    );
                    for column in 0..columns {
                        let cell = (row, column);
                        let selected = table.selection.contains(cell);
                        let response = ui.add_sized(
                            [CELL_WIDTH, row_height],
                            egui::Button::selectable(selected, table.cell_text(cell)),
                        );
                        if response.clicked() {
                            let modifiers = ui.input(|i| i.modifiers);
                            actions.push(click_action(tab, cell, modifiers, anchor));
                        }
                    }
                });
            }
        });

    if ui.ui_contains_pointer() {
        let key = ui.input(|i| {
            if i.key_pressed(egui::Key::Enter) {
                Some(TableKey::Enter)
            } else if i.key_pressed(egui::Key::Space) {
                Some(TableKey::Space)
            } else {
                None
            }
        });
        if let Some(key) = key {
            actions.push(AppAction::TableKey(tab, key));
        }
    }

    actions
}

fn click_action(tab: TabId, cell: Cell, modifiers: egui::Modifiers, anchor: &mut Option<Cell>) -> AppAction {
    match (*anchor, modifiers.shift, modifiers.command) {
        (Some(start), true, _) => {
            let rows = start.0.min(cell.0)..=start.0.max(cell.0);
            let columns = start.1.min(cell.1)..=start.1.max(cell.1);
            let cells = rows
                .flat_map(|r| columns.clone().map(move |c| (r, c)))
                .collect();
            AppAction::TableSelect {
                tab,
                cells,
                active_column: cell.1,
                extend: false,
            }
        }
        (_, _, extend) => {
            *anchor = Some(cell);
            AppAction::TableSelect {
                tab,
                cells: vec![cell],
                active_column: cell.1,
                extend,
            }
        }
    }
}
