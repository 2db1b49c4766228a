//! TabViewer implementation for the visuals dock
//!
//! Dispatches rendering to the chart or table view of each tab.

use std::collections::HashMap;

use egui::{Ui, WidgetText};

use crate::frontend::plot::{render_chart, render_table};
use crate::frontend::state::AppAction;
use crate::workbench::{Cell, TabId, VisualContent, Visuals};

/// Tab viewer that bridges egui_dock with the project's visuals.
pub struct VisualsTabViewer<'a> {
    pub visuals: &'a Visuals,
    pub anchors: &'a mut HashMap<TabId, Cell>,
    pub actions: Vec<AppAction>,
}

impl egui_dock::TabViewer for VisualsTabViewer<'_> {
    type Tab = TabId;

    fn title(&mut self, tab: &mut TabId) -> WidgetText {
        self.visuals
            .get(*tab)
            .map(|t| WidgetText::from(&t.title))
            .unwrap_or_else(|| WidgetText::from("Closed"))
    }

    fn id(&mut self, tab: &mut TabId) -> egui::Id {
        egui::Id::new(("visual_tab", tab.0))
    }

    fn ui(&mut self, ui: &mut Ui, tab: &mut TabId) {
        let Some(visual) = self.visuals.get(*tab) else {
            ui.label("Tab not found");
            return;
        };

        match &visual.content {
            VisualContent::Chart(chart) => {
                ui.horizontal(|ui| {
                    ui.heading(&chart.title);
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.button("Export JSON").clicked() {
                            if let Some(path) = rfd::FileDialog::new()
                                .set_title("Export Chart")
                                .add_filter("JSON", &["json"])
                                .set_file_name(format!("{}.json", chart.title))
                                .save_file()
                            {
                                self.actions.push(AppAction::ExportChart(*tab, path));
                            }
                        }
                    });
                });
                render_chart(ui, *tab, chart);
            }
            VisualContent::Table(table) => {
                let mut anchor = self.anchors.get(tab).copied();
                let actions = render_table(ui, *tab, table, &mut anchor);
                if let Some(cell) = anchor {
                    self.anchors.insert(*tab, cell);
                }
                self.actions.extend(actions);
            }
        }
    }

    fn on_close(&mut self, tab: &mut TabId) -> egui_dock::widgets::tab_viewer::OnCloseResponse {
        // The dock drops the tab; the workbench releases its content
        self.actions.push(AppAction::CloseTab(*tab));
        egui_dock::widgets::tab_viewer::OnCloseResponse::Close
    }

    fn closeable(&mut self, _tab: &mut TabId) -> bool {
        true
    }
}
