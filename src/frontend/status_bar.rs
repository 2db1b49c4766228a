//! Status bar panel: bottom bar with project counts and the last notice.

use egui::{Color32, RichText, Ui};

use crate::workbench::{Notice, Project, Severity, Toolbar};

/// Context needed to render the status bar.
pub struct StatusBarContext<'a> {
    pub project: &'a Project,
    pub toolbar: &'a Toolbar,
    pub last_notice: Option<&'a Notice>,
}

/// Render the status bar.
pub fn render_status_bar(ui: &mut Ui, ctx: &StatusBarContext<'_>) {
    ui.horizontal(|ui| {
        ui.spacing_mut().item_spacing.x = 8.0;

        ui.label(RichText::new(&ctx.project.name).small().strong());
        ui.separator();

        ui.label(RichText::new(format!("Devices: {}", ctx.project.registry.len())).small());
        ui.separator();
        ui.label(RichText::new(format!("Analyses: {}", ctx.project.cache.len())).small());
        ui.separator();
        ui.label(RichText::new(format!("Tabs: {}", ctx.project.visuals.len())).small());
        ui.separator();

        if let Some(pending) = ctx.project.plots.pending() {
            ui.colored_label(
                Color32::from_rgb(150, 150, 200),
                RichText::new(format!("x = {} (pick y)", pending.label)).small(),
            );
            ui.separator();
        }

        ui.label(RichText::new(ctx.toolbar.plot_mode.display_name()).small());

        if let Some(notice) = ctx.last_notice {
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                let color = match notice.severity {
                    Severity::Info => Color32::GRAY,
                    Severity::Warning => Color32::YELLOW,
                    Severity::Error => Color32::RED,
                };
                ui.colored_label(
                    color,
                    RichText::new(format!("{} {}", notice.at.format("%H:%M:%S"), notice.message))
                        .small(),
                );
            });
        }
    });
}
