use eframe::egui::Ui;
use egui_plot::{Line, Plot, PlotPoints};

use crate::data::records::MonthlyTotal;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Monthly weight plot (bottom panel)
// ---------------------------------------------------------------------------

/// Render monthly weight totals for the selected residue type.
pub fn weight_plot(ui: &mut Ui, state: &AppState, label: &str, totals: &[MonthlyTotal]) {
    if totals.is_empty() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.label(format!("No residue records for {label} in the selected years."));
        });
        return;
    }

    let points: PlotPoints = totals.iter().map(|t| [t.as_plot_x(), t.weight]).collect();

    let line = Line::new(points)
        .name(label)
        .color(state.colors.color_for(label))
        .width(1.5);

    Plot::new("weight_plot")
        .legend(egui_plot::Legend::default())
        .x_axis_label("Year")
        .y_axis_label("Weight")
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            plot_ui.line(line);
        });
}
