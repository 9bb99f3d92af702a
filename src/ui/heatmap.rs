use eframe::egui::{Align2, FontId, Pos2, Rect, Sense, Ui, Vec2};

use crate::color::{text_color_on, Gradient};
use crate::data::stats::CorrelationMatrix;

const CELL: f32 = 46.0;
const ROW_LABEL_WIDTH: f32 = 52.0;
const COL_LABEL_HEIGHT: f32 = 18.0;

/// Paint a labelled grid of coloured cells, optionally annotated with values.
pub fn paint_grid(
    ui: &mut Ui,
    row_labels: &[String],
    col_labels: &[String],
    values: &[Vec<Option<f64>>],
    gradient: &Gradient,
    cell: Vec2,
    annotate: bool,
) {
    let size = Vec2::new(
        ROW_LABEL_WIDTH + cell.x * col_labels.len() as f32,
        COL_LABEL_HEIGHT + cell.y * row_labels.len() as f32,
    );
    let (response, painter) = ui.allocate_painter(size, Sense::hover());
    let origin = response.rect.min + Vec2::new(ROW_LABEL_WIDTH, COL_LABEL_HEIGHT);
    let font = FontId::proportional(11.0);
    let text_color = ui.visuals().text_color();

    for (j, label) in col_labels.iter().enumerate() {
        let pos = Pos2::new(origin.x + cell.x * (j as f32 + 0.5), origin.y - COL_LABEL_HEIGHT / 2.0);
        painter.text(pos, Align2::CENTER_CENTER, label, font.clone(), text_color);
    }

    for (i, label) in row_labels.iter().enumerate() {
        let y = origin.y + cell.y * i as f32;
        painter.text(
            Pos2::new(origin.x - 4.0, y + cell.y / 2.0),
            Align2::RIGHT_CENTER,
            label,
            font.clone(),
            text_color,
        );
        let row = values.get(i).map(Vec::as_slice).unwrap_or_default();
        for (j, value) in row.iter().enumerate() {
            let rect = Rect::from_min_size(Pos2::new(origin.x + cell.x * j as f32, y), cell);
            let fill = gradient.color_for(*value);
            painter.rect_filled(rect.shrink(0.5), 0.0, fill);
            if annotate {
                let text = value.map_or_else(|| "–".to_string(), |v| format!("{v:.2}"));
                painter.text(rect.center(), Align2::CENTER_CENTER, text, font.clone(), text_color_on(fill));
            }
        }
    }
}

/// Annotated correlation heatmap.
pub fn correlation_heatmap(ui: &mut Ui, matrix: &CorrelationMatrix, gradient: &Gradient) {
    if matrix.is_empty() {
        ui.label("Select at least one column.");
        return;
    }
    let labels: Vec<String> = matrix.columns.iter().map(|c| c.name().to_string()).collect();
    paint_grid(ui, &labels, &labels, &matrix.values, gradient, Vec2::splat(CELL), true);
}
