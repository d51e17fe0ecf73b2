//! Minimap overlay painted with egui on top of the 3D view.

use egui::{Color32, Context, Id, LayerId, Order, Pos2, Stroke, StrokeKind};
use glam::Vec2;
use mazeview_common::Pose;
use mazeview_render::{
    BACKGROUND_COLOR, BORDER_COLOR, BORDER_WIDTH, HEADING_COLOR, HEADING_WIDTH, Minimap,
    PLAYER_COLOR, PLAYER_SIZE, Rect, Rgba,
};

/// Paint the minimap in the top-left corner.
///
/// Minimap geometry is in physical pixels; egui paints in points, so
/// everything is scaled by the inverse of the pixels-per-point ratio.
pub fn draw_minimap(ctx: &Context, minimap: &Minimap, pose: &Pose) {
    let painter = ctx.layer_painter(LayerId::new(Order::Foreground, Id::new("minimap")));
    let scale = 1.0 / ctx.pixels_per_point();
    let pos = |v: Vec2| Pos2::new(v.x * scale, v.y * scale);
    let rect = |r: Rect| egui::Rect::from_min_max(pos(r.min), pos(r.max));

    painter.rect_filled(rect(minimap.bounds()), 0.0, color(BACKGROUND_COLOR));
    for cell in minimap.cells() {
        painter.rect_filled(rect(cell.rect), 0.0, color(cell.color));
    }

    let marker = minimap.marker(pose);
    painter.circle_filled(
        pos(marker.position),
        PLAYER_SIZE / 2.0 * scale,
        color(PLAYER_COLOR),
    );
    painter.line_segment(
        [pos(marker.position), pos(marker.heading_end)],
        Stroke::new(HEADING_WIDTH * scale, color(HEADING_COLOR)),
    );
    painter.rect_stroke(
        rect(minimap.bounds()),
        0.0,
        Stroke::new(BORDER_WIDTH * scale, color(BORDER_COLOR)),
        StrokeKind::Inside,
    );
}

fn color(rgba: Rgba) -> Color32 {
    let [r, g, b, a] = rgba.map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8);
    Color32::from_rgba_unmultiplied(r, g, b, a)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mazeview_render::WALL_COLOR;

    #[test]
    fn colors_convert_to_bytes() {
        assert_eq!(color(PLAYER_COLOR), Color32::from_rgb(0, 255, 0));
        assert_eq!(color(WALL_COLOR), Color32::from_rgb(204, 204, 204));
        assert_eq!(color(BACKGROUND_COLOR), Color32::from_rgb(51, 51, 51));
    }
}
