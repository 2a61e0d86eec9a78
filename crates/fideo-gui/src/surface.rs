//! Draw-surface implementation over the egui painter.

use eframe::egui::{
    self, Align2, Color32, FontId, Pos2, Rect, Stroke, StrokeKind, epaint::CubicBezierShape, pos2,
};

use fideo_graph::{DrawSurface, Icon, Rgba, Vec2};

fn to_pos(p: Vec2) -> Pos2 {
    pos2(p.x, p.y)
}

fn to_color(c: Rgba) -> Color32 {
    Color32::from_rgba_unmultiplied(c.r, c.g, c.b, c.a)
}

/// Paints editor primitives through an [`egui::Painter`].
pub struct EguiSurface<'a> {
    painter: &'a egui::Painter,
}

impl<'a> EguiSurface<'a> {
    /// Wraps a painter for one frame.
    pub fn new(painter: &'a egui::Painter) -> Self {
        Self { painter }
    }
}

impl DrawSurface for EguiSurface<'_> {
    fn rect_filled(&mut self, ul: Vec2, lr: Vec2, rounding: f32, color: Rgba) {
        let rect = Rect::from_two_pos(to_pos(ul), to_pos(lr));
        self.painter.rect_filled(rect, rounding, to_color(color));
    }

    fn rect_stroke(&mut self, ul: Vec2, lr: Vec2, rounding: f32, thickness: f32, color: Rgba) {
        let rect = Rect::from_two_pos(to_pos(ul), to_pos(lr));
        self.painter.rect_stroke(
            rect,
            rounding,
            Stroke::new(thickness, to_color(color)),
            StrokeKind::Inside,
        );
    }

    fn line(&mut self, a: Vec2, b: Vec2, thickness: f32, color: Rgba) {
        self.painter
            .line_segment([to_pos(a), to_pos(b)], Stroke::new(thickness, to_color(color)));
    }

    fn bezier(&mut self, points: [Vec2; 4], thickness: f32, color: Rgba) {
        self.painter.add(CubicBezierShape::from_points_stroke(
            points.map(to_pos),
            false,
            Color32::TRANSPARENT,
            Stroke::new(thickness, to_color(color)),
        ));
    }

    fn icon(&mut self, icon: Icon, ul: Vec2, lr: Vec2, color: Rgba, fill: Rgba) {
        let color = to_color(color);
        let fill = to_color(fill);
        let rect = Rect::from_two_pos(to_pos(ul), to_pos(lr));
        let inset = rect.shrink(rect.width() * 0.2);
        match icon {
            Icon::Flow | Icon::Play => {
                // right-pointing triangle
                let points = vec![
                    inset.left_top(),
                    pos2(inset.right(), inset.center().y),
                    inset.left_bottom(),
                ];
                self.painter
                    .add(egui::Shape::convex_polygon(points, fill, Stroke::new(1.0, color)));
            }
            Icon::Grid => {
                self.painter.rect_filled(inset, 1.0, fill);
                self.painter.rect_stroke(
                    inset,
                    1.0,
                    Stroke::new(1.0, color),
                    StrokeKind::Inside,
                );
                let stroke = Stroke::new(1.0, color);
                self.painter.line_segment(
                    [
                        pos2(inset.center().x, inset.top()),
                        pos2(inset.center().x, inset.bottom()),
                    ],
                    stroke,
                );
                self.painter.line_segment(
                    [
                        pos2(inset.left(), inset.center().y),
                        pos2(inset.right(), inset.center().y),
                    ],
                    stroke,
                );
            }
            Icon::Bang => {
                self.painter
                    .circle(inset.center(), inset.width() * 0.5, fill, Stroke::new(1.0, color));
            }
        }
    }

    fn text(&mut self, pos: Vec2, size: f32, color: Rgba, text: &str) {
        self.painter.text(
            to_pos(pos),
            Align2::LEFT_TOP,
            text,
            FontId::proportional(size),
            to_color(color),
        );
    }
}
