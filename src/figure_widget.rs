use egui::{Align2, Color32, FontId, Pos2, Rect, Response, Sense, Shape as EguiShape, Stroke, Ui, Vec2, Widget};

use crate::{
    figure::Rgb,
    scene::{Align, Point, Scene, Shape},
};

/// Paints a laid-out figure, scaled to fit the space the parent gives it.
pub struct FigureView<'a> {
    scene: &'a Scene,
}

impl<'a> FigureView<'a> {
    pub fn new(scene: &'a Scene) -> Self {
        FigureView { scene }
    }
}

impl<'a> Widget for FigureView<'a> {
    fn ui(self, ui: &mut Ui) -> Response {
        let available = ui.available_size();
        let scale = (available.x / self.scene.width)
            .min(available.y / self.scene.height)
            .max(0.1);
        let desired_size = Vec2::new(self.scene.width * scale, self.scene.height * scale);

        let (rect, response) = ui.allocate_exact_size(desired_size, Sense::hover());

        if ui.is_rect_visible(rect) {
            let painter = ui.painter_at(rect);
            let to_screen = |p: &Point| Pos2::new(rect.min.x + p.x * scale, rect.min.y + p.y * scale);

            for shape in &self.scene.shapes {
                match shape {
                    Shape::Rect { min, max, fill, stroke } => {
                        let r = Rect::from_min_max(to_screen(min), to_screen(max));
                        if let Some(fill) = fill {
                            painter.rect_filled(r, 0.0, color(*fill));
                        }
                        if let Some(stroke) = stroke {
                            painter.rect_stroke(r, 0.0, Stroke::new(1.0, color(*stroke)));
                        }
                    }
                    Shape::Polyline { points, color: c, width } => {
                        let points = points.iter().map(to_screen).collect();
                        painter.add(EguiShape::line(points, Stroke::new(width * scale, color(*c))));
                    }
                    Shape::Polygon { points, fill } => {
                        let points = points.iter().map(to_screen).collect();
                        painter.add(EguiShape::convex_polygon(points, color(*fill), Stroke::NONE));
                    }
                    Shape::Circle { center, radius, fill } => {
                        painter.circle_filled(to_screen(center), radius * scale, color(*fill));
                    }
                    Shape::Text { pos, text, size, align, color: c } => {
                        let anchor = match align {
                            Align::Left => Align2::LEFT_CENTER,
                            Align::Center => Align2::CENTER_CENTER,
                            Align::Right => Align2::RIGHT_CENTER,
                        };
                        painter.text(to_screen(pos), anchor, text, FontId::proportional(size * scale), color(*c));
                    }
                }
            }
        }

        response
    }
}

fn color(rgb: Rgb) -> Color32 {
    Color32::from_rgb(rgb.0, rgb.1, rgb.2)
}
