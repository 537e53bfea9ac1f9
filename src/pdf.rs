use std::{
    fs::File,
    io::BufWriter,
    path::{Path, PathBuf},
};

use printpdf::{
    path::{PaintMode, WindingOrder},
    BuiltinFont, Color, IndirectFontRef, Line, Mm, PdfDocument, PdfLayerReference, Point as PdfPoint,
    Polygon, Rgb as PdfRgb,
};
use tracing::info;

use crate::{
    error::ExportError,
    figure::{Figure, Rgb},
    scene::{Align, Point, Scene, Shape},
    utils::estimate_text_width,
};

pub const PDF_FILE_NAME: &str = "student_marks_analysis_graphs.pdf";

const MM_PER_PT: f32 = 25.4 / 72.0;
const CIRCLE_SEGMENTS: usize = 24;

/// Writes `figure` to `PDF_FILE_NAME` inside `dir`, replacing any previous export.
pub fn export_figure(figure: &Figure, dir: &Path) -> Result<PathBuf, ExportError> {
    let path = dir.join(PDF_FILE_NAME);
    write_scene(&Scene::layout(figure), &path)?;

    info!(path = %path.display(), "exported graphs");
    Ok(path)
}

fn write_scene(scene: &Scene, path: &Path) -> Result<(), ExportError> {
    let (doc, page, layer) = PdfDocument::new(
        "Student Marks Analysis",
        mm(scene.width),
        mm(scene.height),
        "Charts",
    );
    let font = doc.add_builtin_font(BuiltinFont::Helvetica)?;
    let canvas = Canvas {
        layer: doc.get_page(page).get_layer(layer),
        font,
        height: scene.height,
    };

    for shape in &scene.shapes {
        canvas.draw(shape);
    }

    doc.save(&mut BufWriter::new(File::create(path)?))?;
    Ok(())
}

struct Canvas {
    layer: PdfLayerReference,
    font: IndirectFontRef,
    height: f32,
}

impl Canvas {
    fn draw(&self, shape: &Shape) {
        match shape {
            Shape::Rect { min, max, fill, stroke } => {
                let corners = [
                    *min,
                    Point::new(max.x, min.y),
                    *max,
                    Point::new(min.x, max.y),
                ];
                if let Some(fill) = fill {
                    self.fill(&corners, *fill);
                }
                if let Some(stroke) = stroke {
                    self.stroke(&corners, *stroke, 0.75, true);
                }
            }
            Shape::Polyline { points, color, width } => self.stroke(points, *color, *width, false),
            Shape::Polygon { points, fill } => self.fill(points, *fill),
            Shape::Circle { center, radius, fill } => {
                let points: Vec<Point> = (0..CIRCLE_SEGMENTS)
                    .map(|i| {
                        let angle = i as f32 / CIRCLE_SEGMENTS as f32 * std::f32::consts::TAU;
                        Point::new(center.x + radius * angle.cos(), center.y + radius * angle.sin())
                    })
                    .collect();
                self.fill(&points, *fill);
            }
            Shape::Text { pos, text, size, align, color } => {
                let width = estimate_text_width(text, *size);
                let x = match align {
                    Align::Left => pos.x,
                    Align::Center => pos.x - width / 2.0,
                    Align::Right => pos.x - width,
                };
                // PDF places text by its baseline.
                let baseline = pos.y + size * 0.35;

                self.layer.set_fill_color(pdf_color(*color));
                self.layer
                    .use_text(text.as_str(), *size as _, mm(x), mm(self.height - baseline), &self.font);
            }
        }
    }

    fn fill(&self, points: &[Point], color: Rgb) {
        self.layer.set_fill_color(pdf_color(color));
        self.layer.add_polygon(Polygon {
            rings: vec![self.path(points)],
            mode: PaintMode::Fill,
            winding_order: WindingOrder::NonZero,
        });
    }

    fn stroke(&self, points: &[Point], color: Rgb, width: f32, closed: bool) {
        self.layer.set_outline_color(pdf_color(color));
        self.layer.set_outline_thickness(width as _);
        self.layer.add_line(Line {
            points: self.path(points),
            is_closed: closed,
        });
    }

    fn path(&self, points: &[Point]) -> Vec<(PdfPoint, bool)> {
        points
            .iter()
            .map(|p| (PdfPoint::new(mm(p.x), mm(self.height - p.y)), false))
            .collect()
    }
}

fn mm(points: f32) -> Mm {
    Mm((points * MM_PER_PT) as _)
}

fn pdf_color(rgb: Rgb) -> Color {
    Color::Rgb(PdfRgb::new(
        (rgb.0 as f32 / 255.0) as _,
        (rgb.1 as f32 / 255.0) as _,
        (rgb.2 as f32 / 255.0) as _,
        None,
    ))
}
