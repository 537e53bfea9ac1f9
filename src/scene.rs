//! Backend-neutral drawing primitives for a `Figure`.
//!
//! Coordinates are PDF points with the origin at the top-left and y growing
//! downwards. Every `Polygon` is convex so painters can fill it directly.

use std::f64::consts::PI;

use crate::figure::{
    Bar, Chart, Figure, Histogram, LinePoint, Panel, Rgb, Slice, FIGURE_HEIGHT, FIGURE_WIDTH,
    PIE_START_ANGLE,
};

const TITLE_SIZE: f32 = 13.0;
const LABEL_SIZE: f32 = 10.0;
const TICK_SIZE: f32 = 8.5;

// Plot area insets inside a grid cell.
const INSET_LEFT: f32 = 62.0;
const INSET_RIGHT: f32 = 22.0;
const INSET_TOP: f32 = 52.0;
const INSET_BOTTOM: f32 = 48.0;

const PIE_ARC_STEP: f64 = 3.0;
const MARKER_RADIUS: f32 = 4.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Point {
        Point { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
    Right,
}

/// `Text::pos` is the vertical middle of the line, horizontally placed by `align`.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Rect {
        min: Point,
        max: Point,
        fill: Option<Rgb>,
        stroke: Option<Rgb>,
    },
    Polyline {
        points: Vec<Point>,
        color: Rgb,
        width: f32,
    },
    Polygon {
        points: Vec<Point>,
        fill: Rgb,
    },
    Circle {
        center: Point,
        radius: f32,
        fill: Rgb,
    },
    Text {
        pos: Point,
        text: String,
        size: f32,
        align: Align,
        color: Rgb,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub width: f32,
    pub height: f32,
    pub shapes: Vec<Shape>,
}

impl Scene {
    pub fn layout(figure: &Figure) -> Scene {
        let mut scene = Scene {
            width: FIGURE_WIDTH,
            height: FIGURE_HEIGHT,
            shapes: vec![],
        };

        scene.shapes.push(Shape::Rect {
            min: Point::new(0.0, 0.0),
            max: Point::new(FIGURE_WIDTH, FIGURE_HEIGHT),
            fill: Some(Rgb::WHITE),
            stroke: None,
        });

        let cell_w = FIGURE_WIDTH / 2.0;
        let cell_h = FIGURE_HEIGHT / 2.0;
        for (i, panel) in figure.panels.iter().enumerate() {
            let left = (i % 2) as f32 * cell_w;
            let top = (i / 2) as f32 * cell_h;
            scene.layout_panel(panel, left, top, cell_w, cell_h);
        }

        scene
    }

    fn layout_panel(&mut self, panel: &Panel, left: f32, top: f32, w: f32, h: f32) {
        self.text(
            Point::new(left + w / 2.0, top + 22.0),
            panel.title,
            TITLE_SIZE,
            Align::Center,
        );

        let area = PlotArea {
            left: left + INSET_LEFT,
            top: top + INSET_TOP,
            right: left + w - INSET_RIGHT,
            bottom: top + h - INSET_BOTTOM,
        };

        if let Some(label) = panel.x_label {
            self.text(
                Point::new(area.center_x(), area.bottom + 32.0),
                label,
                LABEL_SIZE,
                Align::Center,
            );
        }
        if let Some(label) = panel.y_label {
            self.text(
                Point::new(left + 8.0, area.top - 12.0),
                label,
                LABEL_SIZE,
                Align::Left,
            );
        }

        match &panel.chart {
            Chart::Bar(bars) => self.bar_chart(&area, bars),
            Chart::Pie(slices) => self.pie_chart(&area, slices),
            Chart::Histogram(histogram) => self.histogram(&area, histogram),
            Chart::Line(points) => self.line_chart(&area, points),
        }
    }

    fn bar_chart(&mut self, area: &PlotArea, bars: &[Bar]) {
        let max = bars.iter().map(|b| b.value).fold(0.0, f64::max);
        let ticks = nice_ticks(0.0, (max * 1.1).max(1.0));
        let (lo, hi) = tick_bounds(&ticks);
        self.axes(area, &ticks, lo, hi);

        let slot = area.width() / bars.len().max(1) as f32;
        for (i, bar) in bars.iter().enumerate() {
            let center = area.left + slot * (i as f32 + 0.5);
            let top = area.y_at(bar.value, lo, hi);

            self.shapes.push(Shape::Rect {
                min: Point::new(center - slot * 0.3, top),
                max: Point::new(center + slot * 0.3, area.bottom),
                fill: Some(bar.color),
                stroke: None,
            });
            self.text(Point::new(center, top - 8.0), &format!("{}", bar.value), TICK_SIZE, Align::Center);
            self.text(Point::new(center, area.bottom + 12.0), bar.label, LABEL_SIZE, Align::Center);
        }
    }

    fn pie_chart(&mut self, area: &PlotArea, slices: &[Slice]) {
        if slices.is_empty() {
            self.text(area.center(), "No students", LABEL_SIZE, Align::Center);
            return;
        }

        let center = area.center();
        let radius = (area.width().min(area.height()) / 2.0 * 0.85) as f64;

        let mut start = PIE_START_ANGLE;
        for slice in slices {
            let sweep = slice.fraction * 360.0;

            // Sub-wedges of at most 90 degrees stay convex.
            let pieces = (sweep / 90.0).ceil().max(1.0) as usize;
            let piece_sweep = sweep / pieces as f64;
            for p in 0..pieces {
                let a0 = start + piece_sweep * p as f64;
                let steps = (piece_sweep / PIE_ARC_STEP).ceil().max(1.0) as usize;

                let mut points = vec![center];
                for s in 0..=steps {
                    let angle = a0 + piece_sweep * s as f64 / steps as f64;
                    points.push(polar(center, radius, angle));
                }
                self.shapes.push(Shape::Polygon {
                    points,
                    fill: slice.color,
                });
            }

            let mid = start + sweep / 2.0;
            self.text(polar(center, radius * 1.12, mid), slice.label, LABEL_SIZE, Align::Center);
            self.text(polar(center, radius * 0.6, mid), &slice.percent_label(), LABEL_SIZE, Align::Center);

            start += sweep;
        }
    }

    fn histogram(&mut self, area: &PlotArea, histogram: &Histogram) {
        let Some((x_lo, x_hi)) = histogram.range() else {
            self.axes(area, &nice_ticks(0.0, 1.0), 0.0, 1.0);
            self.text(area.center(), "No data", LABEL_SIZE, Align::Center);
            return;
        };

        let max_count = histogram.counts.iter().copied().max().unwrap_or(0) as f64;
        let max_density = histogram.density.iter().map(|p| p.1).fold(0.0, f64::max);
        let ticks = nice_ticks(0.0, (max_count.max(max_density) * 1.1).max(1.0));
        let (lo, hi) = tick_bounds(&ticks);
        self.axes(area, &ticks, lo, hi);

        for (i, &count) in histogram.counts.iter().enumerate() {
            if count == 0 {
                continue;
            }
            let x0 = area.x_at(histogram.edges[i], x_lo, x_hi);
            let x1 = area.x_at(histogram.edges[i + 1], x_lo, x_hi);
            self.shapes.push(Shape::Rect {
                min: Point::new(x0, area.y_at(count as f64, lo, hi)),
                max: Point::new(x1, area.bottom),
                fill: Some(Rgb::HIST_FILL),
                stroke: Some(Rgb::HIST_EDGE),
            });
        }

        if histogram.density.len() > 1 {
            let points = histogram
                .density
                .iter()
                .map(|&(x, y)| Point::new(area.x_at(x, x_lo, x_hi), area.y_at(y, lo, hi)))
                .collect();
            self.shapes.push(Shape::Polyline {
                points,
                color: Rgb::KDE,
                width: 1.5,
            });
        }

        for tick in nice_ticks(x_lo, x_hi) {
            if tick < x_lo || tick > x_hi {
                continue;
            }
            let x = area.x_at(tick, x_lo, x_hi);
            self.text(Point::new(x, area.bottom + 12.0), &format_tick(tick), TICK_SIZE, Align::Center);
        }
    }

    fn line_chart(&mut self, area: &PlotArea, points: &[LinePoint]) {
        if points.is_empty() {
            self.axes(area, &nice_ticks(0.0, 1.0), 0.0, 1.0);
            self.text(area.center(), "No data", LABEL_SIZE, Align::Center);
            return;
        }

        let min = points.iter().map(|p| p.value).fold(f64::INFINITY, f64::min);
        let max = points.iter().map(|p| p.value).fold(f64::NEG_INFINITY, f64::max);
        let pad = if max > min { (max - min) * 0.1 } else { 1.0 };
        let ticks = nice_ticks(min - pad, max + pad);
        let (lo, hi) = tick_bounds(&ticks);
        self.axes(area, &ticks, lo, hi);

        let slot = area.width() / points.len() as f32;
        let positions: Vec<Point> = points
            .iter()
            .enumerate()
            .map(|(i, p)| Point::new(area.left + slot * (i as f32 + 0.5), area.y_at(p.value, lo, hi)))
            .collect();

        if positions.len() > 1 {
            self.shapes.push(Shape::Polyline {
                points: positions.clone(),
                color: Rgb::RED,
                width: 1.5,
            });
        }
        for (pos, point) in positions.iter().zip(points) {
            self.shapes.push(Shape::Circle {
                center: *pos,
                radius: MARKER_RADIUS,
                fill: Rgb::RED,
            });
            self.text(Point::new(pos.x, area.bottom + 12.0), point.label, LABEL_SIZE, Align::Center);
        }
    }

    /// Frame, horizontal grid lines and y tick labels.
    fn axes(&mut self, area: &PlotArea, ticks: &[f64], lo: f64, hi: f64) {
        for &tick in ticks {
            let y = area.y_at(tick, lo, hi);
            self.shapes.push(Shape::Polyline {
                points: vec![Point::new(area.left, y), Point::new(area.right, y)],
                color: Rgb::GRID,
                width: 0.5,
            });
            self.text(Point::new(area.left - 5.0, y), &format_tick(tick), TICK_SIZE, Align::Right);
        }

        self.shapes.push(Shape::Rect {
            min: Point::new(area.left, area.top),
            max: Point::new(area.right, area.bottom),
            fill: None,
            stroke: Some(Rgb::BLACK),
        });
    }

    fn text(&mut self, pos: Point, text: &str, size: f32, align: Align) {
        self.shapes.push(Shape::Text {
            pos,
            text: text.to_string(),
            size,
            align,
            color: Rgb::BLACK,
        });
    }
}

struct PlotArea {
    left: f32,
    top: f32,
    right: f32,
    bottom: f32,
}

impl PlotArea {
    fn width(&self) -> f32 {
        self.right - self.left
    }

    fn height(&self) -> f32 {
        self.bottom - self.top
    }

    fn center_x(&self) -> f32 {
        (self.left + self.right) / 2.0
    }

    fn center(&self) -> Point {
        Point::new(self.center_x(), (self.top + self.bottom) / 2.0)
    }

    fn x_at(&self, value: f64, lo: f64, hi: f64) -> f32 {
        self.left + ((value - lo) / (hi - lo)) as f32 * self.width()
    }

    fn y_at(&self, value: f64, lo: f64, hi: f64) -> f32 {
        self.bottom - ((value - lo) / (hi - lo)) as f32 * self.height()
    }
}

fn polar(center: Point, radius: f64, degrees: f64) -> Point {
    let rad = degrees * PI / 180.0;
    Point::new(
        center.x + (radius * rad.cos()) as f32,
        center.y - (radius * rad.sin()) as f32,
    )
}

/// Round tick values covering `[lo, hi]`, roughly five of them.
fn nice_ticks(lo: f64, hi: f64) -> Vec<f64> {
    let span = hi - lo;
    if !span.is_finite() || span <= 0.0 {
        return vec![lo];
    }

    let raw = span / 5.0;
    let magnitude = 10f64.powf(raw.log10().floor());
    let step = [1.0, 2.0, 2.5, 5.0, 10.0]
        .iter()
        .map(|m| m * magnitude)
        .find(|s| *s >= raw)
        .unwrap_or(10.0 * magnitude);

    let first = (lo / step).floor() as i64;
    let last = (hi / step).ceil() as i64;
    (first..=last).map(|k| k as f64 * step).collect()
}

fn tick_bounds(ticks: &[f64]) -> (f64, f64) {
    match (ticks.first(), ticks.last()) {
        (Some(&lo), Some(&hi)) if hi > lo => (lo, hi),
        (Some(&lo), _) => (lo, lo + 1.0),
        _ => (0.0, 1.0),
    }
}

fn format_tick(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{:.0}", value)
    } else {
        let s = format!("{:.2}", value);
        s.trim_end_matches('0').to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{stats::MarkStats, table::StudentTable};

    fn scene(csv: &str) -> Scene {
        let table = StudentTable::from_reader(csv.as_bytes()).unwrap();
        let stats = MarkStats::compute(&table);
        Scene::layout(&Figure::build(&table, &stats))
    }

    fn texts(scene: &Scene) -> Vec<&str> {
        scene
            .shapes
            .iter()
            .filter_map(|s| match s {
                Shape::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    fn is_convex(points: &[Point]) -> bool {
        let n = points.len();
        let mut sign = 0.0f32;
        for i in 0..n {
            let a = points[i];
            let b = points[(i + 1) % n];
            let c = points[(i + 2) % n];
            let cross = (b.x - a.x) * (c.y - b.y) - (b.y - a.y) * (c.x - b.x);
            if cross.abs() < 1e-3 {
                continue;
            }
            if sign == 0.0 {
                sign = cross.signum();
            } else if cross.signum() != sign {
                return false;
            }
        }
        true
    }

    #[test]
    fn all_titles_are_laid_out() {
        let s = scene("Physics Marks,Chemistry Marks,Maths Marks\n40,40,40\n20,20,20\n");
        let texts = texts(&s);

        for title in [
            "Students Passed in Each Subject",
            "Proportion of Passed vs. Failed Students",
            "Distribution of Student Percentages",
            "Average Marks in Each Subject",
        ] {
            assert!(texts.contains(&title), "missing {title}");
        }
        assert!(texts.contains(&"50.0%"));
    }

    #[test]
    fn shapes_stay_inside_the_page() {
        let s = scene("Physics Marks,Chemistry Marks,Maths Marks\n40,40,40\n20,20,20\n77,12,50\n");

        let inside = |p: &Point| p.x >= 0.0 && p.x <= s.width && p.y >= 0.0 && p.y <= s.height;
        for shape in &s.shapes {
            match shape {
                Shape::Rect { min, max, .. } => assert!(inside(min) && inside(max)),
                Shape::Polyline { points, .. } | Shape::Polygon { points, .. } => {
                    assert!(points.iter().all(inside))
                }
                Shape::Circle { center, .. } | Shape::Text { pos: center, .. } => {
                    assert!(inside(center))
                }
            }
        }
    }

    #[test]
    fn pie_wedges_are_convex() {
        // One student in five passes, so the failed slice spans 288 degrees.
        let s = scene(
            "Physics Marks,Chemistry Marks,Maths Marks\n90,90,90\n1,1,1\n2,2,2\n3,3,3\n4,4,4\n",
        );

        let polygons: Vec<&Vec<Point>> = s
            .shapes
            .iter()
            .filter_map(|shape| match shape {
                Shape::Polygon { points, .. } => Some(points),
                _ => None,
            })
            .collect();

        assert!(polygons.len() >= 5);
        assert!(polygons.iter().all(|p| is_convex(p)));
    }

    #[test]
    fn empty_table_shows_placeholders() {
        let s = scene("Physics Marks,Chemistry Marks,Maths Marks\n");
        let texts = texts(&s);

        assert!(texts.contains(&"No students"));
        assert_eq!(texts.iter().filter(|t| **t == "No data").count(), 2);
        assert!(!s.shapes.iter().any(|shape| matches!(shape, Shape::Polygon { .. })));
    }

    #[test]
    fn line_chart_joins_subjects_in_order() {
        let s = scene("Physics Marks,Chemistry Marks,Maths Marks\n10,50,90\n");

        let markers: Vec<Point> = s
            .shapes
            .iter()
            .filter_map(|shape| match shape {
                Shape::Circle { center, .. } => Some(*center),
                _ => None,
            })
            .collect();

        assert_eq!(markers.len(), 3);
        assert!(markers[0].x < markers[1].x && markers[1].x < markers[2].x);
        // Higher averages sit higher on the page.
        assert!(markers[0].y > markers[1].y && markers[1].y > markers[2].y);
    }

    #[test]
    fn ticks_cover_the_range() {
        let ticks = nice_ticks(0.0, 11.0);
        assert_eq!(ticks.first(), Some(&0.0));
        assert!(*ticks.last().unwrap() >= 11.0);
        assert!(ticks.len() <= 8);

        assert_eq!(nice_ticks(5.0, 5.0), vec![5.0]);
    }

    #[test]
    fn tick_labels_drop_trailing_zeros() {
        assert_eq!(format_tick(40.0), "40");
        assert_eq!(format_tick(2.5), "2.5");
    }
}
