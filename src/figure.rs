//! The 2x2 chart figure as plain data.
//!
//! A `Figure` holds what is drawn, not how. `scene::Scene::layout` turns it
//! into primitives for the screen widget and the PDF writer alike.

use crate::{
    stats::MarkStats,
    table::{StudentTable, Subject},
};

/// 12 x 10 inches in PDF points.
pub const FIGURE_WIDTH: f32 = 864.0;
pub const FIGURE_HEIGHT: f32 = 720.0;

pub const HISTOGRAM_BINS: usize = 10;
const KDE_SAMPLES: usize = 200;

/// Pie slices start here (degrees, counter-clockwise from east).
pub const PIE_START_ANGLE: f64 = 140.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const BLACK: Rgb = Rgb(0, 0, 0);
    pub const WHITE: Rgb = Rgb(255, 255, 255);
    pub const GRID: Rgb = Rgb(220, 220, 220);
    pub const RED: Rgb = Rgb(214, 39, 40);
    pub const HIST_FILL: Rgb = Rgb(120, 150, 230);
    pub const HIST_EDGE: Rgb = Rgb(30, 60, 170);
    pub const KDE: Rgb = Rgb(0, 0, 200);
}

const BAR_PALETTE: [Rgb; 3] = [Rgb(76, 114, 176), Rgb(221, 132, 82), Rgb(85, 168, 104)];
const PIE_PALETTE: [Rgb; 2] = [Rgb(102, 194, 165), Rgb(252, 141, 98)];

#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub label: &'static str,
    pub value: f64,
    pub color: Rgb,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Slice {
    pub label: &'static str,
    pub fraction: f64,
    pub color: Rgb,
}

impl Slice {
    pub fn percent_label(&self) -> String {
        format!("{:.1}%", self.fraction * 100.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    /// `bins + 1` edges, or none for empty input.
    pub edges: Vec<f64>,
    pub counts: Vec<usize>,
    /// KDE curve scaled to counts.
    pub density: Vec<(f64, f64)>,
}

impl Histogram {
    pub fn from_values(values: &[f64], bins: usize) -> Histogram {
        if values.is_empty() || bins == 0 {
            return Histogram {
                edges: vec![],
                counts: vec![],
                density: vec![],
            };
        }

        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let (lo, hi) = if min == max {
            (min - 0.5, max + 0.5)
        } else {
            (min, max)
        };

        let width = (hi - lo) / bins as f64;
        let edges = (0..=bins).map(|i| lo + width * i as f64).collect();

        let mut counts = vec![0usize; bins];
        for &v in values {
            let idx = ((v - lo) / width).floor() as usize;
            counts[idx.min(bins - 1)] += 1;
        }

        let density = kde_curve(values, min, max, values.len() as f64 * width);

        Histogram {
            edges,
            counts,
            density,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn range(&self) -> Option<(f64, f64)> {
        Some((*self.edges.first()?, *self.edges.last()?))
    }
}

/// Gaussian KDE with Scott's bandwidth, sampled across `[min, max]`.
fn kde_curve(values: &[f64], min: f64, max: f64, scale: f64) -> Vec<(f64, f64)> {
    let n = values.len() as f64;
    if values.len() < 2 {
        return vec![];
    }

    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1.0);
    let std_dev = variance.sqrt();
    if !std_dev.is_finite() || std_dev <= 0.0 {
        return vec![];
    }

    let bandwidth = std_dev * n.powf(-0.2);
    let norm = n * bandwidth * (2.0 * std::f64::consts::PI).sqrt();

    (0..KDE_SAMPLES)
        .map(|i| {
            let x = min + (max - min) * i as f64 / (KDE_SAMPLES - 1) as f64;
            let density = values
                .iter()
                .map(|&xi| {
                    let u = (x - xi) / bandwidth;
                    (-0.5 * u * u).exp()
                })
                .sum::<f64>()
                / norm;
            (x, density * scale)
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct LinePoint {
    pub label: &'static str,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Chart {
    Bar(Vec<Bar>),
    Pie(Vec<Slice>),
    Histogram(Histogram),
    /// Empty when the averages are undefined.
    Line(Vec<LinePoint>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Panel {
    pub title: &'static str,
    pub x_label: Option<&'static str>,
    pub y_label: Option<&'static str>,
    pub chart: Chart,
}

/// Four panels in reading order: top-left, top-right, bottom-left, bottom-right.
#[derive(Debug, Clone, PartialEq)]
pub struct Figure {
    pub panels: [Panel; 4],
}

impl Figure {
    pub fn build(table: &StudentTable, stats: &MarkStats) -> Figure {
        let percentages: Vec<f64> = table.rows().iter().map(|r| r.percentage).collect();

        Figure {
            panels: [
                Panel {
                    title: "Students Passed in Each Subject",
                    x_label: None,
                    y_label: Some("Number of Students"),
                    chart: Chart::Bar(subject_bars(stats)),
                },
                Panel {
                    title: "Proportion of Passed vs. Failed Students",
                    x_label: None,
                    y_label: None,
                    chart: Chart::Pie(status_slices(stats)),
                },
                Panel {
                    title: "Distribution of Student Percentages",
                    x_label: Some("Percentage"),
                    y_label: Some("Frequency"),
                    chart: Chart::Histogram(Histogram::from_values(&percentages, HISTOGRAM_BINS)),
                },
                Panel {
                    title: "Average Marks in Each Subject",
                    x_label: Some("Subject"),
                    y_label: Some("Average Marks"),
                    chart: Chart::Line(average_points(stats)),
                },
            ],
        }
    }
}

fn subject_bars(stats: &MarkStats) -> Vec<Bar> {
    Subject::ALL
        .iter()
        .map(|&subject| Bar {
            label: subject.name(),
            value: stats.passed_in(subject) as f64,
            color: BAR_PALETTE[subject.index()],
        })
        .collect()
}

fn status_slices(stats: &MarkStats) -> Vec<Slice> {
    if stats.total_students == 0 {
        return vec![];
    }

    let total = stats.total_students as f64;
    [("Passed", stats.num_passed), ("Failed", stats.num_failed())]
        .iter()
        .zip(PIE_PALETTE)
        .filter(|((_, count), _)| *count > 0)
        .map(|(&(label, count), color)| Slice {
            label,
            fraction: count as f64 / total,
            color,
        })
        .collect()
}

fn average_points(stats: &MarkStats) -> Vec<LinePoint> {
    Subject::ALL
        .iter()
        .filter_map(|&subject| {
            stats.average_in(subject).map(|value| LinePoint {
                label: subject.name(),
                value,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn figure(csv: &str) -> Figure {
        let table = StudentTable::from_reader(csv.as_bytes()).unwrap();
        let stats = MarkStats::compute(&table);
        Figure::build(&table, &stats)
    }

    #[test]
    fn panels_follow_the_grid_order() {
        let f = figure("Physics Marks,Chemistry Marks,Maths Marks\n40,40,40\n20,20,20\n");

        assert!(matches!(f.panels[0].chart, Chart::Bar(_)));
        assert!(matches!(f.panels[1].chart, Chart::Pie(_)));
        assert!(matches!(f.panels[2].chart, Chart::Histogram(_)));
        assert!(matches!(f.panels[3].chart, Chart::Line(_)));
    }

    #[test]
    fn bars_count_subject_passes_in_fixed_order() {
        let f = figure("Physics Marks,Chemistry Marks,Maths Marks\n40,10,90\n50,36,20\n");

        let Chart::Bar(bars) = &f.panels[0].chart else {
            panic!("expected bar chart");
        };
        let labels: Vec<&str> = bars.iter().map(|b| b.label).collect();
        let values: Vec<f64> = bars.iter().map(|b| b.value).collect();
        assert_eq!(labels, vec!["Physics", "Chemistry", "Maths"]);
        assert_eq!(values, vec![2.0, 1.0, 1.0]);
    }

    #[test]
    fn pie_splits_passed_and_failed() {
        let f = figure("Physics Marks,Chemistry Marks,Maths Marks\n40,40,40\n20,20,20\n");

        let Chart::Pie(slices) = &f.panels[1].chart else {
            panic!("expected pie chart");
        };
        assert_eq!(slices.len(), 2);
        assert_eq!(slices[0].label, "Passed");
        assert_eq!(slices[0].percent_label(), "50.0%");
        assert_eq!(slices[1].label, "Failed");
    }

    #[test]
    fn pie_drops_empty_slices() {
        let f = figure("Physics Marks,Chemistry Marks,Maths Marks\n90,90,90\n");

        let Chart::Pie(slices) = &f.panels[1].chart else {
            panic!("expected pie chart");
        };
        assert_eq!(slices.len(), 1);
        assert_eq!(slices[0].fraction, 1.0);
    }

    #[test]
    fn empty_table_yields_empty_charts() {
        let f = figure("Physics Marks,Chemistry Marks,Maths Marks\n");

        assert_eq!(f.panels[1].chart, Chart::Pie(vec![]));
        assert_eq!(f.panels[3].chart, Chart::Line(vec![]));
        let Chart::Histogram(h) = &f.panels[2].chart else {
            panic!("expected histogram");
        };
        assert!(h.is_empty());
        assert_eq!(h.range(), None);
    }

    #[test]
    fn histogram_counts_every_value_once() {
        let values = [0.0, 5.0, 9.9, 10.0, 55.5, 99.0, 100.0];
        let h = Histogram::from_values(&values, 10);

        assert_eq!(h.edges.len(), 11);
        assert_eq!(h.counts.iter().sum::<usize>(), values.len());
        assert_eq!(h.range(), Some((0.0, 100.0)));
        // The maximum lands in the closed last bin.
        assert_eq!(h.counts[9], 2);
        assert_eq!(h.counts[0], 3);
    }

    #[test]
    fn histogram_of_identical_values_is_centered() {
        let h = Histogram::from_values(&[40.0, 40.0, 40.0], 10);

        assert_eq!(h.range(), Some((39.5, 40.5)));
        assert_eq!(h.counts.iter().sum::<usize>(), 3);
        assert!(h.density.is_empty());
    }

    #[test]
    fn kde_is_sampled_across_the_data_range() {
        let h = Histogram::from_values(&[20.0, 40.0, 45.0, 60.0, 80.0], 10);

        assert_eq!(h.density.len(), 200);
        assert_eq!(h.density.first().map(|p| p.0), Some(20.0));
        assert_eq!(h.density.last().map(|p| p.0), Some(80.0));
        assert!(h.density.iter().all(|&(_, y)| y.is_finite() && y > 0.0));
    }

    #[test]
    fn line_points_hold_subject_means() {
        let f = figure("Physics Marks,Chemistry Marks,Maths Marks\n40,40,40\n20,20,20\n");

        let Chart::Line(points) = &f.panels[3].chart else {
            panic!("expected line chart");
        };
        let values: Vec<f64> = points.iter().map(|p| p.value).collect();
        assert_eq!(values, vec![30.0, 30.0, 30.0]);
        assert_eq!(points[2].label, "Maths");
    }
}
