use std::path::{Path, PathBuf};

use anyhow::anyhow;
use egui::{Align, Align2, CentralPanel, Layout, RichText, ScrollArea, TopBottomPanel, Window};
use egui_extras::{Column, TableBuilder};
use tracing::{debug, error, info, warn};

use crate::{
    figure::Figure,
    figure_widget::FigureView,
    pdf::{export_figure, PDF_FILE_NAME},
    scene::Scene,
    stats::MarkStats,
    table::StudentTable,
    utils::is_csv_path,
};

pub const APP_TITLE: &str = "Student Marks Analysis System";

/// The three screens, strictly in this order.
pub enum Screen {
    Upload,
    Table(StudentTable),
    Graphs {
        table: StudentTable,
        figure: Figure,
        scene: Scene,
    },
}

impl Screen {
    pub fn name(&self) -> &'static str {
        match self {
            Screen::Upload => "upload",
            Screen::Table(_) => "table",
            Screen::Graphs { .. } => "graphs",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub title: &'static str,
    pub message: String,
}

enum Action {
    PickFile,
    Analyze,
    Export,
}

pub struct App {
    screen: Screen,
    notice: Option<Notice>,
    export_dir: PathBuf,
}

impl eframe::App for App {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let action = match &self.screen {
            Screen::Upload => render_upload(ctx),
            Screen::Table(table) => render_table(ctx, table),
            Screen::Graphs { table, scene, .. } => render_graphs(ctx, table, scene),
        };

        match action {
            Some(Action::PickFile) => {
                let mut dialog = rfd::FileDialog::new().add_filter("CSV files", &["csv"]);
                if let Some(home) = dirs::home_dir() {
                    dialog = dialog.set_directory(home);
                }
                match dialog.pick_file() {
                    Some(path) => self.load_csv(&path),
                    None => debug!("file selection cancelled"),
                }
            }
            Some(Action::Analyze) => self.analyze(),
            Some(Action::Export) => {
                let dir = self.export_dir.clone();
                self.export(&dir);
            }
            None => {}
        }

        self.render_notice(ctx);
    }
}

impl App {
    /// Exports land in `export_dir`; the binary passes the working directory.
    pub fn new(export_dir: PathBuf) -> Self {
        App {
            screen: Screen::Upload,
            notice: None,
            export_dir,
        }
    }

    pub fn run(self) -> anyhow::Result<()> {
        let options = eframe::NativeOptions {
            viewport: egui::ViewportBuilder::default()
                .with_title(APP_TITLE)
                .with_inner_size([800.0, 600.0]),
            ..Default::default()
        };

        eframe::run_native(APP_TITLE, options, Box::new(move |_cc| Box::new(self)))
            .map_err(|e| anyhow!("unable to open the application window: {e}"))
    }

    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    /// Upload -> Table. A failed load stays on Upload and raises a notice.
    pub fn load_csv(&mut self, path: &Path) {
        if !matches!(self.screen, Screen::Upload) {
            warn!(screen = self.screen.name(), "ignoring upload outside the upload screen");
            return;
        }
        if !is_csv_path(path) {
            warn!(path = %path.display(), "file does not look like a CSV, reading it anyway");
        }

        match StudentTable::load(path) {
            Ok(table) => {
                info!(path = %path.display(), students = table.len(), "loaded marks");
                self.screen = Screen::Table(table);
            }
            Err(err) => {
                error!(path = %path.display(), "upload failed: {err}");
                self.notice = Some(Notice {
                    title: "Upload Failed",
                    message: err.to_string(),
                });
            }
        }
    }

    /// Table -> Graphs. Statistics and the figure are built on entry.
    pub fn analyze(&mut self) {
        let screen = std::mem::replace(&mut self.screen, Screen::Upload);
        self.screen = match screen {
            Screen::Table(table) => {
                let stats = MarkStats::compute(&table);
                debug!(?stats, "computed statistics");

                let figure = Figure::build(&table, &stats);
                let scene = Scene::layout(&figure);
                Screen::Graphs {
                    table,
                    figure,
                    scene,
                }
            }
            other => {
                warn!(screen = other.name(), "analysis requested outside the table screen");
                other
            }
        };
    }

    /// Graphs -> Graphs, writing the figure shown on screen.
    pub fn export(&mut self, dir: &Path) {
        let Screen::Graphs { figure, .. } = &self.screen else {
            warn!(screen = self.screen.name(), "export requested before the graphs are shown");
            return;
        };

        self.notice = Some(match export_figure(figure, dir) {
            Ok(_) => Notice {
                title: "Download Complete",
                message: format!("Graphs have been downloaded as '{}'", PDF_FILE_NAME),
            },
            Err(err) => {
                error!(dir = %dir.display(), "export failed: {err}");
                Notice {
                    title: "Download Failed",
                    message: err.to_string(),
                }
            }
        });
    }

    fn render_notice(&mut self, ctx: &egui::Context) {
        let Some(notice) = &self.notice else {
            return;
        };

        let mut dismissed = false;
        Window::new(notice.title)
            .collapsible(false)
            .resizable(false)
            .anchor(Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.label(&notice.message);
                ui.add_space(8.0);
                ui.vertical_centered(|ui| {
                    if ui.button("OK").clicked() {
                        dismissed = true;
                    }
                });
            });

        if dismissed {
            self.notice = None;
        }
    }
}

fn render_upload(ctx: &egui::Context) -> Option<Action> {
    let mut action = None;

    CentralPanel::default().show(ctx, |ui| {
        ui.vertical_centered(|ui| {
            ui.add_space(10.0);
            ui.label(RichText::new(APP_TITLE).size(16.0).strong());
            ui.add_space(20.0);
            if ui.button("Upload CSV File").clicked() {
                action = Some(Action::PickFile);
            }
        });
    });

    action
}

fn render_table(ctx: &egui::Context, table: &StudentTable) -> Option<Action> {
    let mut action = None;

    TopBottomPanel::top("table_actions").show(ctx, |ui| {
        ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
            ui.add_space(20.0);
            if ui.button("Analyze the Data").clicked() {
                action = Some(Action::Analyze);
            }
        });
    });

    CentralPanel::default().show(ctx, |ui| {
        ScrollArea::horizontal().show(ui, |ui| {
            TableBuilder::new(ui)
                .striped(true)
                .resizable(true)
                .cell_layout(Layout::centered_and_justified(egui::Direction::LeftToRight))
                .columns(Column::auto().at_least(90.0), table.column_count())
                .header(20.0, |mut header| {
                    for name in table.columns() {
                        header.col(|ui| {
                            ui.strong(name);
                        });
                    }
                })
                .body(|body| {
                    body.rows(18.0, table.len(), |mut row| {
                        let student = &table.rows()[row.index()];
                        for column in 0..table.column_count() {
                            row.col(|ui| {
                                ui.label(student.cell(column));
                            });
                        }
                    });
                });
        });
    });

    action
}

fn render_graphs(ctx: &egui::Context, table: &StudentTable, scene: &Scene) -> Option<Action> {
    let mut action = None;

    TopBottomPanel::bottom("graph_actions").show(ctx, |ui| {
        ui.add_space(10.0);
        ui.vertical_centered(|ui| {
            if ui.button("Download Graphs as PDF").clicked() {
                action = Some(Action::Export);
            }
            ui.weak(format!("{} students analysed", table.len()));
        });
        ui.add_space(10.0);
    });

    CentralPanel::default().show(ctx, |ui| {
        ui.centered_and_justified(|ui| {
            ui.add(FigureView::new(scene));
        });
    });

    action
}
