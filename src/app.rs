//! Main application state and UI

use eframe::egui;
use once_cell::sync::Lazy;
use std::sync::mpsc::{channel, Receiver};
use std::thread;

use strprofiler::{
    load_results_json, parse_sequence_input, parse_str_database, run_profiling,
    save_results_json, write_verdict_csv, ProfileParams, ProfileResults, ProgressUpdate,
    SequenceData, StrDatabase, ThreadCount, Verdict,
};

static AVAILABLE_THREADS: Lazy<usize> = Lazy::new(|| {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
});

const GUILTY_COLOR: egui::Color32 = egui::Color32::from_rgb(220, 80, 80);
const OK_COLOR: egui::Color32 = egui::Color32::from_rgb(100, 200, 100);

/// Application state
pub struct ProfilerApp {
    // Input tab state - sequence
    sequence_input: String,
    sequence_data: Option<SequenceData>,
    sequence_error: Option<String>,

    // Input tab state - STR database
    database_input: String,
    database_data: Option<StrDatabase>,
    database_error: Option<String>,

    // Profiling parameters
    params: ProfileParams,
    thread_selection: ThreadSelection,
    manual_thread_count: usize,

    // Profiling state
    is_profiling: bool,
    progress: Option<ProgressUpdate>,
    progress_rx: Option<Receiver<ProgressUpdate>>,
    results_rx: Option<Receiver<strprofiler::Result<ProfileResults>>>,
    profiling_error: Option<String>,

    // Results state
    results: Option<ProfileResults>,
    show_only_guilty: bool,

    // View state
    current_tab: Tab,

    // Save/Load
    save_error: Option<String>,
    load_error: Option<String>,

    // Deferred actions
    pending_save: bool,
    pending_export: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tab {
    Input,
    Profiling,
    Results,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ThreadSelection {
    Auto,
    Manual,
}

impl Default for ProfilerApp {
    fn default() -> Self {
        Self {
            sequence_input: String::new(),
            sequence_data: None,
            sequence_error: None,
            database_input: String::new(),
            database_data: None,
            database_error: None,
            params: ProfileParams::default(),
            thread_selection: ThreadSelection::Auto,
            manual_thread_count: *AVAILABLE_THREADS,
            is_profiling: false,
            progress: None,
            progress_rx: None,
            results_rx: None,
            profiling_error: None,
            results: None,
            show_only_guilty: false,
            current_tab: Tab::Input,
            save_error: None,
            load_error: None,
            pending_save: false,
            pending_export: false,
        }
    }
}

impl ProfilerApp {
    pub fn new(_cc: &eframe::CreationContext<'_>) -> Self {
        Self::default()
    }

    fn parse_sequence(&mut self) {
        self.sequence_error = None;
        self.sequence_data = None;

        if self.sequence_input.trim().is_empty() {
            return;
        }

        match parse_sequence_input(&self.sequence_input, &self.params) {
            Ok(data) => self.sequence_data = Some(data),
            Err(e) => self.sequence_error = Some(e.to_string()),
        }
    }

    fn parse_database(&mut self) {
        self.database_error = None;
        self.database_data = None;

        if self.database_input.trim().is_empty() {
            return;
        }

        match parse_str_database(&self.database_input) {
            Ok(data) => self.database_data = Some(data),
            Err(e) => self.database_error = Some(e.to_string()),
        }
    }

    fn start_profiling(&mut self) {
        let Some(sequence) = &self.sequence_data else {
            return;
        };
        let Some(database) = &self.database_data else {
            return;
        };

        self.params.thread_count = match self.thread_selection {
            ThreadSelection::Auto => ThreadCount::Auto,
            ThreadSelection::Manual => ThreadCount::Fixed(self.manual_thread_count),
        };

        let sequence_clone = sequence.clone();
        let database_clone = database.clone();
        let params_clone = self.params.clone();

        let (progress_tx, progress_rx) = channel();
        let (results_tx, results_rx) = channel();

        self.progress_rx = Some(progress_rx);
        self.results_rx = Some(results_rx);
        self.is_profiling = true;
        self.progress = None;
        self.profiling_error = None;

        thread::spawn(move || {
            let results = run_profiling(
                &sequence_clone,
                &database_clone,
                &params_clone,
                Some(progress_tx),
            );
            let _ = results_tx.send(results);
        });
    }

    fn check_progress(&mut self) {
        if let Some(rx) = &self.progress_rx {
            while let Ok(progress) = rx.try_recv() {
                self.progress = Some(progress);
            }
        }

        if let Some(rx) = &self.results_rx {
            if let Ok(outcome) = rx.try_recv() {
                self.is_profiling = false;
                self.progress_rx = None;
                self.results_rx = None;
                match outcome {
                    Ok(results) => {
                        self.results = Some(results);
                        self.current_tab = Tab::Results;
                    }
                    Err(e) => {
                        self.profiling_error = Some(format!("Profiling failed: {}", e));
                    }
                }
            }
        }
    }

    fn save_results(&mut self) {
        let Some(results) = &self.results else {
            self.save_error = Some("No results to save".to_string());
            return;
        };

        if let Some(path) = rfd::FileDialog::new()
            .add_filter("JSON", &["json"])
            .set_file_name("profile_results.json")
            .save_file()
        {
            self.save_error = save_results_json(results, &path)
                .err()
                .map(|e| format!("Failed to save results: {}", e));
        }
    }

    fn export_verdicts(&mut self) {
        let Some(results) = &self.results else {
            self.save_error = Some("No results to export".to_string());
            return;
        };

        if let Some(path) = rfd::FileDialog::new()
            .add_filter("CSV", &["csv"])
            .set_file_name("verdicts.csv")
            .save_file()
        {
            let written = std::fs::File::create(&path)
                .map_err(strprofiler::ProfileError::from)
                .and_then(|file| write_verdict_csv(results, file));
            self.save_error = written
                .err()
                .map(|e| format!("Failed to export verdicts: {}", e));
        }
    }

    fn load_results(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("JSON", &["json"])
            .pick_file()
        {
            match load_results_json(&path) {
                Ok(results) => {
                    self.results = Some(results);
                    self.load_error = None;
                    self.current_tab = Tab::Results;
                }
                Err(e) => {
                    self.load_error = Some(format!("Failed to load results: {}", e));
                }
            }
        }
    }

    fn load_sequence_file(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("Sequence", &["txt", "fasta", "fa", "fna", "fas"])
            .pick_file()
        {
            match std::fs::read_to_string(&path) {
                Ok(content) => {
                    self.sequence_input = content;
                    self.parse_sequence();
                }
                Err(e) => {
                    self.sequence_error = Some(format!("Failed to read file: {}", e));
                }
            }
        }
    }

    fn load_database_file(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("CSV", &["csv", "txt"])
            .pick_file()
        {
            match std::fs::read_to_string(&path) {
                Ok(content) => {
                    self.database_input = content;
                    self.parse_database();
                }
                Err(e) => {
                    self.database_error = Some(format!("Failed to read file: {}", e));
                }
            }
        }
    }
}

impl eframe::App for ProfilerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if self.is_profiling {
            self.check_progress();
            ctx.request_repaint();
        }

        // Dialogs are opened outside of the panel closures
        if self.pending_save {
            self.pending_save = false;
            self.save_results();
        }
        if self.pending_export {
            self.pending_export = false;
            self.export_verdicts();
        }

        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("File", |ui| {
                    if ui.button("Load Sequence...").clicked() {
                        self.load_sequence_file();
                        ui.close_menu();
                    }
                    if ui.button("Load STR Database...").clicked() {
                        self.load_database_file();
                        ui.close_menu();
                    }
                    ui.separator();
                    if ui.button("Load Results...").clicked() {
                        self.load_results();
                        ui.close_menu();
                    }
                    if ui.button("Save Results...").clicked() {
                        self.save_results();
                        ui.close_menu();
                    }
                    if ui.button("Export Verdicts (CSV)...").clicked() {
                        self.export_verdicts();
                        ui.close_menu();
                    }
                });
            });
        });

        egui::TopBottomPanel::top("tabs").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.selectable_value(&mut self.current_tab, Tab::Input, "Input Data");
                ui.selectable_value(&mut self.current_tab, Tab::Profiling, "Profiling");
                ui.selectable_value(&mut self.current_tab, Tab::Results, "Results");
            });
        });

        egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if self.is_profiling {
                    ui.spinner();
                    if let Some(ref progress) = self.progress {
                        ui.label(&progress.message);
                    } else {
                        ui.label("Starting profiling...");
                    }
                } else if let Some(ref results) = self.results {
                    ui.label(format!(
                        "Results: {} suspects, {} guilty | {} ({} bp)",
                        results.verdicts.len(),
                        results.guilty().count(),
                        results.sequence_name,
                        results.sequence_length
                    ));
                } else {
                    let mut parts = Vec::new();
                    if let Some(ref s) = self.sequence_data {
                        parts.push(format!("Sequence: {} bp", s.len()));
                    }
                    if let Some(ref db) = self.database_data {
                        parts.push(format!(
                            "Database: {} suspects, {} markers",
                            db.len(),
                            db.markers.len()
                        ));
                    }
                    if parts.is_empty() {
                        ui.label("Load a sequence and an STR database to begin");
                    } else {
                        ui.label(parts.join(" | "));
                    }
                }
            });
        });

        egui::CentralPanel::default().show(ctx, |ui| match self.current_tab {
            Tab::Input => self.show_input_tab(ui),
            Tab::Profiling => self.show_profiling_tab(ui),
            Tab::Results => self.show_results_tab(ui),
        });
    }
}

impl ProfilerApp {
    fn show_input_tab(&mut self, ui: &mut egui::Ui) {
        ui.heading("Input Data");
        ui.separator();

        let available_height = ui.available_height();
        let panel_height = (available_height / 2.0 - 60.0).max(120.0);

        // --- DNA Sequence ---
        ui.group(|ui| {
            ui.horizontal(|ui| {
                ui.heading("DNA Sequence");
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.button("Clear").clicked() {
                        self.sequence_input.clear();
                        self.sequence_data = None;
                        self.sequence_error = None;
                    }
                    if ui.button("Load File").clicked() {
                        self.load_sequence_file();
                    }
                    if ui.button("Load Example").clicked() {
                        self.sequence_input = EXAMPLE_SEQUENCE.to_string();
                        self.parse_sequence();
                    }
                });
            });

            ui.label("Raw sequence text or a single FASTA record:");

            egui::ScrollArea::vertical()
                .id_salt("sequence_scroll")
                .max_height(panel_height)
                .show(ui, |ui| {
                    let response = ui.add(
                        egui::TextEdit::multiline(&mut self.sequence_input)
                            .font(egui::TextStyle::Monospace)
                            .desired_width(f32::INFINITY)
                            .desired_rows(6),
                    );
                    if response.changed() {
                        self.parse_sequence();
                    }
                });

            if let Some(ref error) = self.sequence_error {
                ui.colored_label(egui::Color32::RED, format!("Error: {}", error));
            }
            if let Some(ref data) = self.sequence_data {
                ui.colored_label(OK_COLOR, format!("Sequence: {} ({} bp)", data.name, data.len()));
            }
        });

        ui.add_space(5.0);

        // --- STR Database ---
        ui.group(|ui| {
            ui.horizontal(|ui| {
                ui.heading("STR Database");
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.button("Clear").clicked() {
                        self.database_input.clear();
                        self.database_data = None;
                        self.database_error = None;
                    }
                    if ui.button("Load File").clicked() {
                        self.load_database_file();
                    }
                    if ui.button("Load Example").clicked() {
                        self.database_input = EXAMPLE_DATABASE.to_string();
                        self.parse_database();
                    }
                });
            });

            ui.label("CSV with a header row: name, then one column per STR marker:");

            egui::ScrollArea::vertical()
                .id_salt("database_scroll")
                .max_height(panel_height)
                .show(ui, |ui| {
                    let response = ui.add(
                        egui::TextEdit::multiline(&mut self.database_input)
                            .font(egui::TextStyle::Monospace)
                            .desired_width(f32::INFINITY)
                            .desired_rows(6),
                    );
                    if response.changed() {
                        self.parse_database();
                    }
                });

            if let Some(ref error) = self.database_error {
                ui.colored_label(egui::Color32::RED, format!("Error: {}", error));
            }
            if let Some(ref data) = self.database_data {
                ui.colored_label(
                    OK_COLOR,
                    format!(
                        "Database: {} suspects, markers: {}",
                        data.len(),
                        data.markers.join(", ")
                    ),
                );
            }
        });
    }

    fn show_profiling_tab(&mut self, ui: &mut egui::Ui) {
        ui.heading("Profiling");
        ui.separator();

        let has_sequence = self.sequence_data.is_some();
        let has_database = self.database_data.is_some();

        if !has_sequence || !has_database {
            ui.colored_label(
                egui::Color32::YELLOW,
                if !has_sequence && !has_database {
                    "Please load a sequence and an STR database in the Input tab."
                } else if !has_sequence {
                    "Please load a DNA sequence in the Input tab."
                } else {
                    "Please load an STR database in the Input tab."
                },
            );
            return;
        }

        egui::ScrollArea::vertical().show(ui, |ui| {
            ui.group(|ui| {
                ui.heading("Sequence Handling");
                let mut reparse = false;
                reparse |= ui
                    .checkbox(
                        &mut self.params.trim_whitespace,
                        "Strip whitespace and line breaks from raw sequences",
                    )
                    .changed();
                reparse |= ui
                    .checkbox(
                        &mut self.params.uppercase,
                        "Ignore case (upper-case sequence and markers)",
                    )
                    .changed();
                if reparse {
                    self.parse_sequence();
                }
            });

            ui.add_space(10.0);

            ui.group(|ui| {
                ui.heading("Parallelization");

                ui.horizontal(|ui| {
                    ui.radio_value(
                        &mut self.thread_selection,
                        ThreadSelection::Auto,
                        format!("Auto ({} threads)", *AVAILABLE_THREADS),
                    );
                });

                ui.horizontal(|ui| {
                    ui.radio_value(&mut self.thread_selection, ThreadSelection::Manual, "Manual:");
                    let enabled = self.thread_selection == ThreadSelection::Manual;
                    ui.add_enabled(
                        enabled,
                        egui::DragValue::new(&mut self.manual_thread_count)
                            .range(1..=(*AVAILABLE_THREADS).max(32)),
                    );
                    ui.label("threads");
                });
            });

            ui.add_space(20.0);

            ui.horizontal(|ui| {
                let can_run = self.sequence_data.is_some()
                    && self.database_data.is_some()
                    && !self.is_profiling;
                if ui
                    .add_enabled(can_run, egui::Button::new("Run Profiling"))
                    .clicked()
                {
                    self.start_profiling();
                }

                if self.is_profiling {
                    ui.spinner();
                    if let Some(ref progress) = self.progress {
                        ui.label(&progress.message);
                    }
                }
            });

            if let Some(ref error) = self.profiling_error {
                ui.colored_label(egui::Color32::RED, error);
            }
        });
    }

    fn show_results_tab(&mut self, ui: &mut egui::Ui) {
        let Some(results) = &self.results else {
            ui.heading("Results");
            ui.separator();
            ui.label("No results yet. Run profiling from the Profiling tab.");
            return;
        };

        ui.horizontal(|ui| {
            ui.heading("Results");
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.button("Export CSV").clicked() {
                    self.pending_export = true;
                }
                if ui.button("Save Results").clicked() {
                    self.pending_save = true;
                }
            });
        });
        ui.separator();

        ui.horizontal(|ui| {
            ui.checkbox(&mut self.show_only_guilty, "Show only matching suspects");
            ui.add_space(20.0);
            ui.label(format!(
                "{} of {} suspects match {}",
                results.guilty().count(),
                results.verdicts.len(),
                results.sequence_name
            ));
        });

        ui.add_space(5.0);

        egui::ScrollArea::both().id_salt("verdict_scroll").show(ui, |ui| {
            egui::Grid::new("verdict_grid")
                .striped(true)
                .spacing([16.0, 4.0])
                .show(ui, |ui| {
                    ui.strong("Name");
                    ui.strong("Verdict");
                    for marker in &results.markers {
                        ui.strong(egui::RichText::new(marker).monospace());
                    }
                    ui.end_row();

                    ui.label(egui::RichText::new("observed").italics());
                    ui.label("");
                    for marker in &results.markers {
                        let count = results.observed.get(marker).copied().unwrap_or(0);
                        ui.label(egui::RichText::new(count.to_string()).italics());
                    }
                    ui.end_row();

                    for verdict in &results.verdicts {
                        if self.show_only_guilty && verdict.verdict != Verdict::Guilty {
                            continue;
                        }

                        ui.label(&verdict.name);
                        let verdict_color = match verdict.verdict {
                            Verdict::Guilty => GUILTY_COLOR,
                            Verdict::Innocent => egui::Color32::GRAY,
                        };
                        ui.colored_label(verdict_color, verdict.verdict.as_str());

                        for marker in &results.markers {
                            match verdict.markers.iter().find(|c| &c.marker == marker) {
                                Some(c) if c.is_match() => {
                                    ui.colored_label(OK_COLOR, c.expected.to_string());
                                }
                                Some(c) => {
                                    ui.colored_label(egui::Color32::RED, c.expected.to_string())
                                        .on_hover_text(format!("observed {}", c.observed));
                                }
                                None => {
                                    ui.label("-");
                                }
                            }
                        }
                        ui.end_row();
                    }
                });
        });

        if let Some(ref error) = self.save_error {
            ui.colored_label(egui::Color32::RED, error);
        }
        if let Some(ref error) = self.load_error {
            ui.colored_label(egui::Color32::RED, error);
        }
    }
}

const EXAMPLE_SEQUENCE: &str = ">crime_scene_sample
AGACGGGTTACCATGACTATCTATCTATCTATCTATCTATCTATCTATCACGTACGTACGTATCGAGATAGATAGATAGATAGAT
CCTCGACTTCGATCGCAATGAATGCCAATAGACAAAA
";

const EXAMPLE_DATABASE: &str = "name,AGAT,AATG,TATC
Abel,3,7,4
Cain,5,2,8
Enos,6,1,5
Seth,5,2,7
";
