//! STR Profiler - DNA Fingerprint Matching Tool
//!
//! Desktop front-end for matching an STR database against a DNA sequence.

use mimalloc::MiMalloc;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

mod app;

use app::ProfilerApp;

fn main() -> eframe::Result<()> {
    strprofiler::init_tracing();

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1100.0, 750.0])
            .with_min_inner_size([800.0, 550.0])
            .with_title("STR Profiler"),
        ..Default::default()
    };

    eframe::run_native(
        "STR Profiler",
        native_options,
        Box::new(|cc| Ok(Box::new(ProfilerApp::new(cc)))),
    )
}
