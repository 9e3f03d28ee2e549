mod app;
mod repaint;
mod textures;


use eframe::egui;

use crate::runtime::{self, AppContext, AppError, ClientConfig};

use app::SnapIdApp;

const WINDOW_TITLE: &str = "SnapID";
const WINDOW_MIN_SIZE: [f32; 2] = [720.0, 520.0];
const WINDOW_DEFAULT_SIZE: [f32; 2] = [1024.0, 760.0];

pub fn run(config: ClientConfig) -> Result<(), String> {
    open_window(config).map_err(|error| error.to_string())
}

fn open_window(config: ClientConfig) -> runtime::Result<()> {
    let context = AppContext::new(config)?;
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(WINDOW_TITLE)
            .with_inner_size(WINDOW_DEFAULT_SIZE)
            .with_min_inner_size(WINDOW_MIN_SIZE)
            .with_resizable(true)
            .with_drag_and_drop(true),
        ..Default::default()
    };

    eframe::run_native(
        WINDOW_TITLE,
        options,
        Box::new(move |_cc| Ok(Box::new(SnapIdApp::new(&context)))),
    )
    .map_err(|error| AppError::Ui(error.to_string()))
}
