#![cfg_attr(target_os = "windows", windows_subsystem = "windows")]

mod app;

use chatshell_client::{
    config::ClientArgs,
    logging::init_logging,
    ui_layout::{MAIN_DEFAULT_H, MAIN_DEFAULT_W, MAIN_MIN_H, MAIN_MIN_W, WINDOW_TITLE},
};
use clap::Parser;
use eframe::egui;
use tracing::{error, info};

fn main() {
    let log_path = init_logging();

    let args = match ClientArgs::try_parse() {
        Ok(args) => args,
        Err(err) => {
            error!("arg parse failed: {}", err);
            let _ = err.print();
            std::process::exit(2);
        }
    };

    info!(
        client_bin = %args.client_bin.display(),
        config = %args.config.display(),
        "starting chat shell"
    );

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(WINDOW_TITLE)
            .with_inner_size([MAIN_DEFAULT_W, MAIN_DEFAULT_H])
            .with_min_inner_size([MAIN_MIN_W, MAIN_MIN_H]),
        ..Default::default()
    };

    if let Err(err) = eframe::run_native(
        WINDOW_TITLE,
        options,
        Box::new(move |cc| Ok(Box::new(app::ChatShellApp::new(cc, args, log_path)))),
    ) {
        error!("window failed: {}", err);
        std::process::exit(1);
    }
}
