pub mod config;
pub mod logging;
pub mod shell;
pub mod ui_layout;
