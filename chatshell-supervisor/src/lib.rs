mod monitor;
mod process;

pub use monitor::{MonitorEvent, SupervisedClient, spawn_status_monitor, supervise};
pub use process::{
    CLIENT_BINARY_NAME, DEFAULT_CONFIG_PATH, LaunchError, OutputLines, ProcessHandle,
    default_client_binary, start,
};
