use std::path::PathBuf;

use chatshell_supervisor::{DEFAULT_CONFIG_PATH, default_client_binary};
use clap::Parser;

#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(name = "chatshell-client")]
pub struct ClientArgs {
    /// Chat client executable to supervise.
    #[arg(long, default_value_os_t = default_client_binary())]
    pub client_bin: PathBuf,
    /// Config file handed to the client as its only argument.
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,
}

impl Default for ClientArgs {
    fn default() -> Self {
        Self {
            client_bin: default_client_binary(),
            config: PathBuf::from(DEFAULT_CONFIG_PATH),
        }
    }
}
