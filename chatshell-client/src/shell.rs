use chatshell_core::{
    ChatHistory, Composer, ConnectionState, ConversationEntry, FileSelection, LOCAL_SENDER,
    Message, NavItem, StatusDelta, placeholder_conversations,
};
use chatshell_supervisor::{LaunchError, MonitorEvent, SupervisedClient};
use tracing::{debug, info, warn};

pub const STATUS_DISCONNECTED: &str = "Disconnected";
pub const STATUS_CLIENT_EXITED: &str = "Client process exited";

/// What the connection label shows. `Failed` is distinct from the initial
/// `Disconnected` so the user can tell a refused connection from no attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LinkStatus {
    #[default]
    Disconnected,
    Connected,
    Failed,
}

/// Everything the window renders. Only the UI thread touches it.
#[derive(Debug)]
pub struct ShellState {
    pub connection: ConnectionState,
    pub link: LinkStatus,
    pub history: ChatHistory,
    pub composer: Composer,
    pub conversations: Vec<ConversationEntry>,
    pub nav: NavItem,
    pub files: FileSelection,
    pub status_message: String,
    pub client_pid: Option<u32>,
}

impl Default for ShellState {
    fn default() -> Self {
        Self::new()
    }
}

impl ShellState {
    pub fn new() -> Self {
        Self {
            connection: ConnectionState::default(),
            link: LinkStatus::Disconnected,
            history: ChatHistory::new(),
            composer: Composer::default(),
            conversations: placeholder_conversations(),
            nav: NavItem::default(),
            files: FileSelection::default(),
            status_message: STATUS_DISCONNECTED.to_owned(),
            client_pid: None,
        }
    }

    pub fn client_launched(&mut self, pid: u32) {
        self.client_pid = Some(pid);
        self.status_message = format!("Client started (pid {pid})");
    }

    pub fn launch_failed(&mut self, err: &LaunchError) {
        self.client_pid = None;
        self.status_message = err.to_string();
    }

    /// Record the outcome of starting and supervising the client. On error
    /// the process has already been stopped and nothing is kept.
    pub fn attach_client(
        &mut self,
        launch: Result<SupervisedClient, LaunchError>,
    ) -> Option<SupervisedClient> {
        match launch {
            Ok(client) => {
                self.client_launched(client.pid());
                Some(client)
            }
            Err(err) => {
                warn!("client launch failed: {}", err);
                self.launch_failed(&err);
                None
            }
        }
    }

    pub fn apply_monitor_event(&mut self, event: MonitorEvent) {
        match event {
            MonitorEvent::Status { line, event } => {
                debug!(line = %line, ?event, "applying client status");
                self.apply_delta(&event.delta());
            }
            MonitorEvent::Exited => {
                info!(pid = ?self.client_pid, "client output closed");
                self.client_pid = None;
                self.status_message = STATUS_CLIENT_EXITED.to_owned();
            }
        }
    }

    pub fn apply_delta(&mut self, delta: &StatusDelta) {
        self.connection.apply(delta);
        match delta.connected {
            Some(true) => self.link = LinkStatus::Connected,
            Some(false) => self.link = LinkStatus::Failed,
            None => {}
        }
        if let Some(note) = &delta.note {
            self.status_message = note.clone();
        }
    }

    /// Move composed text into the local history. Nothing is transmitted.
    pub fn submit_composer(&mut self) -> Option<&Message> {
        let text = self.composer.submit()?;
        self.history.append(Message::new(LOCAL_SENDER, text));
        self.history.latest()
    }

    pub fn identity_label(&self) -> String {
        match &self.connection.client_id {
            Some(id) => format!("👤 Client #{id}"),
            None => "👤 Unknown".to_owned(),
        }
    }

    pub fn connection_label(&self) -> &'static str {
        match self.link {
            LinkStatus::Disconnected => "🔴 Disconnected",
            LinkStatus::Connected => "🟢 Connected",
            LinkStatus::Failed => "⚪❌ Problem connecting to the server",
        }
    }
}
