use serde::{Deserialize, Serialize};

pub const MARKER_CLIENT_ID: &str = "Assigned client ID:";
pub const MARKER_CONNECTION_FAILED: &str = "Connection failed";
pub const MARKER_CONNECTED: &str = "Connected to server";
pub const MARKER_WAITING: &str = "Waiting for another client";

pub const NOTE_CONNECTION_FAILED: &str = "Problem connecting to the server";
pub const NOTE_CONNECTED: &str = "Connected to server";
pub const NOTE_WAITING: &str = "Waiting for another client...";

pub const LOCAL_SENDER: &str = "You";

pub type ClientId = String;

/// One recognized line of client output.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "data")]
pub enum StatusEvent {
    ClientIdAssigned(ClientId),
    ConnectionFailed,
    Connected,
    WaitingForPeer,
}

/// State change implied by a [`StatusEvent`]. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusDelta {
    pub connected: Option<bool>,
    pub client_id: Option<ClientId>,
    pub note: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectionState {
    pub connected: bool,
    pub client_id: Option<ClientId>,
}

impl StatusEvent {
    pub fn delta(&self) -> StatusDelta {
        match self {
            StatusEvent::ClientIdAssigned(id) => StatusDelta {
                connected: None,
                client_id: Some(id.clone()),
                note: Some(format!("{MARKER_CLIENT_ID} {id}")),
            },
            StatusEvent::ConnectionFailed => StatusDelta {
                connected: Some(false),
                client_id: None,
                note: Some(NOTE_CONNECTION_FAILED.to_owned()),
            },
            StatusEvent::Connected => StatusDelta {
                connected: Some(true),
                client_id: None,
                note: Some(NOTE_CONNECTED.to_owned()),
            },
            StatusEvent::WaitingForPeer => StatusDelta {
                connected: None,
                client_id: None,
                note: Some(NOTE_WAITING.to_owned()),
            },
        }
    }
}

impl ConnectionState {
    pub fn apply(&mut self, delta: &StatusDelta) {
        if let Some(connected) = delta.connected {
            self.connected = connected;
        }
        if let Some(client_id) = &delta.client_id {
            self.client_id = Some(client_id.clone());
        }
    }
}

/// Map one line of client output to at most one event.
///
/// Rules are checked in a fixed order and the first marker found decides the
/// line, even when the line turns out to be malformed for that rule.
pub fn parse_line(line: &str) -> Option<StatusEvent> {
    if let Some(start) = line.find(MARKER_CLIENT_ID) {
        return extract_client_id(&line[start..]).map(StatusEvent::ClientIdAssigned);
    }
    if line.contains(MARKER_CONNECTION_FAILED) {
        return Some(StatusEvent::ConnectionFailed);
    }
    if line.contains(MARKER_CONNECTED) {
        return Some(StatusEvent::Connected);
    }
    if line.contains(MARKER_WAITING) {
        return Some(StatusEvent::WaitingForPeer);
    }
    None
}

pub fn reduce(state: &mut ConnectionState, line: &str) -> Option<StatusDelta> {
    let delta = parse_line(line)?.delta();
    state.apply(&delta);
    Some(delta)
}

fn extract_client_id(portion: &str) -> Option<ClientId> {
    let (_, rest) = portion.split_once(':')?;
    let id = rest.trim();
    if id.is_empty() {
        return None;
    }
    Some(id.to_owned())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub sender: String,
    pub text: String,
}

impl Message {
    pub fn new(sender: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            sender: sender.into(),
            text: text.into(),
        }
    }

    pub fn render(&self) -> String {
        format!("{}: {}", self.sender, self.text)
    }
}

/// Append-only message log, ordered by arrival.
#[derive(Debug, Clone, Default)]
pub struct ChatHistory {
    messages: Vec<Message>,
}

impl ChatHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn latest(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Message> {
        self.messages.iter()
    }
}

impl<'a> IntoIterator for &'a ChatHistory {
    type Item = &'a Message;
    type IntoIter = std::slice::Iter<'a, Message>;

    fn into_iter(self) -> Self::IntoIter {
        self.messages.iter()
    }
}

/// Single-line input buffer backing the message box.
#[derive(Debug, Clone, Default)]
pub struct Composer {
    pub text: String,
}

impl Composer {
    /// Take the trimmed text if there is any, clearing the buffer.
    ///
    /// Whitespace-only input is left in place and yields nothing.
    pub fn submit(&mut self) -> Option<String> {
        let trimmed = self.text.trim();
        if trimmed.is_empty() {
            return None;
        }
        let out = trimmed.to_owned();
        self.text.clear();
        Some(out)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationEntry {
    pub label: String,
}

pub fn placeholder_conversations() -> Vec<ConversationEntry> {
    ["Client #1", "Client #2", "Group: Dev Team", "Client #3"]
        .into_iter()
        .map(|label| ConversationEntry {
            label: label.to_owned(),
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NavItem {
    #[default]
    Chat,
    Files,
    Settings,
}

impl NavItem {
    pub const ALL: [NavItem; 3] = [NavItem::Chat, NavItem::Files, NavItem::Settings];

    pub fn label(self) -> &'static str {
        match self {
            NavItem::Chat => "Chat",
            NavItem::Files => "Files",
            NavItem::Settings => "Settings",
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            NavItem::Chat => "chat",
            NavItem::Files => "files",
            NavItem::Settings => "settings",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|item| item.key() == key)
    }
}

/// File picked in the Files panel. Nothing is sent; progress only ever moves
/// when something calls [`FileSelection::set_progress`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileSelection {
    path: Option<String>,
    progress_percent: u8,
}

impl FileSelection {
    pub fn select(&mut self, path: impl Into<String>) {
        self.path = Some(path.into());
        self.progress_percent = 0;
    }

    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    pub fn label(&self) -> &str {
        self.path.as_deref().unwrap_or("No file selected")
    }

    pub fn set_progress(&mut self, percent: u32) {
        self.progress_percent = percent.min(100) as u8;
    }

    pub fn progress_percent(&self) -> u8 {
        self.progress_percent
    }

    pub fn progress_fraction(&self) -> f32 {
        f32::from(self.progress_percent) / 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_id_is_extracted_and_trimmed() {
        assert_eq!(
            parse_line("Assigned client ID: 42"),
            Some(StatusEvent::ClientIdAssigned("42".to_owned()))
        );
        assert_eq!(
            parse_line("[info] Assigned client ID:   7  \r"),
            Some(StatusEvent::ClientIdAssigned("7".to_owned()))
        );
    }

    #[test]
    fn malformed_client_id_is_ignored_and_suppresses_lower_rules() {
        assert_eq!(parse_line("Assigned client ID:"), None);
        assert_eq!(
            parse_line("Assigned client ID:    Connected to server"),
            Some(StatusEvent::ClientIdAssigned("Connected to server".to_owned()))
        );
        assert_eq!(parse_line("Connection failed; Assigned client ID:  "), None);
    }

    #[test]
    fn connection_failed_wins_regardless_of_surrounding_text() {
        for line in [
            "Connection failed",
            "error: Connection failed (errno 111)",
            "Connection failed after Connected to server",
            "Waiting for another client... Connection failed",
        ] {
            assert_eq!(parse_line(line), Some(StatusEvent::ConnectionFailed), "{line}");
        }
    }

    #[test]
    fn client_id_rule_shadows_connected_rule() {
        let line = "Connected to server. Assigned client ID: 3";
        assert_eq!(
            parse_line(line),
            Some(StatusEvent::ClientIdAssigned("3".to_owned()))
        );
    }

    #[test]
    fn matching_is_case_sensitive() {
        assert_eq!(parse_line("connected to server"), None);
        assert_eq!(parse_line("CONNECTION FAILED"), None);
        assert_eq!(parse_line("assigned client id: 5"), None);
    }

    #[test]
    fn waiting_is_a_note_only() {
        let mut state = ConnectionState::default();
        let delta = reduce(&mut state, "Waiting for another client to join").expect("delta");
        assert_eq!(delta.connected, None);
        assert_eq!(delta.client_id, None);
        assert_eq!(delta.note.as_deref(), Some(NOTE_WAITING));
        assert_eq!(state, ConnectionState::default());
    }

    #[test]
    fn unrecognized_lines_leave_state_alone() {
        let mut state = ConnectionState::default();
        assert!(reduce(&mut state, "sending frame 12 bytes").is_none());
        assert!(reduce(&mut state, "").is_none());
        assert_eq!(state, ConnectionState::default());
    }

    #[test]
    fn reducer_sequence_builds_connection_state() {
        let mut state = ConnectionState::default();
        reduce(&mut state, "Connected to server 127.0.0.1:9000");
        reduce(&mut state, "Assigned client ID: 12");
        assert!(state.connected);
        assert_eq!(state.client_id.as_deref(), Some("12"));

        reduce(&mut state, "Connection failed: peer reset");
        assert!(!state.connected);
        assert_eq!(state.client_id.as_deref(), Some("12"));
    }

    #[test]
    fn status_event_serializes_with_type_tag() {
        let json = serde_json::to_string(&StatusEvent::ClientIdAssigned("9".to_owned()))
            .expect("serialize");
        assert_eq!(json, r#"{"type":"ClientIdAssigned","data":"9"}"#);
        let json = serde_json::to_string(&StatusEvent::Connected).expect("serialize");
        assert_eq!(json, r#"{"type":"Connected"}"#);
    }

    #[test]
    fn history_preserves_arrival_order() {
        let mut history = ChatHistory::new();
        history.append(Message::new("Alice", "hi"));
        history.append(Message::new("Bob", "yo"));

        let rendered: Vec<String> = history.iter().map(Message::render).collect();
        assert_eq!(rendered, vec!["Alice: hi", "Bob: yo"]);
        assert_eq!(history.latest().map(|m| m.sender.as_str()), Some("Bob"));
    }

    #[test]
    fn composer_ignores_blank_input() {
        let mut composer = Composer {
            text: "   \t ".to_owned(),
        };
        assert_eq!(composer.submit(), None);
        assert_eq!(composer.text, "   \t ");

        composer.text = String::new();
        assert_eq!(composer.submit(), None);
    }

    #[test]
    fn composer_trims_and_clears_on_submit() {
        let mut composer = Composer {
            text: "  hello there \n".to_owned(),
        };
        assert_eq!(composer.submit().as_deref(), Some("hello there"));
        assert!(composer.text.is_empty());
    }

    #[test]
    fn nav_keys_roundtrip() {
        for item in NavItem::ALL {
            assert_eq!(NavItem::from_key(item.key()), Some(item));
        }
        assert_eq!(NavItem::from_key("unknown"), None);
    }

    #[test]
    fn file_selection_clamps_progress() {
        let mut selection = FileSelection::default();
        assert_eq!(selection.label(), "No file selected");

        selection.select("/tmp/report.pdf");
        selection.set_progress(250);
        assert_eq!(selection.progress_percent(), 100);
        assert_eq!(selection.label(), "/tmp/report.pdf");

        selection.select("/tmp/other.bin");
        assert_eq!(selection.progress_percent(), 0);
    }

    #[test]
    fn conversations_are_static_placeholders() {
        let labels: Vec<String> = placeholder_conversations()
            .into_iter()
            .map(|entry| entry.label)
            .collect();
        assert_eq!(
            labels,
            vec!["Client #1", "Client #2", "Group: Dev Team", "Client #3"]
        );
    }
}
