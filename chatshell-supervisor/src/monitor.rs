use std::{
    io,
    process::ExitStatus,
    sync::mpsc::{self, Receiver, Sender},
    thread::{self, JoinHandle},
};

use chatshell_core::{StatusEvent, parse_line};
use tracing::{debug, info, warn};

use crate::process::{LaunchError, OutputLines, ProcessHandle};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MonitorEvent {
    Status { line: String, event: StatusEvent },
    Exited,
}

/// Read client output on a background thread and forward recognized events.
///
/// `notify` runs after each send so a UI can wake up and drain the channel.
/// The thread stops early if the receiving side is dropped.
pub fn spawn_status_monitor<F>(
    lines: OutputLines,
    sink: Sender<MonitorEvent>,
    notify: F,
) -> io::Result<JoinHandle<()>>
where
    F: Fn() + Send + 'static,
{
    thread::Builder::new()
        .name("client-output".to_owned())
        .spawn(move || run_monitor(lines, &sink, &notify))
}

/// A started client together with the thread reading its output.
#[derive(Debug)]
pub struct SupervisedClient {
    pub handle: ProcessHandle,
    pub events: Receiver<MonitorEvent>,
    reader: JoinHandle<()>,
}

/// Attach a status monitor to `handle`.
///
/// The process is terminated before any error is returned, so a failed
/// attach never leaves a client running unobserved.
pub fn supervise<F>(mut handle: ProcessHandle, notify: F) -> Result<SupervisedClient, LaunchError>
where
    F: Fn() + Send + 'static,
{
    let Some(lines) = handle.take_output() else {
        handle.terminate();
        return Err(LaunchError::OutputUnavailable);
    };

    let (tx, events) = mpsc::channel();
    match spawn_status_monitor(lines, tx, notify) {
        Ok(reader) => Ok(SupervisedClient {
            handle,
            events,
            reader,
        }),
        Err(err) => {
            handle.terminate();
            Err(LaunchError::Reader(err))
        }
    }
}

impl SupervisedClient {
    pub fn pid(&self) -> u32 {
        self.handle.pid()
    }

    /// Terminate the client, wait for the reader thread, and return the exit
    /// status collected while reaping.
    pub fn shutdown(mut self) -> Option<ExitStatus> {
        self.handle.terminate();
        if self.reader.join().is_err() {
            warn!(pid = self.handle.pid(), "client output reader panicked");
        }
        self.handle.exit_status()
    }
}

fn run_monitor(lines: OutputLines, sink: &Sender<MonitorEvent>, notify: &dyn Fn()) {
    for line in lines {
        let Some(event) = parse_line(&line) else {
            debug!(line = %line, "client output");
            continue;
        };

        debug!(line = %line, ?event, "client status");
        if sink.send(MonitorEvent::Status { line, event }).is_err() {
            debug!("monitor receiver dropped; stopping");
            return;
        }
        notify();
    }

    info!("client output closed");
    if sink.send(MonitorEvent::Exited).is_ok() {
        notify();
    }
}

#[cfg(test)]
mod tests {
    use std::{
        io::Cursor,
        sync::{
            Arc,
            atomic::{AtomicUsize, Ordering},
            mpsc,
        },
    };

    use super::*;

    fn lines(text: &str) -> OutputLines {
        OutputLines::from_reader(Cursor::new(text.as_bytes().to_vec()))
    }

    #[test]
    fn forwards_recognized_lines_then_exit() {
        let (tx, rx) = mpsc::channel();
        let wakeups = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&wakeups);

        let handle = spawn_status_monitor(
            lines("booting\nConnected to server\nsent 4 bytes\nAssigned client ID: 7\n"),
            tx,
            move || {
                counter.fetch_add(1, Ordering::SeqCst);
            },
        )
        .expect("spawn monitor");
        handle.join().expect("monitor thread");

        let events: Vec<MonitorEvent> = rx.iter().collect();
        assert_eq!(
            events,
            vec![
                MonitorEvent::Status {
                    line: "Connected to server".to_owned(),
                    event: StatusEvent::Connected,
                },
                MonitorEvent::Status {
                    line: "Assigned client ID: 7".to_owned(),
                    event: StatusEvent::ClientIdAssigned("7".to_owned()),
                },
                MonitorEvent::Exited,
            ]
        );
        assert_eq!(wakeups.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn stops_when_receiver_is_gone() {
        let (tx, rx) = mpsc::channel();
        drop(rx);

        let handle = spawn_status_monitor(
            lines("Connected to server\nConnection failed\n"),
            tx,
            || panic!("notify must not run without a receiver"),
        )
        .expect("spawn monitor");
        handle.join().expect("monitor thread exits cleanly");
    }
}
