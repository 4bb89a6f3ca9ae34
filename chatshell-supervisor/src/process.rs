use std::{
    io::{self, BufRead, BufReader, Read},
    path::{Path, PathBuf},
    process::{Child, Command, ExitStatus, Stdio},
};

use thiserror::Error;
use tracing::{debug, info, warn};

pub const DEFAULT_CONFIG_PATH: &str = "assets/client_chat.cfg";

#[cfg(target_os = "windows")]
pub const CLIENT_BINARY_NAME: &str = "client.exe";
#[cfg(not(target_os = "windows"))]
pub const CLIENT_BINARY_NAME: &str = "client";

#[cfg(target_os = "windows")]
const CREATE_NO_WINDOW: u32 = 0x0800_0000;

#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("client binary not found: {}", path.display())]
    NotFound { path: PathBuf },
    #[error("failed to start {}: {source}", path.display())]
    Spawn { path: PathBuf, source: io::Error },
    #[error("failed to create output pipe: {0}")]
    Pipe(#[source] io::Error),
    #[error("client output is no longer available")]
    OutputUnavailable,
    #[error("failed to start output reader: {0}")]
    Reader(#[source] io::Error),
}

/// `./client` (or `./client.exe`), resolved against the working directory.
pub fn default_client_binary() -> PathBuf {
    Path::new(".").join(CLIENT_BINARY_NAME)
}

/// Start `<executable> <config>` with stderr merged into stdout.
pub fn start(executable: &Path, config: &Path) -> Result<ProcessHandle, LaunchError> {
    // A bare file name would otherwise be looked up on PATH.
    let program = if executable.is_relative() && executable.parent() == Some(Path::new("")) {
        Path::new(".").join(executable)
    } else {
        executable.to_path_buf()
    };

    if !program.exists() {
        return Err(LaunchError::NotFound { path: program });
    }

    let (reader, writer) = io::pipe().map_err(LaunchError::Pipe)?;
    let writer_err = writer.try_clone().map_err(LaunchError::Pipe)?;

    let mut command = Command::new(&program);
    command
        .arg(config)
        .stdin(Stdio::null())
        .stdout(writer)
        .stderr(writer_err);

    #[cfg(target_os = "windows")]
    {
        use std::os::windows::process::CommandExt;
        command.creation_flags(CREATE_NO_WINDOW);
    }

    let child = command.spawn().map_err(|source| {
        if source.kind() == io::ErrorKind::NotFound {
            LaunchError::NotFound {
                path: program.clone(),
            }
        } else {
            LaunchError::Spawn {
                path: program.clone(),
                source,
            }
        }
    })?;
    // The command still owns our copies of the write end; the reader only
    // sees EOF once they are gone.
    drop(command);

    info!(
        pid = child.id(),
        executable = %program.display(),
        config = %config.display(),
        "client process started"
    );

    Ok(ProcessHandle {
        child,
        output: Some(OutputLines::from_reader(reader)),
        executable: program,
        terminated: false,
        exit_status: None,
    })
}

/// Owns a running client process. Dropping the handle kills the process.
#[derive(Debug)]
pub struct ProcessHandle {
    child: Child,
    output: Option<OutputLines>,
    executable: PathBuf,
    terminated: bool,
    exit_status: Option<ExitStatus>,
}

impl ProcessHandle {
    pub fn pid(&self) -> u32 {
        self.child.id()
    }

    pub fn executable(&self) -> &Path {
        &self.executable
    }

    /// The merged output stream. Available once; later calls return `None`.
    pub fn take_output(&mut self) -> Option<OutputLines> {
        self.output.take()
    }

    pub fn try_exit_status(&mut self) -> Option<ExitStatus> {
        match self.child.try_wait() {
            Ok(status) => status,
            Err(err) => {
                warn!(pid = self.child.id(), "try_wait failed: {}", err);
                None
            }
        }
    }

    /// Kill and reap the process.
    ///
    /// Returns `true` for the call that sent the signal and `false` for every
    /// later call. The signal is sent even if the process has already exited.
    pub fn terminate(&mut self) -> bool {
        if self.terminated {
            return false;
        }
        self.terminated = true;

        let pid = self.child.id();
        match self.child.kill() {
            Ok(()) => info!(pid, "client process terminated"),
            Err(err) => debug!(pid, "kill after exit: {}", err),
        }
        match self.child.wait() {
            Ok(status) => {
                debug!(pid, %status, "client process reaped");
                self.exit_status = Some(status);
            }
            Err(err) => warn!(pid, "wait after kill failed: {}", err),
        }
        true
    }

    /// Status collected by [`ProcessHandle::terminate`]; `None` before it runs.
    pub fn exit_status(&self) -> Option<ExitStatus> {
        self.exit_status
    }

    pub fn is_terminated(&self) -> bool {
        self.terminated
    }
}

impl Drop for ProcessHandle {
    fn drop(&mut self) {
        self.terminate();
    }
}

/// Blocking iterator over output lines. Ends when the stream closes or a read
/// fails; line endings are stripped and invalid UTF-8 is replaced.
pub struct OutputLines {
    reader: BufReader<Box<dyn Read + Send>>,
    buf: Vec<u8>,
    done: bool,
}

impl OutputLines {
    pub fn from_reader<R: Read + Send + 'static>(reader: R) -> Self {
        Self {
            reader: BufReader::new(Box::new(reader)),
            buf: Vec::with_capacity(256),
            done: false,
        }
    }
}

impl std::fmt::Debug for OutputLines {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OutputLines")
            .field("done", &self.done)
            .finish_non_exhaustive()
    }
}

impl Iterator for OutputLines {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        if self.done {
            return None;
        }

        self.buf.clear();
        loop {
            match self.reader.read_until(b'\n', &mut self.buf) {
                Ok(0) => {
                    self.done = true;
                    return None;
                }
                Ok(_) => break,
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(err) => {
                    warn!("client output read failed: {}", err);
                    self.done = true;
                    return None;
                }
            }
        }

        while matches!(self.buf.last(), Some(b'\n' | b'\r')) {
            self.buf.pop();
        }
        Some(String::from_utf8_lossy(&self.buf).into_owned())
    }
}

impl std::iter::FusedIterator for OutputLines {}
