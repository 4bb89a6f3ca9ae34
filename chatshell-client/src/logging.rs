use std::{
    ffi::OsString,
    fs::{self, File, OpenOptions},
    io,
    path::{Path, PathBuf},
    sync::Mutex,
};

pub const DATA_DIR_ENV: &str = "CHATSHELL_DATA_DIR";
pub const APP_DIR_NAME: &str = "ChatShell";
pub const LOG_FILE_NAME: &str = "chatshell-client.log";

/// Pick the data directory: a non-empty override, then the platform's local
/// data directory, then the system temp directory. Never the working
/// directory.
pub fn resolve_data_dir(override_dir: Option<OsString>, platform_dir: Option<PathBuf>) -> PathBuf {
    if let Some(dir) = override_dir.filter(|dir| !dir.is_empty()) {
        return PathBuf::from(dir);
    }
    match platform_dir {
        Some(base) => base.join(APP_DIR_NAME),
        None => std::env::temp_dir().join(APP_DIR_NAME),
    }
}

/// `$CHATSHELL_DATA_DIR`, else e.g. `%LOCALAPPDATA%\ChatShell` or
/// `~/.local/share/ChatShell`.
pub fn data_dir() -> PathBuf {
    resolve_data_dir(std::env::var_os(DATA_DIR_ENV), dirs::data_local_dir())
}

pub fn log_file_path(data_dir: &Path) -> PathBuf {
    data_dir.join("logs").join(LOG_FILE_NAME)
}

fn open_log_file(path: &Path) -> io::Result<File> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}

/// Log to the client log file, falling back to stderr if it cannot be opened.
/// Returns the log file path.
pub fn init_logging() -> PathBuf {
    let env_filter = tracing_subscriber::EnvFilter::from_default_env();

    let log_path = log_file_path(&data_dir());
    let file = match open_log_file(&log_path) {
        Ok(file) => file,
        Err(err) => {
            eprintln!("failed to open log file {}: {err}", log_path.display());
            tracing_subscriber::fmt().with_env_filter(env_filter).init();
            return log_path;
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    log_path
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn override_wins_over_platform_dir() {
        let dir = resolve_data_dir(
            Some(OsString::from("/srv/chatshell")),
            Some(PathBuf::from("/home/u/.local/share")),
        );
        assert_eq!(dir, PathBuf::from("/srv/chatshell"));
    }

    #[test]
    fn empty_override_is_ignored() {
        let dir = resolve_data_dir(
            Some(OsString::new()),
            Some(PathBuf::from("/home/u/.local/share")),
        );
        assert_eq!(dir, PathBuf::from("/home/u/.local/share").join(APP_DIR_NAME));
    }

    #[test]
    fn missing_platform_dir_falls_back_to_temp_not_cwd() {
        let dir = resolve_data_dir(None, None);
        assert_eq!(dir, std::env::temp_dir().join(APP_DIR_NAME));
        assert!(dir.is_absolute(), "fallback must not be relative: {}", dir.display());
    }

    #[test]
    fn log_file_is_created_under_logs_and_appended() {
        let dir = tempfile::tempdir().expect("create tempdir");
        let path = log_file_path(dir.path());
        assert_eq!(path, dir.path().join("logs").join(LOG_FILE_NAME));

        open_log_file(&path)
            .expect("open log file")
            .write_all(b"first\n")
            .expect("write first");
        open_log_file(&path)
            .expect("reopen log file")
            .write_all(b"second\n")
            .expect("write second");

        let written = fs::read_to_string(&path).expect("read log file");
        assert_eq!(written, "first\nsecond\n");
    }
}
