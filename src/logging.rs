use std::path::{Path, PathBuf};

use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};

/// Environment variable holding the log level (`error` .. `trace`, or `off`).
pub const LEVEL_ENV: &str = "CMDLOOP_LOG";

/// ~/.local/share/cmdloop/shell.log, when HOME is set.
pub fn log_path() -> Option<PathBuf> {
    let home = std::env::var_os("HOME")?;
    Some(Path::new(&home).join(".local/share/cmdloop/shell.log"))
}

/// Level from `CMDLOOP_LOG`; `warn` when unset or unrecognised.
pub fn level_from_env() -> LevelFilter {
    std::env::var(LEVEL_ENV)
        .ok()
        .and_then(|v| parse_level(&v))
        .unwrap_or(LevelFilter::Warn)
}

fn parse_level(value: &str) -> Option<LevelFilter> {
    value.trim().parse().ok()
}

/// Install the file logger at ~/.local/share/cmdloop/shell.log.
/// Best-effort: any failure leaves logging disabled (logging must never block the shell).
pub fn init() {
    let Some(path) = log_path() else {
        return;
    };
    init_at(&path, level_from_env());
}

/// Install the file logger writing to `path`. Returns whether it was installed.
pub fn init_at(path: &Path, level: LevelFilter) -> bool {
    if level == LevelFilter::Off {
        return false;
    }
    if let Some(dir) = path.parent() {
        let _ = std::fs::create_dir_all(dir);
    }
    let Ok(file) = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
    else {
        return false;
    };

    let config = ConfigBuilder::new()
        .set_time_format_rfc3339()
        .set_target_level(LevelFilter::Off)
        .set_thread_level(LevelFilter::Off)
        .build();
    WriteLogger::init(level, config, file).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_known_levels() {
        assert_eq!(parse_level("debug"), Some(LevelFilter::Debug));
        assert_eq!(parse_level(" INFO "), Some(LevelFilter::Info));
        assert_eq!(parse_level("off"), Some(LevelFilter::Off));
    }

    #[test]
    fn parse_unknown_level() {
        assert_eq!(parse_level("loud"), None);
    }

    #[test]
    fn off_installs_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shell.log");
        assert!(!init_at(&path, LevelFilter::Off));
        assert!(!path.exists());
    }

    #[test]
    fn creates_log_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/shell.log");
        // Another test may already own the global logger; the file is opened regardless.
        let _ = init_at(&path, LevelFilter::Warn);
        assert!(path.exists());
    }
}
