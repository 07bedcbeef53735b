use std::fs;
use std::io;
use std::io::{IsTerminal, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::BUNDLED_DEFAULTS;

/// The config file shipped with the crate, ready to be copied into an
/// application.
pub fn default_config() -> &'static str {
    BUNDLED_DEFAULTS
}

#[derive(Debug, Error)]
pub enum PublishError {
    #[error("failed to write '{}'", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("overwrite prompt failed")]
    Prompt(#[from] inquire::InquireError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overwrite {
    Never,
    Always,
    /// Ask on the terminal, defaulting to no. Without a terminal the
    /// existing file is kept.
    Ask,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishOutcome {
    Written(PathBuf),
    Skipped(PathBuf),
}

/// Copies the bundled config to `target`.
///
/// The content goes to a temp file next to `target` first and is renamed
/// into place, so an interrupted publish never leaves a partial file.
pub fn publish(target: &Path, overwrite: Overwrite) -> Result<PublishOutcome, PublishError> {
    publish_contents(target, default_config(), overwrite)
}

pub(crate) fn publish_contents(
    target: &Path,
    contents: &str,
    overwrite: Overwrite,
) -> Result<PublishOutcome, PublishError> {
    if target.exists() && !confirm_overwrite(target, overwrite)? {
        tracing::info!(path = %target.display(), "config exists, not overwritten");
        return Ok(PublishOutcome::Skipped(target.to_path_buf()));
    }

    let io_err = |source: io::Error| PublishError::Io {
        path: target.to_path_buf(),
        source,
    };

    let dir = match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).map_err(io_err)?;

    let mut file = tempfile::NamedTempFile::new_in(dir).map_err(io_err)?;
    file.write_all(contents.as_bytes()).map_err(io_err)?;
    file.flush().map_err(io_err)?;
    file.persist(target).map_err(|e| io_err(e.error))?;

    tracing::info!(path = %target.display(), "config published");
    Ok(PublishOutcome::Written(target.to_path_buf()))
}

fn confirm_overwrite(path: &Path, overwrite: Overwrite) -> Result<bool, PublishError> {
    match overwrite {
        Overwrite::Never => Ok(false),
        Overwrite::Always => Ok(true),
        Overwrite::Ask if !io::stdin().is_terminal() => {
            tracing::debug!("stdin is not a terminal, not asking to overwrite");
            Ok(false)
        }
        Overwrite::Ask => {
            let ans = inquire::Confirm::new(&format!("{} already exists, overwrite?", path.display()))
                .with_default(false)
                .prompt();
            match ans {
                Ok(ans) => Ok(ans),
                Err(inquire::InquireError::NotTTY) => Ok(false),
                Err(e) => Err(e.into()),
            }
        }
    }
}
