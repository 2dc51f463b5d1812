use std::{
    fs,
    path::PathBuf,
    sync::Mutex,
    time::SystemTime,
};

use tracing::debug;

use crate::context::ConnectionContext;

/// Source of message-of-the-day lines, sent to a connection as `ico` output.
pub trait MotdProvider: Send + Sync {
    fn lines(&self, conn_context: &ConnectionContext) -> Vec<String>;
}

/// Serves the file's lines, re-reading it only when its modification time
/// changes so edits show up without a restart.
pub struct FileMotd {
    path: PathBuf,
    cache: Mutex<Option<(SystemTime, Vec<String>)>>,
}

impl FileMotd {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileMotd {
            path: path.into(),
            cache: Mutex::new(None),
        }
    }

    fn read(&self) -> std::io::Result<(SystemTime, Vec<String>)> {
        let modified = fs::metadata(&self.path)?.modified()?;
        let contents = fs::read_to_string(&self.path)?;
        Ok((modified, contents.lines().map(str::to_string).collect()))
    }
}

impl MotdProvider for FileMotd {
    fn lines(&self, _conn_context: &ConnectionContext) -> Vec<String> {
        let mut cache = match self.cache.lock() {
            Ok(c) => c,
            Err(poisoned) => poisoned.into_inner(),
        };

        let modified = fs::metadata(&self.path).and_then(|m| m.modified());
        if let (Ok(modified), Some((cached_at, lines))) = (&modified, cache.as_ref()) {
            if modified == cached_at {
                return lines.clone();
            }
        }

        match self.read() {
            Ok((modified, lines)) => {
                *cache = Some((modified, lines.clone()));
                lines
            }
            Err(e) => {
                debug!("No MOTD available at {}: {}", self.path.display(), e);
                *cache = None;
                vec![]
            }
        }
    }
}

pub struct StaticMotd(pub Vec<String>);

impl MotdProvider for StaticMotd {
    fn lines(&self, _conn_context: &ConnectionContext) -> Vec<String> {
        self.0.clone()
    }
}
