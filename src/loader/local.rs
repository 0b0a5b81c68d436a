use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::PathBuf;

use super::{LoadError, SnapshotLoader};

/// Reads extracts from a directory on local disk
pub struct LocalLoader {
    root: PathBuf,
}

impl LocalLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl SnapshotLoader for LocalLoader {
    fn describe(&self) -> String {
        format!("local:{}", self.root.display())
    }

    async fn fetch(&self, source_id: &str) -> Result<Vec<u8>, LoadError> {
        let path = self.root.join(source_id);

        tokio::fs::read(&path).await.map_err(|e| {
            let reason = match e.kind() {
                ErrorKind::NotFound => format!("{} does not exist", path.display()),
                _ => format!("cannot read {}: {}", path.display(), e),
            };
            LoadError::unavailable(source_id, reason)
        })
    }
}
