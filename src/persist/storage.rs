use anyhow::{Context, Result};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::error;

/// Key-value store backed by one ron file per key.
#[derive(Debug, Clone)]
pub struct Storage {
    dir: PathBuf,
}

impl Storage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.ron"))
    }

    pub fn read(&self, key: &str) -> Result<Option<String>> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(content) => Ok(Some(content)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    /// Writes through a temporary file so a crash never leaves half a save.
    pub fn write(&self, key: &str, payload: &str) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("creating save directory {}", self.dir.display()))?;
        let path = self.path_for(key);
        let tmp = path.with_extension("ron.tmp");
        fs::write(&tmp, payload).with_context(|| format!("writing {}", tmp.display()))?;
        fs::rename(&tmp, &path).with_context(|| format!("replacing {}", path.display()))?;
        Ok(())
    }

    /// Writes every entry and hands back the ones that failed.
    pub fn write_batch(&self, batch: Vec<(String, String)>) -> Vec<(String, String)> {
        let mut failed = Vec::new();
        for (key, payload) in batch {
            if let Err(err) = self.write(&key, &payload) {
                error!(key = %key, "save failed: {err:#}");
                failed.push((key, payload));
            }
        }
        failed
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    static COUNTER: AtomicU32 = AtomicU32::new(0);

    pub(crate) fn scratch_storage(label: &str) -> Storage {
        let n = COUNTER.fetch_add(1, Ordering::Relaxed);
        let dir = std::env::temp_dir().join(format!(
            "spend-ten-billion-{label}-{}-{n}",
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&dir);
        Storage::new(dir)
    }

    #[test]
    fn missing_key_reads_as_none() {
        let storage = scratch_storage("missing");
        assert_eq!(storage.read("player").expect("read"), None);
    }

    #[test]
    fn write_then_read() {
        let storage = scratch_storage("write");
        storage.write("player", "(cash: 1)").expect("write");
        assert_eq!(
            storage.read("player").expect("read").as_deref(),
            Some("(cash: 1)")
        );
        assert!(!storage.dir().join("player.ron.tmp").exists());
        let _ = fs::remove_dir_all(storage.dir());
    }
}
