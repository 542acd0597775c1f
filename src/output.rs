use anyhow::Context;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

pub const CALENDAR_MIME: &str = "text/calendar";
pub const DEFAULT_FILE_NAME: &str = "smartgrind_timetable.ics";

pub trait CalendarSink {
    /// Écrit le calendrier sérialisé.
    fn write(&self, bytes: &[u8]) -> anyhow::Result<()>;
}

/// Fichier `.ics` écrit de manière atomique.
pub struct FileSink {
    path: PathBuf,
}

impl FileSink {
    pub fn open<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref().to_path_buf();
        if path.is_dir() {
            anyhow::bail!("{} is a directory", path.display());
        }
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CalendarSink for FileSink {
    fn write(&self, bytes: &[u8]) -> anyhow::Result<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
        let mut tmp = NamedTempFile::new_in(dir).with_context(|| "creating temp file")?;
        tmp.write_all(bytes)?;
        tmp.flush()?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path)
            .with_context(|| format!("atomic rename to {}", self.path.display()))?;
        Ok(())
    }
}

/// Sortie standard (`--out -`).
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutSink;

impl CalendarSink for StdoutSink {
    fn write(&self, bytes: &[u8]) -> anyhow::Result<()> {
        let mut out = std::io::stdout().lock();
        out.write_all(bytes)?;
        out.flush()?;
        Ok(())
    }
}
