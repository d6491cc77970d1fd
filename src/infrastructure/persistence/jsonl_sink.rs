use crate::domain::ports::VerdictSink;
use crate::domain::verdict::Verdict;
use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Mutex;
use tracing::error;

/// Writes one JSON verdict per line.
pub struct JsonlVerdictSink {
    writer: Mutex<BufWriter<Box<dyn Write + Send>>>,
}

// Manual Debug implementation for JsonlVerdictSink
impl std::fmt::Debug for JsonlVerdictSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonlVerdictSink")
            .field("writer", &"<Mutex>")
            .finish()
    }
}

impl JsonlVerdictSink {
    pub fn new(writer: Box<dyn Write + Send>) -> Self {
        Self {
            writer: Mutex::new(BufWriter::new(writer)),
        }
    }

    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file =
            File::create(path).with_context(|| format!("Creating output {}", path.display()))?;
        Ok(Self::new(Box::new(file)))
    }

    pub fn stdout() -> Self {
        Self::new(Box::new(std::io::stdout()))
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BufWriter<Box<dyn Write + Send>>> {
        match self.writer.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                error!("JsonlVerdictSink: writer lock poisoned, recovering");
                poisoned.into_inner()
            }
        }
    }
}

impl VerdictSink for JsonlVerdictSink {
    fn write(&self, verdict: &Verdict) -> Result<()> {
        let line = serde_json::to_string(verdict).context("Serializing verdict")?;
        let mut writer = self.lock();
        writer.write_all(line.as_bytes())?;
        writer.write_all(b"\n")?;
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        self.lock().flush().context("Flushing verdict output")
    }
}
