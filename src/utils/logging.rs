use std::fs::OpenOptions;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Plain-text transcript of a chat session, appended exchange by exchange.
pub struct TranscriptLog {
    file_path: PathBuf,
}

impl TranscriptLog {
    /// Open a transcript at `path`, checking up front that it is writable.
    pub fn new(path: impl Into<PathBuf>) -> Result<Self, std::io::Error> {
        let log = TranscriptLog {
            file_path: path.into(),
        };
        log.test_file_access()?;
        Ok(log)
    }

    pub fn path(&self) -> &Path {
        &self.file_path
    }

    pub fn log_user_message(&self, user: &str, content: &str) -> Result<(), std::io::Error> {
        self.log_message(&format!("{user}: {content}"))
    }

    pub fn log_message(&self, content: &str) -> Result<(), std::io::Error> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.file_path)?;

        let mut writer = BufWriter::with_capacity(64 * 1024, file);

        for line in content.lines() {
            writeln!(writer, "{line}")?;
        }

        // Blank line between messages, matching the screen output.
        writeln!(writer)?;

        writer.flush()?;
        Ok(())
    }

    fn test_file_access(&self) -> Result<(), std::io::Error> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.file_path)?;

        file.flush()?;
        Ok(())
    }
}
