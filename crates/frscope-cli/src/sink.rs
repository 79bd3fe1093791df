//! Export sink that writes into a directory without overwriting.

use async_trait::async_trait;
use frscope::session::ExportSink;
use frscope::FrError;
use std::io::{ErrorKind, Write};
use std::path::PathBuf;
use tracing::info;

/// Upper bound on `name (n).ext` candidates tried before giving up.
const MAX_SUFFIX: u32 = 10_000;

pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Write `contents` to the first free name derived from `filename`.
    pub fn save_blocking(&self, filename: &str, contents: &[u8]) -> std::io::Result<PathBuf> {
        std::fs::create_dir_all(&self.dir)?;
        for n in 0..=MAX_SUFFIX {
            let path = self.dir.join(candidate_name(filename, n));
            match std::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
            {
                Ok(mut file) => {
                    file.write_all(contents)?;
                    return Ok(path);
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(e),
            }
        }
        Err(std::io::Error::new(
            ErrorKind::AlreadyExists,
            format!("no free name for {filename}"),
        ))
    }
}

/// `name.csv`, then `name (1).csv`, `name (2).csv`, ...
pub fn candidate_name(filename: &str, n: u32) -> String {
    if n == 0 {
        return filename.to_string();
    }
    match filename.rfind('.').filter(|&i| i > 0) {
        Some(dot) => format!("{} ({n}){}", &filename[..dot], &filename[dot..]),
        None => format!("{filename} ({n})"),
    }
}

#[async_trait]
impl ExportSink for DirectorySink {
    async fn save(&self, filename: &str, contents: &[u8]) -> frscope::Result<String> {
        let path = self
            .save_blocking(filename, contents)
            .map_err(|e| FrError::Sink(format!("{}: {e}", self.dir.display())))?;
        info!("saved {}", path.display());
        Ok(path.display().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidate_names() {
        assert_eq!(candidate_name("a_raw-fr.csv", 0), "a_raw-fr.csv");
        assert_eq!(candidate_name("a_raw-fr.csv", 2), "a_raw-fr (2).csv");
        assert_eq!(candidate_name("noext", 1), "noext (1)");
        assert_eq!(candidate_name(".hidden", 1), ".hidden (1)");
    }

    #[tokio::test]
    async fn test_save_uniquifies() {
        let dir = tempfile::tempdir().unwrap();
        let sink = DirectorySink::new(dir.path().join("out"));

        let first = sink.save("m_raw-fr.csv", b"one").await.unwrap();
        let second = sink.save("m_raw-fr.csv", b"two").await.unwrap();
        let third = sink.save("m_raw-fr.csv", b"three").await.unwrap();

        assert!(first.ends_with("m_raw-fr.csv"));
        assert!(second.ends_with("m_raw-fr (1).csv"));
        assert!(third.ends_with("m_raw-fr (2).csv"));
        assert_eq!(std::fs::read(&first).unwrap(), b"one");
        assert_eq!(std::fs::read(&second).unwrap(), b"two");
    }

    #[test]
    fn test_unwritable_dir_is_sink_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, b"x").unwrap();
        let sink = DirectorySink::new(blocker.join("sub"));
        assert!(matches!(
            tokio_test::block_on(sink.save("a.csv", b"")),
            Err(FrError::Sink(_))
        ));
    }
}
