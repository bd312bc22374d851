// src/lines/mod.rs

use anyhow::{anyhow, Context, Result};
use std::{
    collections::HashMap,
    fs::{self, File, OpenOptions},
    io::{BufRead, BufReader, BufWriter, Write},
    path::{Path, PathBuf},
    sync::RwLock,
};
use tempfile::NamedTempFile;
use tracing::debug;

/// Where a table's text lives: something that hands back a resource as
/// lines and persists lines.
pub trait LineStore {
    /// Full content of `path`, one entry per line, terminators removed.
    fn read_lines(&self, path: &Path) -> Result<Vec<String>>;

    /// Replace `path` with `lines`, creating parent directories.
    fn write_lines(&self, path: &Path, lines: &[String]) -> Result<()>;

    /// Add `lines` to the end of `path`, creating it if needed.
    fn append_lines(&self, path: &Path, lines: &[String]) -> Result<()>;
}

/// Plain files on the local file system.
#[derive(Debug, Default, Clone, Copy)]
pub struct DiskLines;

impl DiskLines {
    fn ensure_parent(path: &Path) -> Result<()> {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).with_context(|| format!("creating directory {:?}", dir))?;
        }
        Ok(())
    }
}

impl LineStore for DiskLines {
    fn read_lines(&self, path: &Path) -> Result<Vec<String>> {
        let file = File::open(path).with_context(|| format!("opening {:?}", path))?;
        let mut lines = BufReader::new(file)
            .lines()
            .collect::<std::io::Result<Vec<String>>>()
            .with_context(|| format!("reading lines from {:?}", path))?;
        // files saved by .NET or Excel often start with a UTF-8 BOM
        if let Some(first) = lines.first_mut() {
            if first.starts_with('\u{feff}') {
                first.remove(0);
            }
        }
        debug!(path = %path.display(), lines = lines.len(), "read lines");
        Ok(lines)
    }

    fn write_lines(&self, path: &Path, lines: &[String]) -> Result<()> {
        Self::ensure_parent(path)?;

        // write next to the target, then rename over it
        let dir = match path.parent() {
            Some(d) if !d.as_os_str().is_empty() => d,
            _ => Path::new("."),
        };
        let tmp = NamedTempFile::new_in(dir)
            .with_context(|| format!("creating temp file in {:?}", dir))?;
        {
            let mut out = BufWriter::new(tmp.as_file());
            for line in lines {
                writeln!(out, "{}", line).with_context(|| format!("writing {:?}", path))?;
            }
            out.flush().with_context(|| format!("flushing {:?}", path))?;
        }
        tmp.persist(path)
            .with_context(|| format!("renaming temp file over {:?}", path))?;

        debug!(path = %path.display(), lines = lines.len(), "wrote lines");
        Ok(())
    }

    fn append_lines(&self, path: &Path, lines: &[String]) -> Result<()> {
        Self::ensure_parent(path)?;
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("opening {:?} for append", path))?;
        let mut out = BufWriter::new(file);
        for line in lines {
            writeln!(out, "{}", line).with_context(|| format!("appending to {:?}", path))?;
        }
        out.flush().with_context(|| format!("flushing {:?}", path))?;
        Ok(())
    }
}

/// Thread-safe in-memory store keyed by path. Useful for embedding and tests.
#[derive(Debug, Default)]
pub struct MemoryLines {
    files: RwLock<HashMap<PathBuf, Vec<String>>>,
}

impl MemoryLines {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed `path` with content.
    pub fn insert<P, I, S>(&self, path: P, lines: I) -> Result<()>
    where
        P: Into<PathBuf>,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut files = self
            .files
            .write()
            .map_err(|_| anyhow!("memory line store lock poisoned"))?;
        files.insert(path.into(), lines.into_iter().map(Into::into).collect());
        Ok(())
    }
}

impl LineStore for MemoryLines {
    fn read_lines(&self, path: &Path) -> Result<Vec<String>> {
        let files = self
            .files
            .read()
            .map_err(|_| anyhow!("memory line store lock poisoned"))?;
        files
            .get(path)
            .cloned()
            .ok_or_else(|| anyhow!("no such resource {:?}", path))
    }

    fn write_lines(&self, path: &Path, lines: &[String]) -> Result<()> {
        let mut files = self
            .files
            .write()
            .map_err(|_| anyhow!("memory line store lock poisoned"))?;
        files.insert(path.to_path_buf(), lines.to_vec());
        Ok(())
    }

    fn append_lines(&self, path: &Path, lines: &[String]) -> Result<()> {
        let mut files = self
            .files
            .write()
            .map_err(|_| anyhow!("memory line store lock poisoned"))?;
        files
            .entry(path.to_path_buf())
            .or_default()
            .extend_from_slice(lines);
        Ok(())
    }
}
