//! Scoped unpacking of zip-based documents.
//!
//! A [`Workspace`] owns a uniquely named directory under the configured
//! temp files location. Only the parts a handler asks for are written to it,
//! and the directory is removed when the workspace is dropped unless the
//! caller asked to preserve it.

use std::fs;
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};

use chrono::Local;
use regex::Regex;
use tempfile::TempDir;
use zip::ZipArchive;

use crate::detect::Format;
use crate::error::{Error, Result};

use super::options::ParseConfig;

/// An unpacked document container.
#[derive(Debug)]
pub struct Workspace {
    format: Format,
    root: PathBuf,
    /// `None` once the directory has been handed over to the caller.
    guard: Option<TempDir>,
    parts: Vec<String>,
}

impl Workspace {
    /// Unpack every entry of `data` whose name matches `pattern`.
    ///
    /// # Errors
    /// * `LocationNotFound` if the temp files location is unusable
    /// * `FileCorrupted` if the archive or one of its entries cannot be read
    pub fn unpack(
        data: &[u8],
        format: Format,
        pattern: &Regex,
        config: &ParseConfig,
    ) -> Result<Self> {
        let location = prepare_location(config)?;

        let mut archive = ZipArchive::new(Cursor::new(data))
            .map_err(|e| Error::corrupted(format, format!("cannot open archive: {}", e)))?;

        let prefix = format!("{}-", Local::now().format("%Y%m%d%H%M%S"));
        let dir = tempfile::Builder::new()
            .prefix(&prefix)
            .tempdir_in(&location)
            .map_err(|e| Error::LocationNotFound {
                location: location.clone(),
                message: e.to_string(),
            })?;

        let (root, guard) = if config.preserve_temp_files {
            let root = dir.keep();
            (root, None)
        } else {
            (dir.path().to_path_buf(), Some(dir))
        };
        log::debug!("Unpacking {} into {}", format, root.display());

        // From here on, dropping the workspace removes the directory.
        let mut workspace = Self {
            format,
            root,
            guard,
            parts: Vec::new(),
        };
        workspace.extract(&mut archive, pattern)?;
        Ok(workspace)
    }

    fn extract(&mut self, archive: &mut ZipArchive<Cursor<&[u8]>>, pattern: &Regex) -> Result<()> {
        for index in 0..archive.len() {
            let mut entry = archive.by_index(index).map_err(|e| {
                Error::corrupted(self.format, format!("cannot read entry #{}: {}", index, e))
            })?;
            let name = entry.name().to_string();

            let relative = entry.enclosed_name().ok_or_else(|| {
                Error::corrupted(self.format, format!("entry {:?} has an unsafe path", name))
            })?;
            if entry.is_dir() || !pattern.is_match(&name) {
                continue;
            }

            let mut content = Vec::with_capacity(entry.size() as usize);
            entry
                .read_to_end(&mut content)
                .map_err(|e| Error::corrupted(self.format, format!("cannot inflate {}: {}", name, e)))?;

            let target = self.root.join(relative);
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent).map_err(|e| self.location_error(e))?;
            }
            fs::write(&target, &content).map_err(|e| self.location_error(e))?;

            self.parts.push(name);
        }

        log::debug!("Extracted {} part(s) from {}", self.parts.len(), self.format);
        Ok(())
    }

    fn location_error(&self, err: std::io::Error) -> Error {
        Error::LocationNotFound {
            location: self.root.clone(),
            message: err.to_string(),
        }
    }

    /// Format of the unpacked document.
    pub fn format(&self) -> Format {
        self.format
    }

    /// Directory holding the unpacked parts.
    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Names of the extracted parts, in archive order.
    pub fn parts(&self) -> &[String] {
        &self.parts
    }

    /// Check if a part was extracted.
    pub fn contains(&self, name: &str) -> bool {
        self.parts.iter().any(|p| p == name)
    }

    /// Check if the directory outlives this workspace.
    pub fn is_preserved(&self) -> bool {
        self.guard.is_none()
    }

    /// Parts matching `pattern`, ordered by the number its first capture
    /// group holds (`slide2.xml` before `slide10.xml`).
    pub fn numbered_parts(&self, pattern: &Regex) -> Vec<(u32, String)> {
        let mut numbered: Vec<(u32, String)> = self
            .parts
            .iter()
            .filter_map(|name| {
                let caps = pattern.captures(name)?;
                let number = caps.get(1)?.as_str().parse().ok()?;
                Some((number, name.clone()))
            })
            .collect();
        numbered.sort();
        numbered
    }

    /// Read a required part.
    ///
    /// # Errors
    /// `FileCorrupted` if the document does not contain the part.
    pub fn read(&self, name: &str) -> Result<Vec<u8>> {
        self.read_optional(name)?
            .ok_or_else(|| Error::corrupted(self.format, format!("missing part {}", name)))
    }

    /// Read a part that the document may legitimately lack.
    pub fn read_optional(&self, name: &str) -> Result<Option<Vec<u8>>> {
        if !self.contains(name) {
            return Ok(None);
        }
        fs::read(self.root.join(name))
            .map(Some)
            .map_err(|e| Error::corrupted(self.format, format!("cannot read {}: {}", name, e)))
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        if let Some(dir) = self.guard.take() {
            match dir.close() {
                Ok(()) => log::debug!("Removed workspace {}", self.root.display()),
                Err(e) => log::warn!(
                    "Failed to remove workspace {}: {}",
                    self.root.display(),
                    e
                ),
            }
        } else {
            log::info!("Preserved workspace {}", self.root.display());
        }
    }
}

/// Compile a part-name pattern.
pub fn part_pattern(expr: &str) -> Result<Regex> {
    Regex::new(expr)
        .map_err(|e| Error::ImproperArguments(format!("invalid part pattern {:?}: {}", expr, e)))
}

/// Resolve the temp files location, creating the default one on demand.
fn prepare_location(config: &ParseConfig) -> Result<PathBuf> {
    let location = config.temp_files_location.clone();
    let not_found = |message: String| Error::LocationNotFound {
        location: location.clone(),
        message,
    };

    if config.uses_default_location() {
        fs::create_dir_all(&location).map_err(|e| not_found(e.to_string()))?;
    }

    let metadata = fs::metadata(&location).map_err(|e| not_found(e.to_string()))?;
    if !metadata.is_dir() {
        return Err(not_found("not a directory".to_string()));
    }
    if metadata.permissions().readonly() {
        return Err(not_found("directory is read-only".to_string()));
    }

    Ok(location)
}
