//! HWPX package container.
//!
//! An HWPX document is a ZIP package: a `mimetype` entry identifying the
//! format, `Contents/section{n}.xml` documents for the body, and
//! assorted metadata parts. Form filling only ever touches section XML,
//! so the package keeps every entry as raw bytes in archive order and
//! writes them back untouched. Round-tripping a package leaves unedited
//! entries byte for byte identical.

use std::fs::File;
use std::io::{Cursor, Read, Seek, Write};
use std::path::Path;

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::common::{Error, Result};

/// Expected `mimetype` entry content for HWPX packages.
pub const HWPX_MIMETYPE: &str = "application/hwp+zip";

const MIMETYPE_ENTRY: &str = "mimetype";

/// An HWPX package held fully in memory, entries in archive order.
#[derive(Debug, Clone)]
pub struct Package {
    entries: Vec<(String, Vec<u8>)>,
}

impl Package {
    /// Opens a package file from disk.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_reader(File::open(path)?)
    }

    /// Opens a package from an in-memory buffer.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        Self::from_reader(Cursor::new(data))
    }

    /// Reads every entry of the archive into memory, preserving order.
    /// Directory entries are dropped; the file entries imply them.
    pub fn from_reader<R: Read + Seek>(reader: R) -> Result<Self> {
        let mut archive = ZipArchive::new(reader)?;
        let mut entries = Vec::with_capacity(archive.len());
        for index in 0..archive.len() {
            let mut entry = archive.by_index(index)?;
            if entry.is_dir() {
                continue;
            }
            let name = entry.name().to_string();
            let mut data = Vec::with_capacity(entry.size() as usize);
            entry.read_to_end(&mut data)?;
            entries.push((name, data));
        }
        Ok(Self { entries })
    }

    /// Declared media type, if the package carries one.
    pub fn mimetype(&self) -> Option<&str> {
        self.entry(MIMETYPE_ENTRY)
            .and_then(|data| std::str::from_utf8(data).ok())
            .map(str::trim)
    }

    /// Whether the `mimetype` entry declares an HWPX document.
    ///
    /// Opening never enforces this; callers that only care about the
    /// section XML are free to skip the check.
    pub fn is_hwpx(&self) -> bool {
        self.mimetype() == Some(HWPX_MIMETYPE)
    }

    /// Raw bytes of the named entry.
    pub fn entry(&self, name: &str) -> Option<&[u8]> {
        self.entries
            .iter()
            .find(|(entry_name, _)| entry_name == name)
            .map(|(_, data)| data.as_slice())
    }

    /// Entry names in archive order.
    pub fn entry_names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    /// Replaces an entry's bytes in place, or appends a new entry at the
    /// end of the archive.
    pub fn set_entry(&mut self, name: &str, data: Vec<u8>) {
        if let Some(slot) = self
            .entries
            .iter_mut()
            .find(|(entry_name, _)| entry_name == name)
        {
            slot.1 = data;
        } else {
            self.entries.push((name.to_string(), data));
        }
    }

    /// UTF-8 text of the section document at `index`.
    pub fn section_xml(&self, index: usize) -> Result<String> {
        let name = section_entry_name(index);
        let Some(data) = self.entry(&name) else {
            return Err(Error::EntryNotFound(name));
        };
        String::from_utf8(data.to_vec())
            .map_err(|_| Error::InvalidFormat(format!("{name} is not valid UTF-8")))
    }

    /// Replaces the section document at `index`.
    pub fn set_section_xml(&mut self, index: usize, xml: impl Into<String>) {
        self.set_entry(&section_entry_name(index), xml.into().into_bytes());
    }

    /// Writes the package to a file on disk.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.write_to(File::create(path)?)
    }

    /// Serializes the package to bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut buffer = Cursor::new(Vec::new());
        self.write_to(&mut buffer)?;
        Ok(buffer.into_inner())
    }

    /// Writes all entries in order. The `mimetype` entry is stored
    /// uncompressed so format sniffers keep finding it in the first bytes
    /// of the file.
    pub fn write_to<W: Write + Seek>(&self, writer: W) -> Result<()> {
        let mut zip = ZipWriter::new(writer);
        let stored = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
        let deflated = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        for (name, data) in &self.entries {
            let options = if name == MIMETYPE_ENTRY { stored } else { deflated };
            zip.start_file(name.as_str(), options)?;
            zip.write_all(data)?;
        }
        zip.finish()?;
        Ok(())
    }
}

fn section_entry_name(index: usize) -> String {
    format!("Contents/section{index}.xml")
}
