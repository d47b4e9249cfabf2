//! In-memory access to a zip-based document container (`.docx`).
//!
//! The whole archive is read up front. Parts can be inspected and replaced,
//! and the container can be written back out with every part in its original
//! order.

use std::borrow::Cow;
use std::io::{Cursor, Read, Write};
use zip::result::ZipResult;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// Path of the main body part of a wordprocessing document.
pub const MAIN_PART: &str = "word/document.xml";

#[derive(Debug, Clone)]
struct Part {
    name: String,
    data: Vec<u8>,
    is_dir: bool,
}

/// A document container held fully in memory.
#[derive(Debug, Clone)]
pub struct Container {
    parts: Vec<Part>,
}

impl Container {
    /// Reads every entry of the archive in `bytes`.
    pub fn open(bytes: &[u8]) -> ZipResult<Self> {
        let mut archive = ZipArchive::new(Cursor::new(bytes))?;
        let mut parts = Vec::with_capacity(archive.len());
        for i in 0..archive.len() {
            let mut file = archive.by_index(i)?;
            let mut data = Vec::new();
            if !file.is_dir() {
                file.read_to_end(&mut data)?;
            }
            parts.push(Part {
                name: file.name().to_string(),
                data,
                is_dir: file.is_dir(),
            });
        }
        Ok(Self { parts })
    }

    pub fn has_part(&self, name: &str) -> bool {
        self.parts.iter().any(|p| !p.is_dir && p.name == name)
    }

    /// Text of a part, decoded lossily as UTF-8.
    pub fn text_part(&self, name: &str) -> Option<Cow<'_, str>> {
        self.parts
            .iter()
            .find(|p| !p.is_dir && p.name == name)
            .map(|p| String::from_utf8_lossy(&p.data))
    }

    /// Names of all `.xml` parts, in archive order.
    pub fn xml_part_names(&self) -> impl Iterator<Item = &str> {
        self.parts
            .iter()
            .filter(|p| !p.is_dir && p.name.ends_with(".xml"))
            .map(|p| p.name.as_str())
    }

    /// Replaces the content of an existing part. Returns `false` if there is no such part.
    pub fn replace_part(&mut self, name: &str, data: Vec<u8>) -> bool {
        match self.parts.iter_mut().find(|p| !p.is_dir && p.name == name) {
            Some(part) => {
                part.data = data;
                true
            }
            None => false,
        }
    }

    /// Serializes the container back into zip bytes.
    pub fn to_bytes(&self) -> ZipResult<Vec<u8>> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options: FileOptions<'_, ()> =
            FileOptions::default().compression_method(CompressionMethod::Deflated);
        for part in &self.parts {
            if part.is_dir {
                writer.add_directory(part.name.as_str(), options)?;
            } else {
                writer.start_file(part.name.as_str(), options)?;
                writer.write_all(&part.data)?;
            }
        }
        Ok(writer.finish()?.into_inner())
    }
}
