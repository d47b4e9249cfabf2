//! Packs the successful documents of a batch into a single zip download.

use crate::engine::error::ArchiveError;
use crate::engine::renderer::RenderedDocument;
use chrono::NaiveDate;
use std::collections::HashSet;
use std::io::{Cursor, Write};
use std::path::Path;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

/// `generated_documents_YYYY-MM-DD.zip`
pub fn archive_name(date: NaiveDate) -> String {
    format!("generated_documents_{}.zip", date.format("%Y-%m-%d"))
}

/// Writes every document into one zip, in the order given.
///
/// Two rows that resolve to the same file name are kept apart as
/// `name.docx`, `name (2).docx`, `name (3).docx`, ...
pub fn pack<'a>(
    documents: impl IntoIterator<Item = &'a RenderedDocument>,
) -> Result<Vec<u8>, ArchiveError> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options: FileOptions<'_, ()> =
        FileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut used = HashSet::new();

    for document in documents {
        let name = unique_name(&document.filename, &mut used);
        writer.start_file(name, options)?;
        writer.write_all(&document.bytes)?;
    }
    Ok(writer.finish()?.into_inner())
}

fn unique_name(filename: &str, used: &mut HashSet<String>) -> String {
    if used.insert(filename.to_string()) {
        return filename.to_string();
    }
    let path = Path::new(filename);
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(filename);
    let extension = path.extension().and_then(|s| s.to_str());
    let mut n = 2;
    loop {
        let candidate = match extension {
            Some(ext) => format!("{} ({}).{}", stem, n, ext),
            None => format!("{} ({})", stem, n),
        };
        if used.insert(candidate.clone()) {
            return candidate;
        }
        n += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use zip::ZipArchive;

    fn doc(row_index: usize, filename: &str, bytes: &[u8]) -> RenderedDocument {
        RenderedDocument {
            row_index,
            template_id: "t".into(),
            filename: filename.into(),
            bytes: bytes.to_vec(),
        }
    }

    #[test]
    fn duplicate_names_are_numbered() {
        let docs = vec![
            doc(0, "An_2024-01-05.docx", b"one"),
            doc(1, "An_2024-01-05.docx", b"two"),
            doc(2, "An_2024-01-05.docx", b"three"),
        ];
        let bytes = pack(&docs).unwrap();
        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        let names: Vec<String> = archive.file_names().map(str::to_string).collect();
        assert_eq!(names.len(), 3);
        assert!(names.contains(&"An_2024-01-05 (2).docx".to_string()));
        assert!(names.contains(&"An_2024-01-05 (3).docx".to_string()));

        let mut content = String::new();
        archive
            .by_name("An_2024-01-05 (2).docx")
            .unwrap()
            .read_to_string(&mut content)
            .unwrap();
        assert_eq!(content, "two");
    }

    #[test]
    fn archive_is_named_after_the_date() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
        assert_eq!(archive_name(date), "generated_documents_2024-01-05.zip");
    }

    #[test]
    fn empty_batch_gives_a_valid_empty_archive() {
        let bytes = pack(&Vec::<RenderedDocument>::new()).unwrap();
        assert_eq!(ZipArchive::new(Cursor::new(bytes)).unwrap().len(), 0);
    }
}
