//! Fixtures shared by the integration tests: in-memory `.docx` containers and
//! multipart bodies.
#![allow(dead_code)]

use std::io::{Cursor, Read, Write};
use zip::write::FileOptions;
use zip::{ZipArchive, ZipWriter};

pub const BOUNDARY: &str = "docmerge-test-boundary";

/// Builds a minimal wordprocessing container part by part.
pub struct DocxBuilder {
    parts: Vec<(String, String)>,
}

impl DocxBuilder {
    pub fn new() -> Self {
        Self {
            parts: vec![(
                "[Content_Types].xml".to_string(),
                r#"<?xml version="1.0"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"/>"#
                    .to_string(),
            )],
        }
    }

    /// Main body made of one paragraph per entry; each entry is a list of runs.
    pub fn body(self, paragraphs: &[&[&str]]) -> Self {
        self.part("word/document.xml", &document(paragraphs))
    }

    pub fn header(self, text: &str) -> Self {
        self.part(
            "word/header1.xml",
            &format!(
                "<w:hdr>{}</w:hdr>",
                paragraph(&[text])
            ),
        )
    }

    pub fn part(mut self, name: &str, content: &str) -> Self {
        self.parts.push((name.to_string(), content.to_string()));
        self
    }

    pub fn build(self) -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options: FileOptions<'_, ()> = FileOptions::default();
        for (name, content) in self.parts {
            writer.start_file(name, options).unwrap();
            writer.write_all(content.as_bytes()).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }
}

/// A `.docx` whose body is one paragraph with `text` in a single run.
pub fn simple_docx(text: &str) -> Vec<u8> {
    DocxBuilder::new().body(&[&[text]]).build()
}

pub fn paragraph(runs: &[&str]) -> String {
    let runs: String = runs
        .iter()
        .map(|text| format!("<w:r><w:rPr><w:b/></w:rPr><w:t>{}</w:t></w:r>", text))
        .collect();
    format!("<w:p>{}</w:p>", runs)
}

pub fn document(paragraphs: &[&[&str]]) -> String {
    let body: String = paragraphs.iter().map(|runs| paragraph(runs)).collect();
    format!(
        r#"<?xml version="1.0"?><w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{}</w:body></w:document>"#,
        body
    )
}

/// Raw content of one part of a container.
pub fn read_part(docx: &[u8], name: &str) -> String {
    let mut archive = ZipArchive::new(Cursor::new(docx)).unwrap();
    let mut content = String::new();
    archive
        .by_name(name)
        .unwrap()
        .read_to_string(&mut content)
        .unwrap();
    content
}

/// Concatenated `<w:t>` text of one part, with paragraphs separated by `\n`.
pub fn visible_text(docx: &[u8], name: &str) -> String {
    let xml = read_part(docx, name);
    let text_re = regex::Regex::new(r"(?s)<w:t(?:\s(?:[^>]*[^/>])?)?>(.*?)</w:t>|</w:p>").unwrap();
    let mut text = String::new();
    for caps in text_re.captures_iter(&xml) {
        match caps.get(1) {
            Some(run) => text.push_str(run.as_str()),
            None => text.push('\n'),
        }
    }
    text.trim_end_matches('\n').to_string()
}

/// A `multipart/form-data` body with one `file` part per entry.
/// Returns the content type header value and the body.
pub fn multipart(files: &[(&str, &[u8])]) -> (String, Vec<u8>) {
    let mut body = Vec::new();
    for (file_name, bytes) in files {
        write!(
            body,
            "--{}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{}\"\r\nContent-Type: application/octet-stream\r\n\r\n",
            BOUNDARY, file_name
        )
        .unwrap();
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    write!(body, "--{}--\r\n", BOUNDARY).unwrap();
    (format!("multipart/form-data; boundary={}", BOUNDARY), body)
}
