//! Document text extraction, dispatched on file extension.

use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::errors::ScreenError;

pub const SUPPORTED_EXTENSIONS: [&str; 3] = ["pdf", "docx", "txt"];

static TEXT_RUN: LazyLock<Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(r"<w:t(?:\s[^>]*)?>([^<]*)</w:t>"));

/// Named and numeric (`&#8211;`, `&#x2019;`) XML character references.
static ENTITY: LazyLock<Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(r"&(?:#[xX]([0-9a-fA-F]+)|#([0-9]+)|([a-z]+));"));

/// Reads plain text out of a document on disk.
pub trait TextExtractor: Send + Sync {
    fn extract_text(&self, path: &Path) -> Result<String, ScreenError>;
}

/// The production extractor: PDF, DOCX or UTF-8 text.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileTextExtractor;

impl TextExtractor for FileTextExtractor {
    fn extract_text(&self, path: &Path) -> Result<String, ScreenError> {
        match extension_of(path).as_deref() {
            Some("pdf") => pdf_extract::extract_text(path)
                .map_err(|e| ScreenError::Document(format!("{}: {e}", path.display()))),
            Some("docx") => read_docx(path),
            Some("txt") => {
                let bytes = std::fs::read(path)?;
                Ok(String::from_utf8_lossy(&bytes).into_owned())
            }
            other => Err(ScreenError::UnsupportedFormat(
                other.map(|ext| format!(".{ext}")).unwrap_or_else(|| {
                    format!("{} has no file extension", path.display())
                }),
            )),
        }
    }
}

/// Lower-cased extension without the dot.
pub fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
}

pub fn is_supported(path: &Path) -> bool {
    extension_of(path).is_some_and(|ext| SUPPORTED_EXTENSIONS.contains(&ext.as_str()))
}

fn read_docx(path: &Path) -> Result<String, ScreenError> {
    let document_error = |e: zip::result::ZipError| {
        ScreenError::Document(format!("{}: {e}", path.display()))
    };

    let mut archive = zip::ZipArchive::new(File::open(path)?).map_err(document_error)?;
    let mut xml = String::new();
    archive
        .by_name("word/document.xml")
        .map_err(document_error)?
        .read_to_string(&mut xml)?;

    docx_xml_to_text(&xml)
}

/// Collects `<w:t>` runs, one output line per `</w:p>` paragraph.
fn docx_xml_to_text(xml: &str) -> Result<String, ScreenError> {
    let pattern_error = |e: &regex::Error| ScreenError::Document(e.to_string());
    let text_run = TEXT_RUN.as_ref().map_err(pattern_error)?;
    let entity = ENTITY.as_ref().map_err(pattern_error)?;

    let mut out = String::new();
    for paragraph in xml.split("</w:p>") {
        let line: String = text_run
            .captures_iter(paragraph)
            .filter_map(|c| c.get(1))
            .map(|m| unescape_xml(entity, m.as_str()))
            .collect();
        if !line.is_empty() {
            out.push_str(&line);
            out.push('\n');
        }
    }
    Ok(out)
}

/// Decodes character references in one pass; unknown or invalid ones stay as written.
fn unescape_xml(entity: &Regex, s: &str) -> String {
    entity
        .replace_all(s, |caps: &Captures| {
            let decoded = if let Some(hex) = caps.get(1) {
                u32::from_str_radix(hex.as_str(), 16)
                    .ok()
                    .and_then(char::from_u32)
            } else if let Some(dec) = caps.get(2) {
                dec.as_str().parse::<u32>().ok().and_then(char::from_u32)
            } else {
                match caps.get(3).map(|m| m.as_str()) {
                    Some("lt") => Some('<'),
                    Some("gt") => Some('>'),
                    Some("quot") => Some('"'),
                    Some("apos") => Some('\''),
                    Some("amp") => Some('&'),
                    _ => None,
                }
            };
            decoded.map_or_else(|| caps[0].to_string(), String::from)
        })
        .into_owned()
}
