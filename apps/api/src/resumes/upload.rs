//! Resume file intake: format checks, storage keys, S3 upload and text extraction.

use std::io::{Cursor, Read};

use anyhow::{anyhow, Context, Result};
use aws_sdk_s3::primitives::ByteStream;
use quick_xml::events::Event;
use quick_xml::Reader;
use tracing::{info, warn};

use crate::errors::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResumeFormat {
    Pdf,
    Doc,
    Docx,
}

impl ResumeFormat {
    /// Format from the file extension, case-insensitive. `None` for anything else.
    pub fn from_filename(filename: &str) -> Option<Self> {
        let (_, ext) = filename.rsplit_once('.')?;
        match ext.to_ascii_lowercase().as_str() {
            "pdf" => Some(ResumeFormat::Pdf),
            "doc" => Some(ResumeFormat::Doc),
            "docx" => Some(ResumeFormat::Docx),
            _ => None,
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            ResumeFormat::Pdf => "application/pdf",
            ResumeFormat::Doc => "application/msword",
            ResumeFormat::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
        }
    }
}

/// Object key `resumes/{email}_{filename}` with path separators and control chars removed.
pub fn storage_key(candidate_email: &str, filename: &str) -> String {
    let clean = |s: &str| -> String {
        s.trim()
            .chars()
            .filter(|c| !matches!(c, '/' | '\\') && !c.is_control())
            .collect()
    };
    format!("resumes/{}_{}", clean(candidate_email), clean(filename))
}

pub async fn store_file(
    s3: &aws_sdk_s3::Client,
    bucket: &str,
    key: &str,
    format: ResumeFormat,
    bytes: Vec<u8>,
) -> Result<(), AppError> {
    s3.put_object()
        .bucket(bucket)
        .key(key)
        .body(ByteStream::from(bytes))
        .content_type(format.content_type())
        .send()
        .await
        .map_err(|e| AppError::Storage(format!("upload of {key} failed: {e}")))?;

    info!("Stored resume at s3://{bucket}/{key}");
    Ok(())
}

/// Best-effort plain text of a resume. Unsupported or unreadable files yield an empty string.
pub fn extract_text(format: ResumeFormat, bytes: &[u8]) -> String {
    let extracted = match format {
        ResumeFormat::Pdf => pdf_extract::extract_text_from_mem(bytes)
            .map_err(|e| anyhow!("PDF extraction failed: {e}")),
        ResumeFormat::Docx => extract_docx_text(bytes),
        ResumeFormat::Doc => Err(anyhow!("legacy .doc files are stored without text")),
    };

    match extracted {
        Ok(text) => normalize_whitespace(&text),
        Err(e) => {
            warn!("{e:#}");
            String::new()
        }
    }
}

/// Concatenates `w:t` runs from `word/document.xml`, one line per paragraph.
fn extract_docx_text(bytes: &[u8]) -> Result<String> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).context("DOCX is not a zip archive")?;

    let mut xml = String::new();
    archive
        .by_name("word/document.xml")
        .context("DOCX has no word/document.xml")?
        .read_to_string(&mut xml)?;

    let mut reader = Reader::from_str(&xml);
    reader.config_mut().trim_text(false);

    let mut content = String::new();
    let mut in_text = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) if e.name().as_ref() == b"w:t" => in_text = true,
            Ok(Event::Empty(ref e)) if e.name().as_ref() == b"w:tab" => content.push(' '),
            Ok(Event::Text(e)) if in_text => {
                let text = e
                    .unescape()
                    .map_err(|err| anyhow!("XML decode error: {err}"))?;
                content.push_str(&text);
            }
            Ok(Event::End(ref e)) => match e.name().as_ref() {
                b"w:t" => in_text = false,
                b"w:p" => content.push('\n'),
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(anyhow!("XML parsing error: {e}")),
            _ => {}
        }
    }

    Ok(content)
}

/// Collapses runs of spaces within lines and drops blank lines.
fn normalize_whitespace(text: &str) -> String {
    text.lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
