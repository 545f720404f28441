use crate::error::TransactionLensError;
use log::debug;
use std::path::Path;

const UTF8_BOM: &str = "\u{feff}";

/// A file the user attached to a submission, held as raw bytes until the
/// client decodes it.
#[derive(Debug, Clone, PartialEq)]
pub struct Upload {
    pub name: String,
    pub content: Vec<u8>,
}

impl Upload {
    pub fn new(name: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Upload {
            name: name.into(),
            content: content.into(),
        }
    }

    /// Decodes the content as UTF-8 text, dropping a leading byte order mark.
    pub fn decode_text(&self) -> Result<String, TransactionLensError> {
        let text = std::str::from_utf8(&self.content).map_err(|e| {
            TransactionLensError::AnalysisError(format!("Failed to read file {}: {}", self.name, e))
        })?;
        Ok(text.strip_prefix(UTF8_BOM).unwrap_or(text).to_string())
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}

pub async fn load_upload(path: &Path) -> Result<Upload, TransactionLensError> {
    let content = tokio::fs::read(path).await?;
    let name = path
        .file_name()
        .and_then(|name| name.to_str())
        .map(String::from)
        .unwrap_or_else(|| path.display().to_string());
    debug!("Loaded upload {} ({} bytes)", name, content.len());
    Ok(Upload { name, content })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn decodes_utf8_and_strips_bom() {
        let upload = Upload::new("statement.csv", "\u{feff}date,amount\n".as_bytes());
        assert_eq!(upload.decode_text().unwrap(), "date,amount\n");
    }

    #[test]
    fn invalid_utf8_is_an_analysis_error() {
        let upload = Upload::new("scan.bin", vec![0xff, 0xfe, 0x00, 0xc3]);
        match upload.decode_text() {
            Err(TransactionLensError::AnalysisError(msg)) => {
                assert!(msg.starts_with("Failed to read file scan.bin"))
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn load_upload_uses_file_name() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "Alice paid Bob").unwrap();

        let upload = load_upload(file.path()).await.unwrap();
        assert_eq!(upload.content, b"Alice paid Bob");
        assert_eq!(
            upload.name,
            file.path().file_name().unwrap().to_str().unwrap()
        );
    }

    #[tokio::test]
    async fn load_upload_reports_missing_file() {
        let err = load_upload(Path::new("/definitely/not/here.txt"))
            .await
            .unwrap_err();
        assert!(matches!(err, TransactionLensError::IoError(_)));
    }
}
