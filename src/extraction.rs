use crate::error::ServiceError;
use lopdf::Document;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Multipart field carrying the document.
pub const UPLOAD_FIELD: &str = "resume";

pub fn check_pdf_filename(file_name: &str) -> Result<(), ServiceError> {
    if file_name.is_empty() {
        return Err(ServiceError::NoFileUploaded);
    }
    if !file_name.ends_with(".pdf") {
        return Err(ServiceError::UnsupportedFile);
    }
    Ok(())
}

/// Concatenates the text of every page in page-number order.
pub fn extract_pdf_text(path: &Path) -> Result<String, ServiceError> {
    let document = Document::load(path)?;

    let mut text = String::new();
    for page_number in document.get_pages().keys() {
        text.push_str(&document.extract_text(&[*page_number])?);
    }
    Ok(text)
}

/// Writes the upload to a uniquely named file in `staging_dir` and extracts
/// it. The staged file is deleted when the guard drops, on every path.
pub fn stage_and_extract(staging_dir: &Path, bytes: &[u8]) -> Result<String, ServiceError> {
    let mut staged = tempfile::Builder::new()
        .prefix("resume-")
        .suffix(".pdf")
        .tempfile_in(staging_dir)?;
    staged.write_all(bytes)?;
    staged.flush()?;

    tracing::debug!(path = %staged.path().display(), bytes = bytes.len(), "staged upload");
    extract_pdf_text(staged.path())
}

/// Runs [`stage_and_extract`] off the async runtime; PDF parsing is blocking.
pub async fn extract_upload(staging_dir: PathBuf, bytes: Vec<u8>) -> Result<String, ServiceError> {
    tokio::task::spawn_blocking(move || stage_and_extract(&staging_dir, &bytes))
        .await
        .map_err(|e| ServiceError::Internal(format!("extraction task failed: {}", e)))?
}

/// Builds a PDF with one Courier text line per page.
#[cfg(test)]
pub(crate) fn sample_pdf(pages: &[&str]) -> Vec<u8> {
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Object, Stream};

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => font_id,
        },
    });

    let mut kids: Vec<Object> = Vec::with_capacity(pages.len());
    for text in pages {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 24.into()]),
                Operation::new("Td", vec![72.into(), 720.into()]),
                Operation::new("Tj", vec![Object::string_literal(*text)]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer).unwrap();
    buffer
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn staged_files(dir: &TempDir) -> usize {
        std::fs::read_dir(dir.path()).unwrap().count()
    }

    #[test]
    fn test_pdf_filename_check() {
        assert!(check_pdf_filename("resume.pdf").is_ok());
        assert!(matches!(
            check_pdf_filename("resume.txt"),
            Err(ServiceError::UnsupportedFile)
        ));
        assert!(matches!(
            check_pdf_filename("resume.pdf.exe"),
            Err(ServiceError::UnsupportedFile)
        ));
        assert!(matches!(
            check_pdf_filename(""),
            Err(ServiceError::NoFileUploaded)
        ));
    }

    #[test]
    fn test_pages_concatenated_in_order() {
        let dir = TempDir::new().unwrap();
        let pdf = sample_pdf(&["First page text", "Second page text", "Third page text"]);

        let text = stage_and_extract(dir.path(), &pdf).unwrap();

        let first = text.find("First page text").expect("first page missing");
        let second = text.find("Second page text").expect("second page missing");
        let third = text.find("Third page text").expect("third page missing");
        assert!(first < second && second < third);
    }

    #[test]
    fn test_matches_per_page_extraction() {
        let dir = TempDir::new().unwrap();
        let pdf = sample_pdf(&["alpha", "beta"]);

        let document = Document::load_mem(&pdf).unwrap();
        let expected: String = document
            .get_pages()
            .keys()
            .map(|page| document.extract_text(&[*page]).unwrap())
            .collect();

        assert_eq!(stage_and_extract(dir.path(), &pdf).unwrap(), expected);
    }

    #[test]
    fn test_staged_file_removed_after_success() {
        let dir = TempDir::new().unwrap();
        let pdf = sample_pdf(&["hello"]);

        stage_and_extract(dir.path(), &pdf).unwrap();
        assert_eq!(staged_files(&dir), 0);
    }

    #[test]
    fn test_staged_file_removed_after_failure() {
        let dir = TempDir::new().unwrap();

        let result = stage_and_extract(dir.path(), b"definitely not a pdf");
        assert!(result.is_err());
        assert!(!result.unwrap_err().is_client_error());
        assert_eq!(staged_files(&dir), 0);
    }

    #[test]
    fn test_missing_staging_dir_is_internal_error() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("does-not-exist");

        let result = stage_and_extract(&missing, &sample_pdf(&["x"]));
        assert!(matches!(result, Err(ServiceError::Io(_))));
    }

    #[tokio::test]
    async fn test_extract_upload_off_runtime() {
        let dir = TempDir::new().unwrap();
        let pdf = sample_pdf(&["async page"]);

        let text = extract_upload(dir.path().to_path_buf(), pdf).await.unwrap();
        assert!(text.contains("async page"));
        assert_eq!(staged_files(&dir), 0);
    }
}
