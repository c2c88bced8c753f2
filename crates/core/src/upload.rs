//! Batch uploads into object storage.
//!
//! Contract: files are uploaded one at a time in the order given. A failed
//! file is recorded and the loop moves on; nothing already uploaded is
//! rolled back.

use tracing::{debug, warn};

use crate::cloud::{ObjectStore, PutObject};

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";
const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif"];

/// Infer a content type from the file extension.
pub fn content_type_for(filename: &str) -> String {
    let Some((_, ext)) = filename.rsplit_once('.') else {
        return DEFAULT_CONTENT_TYPE.into();
    };
    match ext {
        "html" => "text/html".into(),
        "css" => "text/css".into(),
        "js" => "application/javascript".into(),
        ext if IMAGE_EXTENSIONS.contains(&ext) => format!("image/{ext}"),
        _ => DEFAULT_CONTENT_TYPE.into(),
    }
}

#[derive(Debug, Clone)]
pub struct UploadFile {
    pub filename: String,
    pub content_type: String,
    pub body: Vec<u8>,
}

impl UploadFile {
    /// Create a file whose content type is inferred from its name.
    pub fn new(filename: impl Into<String>, body: Vec<u8>) -> Self {
        let filename = filename.into();
        let content_type = content_type_for(&filename);
        Self {
            filename,
            content_type,
            body,
        }
    }
}

/// The files of one upload request, bound for a single bucket.
#[derive(Debug, Clone)]
pub struct UploadBatch {
    pub bucket: String,
    pub files: Vec<UploadFile>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadReport {
    pub uploaded: usize,
    pub errors: Vec<String>,
}

impl UploadReport {
    pub fn is_complete(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Upload every file in `batch`, continuing past failures.
///
/// Files without a name are skipped. Each failure contributes one
/// `"Failed to upload <name>: <cause>"` entry to the report.
pub async fn upload_batch(store: &dyn ObjectStore, batch: UploadBatch) -> UploadReport {
    let mut report = UploadReport::default();
    let bucket = batch.bucket;

    for file in batch.files {
        if file.filename.is_empty() {
            continue;
        }
        let filename = file.filename.clone();
        let object = PutObject {
            bucket: bucket.clone(),
            key: file.filename,
            content_type: file.content_type,
            body: file.body,
        };
        match store.put_object(object).await {
            Ok(()) => {
                debug!(bucket = %bucket, key = %filename, "Uploaded object");
                report.uploaded += 1;
            }
            Err(e) => {
                warn!(bucket = %bucket, key = %filename, error = %e, "Upload failed");
                report.errors.push(format!("Failed to upload {filename}: {e}"));
            }
        }
    }

    report
}
