use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use rand::Rng;
use serde::Serialize;
use serde_json::json;
use thiserror::Error;
use tiny_http::Response;
use tracing::{debug, info, warn};

use feature_viz::features::{ColorTheme, Explanation, Features};
use feature_viz::extract_file;

use crate::routes::json_response;
use crate::util::multipart::{extract_boundary, find_file, parse_parts};

/// Multipart field the frontend puts the image in.
pub const FILE_FIELD: &str = "file";

pub const ALLOWED_EXTENSIONS: [&str; 5] = ["png", "jpg", "jpeg", "gif", "bmp"];

/// Distinguishes concurrent uploads that share a filename.
static UPLOAD_SEQ: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("No file provided")]
    NoFile,
    #[error("No file selected")]
    NoFileSelected,
    #[error("Invalid file type. Please upload an image.")]
    InvalidFileType,
    #[error("{0}")]
    Io(#[from] std::io::Error),
}

impl UploadError {
    pub fn status(&self) -> u16 {
        match self {
            UploadError::Io(_) => 500,
            _ => 400,
        }
    }
}

/// Body of a successful `POST /upload-image`.
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub success: bool,
    /// The coordinates again, wrapped the way the frontend plots them.
    pub original_data: [[f64; 3]; 1],
    pub coordinates: [f64; 3],
    pub features: Features,
    pub educational_info: Explanation,
    pub color_theme: &'static ColorTheme,
    pub message: String,
    pub filename: String,
}

/// Lower-cased text after the last `.`, or `""` when there is no dot.
fn extension(filename: &str) -> String {
    filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default()
}

pub fn is_allowed(filename: &str) -> bool {
    ALLOWED_EXTENSIONS.contains(&extension(filename).as_str())
}

/// Drops any directory components a client put in the filename.
fn basename(filename: &str) -> &str {
    filename.rsplit(|c: char| c == '/' || c == '\\').next().unwrap_or(filename)
}

/// A saved upload that is removed when dropped, whether or not extraction
/// succeeded.
struct TempUpload {
    path: PathBuf,
}

impl TempUpload {
    fn write(dir: &Path, filename: &str, data: &[u8]) -> std::io::Result<TempUpload> {
        let seq = UPLOAD_SEQ.fetch_add(1, Ordering::Relaxed);
        let upload = TempUpload {
            path: dir.join(format!("{}-{}", seq, basename(filename))),
        };
        std::fs::write(&upload.path, data)?;
        Ok(upload)
    }
}

impl Drop for TempUpload {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            debug!(path = %self.path.display(), error = %e, "could not remove upload");
        }
    }
}

/// Validates the multipart body, analyses the image and builds the reply.
///
/// Validation failures return before anything touches the disk.
pub fn process<R: Rng>(
    content_type: &str,
    body: &[u8],
    upload_dir: &Path,
    rng: &mut R,
) -> Result<UploadResponse, UploadError> {
    info!(bytes = body.len(), "upload request received");

    let boundary = extract_boundary(content_type).ok_or(UploadError::NoFile)?;
    let parts = parse_parts(body, &boundary);
    let file = find_file(&parts, FILE_FIELD).ok_or(UploadError::NoFile)?;

    let filename = file.filename.clone().unwrap_or_default();
    if filename.is_empty() {
        return Err(UploadError::NoFileSelected);
    }
    if !is_allowed(&filename) {
        return Err(UploadError::InvalidFileType);
    }

    let upload = TempUpload::write(upload_dir, &filename, file.data)?;
    info!(path = %upload.path.display(), "file saved");

    let result = extract_file(&upload.path, rng);
    drop(upload);
    info!(coordinates = ?result.coordinates, fallback = result.is_fallback(), "features extracted");

    Ok(UploadResponse {
        success: true,
        original_data: [result.coordinates],
        coordinates: result.coordinates,
        features: result.features,
        educational_info: result.educational_info,
        color_theme: result.color_theme,
        message: format!("Successfully processed {}", filename),
        filename,
    })
}

/// Maps an error to its JSON reply: `{"error"}` for bad requests,
/// `{"success": false, "error"}` for internal failures.
pub fn respond_error(err: &UploadError) -> Response<Cursor<Vec<u8>>> {
    let status = err.status();
    let message = err.to_string();
    if status >= 500 {
        warn!(error = %message, "error processing upload");
        json_response(status, &json!({ "success": false, "error": message }))
    } else {
        info!(error = %message, "upload rejected");
        json_response(status, &json!({ "error": message }))
    }
}

/// `POST /upload-image`
pub fn respond(content_type: &str, body: &[u8], upload_dir: &Path) -> Response<Cursor<Vec<u8>>> {
    match process(content_type, body, upload_dir, &mut rand::thread_rng()) {
        Ok(reply) => json_response(200, &reply),
        Err(e) => respond_error(&e),
    }
}
