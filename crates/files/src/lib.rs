//! OPX Upload Storage
//!
//! This crate stores the files attached to surgical orders: exam images,
//! scanned medical reports and the order PDF the client generates.
//!
//! ## Storage Model
//!
//! Uploads arrive before the order row necessarily exists (the wizard lets
//! the doctor attach exams on any step), so storage is two-phase:
//!
//! ```text
//! <upload_dir>/
//! ├── tmp/                          # staged uploads, keyed by token
//! │   └── <token>/<kind-dir>/<filename>
//! └── orders/
//!     └── <order_id>/
//!         ├── exam-images/
//!         ├── medical-reports/
//!         └── pdfs/
//! ```
//!
//! A staged upload is identified by an opaque token; attaching it to an
//! order moves the file into the order's directory (rename when possible,
//! copy-and-remove across filesystems). Filenames are sanitised at staging
//! time, so nothing under `tmp/` or `orders/` can escape the upload root.

mod uploads;

pub use uploads::{StagedUpload, StoredFile, UploadKind, UploadService};

/// Errors that can occur during upload operations
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    /// Upload root does not exist or is not a directory
    #[error("Invalid upload directory: {0}")]
    InvalidUploadDir(String),
    /// The uploaded payload was empty
    #[error("Uploaded file is empty")]
    EmptyFile,
    /// The uploaded payload exceeded the size limit
    #[error("Uploaded file exceeds the {limit_bytes} byte limit")]
    TooLarge { limit_bytes: u64 },
    /// The original filename was missing or reduced to nothing after sanitising
    #[error("Invalid filename: {0}")]
    InvalidFilename(String),
    /// No staged upload exists for the given token
    #[error("Unknown upload token: {0}")]
    UnknownToken(String),
    /// I/O failure while staging, moving or removing files
    #[error("Upload I/O error: {0}")]
    Io(#[from] std::io::Error),
}
