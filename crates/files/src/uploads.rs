//! Upload staging and order-scoped file storage.

use crate::UploadError;
use chrono::{DateTime, Utc};
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Hard cap on a single uploaded file.
pub const MAX_UPLOAD_BYTES: u64 = 25 * 1024 * 1024;

const TMP_DIR_NAME: &str = "tmp";
const ORDERS_DIR_NAME: &str = "orders";

/// The three kinds of files an order carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadKind {
    ExamImage,
    MedicalReport,
    OrderPdf,
}

impl UploadKind {
    /// Directory name under `orders/<id>/` for this kind.
    pub fn dir_name(&self) -> &'static str {
        match self {
            UploadKind::ExamImage => "exam-images",
            UploadKind::MedicalReport => "medical-reports",
            UploadKind::OrderPdf => "pdfs",
        }
    }

    /// Wire/database form, e.g. `exam_image`.
    pub fn as_str(&self) -> &'static str {
        match self {
            UploadKind::ExamImage => "exam_image",
            UploadKind::MedicalReport => "medical_report",
            UploadKind::OrderPdf => "order_pdf",
        }
    }

    pub fn from_str_opt(value: &str) -> Option<Self> {
        Some(match value {
            "exam_image" => UploadKind::ExamImage,
            "medical_report" => UploadKind::MedicalReport,
            "order_pdf" => UploadKind::OrderPdf,
            _ => return None,
        })
    }

    fn from_dir_name(value: &str) -> Option<Self> {
        Some(match value {
            "exam-images" => UploadKind::ExamImage,
            "medical-reports" => UploadKind::MedicalReport,
            "pdfs" => UploadKind::OrderPdf,
            _ => return None,
        })
    }
}

/// A file accepted into the staging area, not yet bound to an order.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
pub struct StagedUpload {
    /// Opaque token the client passes back to attach the file to an order.
    pub token: String,
    pub kind: String,
    pub file_name: String,
    /// Detected media type (best-effort, from magic bytes).
    pub media_type: Option<String>,
    pub size_bytes: u64,
    pub staged_at: DateTime<Utc>,
}

/// A file that lives under an order's directory.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
pub struct StoredFile {
    pub kind: String,
    pub file_name: String,
    /// Path relative to the upload root.
    pub relative_path: String,
    pub media_type: Option<String>,
    pub size_bytes: u64,
}

/// Service for staging uploads and moving them under their order.
///
/// The service is scoped to a single upload root, validated at construction
/// time. It is stateless beyond that root; every operation takes the
/// identifiers it needs.
#[derive(Debug, Clone)]
pub struct UploadService {
    upload_dir: PathBuf,
}

impl UploadService {
    /// Creates a new `UploadService` rooted at `upload_dir`.
    ///
    /// # Errors
    ///
    /// Returns `UploadError::InvalidUploadDir` if the directory does not
    /// exist, is not a directory, or cannot be canonicalised.
    pub fn new(upload_dir: &Path) -> Result<Self, UploadError> {
        if !upload_dir.exists() {
            return Err(UploadError::InvalidUploadDir(format!(
                "Directory does not exist: {}",
                upload_dir.display()
            )));
        }
        if !upload_dir.is_dir() {
            return Err(UploadError::InvalidUploadDir(format!(
                "Path is not a directory: {}",
                upload_dir.display()
            )));
        }

        let upload_dir = upload_dir.canonicalize().map_err(|e| {
            UploadError::InvalidUploadDir(format!(
                "Cannot canonicalize path {}: {}",
                upload_dir.display(),
                e
            ))
        })?;

        Ok(Self { upload_dir })
    }

    /// Writes an uploaded payload into the staging area.
    ///
    /// The filename is sanitised to a safe character set and the media type
    /// is detected from the payload's magic bytes. The returned token names
    /// the staged file in later calls.
    ///
    /// # Errors
    ///
    /// Returns an error if the payload is empty or over [`MAX_UPLOAD_BYTES`],
    /// the filename sanitises to nothing, or a write fails.
    pub fn stage(
        &self,
        kind: UploadKind,
        original_filename: &str,
        bytes: &[u8],
    ) -> Result<StagedUpload, UploadError> {
        if bytes.is_empty() {
            return Err(UploadError::EmptyFile);
        }
        if bytes.len() as u64 > MAX_UPLOAD_BYTES {
            return Err(UploadError::TooLarge {
                limit_bytes: MAX_UPLOAD_BYTES,
            });
        }

        let file_name = sanitize_filename(original_filename)?;
        let token = Uuid::new_v4().simple().to_string();

        // The kind is encoded in the staging layout so a later `staged`
        // lookup can recover it from the token alone.
        let staged_dir = self
            .upload_dir
            .join(TMP_DIR_NAME)
            .join(&token)
            .join(kind.dir_name());
        fs::create_dir_all(&staged_dir)?;
        fs::write(staged_dir.join(&file_name), bytes)?;

        let media_type = infer::get(bytes).map(|k| k.mime_type().to_owned());

        Ok(StagedUpload {
            token,
            kind: kind.as_str().to_owned(),
            file_name,
            media_type,
            size_bytes: bytes.len() as u64,
            staged_at: Utc::now(),
        })
    }

    /// Moves a staged upload under `orders/<order_id>/<kind-dir>/`.
    ///
    /// Rename is attempted first; if staging and final storage live on
    /// different filesystems the file is copied and the staged copy removed.
    /// A name collision inside the order directory gets a numeric suffix
    /// rather than overwriting.
    ///
    /// # Errors
    ///
    /// Returns `UploadError::UnknownToken` if the token has no staged file,
    /// or an I/O error if the move fails.
    pub fn attach_to_order(
        &self,
        order_id: Uuid,
        staged: &StagedUpload,
    ) -> Result<StoredFile, UploadError> {
        let kind = UploadKind::from_str_opt(&staged.kind)
            .ok_or_else(|| UploadError::UnknownToken(staged.token.clone()))?;

        let token_dir = self.upload_dir.join(TMP_DIR_NAME).join(&staged.token);
        let staged_path = token_dir.join(kind.dir_name()).join(&staged.file_name);
        if !staged_path.is_file() {
            return Err(UploadError::UnknownToken(staged.token.clone()));
        }

        let order_dir = self
            .upload_dir
            .join(ORDERS_DIR_NAME)
            .join(order_id.simple().to_string())
            .join(kind.dir_name());
        fs::create_dir_all(&order_dir)?;

        let final_name = available_name(&order_dir, &staged.file_name);
        let final_path = order_dir.join(&final_name);

        match fs::rename(&staged_path, &final_path) {
            Ok(()) => {}
            Err(_) => {
                // Cross-device move: copy then remove the staged original.
                fs::copy(&staged_path, &final_path)?;
                fs::remove_file(&staged_path)?;
            }
        }
        // Best-effort cleanup of the now-empty token directory.
        let _ = fs::remove_dir(token_dir.join(kind.dir_name()));
        let _ = fs::remove_dir(&token_dir);

        let relative_path = format!(
            "{ORDERS_DIR_NAME}/{}/{}/{}",
            order_id.simple(),
            kind.dir_name(),
            final_name
        );

        Ok(StoredFile {
            kind: staged.kind.clone(),
            file_name: final_name,
            relative_path,
            media_type: staged.media_type.clone(),
            size_bytes: staged.size_bytes,
        })
    }

    /// Looks a staged upload back up by its token.
    ///
    /// The kind and filename are recovered from the staging layout, the media
    /// type is re-detected from the file.
    ///
    /// # Errors
    ///
    /// Returns `UploadError::UnknownToken` for tokens with no staged file
    /// (never issued, already attached, or swept).
    pub fn staged(&self, token: &str) -> Result<StagedUpload, UploadError> {
        if token.is_empty() || !token.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(UploadError::UnknownToken(token.to_owned()));
        }

        let token_dir = self.upload_dir.join(TMP_DIR_NAME).join(token);
        for entry in fs::read_dir(&token_dir)
            .map_err(|_| UploadError::UnknownToken(token.to_owned()))?
            .flatten()
        {
            let Some(kind) = entry
                .file_name()
                .to_str()
                .and_then(UploadKind::from_dir_name)
            else {
                continue;
            };
            for file in fs::read_dir(entry.path())?.flatten() {
                let path = file.path();
                if !path.is_file() {
                    continue;
                }
                let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
                    continue;
                };
                let bytes = fs::read(&path)?;
                return Ok(StagedUpload {
                    token: token.to_owned(),
                    kind: kind.as_str().to_owned(),
                    file_name: file_name.to_owned(),
                    media_type: infer::get(&bytes).map(|k| k.mime_type().to_owned()),
                    size_bytes: bytes.len() as u64,
                    staged_at: Utc::now(),
                });
            }
        }
        Err(UploadError::UnknownToken(token.to_owned()))
    }

    /// Reads a stored file back by its relative path.
    ///
    /// The path is re-checked against the upload root, so a tampered value
    /// stored outside this service cannot reach anything else on disk.
    pub fn read(&self, relative_path: &str) -> Result<Vec<u8>, UploadError> {
        let full = self.resolve_inside_root(relative_path)?;
        Ok(fs::read(full)?)
    }

    /// Removes staged uploads older than `max_age`, returning how many
    /// token directories were swept.
    ///
    /// Staged files that never get attached (abandoned wizard sessions,
    /// rejected saves) have no database row pointing at them; age is the
    /// only signal they are garbage.
    pub fn purge_staged(&self, max_age: std::time::Duration) -> Result<usize, UploadError> {
        let tmp_root = self.upload_dir.join(TMP_DIR_NAME);
        let entries = match fs::read_dir(&tmp_root) {
            Ok(it) => it,
            Err(_) => return Ok(0),
        };

        let mut purged = 0;
        for entry in entries.flatten() {
            let path = entry.path();
            if !path.is_dir() {
                continue;
            }
            let age = fs::metadata(&path)?
                .modified()?
                .elapsed()
                .unwrap_or_default();
            if age >= max_age {
                fs::remove_dir_all(&path)?;
                purged += 1;
            }
        }
        Ok(purged)
    }

    /// Removes a stored file.
    pub fn remove(&self, relative_path: &str) -> Result<(), UploadError> {
        let full = self.resolve_inside_root(relative_path)?;
        fs::remove_file(full)?;
        Ok(())
    }

    /// Lists every file stored for an order, across all kinds.
    pub fn list_for_order(&self, order_id: Uuid) -> Result<Vec<StoredFile>, UploadError> {
        let order_root = self
            .upload_dir
            .join(ORDERS_DIR_NAME)
            .join(order_id.simple().to_string());

        let mut files = Vec::new();
        if !order_root.is_dir() {
            return Ok(files);
        }

        for kind in [
            UploadKind::ExamImage,
            UploadKind::MedicalReport,
            UploadKind::OrderPdf,
        ] {
            let dir = order_root.join(kind.dir_name());
            let entries = match fs::read_dir(&dir) {
                Ok(it) => it,
                Err(_) => continue,
            };
            for entry in entries.flatten() {
                let path = entry.path();
                if !path.is_file() {
                    continue;
                }
                let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                    continue;
                };
                let metadata = fs::metadata(&path)?;
                files.push(StoredFile {
                    kind: kind.as_str().to_owned(),
                    file_name: name.to_owned(),
                    relative_path: format!(
                        "{ORDERS_DIR_NAME}/{}/{}/{name}",
                        order_id.simple(),
                        kind.dir_name()
                    ),
                    media_type: None,
                    size_bytes: metadata.len(),
                });
            }
        }

        Ok(files)
    }

    fn resolve_inside_root(&self, relative_path: &str) -> Result<PathBuf, UploadError> {
        if relative_path.split('/').any(|seg| seg == ".." || seg.is_empty()) {
            return Err(UploadError::InvalidFilename(relative_path.to_owned()));
        }
        Ok(self.upload_dir.join(relative_path))
    }
}

/// Reduces a client-supplied filename to a safe basename.
///
/// Path components are stripped, the name is limited to ASCII alphanumerics,
/// `.`, `-` and `_` (everything else becomes `_`), and leading dots are
/// dropped so no hidden or traversal name survives.
fn sanitize_filename(original: &str) -> Result<String, UploadError> {
    let base = original
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim();

    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.').to_owned();

    if cleaned.is_empty() || cleaned.chars().all(|c| c == '_') {
        return Err(UploadError::InvalidFilename(original.to_owned()));
    }
    Ok(cleaned)
}

/// Picks `name`, or `stem-2.ext`, `stem-3.ext`, … if taken.
fn available_name(dir: &Path, name: &str) -> String {
    if !dir.join(name).exists() {
        return name.to_owned();
    }
    let (stem, ext) = match name.rsplit_once('.') {
        Some((s, e)) if !s.is_empty() => (s, Some(e)),
        _ => (name, None),
    };
    for n in 2.. {
        let candidate = match ext {
            Some(ext) => format!("{stem}-{n}.{ext}"),
            None => format!("{stem}-{n}"),
        };
        if !dir.join(&candidate).exists() {
            return candidate;
        }
    }
    unreachable!("counter space exhausted");
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const PNG_MAGIC: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0];

    fn service(dir: &TempDir) -> UploadService {
        UploadService::new(dir.path()).unwrap()
    }

    #[test]
    fn new_rejects_missing_dir() {
        let err = UploadService::new(Path::new("/nonexistent/opx-uploads"));
        assert!(matches!(err, Err(UploadError::InvalidUploadDir(_))));
    }

    #[test]
    fn stage_writes_into_tmp_and_detects_mime() {
        let dir = TempDir::new().unwrap();
        let svc = service(&dir);

        let staged = svc
            .stage(UploadKind::ExamImage, "raio-x joelho.png", PNG_MAGIC)
            .unwrap();

        assert_eq!(staged.file_name, "raio-x_joelho.png");
        assert_eq!(staged.media_type.as_deref(), Some("image/png"));
        let staged_path = dir
            .path()
            .join("tmp")
            .join(&staged.token)
            .join("exam-images")
            .join(&staged.file_name);
        assert!(staged_path.is_file());
    }

    #[test]
    fn staged_lookup_recovers_kind_and_name() {
        let dir = TempDir::new().unwrap();
        let svc = service(&dir);

        let staged = svc
            .stage(UploadKind::MedicalReport, "laudo.pdf", b"%PDF-1.4 report")
            .unwrap();
        let found = svc.staged(&staged.token).unwrap();

        assert_eq!(found.kind, "medical_report");
        assert_eq!(found.file_name, "laudo.pdf");
        assert_eq!(found.size_bytes, staged.size_bytes);

        assert!(matches!(
            svc.staged("deadbeef"),
            Err(UploadError::UnknownToken(_))
        ));
        assert!(matches!(
            svc.staged("../../etc"),
            Err(UploadError::UnknownToken(_))
        ));
    }

    #[test]
    fn stage_rejects_empty_and_bad_names() {
        let dir = TempDir::new().unwrap();
        let svc = service(&dir);

        assert!(matches!(
            svc.stage(UploadKind::OrderPdf, "a.pdf", &[]),
            Err(UploadError::EmptyFile)
        ));
        assert!(matches!(
            svc.stage(UploadKind::OrderPdf, "...", b"x"),
            Err(UploadError::InvalidFilename(_))
        ));
    }

    #[test]
    fn sanitize_strips_path_components() {
        assert_eq!(
            sanitize_filename("../../etc/passwd").unwrap(),
            "passwd".to_owned()
        );
        assert_eq!(
            sanitize_filename("C:\\Users\\doc\\laudo final.pdf").unwrap(),
            "laudo_final.pdf".to_owned()
        );
        assert!(sanitize_filename("..").is_err());
    }

    #[test]
    fn purge_staged_sweeps_old_tokens_only() {
        let dir = TempDir::new().unwrap();
        let svc = service(&dir);

        let staged = svc
            .stage(UploadKind::ExamImage, "rx.png", PNG_MAGIC)
            .unwrap();

        // A generous cutoff leaves the fresh upload alone.
        assert_eq!(
            svc.purge_staged(std::time::Duration::from_secs(3600)).unwrap(),
            0
        );
        assert!(svc.staged(&staged.token).is_ok());

        // A zero cutoff treats everything staged as stale.
        assert_eq!(
            svc.purge_staged(std::time::Duration::ZERO).unwrap(),
            1
        );
        assert!(matches!(
            svc.staged(&staged.token),
            Err(UploadError::UnknownToken(_))
        ));

        // No tmp directory at all is a no-op.
        let empty = TempDir::new().unwrap();
        let svc = service(&empty);
        assert_eq!(svc.purge_staged(std::time::Duration::ZERO).unwrap(), 0);
    }

    #[test]
    fn attach_moves_file_under_order() {
        let dir = TempDir::new().unwrap();
        let svc = service(&dir);
        let order_id = Uuid::new_v4();

        let staged = svc
            .stage(UploadKind::MedicalReport, "laudo.pdf", b"%PDF-1.4 report")
            .unwrap();
        let stored = svc.attach_to_order(order_id, &staged).unwrap();

        assert_eq!(stored.kind, "medical_report");
        assert_eq!(
            stored.relative_path,
            format!("orders/{}/medical-reports/laudo.pdf", order_id.simple())
        );
        assert!(dir.path().join(&stored.relative_path).is_file());
        // Staged copy is gone.
        assert!(!dir.path().join("tmp").join(&staged.token).exists());
    }

    #[test]
    fn attach_twice_fails_on_consumed_token() {
        let dir = TempDir::new().unwrap();
        let svc = service(&dir);
        let order_id = Uuid::new_v4();

        let staged = svc
            .stage(UploadKind::OrderPdf, "pedido.pdf", b"%PDF-1.4")
            .unwrap();
        svc.attach_to_order(order_id, &staged).unwrap();

        assert!(matches!(
            svc.attach_to_order(order_id, &staged),
            Err(UploadError::UnknownToken(_))
        ));
    }

    #[test]
    fn name_collisions_get_suffixes() {
        let dir = TempDir::new().unwrap();
        let svc = service(&dir);
        let order_id = Uuid::new_v4();

        for expected in ["rx.png", "rx-2.png", "rx-3.png"] {
            let staged = svc.stage(UploadKind::ExamImage, "rx.png", PNG_MAGIC).unwrap();
            let stored = svc.attach_to_order(order_id, &staged).unwrap();
            assert_eq!(stored.file_name, expected);
        }
    }

    #[test]
    fn list_for_order_finds_all_kinds() {
        let dir = TempDir::new().unwrap();
        let svc = service(&dir);
        let order_id = Uuid::new_v4();

        let exam = svc.stage(UploadKind::ExamImage, "rx.png", PNG_MAGIC).unwrap();
        svc.attach_to_order(order_id, &exam).unwrap();
        let pdf = svc
            .stage(UploadKind::OrderPdf, "pedido.pdf", b"%PDF-1.4")
            .unwrap();
        svc.attach_to_order(order_id, &pdf).unwrap();

        let mut kinds: Vec<String> = svc
            .list_for_order(order_id)
            .unwrap()
            .into_iter()
            .map(|f| f.kind)
            .collect();
        kinds.sort();
        assert_eq!(kinds, vec!["exam_image", "order_pdf"]);

        // Unknown orders list as empty, not as an error.
        assert!(svc.list_for_order(Uuid::new_v4()).unwrap().is_empty());
    }

    #[test]
    fn read_rejects_traversal() {
        let dir = TempDir::new().unwrap();
        let svc = service(&dir);
        assert!(matches!(
            svc.read("orders/../../shadow"),
            Err(UploadError::InvalidFilename(_))
        ));
    }
}
