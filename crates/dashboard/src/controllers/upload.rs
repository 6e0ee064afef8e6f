use std::path::{Path, PathBuf};

use api_types::bulk_load::BulkLoadResponse;

use crate::client::{ClientError, ClientResult, UploadFile};

pub const ALLOWED_EXTENSION: &str = "txt";

/// Checks a picked file before anything is sent.
pub fn validate_file(name: &str, size: u64, max_bytes: u64) -> ClientResult<()> {
    let has_txt_extension = Path::new(name.trim())
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(ALLOWED_EXTENSION));
    if !has_txt_extension {
        return Err(ClientError::InvalidFile(format!(
            "Only .{ALLOWED_EXTENSION} files are allowed."
        )));
    }
    if size > max_bytes {
        return Err(ClientError::InvalidFile(format!(
            "The file exceeds the maximum size of {}MB.",
            megabytes(max_bytes)
        )));
    }
    Ok(())
}

fn megabytes(bytes: u64) -> u64 {
    (bytes as f64 / (1024.0 * 1024.0)).round() as u64
}

/// Size rendered the way the upload form shows it.
pub fn human_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit + 1 < UNITS.len() {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{value:.2} {}", UNITS[unit])
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub path: PathBuf,
    pub name: String,
    pub size: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadTicket {
    pub generation: u64,
    pub path: PathBuf,
    pub name: String,
    pub max_bytes: u64,
}

impl UploadTicket {
    /// Wraps the bytes read from disk, rechecking the size limit since the
    /// file may have changed after it was picked.
    pub fn into_file(self, bytes: Vec<u8>) -> ClientResult<UploadFile> {
        validate_file(&self.name, bytes.len() as u64, self.max_bytes)?;
        Ok(UploadFile {
            name: self.name,
            bytes,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub text: String,
}

/// Upload form on the dashboard: picked file, in-flight flag, last notice.
#[derive(Debug)]
pub struct UploadController {
    max_bytes: u64,
    selected: Option<SelectedFile>,
    uploading: bool,
    notice: Option<Notice>,
    generation: u64,
}

impl UploadController {
    pub fn new(max_bytes: u64) -> Self {
        Self {
            max_bytes,
            selected: None,
            uploading: false,
            notice: None,
            generation: 0,
        }
    }

    /// Validates a picked file. A rejected file clears the previous pick.
    pub fn select(&mut self, path: impl Into<PathBuf>, size: u64) -> ClientResult<()> {
        let path = path.into();
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        if let Err(err) = validate_file(&name, size, self.max_bytes) {
            self.selected = None;
            self.set_error(err.user_message());
            return Err(err);
        }

        tracing::debug!(file = %name, size, "file selected for upload");
        self.notice = None;
        self.selected = Some(SelectedFile { path, name, size });
        Ok(())
    }

    /// Reports a path that could not be inspected.
    pub fn reject(&mut self, message: String) {
        self.selected = None;
        self.set_error(message);
    }

    pub fn clear(&mut self) {
        self.selected = None;
        self.notice = None;
    }

    /// Queues the picked file. `None` when nothing is picked or an upload is
    /// already running.
    pub fn begin_upload(&mut self) -> Option<UploadTicket> {
        if self.uploading {
            return None;
        }
        let Some(file) = &self.selected else {
            let rejected = self
                .notice
                .as_ref()
                .is_some_and(|notice| notice.kind == NoticeKind::Error);
            if !rejected {
                self.set_error("Select a file first.".to_string());
            }
            return None;
        };
        self.generation += 1;
        self.uploading = true;
        self.notice = None;
        Some(UploadTicket {
            generation: self.generation,
            path: file.path.clone(),
            name: file.name.clone(),
            max_bytes: self.max_bytes,
        })
    }

    /// Applies the upload outcome and returns the created process on success.
    pub fn finish(
        &mut self,
        generation: u64,
        result: ClientResult<BulkLoadResponse>,
    ) -> Option<BulkLoadResponse> {
        if generation != self.generation {
            return None;
        }
        self.uploading = false;
        match result {
            Ok(response) => {
                self.selected = None;
                self.notice = Some(Notice {
                    kind: NoticeKind::Success,
                    text: format!("{} clients created", response.success_count),
                });
                Some(response)
            }
            Err(err) => {
                self.set_error(err.user_message());
                None
            }
        }
    }

    pub fn max_bytes(&self) -> u64 {
        self.max_bytes
    }

    pub fn selected(&self) -> Option<&SelectedFile> {
        self.selected.as_ref()
    }

    pub fn is_uploading(&self) -> bool {
        self.uploading
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    fn set_error(&mut self, text: String) {
        self.notice = Some(Notice {
            kind: NoticeKind::Error,
            text,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAX: u64 = 52_428_800;

    #[test]
    fn csv_is_rejected() {
        let err = validate_file("data.csv", 10, MAX).unwrap_err();
        assert!(matches!(err, ClientError::InvalidFile(_)));
    }

    #[test]
    fn oversized_txt_mentions_limit_in_mb() {
        let err = validate_file("clients.txt", MAX + 1, MAX).unwrap_err();
        assert!(err.user_message().contains("50MB"), "{}", err.user_message());
    }

    #[test]
    fn extension_check_ignores_case() {
        assert!(validate_file("CLIENTS.TXT", 200, MAX).is_ok());
        assert!(validate_file("txt", 200, MAX).is_err());
    }

    #[test]
    fn valid_file_is_queued() {
        let mut upload = UploadController::new(MAX);
        upload.select("/tmp/clients.txt", 200).unwrap();
        let ticket = upload.begin_upload().unwrap();
        assert_eq!(ticket.name, "clients.txt");
        assert!(upload.is_uploading());
        assert_eq!(upload.begin_upload(), None);
    }

    #[test]
    fn rejected_file_cannot_be_uploaded() {
        let mut upload = UploadController::new(MAX);
        upload.select("/tmp/clients.txt", 200).unwrap();
        assert!(upload.select("/tmp/data.csv", 200).is_err());
        assert!(upload.selected().is_none());
        assert_eq!(upload.begin_upload(), None);
        assert_eq!(upload.notice().map(|n| n.kind), Some(NoticeKind::Error));
    }

    #[test]
    fn upload_without_pick_keeps_rejection_reason() {
        let mut upload = UploadController::new(MAX);
        assert!(upload.select("/tmp/data.csv", 10).is_err());
        assert_eq!(upload.begin_upload(), None);
        assert_eq!(upload.notice().unwrap().text, "Only .txt files are allowed.");

        let mut fresh = UploadController::new(MAX);
        assert_eq!(fresh.begin_upload(), None);
        assert_eq!(fresh.notice().unwrap().text, "Select a file first.");
    }

    #[test]
    fn file_grown_after_pick_is_refused() {
        let mut upload = UploadController::new(10);
        upload.select("clients.txt", 8).unwrap();
        let ticket = upload.begin_upload().unwrap();
        let err = ticket.clone().into_file(vec![b'x'; 11]).unwrap_err();
        assert!(matches!(err, ClientError::InvalidFile(_)));

        let file = ticket.into_file(vec![b'x'; 8]).unwrap();
        assert_eq!(file.name, "clients.txt");
        assert_eq!(file.bytes.len(), 8);
    }

    #[test]
    fn finish_reports_created_clients() {
        let mut upload = UploadController::new(MAX);
        upload.select("clients.txt", 200).unwrap();
        let ticket = upload.begin_upload().unwrap();
        let response = BulkLoadResponse {
            process_id: "abc-123".to_string(),
            status: Some("COMPLETED".to_string()),
            success_count: 18,
            error_count: 2,
            message: None,
        };
        let created = upload.finish(ticket.generation, Ok(response)).unwrap();
        assert_eq!(created.process_id, "abc-123");
        assert_eq!(upload.notice().unwrap().text, "18 clients created");
        assert!(upload.selected().is_none());
        assert!(!upload.is_uploading());
    }

    #[test]
    fn failed_upload_keeps_selection_for_retry() {
        let mut upload = UploadController::new(MAX);
        upload.select("clients.txt", 200).unwrap();
        let ticket = upload.begin_upload().unwrap();
        assert!(upload.finish(ticket.generation, Err(ClientError::Timeout)).is_none());
        assert!(upload.selected().is_some());
        assert!(upload.begin_upload().is_some());
    }

    #[test]
    fn human_size_units() {
        assert_eq!(human_size(200), "200 B");
        assert_eq!(human_size(1536), "1.50 KB");
        assert_eq!(human_size(MAX), "50.00 MB");
    }
}
