use api_types::{
    bulk_load::{BulkLoadError, BulkLoadProcess, ProcessStatus},
    client::ClientDetail,
};

/// A predicate over the rows of an already-fetched page.
pub trait RowFilter<T>: Default {
    fn matches(&self, row: &T) -> bool;

    fn is_active(&self) -> bool;
}

/// Lists that offer no filtering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoFilter;

impl<T> RowFilter<T> for NoFilter {
    fn matches(&self, _row: &T) -> bool {
        true
    }

    fn is_active(&self) -> bool {
        false
    }
}

/// Process history filter: status and file name, both case-insensitive
/// substrings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessFilter {
    pub status: String,
    pub file_name: String,
}

impl ProcessFilter {
    /// Steps the status filter through "any" and every known status.
    pub fn cycle_status(&mut self) {
        let current = self.status.to_ascii_uppercase();
        let position = ProcessStatus::ALL
            .iter()
            .position(|status| status.as_str() == current);
        self.status = match position {
            None => ProcessStatus::ALL[0].as_str().to_string(),
            Some(idx) if idx + 1 < ProcessStatus::ALL.len() => {
                ProcessStatus::ALL[idx + 1].as_str().to_string()
            }
            Some(_) => String::new(),
        };
    }
}

impl RowFilter<BulkLoadProcess> for ProcessFilter {
    fn matches(&self, row: &BulkLoadProcess) -> bool {
        let status = self.status.trim().to_ascii_uppercase();
        if !status.is_empty() && !row.status.as_str().contains(&status) {
            return false;
        }
        let file_name = self.file_name.trim().to_lowercase();
        if !file_name.is_empty() {
            let matches = row
                .file_name
                .as_deref()
                .is_some_and(|name| name.to_lowercase().contains(&file_name));
            if !matches {
                return false;
            }
        }
        true
    }

    fn is_active(&self) -> bool {
        !self.status.trim().is_empty() || !self.file_name.trim().is_empty()
    }
}

/// Validation-error filter: exact identification type, case-insensitive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorFilter {
    pub id_type: String,
}

impl RowFilter<BulkLoadError> for ErrorFilter {
    fn matches(&self, row: &BulkLoadError) -> bool {
        let wanted = self.id_type.trim();
        if wanted.is_empty() {
            return true;
        }
        row.id_type
            .as_deref()
            .is_some_and(|id_type| id_type.trim().eq_ignore_ascii_case(wanted))
    }

    fn is_active(&self) -> bool {
        !self.id_type.trim().is_empty()
    }
}

/// Client filter: full name and client code, case-insensitive substrings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientFilter {
    pub name: String,
    pub code: String,
}

impl RowFilter<ClientDetail> for ClientFilter {
    fn matches(&self, row: &ClientDetail) -> bool {
        let name = self.name.trim().to_lowercase();
        if !name.is_empty() && !row.full_name().to_lowercase().contains(&name) {
            return false;
        }
        let code = self.code.trim().to_lowercase();
        if !code.is_empty() && !row.client_code.to_lowercase().contains(&code) {
            return false;
        }
        true
    }

    fn is_active(&self) -> bool {
        !self.name.trim().is_empty() || !self.code.trim().is_empty()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn process(id: &str, file: &str, status: ProcessStatus) -> BulkLoadProcess {
        BulkLoadProcess {
            id: None,
            process_id: id.to_string(),
            file_name: Some(file.to_string()),
            status,
            total_records: 0,
            successful_count: 0,
            error_count: 0,
            processing_date: None,
        }
    }

    pub(crate) fn client(code: &str, first: &str, last: &str) -> ClientDetail {
        ClientDetail {
            id: None,
            client_code: code.to_string(),
            id_type: "C".to_string(),
            id_number: "1".to_string(),
            first_names: first.to_string(),
            last_names: last.to_string(),
            birth_date: None,
            join_date: None,
            email: None,
            phone_number: None,
            process_id: None,
            account: None,
        }
    }

    #[test]
    fn process_filter_matches_status_and_name() {
        let filter = ProcessFilter {
            status: "comp".to_string(),
            file_name: "JAN".to_string(),
        };
        assert!(filter.matches(&process("1", "clients-jan.txt", ProcessStatus::Completed)));
        assert!(!filter.matches(&process("2", "clients-jan.txt", ProcessStatus::Failed)));
        assert!(!filter.matches(&process("3", "clients-feb.txt", ProcessStatus::Completed)));
    }

    #[test]
    fn cycle_status_wraps_to_any() {
        let mut filter = ProcessFilter::default();
        let mut seen = Vec::new();
        for _ in 0..5 {
            filter.cycle_status();
            seen.push(filter.status.clone());
        }
        assert_eq!(seen, ["COMPLETED", "PROCESSING", "FAILED", "PENDING", ""]);
    }

    #[test]
    fn error_filter_is_exact_on_id_type() {
        let mut error = BulkLoadError {
            id: None,
            line_number: 1,
            error_code: None,
            error_message: "bad".to_string(),
            error_type: None,
            field_name: None,
            id_type: Some("c".to_string()),
            id_number: None,
        };
        let filter = ErrorFilter {
            id_type: "C".to_string(),
        };
        assert!(filter.matches(&error));
        error.id_type = Some("CE".to_string());
        assert!(!filter.matches(&error));
        error.id_type = None;
        assert!(!filter.matches(&error));
    }

    #[test]
    fn client_filter_combines_name_and_code() {
        let filter = ClientFilter {
            name: "ana r".to_string(),
            code: "c-0".to_string(),
        };
        assert!(filter.matches(&client("C-01", "Ana", "Ruiz")));
        assert!(!filter.matches(&client("X-01", "Ana", "Ruiz")));
        assert!(!filter.matches(&client("C-01", "Ana", "Lopez")));
        assert!(ClientFilter::default().matches(&client("X", "Y", "Z")));
    }
}
