use api_types::bulk_load::{
    BulkLoadProcess, BulkLoadStatistics, ProcessDetails, ProcessStatus, ProcessStatusView,
};

use crate::client::ClientResult;

/// A fetch keyed by process id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessRequest {
    pub generation: u64,
    pub process_id: String,
}

/// Process-details dialog: details and statistics load concurrently; the
/// status badge can be refreshed on demand.
#[derive(Debug)]
pub struct ProcessDetailsController {
    process_id: String,
    details: Option<ProcessDetails>,
    statistics: Option<BulkLoadStatistics>,
    status: Option<ProcessStatus>,
    loading_details: bool,
    loading_statistics: bool,
    loading_status: bool,
    error: Option<String>,
    notices: Vec<String>,
    generation: u64,
    status_generation: u64,
}

impl ProcessDetailsController {
    pub fn new(process_id: &str) -> Self {
        Self {
            process_id: process_id.trim().to_string(),
            details: None,
            statistics: None,
            status: None,
            loading_details: false,
            loading_statistics: false,
            loading_status: false,
            error: None,
            notices: Vec::new(),
            generation: 0,
            status_generation: 0,
        }
    }

    /// Opens on a history row, shown until the fetched details replace it.
    pub fn from_process(process: BulkLoadProcess) -> Self {
        let mut this = Self::new(&process.process_id);
        this.details = Some(ProcessDetails::from(process));
        this
    }

    /// Issues the details and statistics fetches; both carry the returned
    /// generation.
    pub fn load(&mut self) -> Option<ProcessRequest> {
        if self.process_id.is_empty() {
            self.error = Some("Process id not provided.".to_string());
            return None;
        }
        self.generation += 1;
        self.loading_details = true;
        self.loading_statistics = true;
        self.error = None;
        self.notices.clear();
        Some(ProcessRequest {
            generation: self.generation,
            process_id: self.process_id.clone(),
        })
    }

    pub fn refresh_status(&mut self) -> Option<ProcessRequest> {
        if self.process_id.is_empty() {
            return None;
        }
        self.status_generation += 1;
        self.loading_status = true;
        Some(ProcessRequest {
            generation: self.status_generation,
            process_id: self.process_id.clone(),
        })
    }

    pub fn apply_details(&mut self, generation: u64, result: ClientResult<ProcessDetails>) {
        if generation != self.generation {
            return;
        }
        self.loading_details = false;
        match result {
            Ok(details) => {
                self.status = Some(details.status);
                self.details = Some(details);
            }
            Err(err) => self.error = Some(err.user_message()),
        }
    }

    pub fn apply_statistics(&mut self, generation: u64, result: ClientResult<BulkLoadStatistics>) {
        if generation != self.generation {
            return;
        }
        self.loading_statistics = false;
        match result {
            Ok(statistics) => self.statistics = Some(statistics),
            Err(err) => self
                .notices
                .push(format!("Statistics not available: {}", err.user_message())),
        }
    }

    pub fn apply_status(&mut self, generation: u64, result: ClientResult<ProcessStatusView>) {
        if generation != self.status_generation {
            return;
        }
        self.loading_status = false;
        match result {
            Ok(view) => {
                self.status = Some(view.status);
                if let Some(details) = &mut self.details {
                    details.status = view.status;
                }
            }
            Err(err) => self
                .notices
                .push(format!("Status not available: {}", err.user_message())),
        }
    }

    pub fn process_id(&self) -> &str {
        &self.process_id
    }

    pub fn details(&self) -> Option<&ProcessDetails> {
        self.details.as_ref()
    }

    pub fn statistics(&self) -> Option<&BulkLoadStatistics> {
        self.statistics.as_ref()
    }

    pub fn status(&self) -> Option<ProcessStatus> {
        self.status.or(self.details.as_ref().map(|details| details.status))
    }

    /// Success share from the details, or from the statistics when the
    /// details report no records.
    pub fn success_percentage(&self) -> u8 {
        match (&self.details, &self.statistics) {
            (Some(details), _) if details.total_records > 0 => details.success_percentage(),
            (_, Some(stats)) => {
                api_types::bulk_load::success_percentage(stats.successful_count, stats.total_count)
            }
            (Some(details), None) => details.success_percentage(),
            (None, None) => 0,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.loading_details || self.loading_statistics || self.loading_status
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn notices(&self) -> &[String] {
        &self.notices
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{client::ClientError, controllers::filters::tests::process};

    fn stats(successful: u64, total: u64) -> BulkLoadStatistics {
        BulkLoadStatistics {
            process_id: Some("p1".to_string()),
            successful_count: successful,
            error_count: total - successful,
            total_count: total,
            message: None,
            processed_at: None,
        }
    }

    #[test]
    fn empty_id_never_requests() {
        let mut dialog = ProcessDetailsController::new("  ");
        assert_eq!(dialog.load(), None);
        assert_eq!(dialog.refresh_status(), None);
        assert!(dialog.error().is_some());
    }

    #[test]
    fn statistics_failure_is_a_notice() {
        let mut dialog = ProcessDetailsController::from_process(process(
            "p1",
            "a.txt",
            ProcessStatus::Processing,
        ));
        let req = dialog.load().unwrap();
        dialog.apply_statistics(req.generation, Err(ClientError::Timeout));
        assert!(dialog.is_loading());
        assert!(dialog.details().is_some());
        assert_eq!(dialog.error(), None);
        assert_eq!(dialog.notices().len(), 1);
    }

    #[test]
    fn percentage_falls_back_to_statistics() {
        let mut dialog = ProcessDetailsController::from_process(process(
            "p1",
            "a.txt",
            ProcessStatus::Completed,
        ));
        let req = dialog.load().unwrap();
        dialog.apply_statistics(req.generation, Ok(stats(18, 20)));
        assert_eq!(dialog.success_percentage(), 90);
    }

    #[test]
    fn status_refresh_updates_badge() {
        let mut dialog = ProcessDetailsController::from_process(process(
            "p1",
            "a.txt",
            ProcessStatus::Processing,
        ));
        let req = dialog.refresh_status().unwrap();
        dialog.apply_status(
            req.generation,
            Ok(ProcessStatusView {
                process_id: Some("p1".to_string()),
                status: ProcessStatus::Completed,
            }),
        );
        assert_eq!(dialog.status(), Some(ProcessStatus::Completed));
        assert_eq!(dialog.details().map(|d| d.status), Some(ProcessStatus::Completed));
    }

    #[test]
    fn stale_details_are_ignored() {
        let mut dialog = ProcessDetailsController::new("p1");
        let first = dialog.load().unwrap();
        dialog.load().unwrap();
        dialog.apply_details(first.generation, Err(ClientError::Timeout));
        assert_eq!(dialog.error(), None);
    }
}
