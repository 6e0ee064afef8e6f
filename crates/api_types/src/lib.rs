use serde::{Deserialize, Serialize};

pub mod timestamp;

pub use timestamp::Timestamp;

/// Body returned by the backend on every non-2xx response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    #[serde(default, alias = "error")]
    pub message: Option<String>,
    #[serde(default)]
    pub error_code: Option<String>,
}

pub mod page {
    use super::*;

    /// One page of a server-side paginated collection. Pages are 0-indexed.
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct PaginatedResponse<T> {
        #[serde(default = "Vec::new")]
        pub content: Vec<T>,
        #[serde(default)]
        pub total_elements: u64,
        #[serde(default)]
        pub total_pages: u32,
        #[serde(default)]
        pub size: u32,
        #[serde(default)]
        pub number: u32,
        #[serde(default)]
        pub empty: bool,
    }

    impl<T> PaginatedResponse<T> {
        /// An empty page at `number` with the requested `size`.
        pub fn empty(number: u32, size: u32) -> Self {
            Self {
                content: Vec::new(),
                total_elements: 0,
                total_pages: 0,
                size,
                number,
                empty: true,
            }
        }

        /// Restores the envelope invariants after decoding a server payload:
        /// `empty` follows `content`, `size` is never below the row count.
        pub fn normalized(mut self) -> Self {
            self.empty = self.content.is_empty();
            let len = self.content.len() as u32;
            if self.size < len {
                self.size = len;
            }
            self
        }

        pub fn len(&self) -> usize {
            self.content.len()
        }

        pub fn is_empty(&self) -> bool {
            self.content.is_empty()
        }

        pub fn has_next(&self) -> bool {
            self.number.saturating_add(1) < self.total_pages
        }
    }

    impl<T> Default for PaginatedResponse<T> {
        fn default() -> Self {
            Self::empty(0, 0)
        }
    }
}

pub mod bulk_load {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(rename_all = "UPPERCASE")]
    pub enum ProcessStatus {
        Pending,
        Processing,
        Completed,
        Failed,
        #[serde(other)]
        Unknown,
    }

    impl ProcessStatus {
        pub const ALL: [ProcessStatus; 4] = [
            ProcessStatus::Completed,
            ProcessStatus::Processing,
            ProcessStatus::Failed,
            ProcessStatus::Pending,
        ];

        pub fn as_str(self) -> &'static str {
            match self {
                Self::Pending => "PENDING",
                Self::Processing => "PROCESSING",
                Self::Completed => "COMPLETED",
                Self::Failed => "FAILED",
                Self::Unknown => "UNKNOWN",
            }
        }
    }

    /// Response of `POST /bulk-load/clients`.
    #[derive(Debug, Clone, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct BulkLoadResponse {
        pub process_id: String,
        #[serde(default)]
        pub status: Option<String>,
        #[serde(default)]
        pub success_count: u64,
        #[serde(default)]
        pub error_count: u64,
        #[serde(default)]
        pub message: Option<String>,
    }

    /// One row of the process history.
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct BulkLoadProcess {
        #[serde(default)]
        pub id: Option<i64>,
        pub process_id: String,
        #[serde(default)]
        pub file_name: Option<String>,
        pub status: ProcessStatus,
        #[serde(default)]
        pub total_records: u64,
        #[serde(default)]
        pub successful_count: u64,
        #[serde(default)]
        pub error_count: u64,
        #[serde(default)]
        pub processing_date: Option<Timestamp>,
    }

    /// Response of `GET /bulk-load/statistics/{processId}`.
    #[derive(Debug, Clone, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct BulkLoadStatistics {
        #[serde(default)]
        pub process_id: Option<String>,
        #[serde(default)]
        pub successful_count: u64,
        #[serde(default)]
        pub error_count: u64,
        #[serde(default)]
        pub total_count: u64,
        #[serde(default)]
        pub message: Option<String>,
        #[serde(default)]
        pub processed_at: Option<Timestamp>,
    }

    /// Response of `GET /processes/{processId}/details`.
    #[derive(Debug, Clone, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ProcessDetails {
        pub process_id: String,
        #[serde(default)]
        pub file_name: Option<String>,
        pub status: ProcessStatus,
        #[serde(default)]
        pub total_records: u64,
        #[serde(default)]
        pub successful_count: u64,
        #[serde(default)]
        pub error_count: u64,
        #[serde(default)]
        pub processing_date: Option<Timestamp>,
    }

    impl ProcessDetails {
        /// Share of successful records, rounded to the nearest percent.
        pub fn success_percentage(&self) -> u8 {
            success_percentage(self.successful_count, self.total_records)
        }
    }

    impl From<BulkLoadProcess> for ProcessDetails {
        fn from(process: BulkLoadProcess) -> Self {
            Self {
                process_id: process.process_id,
                file_name: process.file_name,
                status: process.status,
                total_records: process.total_records,
                successful_count: process.successful_count,
                error_count: process.error_count,
                processing_date: process.processing_date,
            }
        }
    }

    /// Response of `GET /processes/{processId}/status`.
    #[derive(Debug, Clone, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ProcessStatusView {
        #[serde(default)]
        pub process_id: Option<String>,
        pub status: ProcessStatus,
    }

    pub fn success_percentage(successful: u64, total: u64) -> u8 {
        if total == 0 {
            return 0;
        }
        let pct = (successful as f64 / total as f64 * 100.0).round();
        pct.clamp(0.0, 100.0) as u8
    }

    /// One validation failure recorded while parsing an uploaded file.
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct BulkLoadError {
        #[serde(default)]
        pub id: Option<i64>,
        #[serde(default, alias = "rowNumber")]
        pub line_number: u64,
        #[serde(default)]
        pub error_code: Option<String>,
        #[serde(default)]
        pub error_message: String,
        #[serde(default)]
        pub error_type: Option<String>,
        #[serde(default, alias = "field")]
        pub field_name: Option<String>,
        #[serde(default)]
        pub id_type: Option<String>,
        #[serde(default)]
        pub id_number: Option<String>,
    }
}

pub mod client {
    use super::*;

    /// Account opened for an imported client.
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Account {
        #[serde(default)]
        pub id: Option<i64>,
        pub account_number: String,
        #[serde(default, deserialize_with = "crate::decimal::lenient")]
        pub payroll_value: Option<f64>,
        #[serde(default)]
        pub status: Option<String>,
        #[serde(default, deserialize_with = "crate::decimal::lenient")]
        pub balance: Option<f64>,
    }

    /// First payroll payment of an account.
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct PayrollPayment {
        #[serde(default)]
        pub id: Option<i64>,
        #[serde(default)]
        pub account_id: Option<i64>,
        #[serde(default)]
        pub payment_date: Option<Timestamp>,
        #[serde(default, deserialize_with = "crate::decimal::lenient")]
        pub amount: Option<f64>,
        #[serde(default)]
        pub status: Option<String>,
    }

    /// One imported customer record.
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ClientDetail {
        #[serde(default)]
        pub id: Option<i64>,
        pub client_code: String,
        #[serde(default)]
        pub id_type: String,
        #[serde(default)]
        pub id_number: String,
        #[serde(default, alias = "firstName")]
        pub first_names: String,
        #[serde(default, alias = "lastName")]
        pub last_names: String,
        #[serde(default)]
        pub birth_date: Option<Timestamp>,
        #[serde(default)]
        pub join_date: Option<Timestamp>,
        #[serde(default)]
        pub email: Option<String>,
        #[serde(default)]
        pub phone_number: Option<String>,
        #[serde(default)]
        pub process_id: Option<String>,
        #[serde(default)]
        pub account: Option<Account>,
    }

    impl ClientDetail {
        pub fn full_name(&self) -> String {
            format!("{} {}", self.first_names.trim(), self.last_names.trim())
                .trim()
                .to_string()
        }
    }

    /// Human label of an identification type code.
    pub fn id_type_label(id_type: &str) -> &'static str {
        match id_type.trim().to_ascii_uppercase().as_str() {
            "C" => "Cedula",
            "P" => "Passport",
            "N" => "Tax id",
            _ => "Other",
        }
    }
}

pub mod health {
    use std::collections::BTreeMap;

    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "UPPERCASE")]
    pub enum HealthStatus {
        Up,
        Down,
    }

    impl HealthStatus {
        pub fn as_str(self) -> &'static str {
            match self {
                Self::Up => "UP",
                Self::Down => "DOWN",
            }
        }
    }

    /// Response of `GET /health`.
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct HealthResponse {
        pub status: HealthStatus,
        #[serde(default)]
        pub timestamp: Option<Timestamp>,
        #[serde(default)]
        pub service: String,
        #[serde(default)]
        pub version: String,
        #[serde(default)]
        pub checks: BTreeMap<String, String>,
    }

    impl HealthResponse {
        /// Status published when the backend cannot be reached.
        pub fn down(service: &str, version: &str) -> Self {
            let mut checks = BTreeMap::new();
            checks.insert("database".to_string(), HealthStatus::Down.as_str().to_string());
            Self {
                status: HealthStatus::Down,
                timestamp: Some(Timestamp::now()),
                service: service.to_string(),
                version: version.to_string(),
                checks,
            }
        }

        pub fn is_up(&self) -> bool {
            self.status == HealthStatus::Up
        }
    }

    /// Response of `/health/ready` and `/health/live`.
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct ProbeResponse {
        pub status: String,
        #[serde(default)]
        pub timestamp: Option<Timestamp>,
    }

    impl ProbeResponse {
        pub fn degraded(status: &str) -> Self {
            Self {
                status: status.to_string(),
                timestamp: Some(Timestamp::now()),
            }
        }
    }
}

mod decimal {
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
    }

    /// Accepts `12.5`, `"12.5"` or `null`; the backend serializes decimals
    /// both ways depending on the endpoint.
    pub(crate) fn lenient<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<Raw>::deserialize(deserializer)?;
        Ok(match raw {
            Some(Raw::Number(value)) => Some(value),
            Some(Raw::Text(text)) => text.trim().parse().ok(),
            None => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{
        bulk_load::{BulkLoadError, BulkLoadProcess, ProcessStatus, success_percentage},
        client::ClientDetail,
        health::{HealthResponse, HealthStatus},
        page::PaginatedResponse,
    };

    #[test]
    fn page_decodes_and_normalizes_empty_flag() {
        let json = concat!(
            r#"{"content":[],"totalElements":0,"totalPages":0,"#,
            r#""size":10,"number":0,"empty":false}"#
        );
        let page: PaginatedResponse<BulkLoadProcess> = serde_json::from_str(json).unwrap();
        let page = page.normalized();
        assert!(page.empty);
        assert_eq!(page.size, 10);
    }

    #[test]
    fn has_next_saturates_on_huge_page_number() {
        let json = concat!(
            r#"{"content":[],"totalElements":0,"totalPages":3,"#,
            r#""size":10,"number":4294967295}"#
        );
        let page: PaginatedResponse<BulkLoadProcess> = serde_json::from_str(json).unwrap();
        assert!(!page.has_next());

        let page = PaginatedResponse::<BulkLoadProcess> {
            number: 1,
            total_pages: 3,
            ..PaginatedResponse::empty(1, 10)
        };
        assert!(page.has_next());
    }

    #[test]
    fn unknown_process_status_does_not_fail_decoding() {
        let json = r#"{"processId":"p1","status":"ARCHIVED"}"#;
        let process: BulkLoadProcess = serde_json::from_str(json).unwrap();
        assert_eq!(process.status, ProcessStatus::Unknown);
    }

    #[test]
    fn error_accepts_row_number_alias() {
        let json = concat!(
            r#"{"rowNumber":7,"errorMessage":"bad email","#,
            r#""errorType":"VALIDATION","idType":"C"}"#
        );
        let error: BulkLoadError = serde_json::from_str(json).unwrap();
        assert_eq!(error.line_number, 7);
        assert_eq!(error.id_type.as_deref(), Some("C"));
    }

    #[test]
    fn client_decodes_string_payroll_value() {
        let json = r#"{"clientCode":"C-1","firstNames":"Ana","lastNames":"Ruiz",
            "account":{"accountNumber":"001","payrollValue":"2500000.00","status":"ACTIVE"}}"#;
        let client: ClientDetail = serde_json::from_str(json).unwrap();
        assert_eq!(client.full_name(), "Ana Ruiz");
        let account = client.account.unwrap();
        assert_eq!(account.payroll_value, Some(2_500_000.0));
    }

    #[test]
    fn down_fallback_is_renderable() {
        let health = HealthResponse::down("svc", "1.0.0");
        assert_eq!(health.status, HealthStatus::Down);
        assert_eq!(health.checks.get("database").map(String::as_str), Some("DOWN"));
        assert!(health.timestamp.is_some());
    }

    #[test]
    fn success_percentage_rounds_and_handles_zero() {
        assert_eq!(success_percentage(18, 20), 90);
        assert_eq!(success_percentage(1, 3), 33);
        assert_eq!(success_percentage(5, 0), 0);
    }
}
