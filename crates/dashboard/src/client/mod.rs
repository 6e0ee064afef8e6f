mod error;

use std::{future::Future, time::Duration};

use api_types::{
    ErrorBody,
    bulk_load::{
        BulkLoadError, BulkLoadProcess, BulkLoadResponse, BulkLoadStatistics, ProcessDetails,
        ProcessStatusView,
    },
    client::{Account, ClientDetail, PayrollPayment},
    health::{HealthResponse, ProbeResponse},
    page::PaginatedResponse,
};
use reqwest::{StatusCode, Url, header::CONTENT_TYPE};
use serde::de::DeserializeOwned;

use crate::error::{AppError, Result};

pub use error::ClientError;

pub type ClientResult<T> = std::result::Result<T, ClientError>;

/// A file picked for upload: its name and raw contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

/// REST operations the dashboard consumes.
///
/// Implemented by [`Client`] over HTTP; controllers and task scopes only see
/// this trait.
pub trait Gateway: Clone + Send + Sync + 'static {
    fn upload_clients(
        &self,
        file: &UploadFile,
    ) -> impl Future<Output = ClientResult<BulkLoadResponse>> + Send;

    fn statistics(
        &self,
        process_id: &str,
    ) -> impl Future<Output = ClientResult<BulkLoadStatistics>> + Send;

    fn all_clients(
        &self,
        page: u32,
        size: u32,
    ) -> impl Future<Output = ClientResult<PaginatedResponse<ClientDetail>>> + Send;

    fn process_clients(
        &self,
        process_id: &str,
        page: u32,
        size: u32,
    ) -> impl Future<Output = ClientResult<PaginatedResponse<ClientDetail>>> + Send;

    fn client_by_id(&self, id: i64) -> impl Future<Output = ClientResult<ClientDetail>> + Send;

    fn client_by_code(&self, code: &str)
    -> impl Future<Output = ClientResult<ClientDetail>> + Send;

    fn account_by_client(
        &self,
        client_id: i64,
    ) -> impl Future<Output = ClientResult<Account>> + Send;

    fn first_payment(
        &self,
        account_id: i64,
    ) -> impl Future<Output = ClientResult<PayrollPayment>> + Send;

    fn processes(
        &self,
        page: u32,
        size: u32,
    ) -> impl Future<Output = ClientResult<PaginatedResponse<BulkLoadProcess>>> + Send;

    fn process_details(
        &self,
        process_id: &str,
    ) -> impl Future<Output = ClientResult<ProcessDetails>> + Send;

    fn process_status(
        &self,
        process_id: &str,
    ) -> impl Future<Output = ClientResult<ProcessStatusView>> + Send;

    fn process_errors(
        &self,
        process_id: &str,
        page: u32,
        size: u32,
    ) -> impl Future<Output = ClientResult<PaginatedResponse<BulkLoadError>>> + Send;

    fn health(&self) -> impl Future<Output = ClientResult<HealthResponse>> + Send;

    fn readiness(&self) -> impl Future<Output = ClientResult<ProbeResponse>> + Send;

    fn liveness(&self) -> impl Future<Output = ClientResult<ProbeResponse>> + Send;
}

#[derive(Debug, Clone)]
pub struct Client {
    base_url: Url,
    http: reqwest::Client,
}

impl Client {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|err| AppError::Setting(format!("invalid base_url: {err}")))?;
        if base_url.cannot_be_a_base() {
            return Err(AppError::Setting(format!(
                "invalid base_url: {base_url} cannot be a base"
            )));
        }
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { base_url, http })
    }

    /// Appends percent-encoded path segments to the base URL.
    fn endpoint(&self, segments: &[&str]) -> ClientResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ClientError::Url(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn paged_endpoint(&self, segments: &[&str], page: u32, size: u32) -> ClientResult<Url> {
        let mut url = self.endpoint(segments)?;
        url.query_pairs_mut()
            .append_pair("page", &page.to_string())
            .append_pair("size", &size.to_string());
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        url: ClientResult<Url>,
    ) -> ClientResult<T> {
        let result = match url {
            Ok(url) => {
                tracing::debug!(operation, %url, "GET");
                let res = self.http.get(url).send().await;
                decode(res).await
            }
            Err(err) => Err(err),
        };
        log_failure(operation, result)
    }

    async fn get_page<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        url: ClientResult<Url>,
        page: u32,
        size: u32,
    ) -> ClientResult<PaginatedResponse<T>> {
        match self.get_json::<PaginatedResponse<T>>(operation, url).await {
            Ok(data) => Ok(data.normalized()),
            // Unknown process ids list as empty rather than failing the view.
            Err(err) if err.is_not_found() => Ok(PaginatedResponse::empty(page, size)),
            Err(err) => Err(err),
        }
    }
}

impl Gateway for Client {
    async fn upload_clients(&self, file: &UploadFile) -> ClientResult<BulkLoadResponse> {
        const OPERATION: &str = "upload_clients";
        let name = file.name.trim();
        if name.is_empty() {
            return log_failure(OPERATION, Err(ClientError::MissingParameter("file")));
        }

        let result = match self.endpoint(&["bulk-load", "clients"]) {
            Ok(mut url) => {
                url.query_pairs_mut().append_pair("fileName", name);
                tracing::debug!(operation = OPERATION, %url, bytes = file.bytes.len(), "POST");
                let res = self
                    .http
                    .post(url)
                    .header(CONTENT_TYPE, "text/plain")
                    .body(file.bytes.clone())
                    .send()
                    .await;
                decode(res).await
            }
            Err(err) => Err(err),
        };
        log_failure(OPERATION, result)
    }

    async fn statistics(&self, process_id: &str) -> ClientResult<BulkLoadStatistics> {
        const OPERATION: &str = "statistics";
        let process_id = require(OPERATION, "process id", process_id)?;
        self.get_json(
            OPERATION,
            self.endpoint(&["bulk-load", "statistics", process_id]),
        )
        .await
    }

    async fn all_clients(
        &self,
        page: u32,
        size: u32,
    ) -> ClientResult<PaginatedResponse<ClientDetail>> {
        self.get_page(
            "all_clients",
            self.paged_endpoint(&["clients"], page, size),
            page,
            size,
        )
        .await
    }

    async fn process_clients(
        &self,
        process_id: &str,
        page: u32,
        size: u32,
    ) -> ClientResult<PaginatedResponse<ClientDetail>> {
        const OPERATION: &str = "process_clients";
        let process_id = require(OPERATION, "process id", process_id)?;
        self.get_page(
            OPERATION,
            self.paged_endpoint(&["processes", process_id, "clients"], page, size),
            page,
            size,
        )
        .await
    }

    async fn client_by_id(&self, id: i64) -> ClientResult<ClientDetail> {
        self.get_json("client_by_id", self.endpoint(&["clients", &id.to_string()]))
            .await
    }

    async fn client_by_code(&self, code: &str) -> ClientResult<ClientDetail> {
        const OPERATION: &str = "client_by_code";
        let code = require(OPERATION, "client code", code)?;
        self.get_json(OPERATION, self.endpoint(&["clients", "code", code]))
            .await
    }

    async fn account_by_client(&self, client_id: i64) -> ClientResult<Account> {
        self.get_json(
            "account_by_client",
            self.endpoint(&["accounts", "client", &client_id.to_string()]),
        )
        .await
    }

    async fn first_payment(&self, account_id: i64) -> ClientResult<PayrollPayment> {
        // The backend reuses the `client` segment for an account id here.
        self.get_json(
            "first_payment",
            self.endpoint(&["accounts", "client", &account_id.to_string(), "first-payment"]),
        )
        .await
    }

    async fn processes(
        &self,
        page: u32,
        size: u32,
    ) -> ClientResult<PaginatedResponse<BulkLoadProcess>> {
        self.get_json::<PaginatedResponse<BulkLoadProcess>>(
            "processes",
            self.paged_endpoint(&["processes"], page, size),
        )
        .await
        .map(PaginatedResponse::normalized)
    }

    async fn process_details(&self, process_id: &str) -> ClientResult<ProcessDetails> {
        const OPERATION: &str = "process_details";
        let process_id = require(OPERATION, "process id", process_id)?;
        self.get_json(OPERATION, self.endpoint(&["processes", process_id, "details"]))
            .await
    }

    async fn process_status(&self, process_id: &str) -> ClientResult<ProcessStatusView> {
        const OPERATION: &str = "process_status";
        let process_id = require(OPERATION, "process id", process_id)?;
        self.get_json(OPERATION, self.endpoint(&["processes", process_id, "status"]))
            .await
    }

    async fn process_errors(
        &self,
        process_id: &str,
        page: u32,
        size: u32,
    ) -> ClientResult<PaginatedResponse<BulkLoadError>> {
        const OPERATION: &str = "process_errors";
        let process_id = require(OPERATION, "process id", process_id)?;
        self.get_page(
            OPERATION,
            self.paged_endpoint(&["processes", process_id, "errors"], page, size),
            page,
            size,
        )
        .await
    }

    async fn health(&self) -> ClientResult<HealthResponse> {
        const OPERATION: &str = "health";
        let url = match self.endpoint(&["health"]) {
            Ok(url) => url,
            Err(err) => return log_failure(OPERATION, Err(err)),
        };
        tracing::debug!(operation = OPERATION, %url, "GET");
        let res = match self.http.get(url).send().await {
            Ok(res) => res,
            Err(err) => return log_failure(OPERATION, Err(ClientError::from_reqwest(err))),
        };
        // A degraded backend answers 503 with a full health body.
        if res.status() == StatusCode::SERVICE_UNAVAILABLE {
            let body = res.text().await.unwrap_or_default();
            if let Ok(health) = serde_json::from_str::<HealthResponse>(&body) {
                return Ok(health);
            }
            return log_failure(OPERATION, Err(status_error(503, &body)));
        }
        log_failure(OPERATION, decode(Ok(res)).await)
    }

    async fn readiness(&self) -> ClientResult<ProbeResponse> {
        self.get_json("readiness", self.endpoint(&["health", "ready"]))
            .await
    }

    async fn liveness(&self) -> ClientResult<ProbeResponse> {
        self.get_json("liveness", self.endpoint(&["health", "live"]))
            .await
    }
}

async fn decode<T: DeserializeOwned>(
    res: std::result::Result<reqwest::Response, reqwest::Error>,
) -> ClientResult<T> {
    let res = res.map_err(ClientError::from_reqwest)?;
    let status = res.status();
    if status.is_success() {
        let body = res.bytes().await.map_err(ClientError::from_reqwest)?;
        return serde_json::from_slice::<T>(&body)
            .map_err(|err| ClientError::Decode(err.to_string()));
    }

    let body = res.text().await.unwrap_or_default();
    Err(status_error(status.as_u16(), &body))
}

fn status_error(status: u16, body: &str) -> ClientError {
    let message = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|body| body.message)
        .filter(|message| !message.trim().is_empty());
    ClientError::Status { status, message }
}

fn require<'a>(
    operation: &'static str,
    name: &'static str,
    value: &'a str,
) -> ClientResult<&'a str> {
    let value = value.trim();
    if value.is_empty() {
        return log_failure(operation, Err(ClientError::MissingParameter(name)));
    }
    Ok(value)
}

fn log_failure<T>(operation: &'static str, result: ClientResult<T>) -> ClientResult<T> {
    if let Err(err) = &result {
        tracing::warn!(operation, "request failed: {err}");
    }
    result
}
