use api_types::client::{Account, ClientDetail, PayrollPayment};

use crate::client::ClientResult;

/// The next fetch a client-details dialog needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientFetch {
    ByCode(String),
    ById(i64),
    Account { client_id: i64 },
    FirstPayment { account_id: i64 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientRequest {
    pub generation: u64,
    pub fetch: ClientFetch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Client,
    Account,
    FirstPayment,
    Done,
}

/// Client-details dialog.
///
/// The base record is shown as soon as it is known. The account and then the
/// first payment are fetched in sequence; a failed stage only stops the
/// stages after it and leaves a notice.
#[derive(Debug)]
pub struct ClientDetailsController {
    client: Option<ClientDetail>,
    lookup: Option<ClientFetch>,
    enrich: bool,
    account: Option<Account>,
    first_payment: Option<PayrollPayment>,
    stage: Stage,
    notices: Vec<String>,
    error: Option<String>,
    generation: u64,
}

impl ClientDetailsController {
    /// The record is already complete; nothing is fetched.
    pub fn simple(client: ClientDetail) -> Self {
        let account = client.account.clone();
        Self {
            client: Some(client),
            lookup: None,
            enrich: false,
            account,
            first_payment: None,
            stage: Stage::Done,
            notices: Vec::new(),
            error: None,
            generation: 0,
        }
    }

    /// Shows `client` and enriches it with account and first payment.
    pub fn enriched(client: ClientDetail) -> Self {
        let mut this = Self::simple(client);
        this.enrich = true;
        this.stage = Stage::Account;
        this
    }

    /// Looks the client up by code first, then enriches it.
    pub fn by_code(code: &str) -> Self {
        Self::lookup(ClientFetch::ByCode(code.trim().to_string()))
    }

    pub fn by_id(id: i64) -> Self {
        Self::lookup(ClientFetch::ById(id))
    }

    fn lookup(fetch: ClientFetch) -> Self {
        Self {
            client: None,
            lookup: Some(fetch),
            enrich: true,
            account: None,
            first_payment: None,
            stage: Stage::Client,
            notices: Vec::new(),
            error: None,
            generation: 0,
        }
    }

    /// First request of the dialog, if any.
    pub fn start(&mut self) -> Option<ClientRequest> {
        match self.stage {
            Stage::Client => {
                let fetch = self.lookup.clone()?;
                Some(self.issue(fetch))
            }
            Stage::Account => self.account_request(),
            Stage::FirstPayment | Stage::Done => None,
        }
    }

    pub fn apply_client(
        &mut self,
        generation: u64,
        result: ClientResult<ClientDetail>,
    ) -> Option<ClientRequest> {
        if generation != self.generation || self.stage != Stage::Client {
            return None;
        }
        match result {
            Ok(client) => {
                self.account = client.account.clone();
                self.client = Some(client);
                self.stage = Stage::Account;
                self.account_request()
            }
            Err(err) => {
                self.error = Some(err.user_message());
                self.stage = Stage::Done;
                None
            }
        }
    }

    pub fn apply_account(
        &mut self,
        generation: u64,
        result: ClientResult<Account>,
    ) -> Option<ClientRequest> {
        if generation != self.generation || self.stage != Stage::Account {
            return None;
        }
        match result {
            Ok(account) => {
                let account_id = account.id;
                self.account = Some(account);
                match account_id {
                    Some(account_id) => {
                        self.stage = Stage::FirstPayment;
                        Some(self.issue(ClientFetch::FirstPayment { account_id }))
                    }
                    None => {
                        self.stage = Stage::Done;
                        None
                    }
                }
            }
            Err(err) => {
                self.notices
                    .push(format!("Account not available: {}", err.user_message()));
                self.stage = Stage::Done;
                None
            }
        }
    }

    pub fn apply_first_payment(&mut self, generation: u64, result: ClientResult<PayrollPayment>) {
        if generation != self.generation || self.stage != Stage::FirstPayment {
            return;
        }
        match result {
            Ok(payment) => self.first_payment = Some(payment),
            Err(err) => self
                .notices
                .push(format!("First payment not available: {}", err.user_message())),
        }
        self.stage = Stage::Done;
    }

    pub fn client(&self) -> Option<&ClientDetail> {
        self.client.as_ref()
    }

    pub fn account(&self) -> Option<&Account> {
        self.account.as_ref()
    }

    pub fn first_payment(&self) -> Option<&PayrollPayment> {
        self.first_payment.as_ref()
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn is_loading(&self) -> bool {
        self.stage != Stage::Done
    }

    pub fn notices(&self) -> &[String] {
        &self.notices
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    fn account_request(&mut self) -> Option<ClientRequest> {
        if !self.enrich {
            self.stage = Stage::Done;
            return None;
        }
        match self.client.as_ref().and_then(|client| client.id) {
            Some(client_id) => Some(self.issue(ClientFetch::Account { client_id })),
            None => {
                self.stage = Stage::Done;
                None
            }
        }
    }

    fn issue(&mut self, fetch: ClientFetch) -> ClientRequest {
        self.generation += 1;
        ClientRequest {
            generation: self.generation,
            fetch,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{client::ClientError, controllers::filters::tests::client};

    fn account(id: Option<i64>) -> Account {
        Account {
            id,
            account_number: "001-22".to_string(),
            payroll_value: Some(2_500_000.0),
            status: Some("ACTIVE".to_string()),
            balance: None,
        }
    }

    fn with_id(id: i64) -> ClientDetail {
        let mut detail = client("C-1", "Ana", "Ruiz");
        detail.id = Some(id);
        detail
    }

    #[test]
    fn simple_variant_fetches_nothing() {
        let mut dialog = ClientDetailsController::simple(with_id(1));
        assert_eq!(dialog.start(), None);
        assert!(!dialog.is_loading());
        assert_eq!(dialog.client().map(|c| c.client_code.as_str()), Some("C-1"));
    }

    #[test]
    fn enrichment_chains_account_then_first_payment() {
        let mut dialog = ClientDetailsController::enriched(with_id(7));
        let req = dialog.start().unwrap();
        assert_eq!(req.fetch, ClientFetch::Account { client_id: 7 });

        let next = dialog.apply_account(req.generation, Ok(account(Some(42)))).unwrap();
        assert_eq!(next.fetch, ClientFetch::FirstPayment { account_id: 42 });

        let payment = PayrollPayment {
            id: Some(1),
            account_id: Some(42),
            payment_date: None,
            amount: Some(100.0),
            status: None,
        };
        dialog.apply_first_payment(next.generation, Ok(payment));
        assert_eq!(dialog.stage(), Stage::Done);
        assert!(dialog.first_payment().is_some());
        assert!(dialog.notices().is_empty());
    }

    #[test]
    fn account_failure_keeps_client_and_skips_payment() {
        let mut dialog = ClientDetailsController::enriched(with_id(7));
        let req = dialog.start().unwrap();
        let next = dialog.apply_account(
            req.generation,
            Err(ClientError::Status {
                status: 404,
                message: None,
            }),
        );
        assert_eq!(next, None);
        assert!(dialog.client().is_some());
        assert_eq!(dialog.error(), None);
        assert_eq!(dialog.notices().len(), 1);
        assert!(!dialog.is_loading());
    }

    #[test]
    fn lookup_by_code_then_enriches() {
        let mut dialog = ClientDetailsController::by_code(" C-1 ");
        let req = dialog.start().unwrap();
        assert_eq!(req.fetch, ClientFetch::ByCode("C-1".to_string()));
        let next = dialog.apply_client(req.generation, Ok(with_id(3))).unwrap();
        assert_eq!(next.fetch, ClientFetch::Account { client_id: 3 });
    }

    #[test]
    fn failed_lookup_is_an_error() {
        let mut dialog = ClientDetailsController::by_id(9);
        let req = dialog.start().unwrap();
        dialog.apply_client(req.generation, Err(ClientError::Timeout));
        assert!(dialog.error().is_some());
        assert!(dialog.client().is_none());
        assert!(!dialog.is_loading());
    }

    #[test]
    fn stale_stage_response_is_ignored() {
        let mut dialog = ClientDetailsController::enriched(with_id(7));
        let req = dialog.start().unwrap();
        assert_eq!(dialog.apply_account(req.generation + 1, Ok(account(Some(1)))), None);
        assert_eq!(dialog.stage(), Stage::Account);
    }
}
