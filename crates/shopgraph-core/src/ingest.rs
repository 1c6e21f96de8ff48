//! Transaction ingestion.
//!
//! A request moves through `Received -> Validated -> Mutated` and ends in
//! `Committed` or `Aborted`. There is no retry state; a failed request must
//! be resubmitted by the caller.

use std::fmt;

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::{ShopError, ShopResult};
use crate::schema::Transaction;
use crate::store::{AnalyticsStore, CommitReceipt};

/// Lifecycle of a single ingestion request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestState {
    Received,
    Validated,
    Mutated,
    Committed,
    Aborted,
}

impl IngestState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Received => "received",
            Self::Validated => "validated",
            Self::Mutated => "mutated",
            Self::Committed => "committed",
            Self::Aborted => "aborted",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Committed | Self::Aborted)
    }

    /// Check if transition to another state is valid.
    pub fn can_transition_to(&self, to: &Self) -> bool {
        matches!(
            (self, to),
            (Self::Received, Self::Validated)
                | (Self::Received, Self::Aborted)
                | (Self::Validated, Self::Mutated)
                | (Self::Validated, Self::Aborted)
                | (Self::Mutated, Self::Committed)
                | (Self::Mutated, Self::Aborted)
        )
    }
}

impl fmt::Display for IngestState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One ingestion request and the state it has reached.
#[derive(Debug)]
pub struct Ingestion {
    state: IngestState,
}

impl Default for Ingestion {
    fn default() -> Self {
        Self::new()
    }
}

/// A validated request: the typed transaction to write and the caller's
/// payload to echo back, both stamped with the server date.
#[derive(Debug, Clone)]
pub struct Submission {
    pub transaction: Transaction,
    pub echo: Value,
}

impl Ingestion {
    pub fn new() -> Self {
        Self { state: IngestState::Received }
    }

    pub fn state(&self) -> IngestState {
        self.state
    }

    fn advance(&mut self, to: IngestState) {
        debug_assert!(self.state.can_transition_to(&to), "{} -> {}", self.state, to);
        debug!(from = %self.state, to = %to, "Ingestion state change");
        self.state = to;
    }

    /// Parse and validate a request body, then stamp the server date.
    pub fn validate(&mut self, body: &[u8], now_millis: i64) -> ShopResult<Submission> {
        match parse_submission(body, now_millis) {
            Ok(submission) => {
                self.advance(IngestState::Validated);
                Ok(submission)
            }
            Err(e) => {
                self.advance(IngestState::Aborted);
                warn!(error = %e, "Transaction rejected");
                Err(e)
            }
        }
    }

    /// Submit the validated transaction as one atomic write.
    pub async fn commit(
        &mut self,
        store: &dyn AnalyticsStore,
        submission: &Submission,
    ) -> ShopResult<CommitReceipt> {
        self.advance(IngestState::Mutated);
        match store.ingest(&submission.transaction).await {
            Ok(receipt) => {
                self.advance(IngestState::Committed);
                info!(
                    transaction_uid = %receipt.transaction_uid,
                    products = submission.transaction.products.len(),
                    "Transaction ingested"
                );
                Ok(receipt)
            }
            Err(e) => {
                self.advance(IngestState::Aborted);
                warn!(error = %e, "Transaction ingestion aborted");
                Err(e)
            }
        }
    }
}

/// The echo is the caller's own JSON, so numbers and omitted fields come
/// back exactly as sent.
fn parse_submission(body: &[u8], now_millis: i64) -> ShopResult<Submission> {
    let malformed = |e: serde_json::Error| ShopError::invalid(format!("malformed transaction: {}", e));

    let mut echo: Value = serde_json::from_slice(body).map_err(malformed)?;
    let mut transaction = Transaction::deserialize(&echo).map_err(malformed)?;
    check_payload(&transaction)?;

    transaction.date = Some(now_millis);
    if let Some(object) = echo.as_object_mut() {
        object.insert("date".to_string(), Value::from(now_millis));
    }

    Ok(Submission { transaction, echo })
}

/// Reject payloads that parse but cannot be written.
fn check_payload(txn: &Transaction) -> ShopResult<()> {
    if txn.uid.is_some() {
        return Err(ShopError::invalid("transaction uid is assigned by the store"));
    }

    if txn.buyer.uid.is_none() && txn.buyer.name.trim().is_empty() {
        return Err(ShopError::invalid("buyer needs a uid or a name"));
    }

    for (i, product) in txn.products.iter().enumerate() {
        if product.uid.is_none() && product.name.trim().is_empty() {
            return Err(ShopError::invalid(format!("product {} needs a uid or a name", i)));
        }
        if !product.price.is_finite() || product.price < 0.0 {
            return Err(ShopError::invalid(format!(
                "product {} has an invalid price: {}",
                i, product.price
            )));
        }
    }

    Ok(())
}

/// Current wall-clock time in epoch milliseconds.
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = r#"{
        "buyer": {"name": "A", "age": 30},
        "ip": "1.2.3.4",
        "device": "web",
        "products": [{"name": "X", "price": 100}]
    }"#;

    #[test]
    fn test_validate_stamps_server_date() {
        let mut ingestion = Ingestion::new();
        let body = VALID.replace("\"device\"", "\"date\": 5, \"device\"");
        let submission = ingestion.validate(body.as_bytes(), 1_700_000_000_000).unwrap();
        assert_eq!(submission.transaction.date, Some(1_700_000_000_000));
        assert_eq!(submission.echo["date"], 1_700_000_000_000_i64);
        assert_eq!(ingestion.state(), IngestState::Validated);
    }

    #[test]
    fn test_echo_keeps_caller_json() {
        let mut ingestion = Ingestion::new();
        let mut submission = ingestion.validate(VALID.as_bytes(), 7).unwrap();
        assert_eq!(submission.echo["products"][0]["price"].to_string(), "100");

        submission.echo.as_object_mut().unwrap().remove("date");
        let sent: Value = serde_json::from_str(VALID).unwrap();
        assert_eq!(submission.echo, sent);
    }

    #[test]
    fn test_echo_omits_fields_of_referenced_nodes() {
        let mut ingestion = Ingestion::new();
        let body = r#"{"buyer": {"uid": "b1"}, "ip": "1.1.1.1", "device": "ios", "products": [{"uid": "p1"}]}"#;
        let submission = ingestion.validate(body.as_bytes(), 7).unwrap();

        assert_eq!(submission.echo["buyer"], serde_json::json!({"uid": "b1"}));
        assert_eq!(submission.echo["products"][0], serde_json::json!({"uid": "p1"}));
        assert_eq!(submission.transaction.buyer.uid.as_deref(), Some("b1"));
    }

    #[test]
    fn test_malformed_body_aborts() {
        let mut ingestion = Ingestion::new();
        let err = ingestion.validate(b"{\"buyer\": ", 1).unwrap_err();
        assert!(err.is_client_error());
        assert_eq!(ingestion.state(), IngestState::Aborted);
    }

    #[test]
    fn test_rejects_unwritable_payloads() {
        let cases = [
            r#"{"buyer": {"age": 3}, "ip": "", "device": "", "products": []}"#,
            r#"{"uid": "t1", "buyer": {"name": "A"}, "products": []}"#,
            r#"{"buyer": {"name": "A"}, "products": [{"name": "X", "price": -1}]}"#,
            r#"{"buyer": {"name": "A"}, "products": [{"price": 1}]}"#,
        ];
        for case in cases {
            let mut ingestion = Ingestion::new();
            assert!(ingestion.validate(case.as_bytes(), 1).is_err(), "accepted {}", case);
        }
    }

    #[test]
    fn test_empty_product_list_is_valid() {
        let mut ingestion = Ingestion::new();
        let body = r#"{"buyer": {"uid": "b1"}, "ip": "1.1.1.1", "device": "ios", "products": []}"#;
        assert!(ingestion.validate(body.as_bytes(), 1).is_ok());
    }

    #[test]
    fn test_state_transitions() {
        assert!(IngestState::Received.can_transition_to(&IngestState::Validated));
        assert!(IngestState::Mutated.can_transition_to(&IngestState::Aborted));
        assert!(!IngestState::Committed.can_transition_to(&IngestState::Mutated));
        assert!(!IngestState::Aborted.can_transition_to(&IngestState::Validated));
        assert!(IngestState::Aborted.is_terminal());
    }
}
