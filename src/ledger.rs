//! Best-effort mirror of access events to an external tamper-evident
//! ledger.
//!
//! `notify` performs the call and returns the confirmation; `dispatch`
//! is the interface the request handlers use — it spawns the call,
//! logs the outcome, and never surfaces a failure. Primary-path
//! correctness must never depend on the ledger being reachable.

use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Ledger request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Ledger rejected the event with status {status}")]
    Rejected { status: u16 },
}

#[derive(Debug, Serialize)]
struct LedgerEvent<'a> {
    subject: &'a str,
    accessor: &'a str,
    action: &'a str,
    timestamp: String,
}

#[derive(Clone)]
enum LedgerMode {
    /// No endpoint configured: return a synthetic confirmation.
    Stub,
    Http {
        endpoint: String,
        client: reqwest::Client,
    },
}

#[derive(Clone)]
pub struct LedgerClient {
    mode: LedgerMode,
}

impl LedgerClient {
    pub fn stub() -> Self {
        Self { mode: LedgerMode::Stub }
    }

    pub fn http(endpoint: String) -> Self {
        Self {
            mode: LedgerMode::Http {
                endpoint,
                client: reqwest::Client::new(),
            },
        }
    }

    /// Record one access event and return the confirmation token.
    pub async fn notify(
        &self,
        subject: &str,
        accessor: &str,
        action: &str,
    ) -> Result<String, LedgerError> {
        match &self.mode {
            LedgerMode::Stub => {
                tracing::debug!(subject, accessor, action, "ledger stub, synthetic confirmation");
                Ok(format!("stub-tx-{}", Uuid::new_v4().simple()))
            }
            LedgerMode::Http { endpoint, client } => {
                let event = LedgerEvent {
                    subject,
                    accessor,
                    action,
                    timestamp: chrono::Utc::now().to_rfc3339(),
                };
                let response = client.post(endpoint).json(&event).send().await?;
                let status = response.status();
                if !status.is_success() {
                    return Err(LedgerError::Rejected { status: status.as_u16() });
                }
                let body: Option<serde_json::Value> = response.json().await.ok();
                let confirmation = body
                    .as_ref()
                    .and_then(|v| v.get("transaction_hash"))
                    .and_then(|v| v.as_str())
                    .unwrap_or("confirmed")
                    .to_string();
                Ok(confirmation)
            }
        }
    }

    /// Fire-and-forget notification. Runs detached from the response
    /// path; failures are logged at `warn` and swallowed.
    pub fn dispatch(&self, subject: &str, accessor: &str, action: &'static str) {
        let client = self.clone();
        let subject = subject.to_string();
        let accessor = accessor.to_string();
        tokio::spawn(async move {
            match client.notify(&subject, &accessor, action).await {
                Ok(confirmation) => {
                    tracing::debug!(%subject, %accessor, action, %confirmation, "ledger notified");
                }
                Err(e) => {
                    tracing::warn!(%subject, %accessor, action, error = %e, "ledger notification failed");
                }
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn stub_returns_synthetic_confirmation() {
        let ledger = LedgerClient::stub();
        let confirmation = ledger.notify("a@x.com/report.pdf", "d@y.com", "download").await.unwrap();
        assert!(confirmation.starts_with("stub-tx-"));
    }

    #[tokio::test]
    async fn stub_confirmations_are_unique() {
        let ledger = LedgerClient::stub();
        let a = ledger.notify("s", "a", "x").await.unwrap();
        let b = ledger.notify("s", "a", "x").await.unwrap();
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn unreachable_endpoint_fails_notify_but_not_dispatch() {
        // Reserved TEST-NET address: connection refused or unroutable.
        let ledger = LedgerClient::http("http://127.0.0.1:1/log".to_string());
        assert!(ledger.notify("s", "a", "x").await.is_err());

        // dispatch must swallow the same failure.
        ledger.dispatch("s", "a", "x");
        tokio::task::yield_now().await;
    }
}
