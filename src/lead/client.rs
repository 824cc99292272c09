//! Outbound lead submission.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::SubmissionError;

/// Contact details posted to the lead endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lead {
    pub name: String,
    pub email: String,
    pub phone: String,
}

/// Somewhere leads can be delivered.
#[async_trait]
pub trait LeadSink: Send + Sync {
    /// Deliver one lead. Single attempt, no retry.
    async fn submit(&self, lead: &Lead) -> Result<(), SubmissionError>;
}

/// Posts leads as JSON to an HTTP endpoint; any 2xx is success.
pub struct HttpLeadSink {
    endpoint: String,
    client: reqwest::Client,
}

impl HttpLeadSink {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl LeadSink for HttpLeadSink {
    async fn submit(&self, lead: &Lead) -> Result<(), SubmissionError> {
        let resp = self
            .client
            .post(&self.endpoint)
            .json(lead)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "Lead submission request failed");
                SubmissionError::Transport(e.to_string())
            })?;

        let status = resp.status();
        if !status.is_success() {
            warn!(status = %status, "Lead endpoint rejected submission");
            return Err(SubmissionError::Rejected {
                status: status.as_u16(),
            });
        }

        info!("Lead submitted");
        Ok(())
    }
}
