//! HTTP client for the remote testimonial content endpoint.

use async_trait::async_trait;
use tracing::{debug, warn};

use super::model::{RemoteTestimonial, Testimonial, TestimonialUpdate};
use crate::error::ContentError;

/// Read and propose edits to testimonial records.
#[async_trait]
pub trait TestimonialStore: Send + Sync {
    /// All records, ordered by sort order.
    async fn list(&self) -> Result<Vec<Testimonial>, ContentError>;

    /// Propose an edit; returns the record as the store now holds it.
    async fn update(&self, update: &TestimonialUpdate) -> Result<Testimonial, ContentError>;
}

/// Talks to the content endpoint over HTTP (`GET` list, `PUT` update).
pub struct ContentClient {
    endpoint: String,
    client: reqwest::Client,
}

impl ContentClient {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            client: reqwest::Client::new(),
        }
    }

    async fn check(resp: reqwest::Response) -> Result<reqwest::Response, ContentError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.text().await.unwrap_or_default();
        warn!(status = %status, "Testimonial endpoint returned an error");
        Err(ContentError::Status {
            status: status.as_u16(),
            body,
        })
    }
}

fn transport(e: reqwest::Error) -> ContentError {
    ContentError::Transport(e.to_string())
}

#[async_trait]
impl TestimonialStore for ContentClient {
    async fn list(&self) -> Result<Vec<Testimonial>, ContentError> {
        let resp = self
            .client
            .get(&self.endpoint)
            .send()
            .await
            .map_err(transport)?;
        let resp = Self::check(resp).await?;

        let remote: Vec<RemoteTestimonial> = resp
            .json()
            .await
            .map_err(|e| ContentError::Decode(e.to_string()))?;

        let mut records: Vec<Testimonial> = remote.into_iter().map(Testimonial::from).collect();
        records.sort_by_key(|r| r.sort_order);
        debug!(count = records.len(), "Fetched testimonials");
        Ok(records)
    }

    async fn update(&self, update: &TestimonialUpdate) -> Result<Testimonial, ContentError> {
        let resp = self
            .client
            .put(&self.endpoint)
            .json(update)
            .send()
            .await
            .map_err(transport)?;

        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(ContentError::NotFound { id: update.id });
        }
        let resp = Self::check(resp).await?;

        let remote: RemoteTestimonial = resp
            .json()
            .await
            .map_err(|e| ContentError::Decode(e.to_string()))?;
        debug!(id = remote.id, "Testimonial updated");
        Ok(remote.into())
    }
}
