//! Live backend over the document service's REST API.

use super::{Backend, BackendError, BackendOperation};
use crate::models::{Answer, Document, SearchHit, Summary, SummaryType, UploadReceipt};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub struct HttpBackend {
    client: Client,
    base_url: String,
}

/// The list endpoint has been seen both as a bare array and wrapped in an
/// object; accept either.
#[derive(Deserialize)]
#[serde(untagged)]
enum DocumentListBody {
    Bare(Vec<Document>),
    Wrapped { documents: Vec<Document> },
}

#[derive(Deserialize)]
struct SearchBody {
    results: Vec<SearchHit>,
}

#[derive(Serialize)]
struct SearchRequest<'a> {
    query: &'a str,
    top_k: usize,
}

#[derive(Serialize)]
struct SummarizeRequest<'a> {
    doc_id: &'a str,
    summary_type: SummaryType,
}

#[derive(Serialize)]
struct QuestionRequest<'a> {
    question: &'a str,
    doc_ids: Option<&'a [String]>,
}

impl HttpBackend {
    pub fn new(base_url: &str, request_timeout: Duration) -> Result<Self, BackendError> {
        let client = Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| BackendError::InvalidRequest {
                operation: BackendOperation::Fetch,
                message: format!("failed to build HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Send the request and fail on transport errors or non-2xx statuses.
    async fn send(
        &self,
        operation: BackendOperation,
        request: RequestBuilder,
    ) -> Result<reqwest::Response, BackendError> {
        let response = request.send().await.map_err(|e| {
            tracing::error!(operation = operation.as_str(), error = %e, "Backend request failed");
            BackendError::network(operation, e)
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        tracing::warn!(
            operation = operation.as_str(),
            status = status.as_u16(),
            body = %body,
            "Backend returned an error status"
        );
        let message = if body.trim().is_empty() {
            status
                .canonical_reason()
                .unwrap_or("Unknown error")
                .to_string()
        } else {
            body
        };
        Err(BackendError::status(operation, status.as_u16(), message))
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        operation: BackendOperation,
        request: RequestBuilder,
    ) -> Result<T, BackendError> {
        let response = self.send(operation, request).await?;
        let body = response
            .bytes()
            .await
            .map_err(|e| BackendError::network(operation, e))?;
        serde_json::from_slice(&body).map_err(|e| {
            tracing::error!(operation = operation.as_str(), error = %e, "Malformed backend payload");
            BackendError::malformed(operation, e)
        })
    }
}

fn check_score(operation: BackendOperation, score: f32) -> Result<(), BackendError> {
    if (0.0..=1.0).contains(&score) {
        Ok(())
    } else {
        Err(BackendError::malformed(
            operation,
            format!("score {} outside [0, 1]", score),
        ))
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn upload_document(
        &self,
        bytes: Vec<u8>,
        filename: &str,
        content_type: &str,
    ) -> Result<UploadReceipt, BackendError> {
        let part = Part::bytes(bytes)
            .file_name(filename.to_string())
            .mime_str(content_type)
            .map_err(|e| BackendError::InvalidRequest {
                operation: BackendOperation::Upload,
                message: e.to_string(),
            })?;
        let form = Form::new().part("file", part);

        let receipt: UploadReceipt = self
            .send_json(
                BackendOperation::Upload,
                self.client.post(self.url("/documents/upload")).multipart(form),
            )
            .await?;

        tracing::info!(document_id = %receipt.id, filename = %receipt.filename, "Document uploaded");
        Ok(receipt)
    }

    async fn list_documents(&self) -> Result<Vec<Document>, BackendError> {
        let body: DocumentListBody = self
            .send_json(
                BackendOperation::Fetch,
                self.client.get(self.url("/documents")),
            )
            .await?;

        Ok(match body {
            DocumentListBody::Bare(documents) | DocumentListBody::Wrapped { documents } => {
                documents
            }
        })
    }

    async fn delete_document(&self, id: &str) -> Result<(), BackendError> {
        self.send(
            BackendOperation::Delete,
            self.client.delete(self.url(&format!("/documents/{}", id))),
        )
        .await?;
        Ok(())
    }

    async fn search(&self, query: &str, top_k: usize) -> Result<Vec<SearchHit>, BackendError> {
        let body: SearchBody = self
            .send_json(
                BackendOperation::Search,
                self.client
                    .post(self.url("/search"))
                    .json(&SearchRequest { query, top_k }),
            )
            .await?;

        for hit in &body.results {
            check_score(BackendOperation::Search, hit.score)?;
        }
        let mut hits = body.results;
        hits.truncate(top_k);
        Ok(hits)
    }

    async fn summarize(
        &self,
        doc_id: &str,
        summary_type: SummaryType,
    ) -> Result<Summary, BackendError> {
        self.send_json(
            BackendOperation::Summarize,
            self.client
                .post(self.url("/ai/summarize"))
                .json(&SummarizeRequest {
                    doc_id,
                    summary_type,
                }),
        )
        .await
    }

    async fn ask_question(
        &self,
        question: &str,
        doc_ids: Option<&[String]>,
    ) -> Result<Answer, BackendError> {
        let answer: Answer = self
            .send_json(
                BackendOperation::Qa,
                self.client
                    .post(self.url("/ai/qa"))
                    .json(&QuestionRequest { question, doc_ids }),
            )
            .await?;

        for source in &answer.sources {
            check_score(BackendOperation::Qa, source.relevance_score)?;
        }
        Ok(answer)
    }
}
