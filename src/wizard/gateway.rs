//! Backend access for the application wizard

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use thiserror::Error;

use crate::models::{CreateLoanApplicationRequest, ErrorBody, FileUploadResponse, LoanApplication};
use crate::wizard::SelectedFile;

#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Failed to upload file")]
    UploadFailed { status: u16 },

    #[error("{message}")]
    Rejected {
        status: u16,
        message: String,
        field: Option<String>,
    },

    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),
}

/// The two calls the wizard makes when the applicant submits
#[async_trait]
pub trait SubmissionGateway: Send + Sync {
    async fn upload_file(&self, file: &SelectedFile) -> Result<FileUploadResponse, GatewayError>;

    async fn submit_application(
        &self,
        request: &CreateLoanApplicationRequest,
    ) -> Result<LoanApplication, GatewayError>;
}

/// Talks to the loan API over HTTP
#[derive(Clone)]
pub struct HttpSubmissionClient {
    http: reqwest::Client,
    base_url: String,
}

impl HttpSubmissionClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl SubmissionGateway for HttpSubmissionClient {
    async fn upload_file(&self, file: &SelectedFile) -> Result<FileUploadResponse, GatewayError> {
        let mut part = Part::bytes(file.data.to_vec()).file_name(file.name.clone());
        if let Some(content_type) = &file.content_type {
            part = part.mime_str(content_type)?;
        }
        let form = Form::new().part("file", part);

        let response = self
            .http
            .post(self.url("/api/upload"))
            .multipart(form)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            tracing::warn!(status, file = %file.name, "Identity document upload failed");
            return Err(GatewayError::UploadFailed { status });
        }

        Ok(response.json::<FileUploadResponse>().await?)
    }

    async fn submit_application(
        &self,
        request: &CreateLoanApplicationRequest,
    ) -> Result<LoanApplication, GatewayError> {
        let response = self
            .http
            .post(self.url("/api/loans"))
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.json::<ErrorBody>().await.ok();
            let (message, field) = match body {
                Some(ErrorBody { message, field }) if !message.is_empty() => (message, field),
                _ => ("Failed to submit application".to_string(), None),
            };
            return Err(GatewayError::Rejected {
                status: status.as_u16(),
                message,
                field,
            });
        }

        Ok(response.json::<LoanApplication>().await?)
    }
}
