// REST transport: builds requests, runs them through the pipeline, decodes envelopes

pub mod request;

use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

use crate::api::envelope::error_from_body;
use crate::api::{Envelope, RawEnvelope};
use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::pipeline::RequestPipeline;

pub use request::{FileUpload, OutgoingRequest, RequestBody, RequestSummary};

/// Shared REST client. Cheap to clone; all clones share one connection pool and pipeline.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    pipeline: Arc<RequestPipeline>,
}

impl ApiClient {
    pub fn new(config: &ClientConfig, pipeline: Arc<RequestPipeline>) -> Result<Self, ClientError> {
        // Validate early so a bad CIRQUE_API_URL fails at startup
        config.api_url()?;

        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .gzip(true)
            .build()?;

        Ok(Self {
            http,
            base_url: config.api.base_url.trim_end_matches('/').to_string(),
            pipeline,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn pipeline(&self) -> &RequestPipeline {
        &self.pipeline
    }

    /// Absolute URL for an API path such as `/projects/3`
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn request(&self, method: Method, path: &str) -> OutgoingRequest {
        OutgoingRequest::new(method, self.url(path))
    }

    /// Run a request through the pipeline and return the raw body of a 2xx response.
    /// Failures are shown to the error stages before being returned.
    pub async fn execute(&self, mut request: OutgoingRequest) -> Result<Vec<u8>, ClientError> {
        self.pipeline.prepare(&mut request).await?;

        let summary = request.summary();
        match self.dispatch(request).await {
            Ok(body) => Ok(body),
            Err(error) => {
                tracing::debug!("{} failed: {}", summary, error);
                self.pipeline.fail(&summary, &error).await;
                Err(error)
            }
        }
    }

    /// Execute and decode the response envelope
    pub async fn send<T: DeserializeOwned>(&self, request: OutgoingRequest) -> Result<Envelope<T>, ClientError> {
        let body = self.execute(request).await?;

        if body.iter().all(u8::is_ascii_whitespace) {
            return Envelope::from_raw(RawEnvelope {
                success: true,
                message: None,
                data: Value::Null,
                timestamp: None,
            });
        }
        Envelope::from_slice(&body)
    }

    async fn dispatch(&self, request: OutgoingRequest) -> Result<Vec<u8>, ClientError> {
        let mut builder = self.http.request(request.method, &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        builder = match request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(body) => builder.json(&body),
            RequestBody::Multipart(file) => builder.multipart(file.into_form()?),
        };

        let response = builder.send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            return Err(error_from_body(status.as_u16(), &body));
        }
        Ok(body.to_vec())
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<Envelope<T>, ClientError> {
        self.send(self.request(Method::GET, path)).await
    }

    pub async fn get_with_query<T: DeserializeOwned>(
        &self,
        path: &str,
        query: Vec<(String, String)>,
    ) -> Result<Envelope<T>, ClientError> {
        self.send(self.request(Method::GET, path).with_query(query)).await
    }

    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Envelope<T>, ClientError> {
        self.send(self.request(Method::POST, path).with_json(body)?).await
    }

    /// POST without a request body
    pub async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> Result<Envelope<T>, ClientError> {
        self.send(self.request(Method::POST, path)).await
    }

    pub async fn put<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Envelope<T>, ClientError> {
        self.send(self.request(Method::PUT, path).with_json(body)?).await
    }

    pub async fn patch<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Envelope<T>, ClientError> {
        self.send(self.request(Method::PATCH, path).with_json(body)?).await
    }

    pub async fn patch_empty<T: DeserializeOwned>(&self, path: &str) -> Result<Envelope<T>, ClientError> {
        self.send(self.request(Method::PATCH, path)).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<Envelope<T>, ClientError> {
        self.send(self.request(Method::DELETE, path)).await
    }

    pub async fn upload<T: DeserializeOwned>(&self, path: &str, file: FileUpload) -> Result<Envelope<T>, ClientError> {
        self.send(self.request(Method::POST, path).with_file(file)).await
    }

    /// Raw bytes of a binary endpoint (no envelope)
    pub async fn download(&self, path: &str) -> Result<Vec<u8>, ClientError> {
        self.execute(self.request(Method::GET, path)).await
    }
}
