//! REST implementation of [`DefinitionSync`] on top of reqwest.

use reqwest::{Client, Method, Response};
use serde::de::DeserializeOwned;

use super::{DefinitionSync, EditorMode, FetchedResources, SiblingDefinition};
use crate::config::EditorConfig;
use crate::error::{SyncError, SyncResult};
use crate::models::{ExportDefinitionPayload, ExportDefinitionResource, FormSnapshot};

const JSON_CONTENT_TYPE: &str = "application/json; charset=UTF-8";

/// Export definition backend reached over HTTP.
#[derive(Clone)]
pub struct HttpDefinitionSync {
    client: Client,
    config: EditorConfig,
}

impl HttpDefinitionSync {
    pub fn new(config: EditorConfig) -> Self {
        Self::with_client(Client::new(), config)
    }

    pub fn with_client(client: Client, config: EditorConfig) -> Self {
        Self { client, config }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> SyncResult<T> {
        let body = self.get_text(url).await?;
        decode(url, &body)
    }

    async fn get_text(&self, url: &str) -> SyncResult<String> {
        let response = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| request_error(url, e))?;

        let response = ensure_success("GET", url, response).await?;
        response.text().await.map_err(|e| request_error(url, e))
    }

    /// Target definition; an empty body means nothing is stored yet.
    async fn fetch_definition(&self, mode: &EditorMode) -> SyncResult<ExportDefinitionResource> {
        let Some(id) = mode.identifier() else {
            return Ok(ExportDefinitionResource::default());
        };

        let url = self.config.definition_url(id);
        let body = self.get_text(&url).await?;
        if body.trim().is_empty() {
            return Ok(ExportDefinitionResource::default());
        }
        decode(&url, &body)
    }

    async fn send_payload(
        &self,
        method: Method,
        url: &str,
        payload: &ExportDefinitionPayload,
    ) -> SyncResult<String> {
        let method_name = if method == Method::POST { "POST" } else { "PUT" };
        let response = self
            .client
            .request(method, url)
            .header(reqwest::header::CONTENT_TYPE, JSON_CONTENT_TYPE)
            .json(payload)
            .send()
            .await
            .map_err(|e| request_error(url, e))?;

        let response = ensure_success(method_name, url, response).await?;
        response.text().await.map_err(|e| request_error(url, e))
    }
}

impl DefinitionSync for HttpDefinitionSync {
    async fn fetch_all(&self, mode: &EditorMode) -> SyncResult<FetchedResources> {
        let (forms, definition, siblings) = futures::try_join!(
            self.get_json::<Vec<FormSnapshot>>(&self.config.form_data_endpoint),
            self.fetch_definition(mode),
            self.get_json::<Vec<SiblingDefinition>>(&self.config.export_definition_endpoint),
        )?;

        Ok(FetchedResources {
            forms,
            definition,
            siblings,
        })
    }

    async fn create(&self, payload: &ExportDefinitionPayload) -> SyncResult<Option<String>> {
        let url = self.config.export_definition_endpoint.clone();
        let body = self.send_payload(Method::POST, &url, payload).await?;
        Ok(created_identity(&body))
    }

    async fn update(&self, id: &str, payload: &ExportDefinitionPayload) -> SyncResult<()> {
        let url = self.config.definition_url(id);
        self.send_payload(Method::PUT, &url, payload).await?;
        Ok(())
    }
}

async fn ensure_success(
    method: &'static str,
    url: &str,
    response: Response,
) -> SyncResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());
    Err(SyncError::Status {
        method,
        url: url.to_string(),
        status: status.as_u16(),
        body,
    })
}

fn decode<T: DeserializeOwned>(url: &str, body: &str) -> SyncResult<T> {
    serde_json::from_str(body).map_err(|e| SyncError::Decode {
        url: url.to_string(),
        message: e.to_string(),
    })
}

/// `__identity` of a create response, if the body is a stored definition.
fn created_identity(body: &str) -> Option<String> {
    serde_json::from_str::<ExportDefinitionResource>(body)
        .ok()
        .and_then(|resource| resource.identity)
        .filter(|id| !id.is_empty())
}

fn request_error(url: &str, err: reqwest::Error) -> SyncError {
    SyncError::Request {
        url: url.to_string(),
        message: err.to_string(),
    }
}
