use async_trait::async_trait;
use reqwest::{Client, Response};
use serde_json::Value;
use shared::{domain::Control, error::ApiError, protocol::ITEMS_SEGMENT};
use tracing::debug;
use url::Url;

use crate::error::ClientError;

/// The remote `/items` API as seen by the table client.
#[async_trait]
pub trait ControlsApi: Send + Sync {
    async fn list_controls(&self) -> Result<Vec<Control>, ClientError>;
    async fn get_control(&self, main_id: &str) -> Result<Option<Control>, ClientError>;
    async fn create_control(&self, control: &Control) -> Result<(), ClientError>;
    async fn update_control(&self, main_id: &str, control: &Control) -> Result<(), ClientError>;
    async fn delete_control(&self, main_id: &str) -> Result<(), ClientError>;
}

pub struct HttpControlsApi {
    http: Client,
    base_url: Url,
}

impl HttpControlsApi {
    /// `base_url` is the API root, e.g. `https://host/prod`; `/items` is appended.
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(http: Client, base_url: &str) -> Result<Self, ClientError> {
        let invalid = |reason: String| ClientError::InvalidUrl {
            url: base_url.to_string(),
            reason,
        };
        let base_url = Url::parse(base_url).map_err(|e| invalid(e.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(invalid("url cannot carry a path".into()));
        }
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub(crate) fn items_url(&self, main_id: Option<&str>) -> Result<Url, ClientError> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url.path_segments_mut().map_err(|_| ClientError::InvalidUrl {
                url: self.base_url.to_string(),
                reason: "url cannot carry a path".into(),
            })?;
            segments.pop_if_empty().push(ITEMS_SEGMENT);
            if let Some(main_id) = main_id {
                segments.push(main_id);
            }
        }
        Ok(url)
    }
}

#[async_trait]
impl ControlsApi for HttpControlsApi {
    async fn list_controls(&self) -> Result<Vec<Control>, ClientError> {
        let url = self.items_url(None)?;
        let response = self.http.get(url).send().await?;
        let payload = json_body(ensure_success(response).await?).await?;

        if !payload.is_array() {
            return Err(ClientError::MalformedPayload(
                "expected an array of controls".into(),
            ));
        }
        let controls: Vec<Control> = serde_json::from_value(payload)
            .map_err(|e| ClientError::MalformedPayload(e.to_string()))?;
        debug!(count = controls.len(), "fetched controls");
        Ok(controls)
    }

    async fn get_control(&self, main_id: &str) -> Result<Option<Control>, ClientError> {
        let url = self.items_url(Some(main_id))?;
        let response = self.http.get(url).send().await?;
        let payload = json_body(ensure_success(response).await?).await?;

        match payload {
            Value::Object(fields) if fields.is_empty() => Ok(None),
            Value::Object(_) => serde_json::from_value(payload)
                .map(Some)
                .map_err(|e| ClientError::MalformedPayload(e.to_string())),
            _ => Err(ClientError::MalformedPayload(
                "expected a control object".into(),
            )),
        }
    }

    async fn create_control(&self, control: &Control) -> Result<(), ClientError> {
        let url = self.items_url(None)?;
        let response = self.http.put(url).json(control).send().await?;
        ensure_success(response).await?;
        Ok(())
    }

    async fn update_control(&self, main_id: &str, control: &Control) -> Result<(), ClientError> {
        let url = self.items_url(Some(main_id))?;
        let response = self.http.post(url).json(control).send().await?;
        ensure_success(response).await?;
        Ok(())
    }

    async fn delete_control(&self, main_id: &str) -> Result<(), ClientError> {
        let url = self.items_url(Some(main_id))?;
        let response = self.http.delete(url).send().await?;
        ensure_success(response).await?;
        Ok(())
    }
}

/// Turns a non-2xx response into [`ClientError::Status`], carrying the
/// server's `{message}` when the body has one.
async fn ensure_success(response: Response) -> Result<Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ApiError>(&body)
        .ok()
        .map(|error| error.message)
        .filter(|message| !message.is_empty())
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string()
        });
    Err(ClientError::Status {
        status: status.as_u16(),
        message,
    })
}

async fn json_body(response: Response) -> Result<Value, ClientError> {
    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|e| ClientError::MalformedPayload(e.to_string()))
}
