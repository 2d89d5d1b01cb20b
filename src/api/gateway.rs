use std::time::Duration;

use async_trait::async_trait;
use reqwest::{
    header::ACCEPT,
    multipart::{Form, Part},
    Client, RequestBuilder, StatusCode,
};
use serde::de::DeserializeOwned;

use crate::{
    api::{
        endpoints,
        wire::{Envelope, ErrorBody, WireBroadcast, WireMessage, WireTicket, WireUnreadCount},
    },
    domain::{composer::AttachmentDraft, conversation::ConversationRef, message::RawMessage},
    infra::{config::ApiConfig, error::AppError},
    usecases::contracts::{GatewayError, MessageGateway, MessagePage, OutgoingMessage},
};

const API_REQUEST_FAILED: &str = "API_REQUEST_FAILED";
const API_RESPONSE_REJECTED: &str = "API_RESPONSE_REJECTED";
const API_ATTACHMENT_READ_FAILED: &str = "API_ATTACHMENT_READ_FAILED";

const DEFAULT_MIME_TYPE: &str = "application/octet-stream";
const JSON: &str = "application/json";

/// [`MessageGateway`] backed by the chat backend's REST API.
#[derive(Debug, Clone)]
pub struct RestGateway {
    client: Client,
    base_url: String,
    token: String,
}

impl RestGateway {
    pub fn new(config: &ApiConfig) -> Result<Self, AppError> {
        let base_url = config.base_url.trim();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(AppError::InvalidBaseUrl {
                url: config.base_url.clone(),
                details: "expected an http:// or https:// URL".to_owned(),
            });
        }

        let client = Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()
            .map_err(AppError::HttpClient)?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_owned(),
            token: config.token.clone(),
        })
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        let request = request.header(ACCEPT, JSON);
        if self.token.is_empty() {
            request
        } else {
            request.bearer_auth(&self.token)
        }
    }

    async fn execute(&self, request: RequestBuilder) -> Result<String, GatewayError> {
        let response = self
            .authorized(request)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        let body = response.text().await.map_err(transport_error)?;
        check_status(status, &body)?;

        Ok(body)
    }

    async fn attachment_form(
        &self,
        body: Option<String>,
        attachment: &AttachmentDraft,
    ) -> Result<Form, GatewayError> {
        let bytes = tokio::fs::read(&attachment.path).await.map_err(|error| {
            tracing::warn!(
                code = API_ATTACHMENT_READ_FAILED,
                path = %attachment.path.display(),
                error = %error,
                "attachment could not be read"
            );
            GatewayError::AttachmentUnreadable(attachment.name.clone())
        })?;

        let mime_type = attachment.mime_type.as_deref().unwrap_or(DEFAULT_MIME_TYPE);
        let part = Part::bytes(bytes)
            .file_name(attachment.name.clone())
            .mime_str(mime_type)
            .map_err(|error| {
                tracing::warn!(
                    code = API_ATTACHMENT_READ_FAILED,
                    mime_type,
                    error = %error,
                    "attachment mime type rejected"
                );
                GatewayError::AttachmentUnreadable(attachment.name.clone())
            })?;

        let mut form = Form::new();
        if let Some(body) = body {
            form = form.text("message", body);
        }

        Ok(form.part("attachment", part))
    }
}

#[async_trait]
impl MessageGateway for RestGateway {
    async fn fetch_page(
        &self,
        conversation: &ConversationRef,
        page: u32,
    ) -> Result<MessagePage, GatewayError> {
        let url = endpoints::join(&self.base_url, &endpoints::fetch_path(conversation, page));
        tracing::debug!(conversation = %conversation, page, "fetching messages");

        let body = self.execute(self.client.get(&url)).await.inspect_err(|error| {
            tracing::debug!(
                code = API_REQUEST_FAILED,
                conversation = %conversation,
                page,
                error = %error,
                "message fetch failed"
            );
        })?;

        decode_page(conversation, &body)
    }

    async fn send_message(
        &self,
        conversation: &ConversationRef,
        message: OutgoingMessage,
    ) -> Result<RawMessage, GatewayError> {
        let url = endpoints::join(&self.base_url, &endpoints::send_path(conversation));

        let request = match &message.attachment {
            Some(attachment) => {
                let form = self.attachment_form(message.body.clone(), attachment).await?;
                self.client.post(&url).multipart(form)
            }
            None => self.client.post(&url).json(&serde_json::json!({
                "message": message.body.as_deref().unwrap_or_default(),
            })),
        };

        let body = self.execute(request).await.inspect_err(|error| {
            tracing::debug!(
                code = API_REQUEST_FAILED,
                conversation = %conversation,
                error = %error,
                "message send failed"
            );
        })?;

        decode_envelope::<WireMessage>(&body).map(|envelope| envelope.data.into_raw())
    }

    async fn broadcast(&self, group_id: i64, body: &str) -> Result<u32, GatewayError> {
        let url = endpoints::join(&self.base_url, &endpoints::broadcast_path(group_id));
        let request = self
            .client
            .post(&url)
            .json(&serde_json::json!({ "message": body }));

        let body = self.execute(request).await.inspect_err(|error| {
            tracing::debug!(
                code = API_REQUEST_FAILED,
                group_id,
                error = %error,
                "broadcast failed"
            );
        })?;

        decode_envelope::<WireBroadcast>(&body).map(|envelope| envelope.data.sent_count)
    }

    async fn unread_count(&self) -> Result<u32, GatewayError> {
        let url = endpoints::join(&self.base_url, endpoints::UNREAD_COUNT_PATH);
        let body = self.execute(self.client.get(&url)).await.inspect_err(|error| {
            tracing::debug!(code = API_REQUEST_FAILED, error = %error, "unread count failed");
        })?;

        decode_envelope::<WireUnreadCount>(&body).map(|envelope| envelope.data.unread_count)
    }
}

fn decode_page(conversation: &ConversationRef, body: &str) -> Result<MessagePage, GatewayError> {
    match conversation {
        ConversationRef::Ticket { .. } => {
            let envelope = decode_envelope::<WireTicket>(body)?;
            let (records, origin) = envelope.data.into_parts();
            Ok(MessagePage {
                records,
                pagination: None,
                origin,
            })
        }
        ConversationRef::Private { .. } | ConversationRef::Group { .. } => {
            let envelope = decode_envelope::<Vec<WireMessage>>(body)?;
            Ok(MessagePage {
                records: envelope.data.into_iter().map(WireMessage::into_raw).collect(),
                pagination: envelope.pagination.map(Into::into),
                origin: None,
            })
        }
    }
}

fn decode_envelope<T: DeserializeOwned>(body: &str) -> Result<Envelope<T>, GatewayError> {
    serde_json::from_str(body).map_err(|error| GatewayError::InvalidData(error.to_string()))
}

fn check_status(status: StatusCode, body: &str) -> Result<(), GatewayError> {
    if status.is_success() {
        return Ok(());
    }

    match status {
        StatusCode::UNAUTHORIZED => Err(GatewayError::Unauthorized),
        StatusCode::NOT_FOUND => Err(GatewayError::NotFound),
        _ => {
            let message = serde_json::from_str::<ErrorBody>(body)
                .ok()
                .and_then(|error| error.message)
                .filter(|message| !message.trim().is_empty())
                .unwrap_or_else(|| {
                    status
                        .canonical_reason()
                        .unwrap_or("An error occurred")
                        .to_owned()
                });

            tracing::debug!(
                code = API_RESPONSE_REJECTED,
                status = status.as_u16(),
                message = %message,
                "backend rejected request"
            );

            Err(GatewayError::Rejected {
                status: status.as_u16(),
                message,
            })
        }
    }
}

fn transport_error(error: reqwest::Error) -> GatewayError {
    if error.is_timeout() {
        GatewayError::Unavailable("request timed out".to_owned())
    } else {
        GatewayError::Unavailable(error.to_string())
    }
}
