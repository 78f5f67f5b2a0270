use actix_web::web::Bytes;
use futures_util::stream;
use log::debug;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::MealbotError;

/// The fields of an inbound-parse webhook that the pipeline reads.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct InboundMessage {
    #[serde(default)]
    pub from: Option<String>,
    #[serde(default)]
    pub to: Option<String>,
    #[serde(default)]
    pub cc: Option<String>,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub text: String,
}

impl InboundMessage {
    pub fn from_payload(payload: &Value) -> Result<Self, MealbotError> {
        serde_json::from_value(payload.clone()).map_err(|e| MealbotError::InvalidPayload(e.to_string()))
    }
}

/// Decodes a webhook body into a JSON object, keeping every field the sender
/// posted. Form and multipart text fields become string values; a repeated
/// key keeps its first value. Multipart file parts (attachments) are skipped.
pub async fn parse_payload(content_type: Option<&str>, body: Bytes) -> Result<Value, MealbotError> {
    let mime = content_type.map(|ct| ct.to_ascii_lowercase()).unwrap_or_default();

    if mime.contains("application/json") {
        let value: Value =
            serde_json::from_slice(&body).map_err(|e| MealbotError::InvalidPayload(e.to_string()))?;
        if !value.is_object() {
            return Err(MealbotError::InvalidPayload("expected a JSON object".to_string()));
        }
        return Ok(value);
    }

    if mime.starts_with("multipart/form-data") {
        // the boundary is case-sensitive, so parse the original header value
        let content_type = content_type.unwrap_or_default();
        return parse_multipart(content_type, body).await;
    }

    if !mime.is_empty() && !mime.contains("application/x-www-form-urlencoded") {
        return Err(MealbotError::InvalidPayload(format!(
            "unsupported content type {}",
            content_type.unwrap_or_default()
        )));
    }

    let mut fields = Map::new();
    for (key, value) in url::form_urlencoded::parse(&body) {
        fields.entry(key.into_owned()).or_insert_with(|| Value::String(value.into_owned()));
    }
    Ok(Value::Object(fields))
}

async fn parse_multipart(content_type: &str, body: Bytes) -> Result<Value, MealbotError> {
    let invalid = |e: multer::Error| MealbotError::InvalidPayload(e.to_string());

    let boundary = multer::parse_boundary(content_type).map_err(invalid)?;
    let stream = stream::once(async move { Ok::<Bytes, std::io::Error>(body) });
    let mut multipart = multer::Multipart::new(stream, boundary);

    let mut fields = Map::new();
    while let Some(field) = multipart.next_field().await.map_err(invalid)? {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };
        if field.file_name().is_some() {
            debug!("Skipping attachment field {}", name);
            continue;
        }
        let value = field.text().await.map_err(invalid)?;
        fields.entry(name).or_insert(Value::String(value));
    }
    Ok(Value::Object(fields))
}
