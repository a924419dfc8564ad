//! Outbound body selection.
//!
//! | Method     | Content-Type            | Outbound body                      |
//! |------------|-------------------------|------------------------------------|
//! | GET / HEAD | any                     | none                               |
//! | other      | `multipart/form-data*`  | parts re-encoded, fresh boundary   |
//! | other      | anything else           | inbound stream, untouched          |
//!
//! Multipart is the only path that buffers; parts are read in full so the
//! transport can frame them with its own boundary.

use axum::{
    body::{Body, HttpBody},
    extract::{multipart::MultipartError, FromRequest, Multipart, Request},
    http::{header::CONTENT_TYPE, HeaderMap, Method, StatusCode},
};
use reqwest::multipart::{Form, Part};

use crate::error::GatewayError;
use crate::security::headers::without_content_type;

/// Body handed to the transport.
#[derive(Debug)]
pub enum OutboundBody {
    /// No body is sent.
    Empty,
    /// Inbound bytes streamed through as received.
    Stream(Body),
    /// Re-parsed form; the transport picks the boundary and `content-type`.
    Multipart(Form),
}

impl OutboundBody {
    pub fn is_empty(&self) -> bool {
        matches!(self, OutboundBody::Empty)
    }
}

/// True for `multipart/form-data` with any parameters, case-insensitively.
pub fn is_multipart(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| {
            v.trim_start()
                .to_ascii_lowercase()
                .starts_with("multipart/form-data")
        })
        .unwrap_or(false)
}

/// Choose the outbound body for `request`.
///
/// `headers` is the already-sanitized outbound set; the returned map is the
/// one to send, which differs only when the body is re-encoded.
pub async fn adapt_body(
    request: Request,
    headers: HeaderMap,
) -> Result<(OutboundBody, HeaderMap), GatewayError> {
    let method = request.method();
    if method == Method::GET || method == Method::HEAD {
        return Ok((OutboundBody::Empty, headers));
    }

    if is_multipart(request.headers()) {
        let form = reencode_multipart(request).await?;
        return Ok((OutboundBody::Multipart(form), without_content_type(&headers)));
    }

    let body = request.into_body();
    if body.size_hint().exact() == Some(0) {
        return Ok((OutboundBody::Empty, headers));
    }
    Ok((OutboundBody::Stream(body), headers))
}

async fn reencode_multipart(request: Request) -> Result<Form, GatewayError> {
    let mut multipart = Multipart::from_request(request, &())
        .await
        .map_err(|rejection| GatewayError::Internal(format!("multipart rejected: {rejection}")))?;

    let mut form = Form::new();
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_owned();
        let file_name = field.file_name().map(str::to_owned);
        let content_type = field.content_type().map(str::to_owned);
        let data = field.bytes().await.map_err(multipart_error)?;

        let mut part = Part::bytes(data.to_vec());
        if let Some(file_name) = file_name {
            part = part.file_name(file_name);
        }
        if let Some(content_type) = content_type {
            part = part.mime_str(&content_type).map_err(|e| {
                GatewayError::Internal(format!("part `{name}` has bad content type: {e}"))
            })?;
        }
        form = form.part(name, part);
    }

    Ok(form)
}

fn multipart_error(err: MultipartError) -> GatewayError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        GatewayError::PayloadTooLarge
    } else {
        GatewayError::Internal(format!("malformed multipart body: {}", err.body_text()))
    }
}
