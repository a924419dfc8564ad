//! Upstream transport.
//!
//! # Responsibilities
//! - Issue exactly one upstream call per inbound request
//! - Stream request bodies out and response bodies back
//! - Surface 3xx responses instead of following them
//! - Report network failures as `UpstreamUnavailable`
//!
//! # Design Decisions
//! - The target URI is sent exactly as resolved; no URL parser touches it
//! - The response deadline covers the wait for response headers only; a
//!   body that keeps streaming is never cut off
//! - Only codings the transport can decode are advertised; a body it could
//!   not decode keeps its `content-encoding` label
//! - Dropping the returned future or the response body cancels the call and
//!   releases the upstream connection
//! - `Transport` is a trait so the pipeline can be exercised without sockets

use std::time::Duration;

use axum::{
    body::Body,
    http::{
        header::{HeaderValue, CONTENT_TYPE},
        HeaderMap, Method, Request, StatusCode, Uri,
    },
};
use futures_util::future::BoxFuture;
use hyper_tls::HttpsConnector;
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use tower::ServiceExt;
use tower_http::decompression::Decompression;

use crate::config::TimeoutConfig;
use crate::error::GatewayError;
use crate::http::body::OutboundBody;

/// A fully prepared upstream request.
#[derive(Debug)]
pub struct OutboundRequest {
    pub method: Method,
    pub uri: Uri,
    pub headers: HeaderMap,
    pub body: OutboundBody,
}

/// Upstream answer with its body still streaming.
#[derive(Debug)]
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Body,
}

/// Sends outbound requests to the upstream.
pub trait Transport: Send + Sync + 'static {
    fn send(&self, request: OutboundRequest) -> BoxFuture<'_, Result<UpstreamResponse, GatewayError>>;
}

type HttpClient = Client<HttpsConnector<HttpConnector>, Body>;

/// Production transport backed by a pooled hyper client.
#[derive(Debug, Clone)]
pub struct Forwarder {
    client: Decompression<HttpClient>,
    response_timeout: Duration,
}

impl Forwarder {
    /// Build a forwarder with the configured connect and response deadlines.
    pub fn new(timeouts: &TimeoutConfig) -> Result<Self, native_tls::Error> {
        let mut http = HttpConnector::new();
        http.enforce_http(false);
        http.set_connect_timeout(Some(Duration::from_secs(timeouts.connect_secs)));

        let tls = native_tls::TlsConnector::new()?;
        let https: HttpsConnector<HttpConnector> = HttpsConnector::from((http, tls.into()));

        let client = Client::builder(TokioExecutor::new()).build(https);

        Ok(Self {
            client: Decompression::new(client),
            response_timeout: Duration::from_secs(timeouts.request_secs),
        })
    }
}

/// Turn the outbound request into the hyper request sent on the wire.
fn wire_request(request: OutboundRequest) -> Result<Request<Body>, GatewayError> {
    let OutboundRequest {
        method,
        uri,
        mut headers,
        body,
    } = request;

    let body = match body {
        OutboundBody::Empty => Body::empty(),
        OutboundBody::Stream(body) => body,
        OutboundBody::Multipart(form) => {
            let content_type = format!("multipart/form-data; boundary={}", form.boundary());
            let value = HeaderValue::from_str(&content_type)
                .map_err(|e| GatewayError::Internal(format!("bad multipart boundary: {e}")))?;
            headers.insert(CONTENT_TYPE, value);
            Body::from_stream(form.into_stream())
        }
    };

    let mut wire = Request::new(body);
    *wire.method_mut() = method;
    *wire.uri_mut() = uri;
    *wire.headers_mut() = headers;
    Ok(wire)
}

impl Transport for Forwarder {
    fn send(&self, request: OutboundRequest) -> BoxFuture<'_, Result<UpstreamResponse, GatewayError>> {
        Box::pin(async move {
            let wire = wire_request(request)?;
            let call = self.client.clone().oneshot(wire);

            let response = tokio::time::timeout(self.response_timeout, call)
                .await
                .map_err(|_| GatewayError::UpstreamTimeout(self.response_timeout))?
                .map_err(GatewayError::UpstreamUnavailable)?;

            let (parts, body) = response.into_parts();
            Ok(UpstreamResponse {
                status: parts.status,
                headers: parts.headers,
                body: Body::new(body),
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use reqwest::multipart::{Form, Part};

    fn outbound(body: OutboundBody) -> OutboundRequest {
        let mut headers = HeaderMap::new();
        headers.insert("x-custom", HeaderValue::from_static("1"));
        OutboundRequest {
            method: Method::PUT,
            uri: "http://backend:8080/search?name=O'Brien".parse().unwrap(),
            headers,
            body,
        }
    }

    #[test]
    fn wire_request_keeps_target_verbatim() {
        let wire = wire_request(outbound(OutboundBody::Empty)).unwrap();
        assert_eq!(wire.method(), Method::PUT);
        assert_eq!(
            wire.uri().to_string(),
            "http://backend:8080/search?name=O'Brien"
        );
        assert_eq!(wire.headers()["x-custom"], "1");
    }

    #[tokio::test]
    async fn multipart_gets_boundary_matching_content_type() {
        let form = Form::new().part("file", Part::bytes(b"abc".to_vec()).file_name("a.txt"));
        let boundary = form.boundary().to_string();

        let wire = wire_request(outbound(OutboundBody::Multipart(form))).unwrap();
        assert_eq!(
            wire.headers()[CONTENT_TYPE],
            format!("multipart/form-data; boundary={boundary}").as_str()
        );

        let bytes = to_bytes(wire.into_body(), usize::MAX).await.unwrap();
        let text = String::from_utf8_lossy(&bytes);
        assert!(text.starts_with(&format!("--{boundary}\r\n")));
        assert!(text.ends_with(&format!("--{boundary}--\r\n")));
        assert!(text.contains("filename=\"a.txt\""));
    }

    #[tokio::test]
    async fn response_deadline_maps_to_timeout() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            // Accept and never answer.
            let (_socket, _) = listener.accept().await.unwrap();
            std::future::pending::<()>().await;
        });

        let mut forwarder = Forwarder::new(&TimeoutConfig::default()).unwrap();
        forwarder.response_timeout = Duration::from_millis(200);

        let mut request = outbound(OutboundBody::Empty);
        request.uri = format!("http://{addr}/slow").parse().unwrap();

        let err = forwarder.send(request).await.unwrap_err();
        assert!(matches!(err, GatewayError::UpstreamTimeout(_)));
    }
}
