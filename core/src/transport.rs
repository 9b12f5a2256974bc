//! The HTTP capability `Api` runs its requests through.
//!
//! # Design
//! A `Transport` only moves bytes: any response that arrives, whatever its
//! status, is returned as `Ok(HttpResponse)`. Status interpretation belongs
//! to `Api`, so a 4xx/5xx never shows up as a `TransportError`. No retries
//! and no timeouts beyond the transport's own defaults.

use std::sync::Arc;

use ureq::typestate::WithBody;
use ureq::{Agent, RequestBuilder};

use crate::error::TransportError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse, RequestBody, UploadProgress};

pub trait Transport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError>;

    /// Execute while reporting upload progress.
    ///
    /// The default reports nothing sent before the round-trip and the whole
    /// body after it.
    fn execute_with_progress(
        &self,
        request: &HttpRequest,
        on_progress: &mut dyn FnMut(UploadProgress),
    ) -> Result<HttpResponse, TransportError> {
        let total = request.body.as_ref().map_or(0, |body| body.len() as u64);
        on_progress(UploadProgress {
            loaded: 0,
            total: Some(total),
        });
        let response = self.execute(request)?;
        on_progress(UploadProgress {
            loaded: total,
            total: Some(total),
        });
        Ok(response)
    }
}

impl<T: Transport + ?Sized> Transport for &T {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        (**self).execute(request)
    }

    fn execute_with_progress(
        &self,
        request: &HttpRequest,
        on_progress: &mut dyn FnMut(UploadProgress),
    ) -> Result<HttpResponse, TransportError> {
        (**self).execute_with_progress(request, on_progress)
    }
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        (**self).execute(request)
    }

    fn execute_with_progress(
        &self,
        request: &HttpRequest,
        on_progress: &mut dyn FnMut(UploadProgress),
    ) -> Result<HttpResponse, TransportError> {
        (**self).execute_with_progress(request, on_progress)
    }
}

/// Blocking transport backed by a `ureq` agent.
#[derive(Debug, Clone)]
pub struct UreqTransport {
    agent: Agent,
}

impl UreqTransport {
    pub fn new() -> Self {
        // 4xx/5xx must come back as data for `Api` to classify.
        let agent = Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self { agent }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for UreqTransport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        let url = request.url.as_str();
        let body = request.body.as_ref();

        let result = match request.method {
            HttpMethod::Get => prepare(self.agent.get(url), request).call(),
            HttpMethod::Delete => {
                let builder = prepare(self.agent.delete(url), request);
                match body {
                    Some(body) => builder.force_send_body().send(body.as_bytes()),
                    None => builder.call(),
                }
            }
            HttpMethod::Post => send(prepare(self.agent.post(url), request), body),
            HttpMethod::Put => send(prepare(self.agent.put(url), request), body),
            HttpMethod::Patch => send(prepare(self.agent.patch(url), request), body),
        };
        let mut response = result.map_err(|e| TransportError(e.to_string()))?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.as_str().to_string(), value.to_string()))
            })
            .collect();
        let body = response
            .body_mut()
            .read_to_string()
            .map_err(|e| TransportError(e.to_string()))?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

/// Apply query pairs (ureq percent-encodes them) and headers.
fn prepare<B>(mut builder: RequestBuilder<B>, request: &HttpRequest) -> RequestBuilder<B> {
    for (key, value) in &request.query {
        builder = builder.query(key, value);
    }
    for (name, value) in &request.headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}

fn send(
    builder: RequestBuilder<WithBody>,
    body: Option<&RequestBody>,
) -> Result<ureq::http::Response<ureq::Body>, ureq::Error> {
    match body {
        Some(body) => builder.send(body.as_bytes()),
        None => builder.send_empty(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Echo;

    impl Transport for Echo {
        fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
            Ok(HttpResponse {
                status: 200,
                headers: Vec::new(),
                body: request.url.clone(),
            })
        }
    }

    fn request(body: Option<RequestBody>) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Post,
            url: "http://localhost/x".to_string(),
            query: Vec::new(),
            headers: Vec::new(),
            body,
        }
    }

    #[test]
    fn default_progress_reports_start_and_end() {
        let mut seen = Vec::new();
        let response = Echo
            .execute_with_progress(&request(Some(RequestBody::Json("{}".into()))), &mut |p| {
                seen.push(p)
            })
            .unwrap();
        assert_eq!(response.body, "http://localhost/x");
        assert_eq!(
            seen,
            vec![
                UploadProgress {
                    loaded: 0,
                    total: Some(2),
                },
                UploadProgress {
                    loaded: 2,
                    total: Some(2),
                },
            ]
        );
    }

    #[test]
    fn shared_transports_forward() {
        let shared = Arc::new(Echo);
        assert_eq!(shared.execute(&request(None)).unwrap().status, 200);
        assert_eq!((&Echo).execute(&request(None)).unwrap().status, 200);
    }

    #[test]
    fn connection_failure_is_a_transport_error() {
        let addr = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap();
        // listener dropped: nothing accepts on `addr` anymore
        let err = UreqTransport::new()
            .execute(&HttpRequest {
                method: HttpMethod::Get,
                url: format!("http://{addr}/"),
                query: Vec::new(),
                headers: Vec::new(),
                body: None,
            })
            .unwrap_err();
        assert!(!err.0.is_empty());
    }
}
