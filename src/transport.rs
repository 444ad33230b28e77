//! HTTP transport abstraction
//!
//! The pipeline never talks to the network directly; it goes through the
//! [`Transport`] trait so the transport can be swapped out by the host
//! environment (and mocked in tests). `UreqTransport` is the default,
//! running the blocking client inside `spawn_blocking`.

use crate::error::{InsetError, InsetResult};
use async_trait::async_trait;
use tracing::debug;
use ureq::Agent;

/// HTTP method used by the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
        }
    }
}

/// A completed HTTP exchange
///
/// Carries the status and the full body text; interpreting the status is up
/// to the caller. Only transport-level failures surface as errors.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

/// Abstract asynchronous request capability
#[async_trait]
pub trait Transport: Send + Sync {
    async fn request(
        &self,
        method: Method,
        url: &str,
        headers: &[(&str, &str)],
        body: Option<&str>,
    ) -> InsetResult<HttpResponse>;
}

/// Transport backed by a blocking ureq agent
pub struct UreqTransport {
    agent: Agent,
}

impl UreqTransport {
    pub fn new() -> Self {
        // Non-2xx statuses are data here, not errors: the render path
        // inspects 403 bodies itself.
        let config = Agent::config_builder()
            .http_status_as_error(false)
            .build();
        Self {
            agent: config.new_agent(),
        }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for UreqTransport {
    async fn request(
        &self,
        method: Method,
        url: &str,
        headers: &[(&str, &str)],
        body: Option<&str>,
    ) -> InsetResult<HttpResponse> {
        debug!("{} {}", method.as_str(), url);

        let agent = self.agent.clone();
        let url_owned = url.to_string();
        let headers_owned: Vec<(String, String)> = headers
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let body_owned = body.map(str::to_string);

        let result = tokio::task::spawn_blocking(move || {
            let mut response = match method {
                Method::Get => {
                    let mut req = agent.get(&url_owned);
                    for (k, v) in &headers_owned {
                        req = req.header(k.as_str(), v.as_str());
                    }
                    req.call()?
                }
                Method::Post => {
                    let mut req = agent.post(&url_owned);
                    for (k, v) in &headers_owned {
                        req = req.header(k.as_str(), v.as_str());
                    }
                    req.send(body_owned.as_deref().unwrap_or(""))?
                }
            };

            let status = response.status().as_u16();
            let text = response.body_mut().read_to_string()?;
            Ok::<HttpResponse, ureq::Error>(HttpResponse { status, body: text })
        })
        .await
        .map_err(|e| InsetError::User(format!("Request task failed: {}", e)))?;

        result.map_err(|e| InsetError::network(url, e.to_string()))
    }
}

#[cfg(test)]
pub(crate) mod mock {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// A recorded request made through the mock
    #[derive(Debug, Clone)]
    pub struct RecordedRequest {
        pub method: Method,
        pub url: String,
        pub body: Option<String>,
    }

    /// Scripted transport: pops one queued response per request
    #[derive(Default)]
    pub struct MockTransport {
        responses: Mutex<VecDeque<InsetResult<HttpResponse>>>,
        requests: Mutex<Vec<RecordedRequest>>,
    }

    impl MockTransport {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn respond_with(self, status: u16, body: &str) -> Self {
            self.responses
                .lock()
                .unwrap()
                .push_back(Ok(HttpResponse {
                    status,
                    body: body.to_string(),
                }));
            self
        }

        pub fn fail_with(self, reason: &str) -> Self {
            let err = InsetError::network("mock", reason);
            self.responses.lock().unwrap().push_back(Err(err));
            self
        }

        pub fn requests(&self) -> Vec<RecordedRequest> {
            self.requests.lock().unwrap().clone()
        }

        pub fn request_count(&self) -> usize {
            self.requests.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl Transport for MockTransport {
        async fn request(
            &self,
            method: Method,
            url: &str,
            _headers: &[(&str, &str)],
            body: Option<&str>,
        ) -> InsetResult<HttpResponse> {
            self.requests.lock().unwrap().push(RecordedRequest {
                method,
                url: url.to_string(),
                body: body.map(str::to_string),
            });
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(InsetError::network(url, "no scripted response")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_names() {
        assert_eq!(Method::Get.as_str(), "GET");
        assert_eq!(Method::Post.as_str(), "POST");
    }

    #[tokio::test]
    async fn mock_records_requests_in_order() {
        use mock::MockTransport;

        let transport = MockTransport::new()
            .respond_with(200, "one")
            .respond_with(404, "two");

        let first = transport
            .request(Method::Get, "http://a", &[], None)
            .await
            .unwrap();
        assert_eq!(first.status, 200);
        assert_eq!(first.body, "one");

        let second = transport
            .request(Method::Post, "http://b", &[], Some("payload"))
            .await
            .unwrap();
        assert_eq!(second.status, 404);

        let requests = transport.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].method, Method::Get);
        assert_eq!(requests[1].body.as_deref(), Some("payload"));
    }

    #[tokio::test]
    async fn mock_exhausted_queue_is_a_failure() {
        use mock::MockTransport;

        let transport = MockTransport::new();
        let result = transport.request(Method::Get, "http://a", &[], None).await;
        assert!(result.is_err());
    }
}
