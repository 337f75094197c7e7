use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Url;
use zrpc_core::{BoxError, RpcError};

use crate::config::ClientConfig;
use crate::error::{HttpError, Result};
use crate::fetch::{Fetch, FetchClient, FetchResponse};

/// Client for a zrpc API served over HTTP.
pub type HttpClient = FetchClient<ReqwestFetch>;

/// [`Fetch`] over the network with reqwest.
#[derive(Debug, Clone)]
pub struct ReqwestFetch {
    client: reqwest::Client,
    url: Url,
}

impl ReqwestFetch {
    pub fn new(url: &str, config: &ClientConfig) -> Result<Self> {
        let url = parse_endpoint(url)?;
        let mut builder = reqwest::Client::builder().user_agent(config.user_agent.as_str());
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(HttpError::ClientBuild)?;
        Ok(Self { client, url })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

#[async_trait]
impl Fetch for ReqwestFetch {
    async fn post(&self, body: Vec<u8>) -> std::result::Result<FetchResponse, BoxError> {
        let response = self
            .client
            .post(self.url.clone())
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?;
        Ok(FetchResponse { status, body })
    }
}

impl HttpClient {
    /// Connect to the endpoint at `url` with default settings.
    pub fn connect(url: &str) -> Result<Self> {
        Self::connect_with_config(url, &ClientConfig::default())
    }

    pub fn connect_with_config(url: &str, config: &ClientConfig) -> Result<Self> {
        Ok(FetchClient::new(ReqwestFetch::new(url, config)?))
    }

    /// Endpoint this client posts to.
    pub fn url(&self) -> &Url {
        self.fetch().url()
    }
}

/// True when a call failed because the HTTP request timed out.
pub fn is_timeout(err: &RpcError) -> bool {
    match err {
        RpcError::Transport(source) => source
            .downcast_ref::<reqwest::Error>()
            .is_some_and(reqwest::Error::is_timeout),
        _ => false,
    }
}

fn parse_endpoint(url: &str) -> Result<Url> {
    let invalid = |reason: String| HttpError::InvalidUrl {
        url: url.to_string(),
        reason,
    };
    let parsed = Url::parse(url).map_err(|err| invalid(err.to_string()))?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        other => Err(invalid(format!("unsupported scheme {other:?}"))),
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn accepts_http_and_https_endpoints() {
        let client = HttpClient::connect("http://127.0.0.1:8080/rpc").unwrap();
        assert_eq!(client.url().path(), "/rpc");
        assert!(HttpClient::connect("https://example.com").is_ok());
    }

    #[test]
    fn rejects_bad_endpoints() {
        for url in ["not a url", "ftp://example.com/", "/relative"] {
            match HttpClient::connect(url) {
                Err(HttpError::InvalidUrl { url: reported, .. }) => assert_eq!(reported, url),
                other => panic!("unexpected outcome for {url}: {other:?}"),
            }
        }
    }

    #[test]
    fn config_without_timeout_builds() {
        let config = ClientConfig {
            timeout: None,
            user_agent: "test-agent".to_string(),
        };
        assert!(HttpClient::connect_with_config("http://localhost/", &config).is_ok());
    }

    #[test]
    fn only_transport_failures_can_time_out() {
        assert!(!is_timeout(&RpcError::MethodNotFound("x".into())));
        assert!(!is_timeout(&RpcError::transport("refused")));
    }

    #[tokio::test]
    async fn unreachable_server_is_a_transport_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let config = ClientConfig {
            timeout: Some(Duration::from_secs(5)),
            ..ClientConfig::default()
        };
        let client = HttpClient::connect_with_config(&format!("http://{addr}/"), &config).unwrap();
        let err = client
            .call_value("double", serde_json::json!(1))
            .await
            .unwrap_err();
        assert!(matches!(err, RpcError::Transport(_)));
    }
}
