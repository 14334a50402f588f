//! HTTP implementation of the fetch capability.
//!
//! Each tab kind maps to `{server}/projects/{id}/{resource}`. A load is a
//! `GET`; a recompute is a `PUT` carrying the tab's parameters as query
//! parameters under the server's names.

use reqwest::Url;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue, USER_AGENT};
use serde::Deserialize;

use rst_sync::{FetchError, FetchMode, FetchOutcome, ResourceDescriptor, ResultFetcher};

use crate::decode::{decode, server_parameter_name};
use crate::error::{ClientError, Result};
use crate::settings::ClientSettings;

/// User agent string for API requests.
const USER_AGENT_VALUE: &str = concat!("rst-client/", env!("CARGO_PKG_VERSION"));

/// Fetches result sets from the computation server.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    base: Url,
}

impl HttpFetcher {
    /// Creates a fetcher for the server named in `settings`.
    ///
    /// # Errors
    ///
    /// Fails if the server base is not an absolute URL or the HTTP client
    /// cannot be built.
    pub fn new(settings: &ClientSettings) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(settings.timeout())
            .build()?;

        Self::with_client(client, &settings.server_base)
    }

    /// Creates a fetcher around an already configured client.
    ///
    /// # Errors
    ///
    /// Fails if `server_base` is not an absolute URL.
    pub fn with_client(client: reqwest::Client, server_base: &str) -> Result<Self> {
        let base = Url::parse(server_base).map_err(|e| ClientError::InvalidUrl {
            url: server_base.to_string(),
            reason: e.to_string(),
        })?;
        if base.cannot_be_a_base() {
            return Err(ClientError::InvalidUrl {
                url: server_base.to_string(),
                reason: "not a hierarchical URL".to_string(),
            });
        }
        Ok(Self { client, base })
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    /// URL a descriptor is sent to.
    ///
    /// # Errors
    ///
    /// Fails only if the base cannot carry path segments.
    pub fn endpoint(&self, descriptor: &ResourceDescriptor) -> Result<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| ClientError::InvalidUrl {
                url: self.base.to_string(),
                reason: "not a hierarchical URL".to_string(),
            })?
            .pop_if_empty()
            .extend([
                "projects",
                descriptor.result_id.as_str(),
                descriptor.kind.resource_name(),
            ]);

        if descriptor.mode == FetchMode::Recompute && !descriptor.parameters.is_empty() {
            url.query_pairs_mut().extend_pairs(
                descriptor
                    .parameters
                    .iter()
                    .map(|(key, value)| (server_parameter_name(key), value.to_string())),
            );
        }
        Ok(url)
    }

    async fn fetch(&self, descriptor: &ResourceDescriptor) -> FetchOutcome {
        let url = self.endpoint(descriptor)?;
        tracing::debug!(%url, mode = %descriptor.mode, "sending request");

        let request = match descriptor.mode {
            FetchMode::Load => self.client.get(url),
            FetchMode::Recompute => self.client.put(url),
        };
        let response = request.send().await.map_err(ClientError::from)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Status {
                status: status.as_u16(),
                message: server_message(&body),
            });
        }

        let body = response.bytes().await.map_err(ClientError::from)?;
        decode(descriptor.kind, &body)
    }
}

impl ResultFetcher for HttpFetcher {
    async fn perform(&self, descriptor: &ResourceDescriptor) -> FetchOutcome {
        let outcome = self.fetch(descriptor).await;
        if let Err(err) = &outcome {
            tracing::debug!(resource = descriptor.kind.resource_name(), error = %err, "request failed");
        }
        outcome
    }
}

/// Error text from a failed response: the `message` field of a JSON error
/// body, else the body itself.
fn server_message(body: &str) -> String {
    #[derive(Deserialize)]
    struct ErrorBody {
        message: Option<String>,
    }

    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|parsed| parsed.message)
        .unwrap_or_else(|| body.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rst_sync::{ParamValue, Parameters, ResultId, TabKind};

    fn descriptor(kind: TabKind, mode: FetchMode, parameters: Parameters) -> ResourceDescriptor {
        ResourceDescriptor {
            kind,
            result_id: ResultId::from("5f1c"),
            mode,
            parameters,
        }
    }

    #[test]
    fn test_load_endpoint() {
        let fetcher = HttpFetcher::new(&ClientSettings::default()).unwrap();
        let url = fetcher
            .endpoint(&descriptor(TabKind::CrossValidation, FetchMode::Load, Parameters::new()))
            .unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/projects/5f1c/crossValidation");
    }

    #[test]
    fn test_recompute_endpoint_uses_server_names() {
        let fetcher = HttpFetcher::new(&ClientSettings::default()).unwrap();
        let mut parameters = Parameters::new();
        parameters.insert("typeOfClassifier".into(), ParamValue::from("SimpleRuleClassifier"));
        parameters.insert("seed".into(), ParamValue::Integer(7));

        let url = fetcher
            .endpoint(&descriptor(TabKind::Classification, FetchMode::Recompute, parameters))
            .unwrap();
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(
            pairs,
            [
                ("seed".to_string(), "7".to_string()),
                ("classifierType".to_string(), "SimpleRuleClassifier".to_string()),
            ]
        );
    }

    #[test]
    fn test_base_with_path_prefix() {
        let settings = ClientSettings::default().with_server("http://rules.example/api/");
        let fetcher = HttpFetcher::new(&settings).unwrap();
        let url = fetcher
            .endpoint(&descriptor(TabKind::Rules, FetchMode::Load, Parameters::new()))
            .unwrap();
        assert_eq!(url.as_str(), "http://rules.example/api/projects/5f1c/rules");
    }

    #[test]
    fn test_relative_base_is_rejected() {
        let settings = ClientSettings::default().with_server("localhost:8080");
        assert!(matches!(
            HttpFetcher::new(&settings),
            Err(ClientError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn test_server_message() {
        assert_eq!(
            server_message(r#"{"status": 404, "message": "Project not found"}"#),
            "Project not found"
        );
        assert_eq!(server_message("  Bad Gateway \n"), "Bad Gateway");
    }
}
