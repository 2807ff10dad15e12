use async_trait::async_trait;
use reqwest::{
    Client, Method, RequestBuilder, Response, StatusCode, Url,
    header::{AUTHORIZATION, HeaderName, HeaderValue},
};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::{
    BackendEndpoint, BackendError, BackendResult, BackendSettings, Connect, Filter, RowStore,
};

const REST_PATH: &str = "rest/v1/";

fn apikey_header() -> HeaderName {
    HeaderName::from_static("apikey")
}

fn prefer_header() -> HeaderName {
    HeaderName::from_static("prefer")
}

fn return_minimal() -> HeaderValue {
    HeaderValue::from_static("return=minimal")
}

/// Creates a credential-scoped [`RestClient`] per request.
///
/// The settings are resolved on every [`Connect::connect`] call; only the
/// underlying HTTP client (and its idle connections) is shared.
#[derive(Clone, Debug)]
pub struct RestConnector {
    http: Client,
    settings: BackendSettings,
}

impl RestConnector {
    pub fn new(settings: BackendSettings) -> Self {
        Self {
            http: Client::new(),
            settings,
        }
    }
}

impl Connect for RestConnector {
    fn connect(&self, authorization: Option<&HeaderValue>) -> BackendResult<Box<dyn RowStore>> {
        let endpoint = self.settings.resolve();
        let client = RestClient::new(self.http.clone(), &endpoint, authorization)?;
        Ok(Box::new(client))
    }
}

/// PostgREST client acting under one caller's identity, so the backend's
/// row-level-security policies apply to every call it makes.
#[derive(Clone, Debug)]
pub struct RestClient {
    http: Client,
    rest_url: Url,
    apikey: HeaderValue,
    authorization: HeaderValue,
}

impl RestClient {
    /// Without a forwarded `Authorization` header the anon key is used as
    /// the bearer token.
    pub fn new(
        http: Client,
        endpoint: &BackendEndpoint,
        authorization: Option<&HeaderValue>,
    ) -> BackendResult<Self> {
        if endpoint.url.trim().is_empty() {
            return Err(BackendError::MissingUrl);
        }
        if endpoint.anon_key.trim().is_empty() {
            return Err(BackendError::MissingAnonKey);
        }

        let base = endpoint.url.trim().trim_end_matches('/');
        let rest_url = Url::parse(&format!("{base}/{REST_PATH}"))
            .map_err(|err| BackendError::InvalidUrl(err.to_string()))?;
        let apikey =
            HeaderValue::from_str(&endpoint.anon_key).map_err(|_| BackendError::InvalidAnonKey)?;
        let mut authorization = match authorization {
            Some(value) => value.clone(),
            None => HeaderValue::from_str(&format!("Bearer {}", endpoint.anon_key))
                .map_err(|_| BackendError::InvalidAnonKey)?,
        };
        authorization.set_sensitive(true);

        Ok(Self {
            http,
            rest_url,
            apikey,
            authorization,
        })
    }

    fn request(&self, method: Method, table: &str) -> BackendResult<RequestBuilder> {
        let url = self
            .rest_url
            .join(table)
            .map_err(|err| BackendError::InvalidUrl(err.to_string()))?;
        Ok(self
            .http
            .request(method, url)
            .header(apikey_header(), self.apikey.clone())
            .header(AUTHORIZATION, self.authorization.clone()))
    }
}

#[async_trait]
impl RowStore for RestClient {
    async fn select(
        &self,
        table: &str,
        columns: &str,
        filter: Option<&Filter>,
    ) -> BackendResult<Value> {
        let mut query = vec![("select".to_string(), clean_columns(columns))];
        query.extend(filter.map(Filter::to_query));
        debug!(table, ?filter, "backend select");
        let response = self
            .request(Method::GET, table)?
            .query(&query)
            .send()
            .await?;
        let response = ensure_success(response).await?;
        Ok(response.json::<Value>().await?)
    }

    async fn insert(&self, table: &str, payload: &Value) -> BackendResult<()> {
        debug!(table, "backend insert");
        let response = self
            .request(Method::POST, table)?
            .header(prefer_header(), return_minimal())
            .json(payload)
            .send()
            .await?;
        ensure_success(response).await?;
        Ok(())
    }

    async fn update(&self, table: &str, payload: &Value, filter: &Filter) -> BackendResult<()> {
        debug!(table, ?filter, "backend update");
        let response = self
            .request(Method::PATCH, table)?
            .header(prefer_header(), return_minimal())
            .query(&[filter.to_query()])
            .json(payload)
            .send()
            .await?;
        ensure_success(response).await?;
        Ok(())
    }

    async fn delete(&self, table: &str, filter: &Filter) -> BackendResult<()> {
        debug!(table, ?filter, "backend delete");
        let response = self
            .request(Method::DELETE, table)?
            .header(prefer_header(), return_minimal())
            .query(&[filter.to_query()])
            .send()
            .await?;
        ensure_success(response).await?;
        Ok(())
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
    #[serde(default)]
    code: Option<String>,
}

/// Pass successful responses through; turn anything else into
/// [`BackendError::Api`] carrying the backend's message.
async fn ensure_success(response: Response) -> BackendResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(api_error(status, &body))
}

fn api_error(status: StatusCode, body: &str) -> BackendError {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(parsed) => BackendError::Api {
            status,
            code: parsed.code,
            message: parsed.message,
        },
        Err(_) if body.trim().is_empty() => BackendError::Api {
            status,
            code: None,
            message: status.to_string(),
        },
        Err(_) => BackendError::Api {
            status,
            code: None,
            message: body.trim().to_string(),
        },
    }
}

/// Strip whitespace outside double quotes from a select list, so
/// `jobs: job_id (job_title)` goes out as `jobs:job_id(job_title)`.
fn clean_columns(columns: &str) -> String {
    let mut quoted = false;
    columns
        .chars()
        .filter(|ch| {
            if *ch == '"' {
                quoted = !quoted;
            }
            quoted || !ch.is_whitespace()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_response(status: u16, body: &str) -> Response {
        let http_resp = http::Response::builder()
            .status(status)
            .header("content-type", "application/json")
            .body(body.to_string())
            .unwrap();
        Response::from(http_resp)
    }

    fn endpoint(url: &str, key: &str) -> BackendEndpoint {
        BackendEndpoint {
            url: url.into(),
            anon_key: key.into(),
        }
    }

    #[test]
    fn select_list_is_compacted_outside_quotes() {
        assert_eq!(
            clean_columns("job_id, first_name, last_name, jobs: job_id (job_title)"),
            "job_id,first_name,last_name,jobs:job_id(job_title)"
        );
        assert_eq!(clean_columns("\"full name\", id"), "\"full name\",id");
    }

    #[test]
    fn empty_url_fails_client_construction() {
        let err = RestClient::new(Client::new(), &endpoint("", "anon"), None).unwrap_err();
        assert!(matches!(err, BackendError::MissingUrl));
        assert_eq!(err.to_string(), "backend url is required");
    }

    #[test]
    fn empty_key_fails_client_construction() {
        let err = RestClient::new(Client::new(), &endpoint("http://localhost:54321", ""), None)
            .unwrap_err();
        assert!(matches!(err, BackendError::MissingAnonKey));
    }

    #[test]
    fn anon_key_becomes_bearer_without_forwarded_header() {
        let client =
            RestClient::new(Client::new(), &endpoint("http://localhost:54321/", "anon"), None)
                .unwrap();
        assert_eq!(client.authorization, "Bearer anon");
        assert_eq!(client.apikey, "anon");
        assert_eq!(client.rest_url.as_str(), "http://localhost:54321/rest/v1/");
    }

    #[test]
    fn forwarded_header_is_kept_verbatim() {
        let caller = HeaderValue::from_static("Bearer user-jwt");
        let client = RestClient::new(
            Client::new(),
            &endpoint("http://localhost:54321", "anon"),
            Some(&caller),
        )
        .unwrap();
        assert_eq!(client.authorization, "Bearer user-jwt");
        assert!(client.authorization.is_sensitive());
    }

    #[tokio::test]
    async fn backend_message_is_surfaced() {
        let response = make_response(
            404,
            r#"{"code":"42P01","details":null,"hint":null,"message":"relation does not exist"}"#,
        );
        let err = ensure_success(response).await.unwrap_err();
        match err {
            BackendError::Api {
                status,
                code,
                message,
            } => {
                assert_eq!(status, StatusCode::NOT_FOUND);
                assert_eq!(code.as_deref(), Some("42P01"));
                assert_eq!(message, "relation does not exist");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn plain_text_errors_keep_body() {
        let response = make_response(502, "upstream unavailable\n");
        let err = ensure_success(response).await.unwrap_err();
        assert_eq!(err.to_string(), "upstream unavailable");
    }

    #[tokio::test]
    async fn empty_error_body_falls_back_to_status() {
        let response = make_response(401, "");
        let err = ensure_success(response).await.unwrap_err();
        assert_eq!(err.to_string(), "401 Unauthorized");
    }

    #[tokio::test]
    async fn success_passes_through() {
        let response = make_response(200, "[]");
        let response = ensure_success(response).await.unwrap();
        let body: Value = response.json().await.unwrap();
        assert_eq!(body, Value::Array(Vec::new()));
    }
}
