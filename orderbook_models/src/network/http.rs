use crate::error::{Error, ModelResult};
use error_stack::{ResultExt, report};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde_json::value::Value;
use tracing::error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    GET,
    POST,
}

impl HttpMethod {
    pub fn as_str(&self) -> &str {
        match self {
            HttpMethod::GET => "GET",
            HttpMethod::POST => "POST",
        }
    }
}

/// Converts a JSON object into a query string with keys sorted
/// alphabetically. Null values are dropped.
///
/// # Errors
///
/// Returns `Error::ParseError` if `value` is not a JSON object.
pub fn value_to_sorted_querystring(value: &Value) -> ModelResult<String> {
    let mut pairs: Vec<(String, String)> = match value {
        Value::Object(map) => map
            .iter()
            .filter(|(_, v)| !matches!(v, Value::Null))
            .map(|(k, v)| {
                let value_str = match v {
                    Value::String(s) => s.to_string(),
                    _ => v.to_string(),
                };
                (k.clone(), value_str)
            })
            .collect(),
        _ => {
            return Err(report!(Error::ParseError)
                .attach_printable(format!("Invalid JSON Object: {value:?}")));
        }
    };

    pairs.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(pairs
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<String>>()
        .join("&"))
}

pub async fn handle_reqwest_response<T: DeserializeOwned>(response: Response) -> ModelResult<T> {
    let response_code: u16 = response.status().as_u16();
    match response_code {
        0..=399 => {
            let content_type = response
                .headers()
                .get("content-type")
                .and_then(|value| value.to_str().ok())
                .unwrap_or("");

            // Json is the default content type
            if content_type.contains("application/json") || content_type.is_empty() {
                response
                    .json()
                    .await
                    .change_context(Error::SerdeDeserialize("Failed to deserialize JSON".to_string()))
            } else {
                Err(report!(Error::ParseError)
                    .attach_printable(format!("Unsupported Content-Type: {content_type}")))
            }
        }
        _ => {
            let error_body = response.text().await.change_context(Error::ReqwestError(
                "Failed to get text from response".to_string(),
            ))?;

            error!("Error Body: {}", &error_body);

            Err(report!(Error::ReqwestError(error_body)))
        }
    }
}

/// Builds `base_url` + `path` with an optional sorted query, sends it and
/// decodes the JSON body.
pub async fn send_request<T: DeserializeOwned>(
    client: &Client,
    base_url: &str,
    path: &str,
    query: Option<Value>,
    body: Option<Value>,
    method: HttpMethod,
) -> ModelResult<T> {
    let url = build_url(base_url, path, query.as_ref())?;
    tracing::debug!("{} {}", method.as_str(), url);

    let mut request = match method {
        HttpMethod::GET => client.get(&url),
        HttpMethod::POST => client.post(&url),
    };
    if let Some(body) = body {
        request = request.json(&body);
    }

    let response = request
        .send()
        .await
        .change_context(Error::ReqwestError(format!("Error sending request to {url}")))?;

    handle_reqwest_response(response).await
}

pub fn build_url(base_url: &str, path: &str, query: Option<&Value>) -> ModelResult<String> {
    let base = format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    );
    match query {
        Some(query) => {
            let query = value_to_sorted_querystring(query)?;
            if query.is_empty() {
                Ok(base)
            } else {
                Ok(format!("{base}?{query}"))
            }
        }
        None => Ok(base),
    }
}
