/*
    Copyright 2025 MydriaTech AB

    Licensed under the Apache License 2.0 with Free world makers exception
    1.0.0 (the "License"); you may not use this file except in compliance with
    the License. You should have obtained a copy of the License with the source
    or binary distribution in file named

        LICENSE-Apache-2.0-with-FWM-Exception-1.0.0

    Unless required by applicable law or agreed to in writing, software
    distributed under the License is distributed on an "AS IS" BASIS,
    WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
    See the License for the specific language governing permissions and
    limitations under the License.
*/


//! Minimal Elasticsearch REST API client.

use iotdm_dbp::common::PlatformError;
use iotdm_dbp::common::PlatformErrorKind;
use iotdm_dbp::index::IndexDocument;
use reqwest::Client;
use reqwest::ClientBuilder;
use reqwest::Method;
use reqwest::StatusCode;
use reqwest::Url;
use reqwest::header::CONTENT_TYPE;
use serde_json::Value;
use serde_json::json;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::time::Duration;

/// Minimal Elasticsearch REST API client.
///
/// Requests are spread over the endpoints in round-robin order. Failures are
/// reported as [PlatformErrorKind::IndexOperationFailed].
pub struct ElasticClient {
    endpoints: Vec<Url>,
    next_endpoint: AtomicUsize,
    username: Option<String>,
    password: String,
    // Client uses an Arc internally, so it doesn't need Arc<> wrapping here
    client: Client,
}

impl ElasticClient {
    const MIME_APPLICATION_JSON: &'static str = "application/json";
    const MIME_APPLICATION_NDJSON: &'static str = "application/x-ndjson";

    /// Return a new instance.
    pub fn new(endpoints: &[String], username: &str, password: &str) -> Result<Self, PlatformError> {
        let endpoints = endpoints
            .iter()
            .map(|endpoint| {
                Url::parse(endpoint).map_err(|e| {
                    PlatformErrorKind::BackendOperationFailed
                        .error_with_msg(format!("Invalid endpoint '{endpoint}': {e}"))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        if endpoints.is_empty() {
            return Err(PlatformErrorKind::BackendOperationFailed
                .error_with_msg("At least one Elasticsearch endpoint is required."));
        }
        let client = ClientBuilder::new()
            .referer(false)
            .brotli(true)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| {
                PlatformErrorKind::BackendOperationFailed
                    .error_with_msg(format!("Failed to create HTTP client: {e}"))
            })?;
        Ok(Self {
            endpoints,
            next_endpoint: AtomicUsize::default(),
            username: Some(username.to_owned()).filter(|username| !username.is_empty()),
            password: password.to_owned(),
            client,
        })
    }

    /// Return true if the index exists.
    pub async fn index_exists(&self, index: &str) -> Result<bool, PlatformError> {
        let (status, _body) = self.request(Method::HEAD, &[index], None, None).await?;
        match status {
            StatusCode::OK => Ok(true),
            StatusCode::NOT_FOUND => Ok(false),
            status => Err(Self::unexpected_status("HEAD", index, status, "")),
        }
    }

    /// Create an index with the provided mappings.
    ///
    /// An index created concurrently by someone else is not treated as a
    /// failure.
    pub async fn index_create(&self, index: &str, mappings: &Value) -> Result<(), PlatformError> {
        let body = json!({ "mappings": mappings });
        let (status, body) = self
            .request(Method::PUT, &[index], None, Some(Self::json_body(&body)))
            .await?;
        if status.is_success() || body.contains("resource_already_exists_exception") {
            Ok(())
        } else {
            Err(Self::unexpected_status("PUT", index, status, &body))
        }
    }

    /// Add new property mappings to an existing index.
    pub async fn index_mapping_put(&self, index: &str, mappings: &Value) -> Result<(), PlatformError> {
        let (status, body) = self
            .request(
                Method::PUT,
                &[index, "_mapping"],
                None,
                Some(Self::json_body(mappings)),
            )
            .await?;
        Self::expect_success("PUT", index, status, &body)
    }

    /// Index documents using the bulk API.
    ///
    /// Documents with an `id` property use it as document identifier.
    pub async fn bulk_index(
        &self,
        index: &str,
        documents: &[IndexDocument],
    ) -> Result<(), PlatformError> {
        if documents.is_empty() {
            return Ok(());
        }
        let mut ndjson = String::new();
        for document in documents {
            let action = match document.get("id").and_then(Self::as_document_id) {
                Some(id) => json!({ "index": { "_index": index, "_id": id } }),
                None => json!({ "index": { "_index": index } }),
            };
            ndjson.push_str(&action.to_string());
            ndjson.push('\n');
            ndjson.push_str(&Value::Object(document.to_owned()).to_string());
            ndjson.push('\n');
        }
        let (status, body) = self
            .request(
                Method::POST,
                &["_bulk"],
                Some("refresh=wait_for"),
                Some((ndjson, Self::MIME_APPLICATION_NDJSON)),
            )
            .await?;
        Self::expect_success("POST", "_bulk", status, &body)?;
        let response = Self::parse_json("_bulk", &body)?;
        if response.get("errors").and_then(Value::as_bool) == Some(true) {
            let reason = response
                .get("items")
                .and_then(Value::as_array)
                .and_then(|items| {
                    items.iter().find_map(|item| {
                        item.get("index")
                            .and_then(|action| action.get("error"))
                            .map(Value::to_string)
                    })
                })
                .unwrap_or_default();
            return Err(PlatformErrorKind::IndexOperationFailed.error_with_msg(format!(
                "Bulk indexing into '{index}' failed for some documents: {reason}"
            )));
        }
        Ok(())
    }

    /// Run a search request and return the raw response.
    ///
    /// Searching a missing index yields an empty response.
    pub async fn search(&self, index: &str, request: &Value) -> Result<Value, PlatformError> {
        let (status, body) = self
            .request(
                Method::POST,
                &[index, "_search"],
                Some("ignore_unavailable=true"),
                Some(Self::json_body(request)),
            )
            .await?;
        Self::expect_success("POST", index, status, &body)?;
        Self::parse_json(index, &body)
    }

    /// Open a point in time on the index and return its identifier.
    pub async fn point_in_time_open(
        &self,
        index: &str,
        keep_alive: &str,
    ) -> Result<String, PlatformError> {
        let query = format!("keep_alive={keep_alive}&ignore_unavailable=true");
        let (status, body) = self
            .request(Method::POST, &[index, "_pit"], Some(&query), None)
            .await?;
        Self::expect_success("POST", index, status, &body)?;
        Self::parse_json(index, &body)?
            .get("id")
            .and_then(Value::as_str)
            .map(str::to_owned)
            .ok_or_else(|| {
                PlatformErrorKind::IndexOperationFailed
                    .error_with_msg(format!("Point in time response from '{index}' lacks an id."))
            })
    }

    /// Run a search request within a point in time and return the raw
    /// response.
    pub async fn point_in_time_search(&self, request: &Value) -> Result<Value, PlatformError> {
        let (status, body) = self
            .request(Method::POST, &["_search"], None, Some(Self::json_body(request)))
            .await?;
        Self::expect_success("POST", "_search", status, &body)?;
        Self::parse_json("_search", &body)
    }

    /// Release a point in time. An already expired one is not a failure.
    pub async fn point_in_time_close(&self, pit_id: &str) -> Result<(), PlatformError> {
        let body = json!({ "id": pit_id });
        let (status, body) = self
            .request(Method::DELETE, &["_pit"], None, Some(Self::json_body(&body)))
            .await?;
        if status == StatusCode::NOT_FOUND {
            return Ok(());
        }
        Self::expect_success("DELETE", "_pit", status, &body)
    }

    /// Return the number of documents matching the request.
    pub async fn count(&self, index: &str, request: &Value) -> Result<u64, PlatformError> {
        let (status, body) = self
            .request(
                Method::POST,
                &[index, "_count"],
                Some("ignore_unavailable=true"),
                Some(Self::json_body(request)),
            )
            .await?;
        Self::expect_success("POST", index, status, &body)?;
        Self::parse_json(index, &body)?
            .get("count")
            .and_then(Value::as_u64)
            .ok_or_else(|| {
                PlatformErrorKind::IndexOperationFailed
                    .error_with_msg(format!("Count response from '{index}' lacks a count."))
            })
    }

    /// Return the source of the document if present.
    pub async fn document_get(&self, index: &str, id: &str) -> Result<Option<Value>, PlatformError> {
        let (status, body) = self
            .request(Method::GET, &[index, "_doc", id], None, None)
            .await?;
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        Self::expect_success("GET", index, status, &body)?;
        Ok(Self::parse_json(index, &body)?.get_mut("_source").map(Value::take))
    }

    /// Create or replace a document.
    pub async fn document_put(&self, index: &str, id: &str, source: &Value) -> Result<(), PlatformError> {
        let (status, body) = self
            .request(
                Method::PUT,
                &[index, "_doc", id],
                Some("refresh=wait_for"),
                Some(Self::json_body(source)),
            )
            .await?;
        Self::expect_success("PUT", index, status, &body)
    }

    /// Delete a document and return true if it existed.
    pub async fn document_delete(&self, index: &str, id: &str) -> Result<bool, PlatformError> {
        let (status, body) = self
            .request(
                Method::DELETE,
                &[index, "_doc", id],
                Some("refresh=wait_for"),
                None,
            )
            .await?;
        if status == StatusCode::NOT_FOUND {
            return Ok(false);
        }
        Self::expect_success("DELETE", index, status, &body).map(|_| true)
    }

    /// Send a request to the next endpoint and return the status code and
    /// response body.
    async fn request(
        &self,
        method: Method,
        path_segments: &[&str],
        query: Option<&str>,
        body: Option<(String, &'static str)>,
    ) -> Result<(StatusCode, String), PlatformError> {
        let url = self.url(path_segments, query)?;
        if log::log_enabled!(log::Level::Trace) {
            log::trace!("{method} {url}");
        }
        let mut request_builder = self.client.request(method, url.clone());
        if let Some(username) = &self.username {
            request_builder = request_builder.basic_auth(username, Some(&self.password));
        }
        if let Some((content, content_type)) = body {
            request_builder = request_builder
                .header(&CONTENT_TYPE, content_type)
                .body(content);
        }
        let response = request_builder.send().await.map_err(|e| {
            PlatformErrorKind::IndexOperationFailed
                .error_with_msg(format!("Failed request to '{url}': {:?}", e.without_url()))
        })?;
        let status = response.status();
        let body = response.text().await.map_err(|e| {
            PlatformErrorKind::IndexOperationFailed.error_with_msg(format!(
                "Failed request to '{url}': Failed to read response body: {:?}",
                e.without_url()
            ))
        })?;
        Ok((status, body))
    }

    /// Build the request URL from the next endpoint in turn.
    fn url(&self, path_segments: &[&str], query: Option<&str>) -> Result<Url, PlatformError> {
        let next = self.next_endpoint.fetch_add(1, Ordering::Relaxed);
        let mut url = self.endpoints[next % self.endpoints.len()].clone();
        url.path_segments_mut()
            .map_err(|_| {
                PlatformErrorKind::BackendOperationFailed
                    .error_with_msg("Elasticsearch endpoint can't be used as a base URL.")
            })?
            .pop_if_empty()
            .extend(path_segments);
        url.set_query(query);
        Ok(url)
    }

    fn json_body(value: &Value) -> (String, &'static str) {
        (value.to_string(), Self::MIME_APPLICATION_JSON)
    }

    fn parse_json(index: &str, body: &str) -> Result<Value, PlatformError> {
        serde_json::from_str(body).map_err(|e| {
            PlatformErrorKind::IndexOperationFailed
                .error_with_msg(format!("Failed to parse response for '{index}': {e}"))
        })
    }

    fn expect_success(
        method: &str,
        index: &str,
        status: StatusCode,
        body: &str,
    ) -> Result<(), PlatformError> {
        if status.is_success() {
            Ok(())
        } else {
            Err(Self::unexpected_status(method, index, status, body))
        }
    }

    fn unexpected_status(method: &str, index: &str, status: StatusCode, body: &str) -> PlatformError {
        PlatformErrorKind::IndexOperationFailed
            .error_with_msg(format!("{method} on '{index}' failed with {status}: {body}"))
    }

    /// Document identifiers are strings, numbers are accepted as well.
    fn as_document_id(value: &Value) -> Option<String> {
        match value {
            Value::String(id) if !id.is_empty() => Some(id.to_owned()),
            Value::Number(id) => Some(id.to_string()),
            _ => None,
        }
    }
}
