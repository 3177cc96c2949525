//! REST repository over a PostgREST-style collection endpoint.
//!
//! # Responsibility
//! - Translate fetch-all/create/delete into GET/POST/DELETE requests.
//! - Encode and decode the JSON wire representation of records.
//!
//! # Invariants
//! - A response is accepted only with the operation's expected status
//!   (200 for GET, 201 for POST, 204 for DELETE).
//! - Logged request paths never include the query string or the API key.
//! - No request is retried.

use crate::config::{ApiKeyPlacement, BackendConfig};
use crate::model::record::Record;
use crate::repo::record_repo::{RecordRepository, RepoError, RepoOperation, RepoResult};
use log::{debug, warn};
use std::marker::PhantomData;
use std::time::Instant;
use ureq::http::Response;
use ureq::{Agent, Body, RequestBuilder};
use url::Url;

const API_KEY_PARAM: &str = "apikey";
const ID_FILTER_PARAM: &str = "id";

/// Blocking HTTP repository for one record type.
pub struct HttpRecordRepository<E: Record> {
    agent: Agent,
    collection_url: Url,
    api_key: String,
    api_key_placement: ApiKeyPlacement,
    _record: PhantomData<fn() -> E>,
}

impl<E: Record> HttpRecordRepository<E> {
    /// Creates a repository for the collection configured for `E::KIND`.
    pub fn new(config: &BackendConfig) -> Self {
        let proxy = config
            .proxy_url()
            .and_then(|url| match ureq::Proxy::new(url.as_str()) {
                Ok(proxy) => Some(proxy),
                Err(err) => {
                    warn!(
                        "event=http_proxy module=repo status=error kind={} error={err}",
                        E::KIND
                    );
                    None
                }
            });
        let agent: Agent = Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(config.timeout())
            .proxy(proxy)
            .build()
            .into();

        Self {
            agent,
            collection_url: config.collection_url(E::KIND),
            api_key: config.api_key().to_string(),
            api_key_placement: config.api_key_placement(),
            _record: PhantomData,
        }
    }

    /// Collection endpoint without credentials or filters.
    pub fn collection_url(&self) -> &Url {
        &self.collection_url
    }

    fn request_url(&self, id_filter: Option<&E::Id>) -> Url {
        let mut url = self.collection_url.clone();
        let with_key = self.api_key_placement == ApiKeyPlacement::Query;
        if id_filter.is_none() && !with_key {
            return url;
        }

        {
            let mut pairs = url.query_pairs_mut();
            if let Some(id) = id_filter {
                pairs.append_pair(ID_FILTER_PARAM, &format!("eq.{id}"));
            }
            if with_key {
                pairs.append_pair(API_KEY_PARAM, &self.api_key);
            }
        }
        url
    }

    fn authorize<B>(&self, request: RequestBuilder<B>) -> RequestBuilder<B> {
        match self.api_key_placement {
            ApiKeyPlacement::Header => request.header(API_KEY_PARAM, self.api_key.as_str()),
            ApiKeyPlacement::Query => request,
        }
    }

    fn check_response(
        &self,
        operation: RepoOperation,
        started_at: Instant,
        result: Result<Response<Body>, ureq::Error>,
    ) -> RepoResult<Response<Body>> {
        let kind = E::KIND.as_str();
        let path = self.collection_url.path();
        let duration_ms = started_at.elapsed().as_millis();

        let response = result.map_err(|err| {
            warn!(
                "event=http_request module=repo status=error kind={kind} method={} path={path} duration_ms={duration_ms} error_code=transport error={err}",
                operation.http_method()
            );
            RepoError::Transport(err.to_string())
        })?;

        let status = response.status().as_u16();
        if status != operation.expected_status() {
            warn!(
                "event=http_request module=repo status=error kind={kind} method={} path={path} duration_ms={duration_ms} error_code=server_rejected http_status={status}",
                operation.http_method()
            );
            return Err(RepoError::ServerRejected { operation, status });
        }

        debug!(
            "event=http_request module=repo status=ok kind={kind} method={} path={path} duration_ms={duration_ms} http_status={status}",
            operation.http_method()
        );
        Ok(response)
    }
}

impl<E: Record> RecordRepository<E> for HttpRecordRepository<E> {
    fn fetch_all(&self) -> RepoResult<Vec<E>> {
        let operation = RepoOperation::FetchAll;
        let url = self.request_url(None);
        let started_at = Instant::now();

        let result = self.authorize(self.agent.get(url.as_str())).call();
        let mut response = self.check_response(operation, started_at, result)?;
        let body = response
            .body_mut()
            .read_to_string()
            .map_err(|err| RepoError::Transport(err.to_string()))?;

        decode_records(&body)
    }

    fn create(&self, record: &E) -> RepoResult<()> {
        record.validate()?;
        let body =
            serde_json::to_string(record).map_err(|err| RepoError::Encoding(err.to_string()))?;

        let operation = RepoOperation::Create;
        let url = self.request_url(None);
        let started_at = Instant::now();

        let result = self
            .authorize(self.agent.post(url.as_str()))
            .header("Content-Type", "application/json")
            .send(body.as_str());
        self.check_response(operation, started_at, result)?;
        Ok(())
    }

    fn delete(&self, id: &E::Id) -> RepoResult<()> {
        let operation = RepoOperation::Delete;
        let url = self.request_url(Some(id));
        let started_at = Instant::now();

        let result = self.authorize(self.agent.delete(url.as_str())).call();
        self.check_response(operation, started_at, result)?;
        Ok(())
    }
}

/// Decodes a JSON array body and applies read-path validation.
pub(crate) fn decode_records<E: Record>(body: &str) -> RepoResult<Vec<E>> {
    let records: Vec<E> =
        serde_json::from_str(body).map_err(|err| RepoError::Decoding(err.to_string()))?;

    for record in &records {
        record.validate().map_err(|err| {
            RepoError::Decoding(format!("{} `{}`: {err}", E::KIND, record.id()))
        })?;
    }
    Ok(records)
}
