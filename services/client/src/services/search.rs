//! services/client/src/services/search.rs
//!
//! Search calls against `/v1/search`, normalized into domain results.

use crate::api_client::ApiClient;
use crate::error::{ClientError, ClientResult};
use crate::normalize::wire::SearchRequestWire;
use crate::normalize::{
    normalize_answer_response, normalize_document_lookup, normalize_search_response,
};
use academic_search_core::domain::{
    AnswerRecord, ResultRecord, SearchMode, SearchPage, SearchQuery,
};
use serde_json::json;
use std::sync::Arc;
use tracing::debug;

const SEARCH_BASE: &str = "/v1/search";

/// What one search call produced, by mode.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    Page(SearchPage),
    /// `None` when answer mode had nothing to say.
    Answer(Option<AnswerRecord>),
}

#[derive(Clone)]
pub struct SearchService {
    api: Arc<ApiClient>,
}

impl SearchService {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }

    pub async fn search(
        &self,
        mode: SearchMode,
        query: &SearchQuery,
    ) -> ClientResult<SearchOutcome> {
        if mode.is_answer() {
            return Ok(SearchOutcome::Answer(self.answer(query).await?));
        }
        Ok(SearchOutcome::Page(self.list(mode, query).await?))
    }

    /// POST /v1/search/{mode} for the list modes.
    async fn list(&self, mode: SearchMode, query: &SearchQuery) -> ClientResult<SearchPage> {
        let body = serde_json::to_value(SearchRequestWire::from_domain(query))
            .map_err(|e| ClientError::Internal(e.to_string()))?;
        let raw = self
            .api
            .post_json(&format!("{}/{}", SEARCH_BASE, mode.as_str()), body)
            .await?;

        let page = normalize_search_response(&raw.body);
        debug!(
            "{} search returned {} of {} records",
            mode,
            page.records.len(),
            page.total
        );
        Ok(page)
    }

    /// POST /v1/search/rag. Only the query text is sent.
    async fn answer(&self, query: &SearchQuery) -> ClientResult<Option<AnswerRecord>> {
        let raw = self
            .api
            .post_json(&format!("{}/rag", SEARCH_BASE), json!({ "query": query.text }))
            .await?;
        Ok(normalize_answer_response(&raw.body))
    }

    /// Looks a single document up through the filters endpoint.
    pub async fn document_by_id(&self, document_id: &str) -> ClientResult<Option<ResultRecord>> {
        let raw = self
            .api
            .post_json(
                &format!("{}/filters", SEARCH_BASE),
                json!({ "field": "documentId", "value": document_id }),
            )
            .await?;
        Ok(normalize_document_lookup(&raw.body))
    }
}
