//! services/client/src/normalize/wire.rs
//!
//! Serde records for the backend's JSON payloads and their conversions to and
//! from the core domain types.
//!
//! Incoming records are deliberately forgiving: every field is optional and a
//! field of the wrong type reads as absent instead of failing the record.

use academic_search_core::domain::{
    AcademicMetadata, AnswerRecord, BatchUploadOutcome, Concept, DocumentUpload,
    OpenAlexMetadata, ResultRecord, SciSpaceMetadata, SearchFilters, SearchQuery,
    SourceReference, UploadOutcome,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;
use std::str::FromStr;

//=========================================================================================
// Lenient Field Helpers
//=========================================================================================

/// Reads any value, keeping it only if it has the expected shape.
pub(crate) fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

/// Like `lenient`, but also accepts numbers sent as strings or as whole floats.
pub(crate) fn lenient_number<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + FromStr,
{
    let value = Value::deserialize(deserializer)?;
    Ok(coerce_number(value))
}

fn coerce_number<T>(value: Value) -> Option<T>
where
    T: DeserializeOwned + FromStr,
{
    match value {
        Value::String(raw) => raw.trim().parse().ok(),
        Value::Number(number) => {
            if let Ok(parsed) = serde_json::from_value(Value::Number(number.clone())) {
                return Some(parsed);
            }
            match number.as_f64() {
                Some(float) if float.fract() == 0.0 => format!("{}", float as i64).parse().ok(),
                _ => None,
            }
        }
        _ => None,
    }
}

/// Reads a list of strings, dropping non-string items. A bare string becomes
/// a single-item list.
pub(crate) fn lenient_strings<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s),
                _ => None,
            })
            .collect(),
        Value::String(s) if !s.trim().is_empty() => vec![s],
        _ => Vec::new(),
    })
}

//=========================================================================================
// Academic Metadata
//=========================================================================================

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct OpenAccessWire {
    #[serde(deserialize_with = "lenient")]
    is_open_access: Option<bool>,
    #[serde(deserialize_with = "lenient")]
    oa_status: Option<String>,
    #[serde(deserialize_with = "lenient")]
    oa_url: Option<String>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct ConceptWire {
    #[serde(deserialize_with = "lenient")]
    id: Option<String>,
    #[serde(deserialize_with = "lenient")]
    display_name: Option<String>,
    #[serde(deserialize_with = "lenient_number")]
    score: Option<f64>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct HostWire {
    #[serde(deserialize_with = "lenient")]
    display_name: Option<String>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct LocationWire {
    #[serde(deserialize_with = "lenient")]
    source: Option<HostWire>,
    #[serde(deserialize_with = "lenient")]
    pdf_url: Option<String>,
    #[serde(deserialize_with = "lenient")]
    landing_page_url: Option<String>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct PublicMetricsWire {
    #[serde(deserialize_with = "lenient_number")]
    citation_count: Option<u64>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct OpenAlexWire {
    #[serde(deserialize_with = "lenient")]
    work_id: Option<String>,
    #[serde(deserialize_with = "lenient")]
    doi: Option<String>,
    #[serde(deserialize_with = "lenient")]
    open_access: Option<OpenAccessWire>,
    #[serde(deserialize_with = "lenient")]
    concepts: Option<Vec<Value>>,
    #[serde(deserialize_with = "lenient")]
    primary_location: Option<LocationWire>,
    #[serde(deserialize_with = "lenient_strings")]
    referenced_works: Vec<String>,
    #[serde(deserialize_with = "lenient_strings")]
    related_works: Vec<String>,
    #[serde(deserialize_with = "lenient_number")]
    citation_count: Option<u64>,
    #[serde(deserialize_with = "lenient")]
    public_metrics: Option<PublicMetricsWire>,
}

impl OpenAlexWire {
    fn to_domain(self) -> OpenAlexMetadata {
        let open_access = self.open_access.unwrap_or_default();
        let location = self.primary_location.unwrap_or_default();
        let concepts = self
            .concepts
            .unwrap_or_default()
            .into_iter()
            .filter_map(|item| serde_json::from_value::<ConceptWire>(item).ok())
            .filter_map(|concept| {
                Some(Concept {
                    id: concept.id.unwrap_or_default(),
                    display_name: concept.display_name?,
                    score: concept.score.unwrap_or(0.0),
                })
            })
            .collect();

        OpenAlexMetadata {
            work_id: self.work_id,
            doi: self.doi,
            is_open_access: open_access.is_open_access,
            oa_status: open_access.oa_status,
            oa_url: open_access.oa_url,
            concepts,
            primary_source: location.source.and_then(|source| source.display_name),
            landing_page_url: location.landing_page_url,
            pdf_url: location.pdf_url,
            referenced_works: self.referenced_works,
            related_works: self.related_works,
            citation_count: self
                .citation_count
                .or_else(|| self.public_metrics.and_then(|m| m.citation_count)),
        }
    }
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct SciSpaceWire {
    #[serde(deserialize_with = "lenient")]
    sci_space_id: Option<String>,
    #[serde(deserialize_with = "lenient")]
    summary: Option<String>,
    #[serde(deserialize_with = "lenient")]
    methodology: Option<String>,
    #[serde(deserialize_with = "lenient_strings")]
    key_findings: Vec<String>,
    #[serde(deserialize_with = "lenient_strings")]
    limitations: Vec<String>,
    #[serde(deserialize_with = "lenient_strings")]
    future_work: Vec<String>,
    #[serde(deserialize_with = "lenient")]
    full_text_url: Option<String>,
}

impl SciSpaceWire {
    fn to_domain(self) -> SciSpaceMetadata {
        SciSpaceMetadata {
            sci_space_id: self.sci_space_id,
            summary: self.summary,
            methodology: self.methodology,
            key_findings: self.key_findings,
            limitations: self.limitations,
            future_work: self.future_work,
            full_text_url: self.full_text_url,
        }
    }
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct AcademicMetadataWire {
    #[serde(deserialize_with = "lenient")]
    open_alex: Option<OpenAlexWire>,
    #[serde(deserialize_with = "lenient")]
    sci_space: Option<SciSpaceWire>,
}

impl AcademicMetadataWire {
    /// `None` when neither provider contributed anything.
    fn to_domain(self) -> Option<AcademicMetadata> {
        if self.open_alex.is_none() && self.sci_space.is_none() {
            return None;
        }
        Some(AcademicMetadata {
            open_alex: self.open_alex.map(OpenAlexWire::to_domain),
            sci_space: self.sci_space.map(SciSpaceWire::to_domain),
        })
    }
}

//=========================================================================================
// Search Results
//=========================================================================================

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct ResultWire {
    #[serde(deserialize_with = "lenient")]
    id: Option<String>,
    #[serde(deserialize_with = "lenient")]
    document_id: Option<String>,
    #[serde(deserialize_with = "lenient")]
    title: Option<String>,
    #[serde(deserialize_with = "lenient_strings")]
    authors: Vec<String>,
    #[serde(rename = "abstract", deserialize_with = "lenient")]
    abstract_text: Option<String>,
    #[serde(deserialize_with = "lenient")]
    content: Option<String>,
    #[serde(deserialize_with = "lenient")]
    category: Option<String>,
    #[serde(deserialize_with = "lenient")]
    database: Option<String>,
    #[serde(deserialize_with = "lenient")]
    publication_date: Option<String>,
    #[serde(deserialize_with = "lenient_number")]
    citations: Option<u64>,
    #[serde(deserialize_with = "lenient")]
    url: Option<String>,
    #[serde(deserialize_with = "lenient_number")]
    score: Option<f64>,
    #[serde(deserialize_with = "lenient_strings")]
    highlights: Vec<String>,
    #[serde(deserialize_with = "lenient")]
    doi: Option<String>,
    #[serde(deserialize_with = "lenient")]
    venue: Option<String>,
    #[serde(deserialize_with = "lenient")]
    journal: Option<String>,
    #[serde(deserialize_with = "lenient_number")]
    year: Option<i32>,
    #[serde(deserialize_with = "lenient_strings")]
    keywords: Vec<String>,
    #[serde(deserialize_with = "lenient")]
    open_access: Option<bool>,
    #[serde(deserialize_with = "lenient")]
    pdf_url: Option<String>,
    #[serde(deserialize_with = "lenient")]
    academic_metadata: Option<AcademicMetadataWire>,
}

impl ResultWire {
    /// Parses one list item. Anything that is not a JSON object is rejected.
    pub(crate) fn parse(item: &Value) -> Option<Self> {
        if !item.is_object() {
            return None;
        }
        serde_json::from_value(item.clone()).ok()
    }

    pub(crate) fn to_domain(self) -> ResultRecord {
        let id = self.id.or_else(|| self.document_id.clone()).unwrap_or_default();
        let document_id = self.document_id.unwrap_or_else(|| id.clone());

        ResultRecord {
            id,
            document_id,
            title: self.title.unwrap_or_default(),
            authors: self.authors,
            abstract_text: self.abstract_text.unwrap_or_default(),
            content: self.content.unwrap_or_default(),
            category: self.category.unwrap_or_default(),
            database: self.database.unwrap_or_default(),
            publication_date: self.publication_date.unwrap_or_default(),
            citations: self.citations,
            url: self.url,
            score: self.score.unwrap_or(0.0),
            highlights: self.highlights,
            doi: self.doi,
            venue: self.venue,
            journal: self.journal,
            year: self.year,
            keywords: self.keywords,
            open_access: self.open_access,
            pdf_url: self.pdf_url,
            academic_metadata: self.academic_metadata.and_then(AcademicMetadataWire::to_domain),
        }
    }
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct SourceWire {
    #[serde(deserialize_with = "lenient")]
    document_id: Option<String>,
    #[serde(deserialize_with = "lenient")]
    text: Option<String>,
    #[serde(deserialize_with = "lenient")]
    excerpt: Option<String>,
    #[serde(deserialize_with = "lenient_number")]
    score: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    relevance_score: Option<f64>,
    #[serde(deserialize_with = "lenient")]
    title: Option<String>,
    #[serde(deserialize_with = "lenient_strings")]
    authors: Vec<String>,
    #[serde(deserialize_with = "lenient")]
    url: Option<String>,
    #[serde(deserialize_with = "lenient_number")]
    year: Option<i32>,
    #[serde(deserialize_with = "lenient")]
    venue: Option<String>,
    #[serde(deserialize_with = "lenient_number")]
    citations: Option<u64>,
    #[serde(deserialize_with = "lenient")]
    doi: Option<String>,
    #[serde(deserialize_with = "lenient")]
    academic_metadata: Option<AcademicMetadataWire>,
}

impl SourceWire {
    pub(crate) fn parse(item: &Value) -> Option<Self> {
        if !item.is_object() {
            return None;
        }
        serde_json::from_value(item.clone()).ok()
    }

    pub(crate) fn to_domain(self) -> SourceReference {
        SourceReference {
            document_id: self.document_id.unwrap_or_default(),
            excerpt: self.text.or(self.excerpt).unwrap_or_default(),
            score: self.score.or(self.relevance_score).unwrap_or(0.0),
            title: self.title,
            authors: self.authors,
            url: self.url,
            year: self.year,
            venue: self.venue,
            citations: self.citations,
            doi: self.doi,
            academic_metadata: self.academic_metadata.and_then(AcademicMetadataWire::to_domain),
        }
    }
}

#[derive(Deserialize, Default)]
#[serde(default)]
pub(crate) struct AnswerInstanceWire {
    #[serde(deserialize_with = "lenient")]
    answer: Option<String>,
    #[serde(deserialize_with = "lenient_number")]
    confidence: Option<f64>,
    #[serde(deserialize_with = "lenient")]
    sources: Option<Vec<Value>>,
}

impl AnswerInstanceWire {
    pub(crate) fn parse(item: &Value) -> Option<Self> {
        if !item.is_object() {
            return None;
        }
        serde_json::from_value(item.clone()).ok()
    }

    /// `None` when the instance carries no answer text.
    pub(crate) fn to_domain(self) -> Option<AnswerRecord> {
        let generated_text = self.answer.filter(|answer| !answer.trim().is_empty())?;
        let confidence = self
            .confidence
            .filter(|c| c.is_finite())
            .unwrap_or(0.0)
            .clamp(0.0, 1.0);
        let sources = self
            .sources
            .unwrap_or_default()
            .iter()
            .filter_map(SourceWire::parse)
            .map(SourceWire::to_domain)
            .collect();

        Some(AnswerRecord {
            generated_text,
            confidence,
            sources,
        })
    }
}

//=========================================================================================
// Documents
//=========================================================================================

fn is_empty_list(items: &&[String]) -> bool {
    items.is_empty()
}

fn is_empty_set(items: &&BTreeSet<String>) -> bool {
    items.is_empty()
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct UploadWire {
    #[serde(deserialize_with = "lenient")]
    success: Option<bool>,
    #[serde(deserialize_with = "lenient")]
    document_id: Option<String>,
    #[serde(deserialize_with = "lenient")]
    message: Option<String>,
    #[serde(deserialize_with = "lenient_strings")]
    errors: Vec<String>,
}

impl UploadWire {
    pub(crate) fn parse(body: &Value) -> Self {
        serde_json::from_value(body.clone()).unwrap_or_default()
    }

    /// A missing `success` flag counts as success: the call itself returned 2xx.
    pub(crate) fn to_domain(self) -> UploadOutcome {
        UploadOutcome {
            success: self.success.unwrap_or(true),
            document_id: self.document_id,
            message: self.message.unwrap_or_default(),
            errors: self.errors,
        }
    }
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct BatchUploadWire {
    #[serde(deserialize_with = "lenient")]
    success: Option<bool>,
    #[serde(deserialize_with = "lenient_number")]
    uploaded_count: Option<u64>,
    #[serde(deserialize_with = "lenient_number")]
    failed_count: Option<u64>,
    #[serde(deserialize_with = "lenient")]
    results: Option<Vec<Value>>,
}

impl BatchUploadWire {
    pub(crate) fn parse(body: &Value) -> Self {
        serde_json::from_value(body.clone()).unwrap_or_default()
    }

    pub(crate) fn to_domain(self) -> BatchUploadOutcome {
        let results: Vec<UploadOutcome> = self
            .results
            .unwrap_or_default()
            .iter()
            .map(|item| UploadWire::parse(item).to_domain())
            .collect();
        let failed_count = self
            .failed_count
            .unwrap_or_else(|| results.iter().filter(|r| !r.success).count() as u64);
        let uploaded_count = self
            .uploaded_count
            .unwrap_or_else(|| results.iter().filter(|r| r.success).count() as u64);

        BatchUploadOutcome {
            success: self.success.unwrap_or(failed_count == 0),
            uploaded_count,
            failed_count,
            results,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct DocumentUploadWire<'a> {
    title: &'a str,
    authors: &'a [String],
    #[serde(rename = "abstract")]
    abstract_text: &'a str,
    content: &'a str,
    category: &'a str,
    database: &'a str,
    publication_date: &'a str,
    #[serde(skip_serializing_if = "is_empty_list")]
    keywords: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    doi: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    url: Option<&'a str>,
}

impl<'a> DocumentUploadWire<'a> {
    pub(crate) fn from_domain(document: &'a DocumentUpload) -> Self {
        Self {
            title: &document.title,
            authors: &document.authors,
            abstract_text: &document.abstract_text,
            content: &document.content,
            category: &document.category,
            database: &document.database,
            publication_date: &document.publication_date,
            keywords: &document.keywords,
            doi: document.doi.as_deref(),
            url: document.url.as_deref(),
        }
    }
}

#[derive(Serialize)]
pub(crate) struct BatchUploadRequestWire<'a> {
    documents: Vec<DocumentUploadWire<'a>>,
}

impl<'a> BatchUploadRequestWire<'a> {
    pub(crate) fn from_domain(documents: &'a [DocumentUpload]) -> Self {
        Self {
            documents: documents.iter().map(DocumentUploadWire::from_domain).collect(),
        }
    }
}

//=========================================================================================
// Search Requests
//=========================================================================================

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct FiltersWire<'a> {
    #[serde(skip_serializing_if = "is_empty_set")]
    categories: &'a BTreeSet<String>,
    #[serde(skip_serializing_if = "is_empty_set")]
    databases: &'a BTreeSet<String>,
    #[serde(skip_serializing_if = "is_empty_set")]
    authors: &'a BTreeSet<String>,
    #[serde(skip_serializing_if = "is_empty_set")]
    venues: &'a BTreeSet<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    year_from: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    year_to: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    date_from: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    date_to: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    min_citations: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    open_access: Option<bool>,
}

impl<'a> FiltersWire<'a> {
    fn from_domain(filters: &'a SearchFilters) -> Self {
        Self {
            categories: &filters.categories,
            databases: &filters.databases,
            authors: &filters.authors,
            venues: &filters.venues,
            year_from: filters.year_from,
            year_to: filters.year_to,
            date_from: filters.date_from.as_deref(),
            date_to: filters.date_to.as_deref(),
            min_citations: filters.min_citations,
            open_access: filters.open_access,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SearchRequestWire<'a> {
    query: &'a str,
    filters: FiltersWire<'a>,
    page: u32,
    page_size: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    sort_by: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    sort_order: Option<&'static str>,
}

impl<'a> SearchRequestWire<'a> {
    pub(crate) fn from_domain(query: &'a SearchQuery) -> Self {
        Self {
            query: &query.text,
            filters: FiltersWire::from_domain(&query.filters),
            page: query.page.max(1),
            page_size: query.page_size,
            sort_by: query.sort_by.as_deref(),
            sort_order: query.sort_order.map(|order| order.as_str()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn wrong_typed_fields_read_as_absent() {
        let wire = ResultWire::parse(&json!({
            "id": "r1",
            "title": 42,
            "citations": "17",
            "year": 2019.0,
            "score": "high",
            "authors": ["A. Turing", 7, "A. Church"],
        }))
        .unwrap();
        let record = wire.to_domain();

        assert_eq!(record.id, "r1");
        assert_eq!(record.document_id, "r1");
        assert_eq!(record.title, "");
        assert_eq!(record.citations, Some(17));
        assert_eq!(record.year, Some(2019));
        assert_eq!(record.score, 0.0);
        assert_eq!(record.authors, vec!["A. Turing", "A. Church"]);
    }

    #[test]
    fn nested_provider_metadata_is_projected() {
        let record = ResultWire::parse(&json!({
            "documentId": "d9",
            "academicMetadata": {
                "openAlex": {
                    "workId": "W1",
                    "openAccess": {"isOpenAccess": true, "oaStatus": "gold"},
                    "concepts": [{"id": "C1", "displayName": "Graphs", "score": 0.7}, "junk"],
                    "primaryLocation": {"source": {"displayName": "JACM"}},
                    "publicMetrics": {"citationCount": 12}
                },
                "sciSpace": {"summary": "Short", "keyFindings": ["k1"]}
            }
        }))
        .unwrap()
        .to_domain();

        assert_eq!(record.id, "d9");
        let metadata = record.academic_metadata.unwrap();
        let open_alex = metadata.open_alex.unwrap();
        assert_eq!(open_alex.is_open_access, Some(true));
        assert_eq!(open_alex.primary_source.as_deref(), Some("JACM"));
        assert_eq!(open_alex.citation_count, Some(12));
        assert_eq!(open_alex.concepts.len(), 1);
        assert_eq!(metadata.sci_space.unwrap().key_findings, vec!["k1"]);
    }

    #[test]
    fn answer_confidence_is_clamped() {
        let answer = AnswerInstanceWire::parse(&json!({"answer": "Yes", "confidence": 1.7}))
            .unwrap()
            .to_domain()
            .unwrap();
        assert_eq!(answer.confidence, 1.0);
        assert!(answer.sources.is_empty());
    }

    #[test]
    fn search_request_omits_empty_filters() {
        let mut query = SearchQuery::new("graph theory", 10);
        query.filters.min_citations = Some(5);
        let body = serde_json::to_value(SearchRequestWire::from_domain(&query)).unwrap();

        assert_eq!(
            body,
            json!({
                "query": "graph theory",
                "filters": {"minCitations": 5},
                "page": 1,
                "pageSize": 10
            })
        );
    }
}
