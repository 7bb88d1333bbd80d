//! crates/academic_search_core/src/domain.rs
//!
//! Defines the pure, core data structures for the search client.
//! These structs are independent of any wire format; the service crate maps
//! backend payloads onto them.

use bytes::Bytes;
use chrono::{DateTime, Duration, Utc};
use std::collections::BTreeSet;
use std::fmt;

//=========================================================================================
// Authentication
//=========================================================================================

/// Login input. Only ever sent to the backend, never persisted.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Registration input. Only ever sent to the backend, never persisted.
#[derive(Debug, Clone)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// The user identity decoded from a session token's claims.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: String,
    pub username: String,
    pub email: String,
    pub tenant: String,
    pub role: String,
    pub authorities: BTreeSet<String>,
    pub expires_at: Option<DateTime<Utc>>,
}

/// How long before the real expiry a session is already considered stale.
pub fn session_expiry_buffer() -> Duration {
    Duration::minutes(5)
}

/// An authenticated session. Always holds both the token and its identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub identity: Identity,
}

impl Session {
    pub fn new(token: String, identity: Identity) -> Self {
        Self { token, identity }
    }

    /// True when the token expires at or before `now + buffer`.
    /// Tokens without an `exp` claim never expire client-side.
    pub fn expires_within(&self, now: DateTime<Utc>, buffer: Duration) -> bool {
        match self.identity.expires_at {
            Some(expires_at) => expires_at <= now + buffer,
            None => false,
        }
    }
}

//=========================================================================================
// Search Requests
//=========================================================================================

/// The backend search strategy. `Rag` is the generated-answer mode; the
/// others all return document lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchMode {
    Fuzzy,
    Exact,
    Partial,
    Semantic,
    #[default]
    Rag,
}

impl SearchMode {
    pub const ALL: [SearchMode; 5] = [
        SearchMode::Fuzzy,
        SearchMode::Exact,
        SearchMode::Partial,
        SearchMode::Semantic,
        SearchMode::Rag,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SearchMode::Fuzzy => "fuzzy",
            SearchMode::Exact => "exact",
            SearchMode::Partial => "partial",
            SearchMode::Semantic => "semantic",
            SearchMode::Rag => "rag",
        }
    }

    /// Answer mode returns a single generated answer and has no paging.
    pub fn is_answer(&self) -> bool {
        matches!(self, SearchMode::Rag)
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|mode| mode.as_str().eq_ignore_ascii_case(value.trim()))
    }
}

impl fmt::Display for SearchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

/// Optional facet constraints. An empty set or `None` means "unconstrained".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchFilters {
    pub categories: BTreeSet<String>,
    pub databases: BTreeSet<String>,
    pub authors: BTreeSet<String>,
    pub venues: BTreeSet<String>,
    pub year_from: Option<i32>,
    pub year_to: Option<i32>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
    pub min_citations: Option<u64>,
    pub open_access: Option<bool>,
}

/// The query as edited by the user. Pages are 1-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub text: String,
    pub filters: SearchFilters,
    pub page: u32,
    pub page_size: u32,
    pub sort_by: Option<String>,
    pub sort_order: Option<SortOrder>,
}

impl SearchQuery {
    pub fn new(text: impl Into<String>, page_size: u32) -> Self {
        Self {
            text: text.into(),
            filters: SearchFilters::default(),
            page: 1,
            page_size,
            sort_by: None,
            sort_order: None,
        }
    }

    /// True when both queries ask for the same results, ignoring the page.
    pub fn same_criteria(&self, other: &SearchQuery) -> bool {
        self.text == other.text
            && self.filters == other.filters
            && self.page_size == other.page_size
            && self.sort_by == other.sort_by
            && self.sort_order == other.sort_order
    }
}

//=========================================================================================
// Search Results
//=========================================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Concept {
    pub id: String,
    pub display_name: String,
    pub score: f64,
}

/// Provenance from the OpenAlex metadata provider.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OpenAlexMetadata {
    pub work_id: Option<String>,
    pub doi: Option<String>,
    pub is_open_access: Option<bool>,
    pub oa_status: Option<String>,
    pub oa_url: Option<String>,
    pub concepts: Vec<Concept>,
    pub primary_source: Option<String>,
    pub landing_page_url: Option<String>,
    pub pdf_url: Option<String>,
    pub referenced_works: Vec<String>,
    pub related_works: Vec<String>,
    pub citation_count: Option<u64>,
}

/// Provenance from the SciSpace metadata provider.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SciSpaceMetadata {
    pub sci_space_id: Option<String>,
    pub summary: Option<String>,
    pub methodology: Option<String>,
    pub key_findings: Vec<String>,
    pub limitations: Vec<String>,
    pub future_work: Vec<String>,
    pub full_text_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AcademicMetadata {
    pub open_alex: Option<OpenAlexMetadata>,
    pub sci_space: Option<SciSpaceMetadata>,
}

/// One retrieved document, projected for display.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultRecord {
    pub id: String,
    pub document_id: String,
    pub title: String,
    pub authors: Vec<String>,
    pub abstract_text: String,
    pub content: String,
    pub category: String,
    pub database: String,
    pub publication_date: String,
    pub citations: Option<u64>,
    pub url: Option<String>,
    pub score: f64,
    pub highlights: Vec<String>,
    pub doi: Option<String>,
    pub venue: Option<String>,
    pub journal: Option<String>,
    pub year: Option<i32>,
    pub keywords: Vec<String>,
    pub open_access: Option<bool>,
    pub pdf_url: Option<String>,
    pub academic_metadata: Option<AcademicMetadata>,
}

/// A pointer from a generated answer back to a supporting document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceReference {
    pub document_id: String,
    pub excerpt: String,
    pub score: f64,
    pub title: Option<String>,
    pub authors: Vec<String>,
    pub url: Option<String>,
    pub year: Option<i32>,
    pub venue: Option<String>,
    pub citations: Option<u64>,
    pub doi: Option<String>,
    pub academic_metadata: Option<AcademicMetadata>,
}

/// A generated answer with its ordered supporting sources.
#[derive(Debug, Clone, PartialEq)]
pub struct AnswerRecord {
    pub generated_text: String,
    /// Always within `0.0..=1.0`.
    pub confidence: f64,
    pub sources: Vec<SourceReference>,
}

/// One page of list-mode results.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchPage {
    pub records: Vec<ResultRecord>,
    pub total: u64,
}

//=========================================================================================
// Documents
//=========================================================================================

/// A document to upload. Fields are passed to the backend unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentUpload {
    pub title: String,
    pub authors: Vec<String>,
    pub abstract_text: String,
    pub content: String,
    pub category: String,
    pub database: String,
    pub publication_date: String,
    pub keywords: Vec<String>,
    pub doi: Option<String>,
    pub url: Option<String>,
}

/// A raw file to upload as multipart form data.
#[derive(Debug, Clone)]
pub struct FileUpload {
    pub file_name: String,
    pub bytes: Bytes,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadOutcome {
    pub success: bool,
    pub document_id: Option<String>,
    pub message: String,
    pub errors: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchUploadOutcome {
    pub success: bool,
    pub uploaded_count: u64,
    pub failed_count: u64,
    pub results: Vec<UploadOutcome>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(expires_at: Option<DateTime<Utc>>) -> Identity {
        Identity {
            user_id: "u1".to_string(),
            username: "ada".to_string(),
            email: "ada@example.org".to_string(),
            tenant: "_default".to_string(),
            role: "USER".to_string(),
            authorities: BTreeSet::new(),
            expires_at,
        }
    }

    #[test]
    fn session_expiry_honours_buffer() {
        let now = Utc::now();
        let soon = Session::new("t".into(), identity(Some(now + Duration::minutes(3))));
        let later = Session::new("t".into(), identity(Some(now + Duration::hours(1))));
        let never = Session::new("t".into(), identity(None));

        assert!(soon.expires_within(now, session_expiry_buffer()));
        assert!(!later.expires_within(now, session_expiry_buffer()));
        assert!(!never.expires_within(now, session_expiry_buffer()));
    }

    #[test]
    fn search_mode_parses_case_insensitively() {
        assert_eq!(SearchMode::parse("Semantic"), Some(SearchMode::Semantic));
        assert_eq!(SearchMode::parse(" rag "), Some(SearchMode::Rag));
        assert_eq!(SearchMode::parse("boolean"), None);
        assert!(SearchMode::Rag.is_answer());
        assert!(!SearchMode::Fuzzy.is_answer());
    }

    #[test]
    fn same_criteria_ignores_only_the_page() {
        let first = SearchQuery::new("neural networks", 10);
        let mut next_page = first.clone();
        next_page.page = 3;
        assert!(first.same_criteria(&next_page));

        let mut other_text = first.clone();
        other_text.text = "graph theory".into();
        assert!(!first.same_criteria(&other_text));

        let mut filtered = first.clone();
        filtered.filters.year_from = Some(2015);
        assert!(!first.same_criteria(&filtered));

        let mut sorted = first.clone();
        sorted.sort_order = Some(SortOrder::Desc);
        assert!(!first.same_criteria(&sorted));
    }
}
