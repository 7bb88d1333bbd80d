//! services/client/src/normalize/search.rs
//!
//! Reduces the backend's search payloads to `SearchPage` and `AnswerRecord`.
//!
//! List payloads come in several shapes. Each shape has its own matcher, and
//! `SHAPE_MATCHERS` fixes the order they are tried in. Nothing here fails:
//! content that matches no shape is an empty page.

use crate::normalize::wire::{AnswerInstanceWire, ResultWire};
use academic_search_core::domain::{AnswerRecord, ResultRecord, SearchPage};
use serde_json::Value;

/// The structural shape of a list-mode search payload.
#[derive(Debug, Clone, PartialEq)]
pub enum ResultsShape<'a> {
    /// `{ results: [...], total }`
    Results {
        items: &'a [Value],
        total: Option<u64>,
    },
    /// `{ instances: [...], totalRecords }`
    Instances {
        items: &'a [Value],
        total: Option<u64>,
    },
    /// `{ data: { results: [...], total } }`
    NestedResults {
        items: &'a [Value],
        total: Option<u64>,
    },
    /// `[...]`
    BareArray { items: &'a [Value] },
    /// `{ data: [...] }`
    DataArray { items: &'a [Value] },
    Unrecognized,
}

impl<'a> ResultsShape<'a> {
    fn items(&self) -> &'a [Value] {
        match self {
            ResultsShape::Results { items, .. }
            | ResultsShape::Instances { items, .. }
            | ResultsShape::NestedResults { items, .. }
            | ResultsShape::BareArray { items }
            | ResultsShape::DataArray { items } => *items,
            ResultsShape::Unrecognized => &[],
        }
    }

    fn total(&self) -> Option<u64> {
        match self {
            ResultsShape::Results { total, .. }
            | ResultsShape::Instances { total, .. }
            | ResultsShape::NestedResults { total, .. } => *total,
            _ => None,
        }
    }
}

/// A matcher recognizes exactly one shape.
pub type ShapeMatcher = for<'a> fn(&'a Value) -> Option<ResultsShape<'a>>;

/// Tried in order; the first match wins.
pub const SHAPE_MATCHERS: [ShapeMatcher; 5] = [
    match_results,
    match_instances,
    match_nested_results,
    match_bare_array,
    match_data_array,
];

fn array_at<'a>(value: &'a Value, key: &str) -> Option<&'a [Value]> {
    value.get(key).and_then(Value::as_array).map(Vec::as_slice)
}

/// Reads a count, tolerating floats and numeric strings.
fn count_at(value: &Value, key: &str) -> Option<u64> {
    match value.get(key)? {
        Value::Number(number) => number
            .as_u64()
            .or_else(|| number.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64)),
        Value::String(raw) => raw.trim().parse().ok(),
        _ => None,
    }
}

pub fn match_results(value: &Value) -> Option<ResultsShape<'_>> {
    Some(ResultsShape::Results {
        items: array_at(value, "results")?,
        total: count_at(value, "total"),
    })
}

pub fn match_instances(value: &Value) -> Option<ResultsShape<'_>> {
    Some(ResultsShape::Instances {
        items: array_at(value, "instances")?,
        total: count_at(value, "totalRecords"),
    })
}

pub fn match_nested_results(value: &Value) -> Option<ResultsShape<'_>> {
    let data = value.get("data")?;
    Some(ResultsShape::NestedResults {
        items: array_at(data, "results")?,
        total: count_at(data, "total"),
    })
}

pub fn match_bare_array(value: &Value) -> Option<ResultsShape<'_>> {
    value
        .as_array()
        .map(|items| ResultsShape::BareArray {
            items: items.as_slice(),
        })
}

pub fn match_data_array(value: &Value) -> Option<ResultsShape<'_>> {
    Some(ResultsShape::DataArray {
        items: array_at(value, "data")?,
    })
}

pub fn detect_shape(value: &Value) -> ResultsShape<'_> {
    SHAPE_MATCHERS
        .iter()
        .find_map(|matcher| matcher(value))
        .unwrap_or(ResultsShape::Unrecognized)
}

fn records_from(items: &[Value]) -> Vec<ResultRecord> {
    items
        .iter()
        .filter_map(ResultWire::parse)
        .map(ResultWire::to_domain)
        .collect()
}

/// Extracts the result records and total count from a list-mode payload.
///
/// `total` falls back to the number of records when the payload has no count.
pub fn normalize_search_response(body: &Value) -> SearchPage {
    let shape = detect_shape(body);
    let records = records_from(shape.items());
    let total = shape.total().unwrap_or(records.len() as u64);
    SearchPage { records, total }
}

/// Extracts the generated answer from an answer-mode payload.
///
/// Only the first instance is considered. `None` means there is no answer to
/// show, which is not an error.
pub fn normalize_answer_response(body: &Value) -> Option<AnswerRecord> {
    let first = array_at(body, "instances")?.first()?;
    AnswerInstanceWire::parse(first)?.to_domain()
}

/// Picks the single document out of a by-id lookup response.
pub fn normalize_document_lookup(body: &Value) -> Option<ResultRecord> {
    let candidate = array_at(body, "instances")
        .or_else(|| body.get("data").and_then(|data| array_at(data, "instances")))
        .or_else(|| body.as_array().map(Vec::as_slice))
        .or_else(|| array_at(body, "results"))
        .map(|items| items.first())
        .unwrap_or(Some(body))?;

    ResultWire::parse(candidate).map(ResultWire::to_domain)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn items() -> Value {
        json!([
            {"id": "r1", "title": "Paper A", "authors": ["Ada"], "abstract": "On engines", "citations": 3},
            {"id": "r2", "title": "Paper B", "authors": [], "year": 2021}
        ])
    }

    #[test]
    fn each_matcher_recognizes_only_its_shape() {
        let results = json!({"results": items(), "total": 2});
        let instances = json!({"instances": items(), "totalRecords": 2});
        let nested = json!({"data": {"results": items(), "total": 2}});
        let bare = items();
        let data = json!({"data": items()});

        assert!(match_results(&results).is_some());
        assert!(match_results(&instances).is_none());
        assert!(match_instances(&instances).is_some());
        assert!(match_instances(&nested).is_none());
        assert!(match_nested_results(&nested).is_some());
        assert!(match_nested_results(&data).is_none());
        assert!(match_bare_array(&bare).is_some());
        assert!(match_bare_array(&data).is_none());
        assert!(match_data_array(&data).is_some());
        assert!(match_data_array(&results).is_none());
    }

    #[test]
    fn every_shape_normalizes_identically() {
        let variants = [
            json!({"results": items(), "total": 2}),
            json!({"instances": items(), "totalRecords": 2}),
            json!({"data": {"results": items(), "total": 2}}),
            items(),
            json!({"data": items()}),
        ];

        let expected = normalize_search_response(&variants[0]);
        assert_eq!(expected.records.len(), 2);
        assert_eq!(expected.total, 2);
        assert_eq!(expected.records[0].title, "Paper A");
        assert_eq!(expected.records[0].abstract_text, "On engines");
        assert_eq!(expected.records[1].year, Some(2021));

        for variant in &variants[1..] {
            assert_eq!(normalize_search_response(variant), expected);
        }
    }

    #[test]
    fn explicit_total_is_kept_and_missing_total_defaults_to_count() {
        let page = normalize_search_response(&json!({"results": items(), "total": 140}));
        assert_eq!(page.total, 140);

        let page = normalize_search_response(&json!({"results": items()}));
        assert_eq!(page.total, 2);

        let page = normalize_search_response(&json!({"instances": items(), "totalRecords": "7"}));
        assert_eq!(page.total, 7);
    }

    #[test]
    fn earlier_shape_wins_when_several_match() {
        let body = json!({
            "results": [{"id": "top"}],
            "instances": [{"id": "i1"}, {"id": "i2"}],
            "data": [{"id": "d1"}]
        });
        let page = normalize_search_response(&body);
        assert_eq!(page.records.len(), 1);
        assert_eq!(page.records[0].id, "top");
    }

    #[test]
    fn unrecognized_or_empty_bodies_are_empty_pages() {
        for body in [
            Value::Null,
            json!({}),
            json!("results"),
            json!({"results": "nope"}),
            json!({"data": {"results": null}}),
        ] {
            assert_eq!(normalize_search_response(&body), SearchPage::default(), "{}", body);
        }
        assert_eq!(detect_shape(&Value::Null), ResultsShape::Unrecognized);
    }

    #[test]
    fn non_object_items_are_skipped() {
        let page = normalize_search_response(&json!({"results": [1, "two", {"id": "r3"}]}));
        assert_eq!(page.records.len(), 1);
        assert_eq!(page.total, 1);
    }

    #[test]
    fn answer_uses_first_instance_only() {
        let body = json!({
            "totalRecords": 2,
            "instances": [
                {"answer": "X causes Y", "confidence": 0.8,
                 "sources": [{"documentId": "d1", "text": "evidence", "score": 0.9}]},
                {"answer": "Something else", "confidence": 0.3, "sources": []}
            ]
        });

        let answer = normalize_answer_response(&body).unwrap();
        assert_eq!(answer.generated_text, "X causes Y");
        assert_eq!(answer.confidence, 0.8);
        assert_eq!(answer.sources.len(), 1);
        assert_eq!(answer.sources[0].document_id, "d1");
        assert_eq!(answer.sources[0].excerpt, "evidence");
    }

    #[test]
    fn missing_answers_are_none() {
        assert_eq!(normalize_answer_response(&json!({"instances": []})), None);
        assert_eq!(normalize_answer_response(&json!({"totalRecords": 0})), None);
        assert_eq!(normalize_answer_response(&Value::Null), None);
        assert_eq!(normalize_answer_response(&json!({"instances": [{"confidence": 0.5}]})), None);
    }

    #[test]
    fn document_lookup_probes_known_wrappers() {
        let doc = json!({"documentId": "d1", "title": "Found"});
        for body in [
            json!({"totalRecords": 1, "instances": [doc.clone()]}),
            json!({"data": {"instances": [doc.clone()]}}),
            json!([doc.clone()]),
            json!({"results": [doc.clone()]}),
            doc.clone(),
        ] {
            let record = normalize_document_lookup(&body).unwrap();
            assert_eq!(record.document_id, "d1");
            assert_eq!(record.title, "Found");
        }
        assert_eq!(normalize_document_lookup(&json!({"instances": []})), None);
        assert_eq!(normalize_document_lookup(&Value::Null), None);
    }
}
