//! Document uploads and by-id lookups.

mod support;

use academic_search_core::domain::{DocumentUpload, FileUpload};
use academic_search_core::ports::HttpBody;
use bytes::Bytes;
use client_lib::error::ClientError;
use client_lib::services::{DocumentService, SearchService};
use pretty_assertions::assert_eq;
use serde_json::json;
use support::{record, user_token, Harness};

fn document(title: &str) -> DocumentUpload {
    DocumentUpload {
        title: title.to_string(),
        authors: vec!["Ada Lovelace".to_string()],
        abstract_text: "Notes on the engine".to_string(),
        content: "Full text".to_string(),
        category: "computing".to_string(),
        database: "archive".to_string(),
        publication_date: "1843-10-01".to_string(),
        keywords: Vec::new(),
        doi: Some("10.1000/engine".to_string()),
        url: None,
    }
}

#[tokio::test]
async fn upload_sends_the_document_fields() {
    let h = Harness::new();
    h.sign_in(&user_token());
    h.backend.push_json(200, json!({"documentId": "doc-7", "message": "Stored"}));
    let documents = DocumentService::new(h.api.clone());

    let outcome = documents.upload(&document("Sketch of the Engine")).await.unwrap();

    assert!(outcome.success);
    assert_eq!(outcome.document_id.as_deref(), Some("doc-7"));
    assert_eq!(outcome.message, "Stored");

    let request = h.backend.last_request();
    assert_eq!(request.path, "/v1/documents/upload");
    assert_eq!(
        request.body,
        HttpBody::Json(json!({
            "title": "Sketch of the Engine",
            "authors": ["Ada Lovelace"],
            "abstract": "Notes on the engine",
            "content": "Full text",
            "category": "computing",
            "database": "archive",
            "publicationDate": "1843-10-01",
            "doi": "10.1000/engine"
        }))
    );
}

#[tokio::test]
async fn batch_upload_derives_missing_counts() {
    let h = Harness::new();
    h.backend.push_json(
        200,
        json!({
            "results": [
                {"success": true, "documentId": "d1"},
                {"success": false, "errors": ["title is required"]},
                {"documentId": "d3"}
            ]
        }),
    );
    let documents = DocumentService::new(h.api.clone());

    let outcome = documents
        .batch_upload(&[document("One"), document(""), document("Three")])
        .await
        .unwrap();

    assert_eq!(outcome.uploaded_count, 2);
    assert_eq!(outcome.failed_count, 1);
    assert!(!outcome.success);
    assert_eq!(outcome.results[1].errors, vec!["title is required".to_string()]);

    let request = h.backend.last_request();
    assert_eq!(request.path, "/v1/documents/batch");
    match request.body {
        HttpBody::Json(body) => assert_eq!(body["documents"].as_array().map(Vec::len), Some(3)),
        other => panic!("expected a JSON body, got {:?}", other),
    }
}

#[tokio::test]
async fn upload_file_sends_a_multipart_form() {
    let h = Harness::new();
    h.backend.push_json(200, json!({"success": true, "documentId": "f1"}));
    let documents = DocumentService::new(h.api.clone());

    let outcome = documents
        .upload_file(&FileUpload {
            file_name: "paper.pdf".to_string(),
            bytes: Bytes::from_static(b"%PDF-1.7"),
        })
        .await
        .unwrap();

    assert_eq!(outcome.document_id.as_deref(), Some("f1"));
    let request = h.backend.last_request();
    assert_eq!(request.path, "/v1/documents/upload-file");
    assert_eq!(
        request.body,
        HttpBody::Multipart {
            field: "file".to_string(),
            file_name: "paper.pdf".to_string(),
            bytes: Bytes::from_static(b"%PDF-1.7"),
        }
    );
}

#[tokio::test]
async fn rejected_upload_surfaces_the_message() {
    let h = Harness::new();
    h.backend.push_json(422, json!({"message": "Title is required"}));
    let documents = DocumentService::new(h.api.clone());

    let err = documents.upload(&document("")).await.unwrap_err();

    match err {
        ClientError::RequestFailed { status, message } => {
            assert_eq!(status, 422);
            assert_eq!(message, "Title is required");
        }
        other => panic!("expected RequestFailed, got {:?}", other),
    }
}

#[tokio::test]
async fn document_lookup_goes_through_the_filters_endpoint() {
    let h = Harness::new();
    h.backend
        .push_json(200, json!({"totalRecords": 1, "instances": [record("d1", "Found it")]}));
    h.backend.push_json(200, json!({"totalRecords": 0, "instances": []}));
    let search = SearchService::new(h.api.clone());

    let found = search.document_by_id("d1").await.unwrap().unwrap();
    assert_eq!(found.title, "Found it");
    let request = h.backend.last_request();
    assert_eq!(request.path, "/v1/search/filters");
    assert_eq!(
        request.body,
        HttpBody::Json(json!({"field": "documentId", "value": "d1"}))
    );

    assert_eq!(search.document_by_id("missing").await.unwrap(), None);
}
