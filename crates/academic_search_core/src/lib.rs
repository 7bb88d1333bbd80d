pub mod domain;
pub mod ports;

pub use domain::{
    AcademicMetadata, AnswerRecord, BatchUploadOutcome, Concept, Credentials, DocumentUpload,
    FileUpload, Identity, OpenAlexMetadata, Registration, ResultRecord, SciSpaceMetadata,
    SearchFilters, SearchMode, SearchPage, SearchQuery, Session, SortOrder, SourceReference,
    UploadOutcome,
};
pub use ports::{
    HttpBackend, HttpBody, HttpMethod, HttpRequest, HttpResponse, Navigator, PortError,
    PortResult, Storage,
};
