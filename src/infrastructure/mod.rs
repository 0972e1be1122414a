//! Infrastructure layer - Partitioners, transformations and ingest backends

pub mod document_io;
pub mod http_client;
pub mod ingest;
pub mod logging;
pub mod partitioners;
pub mod transform;
pub mod translation;

pub use document_io::{DocumentIo, IngestDefaults};
pub use http_client::{HttpClient, HttpClientTrait, HttpResponse};
pub use logging::init_logging;
pub use partitioners::AutoPartitioner;
pub use transform::TransformationRegistry;
pub use translation::HttpTranslator;
