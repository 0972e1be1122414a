//! Domain layer - Core types, operations and traits

pub mod element;
pub mod error;
pub mod ingest_job;
pub mod partition;
pub mod source;
pub mod transform;
pub mod translation;

pub use element::{Coordinates, Element, ElementCategory, ElementMetadata, ElementSequence};
pub use error::{DomainError, OperationKind};
pub use ingest_job::{
    BackendConfig, BackendKind, IngestJob, IngestJobConfig, JobReport, JobState, PartitionConfig,
    ProcessorConfig, ReadConfig, RemoteItem, SourceConnector,
};
pub use partition::{
    version_at_least, ElementPartitioner, FileType, PartitionInput, PartitionOptions,
    MIN_PARTITIONER_VERSION,
};
pub use source::SourceReference;
pub use transform::{
    AffixParams, AnchorParams, ChunkingOp, CleaningOp, CleaningPipeline, ExtractedValue,
    ExtractionOp, OrderedBullets, StagedOutput, StagingOp, TitleChunkingParams,
    TransformationSpec,
};
pub use translation::Translator;

#[cfg(test)]
pub use ingest_job::MockSourceConnector;
#[cfg(test)]
pub use translation::MockTranslator;
