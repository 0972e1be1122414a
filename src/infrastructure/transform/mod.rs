//! Transformation implementations and their registry

pub mod chunking;
pub mod cleaners;
pub mod extractors;
pub mod registry;
pub mod staging;

pub use chunking::chunk_by_title;
pub use registry::TransformationRegistry;
