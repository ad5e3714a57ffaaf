//! Vector index storage and the build-if-absent retrieval service

pub mod index;
pub mod service;

pub use index::{DistanceMetric, SearchResult, VectorIndex};
pub use service::RetrievalService;
