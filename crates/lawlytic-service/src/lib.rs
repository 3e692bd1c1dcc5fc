//! Document operations for Lawlytic.
//!
//! [`DocumentService`] ties the pieces together: uploaded bytes are turned into
//! text by [`TextExtractor`], split into clauses, analysed through the
//! `lawlytic-ai` pipeline, and persisted through a `lawlytic-store` document
//! store. The same service answers questions and builds timelines for stored
//! documents.

pub mod extract;
pub mod service;

pub use extract::{ExtractError, TextExtractor, content_type_for};
pub use service::{DocumentService, ServiceConfig, ServiceError, UploadOutcome, new_document_id};
