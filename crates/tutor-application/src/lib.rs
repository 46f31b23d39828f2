//! Application layer for the tutor.
//!
//! Runs a student's question through classification, retrieval, prompt
//! composition and quality-gated generation, and records the turn in the
//! chat session.

pub mod retriever_cache;
pub mod tutor_usecase;

pub use retriever_cache::RetrieverCache;
pub use tutor_usecase::TutorUseCase;
