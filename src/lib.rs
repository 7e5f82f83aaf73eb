//! Question answering over VDAT to Cox vehicle catalog mappings.
//!
//! The core lives in [`rag`]: raw CSV rows are aggregated into one record per
//! vehicle model, embedded into an in-memory index and retrieved as a
//! citation-tagged context block for the generation model.

pub mod cli;
pub mod core;
pub mod llm;
pub mod rag;
pub mod server;
pub mod state;
