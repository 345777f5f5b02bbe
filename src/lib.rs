//! Documentation question-answering assistant for the LangChain,
//! LangGraph, and LangSmith documentation sets.
//!
//! The crate has three faces:
//! - the RAG backend (`server`, `rag`, `docs`, `llm`) behind the
//!   `docqa-server` binary,
//! - a typed API `client` for the backend's HTTP contract,
//! - the `chat` session state driven by the `docqa-chat` terminal front.

pub mod chat;
pub mod client;
pub mod core;
pub mod docs;
pub mod llm;
pub mod rag;
pub mod schemas;
pub mod server;
pub mod state;
