//! Retrieval-augmented question answering over the indexed documentation.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::Mutex;
use uuid::Uuid;

use super::chunker::TextSplitter;
use super::store::{ChunkSearchResult, DocStore, StoredChunk};
use crate::core::config::Settings;
use crate::core::errors::ApiError;
use crate::docs::{all_services, sample_documents, DocPage, DocSource};
use crate::llm::{ChatMessage, CompletionRequest, LlmProvider};
use crate::schemas::{ServiceFilter, Source};

/// At most this many sources are cited per answer.
const MAX_SOURCES: usize = 5;
/// Source previews are cut to this many characters.
const PREVIEW_CHARS: usize = 200;
/// Inputs per embeddings request.
const EMBED_BATCH: usize = 32;

const ANSWER_TEMPERATURE: f64 = 0.1;

const ANSWER_PROMPT: &str = "You are a helpful assistant specializing in LangChain, LangGraph, and LangSmith documentation.
Answer the user's question based on the provided context. Be concise but thorough.
If the context doesn't contain enough information, say so and provide what you can.
Include code examples when relevant.

Context:
{context}

Question: {question}

Answer:";

const NO_MATCH_ANSWER: &str = "I couldn't find relevant information in the documentation. \
Please try rephrasing your question or check the official documentation directly.";

/// The RAG pipeline: document loading, chunking, embedding, retrieval,
/// and answer generation.
pub struct RagService {
    settings: Settings,
    provider: Arc<dyn LlmProvider>,
    store: Arc<dyn DocStore>,
    source: Arc<dyn DocSource>,
    splitter: TextSplitter,
    initialized: AtomicBool,
    init_lock: Mutex<()>,
}

impl RagService {
    pub fn new(
        settings: Settings,
        provider: Arc<dyn LlmProvider>,
        store: Arc<dyn DocStore>,
        source: Arc<dyn DocSource>,
    ) -> Self {
        let splitter = TextSplitter::new(settings.chunk_size, settings.chunk_overlap);
        Self {
            settings,
            provider,
            store,
            source,
            splitter,
            initialized: AtomicBool::new(false),
            init_lock: Mutex::new(()),
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::Relaxed)
    }

    /// Number of chunks currently in the vector store.
    pub async fn document_count(&self) -> usize {
        self.store.count(None).await.unwrap_or(0)
    }

    /// Initialize the service, indexing documentation if the store is empty.
    ///
    /// Returns the number of chunks available afterwards.
    pub async fn initialize(&self, force_reindex: bool) -> Result<usize, ApiError> {
        let _guard = self.init_lock.lock().await;

        let existing = self.store.count(None).await?;
        if existing > 0 && !force_reindex {
            self.initialized.store(true, Ordering::Relaxed);
            tracing::info!("Using existing vector store with {} chunks", existing);
            return Ok(existing);
        }

        tracing::info!("Loading documentation...");
        let pages = self.load_pages(&all_services()).await;
        let chunks = self.split_pages(pages);
        if chunks.is_empty() {
            return Err(ApiError::Internal(
                "no documentation could be loaded".to_string(),
            ));
        }

        tracing::info!("Indexing {} document chunks...", chunks.len());
        let items = self.embed_chunks(chunks).await?;
        let count = items.len();

        if force_reindex {
            self.store.clear().await?;
        }
        self.store.insert_batch(items).await?;
        self.initialized.store(true, Ordering::Relaxed);

        tracing::info!("RAG service initialized with {} chunks", count);
        Ok(count)
    }

    /// Re-index documentation for the given services (all when `None`).
    ///
    /// Returns the number of chunks indexed and the services covered.
    pub async fn index_documents(
        &self,
        services: Option<Vec<String>>,
    ) -> Result<(usize, Vec<String>), ApiError> {
        let _guard = self.init_lock.lock().await;

        let services = services.unwrap_or_else(all_services);

        let pages = self.load_pages(&services).await;
        let chunks = self.split_pages(pages);

        // Embed before touching the store so a provider failure leaves
        // the existing index intact.
        let items = self.embed_chunks(chunks).await?;
        let count = items.len();

        for service in &services {
            self.store.delete_service(service).await?;
        }
        self.store.insert_batch(items).await?;
        self.initialized.store(true, Ordering::Relaxed);

        Ok((count, services))
    }

    /// Answer a question from the indexed documentation.
    ///
    /// Returns the answer, the cited sources, and the processing time in
    /// seconds.
    pub async fn query(
        &self,
        question: &str,
        service_filter: ServiceFilter,
    ) -> Result<(String, Vec<Source>, f64), ApiError> {
        let started = Instant::now();

        if !self.is_initialized() {
            self.initialize(false).await?;
        }

        let query_embedding = self
            .provider
            .embed(
                &[question.to_string()],
                &self.settings.openai_embedding_model,
            )
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| ApiError::Internal("embedding response was empty".to_string()))?;

        let results = self
            .store
            .search(
                &query_embedding,
                self.settings.retrieval_top_k,
                service_filter.service_id(),
            )
            .await?;

        if results.is_empty() {
            return Ok((
                NO_MATCH_ANSWER.to_string(),
                Vec::new(),
                started.elapsed().as_secs_f64(),
            ));
        }

        let context = format_context(&results);
        let prompt = ANSWER_PROMPT
            .replace("{context}", &context)
            .replace("{question}", question);

        let request = CompletionRequest::new(vec![ChatMessage::user(prompt)])
            .with_temperature(ANSWER_TEMPERATURE);
        let answer = self
            .provider
            .chat(request, &self.settings.openai_chat_model)
            .await?;

        let sources = build_sources(&results);

        Ok((answer, sources, started.elapsed().as_secs_f64()))
    }

    async fn load_pages(&self, services: &[String]) -> Vec<DocPage> {
        let pages = self.source.load_documents(services).await;
        if pages.is_empty() {
            tracing::warn!("Documentation loading produced no pages; using bundled samples");
            return sample_documents(services);
        }
        pages
    }

    fn split_pages(&self, pages: Vec<DocPage>) -> Vec<StoredChunk> {
        let mut chunks = Vec::new();
        for page in pages {
            for piece in self.splitter.split(&page.content) {
                chunks.push(StoredChunk {
                    chunk_id: Uuid::new_v4().to_string(),
                    content: piece.text,
                    title: page.title.clone(),
                    url: page.url.clone(),
                    service: page.service.clone(),
                });
            }
        }
        chunks
    }

    async fn embed_chunks(
        &self,
        chunks: Vec<StoredChunk>,
    ) -> Result<Vec<(StoredChunk, Vec<f32>)>, ApiError> {
        let mut items = Vec::with_capacity(chunks.len());

        for batch in chunks.chunks(EMBED_BATCH) {
            let inputs: Vec<String> = batch.iter().map(|c| c.content.clone()).collect();
            let embeddings = self
                .provider
                .embed(&inputs, &self.settings.openai_embedding_model)
                .await?;

            if embeddings.len() != batch.len() {
                return Err(ApiError::Internal(format!(
                    "embedding count mismatch: {} vectors for {} chunks",
                    embeddings.len(),
                    batch.len()
                )));
            }

            items.extend(batch.iter().cloned().zip(embeddings));
        }

        Ok(items)
    }
}

/// Format retrieved chunks for the prompt.
fn format_context(results: &[ChunkSearchResult]) -> String {
    results
        .iter()
        .map(|result| format!("Source: {}\n{}", result.chunk.title, result.chunk.content))
        .collect::<Vec<_>>()
        .join("\n\n---\n\n")
}

/// Build citation entries from retrieved chunks, deduplicated by URL.
fn build_sources(results: &[ChunkSearchResult]) -> Vec<Source> {
    let mut sources = Vec::new();
    let mut seen_urls = HashSet::new();

    for result in results {
        let chunk = &result.chunk;
        if !seen_urls.insert(chunk.url.clone()) {
            continue;
        }

        sources.push(Source {
            title: chunk.title.clone(),
            url: chunk.url.clone(),
            content_preview: preview(&chunk.content),
            service: chunk.service.clone(),
        });

        if sources.len() == MAX_SOURCES {
            break;
        }
    }

    sources
}

fn preview(content: &str) -> String {
    if content.chars().count() > PREVIEW_CHARS {
        let cut: String = content.chars().take(PREVIEW_CHARS).collect();
        format!("{cut}...")
    } else {
        content.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(id: &str, url: &str, content: &str) -> ChunkSearchResult {
        ChunkSearchResult {
            chunk: StoredChunk {
                chunk_id: id.to_string(),
                content: content.to_string(),
                title: format!("{id} title"),
                url: url.to_string(),
                service: "langchain".to_string(),
            },
            score: 0.9,
        }
    }

    #[test]
    fn sources_are_deduplicated_by_url_and_capped() {
        let mut results = Vec::new();
        for i in 0..8 {
            results.push(result(&format!("c{i}"), &format!("https://a/{}", i % 7), "text"));
        }

        let sources = build_sources(&results);
        assert_eq!(sources.len(), MAX_SOURCES);

        let urls: HashSet<&str> = sources.iter().map(|s| s.url.as_str()).collect();
        assert_eq!(urls.len(), sources.len());
    }

    #[test]
    fn long_previews_are_truncated_with_ellipsis() {
        let long = "x".repeat(500);
        let sources = build_sources(&[result("c1", "https://a/1", &long)]);
        assert_eq!(sources[0].content_preview.chars().count(), PREVIEW_CHARS + 3);
        assert!(sources[0].content_preview.ends_with("..."));

        let short = build_sources(&[result("c2", "https://a/2", "short")]);
        assert_eq!(short[0].content_preview, "short");
    }

    #[test]
    fn context_blocks_carry_titles_and_separators() {
        let results = vec![
            result("c1", "https://a/1", "First chunk."),
            result("c2", "https://a/2", "Second chunk."),
        ];

        let context = format_context(&results);
        assert!(context.contains("Source: c1 title\nFirst chunk."));
        assert!(context.contains("\n\n---\n\n"));
    }
}
