//! Web loader for the documentation page catalog.

use std::sync::OnceLock;
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;

use super::{DocPage, DocSource};
use crate::schemas::ServiceInfo;

const FETCH_TIMEOUT_SECS: u64 = 30;
const USER_AGENT: &str = "Mozilla/5.0 (compatible; DocqaBot/1.0)";

// Key documentation pages for each service.
const LANGCHAIN_PAGES: &[(&str, &str)] = &[
    (
        "https://python.langchain.com/docs/get_started/introduction",
        "LangChain Introduction",
    ),
    (
        "https://python.langchain.com/docs/get_started/quickstart",
        "LangChain Quickstart",
    ),
    ("https://python.langchain.com/docs/modules/model_io/", "Model I/O"),
    ("https://python.langchain.com/docs/modules/chains/", "Chains"),
    ("https://python.langchain.com/docs/modules/agents/", "Agents"),
    ("https://python.langchain.com/docs/modules/memory/", "Memory"),
    ("https://python.langchain.com/docs/expression_language/", "LCEL"),
    (
        "https://python.langchain.com/docs/expression_language/get_started",
        "LCEL Quickstart",
    ),
    (
        "https://python.langchain.com/docs/modules/data_connection/",
        "Data Connection",
    ),
    (
        "https://python.langchain.com/docs/integrations/llms/openai",
        "OpenAI Integration",
    ),
    (
        "https://python.langchain.com/docs/integrations/chat/openai",
        "OpenAI Chat",
    ),
    (
        "https://python.langchain.com/docs/integrations/vectorstores/chroma",
        "Chroma Integration",
    ),
];

const LANGGRAPH_PAGES: &[(&str, &str)] = &[
    ("https://langchain-ai.github.io/langgraph/", "LangGraph Introduction"),
    (
        "https://langchain-ai.github.io/langgraph/tutorials/introduction/",
        "LangGraph Tutorial",
    ),
    (
        "https://langchain-ai.github.io/langgraph/concepts/",
        "LangGraph Concepts",
    ),
    (
        "https://langchain-ai.github.io/langgraph/how-tos/",
        "LangGraph How-To Guides",
    ),
    (
        "https://langchain-ai.github.io/langgraph/concepts/low_level/",
        "Low Level Concepts",
    ),
    (
        "https://langchain-ai.github.io/langgraph/concepts/agentic_concepts/",
        "Agentic Concepts",
    ),
];

const LANGSMITH_PAGES: &[(&str, &str)] = &[
    ("https://docs.smith.langchain.com/", "LangSmith Introduction"),
    ("https://docs.smith.langchain.com/tracing", "LangSmith Tracing"),
    ("https://docs.smith.langchain.com/evaluation", "LangSmith Evaluation"),
    ("https://docs.smith.langchain.com/prompts", "LangSmith Prompts"),
    (
        "https://docs.smith.langchain.com/observability",
        "LangSmith Observability",
    ),
];

/// The catalog served by `GET /api/sources`.
pub fn service_catalog() -> Vec<ServiceInfo> {
    vec![
        ServiceInfo {
            name: "LangChain".to_string(),
            id: "langchain".to_string(),
            description: "Core LangChain framework for building LLM applications".to_string(),
            docs_url: "https://python.langchain.com/docs".to_string(),
        },
        ServiceInfo {
            name: "LangGraph".to_string(),
            id: "langgraph".to_string(),
            description: "Library for building stateful, multi-actor LLM applications".to_string(),
            docs_url: "https://langchain-ai.github.io/langgraph".to_string(),
        },
        ServiceInfo {
            name: "LangSmith".to_string(),
            id: "langsmith".to_string(),
            description: "Platform for debugging, testing, and monitoring LLM applications"
                .to_string(),
            docs_url: "https://docs.smith.langchain.com".to_string(),
        },
    ]
}

fn pages_for(service: &str) -> &'static [(&'static str, &'static str)] {
    match service {
        "langchain" => LANGCHAIN_PAGES,
        "langgraph" => LANGGRAPH_PAGES,
        "langsmith" => LANGSMITH_PAGES,
        _ => &[],
    }
}

/// Fetches documentation pages from the official sites.
pub struct DocumentLoader {
    client: reqwest::Client,
}

impl DocumentLoader {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(FETCH_TIMEOUT_SECS))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self { client }
    }

    async fn fetch_page(&self, url: &str) -> anyhow::Result<String> {
        let response = self.client.get(url).send().await?;
        let response = response.error_for_status()?;
        Ok(response.text().await?)
    }
}

impl Default for DocumentLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocSource for DocumentLoader {
    async fn load_documents(&self, services: &[String]) -> Vec<DocPage> {
        let mut documents = Vec::new();

        for service in services {
            for (url, title) in pages_for(service) {
                tracing::info!("Loading: {} ({})", title, url);
                match self.fetch_page(url).await {
                    Ok(html) => {
                        let content = extract_content(&html);
                        if content.is_empty() {
                            continue;
                        }
                        tracing::debug!("  loaded {} characters", content.len());
                        documents.push(DocPage {
                            content,
                            title: title.to_string(),
                            url: url.to_string(),
                            service: service.clone(),
                        });
                    }
                    Err(err) => tracing::warn!("Failed to fetch {}: {}", url, err),
                }
            }
        }

        tracing::info!("Loaded {} documents total", documents.len());
        documents
    }
}

// Elements whose content is chrome, not documentation.
const SKIPPED_ELEMENTS: [&str; 6] = ["script", "style", "nav", "header", "footer", "aside"];

/// Extract readable text from an HTML page.
pub fn extract_content(html: &str) -> String {
    let without_chrome = drop_skipped_elements(html);
    let text = strip_tags(&without_chrome);
    let text = decode_entities(&text);
    normalize_whitespace(&text)
}

fn drop_skipped_elements(html: &str) -> String {
    // ASCII lowering keeps byte offsets aligned with the original.
    let lower = html.to_ascii_lowercase();
    let mut result = String::with_capacity(html.len());
    let mut pos = 0;

    while pos < html.len() {
        let Some(rel) = lower[pos..].find('<') else {
            result.push_str(&html[pos..]);
            break;
        };
        let tag_start = pos + rel;
        result.push_str(&html[pos..tag_start]);

        let after = &lower[tag_start + 1..];
        let skipped = SKIPPED_ELEMENTS.iter().find(|name| {
            after.starts_with(**name)
                && matches!(
                    after.as_bytes().get(name.len()).copied(),
                    Some(b' ' | b'>' | b'\t' | b'\n' | b'\r' | b'/')
                )
        });

        match skipped {
            Some(name) => {
                let close = format!("</{}", name);
                match lower[tag_start..].find(&close) {
                    Some(close_rel) => {
                        let close_at = tag_start + close_rel;
                        pos = match lower[close_at..].find('>') {
                            Some(gt) => close_at + gt + 1,
                            None => html.len(),
                        };
                    }
                    None => pos = html.len(),
                }
            }
            None => {
                result.push('<');
                pos = tag_start + 1;
            }
        }
    }

    result
}

fn strip_tags(html: &str) -> String {
    let mut result = String::with_capacity(html.len());
    let mut in_tag = false;

    for c in html.chars() {
        match c {
            '<' => in_tag = true,
            '>' => {
                if in_tag {
                    in_tag = false;
                    // keep text blocks from running together
                    result.push(' ');
                } else {
                    result.push(c);
                }
            }
            _ if !in_tag => result.push(c),
            _ => {}
        }
    }

    result
}

fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

fn normalize_whitespace(text: &str) -> String {
    static WS: OnceLock<Regex> = OnceLock::new();
    let ws = WS.get_or_init(|| Regex::new(r"[ \t]{2,}").unwrap());

    text.lines()
        .map(|line| ws.replace_all(line.trim(), " ").to_string())
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_content_drops_chrome_and_tags() {
        let html = r#"
            <html>
            <head><script>var x = 1;</script><style>body { color: red; }</style></head>
            <body>
                <nav><a href="/">Home</a></nav>
                <main>
                    <h1>Hello</h1>
                    <p>World &amp; friends</p>
                </main>
                <footer>Copyright</footer>
            </body>
            </html>
        "#;

        let text = extract_content(html);
        assert!(text.contains("Hello"));
        assert!(text.contains("World & friends"));
        assert!(!text.contains("var x"));
        assert!(!text.contains("color: red"));
        assert!(!text.contains("Home"));
        assert!(!text.contains("Copyright"));
        assert!(!text.contains('<'));
    }

    #[test]
    fn extract_content_survives_unclosed_skipped_element() {
        let html = "<p>before</p><script>let a = 1;";
        let text = extract_content(html);
        assert_eq!(text, "before");
    }

    #[test]
    fn extract_content_handles_non_ascii_text() {
        let html = "<p>caf\u{e9} et na\u{ef}vet\u{e9}</p>";
        let text = extract_content(html);
        assert!(text.contains("caf\u{e9}"));
    }

    #[test]
    fn whitespace_is_collapsed_per_line() {
        let text = normalize_whitespace("  a    b  \n\n\n c\td ");
        assert_eq!(text, "a b\nc d");
    }

    #[test]
    fn catalog_covers_all_services() {
        let catalog = service_catalog();
        let ids: Vec<&str> = catalog.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["langchain", "langgraph", "langsmith"]);
        for service in &catalog {
            assert!(!pages_for(&service.id).is_empty());
        }
    }
}
