//! DuckDuckGo web search, trimmed to a fixed character budget.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;

use super::{Tool, ToolError};

pub const DEFAULT_SEARCH_ENDPOINT: &str = "https://html.duckduckgo.com/html/";

const MAX_RESULTS: usize = 5;
const NO_RESULTS: &str = "No good DuckDuckGo Search Result was found";

/// Search the internet via DuckDuckGo's HTML endpoint.
///
/// Results are the joined snippets of the top hits, cut to `max_chars`
/// characters so a single search never floods a small model's context.
pub struct DuckDuckGoSearch {
    client: Client,
    endpoint: String,
    max_chars: usize,
}

impl DuckDuckGoSearch {
    pub fn new(endpoint: impl Into<String>, max_chars: usize) -> Result<Self, ToolError> {
        let client = Client::builder()
            .user_agent("Mozilla/5.0 (compatible; StartupArchitect/0.1)")
            .timeout(Duration::from_secs(20))
            .build()
            .map_err(|e| ToolError::Backend(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            max_chars,
        })
    }

    pub fn max_chars(&self) -> usize {
        self.max_chars
    }

    async fn fetch(&self, query: &str) -> Result<String, ToolError> {
        let url = format!("{}?q={}", self.endpoint, urlencoding::encode(query));
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ToolError::Backend(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ToolError::Backend(format!("DuckDuckGo returned {}", status)));
        }

        response
            .text()
            .await
            .map_err(|e| ToolError::Backend(e.to_string()))
    }
}

#[async_trait]
impl Tool for DuckDuckGoSearch {
    fn name(&self) -> &str {
        "duckduckgo_search"
    }

    fn description(&self) -> &str {
        "Search the internet for info. Returns very short results to save tokens."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "The search query"
                }
            },
            "required": ["query"]
        })
    }

    async fn run(&self, args: Value) -> Result<String, ToolError> {
        let query = args
            .get("query")
            .and_then(|v| v.as_str())
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .ok_or_else(|| ToolError::InvalidArguments("Missing 'query' argument".to_string()))?;

        tracing::debug!(query, "Searching DuckDuckGo");
        let html = self.fetch(query).await?;

        if html.contains("anomaly-modal") || html.contains("Unfortunately, bots") {
            return Err(ToolError::Backend(
                "DuckDuckGo blocked the request with a CAPTCHA".to_string(),
            ));
        }

        Ok(format_results(&html, self.max_chars))
    }
}

/// Turn a results page into the tool's answer: the top snippets joined by
/// spaces, never longer than `max_chars` characters.
pub fn format_results(html: &str, max_chars: usize) -> String {
    let snippets = extract_snippets(html);
    if snippets.is_empty() {
        return truncate_chars(NO_RESULTS, max_chars);
    }

    truncate_chars(&snippets.join(" "), max_chars)
}

/// Keep at most `max_chars` characters of `text`.
///
/// Counts `char`s, so multi-byte text is never split mid-codepoint.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => text[..byte_idx].to_string(),
        None => text.to_string(),
    }
}

/// Pull the result snippets out of a DuckDuckGo HTML results page.
fn extract_snippets(html: &str) -> Vec<String> {
    html.split("class=\"result__snippet\"")
        .skip(1)
        .filter_map(|chunk| {
            let body = chunk.split_once('>')?.1;
            let end = body.find("</a>").or_else(|| body.find("</td>"))?;
            let text = decode_entities(&strip_tags(&body[..end]));
            let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
            (!text.is_empty()).then_some(text)
        })
        .take(MAX_RESULTS)
        .collect()
}

fn strip_tags(fragment: &str) -> String {
    let mut out = String::with_capacity(fragment.len());
    let mut in_tag = false;
    for c in fragment.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => out.push(c),
            _ => {}
        }
    }
    out
}

fn decode_entities(text: &str) -> String {
    text.replace("&quot;", "\"")
        .replace("&#x27;", "'")
        .replace("&#39;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
}
