use serde::Deserialize;
use url::Url;

use crate::models::{LinkSet, PageContent};
use crate::prompt::{discovery_instruction, truncate_content};
use crate::traits::ExtractionService;

/// Shape of the service's answer to a discovery instruction.
#[derive(Debug, Deserialize)]
struct DiscoveryResponse {
    #[serde(default)]
    links: Option<serde_json::Value>,
}

/// Finds grant-detail links on a listing page with the extraction service.
///
/// Never fails: an unusable answer yields an empty [`LinkSet`] and a warning,
/// so one bad listing page cannot abort a run.
#[derive(Clone)]
pub struct LinkDiscovery<E> {
    service: E,
    max_content_chars: usize,
}

impl<E: ExtractionService> LinkDiscovery<E> {
    pub fn new(service: E, max_content_chars: usize) -> Self {
        Self {
            service,
            max_content_chars,
        }
    }

    pub async fn discover_links(&self, content: &PageContent) -> LinkSet {
        if content.is_blank() {
            tracing::warn!(url = %content.url, "Listing page is empty, no links to discover");
            return LinkSet::empty();
        }

        let body = truncate_content(&content.body, self.max_content_chars);
        if body.len() < content.body.len() {
            tracing::info!(
                url = %content.url,
                kept = body.len(),
                total = content.body.len(),
                "Listing page truncated before discovery"
            );
        }

        let instruction = discovery_instruction(&content.url, body);
        let raw = match self.service.complete_json(&instruction).await {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(
                    url = %content.url,
                    error = %e,
                    transport = e.is_transport(),
                    "Link discovery request failed"
                );
                return LinkSet::empty();
            }
        };

        let links = parse_links(&raw, &content.url);
        tracing::info!(url = %content.url, count = links.len(), "Discovered grant links");
        links
    }
}

/// Parse a `{"links": [...]}` answer into absolute http(s) URLs.
///
/// Relative entries are resolved against `source_url`. Entries that are not
/// strings or do not resolve to http(s) are dropped.
pub fn parse_links(raw: &str, source_url: &str) -> LinkSet {
    let response: DiscoveryResponse = match serde_json::from_str(raw) {
        Ok(r) => r,
        Err(e) => {
            tracing::warn!(error = %e, "Unable to parse link discovery response as JSON");
            return LinkSet::empty();
        }
    };

    let entries = match response.links {
        Some(serde_json::Value::Array(entries)) => entries,
        Some(serde_json::Value::Null) | None => return LinkSet::empty(),
        Some(other) => {
            tracing::warn!(
                kind = crate::exemplar::json_kind(&other),
                "Discovery response \"links\" is not a list"
            );
            return LinkSet::empty();
        }
    };

    let base = Url::parse(source_url).ok();
    let links = entries
        .into_iter()
        .filter_map(|entry| match entry {
            serde_json::Value::String(link) => resolve_link(base.as_ref(), link.trim()),
            other => {
                tracing::debug!(entry = %other, "Skipping non-string link");
                None
            }
        })
        .collect();

    LinkSet::new(links)
}

fn resolve_link(base: Option<&Url>, link: &str) -> Option<String> {
    if link.is_empty() {
        return None;
    }
    let resolved = match Url::parse(link) {
        Ok(url) => url,
        Err(url::ParseError::RelativeUrlWithoutBase) => base?.join(link).ok()?,
        Err(e) => {
            tracing::debug!(%link, error = %e, "Skipping unparseable link");
            return None;
        }
    };

    match resolved.scheme() {
        "http" | "https" => Some(resolved.to_string()),
        scheme => {
            tracing::debug!(%link, %scheme, "Skipping non-http link");
            None
        }
    }
}
