//! Instructions sent to the extraction service.

use crate::exemplar::Exemplar;

/// Default cap on the number of page characters embedded in one instruction.
pub const DEFAULT_MAX_CONTENT_CHARS: usize = 100_000;

/// Keep at most the first `max_chars` characters of `body`.
///
/// Cuts on a character boundary. `max_chars == 0` disables truncation.
pub fn truncate_content(body: &str, max_chars: usize) -> &str {
    if max_chars == 0 {
        return body;
    }
    match body.char_indices().nth(max_chars) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}

/// Instruction asking for the grant-detail links on a listing page.
pub fn discovery_instruction(source_url: &str, body: &str) -> String {
    format!(
        "Below is the HTML content of the web page {source_url}. \
         Find the links on this page that lead to individual grant programs. \
         Only include links to pages describing a specific grant, not general \
         information pages, navigation, or contact pages.\n\n\
         Respond with a JSON object with a single field \"links\" holding a list \
         of absolute URLs (resolve relative links against {source_url}). \
         If the page lists no grants, \"links\" must be an empty list.\n\n\
         HTML content:\n{body}"
    )
}

/// Instruction asking for one grant record shaped like `exemplar`.
pub fn record_instruction(exemplar: &Exemplar, body: &str) -> String {
    format!(
        "Below is the HTML content of a web page describing a grant. Extract the \
         grant information as well as possible, following the JSON structure of \
         this example:\n\n---\n{}\n---\n\n\
         Use exactly the fields of the example, no more and no fewer. If the page \
         does not say what a field should be, set it to null. Respond with the \
         JSON object only.\n\n\
         HTML content:\n{body}",
        exemplar.to_prompt_text()
    )
}
