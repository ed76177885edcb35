//! Context assembly for the generation prompt
//!
//! Retrieved documents are concatenated in rank order under a hard character
//! budget. A document that would overflow the budget is dropped whole when
//! earlier documents already made the cut; only when nothing has been
//! included yet is the first document truncated to fit.

use crate::retrieval::loader::Document;

const SEPARATOR: &str = "\n";

/// Concatenate document text in rank order, never exceeding `max_chars`
/// characters.
pub fn assemble_context(documents: &[&Document], max_chars: usize) -> String {
    let mut context = String::new();
    let mut used = 0usize;

    for doc in documents {
        let doc_chars = doc.text.chars().count();
        let needed = if context.is_empty() {
            doc_chars
        } else {
            SEPARATOR.chars().count() + doc_chars
        };

        if used + needed <= max_chars {
            if !context.is_empty() {
                context.push_str(SEPARATOR);
            }
            context.push_str(&doc.text);
            used += needed;
            continue;
        }

        // Overflow: truncate only when the budget holds no whole document yet
        if context.is_empty() {
            context.push_str(truncate_to(&doc.text, max_chars));
        }
        break;
    }

    context
}

/// Cut after at most `max_chars` characters
fn truncate_to(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}
