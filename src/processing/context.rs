//! Prompt context assembly from document chunks.

/// Maximum number of chunks rendered into a context string.
pub const MAX_CONTEXT_SECTIONS: usize = 5;

/// Format chunks and a user question into a single prompt context.
///
/// One chunk renders as a `[Document Content]` block. Any other count renders up to
/// [`MAX_CONTEXT_SECTIONS`] numbered sections in document order, followed by a note with the
/// real total when chunks were left out. The `[User Question]` block always comes last.
pub fn build_context(chunks: &[String], question: &str) -> String {
    if let [only] = chunks {
        return format!("[Document Content]\n{only}\n\n[User Question]\n{question}");
    }

    let mut context = String::from("[Document Content - Multiple Sections]\n\n");
    for (index, chunk) in chunks.iter().take(MAX_CONTEXT_SECTIONS).enumerate() {
        context.push_str(&format!("--- Section {} ---\n{chunk}\n\n", index + 1));
    }

    if chunks.len() > MAX_CONTEXT_SECTIONS {
        context.push_str(&format!(
            "[Note: Document has {} sections total, showing first {MAX_CONTEXT_SECTIONS}]\n\n",
            chunks.len()
        ));
    }

    context.push_str("[User Question]\n");
    context.push_str(question);
    context
}

/// Number of chunks [`build_context`] renders for a chunk list of length `total`.
pub fn sections_shown(total: usize) -> usize {
    total.min(MAX_CONTEXT_SECTIONS)
}
