//! Prompt rendering for answer composers.

use mindrag_core::types::RetrievedContext;

const INSTRUCTIONS: &str = "You answer follow-up questions about a recorded conversation. \
Use only the conversation context below. If it does not contain the answer, say so.";

/// Numbered `[kind] text` lines, best match first.
pub fn render_context(context: &RetrievedContext) -> String {
    if context.chunks.is_empty() {
        return "(no relevant context)\n".to_string();
    }
    context
        .chunks
        .iter()
        .enumerate()
        .map(|(i, chunk)| format!("{}. [{}] {}\n", i + 1, chunk.kind, chunk.text))
        .collect()
}

/// Full prompt: instructions, retrieved context, chat history, then the question.
pub fn render_prompt(context: &RetrievedContext) -> String {
    let mut out = format!("{INSTRUCTIONS}\n\nConversation context:\n");
    out.push_str(&render_context(context));
    if !context.history.is_empty() {
        out.push_str("\nChat so far:\n");
        for turn in &context.history {
            out.push_str(&format!("{}: {}\n", turn.speaker, turn.text));
        }
    }
    out.push_str(&format!("\nQuestion: {}", context.question));
    out
}
