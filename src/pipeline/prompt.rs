//! Message list sent to the chat model for one turn.

use crate::llm::ChatMessage;

pub const SYSTEM_PROMPT: &str = "You are a helpful academic advisor for the University of \
Connecticut (UConn). You answer questions about UConn courses, prerequisites, credits and \
degree programs using only the catalog excerpts you are given.

Guidelines:
- Quote course identifiers exactly as they appear (for example \"CSE 2050\").
- Mention prerequisites, credit counts and term offerings when the excerpts include them.
- If the excerpts do not contain the answer, say so plainly and suggest checking the official \
catalog or an academic advisor. Do not invent courses or requirements.
- Keep answers concise and well organized. Use short lists for multiple courses.";

pub const FEW_SHOT_EXAMPLES: &str = "User: What is CSE 2050 about?
Assistant: CSE 2050 (Data Structures and Object-Oriented Design) covers the design and analysis \
of data structures such as lists, stacks, queues, trees and hash tables, together with \
object-oriented programming techniques. It is a three credit course. Prerequisite: CSE 1010.

User: Which statistics courses can I take as a first-year student?
Assistant: First-year students usually start with STAT 1000Q (Introduction to Statistics I) or \
STAT 1100Q (Elementary Concepts of Statistics). Both are three credit courses with no \
statistics prerequisite. Check the catalog for the sections offered each term.

User: Does UConn offer a graduate program in underwater basket weaving?
Assistant: I could not find that program in the catalog excerpts I have. Please check the \
Graduate Catalog or contact the Graduate School for the current list of programs.";

pub const EXAMPLES_INTRO: &str = "Here are some examples of how you should respond:";
pub const EXAMPLES_ACK: &str =
    "I understand. I'll follow these examples when answering questions about UConn courses.";
pub const CONTEXT_INTRO: &str = "Here is relevant information from the UConn course catalog:";
pub const CONTEXT_ACK: &str =
    "Thank you for providing the context. I'll use this information to answer accurately.";

/// Builds the full message list: system instructions, the few-shot block
/// with its acknowledgment, the last `history_window` history messages, the
/// retrieved context with its acknowledgment, then the live query.
pub fn build_messages(
    query: &str,
    context: &str,
    history: &[ChatMessage],
    history_window: usize,
) -> Vec<ChatMessage> {
    let recent = &history[history.len().saturating_sub(history_window)..];

    let mut messages = Vec::with_capacity(recent.len() + 6);
    messages.push(ChatMessage::system(SYSTEM_PROMPT));
    messages.push(ChatMessage::user(format!(
        "{}\n{}",
        EXAMPLES_INTRO, FEW_SHOT_EXAMPLES
    )));
    messages.push(ChatMessage::assistant(EXAMPLES_ACK));
    messages.extend(recent.iter().cloned());
    messages.push(ChatMessage::user(format!("{}\n{}", CONTEXT_INTRO, context)));
    messages.push(ChatMessage::assistant(CONTEXT_ACK));
    messages.push(ChatMessage::user(query));
    messages
}
