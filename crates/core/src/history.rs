//! Conversation history.
//!
//! An append-only log of question/answer turns. Storage is unbounded; readers
//! only ever look at a trailing window.

use serde::{Deserialize, Serialize};

/// One completed exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryTurn {
    pub question: String,
    pub answer: String,
}

impl HistoryTurn {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self { question: question.into(), answer: answer.into() }
    }
}

/// Append-only turn log with a trailing read window.
#[derive(Debug, Clone, Default)]
pub struct HistoryWindow {
    turns: Vec<HistoryTurn>,
}

impl HistoryWindow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a turn at the end of the log.
    pub fn append(&mut self, turn: HistoryTurn) {
        self.turns.push(turn);
    }

    /// The last `n` turns in chronological order (fewer if the log is shorter).
    pub fn recent(&self, n: usize) -> &[HistoryTurn] {
        let start = self.turns.len().saturating_sub(n);
        &self.turns[start..]
    }

    /// Render the last `n` turns as `Q: <q> A: <a>` pairs joined by spaces.
    ///
    /// Returns an empty string when there is nothing to show.
    pub fn render(&self, n: usize) -> String {
        self.recent(n)
            .iter()
            .map(|t| format!("Q: {} A: {}", t.question, t.answer))
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}
