//! Append-only record of a query/response dialogue.
//!
//! Text is kept in full; token ids are kept in a sliding window of the most recent
//! `width` tokens. Each segment remembers both its byte range in the text and its
//! absolute range in the token stream, so role masks can be projected onto the
//! window after older tokens have been evicted.

use super::errors::HistoryError;
use super::types::{MASK_PAD, MaskAlignment, Observation, PAD_TOKEN, Role, Span};
use crate::inference::TokenId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Segment {
    /// Byte range within `DialogueHistory::text`.
    text: Span,
    /// Range within the untruncated token stream.
    tokens: Span,
}

#[derive(Debug, Clone)]
pub struct DialogueHistory {
    text: String,
    segments: Vec<Segment>,
    tokens: Vec<TokenId>,
    evicted: usize,
    width: usize,
    complete: bool,
}

impl DialogueHistory {
    /// Empty history whose token window holds at most `width` ids.
    pub fn new(width: usize) -> Self {
        Self {
            text: String::new(),
            segments: Vec::new(),
            tokens: Vec::with_capacity(width),
            evicted: 0,
            width,
            complete: false,
        }
    }

    /// History seeded with a first segment. An empty `text` yields an empty
    /// history; otherwise this behaves exactly like [`append_segment`].
    ///
    /// [`append_segment`]: DialogueHistory::append_segment
    pub fn with_initial(width: usize, text: &str, tokens: &[TokenId]) -> Result<Self, HistoryError> {
        let mut history = Self::new(width);
        if !text.is_empty() {
            history.append_segment(text, tokens)?;
        }
        Ok(history)
    }

    /// Appends one segment. Its role is implied by how many segments precede it.
    ///
    /// Rejects empty text or empty tokens without touching the history. When the
    /// token window overflows, the oldest tokens are dropped.
    pub fn append_segment(&mut self, text: &str, tokens: &[TokenId]) -> Result<(), HistoryError> {
        if text.is_empty() || tokens.is_empty() {
            return Err(HistoryError::InvalidSegment {
                text_len: text.len(),
                token_len: tokens.len(),
            });
        }

        let text_start = self.text.len();
        self.text.push_str(text);
        let token_start = self.total_tokens();
        self.tokens.extend_from_slice(tokens);

        self.segments.push(Segment {
            text: Span::new(text_start, self.text.len()),
            tokens: Span::new(token_start, token_start + tokens.len()),
        });

        if self.tokens.len() > self.width {
            let excess = self.tokens.len() - self.width;
            self.tokens.drain(..excess);
            self.evicted += excess;
            tracing::trace!(excess, evicted = self.evicted, "token window slid");
        }

        Ok(())
    }

    pub fn last_segment_text(&self) -> Result<&str, HistoryError> {
        let segment = self.segments.last().ok_or(HistoryError::EmptyHistory)?;
        Ok(&self.text[segment.text.start..segment.text.end])
    }

    pub fn segment_text(&self, index: usize) -> Option<&str> {
        self.segments
            .get(index)
            .map(|s| &self.text[s.text.start..s.text.end])
    }

    pub fn segment_role(&self, index: usize) -> Option<Role> {
        (index < self.segments.len()).then(|| Role::for_segment(index))
    }

    /// Byte ranges of every segment within [`text`](DialogueHistory::text), in
    /// append order.
    pub fn segment_spans(&self) -> impl Iterator<Item = Span> + '_ {
        self.segments.iter().map(|s| s.text)
    }

    /// Ranges of every segment within the untruncated token stream.
    pub fn token_spans(&self) -> impl Iterator<Item = Span> + '_ {
        self.segments.iter().map(|s| s.tokens)
    }

    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Concatenation of every segment appended so far.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The retained token window (at most `width` ids, oldest first).
    pub fn token_ids(&self) -> &[TokenId] {
        &self.tokens
    }

    /// Tokens ever appended, including evicted ones.
    pub fn total_tokens(&self) -> usize {
        self.evicted + self.tokens.len()
    }

    pub fn evicted_tokens(&self) -> usize {
        self.evicted
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    pub fn set_complete(&mut self, complete: bool) {
        self.complete = complete;
    }

    /// Projects the history onto a `width`-long observation and role mask.
    pub fn to_observation(&self, alignment: MaskAlignment) -> Observation {
        let mut tokens = self.tokens.clone();
        tokens.resize(self.width, PAD_TOKEN);

        let mut mask = vec![MASK_PAD; self.width];
        for (index, segment) in self.segments.iter().enumerate() {
            let Span { start, end } = match alignment {
                MaskAlignment::Windowed => Span::new(
                    segment.tokens.start.saturating_sub(self.evicted),
                    segment.tokens.end.saturating_sub(self.evicted),
                ),
                MaskAlignment::Untruncated => segment.tokens,
            };
            let end = end.min(self.width);
            if start < end {
                mask[start..end].fill(Role::for_segment(index).mask_value());
            }
        }

        Observation { tokens, mask }
    }
}
