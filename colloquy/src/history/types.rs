use serde::{Deserialize, Serialize};

use crate::inference::TokenId;

/// Sentinel written into unused observation slots.
pub const PAD_TOKEN: TokenId = 0;

/// Mask value for positions not covered by any segment.
pub const MASK_PAD: u8 = 0;

/// Who produced a segment. Derived from append order: even segments are queries,
/// odd segments are model responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Query,
    Response,
}

impl Role {
    #[inline]
    pub fn for_segment(index: usize) -> Self {
        if index % 2 == 0 {
            Role::Query
        } else {
            Role::Response
        }
    }

    #[inline]
    pub fn mask_value(self) -> u8 {
        match self {
            Role::Query => 1,
            Role::Response => 2,
        }
    }
}

/// Half-open `[start, end)` range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    #[inline]
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// How role masks are placed once the token window has slid past the start of
/// the dialogue.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaskAlignment {
    /// Segment token spans are shifted into window coordinates, so every mask
    /// entry tags the token actually sitting at that position.
    #[default]
    Windowed,
    /// Segment token spans are applied at their absolute offsets from the start of
    /// the dialogue and clipped to the width. After truncation this tags stale
    /// positions; kept for compatibility with consumers trained on that layout.
    Untruncated,
}

/// Fixed-width projection of a history: token ids right-padded with
/// [`PAD_TOKEN`], plus a parallel role mask (0 pad, 1 query, 2 response).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Observation {
    pub tokens: Vec<TokenId>,
    pub mask: Vec<u8>,
}

impl Observation {
    /// All-padding observation of the given width.
    pub fn empty(width: usize) -> Self {
        Self {
            tokens: vec![PAD_TOKEN; width],
            mask: vec![MASK_PAD; width],
        }
    }

    pub fn width(&self) -> usize {
        self.tokens.len()
    }

    /// Tokens as floats, for consumers that feed the observation straight into a
    /// float network input.
    pub fn as_f32(&self) -> Vec<f32> {
        self.tokens.iter().map(|&t| t as f32).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn float_view_keeps_token_order() {
        let obs = Observation {
            tokens: vec![7, 0, 50_256],
            mask: vec![1, 0, 2],
        };
        assert_eq!(obs.as_f32(), vec![7.0, 0.0, 50_256.0]);
        assert_eq!(Observation::empty(2).as_f32(), vec![0.0; 2]);
    }

    #[test]
    fn roles_alternate_by_segment() {
        assert_eq!(Role::for_segment(0), Role::Query);
        assert_eq!(Role::for_segment(3), Role::Response);
        assert_eq!(Role::Query.mask_value(), 1);
        assert_eq!(Role::Response.mask_value(), 2);
    }
}
