//! Keyword palette sampling and selection.

use serde::Serialize;
use trickster_core::rng::DeterministicRng;
use trickster_scenario::Vocabulary;

/// The twelve tokens offered to the player for the current turn.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct KeywordPalette(Vec<String>);

impl KeywordPalette {
    #[cfg(test)]
    pub(crate) fn from_tokens(tokens: &[&str]) -> Self {
        Self(tokens.iter().map(|t| (*t).to_owned()).collect())
    }

    /// Returns the tokens in display order.
    #[must_use]
    pub fn tokens(&self) -> &[String] {
        &self.0
    }

    /// Returns `true` if `token` is on offer.
    #[must_use]
    pub fn contains(&self, token: &str) -> bool {
        self.0.iter().any(|t| t == token)
    }

    /// Number of tokens on offer.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if nothing is on offer.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Draws palettes from a scenario's vocabularies.
///
/// Every palette has the same shape (4 core, 5 noise, 3 trap, shuffled
/// together). The sampler knows nothing about what the categories mean.
#[derive(Debug, Clone)]
pub struct KeywordSampler {
    vocabulary: Vocabulary,
}

impl KeywordSampler {
    /// Creates a sampler over a validated vocabulary.
    #[must_use]
    pub fn new(vocabulary: Vocabulary) -> Self {
        Self { vocabulary }
    }

    /// The vocabulary palettes are drawn from.
    #[must_use]
    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    /// Draws a fresh palette.
    pub fn refresh(&self, rng: &mut dyn DeterministicRng) -> KeywordPalette {
        let mut tokens = Vec::with_capacity(Vocabulary::PALETTE_SIZE);
        tokens.extend(draw(&self.vocabulary.core, Vocabulary::CORE_DRAW, rng));
        tokens.extend(draw(&self.vocabulary.noise, Vocabulary::NOISE_DRAW, rng));
        tokens.extend(draw(&self.vocabulary.trap, Vocabulary::TRAP_DRAW, rng));
        shuffle(&mut tokens, rng);
        KeywordPalette(tokens)
    }
}

/// Draws `count` distinct tokens (partial Fisher-Yates).
fn draw(pool: &[String], count: usize, rng: &mut dyn DeterministicRng) -> Vec<String> {
    let mut pool = pool.to_vec();
    let count = count.min(pool.len());
    let last = index_to_u32(pool.len().saturating_sub(1));
    for i in 0..count {
        let j = u32_to_index(rng.next_u32_range(index_to_u32(i), last));
        pool.swap(i, j);
    }
    pool.truncate(count);
    pool
}

fn shuffle(items: &mut [String], rng: &mut dyn DeterministicRng) {
    for i in (1..items.len()).rev() {
        let j = u32_to_index(rng.next_u32_range(0, index_to_u32(i)));
        items.swap(i, j.min(i));
    }
}

fn index_to_u32(index: usize) -> u32 {
    u32::try_from(index).unwrap_or(u32::MAX)
}

fn u32_to_index(value: u32) -> usize {
    usize::try_from(value).unwrap_or(usize::MAX)
}

/// Outcome of toggling a keyword. Rejections are no-ops, never errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionResult {
    /// The token was added to the selection.
    Added,
    /// The token was removed from the selection.
    Removed,
    /// The selection already holds the maximum number of tokens.
    Full,
    /// The token is not on the current palette.
    NotOnPalette,
    /// The session has ended.
    SessionEnded,
}

/// Up to three tokens picked from the current palette, in pick order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct KeywordSelection(Vec<String>);

impl KeywordSelection {
    /// Maximum number of selected tokens.
    pub const LIMIT: usize = 3;

    /// Adds `token` if absent (and room remains), removes it if present.
    pub fn toggle(&mut self, palette: &KeywordPalette, token: &str) -> SelectionResult {
        if let Some(position) = self.0.iter().position(|t| t == token) {
            self.0.remove(position);
            return SelectionResult::Removed;
        }
        if !palette.contains(token) {
            return SelectionResult::NotOnPalette;
        }
        if self.0.len() >= Self::LIMIT {
            return SelectionResult::Full;
        }
        self.0.push(token.to_owned());
        SelectionResult::Added
    }

    /// Returns the selected tokens in pick order.
    #[must_use]
    pub fn tokens(&self) -> &[String] {
        &self.0
    }

    /// Number of selected tokens.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if nothing is selected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub(crate) fn clear(&mut self) {
        self.0.clear();
    }
}
