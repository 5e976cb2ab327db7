use crate::models::document::DocumentKind;

/// Normalized outcome of evaluating one document. `score` is always within `[0, 100]`.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoringResult {
    pub score: f64,
    pub reasoning: String,
    pub filename: String,
    pub kind: DocumentKind,
}

/// A result together with its 1-based position in the ranking.
#[derive(Debug, Clone, Copy)]
pub struct RankedEntry<'a> {
    pub rank: usize,
    pub result: &'a ScoringResult,
}

/// Append-only collection of results in the order they were scored.
#[derive(Debug, Clone, Default)]
pub struct ResultSet {
    results: Vec<ScoringResult>,
}

impl ResultSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, result: ScoringResult) {
        self.results.push(result);
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Results in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &ScoringResult> {
        self.results.iter()
    }

    /// Ranking view: score descending, equal scores keep insertion order.
    /// The set itself is left untouched.
    pub fn ranked(&self) -> Vec<RankedEntry<'_>> {
        let mut sorted: Vec<&ScoringResult> = self.iter().collect();
        // slice::sort_by is stable
        sorted.sort_by(|a, b| b.score.total_cmp(&a.score));

        sorted
            .into_iter()
            .enumerate()
            .map(|(i, result)| RankedEntry { rank: i + 1, result })
            .collect()
    }
}
