use super::route_scoring::{RouteScorer, ScoringContext, ScoringThresholds};
use crate::config::RouteGeneratorConfig;
use crate::models::RouteCandidate;
use std::fmt;

/// Which threshold set produced the selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionPass {
    Strict,
    Relaxed,
}

impl fmt::Display for SelectionPass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectionPass::Strict => write!(f, "strict"),
            SelectionPass::Relaxed => write!(f, "relaxed"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Selection {
    /// Index into the scored candidate slice
    pub index: usize,
    pub score: f64,
    pub pass: SelectionPass,
}

/// Scores a batch and picks the winner, falling back to relaxed thresholds
/// when the strict pass rejects everything.
#[derive(Debug, Clone)]
pub struct SelectionEngine {
    scorer: RouteScorer,
    strict: ScoringThresholds,
    relaxed: ScoringThresholds,
}

impl SelectionEngine {
    pub fn new(scorer: RouteScorer, strict: ScoringThresholds, relaxed: ScoringThresholds) -> Self {
        SelectionEngine {
            scorer,
            strict,
            relaxed,
        }
    }

    pub fn from_config(config: &RouteGeneratorConfig) -> Self {
        SelectionEngine::new(
            RouteScorer::new(config.hilliness_ranges),
            ScoringThresholds::strict(config),
            ScoringThresholds::relaxed(config),
        )
    }

    pub fn strict_thresholds(&self) -> &ScoringThresholds {
        &self.strict
    }

    pub fn relaxed_thresholds(&self) -> &ScoringThresholds {
        &self.relaxed
    }

    /// Score every candidate in place and return the index of the lowest
    /// finite score. Ties keep the earliest candidate. `None` when all are
    /// rejected (or the slice is empty).
    pub fn select_best(
        &self,
        candidates: &mut [RouteCandidate],
        context: &ScoringContext,
        thresholds: &ScoringThresholds,
    ) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;

        for (idx, candidate) in candidates.iter_mut().enumerate() {
            let score = self.scorer.score(candidate, context, thresholds);
            candidate.score = score;

            if score.is_finite() && best.map_or(true, |(_, best_score)| score < best_score) {
                best = Some((idx, score));
            }
        }

        best.map(|(idx, _)| idx)
    }

    /// Strict pass, then one relaxed pass over the same candidates.
    pub fn select(
        &self,
        candidates: &mut [RouteCandidate],
        context: &ScoringContext,
    ) -> Option<Selection> {
        for (pass, thresholds) in [
            (SelectionPass::Strict, &self.strict),
            (SelectionPass::Relaxed, &self.relaxed),
        ] {
            match self.select_best(candidates, context, thresholds) {
                Some(index) => {
                    let score = candidates[index].score;
                    tracing::info!(
                        pass = %pass,
                        seed = candidates[index].seed,
                        score = %format!("{:.2}", score),
                        viable = candidates.iter().filter(|c| !c.is_rejected()).count(),
                        "Selected seed {} in {} pass (score {:.2})",
                        candidates[index].seed, pass, score
                    );
                    return Some(Selection { index, score, pass });
                }
                None => {
                    tracing::info!(
                        pass = %pass,
                        candidates = candidates.len(),
                        "All {} candidates rejected in {} pass",
                        candidates.len(),
                        pass
                    );
                }
            }
        }

        None
    }
}

impl Default for SelectionEngine {
    fn default() -> Self {
        SelectionEngine::from_config(&RouteGeneratorConfig::default())
    }
}
