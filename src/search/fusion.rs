//! Reciprocal Rank Fusion: score = Σ 1/(coeff + rank_i).
//!
//! Merges the ranked lists of the multi-signal sub-queries into one
//! candidate list without normalizing scores across retrieval methods.
//! An entry absent from a list contributes nothing for that list, so
//! multi-list presence dominates single-list presence at equal ranks.

use std::collections::HashMap;

use uuid::Uuid;

use crate::index::{IndexEntry, Ranked};

/// Default smoothing coefficient for the bare fusion primitive. Higher
/// values reduce the influence of high-ranking items from any single list.
pub const DEFAULT_COEFF: u32 = 60;

/// A fused candidate. Ephemeral, lives for the duration of one search.
#[derive(Debug, Clone)]
pub struct Candidate {
    /// The index entry.
    pub entry: IndexEntry,
    /// Fused RRF score (higher = more relevant).
    pub score: f64,
    /// Best (lowest) rank across contributing lists; tie-breaker.
    pub min_rank: usize,
}

/// Fuse ranked sub-query result lists into one candidate list.
///
/// Ranks are 1-based. Candidates are ordered by descending score, ties
/// broken by lowest minimum rank and then by surrogate id so the result
/// is deterministic for identical inputs. Truncates to `k_rerank`.
pub fn fuse(lists: &[Vec<Ranked>], coeff: u32, k_rerank: usize) -> Vec<Candidate> {
    let mut fused: HashMap<Uuid, Candidate> = HashMap::new();

    for list in lists {
        // An entry duplicated within one list only counts at its best rank.
        let mut best: HashMap<Uuid, &Ranked> = HashMap::new();
        for ranked in list {
            best.entry(ranked.entry.id)
                .and_modify(|cur| {
                    if ranked.rank < cur.rank {
                        *cur = ranked;
                    }
                })
                .or_insert(ranked);
        }

        for (id, ranked) in best {
            let contribution = 1.0 / (coeff as f64 + ranked.rank as f64);
            fused
                .entry(id)
                .and_modify(|c| {
                    c.score += contribution;
                    c.min_rank = c.min_rank.min(ranked.rank);
                })
                .or_insert_with(|| Candidate {
                    entry: ranked.entry.clone(),
                    score: contribution,
                    min_rank: ranked.rank,
                });
        }
    }

    let mut candidates: Vec<Candidate> = fused.into_values().collect();
    candidates.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.min_rank.cmp(&b.min_rank))
            .then_with(|| a.entry.id.cmp(&b.entry.id))
    });
    candidates.truncate(k_rerank);
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: u128, name: &str) -> IndexEntry {
        IndexEntry {
            id: Uuid::from_u128(id),
            name: name.to_string(),
            address: format!("agentdns://org/{}", name),
            description: String::new(),
            tags: String::new(),
        }
    }

    fn ranked(id: u128, name: &str, rank: usize) -> Ranked {
        Ranked {
            entry: entry(id, name),
            rank,
        }
    }

    #[test]
    fn test_multi_list_presence_beats_single_list() {
        // X at rank 1 in list A only; Y at rank 1 in lists A and B.
        let list_a = vec![ranked(1, "x", 1), ranked(2, "y", 2)];
        let list_b = vec![ranked(2, "y", 1)];

        for coeff in [1, 60, 100, 1000] {
            let fused = fuse(&[list_a.clone(), list_b.clone()], coeff, 10);
            let x = fused.iter().find(|c| c.entry.id == Uuid::from_u128(1)).unwrap();
            let y = fused.iter().find(|c| c.entry.id == Uuid::from_u128(2)).unwrap();
            assert!(y.score > x.score, "coeff={}", coeff);
        }
    }

    #[test]
    fn test_scores_sum_over_lists() {
        let lists = vec![vec![ranked(1, "a", 1)], vec![ranked(1, "a", 3)]];
        let fused = fuse(&lists, 60, 10);
        assert_eq!(fused.len(), 1);
        let expected = 1.0 / 61.0 + 1.0 / 63.0;
        assert!((fused[0].score - expected).abs() < 1e-12);
        assert_eq!(fused[0].min_rank, 1);
    }

    #[test]
    fn test_tie_broken_by_min_rank_then_id() {
        // Same score: both appear once at rank 2 in different lists.
        let lists = vec![vec![ranked(2, "b", 2)], vec![ranked(1, "a", 2)]];
        let fused = fuse(&lists, 60, 10);
        assert_eq!(fused[0].entry.id, Uuid::from_u128(1));
        assert_eq!(fused[1].entry.id, Uuid::from_u128(2));
    }

    #[test]
    fn test_truncates_to_k_rerank() {
        let list: Vec<Ranked> = (1..=10).map(|i| ranked(i as u128, "n", i)).collect();
        let fused = fuse(&[list], DEFAULT_COEFF, 3);
        assert_eq!(fused.len(), 3);
        assert_eq!(fused[0].min_rank, 1);
    }

    #[test]
    fn test_duplicate_within_list_counts_once_at_best_rank() {
        let list = vec![ranked(1, "a", 1), ranked(1, "a", 4)];
        let fused = fuse(&[list], 60, 10);
        assert_eq!(fused.len(), 1);
        assert!((fused[0].score - 1.0 / 61.0).abs() < 1e-12);
    }

    #[test]
    fn test_empty_lists_yield_no_candidates() {
        assert!(fuse(&[vec![], vec![]], 60, 5).is_empty());
    }
}
