use std::collections::BTreeMap;

use crate::error::{ensure_same_len, Result};
use crate::types::QueryId;

/// Ranking quality of the candidates belonging to one question.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QueryRanking {
    pub query: QueryId,
    pub average_precision: f64,
    pub reciprocal_rank: f64,
}

/// Ranks each question's candidates by descending score and scores them.
///
/// Questions with no relevant candidate are skipped. Candidates with equal
/// scores keep their input order.
pub fn rank_queries(qids: &[f64], scores: &[f32], labels: &[u32]) -> Result<Vec<QueryRanking>> {
    ensure_same_len("qids/scores", qids.len(), scores.len())?;
    ensure_same_len("qids/labels", qids.len(), labels.len())?;

    let mut groups: BTreeMap<QueryId, Vec<(f32, bool)>> = BTreeMap::new();
    for ((&qid, &score), &label) in qids.iter().zip(scores).zip(labels) {
        groups
            .entry(QueryId::from_raw(qid))
            .or_default()
            .push((score, label > 0));
    }

    let mut rankings = Vec::with_capacity(groups.len());
    for (query, mut candidates) in groups {
        if !candidates.iter().any(|(_, relevant)| *relevant) {
            continue;
        }
        candidates.sort_by(|(a, _), (b, _)| b.total_cmp(a));

        let mut hits = 0usize;
        let mut precision_sum = 0.0f64;
        let mut first_hit = None;
        for (rank, (_, relevant)) in candidates.iter().enumerate() {
            if *relevant {
                hits += 1;
                precision_sum += hits as f64 / (rank + 1) as f64;
                first_hit.get_or_insert(rank + 1);
            }
        }

        rankings.push(QueryRanking {
            query,
            average_precision: precision_sum / hits as f64,
            reciprocal_rank: first_hit.map_or(0.0, |r| 1.0 / r as f64),
        });
    }

    Ok(rankings)
}

/// Mean average precision and mean reciprocal rank over all questions.
///
/// Returns `(0.0, 0.0)` when no question has a relevant candidate.
pub fn map_mrr(qids: &[f64], scores: &[f32], labels: &[u32]) -> Result<(f64, f64)> {
    let rankings = rank_queries(qids, scores, labels)?;
    if rankings.is_empty() {
        tracing::warn!("no question has a relevant candidate; MAP/MRR reported as 0");
        return Ok((0.0, 0.0));
    }
    let n = rankings.len() as f64;
    let map = rankings.iter().map(|r| r.average_precision).sum::<f64>() / n;
    let mrr = rankings.iter().map(|r| r.reciprocal_rank).sum::<f64>() / n;
    Ok((map, mrr))
}
