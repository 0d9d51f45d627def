//! Scoring for the similarity ranking engine: cosine similarity over the
//! overlapping vector prefix, a whole-word title-match heuristic, and the
//! weighted blend that orders candidates.

use std::cmp::Ordering;

use regex::Regex;

use crate::models::job::JobRow;

pub const SIMILARITY_WEIGHT: f64 = 0.7;
pub const TITLE_MATCH_WEIGHT: f64 = 0.3;
/// Candidates at or below this similarity are discarded before ranking.
pub const SIMILARITY_FLOOR: f64 = 0.1;
pub const DEFAULT_LIMIT: usize = 10;

/// Cosine similarity of two vectors, computed over their overlapping
/// prefix when lengths differ (`n = min(len(a), len(b))`; dot product and
/// both norms use the prefix). Returns `0.0` whenever either prefix norm
/// is zero, which also covers empty inputs.
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    let n = a.len().min(b.len());
    if n == 0 {
        return 0.0;
    }

    let mut dot = 0.0;
    let mut norm_a = 0.0;
    let mut norm_b = 0.0;
    for i in 0..n {
        dot += a[i] * b[i];
        norm_a += a[i] * a[i];
        norm_b += b[i] * b[i];
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a.sqrt() * norm_b.sqrt())
}

/// Whole-word, case-insensitive match of the user's target title against
/// job titles. A hit scores 1.0, anything else 0.5. Built once per ranking
/// pass; an empty target title never matches.
pub struct TitleMatcher {
    pattern: Option<Regex>,
}

impl TitleMatcher {
    pub fn new(user_job_title: &str) -> Self {
        let trimmed = user_job_title.trim();
        let pattern = if trimmed.is_empty() {
            None
        } else {
            Regex::new(&format!(r"(?i)\b{}\b", regex::escape(trimmed))).ok()
        };
        Self { pattern }
    }

    pub fn score(&self, job_title: &str) -> f64 {
        match &self.pattern {
            Some(re) if re.is_match(job_title) => 1.0,
            _ => 0.5,
        }
    }
}

/// A candidate with its ranking internals still attached. Callers of the
/// public API never see these fields; the engine strips them.
#[derive(Debug, Clone)]
pub struct ScoredJob {
    pub job: JobRow,
    pub similarity: f64,
    pub title_match: f64,
    pub final_score: f64,
}

/// Scores, filters, and orders ranking candidates.
///
/// Ties on the final score break by creation time, oldest first, so equal
/// scores rank deterministically.
pub fn rank(
    candidates: Vec<JobRow>,
    resume_embedding: &[f64],
    user_job_title: &str,
    limit: usize,
) -> Vec<ScoredJob> {
    let matcher = TitleMatcher::new(user_job_title);

    let mut scored: Vec<ScoredJob> = candidates
        .into_iter()
        .map(|job| {
            let similarity = cosine_similarity(&job.embedding, resume_embedding);
            let title_match = matcher.score(&job.title);
            let final_score = SIMILARITY_WEIGHT * similarity + TITLE_MATCH_WEIGHT * title_match;
            ScoredJob {
                job,
                similarity,
                title_match,
                final_score,
            }
        })
        .filter(|s| s.similarity > SIMILARITY_FLOOR)
        .collect();

    scored.sort_by(|a, b| {
        b.final_score
            .partial_cmp(&a.final_score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.job.created_at.cmp(&b.job.created_at))
    });
    scored.truncate(limit);
    scored
}

/// Lenient limit parsing: any missing, non-integer, or non-positive value
/// falls back to the default of 10.
pub fn effective_limit(raw: Option<&str>) -> usize {
    raw.and_then(|s| s.trim().parse::<i64>().ok())
        .filter(|n| *n > 0)
        .map(|n| n as usize)
        .unwrap_or(DEFAULT_LIMIT)
}
