use tracing::debug;

use crate::{
    catalog::Assessment,
    embedder::Embedder,
    error::Result,
    features::{Features, RoleLevel},
    index::EmbeddingIndex,
    retriever::Candidate,
    rules::RuleConfig,
};

/// Ranked catalog indices plus the human-readable trace.
#[derive(Debug)]
pub struct RankOutcome {
    /// Catalog indices, best first, truncated to `final_k`.
    pub ranked: Vec<usize>,
    pub reasoning: String,
    pub filtered_by_duration: usize,
}

#[derive(Debug, Clone, Copy)]
struct ScoredCandidate {
    index: usize,
    score: f32,
}

/// Re-score and rank the retrieved candidates.
///
/// A second, narrower similarity pass scores each candidate against the
/// tech-only query; the hard duration filter runs before any scoring; four
/// weighted signals blend into the final score, with a multiplicative boost
/// when a soft-skill request meets a soft-skill document. Equal scores keep
/// first-retrieval order (stable sort over the order-preserving candidate
/// list).
pub fn rank(
    embedder: &mut dyn Embedder,
    index: &EmbeddingIndex,
    catalog: &[Assessment],
    rules: &RuleConfig,
    features: &Features,
    candidates: &[Candidate],
    cleaned_tech_query: &str,
    final_k: usize,
) -> Result<RankOutcome> {
    let tech_vector = embedder.encode_one(cleaned_tech_query)?;
    index.check_dimension(&tech_vector)?;

    let weights = &rules.weights;
    let mut filtered_by_duration = 0usize;
    let mut scored: Vec<ScoredCandidate> = Vec::with_capacity(candidates.len());

    for candidate in candidates {
        let assessment = &catalog[candidate.index];

        // Hard filter: exclusion, not a penalty. Unknown durations pass.
        if let (Some(cap), Some(duration)) = (features.max_duration, assessment.duration)
            && duration > cap
        {
            debug!(
                name = %assessment.name,
                duration, cap, "filtered by duration"
            );
            filtered_by_duration += 1;
            continue;
        }

        let tech_sim = index.similarity_to(candidate.index, &tech_vector)?;
        let soft_skill = soft_skill_flag(assessment, rules);
        let level = level_score(assessment, features.role_level);
        let score = final_score(
            tech_sim,
            soft_skill,
            candidate.context_similarity,
            level,
            rules,
            features.soft_skill_requested,
        );

        scored.push(ScoredCandidate {
            index: candidate.index,
            score,
        });
    }

    // Stable sort: ties keep retrieval order.
    scored.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let survivors = scored.len();
    let mut reasoning = format!(
        "Processed {} candidates. Filtered {} for duration. \
         Re-ranked {} using a multi-signal score ({:.0}% tech, {:.0}% soft, \
         {:.0}% context, {:.0}% level).",
        candidates.len(),
        filtered_by_duration,
        survivors,
        weights.tech_sim * 100.0,
        weights.soft_skill * 100.0,
        weights.context_sim * 100.0,
        weights.level * 100.0,
    );
    if survivors == 0 {
        reasoning.push_str(" No candidates survived the hard filters.");
    }

    scored.truncate(final_k);
    Ok(RankOutcome {
        ranked: scored.into_iter().map(|s| s.index).collect(),
        reasoning,
        filtered_by_duration,
    })
}

/// Weighted sum of the four signals, boosted multiplicatively when a
/// soft-skill request meets a soft-skill document.
fn final_score(
    tech_sim: f32,
    soft_skill: f32,
    context_sim: f32,
    level: f32,
    rules: &RuleConfig,
    soft_skill_requested: bool,
) -> f32 {
    let weights = &rules.weights;
    let mut score = tech_sim * weights.tech_sim
        + soft_skill * weights.soft_skill
        + context_sim * weights.context_sim
        + level * weights.level;

    if soft_skill_requested && soft_skill == 1.0 {
        score *= rules.soft_skill_boost;
    }
    score
}

/// 1.0 when the assessment reads as a soft-skill document, else 0.0.
fn soft_skill_flag(assessment: &Assessment, rules: &RuleConfig) -> f32 {
    let name_lower = assessment.name.to_lowercase();
    let desc_lower = assessment.description.to_lowercase();

    if rules
        .collab_keywords
        .iter()
        .any(|kw| name_lower.contains(kw.as_str()) || desc_lower.contains(kw.as_str()))
    {
        return 1.0;
    }
    if assessment
        .test_type
        .iter()
        .any(|t| t == &rules.personality_test_type)
    {
        return 1.0;
    }
    0.0
}

/// Neutral 0.5 unless the assessment name signals a level that matches or
/// contradicts the requested one.
fn level_score(assessment: &Assessment, role_level: RoleLevel) -> f32 {
    let name_lower = assessment.name.to_lowercase();
    let is_entry = name_lower.contains("entry");
    let is_advanced = name_lower.contains("advanced") || name_lower.contains("senior");

    match role_level {
        RoleLevel::Entry if is_entry => 1.0,
        RoleLevel::Entry if is_advanced => 0.0,
        RoleLevel::Senior if is_entry => 0.0,
        RoleLevel::Senior if is_advanced => 1.0,
        _ => 0.5,
    }
}
