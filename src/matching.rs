use anyhow::{Result, ensure};
use tracing::{debug, warn};

use crate::config::MatchConfig;
use crate::conversion::SourceTrack;
use crate::normalize::clean;
use crate::queries::generate_queries;
use crate::scoring::score;
use crate::search::{Candidate, SearchAdapter};

/// The accepted candidate for one source track.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchedCandidate {
    pub id: String,
    pub title: String,
    pub score: f64,
}

/// Searches the target catalog for `track` and returns the best candidate if
/// it clears the acceptance threshold.
///
/// Search failures and timeouts count as a query with no results. Fails only
/// when the track has nothing to search for.
pub async fn select_match<S: SearchAdapter>(
    search: &S,
    track: &SourceTrack,
    config: &MatchConfig,
) -> Result<Option<MatchedCandidate>> {
    let cleaned = clean(&track.name);
    let queries = generate_queries(
        &cleaned,
        &track.name,
        track.primary_artist(),
        &config.query_templates,
    );
    ensure!(!queries.is_empty(), "track has no title or artist to search for");

    // Candidates are compared against the decoration-free title.
    let scored_track = SourceTrack {
        name: if cleaned.is_empty() {
            track.name.clone()
        } else {
            cleaned
        },
        artists: track.artists.clone(),
    };

    let mut best: Option<(Candidate, f64)> = None;
    for query in &queries {
        let response = tokio::time::timeout(config.query_timeout(), search.search(query)).await;
        let candidates = match response {
            Ok(Ok(candidates)) => candidates,
            Ok(Err(error)) => {
                warn!(query = %query, error = %error, "Search failed, skipping query");
                continue;
            }
            Err(_) => {
                warn!(
                    query = %query,
                    timeout_secs = config.query_timeout_secs,
                    "Search timed out, skipping query"
                );
                continue;
            }
        };

        for candidate in candidates {
            let candidate_score = score(&scored_track, &candidate, config);
            debug!(
                query = %query,
                candidate_id = %candidate.id,
                candidate_title = %candidate.title,
                score = candidate_score,
                "Scored candidate"
            );
            // Strictly greater, so ties keep the earlier candidate
            if best
                .as_ref()
                .is_none_or(|(_, best_score)| candidate_score > *best_score)
            {
                best = Some((candidate, candidate_score));
            }
        }

        if let (Some((_, best_score)), Some(cutoff)) = (&best, config.strong_match_cutoff) {
            if *best_score > cutoff {
                debug!(
                    query = %query,
                    score = best_score,
                    "Strong match, skipping remaining queries"
                );
                break;
            }
        }
    }

    Ok(best.and_then(|(candidate, best_score)| {
        if best_score >= config.acceptance_threshold {
            Some(MatchedCandidate {
                id: candidate.id,
                title: candidate.title,
                score: best_score,
            })
        } else {
            debug!(
                candidate_id = %candidate.id,
                score = best_score,
                threshold = config.acceptance_threshold,
                "Best candidate below acceptance threshold"
            );
            None
        }
    }))
}
