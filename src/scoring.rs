//! Scores a target catalog candidate against a source track.
//!
//! The score is a sum of independent signals:
//! - edit-distance title similarity, scaled by the title weight
//! - a bonus when the whole source title appears in the candidate title
//! - a small bonus per shared title word
//! - artist containment and shared artist words
//! - result kind, official flag and title vocabulary (positive and negative)
//!
//! Every constant comes from [`MatchConfig`], so the score of a given
//! (track, candidate) pair depends on nothing else.

use std::collections::HashSet;

use crate::config::MatchConfig;
use crate::conversion::SourceTrack;
use crate::normalize::normalize;
use crate::search::{Candidate, CandidateKind};

/// `1 - levenshtein / max_len` over characters, or 0 when either side is empty.
pub fn edit_similarity(a: &str, b: &str) -> f64 {
    let max_len = a.chars().count().max(b.chars().count());
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    1.0 - strsim::levenshtein(a, b) as f64 / max_len as f64
}

/// Number of words longer than 2 chars in `needle` that appear in `haystack`.
fn shared_words(needle: &str, haystack: &HashSet<&str>) -> usize {
    needle
        .split(' ')
        .filter(|word| word.chars().count() > 2 && haystack.contains(word))
        .count()
}

/// Whether `term` appears in the normalized `text` as a whole word or phrase.
fn contains_term(text: &str, term: &str) -> bool {
    let term = normalize(term);
    !term.is_empty() && format!(" {text} ").contains(&format!(" {term} "))
}

pub fn score(track: &SourceTrack, candidate: &Candidate, config: &MatchConfig) -> f64 {
    let weights = &config.weights;

    let source_title = normalize(&track.name);
    let candidate_title = normalize(&candidate.title);
    let candidate_title_words: HashSet<&str> = candidate_title.split(' ').collect();

    let mut total = edit_similarity(&source_title, &candidate_title) * weights.title;
    if !source_title.is_empty() && candidate_title.contains(&source_title) {
        total += weights.title_substring;
    }
    total += shared_words(&source_title, &candidate_title_words) as f64 * weights.title_word;

    let artist = normalize(track.primary_artist());
    if !artist.is_empty() {
        let contributors = normalize(&candidate.contributors.join(" "));
        if contributors.contains(&artist) {
            total += weights.artist;
        }
        let contributor_words: HashSet<&str> = contributors.split(' ').collect();
        total += shared_words(&artist, &contributor_words) as f64 * weights.artist_word;
    }

    if candidate.kind == CandidateKind::Song {
        total += weights.song_kind;
    }
    if candidate.is_official {
        total += weights.official;
    }
    if config
        .positive_terms
        .iter()
        .any(|term| contains_term(&candidate_title, term))
    {
        total += weights.positive_signal;
    }
    if config
        .negative_terms
        .iter()
        .any(|term| contains_term(&candidate_title, term))
    {
        total -= weights.negative_signal;
    }

    total
}
