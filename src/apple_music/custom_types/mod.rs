use anyhow::{Result, ensure};

use crate::apple_music::api_types;
use crate::search::{Candidate, CandidateKind};

impl TryFrom<api_types::search::Resource> for Candidate {
    type Error = anyhow::Error;

    fn try_from(value: api_types::search::Resource) -> Result<Self, Self::Error> {
        ensure!(!value.id.is_empty(), "search result without an ID");
        let kind = match value.kind.as_str() {
            "songs" => CandidateKind::Song,
            "music-videos" => CandidateKind::Video,
            _ => CandidateKind::Other,
        };
        Ok(Candidate {
            id: value.id,
            title: value.attributes.name,
            contributors: vec![value.attributes.artist_name],
            kind,
            is_official: value.attributes.isrc.is_some_and(|isrc| !isrc.is_empty()),
        })
    }
}

/// Flattens a search response into candidates: songs first, then music videos.
pub fn candidates_from_search(root: api_types::search::Root) -> Result<Vec<Candidate>> {
    let results = root.results;
    results
        .songs
        .into_iter()
        .chain(results.music_videos)
        .flat_map(|page| page.data)
        .map(Candidate::try_from)
        .collect()
}
