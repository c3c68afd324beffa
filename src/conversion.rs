use std::collections::BTreeMap;

use anyhow::{Context, Result};
use futures::{StreamExt, stream};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::MatchConfig;
use crate::matching::select_match;
use crate::search::SearchAdapter;

/// A track from the source playlist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceTrack {
    pub name: String,
    /// Credited artists, primary artist first
    pub artists: Vec<String>,
}

impl SourceTrack {
    /// The first credited artist, or `""` when the track has none.
    pub fn primary_artist(&self) -> &str {
        self.artists.first().map_or("", String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionResult {
    pub source: SourceTrack,
    pub matched_id: Option<String>,
    pub found: bool,
}

impl ConversionResult {
    pub fn new(source: SourceTrack, matched_id: Option<String>) -> Self {
        Self {
            found: matched_id.is_some(),
            source,
            matched_id,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionSummary {
    pub total_tracks: usize,
    pub successful_conversions: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Conversion {
    pub results: Vec<ConversionResult>,
    pub summary: ConversionSummary,
}

/// Resolves whole track lists against the target catalog.
pub struct Converter<'a, S> {
    search: &'a S,
    config: &'a MatchConfig,
    concurrency: usize,
}

impl<'a, S: SearchAdapter> Converter<'a, S> {
    pub fn new(search: &'a S, config: &'a MatchConfig) -> Self {
        Self {
            search,
            config,
            concurrency: 1,
        }
    }

    /// Number of tracks resolved at the same time. Output order is unaffected.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Produces one result per input track, in input order.
    ///
    /// A track whose resolution fails is reported as unmatched. Only a failure
    /// to set up the search client fails the whole batch.
    pub async fn convert(&self, tracks: &[SourceTrack]) -> Result<Conversion> {
        self.search
            .prepare()
            .await
            .context("failed to initialize search client")?;

        info!(
            tracks = tracks.len(),
            concurrency = self.concurrency,
            "Converting tracks"
        );

        let completed: Vec<(usize, Option<String>)> = stream::iter(tracks.iter().enumerate())
            .map(|(index, track)| async move { (index, self.resolve(index, track).await) })
            .buffer_unordered(self.concurrency)
            .collect()
            .await;

        // Completions arrive in any order when concurrent
        let mut by_index: BTreeMap<usize, Option<String>> = completed.into_iter().collect();
        let results: Vec<ConversionResult> = tracks
            .iter()
            .enumerate()
            .map(|(index, track)| {
                ConversionResult::new(track.clone(), by_index.remove(&index).flatten())
            })
            .collect();

        let summary = ConversionSummary {
            total_tracks: tracks.len(),
            successful_conversions: results.iter().filter(|r| r.found).count(),
        };
        info!(
            total_tracks = summary.total_tracks,
            successful_conversions = summary.successful_conversions,
            "Conversion finished"
        );

        Ok(Conversion { results, summary })
    }

    async fn resolve(&self, index: usize, track: &SourceTrack) -> Option<String> {
        match select_match(self.search, track, self.config).await {
            Ok(Some(matched)) => {
                info!(
                    index,
                    track = %track.name,
                    matched_id = %matched.id,
                    matched_title = %matched.title,
                    score = matched.score,
                    "Matched track"
                );
                Some(matched.id)
            }
            Ok(None) => {
                info!(index, track = %track.name, "No acceptable match");
                None
            }
            Err(error) => {
                warn!(index, track = %track.name, error = %error, "Track resolution failed");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use anyhow::bail;

    use super::*;
    use crate::search::Candidate;
    use crate::search::testing::{FakeSearch, song};

    fn track(name: &str, artist: &str) -> SourceTrack {
        SourceTrack {
            name: name.to_owned(),
            artists: vec![artist.to_owned()],
        }
    }

    #[test]
    fn test_primary_artist() {
        assert_eq!(track("Song", "A").primary_artist(), "A");
        let no_artist = SourceTrack {
            name: "Song".to_owned(),
            artists: Vec::new(),
        };
        assert_eq!(no_artist.primary_artist(), "");
    }

    #[tokio::test]
    async fn test_convert_single_match() {
        let search = FakeSearch::new(|query: &str| {
            Ok(if query == "Blinding Lights The Weeknd" {
                vec![song("abc123", "Blinding Lights", "The Weeknd")]
            } else {
                Vec::new()
            })
        });
        let config = MatchConfig::default();
        let tracks = vec![track("Blinding Lights", "The Weeknd")];

        let conversion = Converter::new(&search, &config)
            .convert(&tracks)
            .await
            .unwrap();

        assert_eq!(
            conversion.results,
            vec![ConversionResult {
                source: tracks[0].clone(),
                matched_id: Some("abc123".to_owned()),
                found: true,
            }],
        );
        assert_eq!(
            conversion.summary,
            ConversionSummary {
                total_tracks: 1,
                successful_conversions: 1,
            },
        );
    }

    #[tokio::test]
    async fn test_convert_no_results() {
        let search = FakeSearch::new(|_: &str| Ok(Vec::new()));
        let config = MatchConfig::default();
        let tracks = vec![track("Blinding Lights", "The Weeknd")];

        let conversion = Converter::new(&search, &config)
            .convert(&tracks)
            .await
            .unwrap();

        assert_eq!(conversion.results[0].matched_id, None);
        assert!(!conversion.results[0].found);
        assert_eq!(conversion.summary.successful_conversions, 0);
        assert_eq!(conversion.summary.total_tracks, 1);
    }

    #[tokio::test]
    async fn test_convert_search_failure_isolated_to_track() {
        let search = FakeSearch::new(|query: &str| {
            if query.contains("Second") {
                bail!("service unavailable");
            }
            Ok(vec![
                song("1", "First Song", "Artist"),
                song("3", "Third Song", "Artist"),
            ])
        });
        let config = MatchConfig::default();
        let tracks = vec![
            track("First Song", "Artist"),
            track("Second Song", "Artist"),
            track("Third Song", "Artist"),
        ];

        let conversion = Converter::new(&search, &config)
            .convert(&tracks)
            .await
            .unwrap();

        let ids: Vec<Option<&str>> = conversion
            .results
            .iter()
            .map(|r| r.matched_id.as_deref())
            .collect();
        assert_eq!(ids, vec![Some("1"), None, Some("3")]);
        assert_eq!(conversion.summary.total_tracks, 3);
        assert_eq!(conversion.summary.successful_conversions, 2);
    }

    #[tokio::test]
    async fn test_convert_untitled_track_unmatched() {
        let search = FakeSearch::new(|_: &str| Ok(vec![song("1", "Song", "Artist")]));
        let config = MatchConfig::default();
        let tracks = vec![
            SourceTrack {
                name: String::new(),
                artists: Vec::new(),
            },
            track("Song", "Artist"),
        ];

        let conversion = Converter::new(&search, &config)
            .convert(&tracks)
            .await
            .unwrap();

        assert!(!conversion.results[0].found);
        assert!(conversion.results[1].found);
        assert_eq!(conversion.summary.successful_conversions, 1);
    }

    #[tokio::test]
    async fn test_convert_empty_input() {
        let search = FakeSearch::new(|_: &str| Ok(Vec::new()));
        let config = MatchConfig::default();
        let conversion = Converter::new(&search, &config).convert(&[]).await.unwrap();
        assert!(conversion.results.is_empty());
        assert_eq!(
            conversion.summary,
            ConversionSummary {
                total_tracks: 0,
                successful_conversions: 0,
            },
        );
    }

    /// Earlier tracks take longer, so completions arrive in reverse order.
    struct StaggeredSearch {
        delays_ms: Vec<(&'static str, u64)>,
    }

    impl SearchAdapter for StaggeredSearch {
        async fn search(&self, query: &str) -> Result<Vec<Candidate>> {
            for (title, delay) in &self.delays_ms {
                if query.starts_with(title) {
                    tokio::time::sleep(Duration::from_millis(*delay)).await;
                    return Ok(vec![song(title, title, "Artist")]);
                }
            }
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn test_convert_concurrent_preserves_order() {
        let search = StaggeredSearch {
            delays_ms: vec![("Alpha", 60), ("Bravo", 40), ("Charlie", 20), ("Delta", 0)],
        };
        let config = MatchConfig::default();
        let tracks: Vec<SourceTrack> = ["Alpha", "Bravo", "Charlie", "Delta", "Echo"]
            .into_iter()
            .map(|name| track(name, "Artist"))
            .collect();

        let conversion = Converter::new(&search, &config)
            .with_concurrency(4)
            .convert(&tracks)
            .await
            .unwrap();

        assert_eq!(conversion.results.len(), tracks.len());
        for (result, track) in conversion.results.iter().zip(&tracks) {
            assert_eq!(&result.source, track);
        }
        let ids: Vec<Option<&str>> = conversion
            .results
            .iter()
            .map(|r| r.matched_id.as_deref())
            .collect();
        assert_eq!(
            ids,
            vec![Some("Alpha"), Some("Bravo"), Some("Charlie"), Some("Delta"), None],
        );
        assert_eq!(conversion.summary.successful_conversions, 4);
    }

    struct BrokenSearch;

    impl SearchAdapter for BrokenSearch {
        async fn prepare(&self) -> Result<()> {
            bail!("no credentials")
        }

        async fn search(&self, _query: &str) -> Result<Vec<Candidate>> {
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn test_convert_prepare_failure_fails_request() {
        let config = MatchConfig::default();
        let result = Converter::new(&BrokenSearch, &config)
            .convert(&[track("Song", "Artist")])
            .await;
        assert!(result.is_err());
    }

    #[test]
    fn test_conversion_serializes_camel_case() {
        let conversion = Conversion {
            results: vec![ConversionResult::new(track("Song", "Artist"), None)],
            summary: ConversionSummary {
                total_tracks: 1,
                successful_conversions: 0,
            },
        };
        let json = serde_json::to_value(&conversion).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "results": [{
                    "source": { "name": "Song", "artists": ["Artist"] },
                    "matchedId": null,
                    "found": false,
                }],
                "summary": { "totalTracks": 1, "successfulConversions": 0 },
            }),
        );
    }
}
