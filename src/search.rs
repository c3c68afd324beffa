use anyhow::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateKind {
    Song,
    Video,
    Other,
}

/// A target catalog search result considered as a possible match.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub id: String,
    pub title: String,
    pub contributors: Vec<String>,
    pub kind: CandidateKind,
    pub is_official: bool,
}

/// Free-text search against the target catalog.
///
/// Results are ordered by the catalog's own relevance. An error for one query
/// is treated by the matcher as that query returning nothing.
pub trait SearchAdapter {
    /// Performs any expensive one-time setup. A failure here fails the whole
    /// conversion request.
    async fn prepare(&self) -> Result<()> {
        Ok(())
    }

    async fn search(&self, query: &str) -> Result<Vec<Candidate>>;
}
