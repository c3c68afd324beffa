use serde::Deserialize;

#[derive(Deserialize)]
pub struct Root {
    #[serde(default)]
    pub(in crate::apple_music) results: SearchResults,
}

#[derive(Default, Deserialize)]
pub struct SearchResults {
    pub(in crate::apple_music) songs: Option<ResultPage>,
    #[serde(rename = "music-videos")]
    pub(in crate::apple_music) music_videos: Option<ResultPage>,
}

#[derive(Deserialize)]
pub struct ResultPage {
    pub(in crate::apple_music) data: Vec<Resource>,
}

#[derive(Deserialize)]
pub struct Resource {
    pub(in crate::apple_music) id: String,
    /// `songs` or `music-videos`
    #[serde(rename = "type")]
    pub(in crate::apple_music) kind: String,
    pub(in crate::apple_music) attributes: ResourceAttributes,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceAttributes {
    /// All of the track's artists
    pub(in crate::apple_music) artist_name: String,
    pub(in crate::apple_music) name: String,
    /// Missing for uploads that weren't delivered by a label
    pub(in crate::apple_music) isrc: Option<String>,
}
