//! External book metadata (Google Books search proxied by the backend).

use serde::{Deserialize, Serialize};

/// Cover images of a candidate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateImage {
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default, rename = "smallThumbnail")]
    pub small_thumbnail: Option<String>,
}

/// One search result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetadataCandidate {
    #[serde(default)]
    pub google_volume_id: Option<String>,
    pub title: String,
    #[serde(default)]
    pub authors: Vec<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub image: CandidateImage,
    #[serde(default)]
    pub isbn_10: Option<String>,
    #[serde(default)]
    pub isbn_13: Option<String>,
    #[serde(default, rename = "publishedDate")]
    pub published_date: Option<String>,
    #[serde(default)]
    pub confidence_score: f64,
    #[serde(default)]
    pub confidence_reason: Option<String>,
}

impl MetadataCandidate {
    /// Best available cover url. Google serves `http` links which are blocked inside Telegram,
    /// so they are upgraded to `https`.
    #[must_use]
    pub fn cover_url(&self) -> Option<String> {
        self.image
            .thumbnail
            .as_deref()
            .or(self.image.small_thumbnail.as_deref())
            .filter(|url| !url.trim().is_empty())
            .map(|url| {
                url.strip_prefix("http://")
                    .map_or_else(|| url.to_owned(), |rest| format!("https://{rest}"))
            })
    }

    /// Non-empty description, if any.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description
            .as_deref()
            .map(str::trim)
            .filter(|description| !description.is_empty())
    }
}

/// Search response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetadataSearch {
    #[serde(default, rename = "bestMatch")]
    pub best_match: Option<MetadataCandidate>,
    #[serde(default)]
    pub candidates: Vec<MetadataCandidate>,
    #[serde(default)]
    pub source: Option<String>,
}

impl MetadataSearch {
    /// The suggestion to offer: the best match or the most confident candidate.
    #[must_use]
    pub fn suggestion(&self) -> Option<&MetadataCandidate> {
        self.best_match.as_ref().or_else(|| {
            self.candidates
                .iter()
                .max_by(|a, b| a.confidence_score.total_cmp(&b.confidence_score))
        })
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, reason = "it's ok in tests")]

    use super::*;

    #[test]
    fn suggestion_falls_back_to_most_confident() {
        let search: MetadataSearch = serde_json::from_str(
            r#"{
                "candidates": [
                    {"title": "A", "confidence_score": 0.3},
                    {"title": "B", "confidence_score": 0.9, "image": {"thumbnail": "http://x/y.jpg"}},
                    {"title": "C", "confidence_score": 0.5}
                ],
                "source": "google_books"
            }"#,
        )
        .unwrap();
        let suggestion = search.suggestion().unwrap();
        assert_eq!(suggestion.title, "B");
        assert_eq!(suggestion.cover_url().as_deref(), Some("https://x/y.jpg"));
    }

    #[test]
    fn empty_search_has_no_suggestion() {
        assert!(MetadataSearch::default().suggestion().is_none());
    }
}
