use serde::{Deserialize, Serialize};

use super::ImageRef;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub filename: String,
    #[serde(rename = "similarity")]
    pub similarity_percent: f64,
    #[serde(rename = "image_data", default)]
    pub preview: ImageRef,
    #[serde(rename = "original_image_data", default)]
    pub original: ImageRef,
}

impl MatchResult {
    pub fn similarity(&self) -> f64 {
        if self.similarity_percent.is_nan() {
            return 0.0;
        }
        self.similarity_percent.clamp(0.0, 100.0)
    }

    pub fn rounded_percent(&self) -> u32 {
        self.similarity().round() as u32
    }

    /// The service URL-quotes stored file names.
    pub fn display_name(&self) -> String {
        let decoded = urlencoding::decode_binary(self.filename.as_bytes());
        String::from_utf8_lossy(&decoded).into_owned()
    }
}

/// Ranked matches in the order the service returned them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultSet {
    matches: Vec<MatchResult>,
}

impl ResultSet {
    pub fn from_server(matches: Vec<MatchResult>) -> Self {
        Self { matches }
    }

    pub fn matches(&self) -> &[MatchResult] {
        &self.matches
    }

    pub fn get(&self, index: usize) -> Option<&MatchResult> {
        self.matches.get(index)
    }

    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    pub fn clear(&mut self) {
        self.matches.clear();
    }

    pub fn is_ranked(&self) -> bool {
        self.matches
            .windows(2)
            .all(|pair| pair[0].similarity() >= pair[1].similarity())
    }

    pub fn header(&self) -> String {
        match self.matches.len() {
            1 => "Search Results (1 match found)".to_string(),
            count => format!("Search Results ({count} matches found)"),
        }
    }
}
