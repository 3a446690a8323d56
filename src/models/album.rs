#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlbumRecord {
    pub name: String,
    pub artist_name: String,
    pub play_count: u64,
    pub cover_candidates: Vec<String>, // smallest to largest
    pub original_index: usize,         // position in the top-N list, grid placement key
}

impl AlbumRecord {
    pub fn new(name: String, artist_name: String, original_index: usize) -> Self {
        Self {
            name,
            artist_name,
            play_count: 0,
            cover_candidates: Vec::new(),
            original_index,
        }
    }

    pub fn with_play_count(mut self, play_count: u64) -> Self {
        self.play_count = play_count;
        self
    }

    pub fn with_cover_candidates(mut self, cover_candidates: Vec<String>) -> Self {
        self.cover_candidates = cover_candidates;
        self
    }

    /// The largest available cover, if any.
    pub fn preferred_cover(&self) -> Option<&str> {
        self.cover_candidates.last().map(String::as_str)
    }

    pub fn play_count_label(&self) -> String {
        format!("{} plays", self.play_count)
    }
}
