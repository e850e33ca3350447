//! Per-song, per-page cache of recommendation results.
//!
//! Owned by the page shell. Pages are stored as `Arc<[Recommendation]>` so a
//! hit hands back the exact slice the first fetch produced. Bounded by song
//! count; touching any page of a song makes it most recently used.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use reco_proto::model::Recommendation;

pub type Page = Arc<[Recommendation]>;

#[derive(Default)]
struct SongEntry {
    pages: HashMap<u32, Page>,
    /// Page count the service reported for this song, if it ever did.
    total_pages: Option<u32>,
}

pub struct RecommendationCache {
    songs: HashMap<String, SongEntry>,
    /// Front = least recently used.
    order: VecDeque<String>,
    max_songs: usize,
}

impl RecommendationCache {
    pub fn new(max_songs: usize) -> Self {
        Self {
            songs: HashMap::new(),
            order: VecDeque::new(),
            max_songs: max_songs.max(1),
        }
    }

    pub fn get(&mut self, song: &str, page: u32) -> Option<Page> {
        let hit = self.songs.get(song)?.pages.get(&page).cloned()?;
        self.touch(song);
        Some(hit)
    }

    #[cfg(test)]
    pub fn contains(&self, song: &str, page: u32) -> bool {
        self.songs
            .get(song)
            .map_or(false, |entry| entry.pages.contains_key(&page))
    }

    /// Store a page, evicting the least recently used song if over the cap.
    /// Returns the evicted song, if any.
    pub fn insert(&mut self, song: &str, page: u32, items: Page) -> Option<String> {
        self.songs
            .entry(song.to_string())
            .or_default()
            .pages
            .insert(page, items);
        self.touch(song);

        if self.order.len() > self.max_songs {
            let evicted = self.order.pop_front()?;
            self.songs.remove(&evicted);
            return Some(evicted);
        }
        None
    }

    /// Remember the page count reported for a cached song.
    pub fn set_total_pages(&mut self, song: &str, total: u32) {
        if let Some(entry) = self.songs.get_mut(song) {
            entry.total_pages = Some(total);
        }
    }

    pub fn total_pages(&self, song: &str) -> Option<u32> {
        self.songs.get(song)?.total_pages
    }

    pub fn song_count(&self) -> usize {
        self.songs.len()
    }

    #[cfg(test)]
    pub fn page_count(&self, song: &str) -> usize {
        self.songs.get(song).map_or(0, |entry| entry.pages.len())
    }

    fn touch(&mut self, song: &str) {
        if let Some(pos) = self.order.iter().position(|s| s == song) {
            if let Some(s) = self.order.remove(pos) {
                self.order.push_back(s);
            }
        } else {
            self.order.push_back(song.to_string());
        }
    }
}
