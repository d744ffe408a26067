use chrono::Utc;
use std::collections::VecDeque;
use std::sync::{PoisonError, RwLock};
use uuid::Uuid;

use crate::error::RewriteError;
use crate::models::{HistoryEntry, HistoryStats, NewHistoryEntry};

pub const HISTORY_CAPACITY: usize = 100;
pub const DEFAULT_RECENT_LIMIT: usize = 10;

/// Most-recent-first list of past rewrites, capped at [`HISTORY_CAPACITY`].
pub struct HistoryStore {
    entries: RwLock<VecDeque<HistoryEntry>>,
    capacity: usize,
}

impl Default for HistoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl HistoryStore {
    pub fn new() -> Self {
        Self::with_capacity(HISTORY_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: RwLock::new(VecDeque::with_capacity(capacity)),
            capacity,
        }
    }

    /// A store whose lock is poisoned, so every `append` fails.
    #[cfg(any(test, feature = "test-support"))]
    pub fn poisoned() -> Self {
        let store = Self::new();
        std::thread::scope(|scope| {
            let _ = scope
                .spawn(|| {
                    let _guard = store.entries.write();
                    panic!("poisoning history store");
                })
                .join();
        });
        store
    }

    /// Inserts at the front and evicts from the tail once over capacity.
    pub fn append(&self, entry: NewHistoryEntry) -> Result<HistoryEntry, RewriteError> {
        let entry = HistoryEntry {
            id: Uuid::new_v4(),
            original_content: entry.original_content,
            rewritten_content: entry.rewritten_content,
            target_keyword: entry.target_keyword,
            keyword_link: entry.keyword_link,
            company_name: entry.company_name,
            author_name: entry.author_name,
            author_description: entry.author_description,
            word_count: entry.word_count,
            keyword_density: entry.keyword_density,
            seo_score: entry.seo_score,
            created_at: Utc::now(),
        };

        let mut entries = self
            .entries
            .write()
            .map_err(|_| RewriteError::Internal("history store lock poisoned".to_string()))?;
        entries.push_front(entry.clone());
        entries.truncate(self.capacity);

        log::debug!("History entry {} saved ({} total)", entry.id, entries.len());
        Ok(entry)
    }

    pub fn recent(&self, limit: usize) -> Vec<HistoryEntry> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries.iter().take(limit).cloned().collect()
    }

    pub fn get(&self, id: Uuid) -> Option<HistoryEntry> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries.iter().find(|entry| entry.id == id).cloned()
    }

    pub fn clear(&self) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.clear();
        log::info!("History cleared");
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> HistoryStats {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        let total_rewrites = entries.len();
        if total_rewrites == 0 {
            return HistoryStats {
                total_rewrites: 0,
                avg_seo_score: 0,
                total_word_count: 0,
            };
        }

        let score_sum: u64 = entries.iter().map(|e| u64::from(e.seo_score)).sum();
        let total_word_count = entries.iter().map(|e| e.word_count).sum();

        HistoryStats {
            total_rewrites,
            avg_seo_score: (score_sum as f64 / total_rewrites as f64).round() as u32,
            total_word_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(keyword: &str, seo_score: u32, word_count: usize) -> NewHistoryEntry {
        NewHistoryEntry {
            original_content: "original".to_string(),
            rewritten_content: "reescrito".to_string(),
            target_keyword: keyword.to_string(),
            keyword_link: None,
            company_name: String::new(),
            author_name: String::new(),
            author_description: String::new(),
            word_count,
            keyword_density: "1.0%".to_string(),
            seo_score,
        }
    }

    #[test]
    fn keeps_the_hundred_most_recent() {
        let store = HistoryStore::new();
        for i in 0..101 {
            store.append(entry(&format!("kw{}", i), 50, 100)).unwrap();
        }

        assert_eq!(store.len(), HISTORY_CAPACITY);
        let all = store.recent(usize::MAX);
        assert_eq!(all.len(), 100);
        assert_eq!(all[0].target_keyword, "kw100");
        assert_eq!(all[99].target_keyword, "kw1");
        assert!(all.iter().all(|e| e.target_keyword != "kw0"));
    }

    #[test]
    fn recent_is_newest_first_and_limited() {
        let store = HistoryStore::new();
        for keyword in ["a", "b", "c"] {
            store.append(entry(keyword, 10, 1)).unwrap();
        }
        let recent = store.recent(2);
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].target_keyword, "c");
        assert_eq!(recent[1].target_keyword, "b");
    }

    #[test]
    fn get_by_id() {
        let store = HistoryStore::new();
        let saved = store.append(entry("seo", 40, 300)).unwrap();
        assert_eq!(store.get(saved.id).unwrap().target_keyword, "seo");
        assert!(store.get(Uuid::new_v4()).is_none());
    }

    #[test]
    fn empty_stats_do_not_divide_by_zero() {
        let stats = HistoryStore::new().stats();
        assert_eq!(stats.total_rewrites, 0);
        assert_eq!(stats.avg_seo_score, 0);
        assert_eq!(stats.total_word_count, 0);
    }

    #[test]
    fn stats_round_the_average() {
        let store = HistoryStore::new();
        store.append(entry("a", 30, 100)).unwrap();
        store.append(entry("b", 31, 250)).unwrap();
        let stats = store.stats();
        assert_eq!(stats.total_rewrites, 2);
        assert_eq!(stats.avg_seo_score, 31);
        assert_eq!(stats.total_word_count, 350);
    }

    #[test]
    fn append_fails_on_poisoned_lock() {
        let store = HistoryStore::poisoned();
        assert!(matches!(
            store.append(entry("a", 30, 100)),
            Err(RewriteError::Internal(_))
        ));
        assert!(store.is_empty());
        assert_eq!(store.stats().total_rewrites, 0);
    }

    #[test]
    fn clear_empties_the_store() {
        let store = HistoryStore::new();
        store.append(entry("a", 30, 100)).unwrap();
        store.clear();
        assert!(store.is_empty());
    }
}
