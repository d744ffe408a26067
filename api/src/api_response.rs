use serde::{Deserialize, Serialize};

use seo_rewriter::HistoryStats;

/// Minutes of manual work one rewrite replaces.
const MINUTES_SAVED_PER_REWRITE: f64 = 30.0;

#[derive(Debug, Deserialize, Serialize)]
pub struct ActionResponse {
    pub success: bool,
    pub message: String,
}

impl ActionResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    pub total_rewrites: usize,
    pub avg_seo_score: u32,
    pub total_word_count: usize,
    pub times_saved: String,
}

impl From<HistoryStats> for StatsResponse {
    fn from(stats: HistoryStats) -> Self {
        let hours = (stats.total_rewrites as f64 * MINUTES_SAVED_PER_REWRITE / 60.0).round();
        Self {
            total_rewrites: stats.total_rewrites,
            avg_seo_score: stats.avg_seo_score,
            total_word_count: stats.total_word_count,
            times_saved: format!("{}h", hours as u64),
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}
