//! Best runs of the current page visit
//!
//! Kept in memory only: the board is empty whenever the game loads.

/// Entries kept on the board
pub const MAX_HIGH_SCORES: usize = 10;

#[derive(Debug, Clone, PartialEq)]
pub struct HighScoreEntry {
    /// Gaps passed
    pub score: u32,
    /// Milliseconds since the epoch when the run ended
    pub timestamp: f64,
}

/// Best finished runs, highest first
#[derive(Debug, Clone, Default)]
pub struct HighScores {
    pub entries: Vec<HighScoreEntry>,
}

impl HighScores {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a finished run; returns its 1-based rank if it made the board
    pub fn add_score(&mut self, score: u32, timestamp: f64) -> Option<usize> {
        // Zero never places; ties go below earlier runs
        let slot = self.entries.partition_point(|e| e.score >= score);
        if score == 0 || slot >= MAX_HIGH_SCORES {
            return None;
        }

        self.entries.insert(slot, HighScoreEntry { score, timestamp });
        self.entries.truncate(MAX_HIGH_SCORES);
        Some(slot + 1)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn top_score(&self) -> Option<u32> {
        self.entries.first().map(|e| e.score)
    }
}

/// Short "how long ago" text for an age in milliseconds, `None` past a week
pub fn relative_age(age_ms: f64) -> Option<String> {
    const MINUTE: f64 = 60_000.0;
    const HOUR: f64 = 60.0 * MINUTE;
    const DAY: f64 = 24.0 * HOUR;

    let plural = |n: f64, one: &str, many: &str| match n.floor() as i64 {
        1 => one.to_string(),
        n => format!("{n} {many}"),
    };

    match age_ms {
        age if age >= 7.0 * DAY => None,
        age if age >= DAY => Some(plural(age / DAY, "Yesterday", "days ago")),
        age if age >= HOUR => Some(plural(age / HOUR, "1 hour ago", "hours ago")),
        age if age >= MINUTE => Some(plural(age / MINUTE, "1 min ago", "mins ago")),
        _ => Some("Just now".to_string()),
    }
}

/// Leaderboard date column: relative for a week, then M/D/YY
#[cfg(target_arch = "wasm32")]
pub fn format_date(timestamp: f64) -> String {
    relative_age(js_sys::Date::now() - timestamp).unwrap_or_else(|| {
        let date = js_sys::Date::new(&wasm_bindgen::JsValue::from_f64(timestamp));
        format!(
            "{}/{}/{}",
            date.get_month() + 1,
            date.get_date(),
            date.get_full_year() % 100
        )
    })
}
