use std::collections::{HashMap, HashSet};

use crate::classify::{self, Category};
use crate::graph::window_len;
use crate::CommitRecord;

/// Bucket for paths without an extension.
pub const NO_EXTENSION: &str = "unknown";

/// Change records and change volume for one file extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionShare {
    pub extension: String,
    pub category: Category,
    /// File-change records, not distinct files.
    pub count: usize,
    pub changes: u64,
}

impl ExtensionShare {
    /// Share of `total` changes, in percent.
    pub fn percent_of(&self, total: u64) -> f64 {
        if total == 0 {
            0.0
        } else {
            self.changes as f64 * 100.0 / total as f64
        }
    }
}

/// Summary numbers for the commits selected by the timeline window.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoryStats {
    pub files_changed: usize,
    pub total_changes: u64,
    pub commits: usize,
    pub active_days: usize,
    pub newest: Option<String>,
    pub oldest: Option<String>,
    /// Largest change volume first; ties by extension.
    pub by_extension: Vec<ExtensionShare>,
}

impl HistoryStats {
    pub fn for_window(commits: &[CommitRecord], fraction: f64) -> Self {
        let window = &commits[..window_len(commits.len(), fraction)];
        let mut files = HashSet::new();
        let mut days = HashSet::new();
        let mut total_changes = 0u64;
        let mut shares: HashMap<String, ExtensionShare> = HashMap::new();

        for commit in window {
            for f in &commit.files {
                files.insert(f.filename.as_str());
                total_changes = total_changes.saturating_add(f.changes);

                let ext = classify::extension(&f.filename)
                    .map(str::to_ascii_lowercase)
                    .unwrap_or_else(|| NO_EXTENSION.to_string());
                let share = shares.entry(ext).or_insert_with_key(|ext| ExtensionShare {
                    extension: ext.clone(),
                    category: Category::of_path(&f.filename),
                    count: 0,
                    changes: 0,
                });
                share.count += 1;
                share.changes = share.changes.saturating_add(f.changes);
            }
            if let Some(date) = commit.date.as_deref() {
                let day = date.split('T').next().unwrap_or(date);
                if !day.is_empty() {
                    days.insert(day);
                }
            }
        }

        let mut by_extension: Vec<ExtensionShare> = shares.into_values().collect();
        by_extension.sort_by(|a, b| {
            b.changes
                .cmp(&a.changes)
                .then_with(|| a.extension.cmp(&b.extension))
        });

        Self {
            files_changed: files.len(),
            total_changes,
            commits: window.len(),
            active_days: days.len(),
            newest: window.iter().find_map(|c| c.date.clone()),
            oldest: window.iter().rev().find_map(|c| c.date.clone()),
            by_extension,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FileChange;

    fn dated(date: &str, files: &[(&str, u64)]) -> CommitRecord {
        CommitRecord {
            date: Some(date.to_string()),
            files: files.iter().map(|(f, c)| FileChange::new(*f, *c)).collect(),
            ..CommitRecord::default()
        }
    }

    #[test]
    fn counts_files_changes_and_days_in_window() {
        let history = vec![
            dated("2024-03-02T12:00:00Z", &[("a.ts", 5), ("b.css", 3)]),
            dated("2024-03-02T08:00:00Z", &[("a.ts", 2)]),
            dated("2024-03-01T09:00:00Z", &[("c.md", 1)]),
            dated("2024-02-20T09:00:00Z", &[("d.json", 100)]),
        ];
        let stats = HistoryStats::for_window(&history, 0.75);

        assert_eq!(stats.commits, 3);
        assert_eq!(stats.files_changed, 3);
        assert_eq!(stats.total_changes, 11);
        assert_eq!(stats.active_days, 2);
        assert_eq!(stats.newest.as_deref(), Some("2024-03-02T12:00:00Z"));
        assert_eq!(stats.oldest.as_deref(), Some("2024-03-01T09:00:00Z"));
    }

    #[test]
    fn distribution_groups_changes_by_extension() {
        let history = vec![
            dated("2024-03-02T12:00:00Z", &[("src/a.ts", 5), ("src/App.TS", 7), ("b.css", 3)]),
            dated("2024-03-02T08:00:00Z", &[("src/a.ts", 2), ("Makefile", 4)]),
            dated("2024-03-01T09:00:00Z", &[("c.md", 1)]),
            dated("2024-02-20T09:00:00Z", &[("d.json", 100)]),
        ];
        let stats = HistoryStats::for_window(&history, 0.75);
        let rows: Vec<(&str, usize, u64)> = stats
            .by_extension
            .iter()
            .map(|s| (s.extension.as_str(), s.count, s.changes))
            .collect();

        assert_eq!(
            rows,
            vec![("ts", 3, 14), ("unknown", 1, 4), ("css", 1, 3), ("md", 1, 1)]
        );
        assert_eq!(stats.by_extension[0].category, Category::TypeScript);
        assert_eq!(stats.by_extension[1].category, Category::Other);
        let total = stats.by_extension.iter().map(|s| s.changes).sum::<u64>();
        assert_eq!(total, stats.total_changes);
        assert_eq!(stats.by_extension[0].percent_of(total), 14.0 * 100.0 / 22.0);
    }

    #[test]
    fn active_days_follow_the_written_date() {
        let history = vec![
            dated("2024-03-02T01:00:00Z", &[("a.ts", 1)]),
            dated("2024-03-01T23:30:00-05:00", &[("a.ts", 1)]),
            dated("2024-03-01T06:00:00Z", &[("a.ts", 1)]),
        ];
        assert_eq!(HistoryStats::for_window(&history, 1.0).active_days, 2);
    }

    #[test]
    fn empty_window_is_all_zero() {
        let history = vec![dated("2024-03-02T12:00:00Z", &[("a.ts", 5)])];
        assert_eq!(HistoryStats::for_window(&history, 0.0), HistoryStats::default());
    }
}
