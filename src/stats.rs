//! Commit statistics.
//!
//! Pure reductions over fetched commits. Days are UTC calendar days.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::NaiveDate;

use crate::models::{Commit, RepositoryActivity, SummaryStats};

pub fn calculate_summary_stats(commits: &[Commit]) -> SummaryStats {
    if commits.is_empty() {
        return SummaryStats {
            total_commits: 0,
            unique_authors: 0,
            repositories: Vec::new(),
            most_active_day: String::new(),
            average_commits_per_day: 0.0,
        };
    }

    let repositories: BTreeSet<&str> = commits.iter().map(|c| c.repository.as_str()).collect();

    // BTreeMap keeps days ordered so ties resolve to the earliest day
    let mut per_day: BTreeMap<NaiveDate, usize> = BTreeMap::new();
    for commit in commits {
        *per_day.entry(commit.date.date_naive()).or_default() += 1;
    }

    let mut most_active: Option<(NaiveDate, usize)> = None;
    for (day, count) in &per_day {
        if most_active.is_none_or(|(_, best)| *count > best) {
            most_active = Some((*day, *count));
        }
    }

    let active_days = per_day.len();
    let average_commits_per_day = if active_days == 0 {
        0.0
    } else {
        commits.len() as f64 / active_days as f64
    };

    SummaryStats {
        total_commits: commits.len(),
        unique_authors: extract_unique_authors(commits).len(),
        repositories: repositories.into_iter().map(str::to_string).collect(),
        most_active_day: most_active
            .map(|(day, _)| day.format("%Y-%m-%d").to_string())
            .unwrap_or_default(),
        average_commits_per_day,
    }
}

/// Distinct authors, compared case-insensitively. Returns lowercase identities
/// in sorted order.
pub fn extract_unique_authors(commits: &[Commit]) -> Vec<String> {
    commits
        .iter()
        .map(|c| c.author.identity().to_lowercase())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Keep commits whose day falls within `[start, end]`, both inclusive.
pub fn filter_commits_by_date_range(commits: Vec<Commit>, start: NaiveDate, end: NaiveDate) -> Vec<Commit> {
    commits
        .into_iter()
        .filter(|c| {
            let day = c.date.date_naive();
            day >= start && day <= end
        })
        .collect()
}

/// Commit counts per repository, busiest first (ties by name).
pub fn group_commits_by_repository(commits: &[Commit]) -> Vec<RepositoryActivity> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for commit in commits {
        *counts.entry(commit.repository.as_str()).or_default() += 1;
    }

    let mut activity: Vec<RepositoryActivity> = counts
        .into_iter()
        .map(|(repository, commit_count)| RepositoryActivity {
            repository: repository.to_string(),
            commit_count,
        })
        .collect();
    activity.sort_by(|a, b| {
        b.commit_count
            .cmp(&a.commit_count)
            .then_with(|| a.repository.cmp(&b.repository))
    });
    activity
}

#[cfg(test)]
pub(crate) mod fixtures {
    use chrono::{NaiveDate, TimeZone, Utc};

    use crate::models::{Commit, CommitAuthor};

    pub fn commit(date: &str, author: &str, repo: &str) -> Commit {
        let day = NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap();
        let at = Utc.from_utc_datetime(&day.and_hms_opt(12, 0, 0).unwrap());
        Commit {
            sha: format!("{date}-{author}-{repo}"),
            message: "change".to_string(),
            author: CommitAuthor {
                login: Some(author.to_string()),
                name: author.to_string(),
                email: None,
            },
            date: at,
            repository: repo.to_string(),
            url: String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::commit;
    use super::*;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_empty_input_yields_zero_stats() {
        let stats = calculate_summary_stats(&[]);
        assert_eq!(
            stats,
            SummaryStats {
                total_commits: 0,
                unique_authors: 0,
                repositories: vec![],
                most_active_day: String::new(),
                average_commits_per_day: 0.0,
            }
        );
    }

    #[test]
    fn test_summary_for_three_commits() {
        let commits = vec![
            commit("2024-01-15", "alice", "org/r1"),
            commit("2024-01-15", "bob", "org/r1"),
            commit("2024-01-16", "alice", "org/r2"),
        ];

        let stats = calculate_summary_stats(&commits);
        assert_eq!(stats.total_commits, 3);
        assert_eq!(stats.unique_authors, 2);
        assert_eq!(stats.repositories, vec!["org/r1", "org/r2"]);
        assert_eq!(stats.most_active_day, "2024-01-15");
        assert!((stats.average_commits_per_day - 1.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_most_active_day_tie_picks_earliest() {
        let commits = vec![
            commit("2024-01-20", "alice", "org/r1"),
            commit("2024-01-10", "alice", "org/r1"),
        ];
        assert_eq!(calculate_summary_stats(&commits).most_active_day, "2024-01-10");
    }

    #[test]
    fn test_unique_authors_case_insensitive() {
        let commits = vec![
            commit("2024-01-15", "Alice", "org/r1"),
            commit("2024-01-16", "alice", "org/r1"),
        ];
        assert_eq!(extract_unique_authors(&commits), vec!["alice"]);
        assert_eq!(calculate_summary_stats(&commits).unique_authors, 1);
    }

    #[test]
    fn test_unique_authors_fall_back_to_name() {
        let mut unlinked = commit("2024-01-15", "ignored", "org/r1");
        unlinked.author.login = None;
        unlinked.author.name = "Carol Smith".to_string();

        let commits = vec![unlinked, commit("2024-01-15", "alice", "org/r1")];
        assert_eq!(extract_unique_authors(&commits), vec!["alice", "carol smith"]);
    }

    #[test]
    fn test_date_range_filter_is_inclusive() {
        let commits = vec![
            commit("2024-01-09", "a", "org/r1"),
            commit("2024-01-10", "b", "org/r1"),
            commit("2024-01-15", "c", "org/r1"),
            commit("2024-01-20", "d", "org/r1"),
            commit("2024-01-21", "e", "org/r1"),
        ];

        let kept = filter_commits_by_date_range(commits, day("2024-01-10"), day("2024-01-20"));
        let authors: Vec<_> = kept.iter().map(|c| c.author.name.as_str()).collect();
        assert_eq!(authors, vec!["b", "c", "d"]);
    }

    #[test]
    fn test_group_by_repository_orders_by_count() {
        let commits = vec![
            commit("2024-01-15", "a", "org/r2"),
            commit("2024-01-15", "a", "org/r1"),
            commit("2024-01-16", "a", "org/r2"),
        ];

        let activity = group_commits_by_repository(&commits);
        assert_eq!(
            activity,
            vec![
                RepositoryActivity {
                    repository: "org/r2".to_string(),
                    commit_count: 2
                },
                RepositoryActivity {
                    repository: "org/r1".to_string(),
                    commit_count: 1
                },
            ]
        );
    }
}
