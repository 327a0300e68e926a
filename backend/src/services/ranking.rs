//! Repository ranking
//!
//! Orders repositories by star count for the apps page.

use crate::models::RepositoryRecord;

/// Number of repositories shown on the apps page
pub const DEFAULT_TOP_N: usize = 6;

/// Sort `records` by star count, highest first, and keep at most `top_n`.
///
/// The sort is stable: repositories with equal star counts keep their input order.
pub fn rank(mut records: Vec<RepositoryRecord>, top_n: usize) -> Vec<RepositoryRecord> {
    records.sort_by(|a, b| b.stargazers_count.cmp(&a.stargazers_count));
    records.truncate(top_n);
    records
}
