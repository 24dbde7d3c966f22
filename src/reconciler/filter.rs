//! Path-segment filter for rule listings

/// Matches rule paths containing the filter as whole path segments.
///
/// `alice` matches `/data/alice/` and `/data/alice/project`, but not
/// `/data/alice2/`. Multi-segment filters such as `bulk/proj1` work the
/// same way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathFilter {
    needle: String,
}

impl PathFilter {
    /// Build a filter; empty or all-slash input means "no filter"
    pub fn new(filter: &str) -> Option<Self> {
        let trimmed = filter.trim().trim_matches('/');
        if trimmed.is_empty() {
            return None;
        }
        Some(Self {
            needle: format!("/{}/", trimmed),
        })
    }

    pub fn matches(&self, path: &str) -> bool {
        if path.ends_with('/') {
            path.contains(&self.needle)
        } else {
            format!("{}/", path).contains(&self.needle)
        }
    }
}
