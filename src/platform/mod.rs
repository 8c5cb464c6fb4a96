pub mod bugcrowd;
pub mod hackerone;

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;

use crate::app::{DragnetError, Result};
use crate::fetcher::{FetchRequest, RateLimitedFetcher, RetryPolicy};
use crate::scope::{ProgramData, ProgramHandle};
use crate::session::Credential;

pub use bugcrowd::Bugcrowd;
pub use hackerone::HackerOne;

/// Visibility/eligibility filters applied while discovering program handles.
/// Each platform honors the subset it supports.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiscoveryFilters {
    pub bounty_only: bool,
    pub private_only: bool,
    pub public_only: bool,
    pub active_only: bool,
}

/// Per-run scope selection, shared read-only by every worker.
#[derive(Debug, Clone)]
pub struct Selection {
    pub categories: CategoryFilter,
    pub bounty_only: bool,
}

/// A resolved category keyword: an explicit native tag set, or match-anything.
///
/// `All` is a bypass rather than an enumerated set, so new platform asset
/// types keep matching without a table update.
#[derive(Debug, Clone)]
pub enum CategoryFilter {
    All,
    Tags(HashSet<String>),
}

impl CategoryFilter {
    pub fn matches(&self, tag: &str) -> bool {
        match self {
            Self::All => true,
            Self::Tags(tags) => tags.contains(tag),
        }
    }
}

/// Fixed mapping from user-facing category keywords to a platform's native
/// asset-type tags. Built once when the adapter is constructed.
#[derive(Debug, Clone)]
pub struct CategoryTable {
    keywords: HashMap<&'static str, &'static [&'static str]>,
}

impl CategoryTable {
    pub fn new(entries: &[(&'static str, &'static [&'static str])]) -> Self {
        Self {
            keywords: entries.iter().copied().collect(),
        }
    }

    /// Resolve a keyword to a tag filter. Unknown keywords are a fatal
    /// configuration error, surfaced before any network activity.
    pub fn resolve(&self, keyword: &str) -> Result<CategoryFilter> {
        let keyword = keyword.to_lowercase();
        if keyword == "all" {
            return Ok(CategoryFilter::All);
        }

        self.keywords
            .get(keyword.as_str())
            .map(|tags| CategoryFilter::Tags(tags.iter().map(|t| (*t).to_string()).collect()))
            .ok_or(DragnetError::UnknownCategory(keyword))
    }
}

/// Pagination strategy for one platform's program listing.
///
/// Cursor state (page index, next link) stays private to the implementation;
/// the driver only sees "another page or done".
pub trait PageCursor: Send {
    /// URL of the next page to fetch, or `None` once pagination is exhausted.
    fn next_url(&self) -> Option<String>;

    /// Consume one page body, advancing the cursor. Returns the handles that
    /// passed the discovery filters; entries that fail them are skipped.
    fn ingest(&mut self, body: &str) -> Result<Vec<ProgramHandle>>;
}

/// Drive a [`PageCursor`] to exhaustion, accumulating program handles.
pub async fn discover(
    fetcher: &RateLimitedFetcher,
    credential: &Credential,
    mut cursor: Box<dyn PageCursor>,
) -> Result<Vec<ProgramHandle>> {
    let mut handles = Vec::new();

    while let Some(url) = cursor.next_url() {
        let request = FetchRequest::get(url).credential(credential);
        let response = fetcher.fetch(&request).await?;
        handles.extend(cursor.ingest(&response.body)?);
    }

    Ok(handles)
}

/// One bug-bounty platform adapter: where to list programs, how to page
/// through them, which category vocabulary applies, and how to resolve a
/// single program's scope.
#[async_trait]
pub trait Platform: Send + Sync {
    fn name(&self) -> &'static str;

    fn categories(&self) -> &CategoryTable;

    fn retry_policy(&self) -> RetryPolicy;

    fn cursor(&self, filters: DiscoveryFilters) -> Box<dyn PageCursor>;

    async fn resolve(
        &self,
        fetcher: &RateLimitedFetcher,
        credential: &Credential,
        handle: &ProgramHandle,
        selection: &Selection,
    ) -> Result<ProgramData>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> CategoryTable {
        CategoryTable::new(&[("url", &["website"]), ("mobile", &["android", "ios"])])
    }

    #[test]
    fn test_resolve_keyword_to_tags() {
        let filter = table().resolve("mobile").unwrap();
        assert!(filter.matches("android"));
        assert!(filter.matches("ios"));
        assert!(!filter.matches("website"));
    }

    #[test]
    fn test_resolve_is_case_insensitive() {
        let filter = table().resolve("URL").unwrap();
        assert!(filter.matches("website"));
    }

    #[test]
    fn test_all_bypasses_the_table() {
        let filter = table().resolve("all").unwrap();
        assert!(filter.matches("website"));
        assert!(filter.matches("some-future-asset-type"));
    }

    #[test]
    fn test_unknown_keyword_is_fatal() {
        assert!(matches!(
            table().resolve("gopher"),
            Err(DragnetError::UnknownCategory(_))
        ));
    }
}
