use std::collections::HashSet;

use async_trait::async_trait;
use serde::Deserialize;

use crate::app::{DragnetError, Result};
use crate::fetcher::{FetchRequest, RateLimitedFetcher, RetryPolicy};
use crate::platform::{CategoryTable, DiscoveryFilters, PageCursor, Platform, Selection};
use crate::scope::{extract, ProgramData, ProgramHandle, ScopeElement};
use crate::session::Credential;

const BASE_URL: &str = "https://bugcrowd.com";

/// Cookie carrying the Bugcrowd session.
pub const SESSION_COOKIE: &str = "_crowdcontrol_session_key";

const CATEGORIES: &[(&str, &[&str])] = &[
    ("url", &["website"]),
    ("api", &["api"]),
    ("mobile", &["android", "ios"]),
    ("android", &["android"]),
    ("apple", &["ios"]),
    ("other", &["other"]),
    ("hardware", &["hardware"]),
    ("allinfra", &["website", "api", "other"]),
];

pub struct Bugcrowd {
    categories: CategoryTable,
}

impl Bugcrowd {
    pub fn new() -> Self {
        Self {
            categories: CategoryTable::new(CATEGORIES),
        }
    }
}

impl Default for Bugcrowd {
    fn default() -> Self {
        Self::new()
    }
}

// Listing pages: /programs.json with offset pagination.

#[derive(Debug, Deserialize)]
struct ProgramListing {
    #[serde(default)]
    programs: Vec<ListedProgram>,
    #[serde(default)]
    meta: ListingMeta,
}

#[derive(Debug, Deserialize)]
struct ListedProgram {
    program_url: String,
}

#[derive(Debug, Default, Deserialize)]
struct ListingMeta {
    #[serde(rename = "totalPages", default)]
    total_pages: u32,
}

/// Offset-paginated cursor: an incrementing page index checked against the
/// total-page count read from the first response. Visibility/bounty filters
/// are listing query parameters, not per-entry checks.
struct OffsetCursor {
    listing_prefix: String,
    page: u32,
    total_pages: Option<u32>,
}

impl OffsetCursor {
    fn new(filters: DiscoveryFilters) -> Self {
        let mut prefix = format!("{}/programs.json?", BASE_URL);
        if filters.private_only {
            prefix.push_str("accepted_invite[]=true&");
        }
        if filters.bounty_only {
            prefix.push_str("vdp[]=false&");
        }
        prefix.push_str("hidden[]=false&sort[]=invited-desc&sort[]=promoted-desc&page[]=");

        Self {
            listing_prefix: prefix,
            page: 1,
            total_pages: None,
        }
    }
}

impl PageCursor for OffsetCursor {
    fn next_url(&self) -> Option<String> {
        match self.total_pages {
            // Total is unknown until the first page has been read.
            None => Some(format!("{}{}", self.listing_prefix, self.page)),
            Some(total) if self.page <= total => {
                Some(format!("{}{}", self.listing_prefix, self.page))
            }
            Some(_) => None,
        }
    }

    fn ingest(&mut self, body: &str) -> Result<Vec<ProgramHandle>> {
        let url = format!("{}{}", self.listing_prefix, self.page);
        let listing: ProgramListing =
            serde_json::from_str(body).map_err(|source| DragnetError::Parse { url, source })?;

        if self.total_pages.is_none() {
            self.total_pages = Some(listing.meta.total_pages);
        }
        self.page += 1;

        Ok(listing
            .programs
            .into_iter()
            .map(|p| ProgramHandle::new(p.program_url))
            .collect())
    }
}

// Scope payloads: /target_groups, then one target list per in-scope group.

#[derive(Debug, Deserialize)]
struct TargetGroups {
    #[serde(default)]
    groups: Vec<TargetGroup>,
}

#[derive(Debug, Deserialize)]
struct TargetGroup {
    #[serde(default)]
    in_scope: bool,
    #[serde(default)]
    targets_url: String,
}

#[derive(Debug, Deserialize)]
struct TargetList {
    #[serde(default)]
    targets: Vec<Target>,
}

#[derive(Debug, Deserialize)]
struct Target {
    #[serde(default)]
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    category: String,
    #[serde(default)]
    uri: String,
}

#[async_trait]
impl Platform for Bugcrowd {
    fn name(&self) -> &'static str {
        "bugcrowd"
    }

    fn categories(&self) -> &CategoryTable {
        &self.categories
    }

    fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::Unbounded
    }

    fn cursor(&self, filters: DiscoveryFilters) -> Box<dyn PageCursor> {
        Box::new(OffsetCursor::new(filters))
    }

    async fn resolve(
        &self,
        fetcher: &RateLimitedFetcher,
        credential: &Credential,
        handle: &ProgramHandle,
        selection: &Selection,
    ) -> Result<ProgramData> {
        let program_url = format!("{}{}", BASE_URL, handle);
        let mut data = ProgramData::new(program_url.clone());

        let groups_url = format!("{}/target_groups", program_url);
        let response = fetcher
            .fetch(
                &FetchRequest::get(groups_url.as_str())
                    .credential(credential)
                    .header("accept", "*/*"),
            )
            .await?;
        let groups: TargetGroups = serde_json::from_str(&response.body)
            .map_err(|source| DragnetError::Parse {
                url: groups_url,
                source,
            })?;

        // Dedup is per program: one set spans every group and text field.
        let mut seen = HashSet::new();

        for group in groups.groups.into_iter().filter(|g| g.in_scope) {
            let targets_url = format!("{}{}", BASE_URL, group.targets_url);
            let response = fetcher
                .fetch(
                    &FetchRequest::get(targets_url.as_str())
                        .credential(credential)
                        .header("accept", "*/*"),
                )
                .await?;
            let targets: TargetList = serde_json::from_str(&response.body)
                .map_err(|source| DragnetError::Parse {
                    url: targets_url,
                    source,
                })?;

            for target in targets.targets {
                if !selection.categories.matches(&target.category) {
                    continue;
                }

                for field in [&target.name, &target.description, &target.uri] {
                    for token in extract(field) {
                        if seen.insert(token.clone()) {
                            data.in_scope.push(ScopeElement {
                                target: token,
                                description: target.description.clone(),
                                category: target.category.clone(),
                            });
                        }
                    }
                }
            }
        }

        Ok(data)
    }
}
