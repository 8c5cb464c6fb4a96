use std::collections::HashSet;

use async_trait::async_trait;
use serde::Deserialize;
use url::Url;

use crate::app::{DragnetError, Result};
use crate::fetcher::{FetchRequest, RateLimitedFetcher, RetryPolicy};
use crate::platform::{CategoryTable, DiscoveryFilters, PageCursor, Platform, Selection};
use crate::scope::{extract, ProgramData, ProgramHandle, ScopeElement};
use crate::session::Credential;

const API_BASE: &str = "https://api.hackerone.com/v1/hackers/programs";
const PROGRAM_BASE: &str = "https://hackerone.com";

/// Asset types whose identifier/instruction text goes through the hostname
/// extractor; everything else passes its raw identifier through.
const TEXT_MATCHABLE: &[&str] = &["DOMAIN", "URL", "OTHER", "WILDCARD"];

const CATEGORIES: &[(&str, &[&str])] = &[
    ("domain", &["DOMAIN"]),
    ("wildcard", &["WILDCARD"]),
    ("url", &["URL"]),
    ("cidr", &["CIDR"]),
    ("mobile", &["GOOGLE_PLAY_APP_ID", "OTHER_APK", "APPLE_STORE_APP_ID"]),
    ("android", &["GOOGLE_PLAY_APP_ID", "OTHER_APK"]),
    ("apple", &["APPLE_STORE_APP_ID"]),
    ("other", &["OTHER"]),
    ("hardware", &["HARDWARE"]),
    ("code", &["SOURCE_CODE"]),
    ("executable", &["DOWNLOADABLE_EXECUTABLES"]),
    ("allinfra", &["DOMAIN", "WILDCARD", "URL", "CIDR", "OTHER"]),
];

pub struct HackerOne {
    categories: CategoryTable,
    max_attempts: u32,
}

impl HackerOne {
    pub fn new(max_attempts: u32) -> Self {
        Self {
            categories: CategoryTable::new(CATEGORIES),
            max_attempts,
        }
    }
}

// Listing pages: cursor-link pagination over /v1/hackers/programs.

#[derive(Debug, Deserialize)]
struct ProgramPage {
    #[serde(default)]
    data: Vec<ListedProgram>,
    #[serde(default)]
    links: PageLinks,
}

#[derive(Debug, Default, Deserialize)]
struct PageLinks {
    #[serde(default)]
    next: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ListedProgram {
    attributes: ListedAttributes,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ListedAttributes {
    handle: String,
    state: String,
    submission_state: String,
}

/// Cursor-link pagination: each page carries an opaque `links.next` URL; an
/// absent or empty link terminates the walk. Filters are evaluated per entry
/// against the listing attributes.
struct LinkCursor {
    next: Option<String>,
    filters: DiscoveryFilters,
}

impl LinkCursor {
    fn new(filters: DiscoveryFilters) -> Self {
        Self {
            next: Some(API_BASE.to_string()),
            filters,
        }
    }

    fn keep(&self, attributes: &ListedAttributes) -> bool {
        if self.filters.public_only {
            if attributes.state != "public_mode" {
                return false;
            }
        } else if self.filters.private_only && attributes.state != "soft_launched" {
            return false;
        }

        if self.filters.active_only && attributes.submission_state != "open" {
            return false;
        }

        true
    }
}

impl PageCursor for LinkCursor {
    fn next_url(&self) -> Option<String> {
        self.next.clone()
    }

    fn ingest(&mut self, body: &str) -> Result<Vec<ProgramHandle>> {
        let url = self.next.take().unwrap_or_else(|| API_BASE.to_string());
        let page: ProgramPage =
            serde_json::from_str(body).map_err(|source| DragnetError::Parse { url, source })?;

        self.next = match page.links.next {
            Some(link) if !link.is_empty() => {
                // The next link is opaque but must at least be a URL.
                Url::parse(&link)?;
                Some(link)
            }
            _ => None,
        };

        Ok(page
            .data
            .into_iter()
            .filter(|p| self.keep(&p.attributes))
            .map(|p| ProgramHandle::new(p.attributes.handle))
            .collect())
    }
}

// Program payload: structured scopes under relationships.

#[derive(Debug, Deserialize)]
struct ProgramDetail {
    #[serde(default)]
    relationships: Relationships,
}

#[derive(Debug, Default, Deserialize)]
struct Relationships {
    #[serde(default)]
    structured_scopes: StructuredScopes,
}

#[derive(Debug, Default, Deserialize)]
struct StructuredScopes {
    #[serde(default)]
    data: Vec<StructuredScope>,
}

#[derive(Debug, Deserialize)]
struct StructuredScope {
    attributes: ScopeAttributes,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ScopeAttributes {
    asset_type: String,
    asset_identifier: String,
    eligible_for_bounty: bool,
    eligible_for_submission: bool,
    instruction: String,
}

#[async_trait]
impl Platform for HackerOne {
    fn name(&self) -> &'static str {
        "hackerone"
    }

    fn categories(&self) -> &CategoryTable {
        &self.categories
    }

    fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::Limited(self.max_attempts)
    }

    fn cursor(&self, filters: DiscoveryFilters) -> Box<dyn PageCursor> {
        Box::new(LinkCursor::new(filters))
    }

    async fn resolve(
        &self,
        fetcher: &RateLimitedFetcher,
        credential: &Credential,
        handle: &ProgramHandle,
        selection: &Selection,
    ) -> Result<ProgramData> {
        let url = format!("{}/{}", API_BASE, handle);
        let response = fetcher
            .fetch(&FetchRequest::get(url.as_str()).credential(credential))
            .await?;
        let program: ProgramDetail = serde_json::from_str(&response.body)
            .map_err(|source| DragnetError::Parse { url, source })?;

        let mut data = ProgramData::new(format!("{}/{}", PROGRAM_BASE, handle));
        let mut seen = HashSet::new();

        for scope in program.relationships.structured_scopes.data {
            let attributes = scope.attributes;

            if !selection.categories.matches(&attributes.asset_type) {
                continue;
            }
            // Out-of-scope entries are listed too; only submittable ones count.
            if !attributes.eligible_for_submission {
                continue;
            }
            if selection.bounty_only && !attributes.eligible_for_bounty {
                continue;
            }

            let description = attributes.instruction.replace('\n', "  ");

            if TEXT_MATCHABLE.contains(&attributes.asset_type.as_str()) {
                for field in [&attributes.asset_identifier, &attributes.instruction] {
                    for token in extract(field) {
                        if seen.insert(token.clone()) {
                            data.in_scope.push(ScopeElement {
                                target: token,
                                description: description.clone(),
                                category: attributes.asset_type.clone(),
                            });
                        }
                    }
                }
            } else {
                let target = attributes.asset_identifier.trim();
                if !target.is_empty() && seen.insert(target.to_lowercase()) {
                    data.in_scope.push(ScopeElement {
                        target: target.to_string(),
                        description: description.clone(),
                        category: attributes.asset_type.clone(),
                    });
                }
            }
        }

        Ok(data)
    }
}
