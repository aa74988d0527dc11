// Pagination from GitHub `Link` response headers.
// Maps relation names (next, prev, first, last) to page numbers.

use std::collections::BTreeMap;
use std::ops::RangeInclusive;

use serde::Serialize;
use tracing::debug;
use url::Url;

/// Page numbers keyed by link relation, plus the valid page range when the
/// header carries a `last` relation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PageLinkSet {
    pub links: BTreeMap<String, u32>,
    pub pages: Option<RangeInclusive<u32>>,
}

impl PageLinkSet {
    /// Parse a `Link` header value such as
    /// `<https://api.github.com/gists?page=2>; rel="next", <...?page=5>; rel="last"`.
    ///
    /// A missing header yields an empty set. Entries without brackets, without
    /// a `rel` parameter or without a numeric `page` query parameter are skipped.
    pub fn parse(header: Option<&str>) -> Self {
        let mut set = Self::default();
        let Some(header) = header else {
            return set;
        };

        for entry in split_entries(header) {
            match parse_entry(entry) {
                Some((rels, page)) => {
                    for rel in rels {
                        set.insert(rel, page);
                    }
                }
                None => debug!(entry, "skipping unusable Link entry"),
            }
        }

        set
    }

    fn insert(&mut self, rel: &str, page: u32) {
        if rel == "last" {
            self.pages = Some(1..=page);
        }
        self.links.insert(rel.to_string(), page);
    }

    pub fn get(&self, rel: &str) -> Option<u32> {
        self.links.get(rel).copied()
    }

    pub fn next(&self) -> Option<u32> {
        self.get("next")
    }

    pub fn prev(&self) -> Option<u32> {
        self.get("prev")
    }

    pub fn first(&self) -> Option<u32> {
        self.get("first")
    }

    pub fn last(&self) -> Option<u32> {
        self.get("last")
    }

    /// Number of pages, known only when a `last` link was present.
    pub fn total_pages(&self) -> Option<u32> {
        self.pages.as_ref().map(|range| *range.end())
    }

    /// True when the listing fits on a single page.
    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}

/// Split on commas that are outside `<...>`, since URLs may contain commas.
fn split_entries(header: &str) -> Vec<&str> {
    let mut entries = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;

    for (i, c) in header.char_indices() {
        match c {
            '<' => depth += 1,
            '>' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                entries.push(header[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    entries.push(header[start..].trim());

    entries.into_iter().filter(|e| !e.is_empty()).collect()
}

fn parse_entry(entry: &str) -> Option<(Vec<&str>, u32)> {
    let (target, params) = entry.split_once(';')?;
    let target = target.trim().strip_prefix('<')?.strip_suffix('>')?;

    let rel = params.split(';').find_map(|param| {
        let (name, value) = param.trim().split_once('=')?;
        name.trim()
            .eq_ignore_ascii_case("rel")
            .then(|| value.trim().trim_matches('"'))
    })?;
    let rels: Vec<&str> = rel.split_whitespace().collect();
    if rels.is_empty() {
        return None;
    }

    Some((rels, page_param(target)?))
}

fn page_param(target: &str) -> Option<u32> {
    let url = match Url::parse(target) {
        Ok(url) => url,
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            Url::parse("http://localhost/").ok()?.join(target).ok()?
        }
        Err(_) => return None,
    };

    url.query_pairs()
        .find(|(key, _)| key == "page")
        .and_then(|(_, value)| value.parse().ok())
}
