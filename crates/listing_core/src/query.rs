//! Per-screen query state and the canonical request descriptor derived from it.

use std::{
    collections::{BTreeMap, HashMap},
    fmt,
    num::NonZeroU32,
};

use shared::protocol::{FilterDimension, PAGE_PARAM, SEARCH_PARAM, SIZE_PARAM, SORT_PARAM};

/// User-visible listing query. Every setter other than [`QueryState::set_page_index`]
/// re-anchors the listing at page 0 when it actually changes something.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryState {
    page_index: u32,
    page_size: NonZeroU32,
    sort_key: Option<String>,
    search_term: Option<String>,
    filters: HashMap<String, String>,
}

impl QueryState {
    pub fn new(page_size: NonZeroU32) -> Self {
        Self {
            page_index: 0,
            page_size,
            sort_key: None,
            search_term: None,
            filters: HashMap::new(),
        }
    }

    pub fn page_index(&self) -> u32 {
        self.page_index
    }

    pub fn page_size(&self) -> NonZeroU32 {
        self.page_size
    }

    pub fn sort_key(&self) -> Option<&str> {
        self.sort_key.as_deref()
    }

    pub fn search_term(&self) -> Option<&str> {
        self.search_term.as_deref()
    }

    pub fn filter(&self, name: &str) -> Option<&str> {
        self.filters.get(name).map(String::as_str)
    }

    /// Returns whether the page index changed.
    pub fn set_page_index(&mut self, page_index: u32) -> bool {
        if self.page_index == page_index {
            return false;
        }
        self.page_index = page_index;
        true
    }

    pub fn set_page_size(&mut self, page_size: NonZeroU32) -> bool {
        if self.page_size == page_size {
            return false;
        }
        self.page_size = page_size;
        self.reanchor();
        true
    }

    pub fn set_sort(&mut self, sort_key: Option<String>) -> bool {
        if self.sort_key == sort_key {
            return false;
        }
        self.sort_key = sort_key;
        self.reanchor();
        true
    }

    pub fn set_search(&mut self, search_term: Option<String>) -> bool {
        if self.search_term == search_term {
            return false;
        }
        self.search_term = search_term;
        self.reanchor();
        true
    }

    /// `None` removes the dimension entirely.
    pub fn set_filter(&mut self, name: impl Into<String>, value: Option<String>) -> bool {
        let name = name.into();
        let changed = match value {
            Some(value) => {
                if self.filters.get(&name) == Some(&value) {
                    false
                } else {
                    self.filters.insert(name, value);
                    true
                }
            }
            None => self.filters.remove(&name).is_some(),
        };
        if changed {
            self.reanchor();
        }
        changed
    }

    pub fn apply_filter(&mut self, filter: &impl FilterDimension) -> bool {
        self.set_filter(filter.key(), Some(filter.value()))
    }

    pub fn clear_filter(&mut self, name: &str) -> bool {
        self.set_filter(name, None)
    }

    pub fn descriptor(&self) -> RequestDescriptor {
        derive(self)
    }

    fn reanchor(&mut self) {
        self.page_index = 0;
    }
}

/// Canonical, comparable form of "what to fetch". Equal descriptors mean an
/// identical server query.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestDescriptor {
    page: u32,
    size: u32,
    sort: Option<String>,
    search: Option<String>,
    filters: BTreeMap<String, String>,
}

impl RequestDescriptor {
    /// Zero-based server page.
    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn sort(&self) -> Option<&str> {
        self.sort.as_deref()
    }

    pub fn search(&self) -> Option<&str> {
        self.search.as_deref()
    }

    pub fn filters(&self) -> &BTreeMap<String, String> {
        &self.filters
    }

    pub fn query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = vec![
            (PAGE_PARAM.to_string(), self.page.to_string()),
            (SIZE_PARAM.to_string(), self.size.to_string()),
        ];
        if let Some(sort) = &self.sort {
            pairs.push((SORT_PARAM.to_string(), sort.clone()));
        }
        if let Some(search) = &self.search {
            pairs.push((SEARCH_PARAM.to_string(), search.clone()));
        }
        pairs.extend(
            self.filters
                .iter()
                .map(|(key, value)| (key.clone(), value.clone())),
        );
        pairs
    }
}

impl fmt::Display for RequestDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered = self
            .query_pairs()
            .into_iter()
            .map(|(key, value)| format!("{key}={value}"))
            .collect::<Vec<_>>()
            .join("&");
        f.write_str(&rendered)
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

/// Empty search terms, sort keys, and filter values are omitted rather than
/// sent as `key=`.
pub fn derive(state: &QueryState) -> RequestDescriptor {
    let filters = state
        .filters
        .iter()
        .filter_map(|(key, value)| {
            non_empty(Some(value.as_str())).map(|value| (key.clone(), value))
        })
        .collect();

    RequestDescriptor {
        page: state.page_index,
        size: state.page_size.get(),
        sort: non_empty(state.sort_key.as_deref()),
        search: non_empty(state.search_term.as_deref()),
        filters,
    }
}

#[cfg(test)]
#[path = "tests/query_tests.rs"]
mod tests;
