//! Query filter construction for memory records.

use crate::model::{MemoryQuery, memory_fields};
use chatmem_config::KeywordMatch;
use chatmem_store::{Condition, Filter, Sort};

/// Build the conjunctive filter for a memory query.
///
/// Returns `None` when no criterion is supplied so the query runs unfiltered.
pub fn memory_filter(query: &MemoryQuery, keyword_match: KeywordMatch) -> Option<Filter> {
    let mut filters = Vec::new();

    if let Some(keyword_filter) = keyword_filter(&query.keywords, keyword_match) {
        filters.push(keyword_filter);
    }

    if let Some(area) = &query.area {
        filters.push(Filter::property(
            memory_fields::AREA,
            Condition::RelationContains(area.as_str().to_string()),
        ));
    }

    if query.start.is_some() || query.end.is_some() {
        filters.push(Filter::property(
            memory_fields::TIMESTAMP,
            Condition::DateRange {
                after: query.start,
                before: query.end,
            },
        ));
    }

    if filters.is_empty() {
        None
    } else {
        Some(Filter::And(filters))
    }
}

/// Memory results are always requested newest first.
pub fn memory_sorts() -> Vec<Sort> {
    vec![Sort::descending(memory_fields::TIMESTAMP)]
}

fn keyword_filter(keywords: &[String], keyword_match: KeywordMatch) -> Option<Filter> {
    let contains = |keyword: &String| {
        Filter::property(
            memory_fields::KEYWORDS,
            Condition::MultiSelectContains(keyword.clone()),
        )
    };
    match (keyword_match, keywords) {
        (_, []) => None,
        (KeywordMatch::First, [first, ..]) | (KeywordMatch::Any, [first]) => Some(contains(first)),
        (KeywordMatch::Any, keywords) => Some(Filter::Or(keywords.iter().map(contains).collect())),
    }
}
