//! Column Pruner and Row Filter.
//!
//! Both stages are pure: they take a table or record sequence and return a
//! new one, leaving the input untouched.

use crate::models::SectionRecord;
use crate::parser::RosterTable;
use crate::rules::{title_matches_keywords, PRUNE_COLUMNS};

/// Drop the configured prune columns from a table.
///
/// The prune list is a tolerant superset of what any given export actually
/// contains; entries that are absent are ignored.
pub fn prune_columns(table: RosterTable) -> RosterTable {
    let RosterTable {
        headers,
        records,
        source,
    } = table;

    let headers: Vec<String> = headers
        .into_iter()
        .filter(|h| !PRUNE_COLUMNS.contains(&h.as_str()))
        .collect();

    let records = records
        .into_iter()
        .map(|mut record| {
            for column in PRUNE_COLUMNS {
                record.remove(*column);
            }
            record
        })
        .collect();

    RosterTable {
        headers,
        records,
        source,
    }
}

/// Keep only sections that qualify for overload pay.
///
/// Two independent predicates, both required: the course title contains a
/// qualifying keyword (case-insensitive substring), and enrollment is
/// nonzero. Dropped rows are not an error; a blank title simply never
/// matches.
pub fn filter_sections(sections: Vec<SectionRecord>) -> Vec<SectionRecord> {
    sections
        .into_iter()
        .filter(|section| {
            title_matches_keywords(&section.course_title) && section.total_students != 0
        })
        .collect()
}
