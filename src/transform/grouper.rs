//! Group sections by staff member and insert subtotal rows.
//!
//! # Architecture
//!
//! ```text
//! Filtered sections (any order)   →  Output rows (sorted, subtotaled)
//! ┌──────────────────────────┐       ┌─────────────────────────┐
//! │ Jones  ART 4        20   │       │ Jones  ART 4        20  │
//! │ Smith  MUSIC GR 2   27   │  →    │ Jones  subtotal  0 / 0  │
//! │ Jones  MUSIC K      22   │       ├─────────────────────────┤
//! └──────────────────────────┘       │ Smith  MUSIC GR 2   27  │
//!                                    │ Smith  subtotal  2 / 2  │
//!                                    └─────────────────────────┘
//! ```
//!
//! The sort is stable and ascending by staff name; rows for the same staff
//! member keep their input order. Every group, including groups of one, is
//! followed by exactly one subtotal row carrying the numeric overload sums.

use crate::models::{OutputRow, SectionRecord, SubtotalRecord};

/// Sort sections by staff name and emit each group followed by its
/// subtotal row.
pub fn group_by_staff(mut sections: Vec<SectionRecord>) -> Vec<OutputRow> {
    sections.sort_by(|a, b| a.staff_name.cmp(&b.staff_name));

    let mut rows = Vec::with_capacity(sections.len() * 2);
    let mut group: Vec<SectionRecord> = Vec::new();

    for section in sections {
        if let Some(first) = group.first() {
            if first.staff_name != section.staff_name {
                flush_group(&mut rows, std::mem::take(&mut group));
            }
        }
        group.push(section);
    }
    flush_group(&mut rows, group);

    rows
}

/// Emit one group's data rows followed by its subtotal.
fn flush_group(rows: &mut Vec<OutputRow>, group: Vec<SectionRecord>) {
    let Some(first) = group.first() else {
        return;
    };

    let subtotal = SubtotalRecord {
        staff_name: first.staff_name.clone(),
        base_overload: group.iter().map(|s| s.overload.base).sum(),
        max_overload: group.iter().map(|s| s.overload.max).sum(),
    };

    rows.extend(group.into_iter().map(OutputRow::Section));
    rows.push(OutputRow::Subtotal(subtotal));
}

/// Count the distinct staff members in a grouped row set.
pub fn distinct_staff(rows: &[OutputRow]) -> usize {
    rows.iter()
        .filter(|row| matches!(row, OutputRow::Subtotal(_)))
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Overload;

    fn section(staff: &str, title: &str, base: i64, max: i64) -> SectionRecord {
        SectionRecord {
            course_title: title.to_string(),
            staff_name: staff.to_string(),
            overload: Overload {
                total: base + max,
                base,
                max,
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_groups_sorted_by_staff() {
        let rows = group_by_staff(vec![
            section("Smith", "MUSIC GR 2", 2, 2),
            section("Jones", "ART 4", 1, 0),
        ]);

        let staff_order: Vec<&str> = rows
            .iter()
            .map(|row| match row {
                OutputRow::Section(s) => s.staff_name.as_str(),
                OutputRow::Subtotal(s) => s.staff_name.as_str(),
            })
            .collect();
        assert_eq!(staff_order, vec!["Jones", "Jones", "Smith", "Smith"]);
    }

    #[test]
    fn test_subtotal_sums_group() {
        let rows = group_by_staff(vec![
            section("Smith", "MUSIC GR 2", 2, 2),
            section("Smith", "MUSIC GR 3", 3, 1),
        ]);

        assert_eq!(rows.len(), 3);
        match &rows[2] {
            OutputRow::Subtotal(sub) => {
                assert_eq!(sub.staff_name, "Smith");
                assert_eq!(sub.base_overload, 5);
                assert_eq!(sub.max_overload, 3);
            }
            _ => panic!("expected subtotal row"),
        }
    }

    #[test]
    fn test_single_row_group_still_subtotaled() {
        let rows = group_by_staff(vec![section("Solo", "ART 1", 4, 1)]);
        assert_eq!(rows.len(), 2);
        match &rows[1] {
            OutputRow::Subtotal(sub) => {
                assert_eq!(sub.base_overload, 4);
                assert_eq!(sub.max_overload, 1);
            }
            _ => panic!("expected subtotal row"),
        }
    }

    #[test]
    fn test_stable_order_within_group() {
        let rows = group_by_staff(vec![
            section("Smith", "FIRST", 0, 0),
            section("Smith", "SECOND", 0, 0),
        ]);
        match (&rows[0], &rows[1]) {
            (OutputRow::Section(a), OutputRow::Section(b)) => {
                assert_eq!(a.course_title, "FIRST");
                assert_eq!(b.course_title, "SECOND");
            }
            _ => panic!("expected two section rows"),
        }
    }

    #[test]
    fn test_row_count_invariant() {
        let rows = group_by_staff(vec![
            section("A", "MUSIC 1", 1, 0),
            section("B", "MUSIC 2", 1, 0),
            section("A", "MUSIC 3", 1, 0),
        ]);
        // 3 data rows + 2 distinct staff members.
        assert_eq!(rows.len(), 5);
        assert_eq!(distinct_staff(&rows), 2);
    }

    #[test]
    fn test_empty_input_yields_empty_output() {
        assert!(group_by_staff(vec![]).is_empty());
    }
}
