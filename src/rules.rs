//! Business rules for the overload calculation.
//!
//! Everything here is a fixed constant of the pay agreement: which columns
//! are dropped, which subject areas qualify, how titles map to capacity
//! tiers, and the pay factors. The values are deliberately centralized so a
//! contract change is a one-file edit.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::Capacity;

// =============================================================================
// Column names
// =============================================================================

/// Column holding the free-text course title.
pub const COL_COURSE_TITLE: &str = "Course Title";

/// Column holding the staff member's name.
pub const COL_STAFF_NAME: &str = "Staff Name";

/// Column holding the enrollment count.
pub const COL_TOTAL_STUDENTS: &str = "Total Students";

/// Columns that must be present in every input file.
pub const REQUIRED_COLUMNS: &[&str] = &[COL_COURSE_TITLE, COL_STAFF_NAME, COL_TOTAL_STUDENTS];

/// Columns dropped before any other processing.
///
/// The district export names several columns after their sheet letter; the
/// list is a tolerant superset and missing entries are ignored.
pub const PRUNE_COLUMNS: &[&str] = &["C", "G", "H", "I", "J", "K", "L"];

/// Computed columns appended to the output, in order.
pub const OUTPUT_COLUMNS: &[&str] = &[
    "Base Students",
    "Max Students",
    "Total Overload",
    "Base Overload",
    "Max Overload",
    "Base Overload Pay",
    "Max Overload Pay",
    "Total Monthly Overload",
];

// =============================================================================
// Row filter
// =============================================================================

/// Subject-area keywords that qualify a section for overload pay.
///
/// Matching is case-insensitive substring containment ("ARTISAN" matches
/// "ART").
pub const TITLE_KEYWORDS: &[&str] = &["MUSIC", "PHYS ED", "ART", "CREATIVE"];

/// True when the course title contains at least one qualifying keyword.
pub fn title_matches_keywords(title: &str) -> bool {
    let upper = title.to_uppercase();
    TITLE_KEYWORDS.iter().any(|kw| upper.contains(kw))
}

// =============================================================================
// Capacity tiers
// =============================================================================

/// One capacity tier: a title predicate plus the base/max student counts.
#[derive(Debug, Clone, Copy)]
pub struct CapacityTier {
    /// Human-readable tier name (used by the `rules` CLI command).
    pub name: &'static str,
    /// Base teaching capacity.
    pub base: i64,
    /// Max capacity ceiling before premium pay.
    pub max: i64,
    matcher: TierMatcher,
}

#[derive(Debug, Clone, Copy)]
enum TierMatcher {
    /// Title contains any of these characters.
    AnyChar(&'static [char]),
    /// Title contains "KINDER" or the standalone token "K".
    Kinder,
}

/// Grade levels are embedded in free-text titles (e.g. "MUSIC GR 2"), so
/// tiers match on title substrings. Evaluated top to bottom, first match
/// wins.
pub const CAPACITY_TIERS: &[CapacityTier] = &[
    CapacityTier {
        name: "Grades 1-3",
        base: 23,
        max: 25,
        matcher: TierMatcher::AnyChar(&['1', '2', '3']),
    },
    CapacityTier {
        name: "Grades 4-5",
        base: 26,
        max: 28,
        matcher: TierMatcher::AnyChar(&['4', '5']),
    },
    CapacityTier {
        name: "Kindergarten",
        base: 22,
        max: 24,
        matcher: TierMatcher::Kinder,
    },
];

/// Standalone "K" token, so "MUSIC K" and "K AM" match but "BLOCK" does not.
static KINDER_TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bK\b").unwrap());

impl CapacityTier {
    fn matches(&self, upper_title: &str) -> bool {
        match self.matcher {
            TierMatcher::AnyChar(chars) => upper_title.contains(chars),
            TierMatcher::Kinder => {
                upper_title.contains("KINDER") || KINDER_TOKEN.is_match(upper_title)
            }
        }
    }

    /// The tier's capacity pair.
    pub fn capacity(&self) -> Capacity {
        Capacity {
            base: self.base,
            max: self.max,
        }
    }
}

/// Assign a capacity to a course title.
///
/// Returns the first matching tier's capacity, or `Capacity::ZERO` when no
/// tier matches (the row then passes through with zero overload).
pub fn classify_title(title: &str) -> Capacity {
    let upper = title.to_uppercase();
    CAPACITY_TIERS
        .iter()
        .find(|tier| tier.matches(&upper))
        .map(|tier| tier.capacity())
        .unwrap_or(Capacity::ZERO)
}

// =============================================================================
// Pay factors
// =============================================================================

/// Overloads of this size or smaller are absorbed entirely at base rate.
pub const GRACE_BAND: i64 = 2;

/// Premium rate multiplier for students beyond max capacity.
pub const PREMIUM_MULTIPLIER: f64 = 1.5;

/// Billing units per month for the monthly conversion.
pub const BILLING_UNITS_PER_MONTH: f64 = 30.0;

/// Pay-period divisor for the monthly conversion.
pub const PAY_PERIOD_DIVISOR: f64 = 8.0;

/// Currency symbol prefixed to every monetary value.
pub const CURRENCY_SYMBOL: &str = "$";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_match_case_insensitive() {
        assert!(title_matches_keywords("Music Gr 2"));
        assert!(title_matches_keywords("phys ed 4"));
        assert!(title_matches_keywords("CREATIVE WRITING"));
        assert!(!title_matches_keywords("ALGEBRA 1"));
    }

    #[test]
    fn test_keyword_match_is_substring() {
        // Substring containment, not whole-word.
        assert!(title_matches_keywords("ARTISAN CRAFTS"));
    }

    #[test]
    fn test_classify_lower_grades() {
        assert_eq!(classify_title("MUSIC GR 2"), Capacity { base: 23, max: 25 });
        assert_eq!(classify_title("art 3"), Capacity { base: 23, max: 25 });
    }

    #[test]
    fn test_classify_upper_grades() {
        assert_eq!(classify_title("PHYS ED 4"), Capacity { base: 26, max: 28 });
        assert_eq!(classify_title("MUSIC GR 5"), Capacity { base: 26, max: 28 });
    }

    #[test]
    fn test_classify_kindergarten() {
        assert_eq!(classify_title("KINDER AM"), Capacity { base: 22, max: 24 });
        assert_eq!(classify_title("MUSIC K"), Capacity { base: 22, max: 24 });
    }

    #[test]
    fn test_classify_priority_order() {
        // "KINDER 1" contains '1', so the grades 1-3 tier wins.
        assert_eq!(classify_title("KINDER 1"), Capacity { base: 23, max: 25 });
        // '1' beats '4' only by order of the char list inside one tier;
        // across tiers, 1-3 is checked before 4-5.
        assert_eq!(classify_title("ART 41"), Capacity { base: 23, max: 25 });
    }

    #[test]
    fn test_classify_standalone_k_only() {
        // Embedded K must not classify as kindergarten.
        assert_eq!(classify_title("BLOCK PERIOD"), Capacity::ZERO);
        assert_eq!(classify_title("K BLOCK"), Capacity { base: 22, max: 24 });
    }

    #[test]
    fn test_classify_no_match() {
        assert_eq!(classify_title("MUSIC THEORY"), Capacity::ZERO);
        assert_eq!(classify_title(""), Capacity::ZERO);
    }
}
