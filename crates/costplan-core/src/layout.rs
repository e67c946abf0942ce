//! Spreadsheet layout shared by import and export
//!
//! Sheet `Backlog`, one header row, then one row per hierarchy level:
//!
//! ```text
//! | Level   | Title   | Description | Scope | Priority | Profile | Charge Mode   | Days | Ratio | Rate /d | Cost |
//! |---------|---------|-------------|-------|----------|---------|---------------|------|-------|---------|------|
//! | Cluster | Portal  |             |       |          |         |               |      |       |         |      |
//! | Feature | Login   |             |       |          |         |               |      |       |         |      |
//! | Task    | SSO     | ...         | MVP   | Must     | Dev     | Days          | 12   |       | 600     | 7200 |
//! | Task    | PM      |             | MVP   |          | PM      | Other (Ratio) |      | 0.15  | 800     | ...  |
//! ```
//!
//! A `Cluster` row carries a product name, a `Feature` row a cluster name;
//! both set the context for the `Task` rows that follow.

use crate::{BacklogItem, ChargeType, ItemType};

/// Name of the backlog sheet
pub const BACKLOG_SHEET: &str = "Backlog";
/// Name of the profiles sheet
pub const PROFILES_SHEET: &str = "Profiles";
/// Name of the summary sheet
pub const SUMMARY_SHEET: &str = "Summary";

pub const COL_LEVEL: u16 = 0;
pub const COL_TITLE: u16 = 1;
pub const COL_DESCRIPTION: u16 = 2;
pub const COL_SCOPE: u16 = 3;
pub const COL_PRIORITY: u16 = 4;
pub const COL_PROFILE: u16 = 5;
pub const COL_CHARGE_MODE: u16 = 6;
pub const COL_DAYS: u16 = 7;
pub const COL_RATIO: u16 = 8;
pub const COL_RATE: u16 = 9;
pub const COL_COST: u16 = 10;

/// Backlog sheet headers, in column order
pub const BACKLOG_HEADERS: [&str; 11] = [
    "Level",
    "Title",
    "Description",
    "Scope",
    "Priority",
    "Profile",
    "Charge Mode",
    "Days",
    "Ratio",
    "Rate /d",
    "Cost",
];

pub const PROFILE_COL_ID: u16 = 0;
pub const PROFILE_COL_NAME: u16 = 1;
pub const PROFILE_COL_USERNAME: u16 = 2;
pub const PROFILE_COL_RATE: u16 = 3;
pub const PROFILE_COL_SCR: u16 = 4;
pub const PROFILE_COL_ACTIVE: u16 = 5;
pub const PROFILE_COL_DAYS: u16 = 6;
pub const PROFILE_COL_COST: u16 = 7;

/// Profiles sheet headers, in column order
pub const PROFILE_HEADERS: [&str; 8] = [
    "Profile ID",
    "Profile",
    "Username",
    "Rate /d",
    "SCR /d",
    "Active",
    "Days",
    "Cost",
];

/// Charge mode written for day-charged items
pub const CHARGE_MODE_DAYS: &str = "Days";
/// Charge mode written for ratio-charged overhead items
pub const CHARGE_MODE_OTHER_RATIO: &str = "Other (Ratio)";
/// Charge mode written for ratio-charged build items
pub const CHARGE_MODE_BUILD_RATIO: &str = "Build (Ratio)";

/// Hierarchy level of a backlog row
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RowLevel {
    /// Sets the current product
    Cluster,
    /// Sets the current cluster
    Feature,
    /// A backlog item
    Task,
}

impl RowLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RowLevel::Cluster => "Cluster",
            RowLevel::Feature => "Feature",
            RowLevel::Task => "Task",
        }
    }

    pub fn parse(tag: &str) -> Option<Self> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "cluster" => Some(RowLevel::Cluster),
            "feature" => Some(RowLevel::Feature),
            "task" => Some(RowLevel::Task),
            _ => None,
        }
    }
}

/// Map a charge mode cell to charge type and item type.
///
/// `"Other (Ratio)"` is ratio-charged overhead; any other mode mentioning
/// "ratio" is ratio-charged build work; everything else is days of build work.
pub fn parse_charge_mode(mode: &str) -> (ChargeType, ItemType) {
    let normalized = mode.trim().to_lowercase();
    if normalized == CHARGE_MODE_OTHER_RATIO.to_lowercase() {
        (ChargeType::Ratio, ItemType::Other)
    } else if normalized.contains("ratio") {
        (ChargeType::Ratio, ItemType::Build)
    } else {
        (ChargeType::Days, ItemType::Build)
    }
}

/// Charge mode label written for an item
pub fn charge_mode_label(item: &BacklogItem) -> &'static str {
    match (item.charge_type, item.effective_type()) {
        (ChargeType::Ratio, ItemType::Other) => CHARGE_MODE_OTHER_RATIO,
        (ChargeType::Ratio, ItemType::Build) => CHARGE_MODE_BUILD_RATIO,
        (ChargeType::Days, _) => CHARGE_MODE_DAYS,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn charge_mode_mapping() {
        assert_eq!(parse_charge_mode("Other (Ratio)"), (ChargeType::Ratio, ItemType::Other));
        assert_eq!(parse_charge_mode("other (ratio) "), (ChargeType::Ratio, ItemType::Other));
        assert_eq!(parse_charge_mode("Build (Ratio)"), (ChargeType::Ratio, ItemType::Build));
        assert_eq!(parse_charge_mode("RATIO"), (ChargeType::Ratio, ItemType::Build));
        assert_eq!(parse_charge_mode("Days"), (ChargeType::Days, ItemType::Build));
        assert_eq!(parse_charge_mode(""), (ChargeType::Days, ItemType::Build));
        assert_eq!(parse_charge_mode("Other"), (ChargeType::Days, ItemType::Build));
    }

    #[test]
    fn labels_parse_back() {
        let items = [
            BacklogItem::new("a").effort(3.0),
            BacklogItem::new("b").ratio(10.0).other(),
            BacklogItem::new("c").ratio(10.0).build(),
            BacklogItem::new("d").ratio(10.0),
        ];
        for item in &items {
            let (charge, kind) = parse_charge_mode(charge_mode_label(item));
            assert_eq!(charge, item.charge_type);
            assert_eq!(kind, item.effective_type());
        }
    }

    #[test]
    fn row_levels() {
        assert_eq!(RowLevel::parse(" cluster"), Some(RowLevel::Cluster));
        assert_eq!(RowLevel::parse("Task"), Some(RowLevel::Task));
        assert_eq!(RowLevel::parse("Level"), None);
        assert_eq!(RowLevel::Feature.as_str(), "Feature");
    }

    #[test]
    fn headers_match_columns() {
        assert_eq!(BACKLOG_HEADERS[COL_CHARGE_MODE as usize], "Charge Mode");
        assert_eq!(BACKLOG_HEADERS[COL_COST as usize], "Cost");
        assert_eq!(PROFILE_HEADERS[PROFILE_COL_SCR as usize], "SCR /d");
    }
}
