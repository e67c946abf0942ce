//! Spreadsheet backlog import
//!
//! Reads the `Backlog` sheet (falling back to the first sheet) row by row.
//! `Cluster` rows open a product, `Feature` rows open a cluster inside it,
//! and `Task` rows become backlog items under the current context. The
//! optional `Profiles` sheet provides the profiles that the backlog's
//! Profile column refers to by name.
//!
//! Any workbook-level failure aborts the whole import; individual rows
//! that cannot be understood are skipped and counted.

use std::collections::HashMap;
use std::io::{Cursor, Read, Seek};
use std::path::Path;

use calamine::{open_workbook_auto, open_workbook_auto_from_rs, Data, Range, Reader, Sheets};
use costplan_core::layout::{
    parse_charge_mode, RowLevel, BACKLOG_SHEET, COL_CHARGE_MODE, COL_DAYS, COL_DESCRIPTION,
    COL_LEVEL, COL_PRIORITY, COL_PROFILE, COL_RATIO, COL_SCOPE, COL_TITLE, PROFILES_SHEET,
    PROFILE_COL_ACTIVE, PROFILE_COL_ID, PROFILE_COL_NAME, PROFILE_COL_RATE, PROFILE_COL_SCR,
    PROFILE_COL_USERNAME,
};
use costplan_core::{BacklogItem, ChargeType, Priority, Profile, Project, Scope};
use tracing::{debug, warn};

use crate::cell::SheetCell;
use crate::ImportError;

/// Result of reading a workbook
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WorkbookImport {
    pub items: Vec<BacklogItem>,
    pub profiles: Vec<Profile>,
    /// Non-empty rows that were not understood
    pub skipped_rows: usize,
}

impl WorkbookImport {
    /// Wrap the imported backlog in a project with default settings
    pub fn into_project(self, name: impl Into<String>) -> Project {
        let mut project = Project::new(name);
        project.items = self.items;
        project.profiles = self.profiles;
        project
    }
}

/// Import a workbook from a file
pub fn import_path(path: &Path) -> Result<WorkbookImport, ImportError> {
    let mut workbook = open_workbook_auto(path)?;
    import_sheets(&mut workbook)
}

/// Import a workbook held in memory
pub fn import_bytes(bytes: &[u8]) -> Result<WorkbookImport, ImportError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))?;
    import_sheets(&mut workbook)
}

fn import_sheets<RS: Read + Seek>(workbook: &mut Sheets<RS>) -> Result<WorkbookImport, ImportError> {
    let names = workbook.sheet_names();
    let backlog_name = find_sheet(&names, BACKLOG_SHEET)
        .or_else(|| names.first().cloned())
        .ok_or(ImportError::NoBacklogSheet)?;

    let profiles = match find_sheet(&names, PROFILES_SHEET) {
        Some(name) if name != backlog_name => {
            let rows = read_rows(workbook, &name)?;
            parse_profiles(&rows)
        }
        _ => Vec::new(),
    };

    let rows = read_rows(workbook, &backlog_name)?;
    if rows.iter().all(|row| row.iter().all(SheetCell::is_empty)) {
        return Err(ImportError::EmptySheet(backlog_name));
    }

    let import = parse_backlog(&rows, profiles);
    debug!(
        sheet = %backlog_name,
        items = import.items.len(),
        profiles = import.profiles.len(),
        skipped = import.skipped_rows,
        "imported workbook"
    );
    Ok(import)
}

fn find_sheet(names: &[String], wanted: &str) -> Option<String> {
    names
        .iter()
        .find(|name| name.trim().eq_ignore_ascii_case(wanted))
        .cloned()
}

/// Read a sheet into absolute-position rows, pairing values with formulas
fn read_rows<RS: Read + Seek>(
    workbook: &mut Sheets<RS>,
    sheet: &str,
) -> Result<Vec<Vec<SheetCell>>, ImportError> {
    let values = workbook.worksheet_range(sheet)?;
    // Formula text is optional; readers without formula support still import values.
    let formulas = workbook.worksheet_formula(sheet).ok();
    Ok(to_rows(&values, formulas.as_ref()))
}

fn to_rows(values: &Range<Data>, formulas: Option<&Range<String>>) -> Vec<Vec<SheetCell>> {
    let Some((last_row, last_col)) = values.end() else {
        return Vec::new();
    };

    (0..=last_row)
        .map(|row| {
            (0..=last_col)
                .map(|col| {
                    let cell = values
                        .get_value((row, col))
                        .map_or(SheetCell::Empty, SheetCell::from);
                    match formulas.and_then(|f| f.get_value((row, col))) {
                        Some(formula) if !formula.is_empty() => cell.with_formula(formula.as_str()),
                        _ => cell,
                    }
                })
                .collect()
        })
        .collect()
}

static EMPTY: SheetCell = SheetCell::Empty;

fn cell(row: &[SheetCell], col: u16) -> &SheetCell {
    row.get(col as usize).unwrap_or(&EMPTY)
}

/// Parse profile rows; the first row is the header
pub fn parse_profiles(rows: &[Vec<SheetCell>]) -> Vec<Profile> {
    rows.iter()
        .skip(1)
        .enumerate()
        .filter_map(|(n, row)| {
            let name = cell(row, PROFILE_COL_NAME).opt_text();
            let id = cell(row, PROFILE_COL_ID).opt_text();
            if name.is_none() && id.is_none() {
                return None;
            }
            // Trailing total rows carry neither a rate nor an ID
            if id.as_deref().is_some_and(|i| i.eq_ignore_ascii_case("total")) {
                return None;
            }
            let id = id.unwrap_or_else(|| format!("profile-{}", n + 1));
            let mut profile = Profile::new(id.clone())
                .name(name.unwrap_or(id))
                .rate(cell(row, PROFILE_COL_RATE).number());
            profile.username = cell(row, PROFILE_COL_USERNAME).opt_text();
            profile.scr = cell(row, PROFILE_COL_SCR).opt_number();
            profile.active = cell(row, PROFILE_COL_ACTIVE).flag(true);
            Some(profile)
        })
        .collect()
}

/// Parse backlog rows against the given profiles
pub fn parse_backlog(rows: &[Vec<SheetCell>], profiles: Vec<Profile>) -> WorkbookImport {
    // IDs take priority over names; among equal names the first profile wins
    let mut by_id: HashMap<String, String> = HashMap::new();
    let mut by_name: HashMap<String, String> = HashMap::new();
    for profile in &profiles {
        by_id
            .entry(profile.id.trim().to_lowercase())
            .or_insert_with(|| profile.id.clone());
        let name = profile.name.trim().to_lowercase();
        if !name.is_empty() {
            by_name.entry(name).or_insert_with(|| profile.id.clone());
        }
    }
    let resolve_profile = |label: String| {
        let key = label.trim().to_lowercase();
        by_id.get(&key).or_else(|| by_name.get(&key)).cloned()
    };

    let mut items = Vec::new();
    let mut skipped_rows = 0;
    let mut product: Option<String> = None;
    let mut cluster: Option<String> = None;

    for (index, row) in rows.iter().enumerate() {
        if row.iter().all(SheetCell::is_empty) {
            continue;
        }
        let tag = cell(row, COL_LEVEL).text();
        let Some(level) = RowLevel::parse(&tag) else {
            if index == 0 {
                continue; // header
            }
            warn!(row = index + 1, tag = %tag, "skipping row with unknown level");
            skipped_rows += 1;
            continue;
        };

        let title = cell(row, COL_TITLE).opt_text();
        match level {
            RowLevel::Cluster => {
                product = title;
                cluster = None;
            }
            RowLevel::Feature => cluster = title,
            RowLevel::Task => {
                let (charge_type, item_type) = parse_charge_mode(&cell(row, COL_CHARGE_MODE).text());
                let effort_days = match charge_type {
                    ChargeType::Ratio => cell(row, COL_RATIO).percentage(),
                    ChargeType::Days => cell(row, COL_DAYS).number(),
                };

                let mut item = BacklogItem::new(format!("item-{}", items.len() + 1));
                item.title = title.unwrap_or_default();
                item.description = cell(row, COL_DESCRIPTION).opt_text();
                item.product = product.clone();
                item.cluster = cluster.clone();
                item.scope = Scope::parse(&cell(row, COL_SCOPE).text());
                item.priority = Priority::parse(&cell(row, COL_PRIORITY).text());
                item.charge_type = charge_type;
                item.item_type = Some(item_type);
                item.effort_days = effort_days;
                item.profile_id = cell(row, COL_PROFILE).opt_text().and_then(resolve_profile);
                items.push(item);
            }
        }
    }

    WorkbookImport {
        items,
        profiles,
        skipped_rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use costplan_core::ItemType;

    fn text(s: &str) -> SheetCell {
        if s.is_empty() {
            SheetCell::Empty
        } else {
            SheetCell::Text(s.to_string())
        }
    }

    fn row(cells: &[&str]) -> Vec<SheetCell> {
        cells.iter().map(|c| text(c)).collect()
    }

    #[test]
    fn hierarchy_sets_context() {
        let rows = vec![
            row(&["Level", "Title"]),
            row(&["Task", "Orphan", "", "", "", "", "Days", "1"]),
            row(&["Cluster", "Portal"]),
            row(&["Feature", "Identity"]),
            row(&["Task", "SSO", "", "MVP", "Must", "", "Days", "12"]),
            row(&["Cluster", "Catalog"]),
            row(&["Task", "API", "", "V1", "", "", "Days", "20"]),
        ];
        let import = parse_backlog(&rows, Vec::new());

        assert_eq!(import.items.len(), 3);
        assert_eq!(import.items[0].product, None);
        assert_eq!(import.items[1].product.as_deref(), Some("Portal"));
        assert_eq!(import.items[1].cluster.as_deref(), Some("Identity"));
        assert_eq!(import.items[1].scope, Some(Scope::Mvp));
        assert_eq!(import.items[1].priority, Some(Priority::Must));
        assert_eq!(import.items[2].product.as_deref(), Some("Catalog"));
        assert_eq!(import.items[2].cluster, None);
        assert_eq!(import.items[2].effort_days, 20.0);
    }

    #[test]
    fn charge_modes_and_ratio_cells() {
        let rows = vec![
            row(&["Task", "PM", "", "", "", "", "Other (Ratio)", "", "15%"]),
            row(&["Task", "Arch", "", "", "", "", "ratio", "99", "0,1"]),
            row(&["Task", "Dev", "", "", "", "", "Whatever", "4,5", "0.3"]),
        ];
        let import = parse_backlog(&rows, Vec::new());
        let items = &import.items;

        assert_eq!(items[0].charge_type, ChargeType::Ratio);
        assert_eq!(items[0].item_type, Some(ItemType::Other));
        assert_eq!(items[0].effort_days, 15.0);

        assert_eq!(items[1].charge_type, ChargeType::Ratio);
        assert_eq!(items[1].item_type, Some(ItemType::Build));
        assert_eq!(items[1].effort_days, 10.0);

        assert_eq!(items[2].charge_type, ChargeType::Days);
        assert_eq!(items[2].effort_days, 4.5);
    }

    #[test]
    fn unparsable_numbers_are_zero() {
        let rows = vec![row(&["Task", "X", "", "", "", "", "Days", "lots"])];
        let import = parse_backlog(&rows, Vec::new());
        assert_eq!(import.items[0].effort_days, 0.0);
    }

    #[test]
    fn unknown_levels_are_counted() {
        let rows = vec![
            row(&["Level", "Title"]),
            row(&["Epic", "Something"]),
            row(&[]),
            row(&["Task", "Ok"]),
        ];
        let import = parse_backlog(&rows, Vec::new());
        assert_eq!(import.items.len(), 1);
        assert_eq!(import.skipped_rows, 1);
    }

    #[test]
    fn profiles_resolved_by_name_or_id() {
        let profiles = vec![
            Profile::new("dev").name("Developer"),
            Profile::new("pm").name("Project Manager"),
        ];
        let rows = vec![
            row(&["Task", "A", "", "", "", "developer", "Days", "1"]),
            row(&["Task", "B", "", "", "", "PM", "Days", "1"]),
            row(&["Task", "C", "", "", "", "Tester", "Days", "1"]),
        ];
        let import = parse_backlog(&rows, profiles);
        assert_eq!(import.items[0].profile_id.as_deref(), Some("dev"));
        assert_eq!(import.items[1].profile_id.as_deref(), Some("pm"));
        assert_eq!(import.items[2].profile_id, None);
    }

    #[test]
    fn profile_id_beats_profile_name() {
        let profiles = vec![
            Profile::new("lead").name("dev"),
            Profile::new("dev").name("Developer"),
            Profile::new("dev-junior").name("Developer"),
        ];
        let rows = vec![
            row(&["Task", "A", "", "", "", "dev", "Days", "1"]),
            row(&["Task", "B", "", "", "", "Developer", "Days", "1"]),
            row(&["Task", "C", "", "", "", "DEV-JUNIOR", "Days", "1"]),
        ];
        let import = parse_backlog(&rows, profiles);
        assert_eq!(import.items[0].profile_id.as_deref(), Some("dev"));
        assert_eq!(import.items[1].profile_id.as_deref(), Some("dev"));
        assert_eq!(import.items[2].profile_id.as_deref(), Some("dev-junior"));
    }

    #[test]
    fn profile_rows() {
        let rows = vec![
            row(&["Profile ID", "Profile", "Username", "Rate /d", "SCR /d", "Active"]),
            vec![
                text("dev"),
                text("Developer"),
                text("mrossi"),
                SheetCell::Number(600.0),
                SheetCell::Number(420.0),
                text("Yes"),
            ],
            vec![text(""), text("Tester"), text(""), text("450,5"), text(""), text("no")],
            row(&["TOTAL"]),
        ];
        let profiles = parse_profiles(&rows);

        assert_eq!(profiles.len(), 2);
        assert_eq!(profiles[0].id, "dev");
        assert_eq!(profiles[0].username.as_deref(), Some("mrossi"));
        assert_eq!(profiles[0].scr, Some(420.0));
        assert!(profiles[0].active);
        assert_eq!(profiles[1].id, "profile-2");
        assert_eq!(profiles[1].daily_rate, 450.5);
        assert_eq!(profiles[1].scr, None);
        assert!(!profiles[1].active);
    }
}
