//! Workbook import tests
//!
//! Workbooks are built in memory with rust_xlsxwriter and read back
//! through calamine.

use costplan_core::{ChargeType, ItemType, Priority, Scope};
use costplan_engine::CostSnapshot;
use costplan_import::{import_bytes, parse_file, parse_workbook_bytes, ImportError};
use pretty_assertions::assert_eq;
use rust_xlsxwriter::{Workbook, Worksheet};

fn write_row(sheet: &mut Worksheet, row: u32, cells: &[&str]) {
    for (col, value) in cells.iter().enumerate() {
        if value.is_empty() {
            continue;
        }
        match value.parse::<f64>() {
            Ok(n) => sheet.write(row, col as u16, n).unwrap(),
            Err(_) => sheet.write(row, col as u16, *value).unwrap(),
        };
    }
}

fn backlog_workbook(with_profiles: bool) -> Vec<u8> {
    let mut workbook = Workbook::new();

    let backlog = workbook.add_worksheet();
    backlog.set_name("Backlog").unwrap();
    let rows: &[&[&str]] = &[
        &["Level", "Title", "Description", "Scope", "Priority", "Profile", "Charge Mode", "Days", "Ratio"],
        &["Cluster", "Portal"],
        &["Feature", "Identity"],
        &["Task", "SSO", "Azure AD", "MVP", "Must", "Developer", "Days", "12"],
        &["Task", "Password reset", "", "V1", "Could", "Developer", "Days", "3.5"],
        &["Feature", "Foundations"],
        &["Task", "Architecture", "", "MVP", "Should", "architect", "Days", "8"],
        &["Cluster", "Overhead"],
        &["Task", "Project management", "", "MVP", "", "Project Manager", "Other (Ratio)", "", "0.15"],
        &["Task", "Buffer", "", "", "", "Developer", "Build (Ratio)", "", "5%"],
        &["Milestone", "Go live"],
    ];
    for (row, cells) in rows.iter().enumerate() {
        write_row(backlog, row as u32, cells);
    }

    if with_profiles {
        let profiles = workbook.add_worksheet();
        profiles.set_name("Profiles").unwrap();
        let rows: &[&[&str]] = &[
            &["Profile ID", "Profile", "Username", "Rate /d", "SCR /d", "Active"],
            &["arch", "Architect", "", "900", "650", "Yes"],
            &["dev", "Developer", "mrossi", "600", "420", "Yes"],
            &["pm", "Project Manager", "", "800", "", "No"],
        ];
        for (row, cells) in rows.iter().enumerate() {
            write_row(profiles, row as u32, cells);
        }
    }

    workbook.save_to_buffer().unwrap()
}

#[test]
fn imports_hierarchy_and_charge_modes() {
    let import = import_bytes(&backlog_workbook(true)).unwrap();

    assert_eq!(import.items.len(), 5);
    assert_eq!(import.skipped_rows, 1);

    let sso = &import.items[0];
    assert_eq!(sso.id, "item-1");
    assert_eq!(sso.title, "SSO");
    assert_eq!(sso.description.as_deref(), Some("Azure AD"));
    assert_eq!(sso.product.as_deref(), Some("Portal"));
    assert_eq!(sso.cluster.as_deref(), Some("Identity"));
    assert_eq!(sso.scope, Some(Scope::Mvp));
    assert_eq!(sso.priority, Some(Priority::Must));
    assert_eq!(sso.effort_days, 12.0);
    assert_eq!(sso.profile_id.as_deref(), Some("dev"));

    assert_eq!(import.items[1].effort_days, 3.5);
    assert_eq!(import.items[2].cluster.as_deref(), Some("Foundations"));
    assert_eq!(import.items[2].profile_id.as_deref(), Some("arch"));

    let pm = &import.items[3];
    assert_eq!(pm.product.as_deref(), Some("Overhead"));
    assert_eq!(pm.cluster, None);
    assert_eq!(pm.charge_type, ChargeType::Ratio);
    assert_eq!(pm.item_type, Some(ItemType::Other));
    assert_eq!(pm.effort_days, 15.0);

    let buffer = &import.items[4];
    assert_eq!(buffer.charge_type, ChargeType::Ratio);
    assert_eq!(buffer.item_type, Some(ItemType::Build));
    assert_eq!(buffer.effort_days, 5.0);
}

#[test]
fn imports_profiles_sheet() {
    let import = import_bytes(&backlog_workbook(true)).unwrap();
    let ids: Vec<_> = import.profiles.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec!["arch", "dev", "pm"]);
    assert_eq!(import.profiles[1].username.as_deref(), Some("mrossi"));
    assert_eq!(import.profiles[1].scr, Some(420.0));
    assert!(!import.profiles[2].active);
}

#[test]
fn without_profiles_sheet_items_are_unassigned() {
    let import = import_bytes(&backlog_workbook(false)).unwrap();
    assert!(import.profiles.is_empty());
    assert!(import.items.iter().all(|item| item.profile_id.is_none()));
}

#[test]
fn imported_project_can_be_costed() {
    let project = parse_workbook_bytes(&backlog_workbook(true), "Portal").unwrap();
    let snapshot = CostSnapshot::compute(&project);

    // raw effort of every build item, the 5% buffer included
    assert_eq!(snapshot.project.total_build_effort, 28.5);
    assert_eq!(snapshot.project.project_name, "Portal");
}

#[test]
fn falls_back_to_first_sheet() {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name("Foglio1").unwrap();
    write_row(sheet, 0, &["Level", "Title"]);
    write_row(sheet, 1, &["task", "Only item", "", "", "", "", "", "2"]);
    let bytes = workbook.save_to_buffer().unwrap();

    let import = import_bytes(&bytes).unwrap();
    assert_eq!(import.items.len(), 1);
    assert_eq!(import.items[0].effort_days, 2.0);
}

#[test]
fn empty_backlog_sheet_is_error() {
    let mut workbook = Workbook::new();
    workbook.add_worksheet().set_name("Backlog").unwrap();
    let bytes = workbook.save_to_buffer().unwrap();

    assert!(matches!(import_bytes(&bytes), Err(ImportError::EmptySheet(name)) if name == "Backlog"));
}

#[test]
fn parse_file_reads_xlsx_and_json() {
    let dir = tempfile::tempdir().unwrap();

    let xlsx = dir.path().join("roadmap.xlsx");
    std::fs::write(&xlsx, backlog_workbook(true)).unwrap();
    let project = parse_file(&xlsx).unwrap();
    assert_eq!(project.name(), "roadmap");
    assert_eq!(project.items.len(), 5);

    let json = dir.path().join("bundle.json");
    std::fs::write(
        &json,
        r#"{"projectName": "Bundle", "exportDate": "2026-02-01T00:00:00Z", "items": [], "profiles": []}"#,
    )
    .unwrap();
    assert_eq!(parse_file(&json).unwrap().name(), "Bundle");
}

#[test]
fn parse_file_errors() {
    let dir = tempfile::tempdir().unwrap();

    let missing = dir.path().join("missing.xlsx");
    assert!(parse_file(&missing).is_err());

    let corrupt = dir.path().join("corrupt.xlsx");
    std::fs::write(&corrupt, b"definitely not a zip").unwrap();
    assert!(parse_file(&corrupt).is_err());

    let text = dir.path().join("notes.txt");
    std::fs::write(&text, "hello").unwrap();
    assert!(matches!(parse_file(&text), Err(ImportError::UnsupportedFormat(_))));
}
