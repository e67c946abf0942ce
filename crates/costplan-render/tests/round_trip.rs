//! Export a project to XLSX and import it back

use costplan_core::{BacklogItem, ChargeType, ItemType, Priority, Profile, Project, Renderer, Scope};
use costplan_engine::CostSnapshot;
use costplan_import::{import_bytes, parse_file};
use costplan_render::ExcelExporter;
use pretty_assertions::assert_eq;

fn sample_project() -> Project {
    let mut project = Project::new("Round Trip");
    project.profiles = vec![
        Profile::new("arch").name("Architect").rate(900.0).scr(650.0),
        Profile::new("dev").name("Developer").rate(600.0).username("mrossi"),
        Profile::new("pm").name("Project Manager").rate(800.0).inactive(),
    ];
    project.items = vec![
        BacklogItem::new("sso")
            .title("Single sign-on")
            .description("Azure AD")
            .product("Portal")
            .cluster("Identity")
            .scope(Scope::Mvp)
            .priority(Priority::Must)
            .effort(12.5)
            .assign("dev"),
        BacklogItem::new("design")
            .title("Architecture")
            .product("Portal")
            .cluster("Foundations")
            .scope(Scope::V1)
            .priority(Priority::Wont)
            .effort(8.0)
            .build()
            .assign("arch"),
        BacklogItem::new("pm")
            .title("Project management")
            .scope(Scope::Mvp)
            .ratio(15.0)
            .other()
            .assign("pm"),
        BacklogItem::new("buffer").title("Buffer").ratio(7.0).build().assign("dev"),
        BacklogItem::new("misc").title("Unassigned").effort(1.0),
    ];
    project
}

fn by_title<'a>(items: &'a [BacklogItem], title: &str) -> &'a BacklogItem {
    items.iter().find(|i| i.title == title).unwrap()
}

fn assert_round_trip(exporter: &ExcelExporter) {
    let original = sample_project();
    let bytes = exporter.render(&original).unwrap();
    let imported = import_bytes(&bytes).unwrap();

    assert_eq!(imported.items.len(), original.items.len());
    assert_eq!(imported.skipped_rows, 0);

    for item in &original.items {
        let back = by_title(&imported.items, &item.title);
        assert_eq!(back.charge_type, item.charge_type, "{}", item.title);
        assert_eq!(back.effective_type(), item.effective_type(), "{}", item.title);
        assert_eq!(back.effort_days, item.effort_days, "{}", item.title);
        assert_eq!(back.scope, item.scope, "{}", item.title);
        assert_eq!(back.priority, item.priority, "{}", item.title);
        assert_eq!(back.profile_id, item.profile_id, "{}", item.title);
    }
}

#[test]
fn formulas_round_trip() {
    assert_round_trip(&ExcelExporter::new());
}

#[test]
fn static_values_round_trip() {
    assert_round_trip(&ExcelExporter::new().static_values());
}

#[test]
fn hierarchy_survives() {
    let bytes = ExcelExporter::new().render(&sample_project()).unwrap();
    let imported = import_bytes(&bytes).unwrap();

    let sso = by_title(&imported.items, "Single sign-on");
    assert_eq!(sso.product.as_deref(), Some("Portal"));
    assert_eq!(sso.cluster.as_deref(), Some("Identity"));
    assert_eq!(sso.description.as_deref(), Some("Azure AD"));

    let pm = by_title(&imported.items, "Project management");
    assert_eq!(pm.charge_type, ChargeType::Ratio);
    assert_eq!(pm.item_type, Some(ItemType::Other));
}

#[test]
fn profiles_survive() {
    let original = sample_project();
    let bytes = ExcelExporter::new().render(&original).unwrap();
    let imported = import_bytes(&bytes).unwrap();

    assert_eq!(imported.profiles.len(), 3);
    for (back, profile) in imported.profiles.iter().zip(&original.profiles) {
        assert_eq!(back.id, profile.id);
        assert_eq!(back.name, profile.name);
        assert_eq!(back.daily_rate, profile.daily_rate);
        assert_eq!(back.scr, profile.scr);
        assert_eq!(back.username, profile.username);
        assert_eq!(back.active, profile.active);
    }
}

#[test]
fn costs_survive() {
    let original = sample_project();
    let bytes = ExcelExporter::new().render(&original).unwrap();
    let imported = import_bytes(&bytes).unwrap().into_project("Round Trip");

    let before = CostSnapshot::compute(&original);
    let after = CostSnapshot::compute(&imported);
    assert_eq!(after.project.total_build_effort, before.project.total_build_effort);
    assert!((after.project.breakdown.base_cost - before.project.breakdown.base_cost).abs() < 1e-9);
}

#[test]
fn shared_profile_names_keep_their_rates() {
    let mut original = Project::new("Seniority");
    original.profiles = vec![
        Profile::new("dev-senior").name("Developer").rate(800.0),
        Profile::new("dev-junior").name("Developer").rate(400.0),
    ];
    original.items = vec![
        BacklogItem::new("api").title("API").effort(10.0).assign("dev-senior"),
        BacklogItem::new("ui").title("UI").effort(10.0).assign("dev-junior"),
    ];

    for exporter in [ExcelExporter::new(), ExcelExporter::new().static_values()] {
        let bytes = exporter.render(&original).unwrap();
        let imported = import_bytes(&bytes).unwrap().into_project("Seniority");

        assert_eq!(by_title(&imported.items, "API").profile_id.as_deref(), Some("dev-senior"));
        assert_eq!(by_title(&imported.items, "UI").profile_id.as_deref(), Some("dev-junior"));

        let after = CostSnapshot::compute(&imported);
        assert_eq!(after.project.breakdown.base_cost, 12000.0);
    }
}

#[test]
fn export_to_file_and_parse() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("round-trip.xlsx");
    std::fs::write(&path, ExcelExporter::new().render(&sample_project()).unwrap()).unwrap();

    let project = parse_file(&path).unwrap();
    assert_eq!(project.name(), "round-trip");
    assert_eq!(project.items.len(), 5);
}
