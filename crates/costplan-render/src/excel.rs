//! Excel backlog exporter
//!
//! Writes the backlog in the same layout the importer reads, so an
//! exported workbook can be edited and imported again:
//! - Backlog: Cluster/Feature/Task rows with effort, rate and cost
//! - Profiles: rates, SCR and per-profile totals
//! - Summary: project totals and a per-scope table
//!
//! ## Cost Column
//!
//! With formulas enabled (the default) the Cost column is live:
//!
//! ```text
//! | Level | Title | ... | Charge Mode   | Days | Ratio  | Rate /d | Cost              |
//! |-------|-------|-----|---------------|------|--------|---------|-------------------|
//! | Task  | SSO   | ... | Days          | 12   |        | 600     | =H4*J4            |
//! | Task  | PM    | ... | Other (Ratio) |      | 15.00% | 800     | =I5*40*J5         |
//! ```
//!
//! Ratio rows multiply by the build effort base at export time. Editing
//! a day count therefore updates day rows only; the base is fixed until
//! the workbook is imported and exported again.

use costplan_core::layout::{
    charge_mode_label, RowLevel, BACKLOG_HEADERS, BACKLOG_SHEET, COL_CHARGE_MODE, COL_COST,
    COL_DAYS, COL_DESCRIPTION, COL_LEVEL, COL_PRIORITY, COL_PROFILE, COL_RATE, COL_RATIO,
    COL_SCOPE, COL_TITLE, PROFILES_SHEET, PROFILE_COL_ACTIVE, PROFILE_COL_COST, PROFILE_COL_DAYS,
    PROFILE_COL_ID, PROFILE_COL_NAME, PROFILE_COL_RATE, PROFILE_COL_SCR, PROFILE_COL_USERNAME,
    PROFILE_HEADERS, SUMMARY_SHEET,
};
use costplan_core::{BacklogItem, ChargeType, Profile, Project, RenderError, Renderer};
use costplan_engine::{
    group_by_product_cluster, item_cost, project_summary, resolve_effort, scope_summaries,
    total_build_effort, ProfileIndex,
};
use rust_xlsxwriter::{Format, FormatAlign, FormatBorder, Workbook, Worksheet};
use std::collections::HashMap;
use tracing::debug;

/// Excel backlog exporter
#[derive(Clone, Debug)]
pub struct ExcelExporter {
    /// Currency label; the project's currency when unset
    pub currency: Option<String>,
    /// Whether to write formulas (vs static values)
    pub use_formulas: bool,
    /// Whether to include the Profiles sheet
    pub include_profiles: bool,
    /// Whether to include the Summary sheet
    pub include_summary: bool,
}

impl Default for ExcelExporter {
    fn default() -> Self {
        Self {
            currency: None,
            use_formulas: true,
            include_profiles: true,
            include_summary: true,
        }
    }
}

/// Reusable cell formats
struct ExcelFormats {
    header: Format,
    currency: Format,
    number: Format,
    percent: Format,
    text: Format,
    cluster_row: Format,
    feature_row: Format,
    total_row: Format,
    total_currency: Format,
}

impl ExcelExporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set currency label
    pub fn currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = Some(currency.into());
        self
    }

    /// Use static values instead of formulas
    pub fn static_values(mut self) -> Self {
        self.use_formulas = false;
        self
    }

    /// Disable the Profiles sheet
    pub fn no_profiles(mut self) -> Self {
        self.include_profiles = false;
        self
    }

    /// Disable the Summary sheet
    pub fn no_summary(mut self) -> Self {
        self.include_summary = false;
        self
    }

    /// Generate Excel workbook bytes
    pub fn render_to_bytes(&self, project: &Project) -> Result<Vec<u8>, RenderError> {
        let mut workbook = Workbook::new();
        let currency = self
            .currency
            .clone()
            .unwrap_or_else(|| project.settings.currency.clone());
        let formats = Self::create_formats(&currency);

        self.add_backlog_sheet(&mut workbook, project, &formats)?;
        if self.include_profiles {
            self.add_profiles_sheet(&mut workbook, project, &formats)?;
        }
        if self.include_summary {
            self.add_summary_sheet(&mut workbook, project, &formats, &currency)?;
        }

        let buffer = workbook
            .save_to_buffer()
            .map_err(|e| RenderError::Format(format!("Failed to create Excel: {e}")))?;

        debug!(items = project.items.len(), bytes = buffer.len(), "exported workbook");
        Ok(buffer)
    }

    fn create_formats(currency: &str) -> ExcelFormats {
        let header = Format::new()
            .set_bold()
            .set_align(FormatAlign::Center)
            .set_background_color(0x4472C4)
            .set_font_color(0xFFFFFF)
            .set_border(FormatBorder::Thin);

        let currency_format = Format::new()
            .set_num_format(format!("#,##0.00 \"{currency}\""))
            .set_border(FormatBorder::Thin);

        let number = Format::new()
            .set_num_format("#,##0.0")
            .set_border(FormatBorder::Thin);

        let percent = Format::new()
            .set_num_format("0.00%")
            .set_border(FormatBorder::Thin);

        let text = Format::new().set_border(FormatBorder::Thin);

        let cluster_row = Format::new()
            .set_bold()
            .set_background_color(0xDDEBF7) // Light blue
            .set_border(FormatBorder::Thin);

        let feature_row = Format::new()
            .set_bold()
            .set_italic()
            .set_border(FormatBorder::Thin);

        let total_row = Format::new()
            .set_bold()
            .set_background_color(0xE2EFDA)
            .set_border(FormatBorder::Thin);

        let total_currency = Format::new()
            .set_bold()
            .set_num_format(format!("#,##0.00 \"{currency}\""))
            .set_background_color(0xE2EFDA)
            .set_border(FormatBorder::Thin);

        ExcelFormats {
            header,
            currency: currency_format,
            number,
            percent,
            text,
            cluster_row,
            feature_row,
            total_row,
            total_currency,
        }
    }

    /// Add Backlog sheet: one Cluster row per product, one Feature row per cluster
    fn add_backlog_sheet(
        &self,
        workbook: &mut Workbook,
        project: &Project,
        formats: &ExcelFormats,
    ) -> Result<(), RenderError> {
        let sheet = workbook.add_worksheet();
        sheet
            .set_name(BACKLOG_SHEET)
            .map_err(|e| RenderError::Format(e.to_string()))?;

        for (col, header) in BACKLOG_HEADERS.iter().enumerate() {
            sheet
                .write_with_format(0, col as u16, *header, &formats.header)
                .map_err(|e| RenderError::Format(e.to_string()))?;
        }

        for (col, width) in [10, 35, 40, 8, 10, 20, 15, 8, 8, 12, 15].into_iter().enumerate() {
            sheet.set_column_width(col as u16, width).ok();
        }

        let base = total_build_effort(&project.items);
        let index = ProfileIndex::new(&project.profiles);
        let labels = profile_labels(&project.profiles);

        let mut row = 1u32;
        for product in group_by_product_cluster(&project.items) {
            Self::write_level_row(sheet, row, RowLevel::Cluster, product.product, &formats.cluster_row)?;
            row += 1;

            for cluster in &product.clusters {
                Self::write_level_row(sheet, row, RowLevel::Feature, cluster.cluster, &formats.feature_row)?;
                row += 1;

                for item in &cluster.items {
                    self.write_task_row(sheet, row, item, base, &index, &labels, formats)?;
                    row += 1;
                }
            }
        }

        sheet.set_freeze_panes(1, 0).ok();
        Ok(())
    }

    fn write_level_row(
        sheet: &mut Worksheet,
        row: u32,
        level: RowLevel,
        title: &str,
        format: &Format,
    ) -> Result<(), RenderError> {
        sheet
            .write_with_format(row, COL_LEVEL, level.as_str(), format)
            .map_err(|e| RenderError::Format(e.to_string()))?;
        sheet
            .write_with_format(row, COL_TITLE, title, format)
            .map_err(|e| RenderError::Format(e.to_string()))?;
        for col in COL_DESCRIPTION..=COL_COST {
            sheet
                .write_blank(row, col, format)
                .map_err(|e| RenderError::Format(e.to_string()))?;
        }
        Ok(())
    }

    fn write_task_row(
        &self,
        sheet: &mut Worksheet,
        row: u32,
        item: &BacklogItem,
        base: f64,
        index: &ProfileIndex<'_>,
        labels: &HashMap<&str, &str>,
        formats: &ExcelFormats,
    ) -> Result<(), RenderError> {
        let profile = index.for_item(item);
        let profile_label = profile.map_or("", |p| labels.get(p.id.as_str()).copied().unwrap_or(p.id.as_str()));
        let rate = index.daily_rate(item);
        let excel_row = row + 1;

        let texts = [
            (COL_LEVEL, RowLevel::Task.as_str()),
            (COL_TITLE, item.title.as_str()),
            (COL_DESCRIPTION, item.description.as_deref().unwrap_or("")),
            (COL_SCOPE, item.scope.map_or("", |s| s.as_str())),
            (COL_PRIORITY, item.priority.map_or("", |p| p.as_str())),
            (COL_PROFILE, profile_label),
            (COL_CHARGE_MODE, charge_mode_label(item)),
        ];
        for (col, value) in texts {
            sheet
                .write_with_format(row, col, value, &formats.text)
                .map_err(|e| RenderError::Format(e.to_string()))?;
        }

        let cost_formula = match item.charge_type {
            ChargeType::Days => {
                sheet
                    .write_with_format(row, COL_DAYS, item.effort_days, &formats.number)
                    .map_err(|e| RenderError::Format(e.to_string()))?;
                sheet
                    .write_blank(row, COL_RATIO, &formats.percent)
                    .map_err(|e| RenderError::Format(e.to_string()))?;
                format!("=H{excel_row}*J{excel_row}")
            }
            ChargeType::Ratio => {
                sheet
                    .write_blank(row, COL_DAYS, &formats.number)
                    .map_err(|e| RenderError::Format(e.to_string()))?;
                sheet
                    .write_with_format(row, COL_RATIO, item.effort_days / 100.0, &formats.percent)
                    .map_err(|e| RenderError::Format(e.to_string()))?;
                format!("=I{excel_row}*{base}*J{excel_row}")
            }
        };

        sheet
            .write_with_format(row, COL_RATE, rate, &formats.currency)
            .map_err(|e| RenderError::Format(e.to_string()))?;

        if self.use_formulas {
            sheet
                .write_formula_with_format(row, COL_COST, cost_formula.as_str(), &formats.currency)
                .map_err(|e| RenderError::Format(e.to_string()))?;
        } else {
            sheet
                .write_with_format(row, COL_COST, item_cost(item, base, rate), &formats.currency)
                .map_err(|e| RenderError::Format(e.to_string()))?;
        }

        Ok(())
    }

    /// Add Profiles sheet with a TOTAL row
    fn add_profiles_sheet(
        &self,
        workbook: &mut Workbook,
        project: &Project,
        formats: &ExcelFormats,
    ) -> Result<(), RenderError> {
        let sheet = workbook.add_worksheet();
        sheet
            .set_name(PROFILES_SHEET)
            .map_err(|e| RenderError::Format(e.to_string()))?;

        for (col, header) in PROFILE_HEADERS.iter().enumerate() {
            sheet
                .write_with_format(0, col as u16, *header, &formats.header)
                .map_err(|e| RenderError::Format(e.to_string()))?;
        }

        for (col, width) in [12, 25, 15, 12, 12, 8, 10, 15].into_iter().enumerate() {
            sheet.set_column_width(col as u16, width).ok();
        }

        // Resolved days per profile, inactive profiles included
        let base = total_build_effort(&project.items);
        let mut profile_days: HashMap<&str, f64> = HashMap::new();
        for item in &project.items {
            if let Some(id) = item.profile_id.as_deref() {
                *profile_days.entry(id).or_default() += resolve_effort(item, base);
            }
        }

        let mut row = 1u32;
        let mut total_days = 0.0;
        let mut total_cost = 0.0;

        for profile in &project.profiles {
            let days = profile_days.get(profile.id.as_str()).copied().unwrap_or(0.0);
            let cost = days * profile.daily_rate;
            total_days += days;
            total_cost += cost;

            sheet
                .write_with_format(row, PROFILE_COL_ID, &profile.id, &formats.text)
                .map_err(|e| RenderError::Format(e.to_string()))?;
            sheet
                .write_with_format(row, PROFILE_COL_NAME, &profile.name, &formats.text)
                .map_err(|e| RenderError::Format(e.to_string()))?;
            sheet
                .write_with_format(
                    row,
                    PROFILE_COL_USERNAME,
                    profile.username.as_deref().unwrap_or(""),
                    &formats.text,
                )
                .map_err(|e| RenderError::Format(e.to_string()))?;
            sheet
                .write_with_format(row, PROFILE_COL_RATE, profile.daily_rate, &formats.currency)
                .map_err(|e| RenderError::Format(e.to_string()))?;
            let scr = match profile.scr {
                Some(scr) => sheet.write_with_format(row, PROFILE_COL_SCR, scr, &formats.currency),
                None => sheet.write_blank(row, PROFILE_COL_SCR, &formats.currency),
            };
            scr.map_err(|e| RenderError::Format(e.to_string()))?;
            sheet
                .write_with_format(
                    row,
                    PROFILE_COL_ACTIVE,
                    if profile.active { "Yes" } else { "No" },
                    &formats.text,
                )
                .map_err(|e| RenderError::Format(e.to_string()))?;
            sheet
                .write_with_format(row, PROFILE_COL_DAYS, days, &formats.number)
                .map_err(|e| RenderError::Format(e.to_string()))?;

            if self.use_formulas {
                let formula = format!("=D{}*G{}", row + 1, row + 1);
                sheet
                    .write_formula_with_format(row, PROFILE_COL_COST, formula.as_str(), &formats.currency)
                    .map_err(|e| RenderError::Format(e.to_string()))?;
            } else {
                sheet
                    .write_with_format(row, PROFILE_COL_COST, cost, &formats.currency)
                    .map_err(|e| RenderError::Format(e.to_string()))?;
            }

            row += 1;
        }

        // Total row
        sheet
            .write_with_format(row, PROFILE_COL_ID, "TOTAL", &formats.total_row)
            .map_err(|e| RenderError::Format(e.to_string()))?;
        for col in PROFILE_COL_NAME..PROFILE_COL_DAYS {
            sheet
                .write_blank(row, col, &formats.total_row)
                .map_err(|e| RenderError::Format(e.to_string()))?;
        }

        if self.use_formulas && row > 1 {
            let sum_days = format!("=SUM(G2:G{row})");
            sheet
                .write_formula_with_format(row, PROFILE_COL_DAYS, sum_days.as_str(), &formats.total_row)
                .map_err(|e| RenderError::Format(e.to_string()))?;
            let sum_cost = format!("=SUM(H2:H{row})");
            sheet
                .write_formula_with_format(row, PROFILE_COL_COST, sum_cost.as_str(), &formats.total_currency)
                .map_err(|e| RenderError::Format(e.to_string()))?;
        } else {
            sheet
                .write_with_format(row, PROFILE_COL_DAYS, total_days, &formats.total_row)
                .map_err(|e| RenderError::Format(e.to_string()))?;
            sheet
                .write_with_format(row, PROFILE_COL_COST, total_cost, &formats.total_currency)
                .map_err(|e| RenderError::Format(e.to_string()))?;
        }

        Ok(())
    }

    /// Add Summary sheet: project figures, then one row per scope
    fn add_summary_sheet(
        &self,
        workbook: &mut Workbook,
        project: &Project,
        formats: &ExcelFormats,
        currency: &str,
    ) -> Result<(), RenderError> {
        let sheet = workbook.add_worksheet();
        sheet
            .set_name(SUMMARY_SHEET)
            .map_err(|e| RenderError::Format(e.to_string()))?;

        let summary = project_summary(&project.items, &project.profiles, &project.settings);

        sheet
            .merge_range(0, 0, 0, 1, "PROJECT SUMMARY", &formats.header)
            .map_err(|e| RenderError::Format(e.to_string()))?;

        sheet
            .write_with_format(2, 0, "Project Name:", &formats.text)
            .map_err(|e| RenderError::Format(e.to_string()))?;
        sheet
            .write_with_format(2, 1, &summary.project_name, &formats.text)
            .map_err(|e| RenderError::Format(e.to_string()))?;

        if let Some(start) = project.settings.start_date {
            sheet
                .write_with_format(3, 0, "Start Date:", &formats.text)
                .map_err(|e| RenderError::Format(e.to_string()))?;
            sheet
                .write_with_format(3, 1, start.format("%Y-%m-%d").to_string(), &formats.text)
                .map_err(|e| RenderError::Format(e.to_string()))?;
        }

        let figures = [
            ("Items:", summary.item_count as f64, &formats.number),
            ("Build Effort (d):", summary.total_build_effort, &formats.number),
            ("Total Effort (d):", summary.total_days, &formats.number),
            ("Margin Rate:", summary.margin_rate, &formats.percent),
        ];
        let money = [
            ("Base Cost", summary.breakdown.base_cost),
            ("Margin", summary.breakdown.margin_amount),
            ("Price with Margin", summary.breakdown.price_with_margin),
            ("Internal Cost", summary.internal_cost),
        ];

        let mut row = 4u32;
        for (label, value, format) in figures {
            sheet
                .write_with_format(row, 0, label, &formats.text)
                .map_err(|e| RenderError::Format(e.to_string()))?;
            sheet
                .write_with_format(row, 1, value, format)
                .map_err(|e| RenderError::Format(e.to_string()))?;
            row += 1;
        }
        for (label, value) in money {
            sheet
                .write_with_format(row, 0, format!("{label} ({currency}):"), &formats.text)
                .map_err(|e| RenderError::Format(e.to_string()))?;
            sheet
                .write_with_format(row, 1, value, &formats.currency)
                .map_err(|e| RenderError::Format(e.to_string()))?;
            row += 1;
        }
        sheet
            .write_with_format(row, 0, "Margin Ratio:", &formats.text)
            .map_err(|e| RenderError::Format(e.to_string()))?;
        sheet
            .write_with_format(row, 1, summary.margin_ratio, &formats.percent)
            .map_err(|e| RenderError::Format(e.to_string()))?;

        // Scope table
        row += 2;
        let headers = ["Scope", "Items", "Days", "Price", "Internal Cost", "Margin Ratio"];
        for (col, header) in headers.iter().enumerate() {
            sheet
                .write_with_format(row, col as u16, *header, &formats.header)
                .map_err(|e| RenderError::Format(e.to_string()))?;
        }
        row += 1;

        for scope in scope_summaries(&project.items, &project.profiles) {
            sheet
                .write_with_format(row, 0, &scope.scope, &formats.text)
                .map_err(|e| RenderError::Format(e.to_string()))?;
            sheet
                .write_with_format(row, 1, scope.item_count as f64, &formats.number)
                .map_err(|e| RenderError::Format(e.to_string()))?;
            sheet
                .write_with_format(row, 2, scope.days, &formats.number)
                .map_err(|e| RenderError::Format(e.to_string()))?;
            sheet
                .write_with_format(row, 3, scope.price, &formats.currency)
                .map_err(|e| RenderError::Format(e.to_string()))?;
            sheet
                .write_with_format(row, 4, scope.internal_cost, &formats.currency)
                .map_err(|e| RenderError::Format(e.to_string()))?;
            sheet
                .write_with_format(row, 5, scope.margin_ratio, &formats.percent)
                .map_err(|e| RenderError::Format(e.to_string()))?;
            row += 1;
        }

        sheet.set_column_width(0, 25).ok();
        sheet.set_column_width(1, 25).ok();
        for col in 2..6 {
            sheet.set_column_width(col, 15).ok();
        }

        Ok(())
    }
}

impl Renderer for ExcelExporter {
    type Output = Vec<u8>;

    fn render(&self, project: &Project) -> Result<Vec<u8>, RenderError> {
        self.render_to_bytes(project)
    }
}

/// Text written to the Profile column for each profile ID.
///
/// The name is used when it identifies the profile unambiguously on import;
/// a blank name, a name shared with another profile or a name equal to
/// another profile's ID falls back to the ID.
fn profile_labels(profiles: &[Profile]) -> HashMap<&str, &str> {
    let key = |s: &str| s.trim().to_lowercase();

    let mut name_counts: HashMap<String, usize> = HashMap::new();
    for profile in profiles {
        *name_counts.entry(key(&profile.name)).or_default() += 1;
    }

    let mut labels = HashMap::new();
    for profile in profiles {
        let name = key(&profile.name);
        let taken_by_id = profiles
            .iter()
            .any(|other| other.id != profile.id && key(&other.id) == name);
        let unique = name_counts.get(&name).copied().unwrap_or(0) == 1;
        let label = if !name.is_empty() && unique && !taken_by_id {
            profile.name.as_str()
        } else {
            profile.id.as_str()
        };
        labels.entry(profile.id.as_str()).or_insert(label);
    }
    labels
}
