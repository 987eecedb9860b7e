//! Excel export of the dashboard

use std::path::Path;

use chrono::Utc;
use rust_xlsxwriter::{Format, Workbook, Worksheet};
use resmap_types::{Error, GeoPoint, ResourceStatus, Result};

use crate::dashboard::DashboardReport;

fn excel<T>(result: std::result::Result<T, rust_xlsxwriter::XlsxError>) -> Result<T> {
    result.map_err(|e| Error::Excel(e.to_string()))
}

/// Export the visible records and their aggregates to an Excel file
pub fn export_to_excel(report: &DashboardReport, output_path: &Path) -> Result<()> {
    let mut workbook = Workbook::new();

    write_summary_sheet(workbook.add_worksheet(), report)?;
    write_municipality_sheet(workbook.add_worksheet(), report)?;
    write_type_sheet(workbook.add_worksheet(), report)?;
    write_resource_sheet(workbook.add_worksheet(), report)?;

    excel(workbook.save(output_path))?;
    tracing::info!(path = %output_path.display(), rows = report.visible.len(), "exported workbook");
    Ok(())
}

fn write_header(sheet: &mut Worksheet, headers: &[&str]) -> Result<()> {
    let header_format = Format::new().set_bold();
    for (col, header) in headers.iter().enumerate() {
        excel(sheet.write_string_with_format(0, col as u16, *header, &header_format))?;
    }
    Ok(())
}

fn write_summary_sheet(sheet: &mut Worksheet, report: &DashboardReport) -> Result<()> {
    excel(sheet.set_name("Summary"))?;
    let header_format = Format::new().set_bold();
    let stats = &report.stats;

    excel(sheet.write_string_with_format(0, 0, "Emergency Resource Report", &header_format))?;
    excel(sheet.write_string(2, 0, "Exported:"))?;
    excel(sheet.write_string(2, 1, Utc::now().to_rfc3339()))?;

    let rows: [(&str, f64); 5] = [
        ("Total Resources:", stats.total_resources as f64),
        ("Total Quantity:", stats.total_quantity as f64),
        ("Municipalities:", stats.municipality_count as f64),
        ("Avg per Municipality:", stats.average_per_municipality as f64),
        ("Readiness %:", f64::from(stats.readiness_percentage())),
    ];
    for (i, (label, value)) in rows.iter().enumerate() {
        let row = 3 + i as u32;
        excel(sheet.write_string(row, 0, *label))?;
        excel(sheet.write_number(row, 1, *value))?;
    }

    if let Some((name, count)) = &stats.top_municipality {
        excel(sheet.write_string(8, 0, "Top Municipality:"))?;
        excel(sheet.write_string(8, 1, format!("{name} ({count})")))?;
    }
    if let Some(t) = &stats.most_common_type {
        excel(sheet.write_string(9, 0, "Most Common Type:"))?;
        excel(sheet.write_string(9, 1, format!("{} ({})", t.resource_type.label(), t.count)))?;
    }

    excel(sheet.write_string_with_format(11, 0, "Status", &header_format))?;
    excel(sheet.write_string_with_format(11, 1, "Count", &header_format))?;
    excel(sheet.write_string_with_format(11, 2, "%", &header_format))?;
    for (i, status) in ResourceStatus::ALL.iter().enumerate() {
        let row = 12 + i as u32;
        let entry = stats.status(*status);
        excel(sheet.write_string(row, 0, status.label()))?;
        excel(sheet.write_number(row, 1, entry.count as f64))?;
        excel(sheet.write_number(row, 2, f64::from(entry.percentage)))?;
    }

    excel(sheet.set_column_width(0, 24))?;
    excel(sheet.set_column_width(1, 28))?;
    Ok(())
}

fn write_municipality_sheet(sheet: &mut Worksheet, report: &DashboardReport) -> Result<()> {
    excel(sheet.set_name("Municipalities"))?;
    write_header(
        sheet,
        &["Municipality", "Total", "Ready", "Deployed", "Maintenance", "%"],
    )?;

    for (i, m) in report.municipalities.iter().enumerate() {
        let row = (i + 1) as u32;
        let name = if m.name.is_empty() { "(none)" } else { m.name.as_str() };
        excel(sheet.write_string(row, 0, name))?;
        excel(sheet.write_number(row, 1, m.count as f64))?;
        excel(sheet.write_number(row, 2, m.ready as f64))?;
        excel(sheet.write_number(row, 3, m.deployed as f64))?;
        excel(sheet.write_number(row, 4, m.maintenance as f64))?;
        excel(sheet.write_number(row, 5, f64::from(m.percentage)))?;
    }

    excel(sheet.set_column_width(0, 20))?;
    Ok(())
}

fn write_type_sheet(sheet: &mut Worksheet, report: &DashboardReport) -> Result<()> {
    excel(sheet.set_name("Types"))?;
    write_header(sheet, &["Type", "Label", "Count", "%"])?;

    for (i, t) in report.types.iter().enumerate() {
        let row = (i + 1) as u32;
        excel(sheet.write_string(row, 0, t.resource_type.as_str()))?;
        excel(sheet.write_string(row, 1, t.resource_type.label()))?;
        excel(sheet.write_number(row, 2, t.count as f64))?;
        excel(sheet.write_number(row, 3, f64::from(t.percentage)))?;
    }

    excel(sheet.set_column_width(1, 24))?;
    Ok(())
}

fn write_resource_sheet(sheet: &mut Worksheet, report: &DashboardReport) -> Result<()> {
    excel(sheet.set_name("Resources"))?;
    write_header(
        sheet,
        &[
            "ID",
            "Title",
            "Type",
            "Quantity",
            "Status",
            "Municipality",
            "Latitude",
            "Longitude",
            "Created",
            "Description",
        ],
    )?;

    for (i, r) in report.visible.iter().enumerate() {
        let row = (i + 1) as u32;
        excel(sheet.write_string(row, 0, &r.id))?;
        excel(sheet.write_string(row, 1, &r.title))?;
        excel(sheet.write_string(row, 2, r.resource_type.label()))?;
        excel(sheet.write_number(row, 3, f64::from(r.quantity)))?;
        excel(sheet.write_string(row, 4, r.status.label()))?;
        excel(sheet.write_string(row, 5, &r.municipality))?;
        if let Some(location) = r.location().filter(GeoPoint::is_valid) {
            excel(sheet.write_number(row, 6, location.latitude))?;
            excel(sheet.write_number(row, 7, location.longitude))?;
        }
        if let Some(created) = r.created_at {
            excel(sheet.write_string(row, 8, created.format("%Y-%m-%d %H:%M").to_string()))?;
        }
        excel(sheet.write_string(row, 9, &r.description))?;
    }

    excel(sheet.set_column_width(0, 38))?;
    excel(sheet.set_column_width(1, 30))?;
    excel(sheet.set_column_width(2, 22))?;
    excel(sheet.set_column_width(5, 16))?;
    excel(sheet.set_column_width(8, 18))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::build_report;
    use resmap_domain::{MockGenerator, ResourceFilter};

    #[test]
    fn test_export_writes_workbook() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("resources.xlsx");
        let resources = MockGenerator::seeded(3).generate(20);
        let report = build_report(&resources, &ResourceFilter::all(), 8);

        export_to_excel(&report, &path).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.len() > 100);
        assert_eq!(&bytes[..2], b"PK");
    }

    #[test]
    fn test_export_empty_report() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.xlsx");
        let report = build_report(&[], &ResourceFilter::all(), 8);
        export_to_excel(&report, &path).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_export_to_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.xlsx");
        let report = build_report(&[], &ResourceFilter::all(), 8);
        assert!(matches!(export_to_excel(&report, &path), Err(Error::Excel(_))));
    }
}
