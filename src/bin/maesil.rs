//! Batch generator for rice subsidy application forms.
//!
//! Reads the parcel worksheet, groups rows by business registration
//! number and writes one filled .hwpx per grower, plus a JSON report
//! of everything that was written.
//!
//! # Usage
//!
//! Basic run:
//! ```sh
//! maesil 필지정보.xlsx Form.hwpx
//! ```
//!
//! With the annex template for growers holding more than 12 parcels:
//! ```sh
//! maesil 필지정보.xlsx Form.hwpx --backpage-template Form-backpage.hwpx
//! ```
//!
//! Generate only the first five applications:
//! ```sh
//! maesil 필지정보.xlsx Form.hwpx --limit 5
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use log::{debug, warn};

use maesil::hwpx::{FormLayout, Package, TemplateKind};
use maesil::markup::TableEditor;
use maesil::record::{self, Applicant};
use maesil::report::{self, FillReport};
use maesil::xlsx::Workbook;

const DEFAULT_SHEET: &str = "메일머지 작업전(전략작물,타작물추가)";

/// Fill HWPX application forms from a parcel spreadsheet
#[derive(Parser, Debug)]
#[command(
    name = "maesil",
    about = "Fill HWPX application forms from a parcel spreadsheet",
    version
)]
struct Args {
    /// Parcel worksheet (.xlsx)
    #[arg(value_name = "WORKBOOK")]
    workbook: PathBuf,

    /// Single-page form template (.hwpx)
    #[arg(value_name = "TEMPLATE")]
    template: PathBuf,

    /// Template with the parcel annex page
    ///
    /// Used for growers with more than 12 parcels. Without it, extra
    /// parcels are dropped and the single-page template is used.
    #[arg(long, value_name = "TEMPLATE")]
    backpage_template: Option<PathBuf>,

    /// Worksheet to read
    #[arg(long, default_value = DEFAULT_SHEET)]
    sheet: String,

    /// Output directory
    #[arg(short, long, default_value = "output")]
    output: PathBuf,

    /// Only generate the first N applications
    #[arg(long, value_name = "N")]
    limit: Option<usize>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let inputs = [Some(&args.workbook), Some(&args.template), args.backpage_template.as_ref()];
    for input in inputs.into_iter().flatten() {
        if !input.is_file() {
            eprintln!("Error: input file does not exist: {}", input.display());
            std::process::exit(1);
        }
    }

    let workbook = Workbook::open(&args.workbook)
        .with_context(|| format!("failed to open {}", args.workbook.display()))?;
    let rows = workbook
        .rows(&args.sheet)
        .with_context(|| format!("failed to read sheet {:?}", args.sheet))?;

    let groups = record::group_by_business(record::parcel_rows(&rows));
    println!(
        "Loaded {} applicants from {}",
        groups.len(),
        args.workbook.display()
    );

    fs::create_dir_all(&args.output)
        .with_context(|| format!("failed to create {}", args.output.display()))?;

    let editor = TableEditor::hwpx();
    let mut report = FillReport::default();
    let mut success_count = 0;
    let mut error_count = 0;

    let total = match args.limit {
        Some(limit) => groups.len().min(limit),
        None => groups.len(),
    };

    for (index, parcels) in groups.values().take(total).enumerate() {
        let (layout, template) = match (TemplateKind::select(parcels.len()), &args.backpage_template)
        {
            (TemplateKind::WithBackpage, Some(template)) => {
                (FormLayout::with_backpage(), template.as_path())
            }
            (TemplateKind::WithBackpage, None) => {
                warn!(
                    "{} parcels need the annex template, falling back to the single page form",
                    parcels.len()
                );
                (FormLayout::single_page(), args.template.as_path())
            }
            (TemplateKind::SinglePage, _) => (FormLayout::single_page(), args.template.as_path()),
        };

        let Some(applicant) = Applicant::from_rows(parcels, layout.capacity()) else {
            continue;
        };

        println!(
            "[{}/{}] {} ({}, {} parcels)",
            index + 1,
            total,
            applicant.name,
            applicant.business_id,
            parcels.len()
        );

        let filename = report::output_filename(&applicant);
        let path = args.output.join(&filename);
        match fill_document(&editor, &layout, template, &path, &applicant) {
            Ok(()) => {
                println!("  ✓ {filename}");
                report.push(path, applicant);
                success_count += 1;
            }
            Err(err) => {
                eprintln!("  ✗ {filename}: {err:#}");
                error_count += 1;
            }
        }
    }

    let report_path = args.output.join("cell_mappings.json");
    report
        .save(&report_path)
        .with_context(|| format!("failed to write {}", report_path.display()))?;

    println!(
        "\nGenerated {} of {} applications, mappings in {}",
        success_count,
        total,
        report_path.display()
    );

    if error_count > 0 {
        std::process::exit(1);
    }
    Ok(())
}

fn fill_document(
    editor: &TableEditor,
    layout: &FormLayout,
    template: &Path,
    output: &Path,
    applicant: &Applicant,
) -> anyhow::Result<()> {
    let mut package = Package::open(template)
        .with_context(|| format!("failed to open template {}", template.display()))?;
    if !package.is_hwpx() {
        debug!("{} does not declare the hwpx mimetype", template.display());
    }

    let body = package
        .section_xml(0)
        .context("template has no section body")?;
    package.set_section_xml(0, layout.fill(editor, body, applicant));
    package
        .save(output)
        .with_context(|| format!("failed to write {}", output.display()))?;
    Ok(())
}
