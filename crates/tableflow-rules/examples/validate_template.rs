use std::env;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tableflow_core::CapabilityCatalog;
use tableflow_rules::{ValidationReport, check_template, template_json_schema};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = env::args().skip(1);
    let mut template_path: Option<PathBuf> = None;
    let mut catalog_path: Option<PathBuf> = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--catalog" => {
                catalog_path = args.next().map(PathBuf::from);
            }
            _ => {
                if template_path.is_none() {
                    template_path = Some(PathBuf::from(arg));
                } else {
                    return Err("unexpected argument".into());
                }
            }
        }
    }

    let template_path = template_path.ok_or("missing template path")?;
    let catalog = match catalog_path {
        Some(path) => serde_json::from_value::<CapabilityCatalog>(load_json(&path)?)?,
        None => CapabilityCatalog::empty(),
    };

    let template_json = load_json(&template_path)?;
    let template_schema = serde_json::to_value(template_json_schema())?;

    let validated = match check_template(&template_json, &template_schema, &catalog) {
        Ok(validated) => validated,
        Err(report) => {
            eprintln!("template validation failed");
            print_report(&report);
            std::process::exit(1);
        }
    };

    if !validated.warnings.is_empty() {
        eprintln!("template validated with warnings:");
        print_report(&ValidationReport {
            errors: Vec::new(),
            warnings: validated.warnings,
        });
    } else {
        println!("template validated successfully");
    }

    Ok(())
}

fn load_json(path: &Path) -> Result<Value, Box<dyn std::error::Error>> {
    let contents = std::fs::read_to_string(path)?;
    let json = serde_json::from_str(&contents)?;
    Ok(json)
}

fn print_report(report: &ValidationReport) {
    for issue in report.errors.iter().chain(&report.warnings) {
        eprintln!("{issue}");
    }
}
