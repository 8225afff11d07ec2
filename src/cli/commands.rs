use std::path::{Path, PathBuf};

use chrono::Local;

use context_bank::config::BankConfig;
use context_bank::error::{BankError, Result};
use context_bank::health::{HealthReport, ValidationReport};
use context_bank::hierarchy::{link_child_stores, HierarchyMap};
use context_bank::maintenance::{Maintenance, RunSummary};
use context_bank::store::{self, StoreShape};

fn open(root: &Path, project: Option<&str>) -> Result<Maintenance> {
    let config = BankConfig::load(root)?;
    Maintenance::open(root, project, config)
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn hierarchy(root: &Path, save: bool, output: Option<PathBuf>, json: bool) -> Result<()> {
    let config = BankConfig::load(root)?;
    let map = HierarchyMap::detect(root, &config)?;

    if json {
        print_json(&map)?;
    } else {
        println!("Found {} repositories under {}", map.repos.len(), map.root.display());
        for repo in &map.repos {
            let indent = "  ".repeat(repo.depth);
            let shape = match repo.memory_bank_type {
                Some(shape) => shape.as_str(),
                None => "no store",
            };
            println!("{}{} ({})", indent, repo.path, shape);
        }

        let suggestion = map.suggest_setup();
        println!("\nSuggested approach: {}", suggestion.approach.as_str());
        for action in &suggestion.actions {
            println!("  - {}", action);
        }
    }

    if save {
        let path = map.save(output.as_deref(), &config.store.dir_names)?;
        println!("Hierarchy saved to {}", path.display());
    }

    Ok(())
}

pub fn link(root: &Path) -> Result<()> {
    let config = BankConfig::load(root)?;
    let map = HierarchyMap::detect(root, &config)?;
    let written = link_child_stores(&map, &config.store.dir_names)?;

    if written.is_empty() {
        println!("No child stores needed a hierarchy link");
    }
    for path in written {
        println!("Linked {}", path.display());
    }
    Ok(())
}

pub fn scan_patterns(root: &Path, project: Option<&str>) -> Result<()> {
    let maintenance = open(root, project)?;
    let outcome = maintenance.scan_patterns(Local::now())?;

    println!(
        "Scanned {} files: {} patterns",
        outcome.result.files_scanned,
        outcome.result.records.len()
    );
    println!("Batch: {}", outcome.batch_path.display());
    println!("Summary: {}", outcome.summary_path.display());
    if outcome.suggest_shared {
        println!("Some patterns might be suitable for the shared patterns document (see `promote`)");
    }
    Ok(())
}

pub fn extract_pitfalls(root: &Path, project: Option<&str>) -> Result<()> {
    let maintenance = open(root, project)?;
    let outcome = maintenance.extract_pitfalls()?;
    println!("Extracted {} pitfalls", outcome.records.len());
    Ok(())
}

pub fn extract_decisions(root: &Path, project: Option<&str>) -> Result<()> {
    let maintenance = open(root, project)?;
    let outcome = maintenance.extract_decisions(Local::now())?;
    println!(
        "Found {} decisions ({} new in the decision log)",
        outcome.records.len(),
        outcome.logged
    );
    println!("Document: {}", outcome.document_path.display());
    Ok(())
}

fn print_health(report: &HealthReport) {
    println!("Health score: {}/100 ({})", report.overall_health, report.status.as_str());
    if report.recommendations.is_empty() {
        return;
    }
    println!("\nRecommendations:");
    for recommendation in &report.recommendations {
        println!("  - {}", recommendation);
    }
}

pub fn health(root: &Path, project: Option<&str>, json: bool) -> Result<()> {
    let maintenance = open(root, project)?;
    let report = maintenance.check_health(Local::now())?;
    if json {
        return print_json(&report);
    }
    print_health(&report);
    Ok(())
}

fn print_validation(report: &ValidationReport) {
    println!("{}", report.summary);
    for error in &report.errors {
        println!("  error: {}", error);
    }
    for warning in &report.warnings {
        println!("  warning: {}", warning);
    }
}

pub fn validate(root: &Path, project: Option<&str>, json: bool) -> Result<()> {
    let maintenance = open(root, project)?;
    let report = maintenance.validate_structure(Local::now());
    if json {
        return print_json(&report);
    }
    print_validation(&report);
    Ok(())
}

pub fn run_all(root: &Path, project: Option<&str>) -> Result<()> {
    let maintenance = open(root, project)?;
    let RunSummary {
        validation,
        scan,
        pitfalls,
        decisions,
        health,
    } = maintenance.run_all(Local::now())?;

    print_validation(&validation);
    println!(
        "Patterns: {} from {} files",
        scan.result.records.len(),
        scan.result.files_scanned
    );
    println!("Pitfalls: {}", pitfalls.records.len());
    println!("Decisions: {} ({} new)", decisions.records.len(), decisions.logged);
    print_health(&health);
    Ok(())
}

pub fn list_projects(root: &Path) -> Result<()> {
    let config = BankConfig::load(root)?;
    let store_dir = store::find_store_dir(root, &config.store.dir_names)
        .ok_or_else(|| BankError::StoreNotFound(root.display().to_string()))?;

    if StoreShape::of_store(&store_dir) == StoreShape::SingleProject {
        println!("Single-project store at {}", store_dir.display());
        return Ok(());
    }

    let projects = store::list_projects(&store_dir)?;
    if projects.is_empty() {
        println!("No projects found");
    }
    for project in projects {
        println!("{}", project);
    }
    Ok(())
}

pub fn promote(root: &Path, project: Option<&str>, kind: &str, content: &str) -> Result<()> {
    let maintenance = open(root, project)?;
    let path = maintenance.promote_to_shared(kind, content, Local::now())?;
    println!("Added '{}' to {}", kind, path.display());
    Ok(())
}
