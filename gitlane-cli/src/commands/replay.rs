use anyhow::{Context, Result};
use colored::Colorize;
use gitlane_core::{Repository, Script};
use std::path::PathBuf;

pub fn run(script_path: PathBuf, name: String, json: bool, config: Option<PathBuf>) -> Result<()> {
    let config = super::load_config(config)?;
    let source = std::fs::read_to_string(&script_path)
        .with_context(|| format!("Failed to read script {}", script_path.display()))?;
    let script = Script::parse(&source)?;

    let mut repo = Repository::with_author(name, config.registry.author.clone());
    let report = script.apply(&mut repo)?;
    let layout = repo.layout(&config.layout);

    if json {
        println!("{}", serde_json::to_string_pretty(&layout)?);
        return Ok(());
    }

    println!(
        "{} {} step(s), {} new commit(s)",
        "Replayed".green().bold(),
        report.applied,
        report.created.len()
    );
    if report.up_to_date > 0 {
        println!(
            "  {} merge(s) were already up to date",
            report.up_to_date.to_string().yellow()
        );
    }
    println!();

    crate::display::print_graph(&repo, &layout);
    crate::display::print_history(&repo);

    Ok(())
}
