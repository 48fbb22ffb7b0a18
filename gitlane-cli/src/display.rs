use colored::Colorize;
use gitlane_core::layout::UNKNOWN_LANE;
use gitlane_core::{GraphLayout, Repository};

const CELL: usize = 4;

/// One row per lane, one column per commit in sequence order.
pub fn print_graph(repo: &Repository, layout: &GraphLayout) {
    println!(
        "{} {} {}",
        "Repository".bold().cyan(),
        repo.name().bold(),
        format!("(on {})", repo.head()).dimmed()
    );
    println!();

    if layout.is_empty() {
        println!("{}", "No commits yet".yellow());
        return;
    }

    let label_width = layout
        .lanes
        .iter()
        .map(|lane| lane.branch.chars().count())
        .chain(std::iter::once(UNKNOWN_LANE.len()))
        .max()
        .unwrap_or(0);

    let mut rows: Vec<&str> = layout.lanes.iter().map(|l| l.branch.as_str()).collect();
    if layout.nodes.iter().any(|n| n.lane == UNKNOWN_LANE) {
        rows.push(UNKNOWN_LANE);
    }

    for row in rows {
        let label = format!("{:>width$}", row, width = label_width);
        let label = if row == repo.head() {
            label.green().bold()
        } else {
            label.normal()
        };

        let mut line = String::new();
        for node in &layout.nodes {
            let cell = if node.lane != row {
                format!("{:<CELL$}", "─").bright_black().to_string()
            } else if node.is_head_tip {
                format!("{:<CELL$}", "◉").green().bold().to_string()
            } else if layout.edges_into(&node.id).any(|e| e.is_merge_edge) {
                format!("{:<CELL$}", "◆").magenta().to_string()
            } else {
                format!("{:<CELL$}", "●")
            };
            line.push_str(&cell);
        }

        println!("  {} {}", label, line);
    }
    println!();

    for edge in layout.edges.iter().filter(|e| e.is_merge_edge) {
        println!(
            "  {} {} {} {}",
            "merge".magenta(),
            edge.parent_id.to_string().yellow(),
            "⇢".dimmed(),
            edge.child_id.to_string().yellow()
        );
    }
    println!();
}

/// First-parent history of head, newest first.
pub fn print_history(repo: &Repository) {
    let history = repo.history();

    if history.is_empty() {
        println!("{}", "No commits yet".yellow());
        return;
    }

    println!("{}", "Commit History".bold().cyan());
    println!();

    for commit in history {
        println!(
            "{} {}",
            "commit".yellow().bold(),
            commit.id.to_string().yellow()
        );
        if commit.is_merge() {
            let parents: Vec<_> = commit.parents.iter().map(|p| p.to_string()).collect();
            println!("{}: {}", "Merge".bold(), parents.join(" "));
        }
        println!("{}: {}", "Author".bold(), commit.author);
        println!(
            "{}: {}",
            "Date".bold(),
            commit.timestamp.format("%Y-%m-%d %H:%M:%S")
        );
        println!();
        println!("    {}", commit.message);
        println!();

        if !commit.files.is_empty() {
            for path in commit.files.keys().take(5) {
                println!("      • {}", path.dimmed());
            }
            if commit.files.len() > 5 {
                println!(
                    "      {} and {} more...",
                    "...".dimmed(),
                    (commit.files.len() - 5).to_string().dimmed()
                );
            }
            println!();
        }
    }
}
