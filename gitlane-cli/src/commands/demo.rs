use anyhow::Result;
use gitlane_core::{LayoutConfig, Repository, Script};

const DEMO_SCRIPT: &str = r##"
[[step]]
op = "commit"
message = "Add README"
files = { "README.md" = "# demo" }

[[step]]
op = "branch"
name = "feature"

[[step]]
op = "checkout"
name = "feature"

[[step]]
op = "commit"
message = "Add feature flag"
files = { "README.md" = "# demo", "feature.txt" = "on" }

[[step]]
op = "checkout"
name = "main"

[[step]]
op = "commit"
message = "Fix typo"
files = { "README.md" = "# Demo" }

[[step]]
op = "merge"
name = "feature"
"##;

pub fn run(json: bool) -> Result<()> {
    let mut repo = Repository::new("demo");
    Script::parse(DEMO_SCRIPT)?.apply(&mut repo)?;
    let layout = repo.layout(&LayoutConfig::default());

    if json {
        println!("{}", serde_json::to_string_pretty(&layout)?);
    } else {
        crate::display::print_graph(&repo, &layout);
        crate::display::print_history(&repo);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_script_builds_merge() {
        let mut repo = Repository::new("demo");
        let report = Script::parse(DEMO_SCRIPT).unwrap().apply(&mut repo).unwrap();

        assert_eq!(report.applied, 7);
        assert_eq!(report.up_to_date, 0);
        assert_eq!(report.created.len(), 4);

        let merge = repo.commit_by_id(repo.head_tip().unwrap()).unwrap();
        assert!(merge.is_merge());
        assert_eq!(merge.message, "Merge branch 'feature' into main");
        assert_eq!(merge.files["README.md"], "# Demo");
        assert!(!merge.files.contains_key("feature.txt"));

        let layout = repo.layout(&LayoutConfig::default());
        assert_eq!(layout.lanes.len(), 2);
        assert_eq!(layout.edges.iter().filter(|e| e.is_merge_edge).count(), 1);
    }
}
