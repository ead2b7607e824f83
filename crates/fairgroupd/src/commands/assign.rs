use std::fmt::Write as _;
use std::path::Path;

use fairgroup_core::{FairGroupConfig, GroupSummary};
use fairgroup_partition::{Balancer, PartitionError, Roster, assign};
use tracing::info;

pub fn run(config: &FairGroupConfig, file: &Path, groups: i64, format: &str) -> anyhow::Result<()> {
    let body = std::fs::read_to_string(file)?;
    info!(path = %file.display(), groups, "assigning roster from file");
    print!("{}", render(config, &body, groups, format)?);
    Ok(())
}

/// Assign the CSV roster in `body` and render it as `text` or `json`.
pub fn render(config: &FairGroupConfig, body: &str, groups: i64, format: &str) -> anyhow::Result<String> {
    let records = fairgroup_api::roster_csv::parse_records(body)?;
    let mut roster = Roster::with_range(config.grade_range());
    let summary = roster.extend_records(records);
    if summary.rejected > 0 || summary.duplicates > 0 {
        info!(
            rejected = summary.rejected,
            duplicates = summary.duplicates,
            "some records were not added"
        );
    }

    let k = usize::try_from(groups).map_err(|_| PartitionError::InvalidGroupCount {
        requested: groups,
        available: roster.len(),
    })?;
    let assignment = assign(&roster, k, &Balancer::new(config.max_rounds()))?;

    match format {
        "json" => Ok(serde_json::to_string_pretty(&assignment.groups)? + "\n"),
        _ => Ok(format_groups(&assignment.groups)),
    }
}

pub fn format_groups(groups: &[GroupSummary]) -> String {
    let mut out = String::new();
    for group in groups {
        let _ = writeln!(
            out,
            "Group {} (average {:.1}, {} members)",
            group.group_number,
            group.average_grade,
            group.students.len()
        );
        for student in &group.students {
            let _ = writeln!(out, "  {:<24} {:.1}", student.name, student.grade);
        }
    }
    out
}
