//! Run-summary rendering: a human-readable block after the batch, and an
//! optional machine-readable JSON document for pipeline monitors.

use anyhow::Result;

use crate::synthesis::RunSummary;

/// Text block printed after a run; diagnostic noise here means the file
/// was produced but may warrant manual review.
pub fn summary_text(summary: &RunSummary) -> String {
    let mut out = String::from("Run summary\n");
    out.push_str(&format!("  Entities:         {}\n", summary.entities));
    out.push_str(&format!("  Masters written:  {}\n", summary.masters));
    out.push_str(&format!("  Children written: {}\n", summary.children));
    out.push_str(&format!("  Self-fallbacks:   {}\n", summary.self_fallbacks));
    out.push_str(&format!(
        "  Untranslated feature types: {}\n",
        summary.untranslated_types
    ));

    for (provider, stats) in &summary.provider_files {
        out.push_str(&format!(
            "  {}: {} lines, {} selected, {} indexed, {} skipped\n",
            provider, stats.lines, stats.selected, stats.indexed, stats.skipped
        ));
    }
    for (provider, misses) in &summary.index_misses {
        out.push_str(&format!("  {} index misses: {}\n", provider, misses));
    }
    if summary.total_skipped_lines() > 0 || summary.total_index_misses() > 0 {
        out.push_str(&format!(
            "  Review advised: {} skipped lines, {} index misses\n",
            summary.total_skipped_lines(),
            summary.total_index_misses()
        ));
    }
    out
}

pub fn summary_json(summary: &RunSummary) -> Result<String> {
    Ok(serde_json::to_string_pretty(summary)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::IndexStats;

    #[test]
    fn test_summary_text_lists_providers() {
        let mut summary = RunSummary {
            entities: 3,
            masters: 3,
            children: 5,
            self_fallbacks: 1,
            ..RunSummary::default()
        };
        summary.index_misses.insert("NCBI".to_string(), 2);
        summary.provider_files.insert(
            "ENSEMBL".to_string(),
            IndexStats {
                lines: 100,
                selected: 100,
                indexed: 98,
                skipped: 2,
            },
        );

        let text = summary_text(&summary);
        assert!(text.contains("Masters written:  3"));
        assert!(text.contains("ENSEMBL: 100 lines"));
        assert!(text.contains("NCBI index misses: 2"));
        assert!(text.contains("Review advised: 2 skipped lines, 2 index misses"));
    }

    #[test]
    fn test_clean_run_has_no_review_line() {
        let summary = RunSummary {
            entities: 1,
            masters: 1,
            children: 1,
            ..RunSummary::default()
        };
        assert!(!summary_text(&summary).contains("Review advised"));
    }

    #[test]
    fn test_summary_json_is_valid() {
        let summary = RunSummary::default();
        let json = summary_json(&summary).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["entities"], 0);
    }
}
