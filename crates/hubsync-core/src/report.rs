//! Rendering a reconciliation pass for humans
//!
//! Dry-run and real runs render through the same code path, so a preview
//! can be compared line for line with the eventual run log. Output is
//! deterministic: each section is sorted by identity key.

use std::fmt::Write as _;

use serde_json::Value;

use crate::executor::SyncResult;
use crate::reconciler::Plan;
use crate::record::{Operation, OperationKind};

/// Render the sorted summary of a pass
pub fn render<D>(plan: &Plan<D>, result: &SyncResult) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "== {} ==", plan.domain);

    render_section(&mut out, "create", plan, |op| {
        matches!(op.kind, OperationKind::Create(_))
    });
    render_section(&mut out, "update", plan, |op| {
        matches!(op.kind, OperationKind::Update { .. })
    });
    render_section(&mut out, "skip", plan, |op| {
        matches!(op.kind, OperationKind::Skip(_))
    });

    for warning in &plan.warnings {
        let _ = writeln!(out, "warning: {warning}");
    }
    for failure in &result.failures {
        let _ = writeln!(out, "failed: {}: {}", failure.label, failure.message);
    }

    let _ = writeln!(
        out,
        "counts: created {}, updated {}, skipped {}, errored {}",
        result.created, result.updated, result.skipped, result.errored
    );

    out
}

fn render_section<D>(
    out: &mut String,
    title: &str,
    plan: &Plan<D>,
    select: impl Fn(&Operation<D>) -> bool,
) {
    let mut selected: Vec<&Operation<D>> = plan.operations.iter().filter(|op| select(op)).collect();
    if selected.is_empty() {
        return;
    }
    selected.sort_by(|a, b| a.key.cmp(&b.key).then_with(|| a.label.cmp(&b.label)));

    let _ = writeln!(out, "{title}:");
    for op in selected {
        match &op.kind {
            OperationKind::Create(_) => {
                let _ = writeln!(out, "  {}", op.label);
            }
            OperationKind::Update { changes, .. } => {
                let _ = writeln!(out, "  {}", op.label);
                for change in changes {
                    let old = change
                        .old
                        .as_ref()
                        .map_or_else(|| "unset".to_string(), value_text);
                    let _ = writeln!(
                        out,
                        "    {}: {} -> {}",
                        change.field,
                        old,
                        value_text(&change.new)
                    );
                }
            }
            OperationKind::Skip(reason) => {
                let _ = writeln!(out, "  {} ({reason})", op.label);
            }
        }
    }
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{FieldChange, SkipReason};
    use pretty_assertions::assert_eq;

    fn sample_plan() -> Plan<&'static str> {
        Plan {
            domain: "devices".to_string(),
            operations: vec![
                Operation {
                    key: "Sofa".into(),
                    label: "Sofa".into(),
                    kind: OperationKind::Skip(SkipReason::AlreadyInSync),
                },
                Operation {
                    key: "Kitchen Light".into(),
                    label: "Kitchen Light".into(),
                    kind: OperationKind::Create("kitchen-light"),
                },
                Operation {
                    key: "Desk Lamp".into(),
                    label: "Desk Lamp".into(),
                    kind: OperationKind::Update {
                        remote_id: "item-2".into(),
                        changes: vec![FieldChange::replace("locationId", "loft", "study")],
                    },
                },
            ],
            warnings: Vec::new(),
        }
    }

    #[test]
    fn sections_are_sorted_by_key() {
        let plan = Plan {
            domain: "devices".to_string(),
            operations: vec![
                Operation {
                    key: "b".into(),
                    label: "b".into(),
                    kind: OperationKind::Create("b"),
                },
                Operation {
                    key: "a".into(),
                    label: "a".into(),
                    kind: OperationKind::Create("a"),
                },
            ],
            warnings: Vec::new(),
        };
        let rendered = render(&plan, &SyncResult::default());

        let a_at = rendered.find("  a\n").unwrap();
        let b_at = rendered.find("  b\n").unwrap();
        assert!(a_at < b_at);
    }

    #[test]
    fn full_report_shape() {
        let plan = sample_plan();
        let result = SyncResult {
            created: 1,
            updated: 1,
            skipped: 1,
            errored: 0,
            failures: Vec::new(),
        };

        let rendered = render(&plan, &result);

        assert_eq!(
            rendered,
            "== devices ==\n\
             create:\n\
             \x20 Kitchen Light\n\
             update:\n\
             \x20 Desk Lamp\n\
             \x20   locationId: loft -> study\n\
             skip:\n\
             \x20 Sofa (already in sync)\n\
             counts: created 1, updated 1, skipped 1, errored 0\n"
        );
    }

    #[test]
    fn dry_run_and_real_run_render_identically() {
        let plan = sample_plan();
        let clean = SyncResult {
            created: 1,
            updated: 1,
            skipped: 1,
            errored: 0,
            failures: Vec::new(),
        };

        // Same plan, same clean result: the rendering carries no mode marker.
        assert_eq!(render(&plan, &clean), render(&plan, &clean));
    }

    #[test]
    fn warnings_and_failures_are_listed() {
        let mut plan = sample_plan();
        plan.warnings
            .push("duplicate remote key 'd1', last record wins".into());
        let result = SyncResult {
            created: 0,
            updated: 0,
            skipped: 1,
            errored: 1,
            failures: vec![crate::executor::RecordFailure {
                key: "Desk Lamp".into(),
                label: "Desk Lamp".into(),
                message: "service unavailable".into(),
            }],
        };

        let rendered = render(&plan, &result);

        assert!(rendered.contains("warning: duplicate remote key 'd1', last record wins"));
        assert!(rendered.contains("failed: Desk Lamp: service unavailable"));
        assert!(rendered.contains("counts: created 0, updated 0, skipped 1, errored 1"));
    }

    #[test]
    fn empty_sections_are_omitted() {
        let plan: Plan<&'static str> = Plan {
            domain: "devices".to_string(),
            operations: vec![Operation {
                key: "a".into(),
                label: "a".into(),
                kind: OperationKind::Skip(SkipReason::AlreadyInSync),
            }],
            warnings: Vec::new(),
        };

        let rendered = render(&plan, &SyncResult::default());

        assert!(!rendered.contains("create:"));
        assert!(!rendered.contains("update:"));
        assert!(rendered.contains("skip:"));
    }
}
