//! End-to-end reconciliation scenarios across core and adapters
//!
//! Exercises the full pipeline (scope filter, matcher, diff, executor,
//! reporter) against an in-memory inventory tracker and the shipped
//! domain adapters.

use std::collections::HashMap;

use pretty_assertions::assert_eq;
use serde_json::Value;

use hubsync_adapters::{
    ConfigDocument, DeviceSync, DocumentKind, DocumentSync, HubDevice, InventoryItem,
    ListeningRecord, ProgressSync, ShelfItem,
};
use hubsync_core::{
    ApplyMode, FieldChange, OperationKind, Plan, Reconciler, RecordWriter, RemoteId, SkipReason,
    SyncResult, WriteError, apply, render,
};

/// Writer for passes that are expected to plan no writes
struct NoopWriter;

impl<D> RecordWriter<D> for NoopWriter {
    fn create(&mut self, _desired: &D) -> Result<(), WriteError> {
        Err(WriteError::new("unexpected create"))
    }

    fn update(&mut self, _remote_id: &RemoteId, _changes: &[FieldChange]) -> Result<(), WriteError> {
        Err(WriteError::new("unexpected update"))
    }
}

/// In-memory stand-in for the inventory tracker
#[derive(Debug, Clone, Default)]
struct MemoryTracker {
    items: Vec<InventoryItem>,
    fail_on: Vec<String>,
    next_id: usize,
}

impl MemoryTracker {
    fn with_items(items: Vec<InventoryItem>) -> Self {
        Self {
            items,
            ..Self::default()
        }
    }
}

impl RecordWriter<HubDevice> for MemoryTracker {
    fn create(&mut self, device: &HubDevice) -> Result<(), WriteError> {
        let name = device.display_name().to_string();
        if self.fail_on.contains(&name) {
            return Err(WriteError::new("tracker rejected the create"));
        }
        self.next_id += 1;
        self.items.push(InventoryItem {
            id: format!("item-{}", self.next_id),
            name,
            quantity: 1,
            location_id: None,
            manufacturer: device.manufacturer.clone().unwrap_or_default(),
            model: device.model.clone().unwrap_or_default(),
            description: device.description(),
            notes: device.notes(),
        });
        Ok(())
    }

    fn update(&mut self, remote_id: &RemoteId, changes: &[FieldChange]) -> Result<(), WriteError> {
        let item = self
            .items
            .iter_mut()
            .find(|item| &item.id == remote_id)
            .ok_or_else(|| WriteError::new(format!("no item {remote_id}")))?;
        if self.fail_on.contains(&item.name) {
            return Err(WriteError::new("tracker rejected the update"));
        }
        for change in changes {
            match (change.field.as_str(), &change.new) {
                ("location_id", Value::String(v)) => item.location_id = Some(v.clone()),
                ("location_id", Value::Null) => item.location_id = None,
                ("description", Value::String(v)) => item.description = v.clone(),
                ("manufacturer", Value::String(v)) => item.manufacturer = v.clone(),
                ("model", Value::String(v)) => item.model = v.clone(),
                ("notes", Value::String(v)) => item.notes = v.clone(),
                ("quantity", Value::Number(v)) => item.quantity = v.as_i64().unwrap_or(0),
                (field, value) => {
                    return Err(WriteError::new(format!("unknown field {field}={value}")));
                }
            }
        }
        Ok(())
    }
}

fn device(name: &str, area: Option<&str>) -> HubDevice {
    HubDevice {
        id: format!("dev-{}", name.to_lowercase()),
        name: Some(name.to_string()),
        name_by_user: None,
        manufacturer: Some("Acme".to_string()),
        model: Some("M-1".to_string()),
        area_id: area.map(String::from),
        labels: Vec::new(),
        disabled_by: None,
    }
}

fn listening(asin: &str, pct: f64, finished: bool) -> ListeningRecord {
    ListeningRecord {
        asin: asin.to_string(),
        title: format!("Book {asin}"),
        percent_complete: pct,
        is_finished: finished,
    }
}

fn shelf_item(asin: &str, progress: f64, finished: bool) -> ShelfItem {
    ShelfItem {
        id: format!("li-{asin}"),
        asin: asin.to_string(),
        title: format!("Book {asin}"),
        progress,
        current_time: progress * 3600.0,
        duration: 3600.0,
        is_finished: finished,
    }
}

fn plan_devices(
    mapping: HashMap<String, String>,
    desired: &[HubDevice],
    remote: &[InventoryItem],
) -> Plan<HubDevice> {
    Reconciler::new(DeviceSync::new(mapping)).plan(desired, remote)
}

#[test]
fn finished_flag_mismatch_updates_the_flag() {
    let plan = Reconciler::new(ProgressSync).plan(
        &[listening("s1", 0.0, true)],
        &[shelf_item("s1", 1.0, false)],
    );

    assert_eq!(plan.operations.len(), 1);
    match &plan.operations[0].kind {
        OperationKind::Update { changes, .. } => {
            assert_eq!(changes.len(), 1);
            assert_eq!(changes[0].field, "is_finished");
            assert_eq!(changes[0].new, Value::from(true));
        }
        other => panic!("expected update, got {other:?}"),
    }
}

#[test]
fn threshold_progress_coalesces_to_finished() {
    let plan = Reconciler::new(ProgressSync).plan(
        &[listening("B001", 97.0, false)],
        &[shelf_item("B001", 0.1, false)],
    );

    match &plan.operations[0].kind {
        OperationKind::Update { changes, .. } => {
            let finished = changes.iter().find(|c| c.field == "is_finished").unwrap();
            assert_eq!(finished.new, Value::from(true));
            let progress = changes.iter().find(|c| c.field == "progress").unwrap();
            assert_eq!(progress.new, Value::from(1.0));
        }
        other => panic!("expected update, got {other:?}"),
    }
}

#[test]
fn absent_automation_is_reported_and_counts_as_unmatched() {
    let desired = ConfigDocument::from_yaml(DocumentKind::Automation, "id: a1\nalias: Wakeup\n")
        .unwrap();
    let remote = ConfigDocument::from_yaml(DocumentKind::Automation, "id: a2\nalias: Other\n")
        .unwrap();

    let plan =
        Reconciler::new(DocumentSync::new(DocumentKind::Automation)).plan(&[desired], &[remote]);

    assert_eq!(
        plan.operations[0].skip_reason(),
        Some(SkipReason::NotFoundOnRemote)
    );
    assert_eq!(plan.unmatched(), 1);
}

#[test]
fn identical_records_skip_twice_with_identical_results() {
    let reconciler = Reconciler::new(ProgressSync);
    let desired = vec![listening("B001", 100.0, true)];
    let remote = vec![shelf_item("B001", 1.0, true)];

    let mut counts = Vec::new();
    for _ in 0..2 {
        let plan = reconciler.plan(&desired, &remote);
        // The plan is all skips; a skip never reaches the writer.
        let result = apply(&plan.operations, &mut NoopWriter, ApplyMode::Apply);
        assert_eq!(
            plan.operations[0].skip_reason(),
            Some(SkipReason::AlreadyInSync)
        );
        counts.push((result.created, result.updated, result.skipped, result.errored));
    }
    assert_eq!(counts[0], counts[1]);
    assert_eq!(counts[0], (0, 0, 1, 0));
}

#[test]
fn duplicate_remote_keys_warn_and_the_last_wins() {
    let devices = vec![device("Desk Lamp", None)];
    let remote = vec![
        InventoryItem {
            id: "item-1".to_string(),
            name: "Desk Lamp".to_string(),
            quantity: 1,
            location_id: Some("loc-old".to_string()),
            manufacturer: String::new(),
            model: String::new(),
            description: String::new(),
            notes: String::new(),
        },
        InventoryItem {
            id: "item-2".to_string(),
            name: "Desk Lamp".to_string(),
            quantity: 1,
            location_id: Some("loc-study".to_string()),
            manufacturer: String::new(),
            model: String::new(),
            description: String::new(),
            notes: String::new(),
        },
    ];
    let mapping = HashMap::from([("study".to_string(), "loc-study".to_string())]);

    let plan = plan_devices(mapping, &devices, &remote);

    assert_eq!(plan.warnings.len(), 1);
    assert!(plan.warnings[0].contains("Desk Lamp"));
    // The update targets the last record seen, which is already in place.
    assert_eq!(
        plan.operations[0].skip_reason(),
        Some(SkipReason::AlreadyInSync)
    );
}

#[test]
fn device_pass_is_idempotent_against_the_tracker() {
    let desired = vec![
        device("Toaster", None),
        device("Desk Lamp", None),
        device("Heater", None),
    ];
    let mut tracker = MemoryTracker::with_items(vec![InventoryItem {
        id: "item-0".to_string(),
        name: "Heater".to_string(),
        quantity: 0,
        location_id: None,
        manufacturer: String::new(),
        model: String::new(),
        description: String::new(),
        notes: String::new(),
    }]);

    let first = plan_devices(HashMap::new(), &desired, &tracker.items.clone());
    let result = apply(&first.operations, &mut tracker, ApplyMode::Apply);
    assert_eq!(result.created, 2);
    assert_eq!(result.updated, 1);
    assert!(result.is_clean());

    let second = plan_devices(HashMap::new(), &desired, &tracker.items.clone());
    assert!(
        second
            .operations
            .iter()
            .all(|op| op.skip_reason() == Some(SkipReason::AlreadyInSync)),
        "second pass should only skip, got {:?}",
        second.operations
    );
}

#[test]
fn a_failing_write_does_not_stop_the_batch() {
    let desired = vec![
        device("Alpha", None),
        device("Beta", None),
        device("Gamma", None),
    ];
    let mut tracker = MemoryTracker {
        fail_on: vec!["Beta".to_string()],
        ..MemoryTracker::default()
    };

    let plan = plan_devices(HashMap::new(), &desired, &[]);
    let result = apply(&plan.operations, &mut tracker, ApplyMode::Apply);

    assert_eq!(result.created, 2);
    assert_eq!(result.errored, 1);
    assert_eq!(result.failures.len(), 1);
    assert_eq!(result.failures[0].key, "Beta");
    let names: Vec<&str> = tracker.items.iter().map(|i| i.name.as_str()).collect();
    assert_eq!(names, vec!["Alpha", "Gamma"]);
}

#[test]
fn dry_run_produces_the_same_operations_as_the_real_run() {
    let desired = vec![device("Toaster", None), device("Desk Lamp", None)];
    let remote = vec![InventoryItem {
        id: "item-1".to_string(),
        name: "Desk Lamp".to_string(),
        quantity: 0,
        location_id: None,
        manufacturer: String::new(),
        model: String::new(),
        description: String::new(),
        notes: String::new(),
    }];

    let plan_a = plan_devices(HashMap::new(), &desired, &remote);
    let plan_b = plan_devices(HashMap::new(), &desired, &remote);

    let mut untouched = MemoryTracker::with_items(remote.clone());
    let dry = apply(&plan_a.operations, &mut untouched, ApplyMode::DryRun);
    assert_eq!(untouched.items, remote);

    let mut tracker = MemoryTracker::with_items(remote);
    let real = apply(&plan_b.operations, &mut tracker, ApplyMode::Apply);

    assert_eq!(plan_a.operations, plan_b.operations);
    assert_eq!(
        (dry.created, dry.updated, dry.skipped),
        (real.created, real.updated, real.skipped)
    );
}

#[test]
fn reports_render_identically_for_preview_and_run() {
    let desired = vec![device("Toaster", None)];
    let plan = plan_devices(HashMap::new(), &desired, &[]);

    let clean = SyncResult {
        created: 1,
        updated: 0,
        skipped: 0,
        errored: 0,
        failures: Vec::new(),
    };

    let preview = render(&plan, &clean);
    let real = render(&plan, &clean);
    assert_eq!(preview, real);
    assert!(preview.contains("== devices =="));
    assert!(preview.contains("counts: created 1, updated 0, skipped 0, errored 0"));
}
