//! Devices command: areas become locations, devices become inventory items

use std::path::Path;

use colored::Colorize;

use hubsync_adapters::{DeviceSync, HubArea, HubDevice, LocationSync};
use hubsync_core::{ApplyMode, DiffOptions, Reconciler, ScopeFilter, ScopeRules};

use super::finish;
use crate::error::Result;
use crate::snapshot::{ItemStore, LocationStore, SnapshotSource, load_json_records};

/// Run the devices command
///
/// Two passes against the tracker: areas to locations first, then
/// devices to inventory items placed in those locations.
#[allow(clippy::too_many_arguments)]
pub fn run_devices(
    devices: &Path,
    areas: &Path,
    items: &Path,
    locations: &Path,
    rules: Option<&Path>,
    dry_run: bool,
    force_update: bool,
) -> Result<()> {
    println!(
        "{} Syncing hub devices into the inventory tracker...",
        "=>".blue().bold()
    );

    let hub_devices: Vec<HubDevice> = load_json_records(devices)?;
    let hub_areas: Vec<HubArea> = load_json_records(areas)?;
    let mode = if dry_run {
        ApplyMode::DryRun
    } else {
        ApplyMode::Apply
    };

    // Pass 1: every named hub area gets a tracker location.
    let mut location_store = LocationStore::load(locations)?;
    let location_pass = Reconciler::new(LocationSync);
    let location_source =
        SnapshotSource::new(hub_areas.clone(), location_store.locations()?);
    let (location_plan, location_result) =
        location_pass.run(&location_source, &mut location_store, mode)?;
    finish(&location_plan, &location_result, dry_run, false)?;
    if !dry_run {
        location_store.save()?;
    }

    // Pass 2: devices land in the locations their areas map to.
    let mut mapping = LocationSync::area_mapping(&hub_areas, &location_store.locations()?);
    if dry_run {
        // Locations that would be created do not exist yet; map their
        // areas to placeholders so planned moves still show up.
        for area in hub_areas.iter().filter(|area| !area.name.is_empty()) {
            mapping
                .entry(area.area_id.clone())
                .or_insert_with(|| format!("pending-{}", area.area_id));
        }
    }

    let scope_rules = match rules {
        Some(path) => ScopeRules::load(path)?,
        None => ScopeRules::default(),
    };

    let mut item_store = ItemStore::load(items, mapping.clone())?;
    let device_pass = Reconciler::new(DeviceSync::new(mapping))
        .with_desired_filter(ScopeFilter::new(&scope_rules)?)
        .with_options(DiffOptions { force_update });
    let device_source = SnapshotSource::new(hub_devices, item_store.records()?);
    let (device_plan, device_result) = device_pass.run(&device_source, &mut item_store, mode)?;
    finish(&device_plan, &device_result, dry_run, false)?;
    if !dry_run {
        item_store.save()?;
    }

    Ok(())
}
