//! Per-domain adapters for the hubsync reconciliation engine
//!
//! Each module pairs a desired record type with a remote record type and
//! implements [`hubsync_core::Domain`] for them:
//!
//! - [`location`]: hub areas to tracker locations (existence only)
//! - [`device`]: hub devices to tracker inventory items
//! - [`audiobook`]: seller listening progress to the audiobook server
//! - [`exposure`]: assistant exposure flags on the entity registry
//! - [`homekit`]: HomeKit bridge filter lists
//! - [`document`]: scenes and automations, unified behind one adapter
//!
//! Adapters carry field knowledge only. Snapshots, writers and command
//! plumbing live with the caller.

pub mod audiobook;
pub mod device;
pub mod document;
pub mod error;
pub mod exposure;
pub mod homekit;
pub mod location;

pub use audiobook::{ListeningRecord, ProgressSync, ShelfItem};
pub use device::{DeviceSync, HubDevice, InventoryItem};
pub use document::{ConfigDocument, DocumentKind, DocumentSync};
pub use error::{Error, Result};
pub use exposure::{
    DEFAULT_MANAGED_DOMAINS, ExposureConfig, ExposureSetting, ExposureSync, RegistryEntry,
};
pub use homekit::{BRIDGE_KEY, BridgeEntry, BridgeFilter, HomekitSync};
pub use location::{HubArea, Location, LocationSync};
