//! Map synchronization for resmap
//!
//! - `widget`: the operations a map view must provide
//! - `sync`: style-load / push / click state machine
//! - `icons`: marker image loading
//! - `cluster`: pixel-radius point clustering
//! - `headless`: in-memory widget implementation

pub mod cluster;
pub mod headless;
pub mod icons;
pub mod sync;
pub mod widget;

pub use cluster::ClusterOptions;
pub use headless::{Camera, HeadlessMap, RenderedFeature};
pub use icons::{FsIconLoader, IconLoader};
pub use sync::{ClickOutcome, ClickedFeature, IconLoadReport, MapSync, PushOutcome, SyncState, SOURCE_ID};
pub use widget::{CameraTarget, LayerSpec, MapWidget, MarkerIcon};
