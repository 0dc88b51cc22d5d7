//! Action-segmentation result viewer.
//!
//! Loads per-frame ground-truth/predicted labels and class catalogs once at
//! startup into a [`DatasetRegistry`], derives per-frame class-presence grids,
//! and serves them to a browser page over HTTP.
//!
//! SPDX-License-Identifier: GPL-3.0-or-later

pub mod backend;
pub mod config;
pub mod error;
pub mod frame;
pub mod logic;

pub use config::{DashboardConfig, ServerSettings};
pub use error::{LoadError, LookupError};
pub use frame::LabelRecord;
pub use logic::catalog::ClassCatalog;
pub use logic::presence::{LabelSource, MatchMode, PresenceGrid};
pub use logic::registry::{DatasetRegistry, LoadFailure, VideoEntry};
