//! cordova-access - access-origin stage for Cordova build pipelines
//!
//! This crate implements a pipeline stage that adds, updates and removes
//! `<access origin="...">` declarations in a Cordova project's `config.xml`,
//! then hands the project item back downstream.

pub mod config;
pub mod reconcile;
pub mod request;
pub mod stage;

pub use config::{AccessManifest, EffectiveSettings, Settings, SettingsLayer};
pub use reconcile::{reconcile, OriginAction, OriginOutcome, ReconcileReport};
pub use request::{OriginRequest, OriginValue, RequestError};
pub use stage::{AccessError, AccessStage, ApplyReport, Processed, ProjectItem};

pub use cordova_config::{AccessEntry, ConfigXml, ConfigXmlError, Format, LineEnding};
