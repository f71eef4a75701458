//! # Dataset Factory
//!
//! KITTI dataset assembly module.
//!
//! Responsibilities:
//! - Resolve a split of the `DatasetBlueprint` into ordered session ids
//! - Load each session (file discovery, timestamps, OXTS origin)
//! - Wire the KITTI decoder and build the `GlobalSequenceView`
//! - Fail the whole split on any bad session, never return a partial view

pub mod error;
pub mod factory;

pub use contracts::{DatasetBlueprint, SplitKind};
pub use error::{FactoryError, Result};
pub use factory::DatasetFactory;
