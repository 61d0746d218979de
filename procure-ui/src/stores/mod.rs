//! Load-once data stores
//!
//! Each store is the only writer of its state. Readers take snapshots.

pub mod dictionary;
pub mod metadata;

pub use dictionary::{CpvDictionary, DescriptionRecord, DictionaryStore};
pub use metadata::{MetadataLoadError, MetadataState, MetadataStore};
