//! Domain module for Salvage
//!
//! Documents stored in the hosted content platform and the ports used to read them.

/// Document identifiers and references
pub mod identifiers;

/// Blog categories
pub mod category;

/// Business documents: jobs, customers, metals, materials, processes
pub mod documents;

/// Read-only ports onto the content store
pub mod repository;

use serde::{Deserialize, Deserializer};

/// Query results carry explicit `null`s for missing fields and empty projections.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
