//! Hardware and network plumbing behind the device logic.

pub mod drivers;
pub mod tasks;
pub(crate) mod types;
