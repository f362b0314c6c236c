//! Provider-facing descriptors (data) and strategies (behavior).
//!
//! [`ProviderDescriptor`] holds the validated token endpoint and Web API base plus the
//! client authentication preference. [`ProviderStrategy`] turns a refused refresh
//! exchange ([`TokenFailure`]) into one of the relay's error kinds.

pub mod descriptor;
pub mod strategy;

pub use descriptor::*;
pub use strategy::*;
