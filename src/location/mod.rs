//! Location sample acquisition.
//!
//! A `LocationSampler` holds one subscription to a `LocationProvider`,
//! turns every delivered fix into a `LocationSample` and hands it to the
//! single-writer append queue in arrival order.

pub mod distance;
pub mod fix;
pub mod provider;
pub mod sampler;

pub use distance::*;
pub use fix::*;
pub use provider::*;
pub use sampler::*;

pub use crate::storage::models::LocationSample;
