//! Socket messaging.
//!
//! [`comms`] is the platform-independent channel; [`socket`] binds it to the
//! browser and only exists in the `csr` build.

pub mod comms;
#[cfg(feature = "csr")]
pub mod socket;
