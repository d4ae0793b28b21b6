//! Client for the ZenTao test-management server
//!
//! [`ZentaoClient`] owns the HTTP session; [`CaseFetcher`] turns product,
//! module, suite and task selectors into fully populated [`TestCase`]s.

pub mod cases;
pub mod client;
pub mod form;
pub mod style;
pub mod types;

pub use cases::{CaseFetcher, CaseSelector};
pub use client::ZentaoClient;
pub use style::{RequestType, Session};
pub use types::{TestCase, TestStep};
