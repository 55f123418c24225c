//! In-process stand-ins for every port: used by the `fake` / `memory` backends
//! and by the test suites.

mod clock_manual;
mod code_deliverer_log;
mod identity_resolver_fake;
mod password_mutator_fake;
mod registry_reader_fake;
mod ttl_store_memory;

pub use clock_manual::*;
pub use code_deliverer_log::*;
pub use identity_resolver_fake::*;
pub use password_mutator_fake::*;
pub use registry_reader_fake::*;
pub use ttl_store_memory::*;
