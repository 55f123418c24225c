// store

mod clock;
mod ttl_store;

pub use clock::*;
pub use ttl_store::*;

// collaborators

mod code_deliverer;
mod credential_hasher;
mod identity_resolver;
mod message_dispatcher;
mod password_mutator;
mod registry_reader;

pub use code_deliverer::*;
pub use credential_hasher::*;
pub use identity_resolver::*;
pub use message_dispatcher::*;
pub use password_mutator::*;
pub use registry_reader::*;
