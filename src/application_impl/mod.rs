mod duration_policy;
mod message_dispatcher_fake;
mod message_dispatcher_impl;
mod passport_service_impl;
mod reg_token_store;
mod throttle_guard;
mod verification_record_store;

pub use duration_policy::*;
pub use message_dispatcher_fake::*;
pub use message_dispatcher_impl::*;
pub use passport_service_impl::*;
pub use reg_token_store::*;
pub use throttle_guard::*;
pub use verification_record_store::*;
