mod identity_resolver_mysql;
mod password_hasher_argon2;
mod password_mutator_mysql;
mod registry_reader_mysql;

pub use identity_resolver_mysql::*;
pub use password_hasher_argon2::*;
pub use password_mutator_mysql::*;
pub use registry_reader_mysql::*;
