mod credential;
mod key;
mod member;
mod operation;
mod password;
mod record;
mod token;

pub use credential::*;
pub use key::*;
pub use member::*;
pub use operation::*;
pub use password::*;
pub use record::*;
pub use token::*;
