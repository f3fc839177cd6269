//! Value objects - immutable types identified by their value

mod uid;
mod userslug;

pub use uid::{Uid, UidParseError, BOOTSTRAP_UID};
pub use userslug::slugify;
