//! Store key names
//!
//! Every key the account code reads or writes is named here.

use forum_core::Uid;

/// Hash holding global counters
pub const GLOBAL: &str = "global";
/// Last allocated UID, a field of [`GLOBAL`]
pub const NEXT_UID_FIELD: &str = "nextUid";
/// Number of accounts, a field of [`GLOBAL`]
pub const USER_COUNT_FIELD: &str = "userCount";

/// Hash: userslug -> uid
pub const USERSLUG_INDEX: &str = "userslug:uid";
/// Hash: username -> uid
pub const USERNAME_INDEX: &str = "username:uid";
/// Hash: email -> uid
pub const EMAIL_INDEX: &str = "email:uid";

/// Ordered set of uids scored by join time in milliseconds
pub const USERS_JOINDATE: &str = "users:joindate";
/// Ordered set of uids scored by post count
pub const USERS_POSTCOUNT: &str = "users:postcount";
/// Ordered set of uids scored by reputation
pub const USERS_REPUTATION: &str = "users:reputation";

/// Ordered set of uids whose secondary entries need reconciliation
pub const USERS_REPAIR: &str = "users:repair";

/// Ordered set of confirmation codes awaiting delivery, scored by expiry
pub const EMAIL_PENDING: &str = "email:pending";

/// Record field marking whether the email address was confirmed
pub const EMAIL_CONFIRMED_FIELD: &str = "email:confirmed";
/// Record field holding the password hash
pub const PASSWORD_FIELD: &str = "password";
/// Group hash field counting members
pub const MEMBER_COUNT_FIELD: &str = "memberCount";

const USER_PREFIX: &str = "user:";
const CONFIRM_PREFIX: &str = "confirm:";
const GROUP_PREFIX: &str = "group:";

/// `user:<uid>`
pub fn user(uid: Uid) -> String {
    format!("{USER_PREFIX}{uid}")
}

/// `confirm:<code>`
pub fn confirm(code: &str) -> String {
    format!("{CONFIRM_PREFIX}{code}")
}

/// `group:<name>`
pub fn group(name: &str) -> String {
    format!("{GROUP_PREFIX}{name}")
}

/// `group:<name>:members`
pub fn group_members(name: &str) -> String {
    format!("{GROUP_PREFIX}{name}:members")
}
