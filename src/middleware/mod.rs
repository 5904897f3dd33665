//! Gates evaluated before a command handler runs.
//!
//! `permission` answers "may this member do this" from the member's roles and
//! resolved permissions; `cooldown` answers "may this user run this command again
//! yet". Both are pure with respect to Discord and can be exercised in unit tests.

pub mod cooldown;
pub mod permission;
