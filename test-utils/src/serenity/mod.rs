//! Test fixtures for Serenity API objects.
//!
//! Objects are built by deserializing JSON shaped like Discord's API responses,
//! so they are valid Serenity structs without a gateway connection.
//!
//! ```rust,ignore
//! use test_utils::serenity::{create_test_role, create_test_user};
//!
//! let moderator = create_test_role(111111111, "Moderator", 0xFF0000, 10);
//! let bot = create_test_user(222222222, "warden", true);
//! ```

pub mod role;
pub mod user;

pub use role::{create_managed_role, create_test_role};
pub use user::create_test_user;
