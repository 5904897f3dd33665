//! Factory methods for creating test data.
//!
//! Each factory inserts a row with sensible defaults; builder setters override the
//! fields a test cares about.
//!
//! ```rust,ignore
//! use test_utils::factory;
//!
//! let giveaway = factory::giveaway::GiveawayFactory::new(&db)
//!     .winner_count(3)
//!     .active(false)
//!     .build()
//!     .await?;
//!
//! let racer = factory::racing_user::RacingUserFactory::new(&db, guild_id)
//!     .credits(50)
//!     .build()
//!     .await?;
//! ```

pub mod giveaway;
pub mod guild_settings;
pub mod helpers;
pub mod mod_log;
pub mod raid_action;
pub mod racing_user;

pub use giveaway::{create_entry, create_giveaway};
pub use racing_user::create_racing_user;
