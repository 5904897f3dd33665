//! Warden Test Utils
//!
//! Shared testing utilities for the warden bot. Provides a builder for test contexts
//! backed by in-memory SQLite databases, factories that insert rows with sensible
//! defaults, and fixtures for Serenity objects.
//!
//! # Usage
//!
//! ```rust,ignore
//! use test_utils::builder::TestBuilder;
//! use entity::prelude::RacingUser;
//!
//! #[tokio::test]
//! async fn test_racing_profile() -> Result<(), TestError> {
//!     let test = TestBuilder::new()
//!         .with_table(RacingUser)
//!         .build()
//!         .await?;
//!
//!     let db = test.db.unwrap();
//!     // Perform database operations...
//!
//!     Ok(())
//! }
//! ```

pub mod builder;
pub mod context;
pub mod error;
pub mod factory;
pub mod serenity;
