//! # campaign-rewards
//!
//! Reward accounting for a restaurant/influencer marketing marketplace.
//!
//! Restaurants publish campaigns or send private invitations, each carrying
//! a reward rule ("pay `reward_amount` per `reward_views` views").
//! Influencers submit content against them, and an administrator records
//! performance snapshots that recompute a submission's earnings:
//!
//! ```text
//! earnings = (views / reward_views) * reward_amount
//! ```
//!
//! Each snapshot is appended to the submission's history, and the
//! submission's cached `views`/`likes`/`earnings` are overwritten with the
//! latest values. They are never summed.
//!
//! ## Architecture
//!
//! ```text
//! Operator CLI (main.rs)
//!     │
//!     ├── RewardService (service/)
//!     │
//!     ├── Domain: rules, submissions, calculator (domain/)
//!     │
//!     └── Storage trait (persistence/)
//!           ├── InMemoryStorage
//!           └── PostgresStorage
//! ```

pub mod config;
pub mod domain;
pub mod error;
pub mod persistence;
pub mod service;
pub mod telemetry;
