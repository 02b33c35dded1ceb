//! # metered-core
//!
//! Domain pieces of the metered-billing demo that need no outbound I/O.
//!
//! ```text
//! ┌──────────────┐   ┌──────────────┐   ┌──────────────────┐
//! │   identity   │   │     user     │   │    conversion    │
//! │ (demo rules) │   │ (keyed store)│   │ (billed feature) │
//! └──────────────┘   └──────────────┘   └──────────────────┘
//!          │                 │
//!          └──────┬──────────┘
//!                 ▼
//!           ┌───────────┐
//!           │   OrgId   │  user id → billing account
//!           └───────────┘
//! ```

pub mod conversion;
pub mod error;
pub mod identity;
pub mod org;
pub mod user;

pub use conversion::{Conversion, Temperature};
pub use error::{CoreError, Result};
pub use identity::{NewUserErrors, validate_credentials, validate_new_user, validate_username};
pub use org::OrgId;
pub use user::{CreateOutcome, MemoryUserStore, User, UserStore};
