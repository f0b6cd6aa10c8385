//! Identity Management Domain
//!
//! This crate manages all identity records of the coverage platform
//! (interactive users, enrolment officers, claim administrators), unified
//! under a single account abstraction with history-preserving updates.
//!
//! # Record Model
//!
//! An [`Account`] is the top-level identity and owns optional one-to-one
//! links to three kinds of versioned profile:
//!
//! - **InteractiveUser**: a person signing in to the web application
//! - **Officer**: field staff enrolling insurees
//! - **ClaimAdmin**: claim-module staff, resolved by kind name at runtime
//!
//! Profiles are never updated in place: a revision archives a closed
//! snapshot of the current version and continues the same logical entity
//! with a fresh validity start, so the full field history stays queryable.
//! Many-valued associations (roles, districts, villages) are reconciled to
//! the most recently requested set, with replaced links kept as expired
//! rows.
//!
//! # Examples
//!
//! ```rust,ignore
//! use std::sync::Arc;
//!
//! use core_kernel::{KindRegistry, SystemClock, UserId};
//! use domain_identity::{FieldData, ProfileLinks, UserService};
//!
//! let service = UserService::new(store, Arc::new(KindRegistry::with_core_kinds()), Arc::new(SystemClock))?;
//!
//! let (officer, created) = service
//!     .upsert_officer(None, &data, audit_user_id, false)
//!     .await?;
//! let (account, _) = service
//!     .link_account(None, "EO0042", ProfileLinks::none().with_officer(officer.id))
//!     .await?;
//! ```

pub mod account;
pub mod profile;
pub mod assignment;
pub mod fields;
pub mod services;
pub mod error;
pub mod ports;

pub use account::{Account, ProfileLinks};
pub use profile::{
    ClaimAdmin, InteractiveUser, Officer, ProfileKind, Versioned, LOCKED_PASSWORD,
};
pub use assignment::{Assignment, AssignmentKind, AssignmentOwner, AssignmentTarget};
pub use fields::{
    FieldCatalog, FieldData, FieldMap, FieldMapping, PASSWORD_KEY, ROLES_KEY, VILLAGES_KEY,
};
pub use services::UserService;
pub use error::IdentityError;
pub use ports::IdentityStore;
#[cfg(any(test, feature = "mock"))]
pub use ports::mock::MemoryIdentityStore;
