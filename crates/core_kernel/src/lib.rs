//! Core Kernel - Foundational types and utilities for the coverage platform
//!
//! This crate provides the fundamental building blocks used across all domain modules:
//! - Strongly-typed identifiers
//! - Validity periods for history-preserving records and the injected clock
//! - The profile-kind registry for modules loaded per deployment
//! - Common port error types for the hexagonal architecture seams

pub mod temporal;
pub mod identifiers;
pub mod error;
pub mod ports;
pub mod registry;

pub use temporal::{Clock, FixedClock, SystemClock, TemporalError, ValidPeriod};
pub use identifiers::{
    UserId, InteractiveUserId, OfficerId, ClaimAdminId,
    RoleId, DistrictId, VillageId, HealthFacilityId, LanguageId,
};
pub use error::CoreError;
pub use ports::{DomainPort, PortError};
pub use registry::{KindRegistration, KindRegistry};
