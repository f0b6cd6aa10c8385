//! Versioned identity profiles
//!
//! This module defines the three profile records that can hang off an
//! account: interactive users (people who log in to the web application),
//! enrolment officers (field staff), and claim administrators (defined by
//! the claim module, resolved by kind name at runtime).
//!
//! # Versioning
//!
//! Profiles are never updated in place. Each row carries a [`ValidPeriod`];
//! an open end marks the current version of the logical entity. A revision
//! closes a snapshot of the current row into history and continues the same
//! row as current from the revision instant, so history rows are
//! non-overlapping and ordered by validity start.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use validator::Validate;

use core_kernel::{
    ClaimAdminId, HealthFacilityId, InteractiveUserId, LanguageId, OfficerId, RoleId,
    TemporalError, UserId, ValidPeriod,
};

/// Sentinel stored when an interactive user is created without a password.
///
/// The value can never match a real hash, so the login stays unusable until
/// a password is set through the authentication layer.
pub const LOCKED_PASSWORD: &str = "locked";

/// The kind of a versioned profile record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileKind {
    InteractiveUser,
    Officer,
    ClaimAdmin,
}

impl ProfileKind {
    /// The kind name used for registry resolution
    pub fn kind_name(&self) -> &'static str {
        match self {
            ProfileKind::InteractiveUser => "interactive_user",
            ProfileKind::Officer => "officer",
            ProfileKind::ClaimAdmin => "claim_admin",
        }
    }
}

impl fmt::Display for ProfileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.kind_name())
    }
}

/// Common behaviour of history-preserving records
///
/// `close_version` implements copy-on-close: the returned snapshot is the
/// superseded version (validity closed at the revision instant) and must be
/// archived by the caller, while `self` continues as the current version
/// with its validity restarted at that instant.
pub trait Versioned: Clone {
    /// The validity period of this version
    fn validity(&self) -> &ValidPeriod;

    /// Mutable access to the validity period
    fn validity_mut(&mut self) -> &mut ValidPeriod;

    /// Returns true if this row is the current version
    fn is_current(&self) -> bool {
        self.validity().is_current()
    }

    /// Closes the current version into a history snapshot
    fn close_version(&mut self, at: DateTime<Utc>) -> Result<Self, TemporalError> {
        let mut snapshot = self.clone();
        snapshot.validity_mut().close_at(at)?;
        *self.validity_mut() = ValidPeriod::from(at);
        Ok(snapshot)
    }
}

/// An interactive user profile
///
/// Interactive users are the people who sign in to the web application.
/// The login name is unique among currently-valid rows; the full role set
/// lives in role assignments, with `role_id` keeping the first requested
/// role for the legacy reports that expect a single role column.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct InteractiveUser {
    /// Unique row identifier
    pub id: InteractiveUserId,
    /// Login identifier, unique among current rows
    pub login_name: String,
    /// Given names
    pub other_names: Option<String>,
    /// Surname
    pub last_name: Option<String>,
    /// Contact phone number
    pub phone: Option<String>,
    /// Contact email address
    #[validate(email)]
    pub email: Option<String>,
    /// Preferred language
    pub language_id: Option<LanguageId>,
    /// Health facility the user works at
    pub health_facility_id: Option<HealthFacilityId>,
    /// First requested role, denormalised from the role assignments
    pub role_id: RoleId,
    /// Whether the profile is associated with an external login
    pub is_associated: bool,
    /// Password hash, or [`LOCKED_PASSWORD`] when none was ever provided
    pub stored_password: String,
    /// The acting user who wrote this version
    pub audit_user_id: UserId,
    /// Validity period of this version
    pub validity: ValidPeriod,
}

impl Versioned for InteractiveUser {
    fn validity(&self) -> &ValidPeriod {
        &self.validity
    }

    fn validity_mut(&mut self) -> &mut ValidPeriod {
        &mut self.validity
    }
}

impl InteractiveUser {
    /// Creates a new current profile
    pub fn new(login_name: impl Into<String>, role_id: RoleId, audit_user_id: UserId, now: DateTime<Utc>) -> Self {
        Self {
            id: InteractiveUserId::new_v7(),
            login_name: login_name.into(),
            other_names: None,
            last_name: None,
            phone: None,
            email: None,
            language_id: None,
            health_facility_id: None,
            role_id,
            is_associated: false,
            stored_password: LOCKED_PASSWORD.to_string(),
            audit_user_id,
            validity: ValidPeriod::from(now),
        }
    }

    /// Stores a password hash verbatim
    ///
    /// Hashing happens in the authentication layer; this core only persists
    /// the result.
    pub fn set_password_hash(&mut self, hash: impl Into<String>) {
        self.stored_password = hash.into();
    }

    /// Returns true if no usable password was ever stored
    pub fn is_locked(&self) -> bool {
        self.stored_password == LOCKED_PASSWORD
    }
}

/// An enrolment officer profile
///
/// Officers enrol insurees in the field. Their `code` plays the role the
/// login name plays for interactive users.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct Officer {
    pub id: OfficerId,
    /// Officer code, unique among current rows
    pub code: String,
    pub other_names: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    pub dob: Option<NaiveDate>,
    pub address: Option<String>,
    /// End of the officer's appointment, if bounded
    pub works_to: Option<DateTime<Utc>>,
    /// Location the officer operates from
    pub location_id: Option<HealthFacilityId>,
    /// Officer substituting for this one, if any
    pub substitution_officer_id: Option<OfficerId>,
    /// Whether the officer has an application login
    pub has_login: bool,
    pub audit_user_id: UserId,
    pub validity: ValidPeriod,
}

impl Versioned for Officer {
    fn validity(&self) -> &ValidPeriod {
        &self.validity
    }

    fn validity_mut(&mut self) -> &mut ValidPeriod {
        &mut self.validity
    }
}

impl Officer {
    /// Creates a new current profile
    pub fn new(code: impl Into<String>, audit_user_id: UserId, now: DateTime<Utc>) -> Self {
        Self {
            id: OfficerId::new_v7(),
            code: code.into(),
            other_names: None,
            last_name: None,
            phone: None,
            email: None,
            dob: None,
            address: None,
            works_to: None,
            location_id: None,
            substitution_officer_id: None,
            has_login: false,
            audit_user_id,
            validity: ValidPeriod::from(now),
        }
    }
}

/// A claim administrator profile
///
/// Claim admins belong to the claim module; the core resolves the kind at
/// runtime and fails with an unsupported-kind error when the module is not
/// part of the deployment.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ClaimAdmin {
    pub id: ClaimAdminId,
    /// Claim admin code, unique among current rows
    pub code: String,
    pub other_names: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    #[validate(email)]
    pub email_id: Option<String>,
    pub dob: Option<NaiveDate>,
    pub health_facility_id: Option<HealthFacilityId>,
    pub has_login: bool,
    pub audit_user_id: UserId,
    pub validity: ValidPeriod,
}

impl Versioned for ClaimAdmin {
    fn validity(&self) -> &ValidPeriod {
        &self.validity
    }

    fn validity_mut(&mut self) -> &mut ValidPeriod {
        &mut self.validity
    }
}

impl ClaimAdmin {
    /// Creates a new current profile
    pub fn new(code: impl Into<String>, audit_user_id: UserId, now: DateTime<Utc>) -> Self {
        Self {
            id: ClaimAdminId::new_v7(),
            code: code.into(),
            other_names: None,
            last_name: None,
            phone: None,
            email_id: None,
            dob: None,
            health_facility_id: None,
            has_login: false,
            audit_user_id,
            validity: ValidPeriod::from(now),
        }
    }
}
