//! Many-valued assignments attached to a profile
//!
//! Three parallel link tables hang off the versioned profiles: the roles of
//! an interactive user, the districts an interactive user may administer,
//! and the villages an officer enrols in. All three share one reconciliation
//! rule: the currently-valid target set of an (owner, kind) pair equals the
//! most recently requested set, with replaced targets kept in history as
//! expired rows.
//!
//! Row identity is (owner, target). Re-requesting a target that already has
//! a row reactivates that row instead of inserting a duplicate, so an
//! unchanged member keeps its original validity start.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use core_kernel::{DistrictId, InteractiveUserId, OfficerId, RoleId, ValidPeriod, VillageId};

/// The kind of an assignment link
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentKind {
    /// Interactive user → role
    UserRole,
    /// Interactive user → district
    UserDistrict,
    /// Officer → village
    OfficerVillage,
}

impl fmt::Display for AssignmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AssignmentKind::UserRole => "user_role",
            AssignmentKind::UserDistrict => "user_district",
            AssignmentKind::OfficerVillage => "officer_village",
        };
        f.write_str(name)
    }
}

/// The profile owning an assignment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssignmentOwner {
    InteractiveUser(InteractiveUserId),
    Officer(OfficerId),
}

impl AssignmentOwner {
    /// Returns true if this owner can hold assignments of the given kind
    pub fn supports(&self, kind: AssignmentKind) -> bool {
        matches!(
            (self, kind),
            (AssignmentOwner::InteractiveUser(_), AssignmentKind::UserRole)
                | (AssignmentOwner::InteractiveUser(_), AssignmentKind::UserDistrict)
                | (AssignmentOwner::Officer(_), AssignmentKind::OfficerVillage)
        )
    }
}

impl fmt::Display for AssignmentOwner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssignmentOwner::InteractiveUser(id) => write!(f, "{id}"),
            AssignmentOwner::Officer(id) => write!(f, "{id}"),
        }
    }
}

/// The entity an assignment points at
///
/// Targets are referenced by identifier only; their lifecycle belongs to
/// other modules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssignmentTarget {
    Role(RoleId),
    District(DistrictId),
    Village(VillageId),
}

impl AssignmentTarget {
    /// The assignment kind this target belongs to
    pub fn kind(&self) -> AssignmentKind {
        match self {
            AssignmentTarget::Role(_) => AssignmentKind::UserRole,
            AssignmentTarget::District(_) => AssignmentKind::UserDistrict,
            AssignmentTarget::Village(_) => AssignmentKind::OfficerVillage,
        }
    }
}

impl fmt::Display for AssignmentTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssignmentTarget::Role(id) => write!(f, "{id}"),
            AssignmentTarget::District(id) => write!(f, "{id}"),
            AssignmentTarget::Village(id) => write!(f, "{id}"),
        }
    }
}

/// A validity-bounded link from a profile to a target entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub owner: AssignmentOwner,
    pub target: AssignmentTarget,
    pub validity: ValidPeriod,
}

impl Assignment {
    /// Creates a currently-valid assignment
    pub fn new(owner: AssignmentOwner, target: AssignmentTarget, now: DateTime<Utc>) -> Self {
        Self {
            owner,
            target,
            validity: ValidPeriod::from(now),
        }
    }

    /// The kind of this assignment
    pub fn kind(&self) -> AssignmentKind {
        self.target.kind()
    }

    /// Returns true if this assignment is currently valid
    pub fn is_current(&self) -> bool {
        self.validity.is_current()
    }

    /// Expires this assignment at the given instant
    pub fn expire(&mut self, at: DateTime<Utc>) {
        if self.validity.is_current() {
            // close_at only fails on an already-closed period
            let _ = self.validity.close_at(at);
        }
    }

    /// Makes this assignment current again, keeping its original start
    pub fn reactivate(&mut self) {
        self.validity.reopen();
    }
}
