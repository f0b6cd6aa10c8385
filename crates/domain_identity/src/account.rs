//! Account aggregate
//!
//! An account is the top-level identity every authenticated actor resolves
//! to. It owns optional one-to-one links to the versioned profiles; the
//! profiles reference their targets but do not own the account.
//!
//! Accounts have no version history. The username is immutable once the
//! account is persisted: re-link attempts with a different username are
//! reported and ignored, never applied.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{ClaimAdminId, InteractiveUserId, OfficerId, UserId};

/// A top-level identity record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Stable account identifier
    pub id: UserId,
    /// Login username, immutable once persisted
    pub username: String,
    /// Linked interactive-user profile
    pub interactive_user_id: Option<InteractiveUserId>,
    /// Linked officer profile
    pub officer_id: Option<OfficerId>,
    /// Linked claim-admin profile
    pub claim_admin_id: Option<ClaimAdminId>,
    /// When the account was created
    pub created_at: DateTime<Utc>,
}

impl Account {
    /// Creates a new account with no profile links
    pub fn new(username: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: UserId::new_v7(),
            username: username.into(),
            interactive_user_id: None,
            officer_id: None,
            claim_admin_id: None,
            created_at: now,
        }
    }

    /// Attaches the supplied profile references
    ///
    /// Only references present in `links` are written; links for other
    /// profile kinds keep their current value.
    pub fn attach(&mut self, links: &ProfileLinks) {
        if let Some(id) = links.interactive_user {
            self.interactive_user_id = Some(id);
        }
        if let Some(id) = links.officer {
            self.officer_id = Some(id);
        }
        if let Some(id) = links.claim_admin {
            self.claim_admin_id = Some(id);
        }
    }

    /// Returns true if any profile is linked
    pub fn has_profile(&self) -> bool {
        self.interactive_user_id.is_some()
            || self.officer_id.is_some()
            || self.claim_admin_id.is_some()
    }
}

/// Profile references to attach to an account
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProfileLinks {
    pub interactive_user: Option<InteractiveUserId>,
    pub officer: Option<OfficerId>,
    pub claim_admin: Option<ClaimAdminId>,
}

impl ProfileLinks {
    /// No references
    pub fn none() -> Self {
        Self::default()
    }

    /// Links an interactive-user profile
    pub fn with_interactive_user(mut self, id: InteractiveUserId) -> Self {
        self.interactive_user = Some(id);
        self
    }

    /// Links an officer profile
    pub fn with_officer(mut self, id: OfficerId) -> Self {
        self.officer = Some(id);
        self
    }

    /// Links a claim-admin profile
    pub fn with_claim_admin(mut self, id: ClaimAdminId) -> Self {
        self.claim_admin = Some(id);
        self
    }
}
