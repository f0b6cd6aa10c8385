//! Identity Domain Ports
//!
//! This module defines the port interface for the identity domain, enabling
//! swappable implementations (internal database, mock, etc.).
//!
//! # Architecture
//!
//! The `IdentityStore` trait describes everything the identity domain needs
//! from the relational store: per-kind current-row resolution, identifier
//! uniqueness checks, the history-archive operation behind copy-on-close
//! versioning, account persistence and assignment reconciliation. The
//! production adapter lives in the persistence layer; this crate ships an
//! in-memory adapter for tests.
//!
//! # Usage
//!
//! ```rust,ignore
//! use domain_identity::ports::IdentityStore;
//! use std::sync::Arc;
//!
//! pub struct UserService {
//!     store: Arc<dyn IdentityStore>,
//! }
//! ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use core_kernel::{ClaimAdminId, DomainPort, InteractiveUserId, OfficerId, PortError, UserId};

use crate::account::Account;
use crate::assignment::{Assignment, AssignmentKind, AssignmentOwner, AssignmentTarget};
use crate::profile::{ClaimAdmin, InteractiveUser, Officer};

/// The main port trait for identity domain persistence
///
/// History-preserving kinds follow one protocol: `find_current_*` resolves
/// the open-validity row owned by an account, `archive_*` stores a closed
/// snapshot as history, and `save_*` upserts the current row by id. History
/// queries return all versions of a logical entity, current row included,
/// ordered by validity start.
#[async_trait]
pub trait IdentityStore: DomainPort {
    // ========================================================================
    // Interactive users
    // ========================================================================

    /// Retrieves an interactive-user row by id
    async fn get_interactive_user(
        &self,
        id: InteractiveUserId,
    ) -> Result<Option<InteractiveUser>, PortError>;

    /// Resolves the currently-valid interactive user linked to an account
    async fn find_current_interactive_user(
        &self,
        account_id: UserId,
    ) -> Result<Option<InteractiveUser>, PortError>;

    /// Returns true if a currently-valid interactive user holds the login name
    async fn interactive_login_taken(&self, login_name: &str) -> Result<bool, PortError>;

    /// Upserts the current interactive-user row
    async fn save_interactive_user(&self, user: &InteractiveUser) -> Result<(), PortError>;

    /// Archives a closed interactive-user version
    async fn archive_interactive_user(&self, snapshot: InteractiveUser) -> Result<(), PortError>;

    /// Returns all versions of an interactive user, ordered by validity start
    async fn interactive_user_history(
        &self,
        id: InteractiveUserId,
    ) -> Result<Vec<InteractiveUser>, PortError>;

    // ========================================================================
    // Officers
    // ========================================================================

    /// Retrieves an officer row by id
    async fn get_officer(&self, id: OfficerId) -> Result<Option<Officer>, PortError>;

    /// Resolves the currently-valid officer linked to an account
    async fn find_current_officer(&self, account_id: UserId) -> Result<Option<Officer>, PortError>;

    /// Returns true if a currently-valid officer holds the code
    async fn officer_code_taken(&self, code: &str) -> Result<bool, PortError>;

    /// Upserts the current officer row
    async fn save_officer(&self, officer: &Officer) -> Result<(), PortError>;

    /// Archives a closed officer version
    async fn archive_officer(&self, snapshot: Officer) -> Result<(), PortError>;

    /// Returns all versions of an officer, ordered by validity start
    async fn officer_history(&self, id: OfficerId) -> Result<Vec<Officer>, PortError>;

    // ========================================================================
    // Claim admins
    // ========================================================================

    /// Retrieves a claim-admin row by id
    async fn get_claim_admin(&self, id: ClaimAdminId) -> Result<Option<ClaimAdmin>, PortError>;

    /// Resolves the currently-valid claim admin linked to an account
    async fn find_current_claim_admin(
        &self,
        account_id: UserId,
    ) -> Result<Option<ClaimAdmin>, PortError>;

    /// Returns true if a currently-valid claim admin holds the code
    async fn claim_admin_code_taken(&self, code: &str) -> Result<bool, PortError>;

    /// Upserts the current claim-admin row
    async fn save_claim_admin(&self, claim_admin: &ClaimAdmin) -> Result<(), PortError>;

    /// Archives a closed claim-admin version
    async fn archive_claim_admin(&self, snapshot: ClaimAdmin) -> Result<(), PortError>;

    /// Returns all versions of a claim admin, ordered by validity start
    async fn claim_admin_history(&self, id: ClaimAdminId) -> Result<Vec<ClaimAdmin>, PortError>;

    // ========================================================================
    // Accounts
    // ========================================================================

    /// Retrieves an account by id
    async fn get_account(&self, id: UserId) -> Result<Option<Account>, PortError>;

    /// Upserts an account
    async fn save_account(&self, account: &Account) -> Result<(), PortError>;

    // ========================================================================
    // Assignments
    // ========================================================================

    /// Returns the currently-valid assignments of (owner, kind)
    async fn current_assignments(
        &self,
        owner: AssignmentOwner,
        kind: AssignmentKind,
    ) -> Result<Vec<Assignment>, PortError>;

    /// Expires every currently-valid assignment of (owner, kind)
    ///
    /// # Returns
    ///
    /// The number of assignments expired
    async fn expire_current_assignments(
        &self,
        owner: AssignmentOwner,
        kind: AssignmentKind,
        at: DateTime<Utc>,
    ) -> Result<u64, PortError>;

    /// Finds the assignment row for (owner, target), whatever its validity
    async fn find_assignment(
        &self,
        owner: AssignmentOwner,
        target: AssignmentTarget,
    ) -> Result<Option<Assignment>, PortError>;

    /// Upserts an assignment row, keyed by (owner, target)
    async fn save_assignment(&self, assignment: Assignment) -> Result<(), PortError>;
}

/// In-memory implementation of IdentityStore for testing
///
/// Stores rows in hash maps and is useful for unit testing without a
/// database dependency.
#[cfg(any(test, feature = "mock"))]
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use tokio::sync::RwLock;

    use crate::profile::Versioned;

    /// In-memory mock implementation of IdentityStore
    #[derive(Debug, Default)]
    pub struct MemoryIdentityStore {
        interactive_users: RwLock<HashMap<InteractiveUserId, InteractiveUser>>,
        interactive_archive: RwLock<HashMap<InteractiveUserId, Vec<InteractiveUser>>>,
        officers: RwLock<HashMap<OfficerId, Officer>>,
        officer_archive: RwLock<HashMap<OfficerId, Vec<Officer>>>,
        claim_admins: RwLock<HashMap<ClaimAdminId, ClaimAdmin>>,
        claim_admin_archive: RwLock<HashMap<ClaimAdminId, Vec<ClaimAdmin>>>,
        accounts: RwLock<HashMap<UserId, Account>>,
        assignments: RwLock<HashMap<(AssignmentOwner, AssignmentTarget), Assignment>>,
    }

    impl MemoryIdentityStore {
        /// Creates an empty store
        pub fn new() -> Self {
            Self::default()
        }

        /// Pre-populates the store with an account
        pub async fn with_account(self, account: Account) -> Self {
            self.accounts.write().await.insert(account.id, account);
            self
        }

        /// Returns the number of assignment rows, current and expired
        pub async fn assignment_row_count(&self) -> usize {
            self.assignments.read().await.len()
        }
    }

    impl DomainPort for MemoryIdentityStore {}

    fn sorted_history<T: Versioned>(archive: Option<&Vec<T>>, current: Option<&T>) -> Vec<T> {
        let mut versions: Vec<T> = archive.cloned().unwrap_or_default();
        if let Some(current) = current {
            versions.push(current.clone());
        }
        versions.sort_by_key(|v| v.validity().start);
        versions
    }

    #[async_trait]
    impl IdentityStore for MemoryIdentityStore {
        async fn get_interactive_user(
            &self,
            id: InteractiveUserId,
        ) -> Result<Option<InteractiveUser>, PortError> {
            Ok(self.interactive_users.read().await.get(&id).cloned())
        }

        async fn find_current_interactive_user(
            &self,
            account_id: UserId,
        ) -> Result<Option<InteractiveUser>, PortError> {
            let accounts = self.accounts.read().await;
            let Some(id) = accounts.get(&account_id).and_then(|a| a.interactive_user_id) else {
                return Ok(None);
            };
            let users = self.interactive_users.read().await;
            Ok(users.get(&id).filter(|u| u.is_current()).cloned())
        }

        async fn interactive_login_taken(&self, login_name: &str) -> Result<bool, PortError> {
            let users = self.interactive_users.read().await;
            Ok(users
                .values()
                .any(|u| u.is_current() && u.login_name == login_name))
        }

        async fn save_interactive_user(&self, user: &InteractiveUser) -> Result<(), PortError> {
            self.interactive_users
                .write()
                .await
                .insert(user.id, user.clone());
            Ok(())
        }

        async fn archive_interactive_user(
            &self,
            snapshot: InteractiveUser,
        ) -> Result<(), PortError> {
            if snapshot.is_current() {
                return Err(PortError::validation(
                    "history snapshots must have a closed validity",
                ));
            }
            self.interactive_archive
                .write()
                .await
                .entry(snapshot.id)
                .or_default()
                .push(snapshot);
            Ok(())
        }

        async fn interactive_user_history(
            &self,
            id: InteractiveUserId,
        ) -> Result<Vec<InteractiveUser>, PortError> {
            let archive = self.interactive_archive.read().await;
            let current = self.interactive_users.read().await;
            Ok(sorted_history(archive.get(&id), current.get(&id)))
        }

        async fn get_officer(&self, id: OfficerId) -> Result<Option<Officer>, PortError> {
            Ok(self.officers.read().await.get(&id).cloned())
        }

        async fn find_current_officer(
            &self,
            account_id: UserId,
        ) -> Result<Option<Officer>, PortError> {
            let accounts = self.accounts.read().await;
            let Some(id) = accounts.get(&account_id).and_then(|a| a.officer_id) else {
                return Ok(None);
            };
            let officers = self.officers.read().await;
            Ok(officers.get(&id).filter(|o| o.is_current()).cloned())
        }

        async fn officer_code_taken(&self, code: &str) -> Result<bool, PortError> {
            let officers = self.officers.read().await;
            Ok(officers.values().any(|o| o.is_current() && o.code == code))
        }

        async fn save_officer(&self, officer: &Officer) -> Result<(), PortError> {
            self.officers.write().await.insert(officer.id, officer.clone());
            Ok(())
        }

        async fn archive_officer(&self, snapshot: Officer) -> Result<(), PortError> {
            if snapshot.is_current() {
                return Err(PortError::validation(
                    "history snapshots must have a closed validity",
                ));
            }
            self.officer_archive
                .write()
                .await
                .entry(snapshot.id)
                .or_default()
                .push(snapshot);
            Ok(())
        }

        async fn officer_history(&self, id: OfficerId) -> Result<Vec<Officer>, PortError> {
            let archive = self.officer_archive.read().await;
            let current = self.officers.read().await;
            Ok(sorted_history(archive.get(&id), current.get(&id)))
        }

        async fn get_claim_admin(
            &self,
            id: ClaimAdminId,
        ) -> Result<Option<ClaimAdmin>, PortError> {
            Ok(self.claim_admins.read().await.get(&id).cloned())
        }

        async fn find_current_claim_admin(
            &self,
            account_id: UserId,
        ) -> Result<Option<ClaimAdmin>, PortError> {
            let accounts = self.accounts.read().await;
            let Some(id) = accounts.get(&account_id).and_then(|a| a.claim_admin_id) else {
                return Ok(None);
            };
            let admins = self.claim_admins.read().await;
            Ok(admins.get(&id).filter(|c| c.is_current()).cloned())
        }

        async fn claim_admin_code_taken(&self, code: &str) -> Result<bool, PortError> {
            let admins = self.claim_admins.read().await;
            Ok(admins.values().any(|c| c.is_current() && c.code == code))
        }

        async fn save_claim_admin(&self, claim_admin: &ClaimAdmin) -> Result<(), PortError> {
            self.claim_admins
                .write()
                .await
                .insert(claim_admin.id, claim_admin.clone());
            Ok(())
        }

        async fn archive_claim_admin(&self, snapshot: ClaimAdmin) -> Result<(), PortError> {
            if snapshot.is_current() {
                return Err(PortError::validation(
                    "history snapshots must have a closed validity",
                ));
            }
            self.claim_admin_archive
                .write()
                .await
                .entry(snapshot.id)
                .or_default()
                .push(snapshot);
            Ok(())
        }

        async fn claim_admin_history(
            &self,
            id: ClaimAdminId,
        ) -> Result<Vec<ClaimAdmin>, PortError> {
            let archive = self.claim_admin_archive.read().await;
            let current = self.claim_admins.read().await;
            Ok(sorted_history(archive.get(&id), current.get(&id)))
        }

        async fn get_account(&self, id: UserId) -> Result<Option<Account>, PortError> {
            Ok(self.accounts.read().await.get(&id).cloned())
        }

        async fn save_account(&self, account: &Account) -> Result<(), PortError> {
            self.accounts.write().await.insert(account.id, account.clone());
            Ok(())
        }

        async fn current_assignments(
            &self,
            owner: AssignmentOwner,
            kind: AssignmentKind,
        ) -> Result<Vec<Assignment>, PortError> {
            let assignments = self.assignments.read().await;
            Ok(assignments
                .values()
                .filter(|a| a.owner == owner && a.kind() == kind && a.is_current())
                .cloned()
                .collect())
        }

        async fn expire_current_assignments(
            &self,
            owner: AssignmentOwner,
            kind: AssignmentKind,
            at: DateTime<Utc>,
        ) -> Result<u64, PortError> {
            let mut assignments = self.assignments.write().await;
            let mut expired = 0;
            for assignment in assignments.values_mut() {
                if assignment.owner == owner && assignment.kind() == kind && assignment.is_current()
                {
                    assignment.expire(at);
                    expired += 1;
                }
            }
            Ok(expired)
        }

        async fn find_assignment(
            &self,
            owner: AssignmentOwner,
            target: AssignmentTarget,
        ) -> Result<Option<Assignment>, PortError> {
            let assignments = self.assignments.read().await;
            Ok(assignments.get(&(owner, target)).cloned())
        }

        async fn save_assignment(&self, assignment: Assignment) -> Result<(), PortError> {
            self.assignments
                .write()
                .await
                .insert((assignment.owner, assignment.target), assignment);
            Ok(())
        }
    }
}
