//! Comprehensive tests for domain_identity
//!
//! These tests drive the public service API end to end over the in-memory
//! store adapter, covering profile lifecycles, assignment reconciliation
//! and account linking.

use chrono::Duration;

use core_kernel::UserId;
use domain_identity::{
    AssignmentKind, AssignmentOwner, AssignmentTarget, IdentityError, IdentityStore, ProfileLinks,
};
use test_utils::{
    assert_closed_at, assert_current, assert_history_chain, ClaimAdminDataBuilder, IdFixtures,
    InteractiveUserDataBuilder, OfficerDataBuilder, TemporalFixtures, TestServiceBuilder,
};

// ============================================================================
// Profile lifecycle tests
// ============================================================================

mod lifecycle_tests {
    use super::*;

    #[tokio::test]
    async fn test_round_trip_two_revisions() {
        let h = TestServiceBuilder::new().build();
        let audit = IdFixtures::audit_user();

        let (user, created) = h
            .service
            .upsert_interactive_user(None, &InteractiveUserDataBuilder::new().build(), audit, false)
            .await
            .unwrap();
        assert!(created);

        let (account, _) = h
            .service
            .link_account(
                None,
                "jdoe",
                ProfileLinks::none().with_interactive_user(user.id),
            )
            .await
            .unwrap();

        h.clock.advance(Duration::days(10));
        let first_revision = TemporalFixtures::epoch() + Duration::days(10);
        let (_, created) = h
            .service
            .upsert_interactive_user(
                Some(account.id),
                &InteractiveUserDataBuilder::new().with_phone("555-1000").build(),
                audit,
                false,
            )
            .await
            .unwrap();
        assert!(!created);

        h.clock.advance(Duration::days(10));
        let (latest, created) = h
            .service
            .upsert_interactive_user(
                Some(account.id),
                &InteractiveUserDataBuilder::new().with_phone("555-2000").build(),
                audit,
                false,
            )
            .await
            .unwrap();
        assert!(!created);

        // current view returns the latest field values only
        let current = h
            .store
            .find_current_interactive_user(account.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(current.phone.as_deref(), Some("555-2000"));
        assert_current(&current);

        // full history: three rows, ordered, non-overlapping
        let history = h.store.interactive_user_history(latest.id).await.unwrap();
        assert_eq!(history.len(), 3);
        assert_history_chain(&history);
        assert_eq!(history[0].phone.as_deref(), Some("555-0001"));
        assert_eq!(history[1].phone.as_deref(), Some("555-1000"));
        assert_closed_at(&history[0], first_revision);
    }

    #[tokio::test]
    async fn test_exactly_one_current_row_per_login() {
        let h = TestServiceBuilder::new().build();

        h.service
            .upsert_interactive_user(
                None,
                &InteractiveUserDataBuilder::new().with_login("shared").build(),
                IdFixtures::audit_user(),
                false,
            )
            .await
            .unwrap();

        let result = h
            .service
            .upsert_interactive_user(
                None,
                &InteractiveUserDataBuilder::new().with_login("shared").build(),
                IdFixtures::audit_user(),
                false,
            )
            .await;

        assert!(matches!(
            result,
            Err(IdentityError::DuplicateIdentifier { .. })
        ));
    }

    #[tokio::test]
    async fn test_missing_role_list_is_a_contract_violation() {
        let h = TestServiceBuilder::new().build();

        let result = h
            .service
            .upsert_interactive_user(
                None,
                &InteractiveUserDataBuilder::new().without_roles().build(),
                IdFixtures::audit_user(),
                false,
            )
            .await;

        assert!(matches!(result, Err(IdentityError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_officer_revision_keeps_code_history() {
        let h = TestServiceBuilder::new().build();
        let audit = IdFixtures::audit_user();

        let (officer, _) = h
            .service
            .upsert_officer(None, &OfficerDataBuilder::new().build(), audit, false)
            .await
            .unwrap();
        let (account, _) = h
            .service
            .link_account(None, "EO0042", ProfileLinks::none().with_officer(officer.id))
            .await
            .unwrap();

        h.clock.advance(Duration::days(5));
        let (revised, created) = h
            .service
            .upsert_officer(
                Some(account.id),
                &OfficerDataBuilder::new().with_phone("555-7777").build(),
                audit,
                true,
            )
            .await
            .unwrap();

        assert!(!created);
        assert!(revised.has_login);
        assert_eq!(revised.id, officer.id);

        let history = h.store.officer_history(officer.id).await.unwrap();
        assert_eq!(history.len(), 2);
        assert_history_chain(&history);
    }

    #[tokio::test]
    async fn test_claim_admin_unsupported_without_module() {
        let h = TestServiceBuilder::new().without_claim_module().build();

        let result = h
            .service
            .upsert_claim_admin(
                None,
                &ClaimAdminDataBuilder::new().build(),
                IdFixtures::audit_user(),
                false,
            )
            .await;

        assert!(matches!(result, Err(IdentityError::UnsupportedKind(_))));
        assert!(!h.store.claim_admin_code_taken("CA0007").await.unwrap());
    }

    #[tokio::test]
    async fn test_claim_admin_lifecycle_with_module() {
        let h = TestServiceBuilder::new().build();
        let audit = IdFixtures::audit_user();

        let (admin, created) = h
            .service
            .upsert_claim_admin(None, &ClaimAdminDataBuilder::new().build(), audit, false)
            .await
            .unwrap();
        assert!(created);

        let (account, _) = h
            .service
            .link_account(None, "CA0007", ProfileLinks::none().with_claim_admin(admin.id))
            .await
            .unwrap();

        h.clock.advance(Duration::hours(3));
        let (revised, created) = h
            .service
            .upsert_claim_admin(
                Some(account.id),
                &ClaimAdminDataBuilder::new().with_email("new@example.org").build(),
                audit,
                false,
            )
            .await
            .unwrap();

        assert!(!created);
        assert_eq!(revised.email_id.as_deref(), Some("new@example.org"));
        assert_history_chain(&h.store.claim_admin_history(admin.id).await.unwrap());
    }
}

// ============================================================================
// Assignment reconciliation tests
// ============================================================================

mod assignment_tests {
    use super::*;

    #[tokio::test]
    async fn test_village_reconciliation_across_upserts() {
        let h = TestServiceBuilder::new().build();
        let audit = IdFixtures::audit_user();
        let (v1, v2, v3) = (
            IdFixtures::nth_village(1),
            IdFixtures::nth_village(2),
            IdFixtures::nth_village(3),
        );

        let (officer, _) = h
            .service
            .upsert_officer(
                None,
                &OfficerDataBuilder::new().with_villages(vec![v1, v2]).build(),
                audit,
                false,
            )
            .await
            .unwrap();
        let (account, _) = h
            .service
            .link_account(None, "EO0042", ProfileLinks::none().with_officer(officer.id))
            .await
            .unwrap();

        h.clock.advance(Duration::days(1));
        h.service
            .upsert_officer(
                Some(account.id),
                &OfficerDataBuilder::new().with_villages(vec![v2, v3]).build(),
                audit,
                false,
            )
            .await
            .unwrap();

        let owner = AssignmentOwner::Officer(officer.id);
        let current = h
            .store
            .current_assignments(owner, AssignmentKind::OfficerVillage)
            .await
            .unwrap();
        let mut villages: Vec<_> = current.iter().map(|a| a.target).collect();
        villages.sort_by_key(|t| t.to_string());
        let mut expected = vec![
            AssignmentTarget::Village(v2),
            AssignmentTarget::Village(v3),
        ];
        expected.sort_by_key(|t| t.to_string());
        assert_eq!(villages, expected);

        // the village kept across both syncs shows one continuous interval
        let survivor = h
            .store
            .find_assignment(owner, AssignmentTarget::Village(v2))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(survivor.validity.start, TemporalFixtures::epoch());

        let replaced = h
            .store
            .find_assignment(owner, AssignmentTarget::Village(v1))
            .await
            .unwrap()
            .unwrap();
        assert!(!replaced.is_current());
    }

    #[tokio::test]
    async fn test_role_sync_runs_on_every_user_upsert() {
        let h = TestServiceBuilder::new().build();
        let audit = IdFixtures::audit_user();
        let (r1, r2) = (IdFixtures::nth_role(1), IdFixtures::nth_role(2));

        let (user, _) = h
            .service
            .upsert_interactive_user(
                None,
                &InteractiveUserDataBuilder::new().with_roles(vec![r1]).build(),
                audit,
                false,
            )
            .await
            .unwrap();
        let (account, _) = h
            .service
            .link_account(
                None,
                "jdoe",
                ProfileLinks::none().with_interactive_user(user.id),
            )
            .await
            .unwrap();

        h.clock.advance(Duration::days(1));
        let (revised, _) = h
            .service
            .upsert_interactive_user(
                Some(account.id),
                &InteractiveUserDataBuilder::new().with_roles(vec![r2]).build(),
                audit,
                false,
            )
            .await
            .unwrap();
        assert_eq!(revised.role_id, r2);

        let current = h
            .store
            .current_assignments(
                AssignmentOwner::InteractiveUser(user.id),
                AssignmentKind::UserRole,
            )
            .await
            .unwrap();
        assert_eq!(current.len(), 1);
        assert_eq!(current[0].target, AssignmentTarget::Role(r2));
    }
}

// ============================================================================
// Account linking tests
// ============================================================================

mod account_tests {
    use super::*;

    #[tokio::test]
    async fn test_username_immutable_after_creation() {
        let h = TestServiceBuilder::new().build();
        let officer_id = core_kernel::OfficerId::new();

        let (account, created) = h
            .service
            .link_account(None, "alice", ProfileLinks::none().with_officer(officer_id))
            .await
            .unwrap();
        assert!(created);

        let (relinked, created) = h
            .service
            .link_account(Some(account.id), "mallory", ProfileLinks::none())
            .await
            .unwrap();

        assert!(!created);
        assert_eq!(relinked.username, "alice");
        assert_eq!(relinked.officer_id, Some(officer_id));
    }

    #[tokio::test]
    async fn test_linking_second_profile_keeps_first() {
        let h = TestServiceBuilder::new().build();
        let audit = IdFixtures::audit_user();

        let (user, _) = h
            .service
            .upsert_interactive_user(
                None,
                &InteractiveUserDataBuilder::new().build(),
                audit,
                true,
            )
            .await
            .unwrap();
        let (account, _) = h
            .service
            .link_account(
                None,
                "jdoe",
                ProfileLinks::none().with_interactive_user(user.id),
            )
            .await
            .unwrap();

        let (officer, _) = h
            .service
            .upsert_officer(None, &OfficerDataBuilder::new().build(), audit, true)
            .await
            .unwrap();
        let (account, _) = h
            .service
            .link_account(
                Some(account.id),
                "jdoe",
                ProfileLinks::none().with_officer(officer.id),
            )
            .await
            .unwrap();

        assert_eq!(account.interactive_user_id, Some(user.id));
        assert_eq!(account.officer_id, Some(officer.id));
        assert!(account.claim_admin_id.is_none());
    }

    #[tokio::test]
    async fn test_fabricated_account_id_rejected() {
        let h = TestServiceBuilder::new().build();

        let result = h
            .service
            .link_account(Some(UserId::new()), "alice", ProfileLinks::none())
            .await;

        assert!(matches!(result, Err(IdentityError::NotFound { .. })));
    }
}

// ============================================================================
// Reconciliation properties
// ============================================================================

mod reconciliation_properties {
    use super::*;
    use std::collections::HashSet;

    use proptest::collection::vec;
    use proptest::prelude::*;

    fn to_targets(indices: &[u8]) -> Vec<AssignmentTarget> {
        indices
            .iter()
            .map(|&n| AssignmentTarget::Role(IdFixtures::nth_role(n)))
            .collect()
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        /// Two consecutive syncs always leave exactly the second requested
        /// set current, and targets present in both sets keep their
        /// original validity start.
        #[test]
        fn sync_reconciles_to_requested_set(
            first in vec(0u8..8, 0..6),
            second in vec(0u8..8, 0..6),
        ) {
            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap();
            rt.block_on(async {
                let h = TestServiceBuilder::new().build();
                let owner = AssignmentOwner::InteractiveUser(
                    core_kernel::InteractiveUserId::new(),
                );

                h.service
                    .sync_assignments(owner, AssignmentKind::UserRole, &to_targets(&first))
                    .await
                    .unwrap();
                h.clock.advance(Duration::days(1));
                h.service
                    .sync_assignments(owner, AssignmentKind::UserRole, &to_targets(&second))
                    .await
                    .unwrap();

                let current = h
                    .store
                    .current_assignments(owner, AssignmentKind::UserRole)
                    .await
                    .unwrap();
                let current_set: HashSet<_> = current.iter().map(|a| a.target).collect();
                let expected: HashSet<_> = to_targets(&second).into_iter().collect();
                assert_eq!(current_set, expected);

                // survivors of both syncs keep their original start
                let kept: HashSet<_> = to_targets(&first)
                    .into_iter()
                    .filter(|t| expected.contains(t))
                    .collect();
                for target in kept {
                    let assignment = h
                        .store
                        .find_assignment(owner, target)
                        .await
                        .unwrap()
                        .unwrap();
                    assert_eq!(assignment.validity.start, TemporalFixtures::epoch());
                }
            });
        }
    }
}
