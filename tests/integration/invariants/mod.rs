//! Business invariant validation tests
//!
//! Exercises the core guarantees across components: balances never go
//! negative, the demo identity outlives any durable session signal, a font
//! is only ever ready with a committed debit, and compensation restores
//! balances exactly.

use std::sync::Arc;

use typecraft_auth::SessionEvent;
use typecraft_common::Error;
use typecraft_fonts::{FontFiles, FontStatus, FontStore, SessionFontStore};
use typecraft_identity::{IdentityResolver, MemoryDirectory};
use typecraft_ledger::BalanceStore;
use uuid::Uuid;

use crate::common::{export_request, TestCore};

mod test_balance_invariants {
    use super::*;

    #[tokio::test]
    async fn test_balance_never_goes_negative_across_sequence() {
        // Every successful debit reduces the balance by exactly its amount;
        // every refused debit leaves it unchanged.
        let core = TestCore::new();
        let identity = core.demo_identity(100);

        let attempts: [(i32, bool); 6] = [
            (30, true),  // 100 -> 70
            (50, true),  // 70 -> 20
            (40, false), // refused, still 20
            (20, true),  // 20 -> 0
            (1, false),  // refused, still 0
            (0, true),   // zero debit, still 0
        ];

        let mut expected = 100;
        for (amount, should_succeed) in attempts {
            let result = core.ledger.debit(&identity, amount, "export:test").await;
            if should_succeed {
                expected -= amount;
                assert_eq!(result.unwrap(), expected);
            } else {
                assert!(matches!(result, Err(Error::InsufficientCredits { .. })));
            }
            let balance = core.ledger.balance(&identity).await.unwrap();
            assert_eq!(balance, expected);
            assert!(balance >= 0);
        }
    }

    #[tokio::test]
    async fn test_concurrent_debits_cannot_double_spend() {
        // Two concurrent debits whose combined cost exceeds the balance:
        // exactly one may succeed.
        let core = TestCore::new();
        let identity = core.durable_identity(5);

        let (first, second) = tokio::join!(
            core.ledger.debit(&identity, 5, "export:a"),
            core.ledger.debit(&identity, 5, "export:b"),
        );

        let successes = [&first, &second].iter().filter(|r| r.is_ok()).count();
        assert_eq!(successes, 1);
        assert_eq!(core.ledger.balance(&identity).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_running_sum_of_entries_equals_balance() {
        let core = TestCore::new();
        let identity = core.durable_identity(100);

        core.ledger.debit(&identity, 30, "export:a").await.unwrap();
        core.ledger.top_up(&identity, 10).await.unwrap();
        core.ledger.debit(&identity, 5, "export:b").await.unwrap();

        let history = core.ledger.history(&identity).await.unwrap();
        let sum: i32 = history.iter().map(|e| e.delta).sum();
        assert_eq!(100 + sum, core.ledger.balance(&identity).await.unwrap());
    }
}

mod test_identity_invariants {
    use super::*;

    #[tokio::test]
    async fn test_ephemeral_identity_survives_any_durable_event_sequence() {
        let core = TestCore::new();
        let identity = core.demo_identity(100);

        let resolver = IdentityResolver::new(
            core.sessions.clone(),
            Arc::new(MemoryDirectory::new()),
        );
        assert_eq!(resolver.resolve(), Some(identity.clone()));

        let events = [
            SessionEvent::Absent,
            SessionEvent::Present {
                owner: Uuid::new_v4(),
                email: "someone@example.com".to_string(),
            },
            SessionEvent::Absent,
            SessionEvent::Present {
                owner: Uuid::new_v4(),
                email: "someone.else@example.com".to_string(),
            },
        ];

        for event in events {
            let resolved = resolver.observe(event).await.unwrap().unwrap();
            assert!(resolved.is_ephemeral());
            assert_eq!(resolved.id(), identity.id());
        }
    }

    #[tokio::test]
    async fn test_balance_still_ephemeral_after_absent_event() {
        // Demo identity active, a durable "session absent" arrives: the
        // active identity is unchanged and the balance is still the
        // session-local value.
        let core = TestCore::new();
        let identity = core.demo_identity(100);
        core.ledger.debit(&identity, 5, "export:a").await.unwrap();

        let resolver = IdentityResolver::new(
            core.sessions.clone(),
            Arc::new(MemoryDirectory::new()),
        );
        let resolved = resolver
            .observe(SessionEvent::Absent)
            .await
            .unwrap()
            .unwrap();

        assert!(resolved.is_ephemeral());
        assert_eq!(core.ledger.balance(&resolved).await.unwrap(), 95);
    }
}

mod test_lifecycle_invariants {
    use super::*;

    #[tokio::test]
    async fn test_ready_font_always_has_matching_committed_debit() {
        let core = TestCore::new();
        let identity = core.durable_identity(20);

        core.exports
            .execute(&identity, export_request(5))
            .await
            .unwrap();

        for font in core.catalog.list(&identity).await.unwrap() {
            if font.status == FontStatus::Ready {
                let history = core.ledger.history(&identity).await.unwrap();
                let matching = history
                    .iter()
                    .find(|e| e.reason == format!("export:{}", font.id))
                    .expect("ready font must have a committed export entry");
                assert_eq!(matching.delta, -5);
            }
        }
    }

    #[tokio::test]
    async fn test_failed_export_never_leaves_ready_font() {
        let core = TestCore::new();
        let identity = core.durable_identity(3);

        core.exports
            .execute(&identity, export_request(5))
            .await
            .unwrap_err();

        let ready = core
            .catalog
            .list(&identity)
            .await
            .unwrap()
            .into_iter()
            .filter(|f| f.status == FontStatus::Ready)
            .count();
        assert_eq!(ready, 0);
    }

    #[tokio::test]
    async fn test_status_moves_forward_only() {
        let store = SessionFontStore::new();
        let font = store
            .create(Uuid::new_v4(), Default::default())
            .await
            .unwrap();

        // processing -> ready is final: neither failure nor a second commit
        // can move it again.
        store.commit(font.id, FontFiles::default()).await.unwrap();
        assert!(store.mark_failed(font.id, "late failure").await.is_err());
        assert!(store.commit(font.id, FontFiles::default()).await.is_err());

        let stored = store.find(font.id).await.unwrap().unwrap();
        assert_eq!(stored.status, FontStatus::Ready);
    }
}

mod test_compensation_invariants {
    use super::*;

    #[tokio::test]
    async fn test_refund_restores_balance_bit_for_bit() {
        for (seed, cost) in [(50, 10), (5, 5), (100, 1), (7, 0)] {
            let core = TestCore::new();
            let identity = core.durable_identity(seed);
            core.durable_fonts.fail_commits(true);

            let result = core.exports.execute(&identity, export_request(cost)).await;
            assert!(matches!(result, Err(Error::PersistenceFailure(_))));

            assert_eq!(
                core.ledger.balance(&identity).await.unwrap(),
                seed,
                "balance must be restored exactly for seed={} cost={}",
                seed,
                cost
            );
        }
    }

    #[tokio::test]
    async fn test_compensation_failure_keeps_debit_and_processing_record() {
        let core = TestCore::new();
        let identity = core.durable_identity(50);
        core.durable_fonts.fail_commits(true);
        core.balances.fail_credits(true);

        core.exports
            .execute(&identity, export_request(10))
            .await
            .unwrap_err();

        // The unmatched debit is still visible in the history for
        // out-of-band reconciliation.
        let history = core.ledger.history(&identity).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].delta, -10);
        assert!(core.balances.balance(identity.id()).await.unwrap() == 40);
    }
}
