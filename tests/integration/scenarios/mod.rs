//! End-to-end export transaction scenarios
//!
//! Drives the assembled core (resolver-free: identities are fixed per test)
//! through the documented success and failure paths, checking balances and
//! font lifecycle outcomes after each attempt.

use typecraft_common::Error;
use typecraft_fonts::{FontStatus, FontStore};

use crate::common::{export_request, TestCore};

mod export_success {
    use super::*;

    #[tokio::test]
    async fn test_export_debits_and_commits() {
        // Balance 100, cost 5: final balance 95, font ready.
        let core = TestCore::new();
        let identity = core.durable_identity(100);

        let font = core
            .exports
            .execute(&identity, export_request(5))
            .await
            .unwrap();

        assert_eq!(font.status, FontStatus::Ready);
        assert!(font.files.woff2_url.is_some());
        assert_eq!(core.ledger.balance(&identity).await.unwrap(), 95);
    }

    #[tokio::test]
    async fn test_export_records_debit_entry_for_font() {
        let core = TestCore::new();
        let identity = core.durable_identity(100);

        let font = core
            .exports
            .execute(&identity, export_request(5))
            .await
            .unwrap();

        let history = core.ledger.history(&identity).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].delta, -5);
        assert_eq!(history[0].reason, format!("export:{}", font.id));
    }

    #[tokio::test]
    async fn test_sequential_exports_progress_balance() {
        // 100 -> 95 -> 90, never interleaved incorrectly.
        let core = TestCore::new();
        let identity = core.durable_identity(100);

        core.exports
            .execute(&identity, export_request(5))
            .await
            .unwrap();
        assert_eq!(core.ledger.balance(&identity).await.unwrap(), 95);

        core.exports
            .execute(&identity, export_request(5))
            .await
            .unwrap();
        assert_eq!(core.ledger.balance(&identity).await.unwrap(), 90);
    }

    #[tokio::test]
    async fn test_demo_export_stays_in_session_store() {
        let core = TestCore::new();
        let identity = core.demo_identity(100);

        let font = core
            .exports
            .execute(&identity, export_request(5))
            .await
            .unwrap();

        assert_eq!(font.status, FontStatus::Ready);
        assert_eq!(core.ledger.balance(&identity).await.unwrap(), 95);
        // The durable store never saw the demo font.
        assert!(core.durable_fonts.find(font.id).await.unwrap().is_none());
    }
}

mod export_insufficient_credits {
    use super::*;

    #[tokio::test]
    async fn test_insufficient_credits_leaves_no_trace() {
        // Balance 3, cost 5: fails up front, balance untouched, no ready font.
        let core = TestCore::new();
        let identity = core.durable_identity(3);

        let result = core.exports.execute(&identity, export_request(5)).await;

        assert!(matches!(
            result,
            Err(Error::InsufficientCredits {
                required: 5,
                available: 3
            })
        ));
        assert_eq!(core.ledger.balance(&identity).await.unwrap(), 3);
        assert!(core.ledger.history(&identity).await.unwrap().is_empty());
        assert!(core.catalog.list(&identity).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_insufficient_credits_error_is_actionable() {
        let core = TestCore::new();
        let identity = core.durable_identity(3);

        let error = core
            .exports
            .execute(&identity, export_request(5))
            .await
            .unwrap_err();

        assert!(error.is_retryable());
        assert!(error.user_message().contains('5'));
    }
}

mod export_compensation {
    use super::*;

    #[test_log::test(tokio::test)]
    async fn test_commit_failure_refunds_debit() {
        // Balance 50, cost 10: debit lands (40), commit fails, refund
        // restores 50 and the record is failed.
        let core = TestCore::new();
        let identity = core.durable_identity(50);
        core.durable_fonts.fail_commits(true);

        let result = core.exports.execute(&identity, export_request(10)).await;

        assert!(matches!(result, Err(Error::PersistenceFailure(_))));
        assert_eq!(core.ledger.balance(&identity).await.unwrap(), 50);

        let fonts = core.catalog.list(&identity).await.unwrap();
        assert_eq!(fonts.len(), 1);
        assert_eq!(fonts[0].status, FontStatus::Failed);
    }

    #[tokio::test]
    async fn test_refund_entries_balance_out() {
        let core = TestCore::new();
        let identity = core.durable_identity(50);
        core.durable_fonts.fail_commits(true);

        core.exports
            .execute(&identity, export_request(10))
            .await
            .unwrap_err();

        let history = core.ledger.history(&identity).await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history.iter().map(|e| e.delta).sum::<i32>(), 0);
        assert!(history[0].reason.starts_with("refund:"));
        assert!(history[1].reason.starts_with("export:"));
    }

    #[tokio::test]
    async fn test_retry_after_refund_succeeds_with_fresh_record() {
        let core = TestCore::new();
        let identity = core.durable_identity(50);

        core.durable_fonts.fail_commits(true);
        let error = core
            .exports
            .execute(&identity, export_request(10))
            .await
            .unwrap_err();
        assert!(error.is_retryable());

        core.durable_fonts.fail_commits(false);
        let font = core
            .exports
            .execute(&identity, export_request(10))
            .await
            .unwrap();

        assert_eq!(font.status, FontStatus::Ready);
        assert_eq!(core.ledger.balance(&identity).await.unwrap(), 40);
        // One failed record from the first attempt, one ready from the retry.
        let fonts = core.catalog.list(&identity).await.unwrap();
        assert_eq!(fonts.len(), 2);
    }
}

mod export_consistency_fault {
    use super::*;

    #[test_log::test(tokio::test)]
    async fn test_refund_failure_surfaces_consistency_fault() {
        let core = TestCore::new();
        let identity = core.durable_identity(50);
        core.durable_fonts.fail_commits(true);
        core.balances.fail_credits(true);

        let result = core.exports.execute(&identity, export_request(10)).await;

        let error = result.unwrap_err();
        match &error {
            Error::ConsistencyFault { debited, .. } => assert_eq!(*debited, 10),
            other => panic!("expected ConsistencyFault, got {:?}", other),
        }

        // The debit stands and the record remains processing.
        assert_eq!(core.ledger.balance(&identity).await.unwrap(), 40);
        let fonts = core.catalog.list(&identity).await.unwrap();
        assert_eq!(fonts.len(), 1);
        assert_eq!(fonts[0].status, FontStatus::Processing);
    }

    #[tokio::test]
    async fn test_consistency_fault_is_not_retryable_and_hides_detail() {
        let core = TestCore::new();
        let identity = core.durable_identity(50);
        core.durable_fonts.fail_commits(true);
        core.balances.fail_credits(true);

        let error = core
            .exports
            .execute(&identity, export_request(10))
            .await
            .unwrap_err();

        assert!(!error.is_retryable());
        assert!(error.user_message().contains("support"));
        assert!(!error.user_message().contains("simulated"));
    }
}

mod export_edge_cases {
    use super::*;

    #[tokio::test]
    async fn test_zero_cost_export_still_commits_entry() {
        let core = TestCore::new();
        let identity = core.durable_identity(0);

        let font = core
            .exports
            .execute(&identity, export_request(0))
            .await
            .unwrap();

        assert_eq!(font.status, FontStatus::Ready);
        let history = core.ledger.history(&identity).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].delta, 0);
    }

    #[tokio::test]
    async fn test_exact_balance_export_drains_to_zero() {
        let core = TestCore::new();
        let identity = core.durable_identity(5);

        let font = core
            .exports
            .execute(&identity, export_request(5))
            .await
            .unwrap();

        assert_eq!(font.status, FontStatus::Ready);
        assert_eq!(core.ledger.balance(&identity).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_purchase_top_up_enables_export() {
        let core = TestCore::new();
        let identity = core.durable_identity(3);

        core.exports
            .execute(&identity, export_request(5))
            .await
            .unwrap_err();

        core.ledger.top_up(&identity, 50).await.unwrap();

        let font = core
            .exports
            .execute(&identity, export_request(5))
            .await
            .unwrap();
        assert_eq!(font.status, FontStatus::Ready);
        assert_eq!(core.ledger.balance(&identity).await.unwrap(), 48);
    }

    #[tokio::test]
    async fn test_signup_grant_covers_first_export() {
        // A fresh account provisions at zero; the sign-up grant is an
        // ordinary credit, not a special path.
        let core = TestCore::new();
        let identity = core.durable_identity(0);

        core.ledger
            .credit(&identity, 5, typecraft_ledger::SIGNUP_GRANT_REASON)
            .await
            .unwrap();

        let font = core
            .exports
            .execute(&identity, export_request(5))
            .await
            .unwrap();
        assert_eq!(font.status, FontStatus::Ready);
        assert_eq!(core.ledger.balance(&identity).await.unwrap(), 0);
    }
}
