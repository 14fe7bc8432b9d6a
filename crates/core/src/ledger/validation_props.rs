//! Property tests for ledger request validation.

use proptest::prelude::*;
use rust_decimal::Decimal;
use uuid::Uuid;

use super::types::{Distribution, DistributionRequest, TransferRequest};
use super::validation::{validate_distribution, validate_transfer};

/// Strategy for strictly positive decimal amounts with 2 fractional digits.
fn positive_amount() -> impl Strategy<Value = Decimal> {
    (1i64..1_000_000_000i64).prop_map(|n| Decimal::new(n, 2))
}

/// Strategy for non-positive decimal amounts.
fn non_positive_amount() -> impl Strategy<Value = Decimal> {
    (-1_000_000_000i64..=0i64).prop_map(|n| Decimal::new(n, 2))
}

fn distinct_pair() -> impl Strategy<Value = (Uuid, Uuid)> {
    (any::<u128>(), any::<u128>())
        .prop_filter("ids must differ", |(a, b)| a != b)
        .prop_map(|(a, b)| (Uuid::from_u128(a), Uuid::from_u128(b)))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Any strictly positive amount between distinct users passes.
    #[test]
    fn prop_positive_transfer_accepted(
        (sender, recipient) in distinct_pair(),
        amount in positive_amount(),
    ) {
        let request = TransferRequest { sender_id: sender, recipient_id: recipient, amount, idempotency_key: None };
        prop_assert!(validate_transfer(&request).is_ok());
    }

    /// Any non-positive amount is rejected, whatever the users are.
    #[test]
    fn prop_non_positive_transfer_rejected(
        (sender, recipient) in distinct_pair(),
        amount in non_positive_amount(),
    ) {
        let request = TransferRequest { sender_id: sender, recipient_id: recipient, amount, idempotency_key: None };
        prop_assert!(validate_transfer(&request).is_err());
    }

    /// A transfer to oneself is rejected regardless of the amount.
    #[test]
    fn prop_self_transfer_rejected(
        user in any::<u128>().prop_map(Uuid::from_u128),
        amount in positive_amount(),
    ) {
        let request = TransferRequest { sender_id: user, recipient_id: user, amount, idempotency_key: None };
        prop_assert!(validate_transfer(&request).is_err());
    }

    /// The validated distribution total equals the sum of the shares, so the
    /// single sender debit conserves total value against the N credits.
    #[test]
    fn prop_distribution_total_is_share_sum(
        sender in any::<u128>().prop_map(Uuid::from_u128),
        amounts in proptest::collection::vec(positive_amount(), 1..20),
    ) {
        let expected: Decimal = amounts.iter().copied().sum();
        let request = DistributionRequest {
            sender_id: sender,
            distributions: amounts
                .into_iter()
                .map(|amount| Distribution { recipient_id: Uuid::new_v4(), amount })
                .collect(),
        };
        prop_assert_eq!(validate_distribution(&request), Ok(expected));
    }

    /// One bad share poisons the whole distribution.
    #[test]
    fn prop_distribution_rejected_on_any_bad_share(
        sender in any::<u128>().prop_map(Uuid::from_u128),
        good in proptest::collection::vec(positive_amount(), 0..10),
        bad in non_positive_amount(),
        position in 0usize..10,
    ) {
        let mut shares: Vec<Distribution> = good
            .into_iter()
            .map(|amount| Distribution { recipient_id: Uuid::new_v4(), amount })
            .collect();
        let at = position.min(shares.len());
        shares.insert(at, Distribution { recipient_id: Uuid::new_v4(), amount: bad });

        let request = DistributionRequest { sender_id: sender, distributions: shares };
        prop_assert!(validate_distribution(&request).is_err());
    }
}
