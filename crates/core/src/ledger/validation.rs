//! Request validation for ledger operations.
//!
//! Every rule here runs before a store transaction is opened; a validation
//! failure therefore never leaves partial state behind.

use rust_decimal::Decimal;

use super::error::ValidationError;
use super::types::{DistributionRequest, TransferRequest};

/// Validates a one-to-one transfer request.
///
/// # Errors
///
/// Returns an error if the amount is not strictly positive, the sender and
/// recipient are the same user, or a supplied idempotency key is blank.
pub fn validate_transfer(request: &TransferRequest) -> Result<(), ValidationError> {
    if request.amount <= Decimal::ZERO {
        return Err(ValidationError::NonPositiveAmount(request.amount));
    }
    if request.sender_id == request.recipient_id {
        return Err(ValidationError::SelfTransfer(request.sender_id));
    }
    if let Some(key) = &request.idempotency_key {
        if key.trim().is_empty() {
            return Err(ValidationError::EmptyReference);
        }
    }
    Ok(())
}

/// Validates a one-to-many distribution request and returns the aggregate
/// amount the sender will be debited.
///
/// # Errors
///
/// Returns an error if the list is empty, any share is not strictly
/// positive, or the sender appears among the recipients.
pub fn validate_distribution(request: &DistributionRequest) -> Result<Decimal, ValidationError> {
    if request.distributions.is_empty() {
        return Err(ValidationError::EmptyDistribution);
    }

    let mut total = Decimal::ZERO;
    for share in &request.distributions {
        if share.amount <= Decimal::ZERO {
            return Err(ValidationError::NonPositiveAmount(share.amount));
        }
        if share.recipient_id == request.sender_id {
            return Err(ValidationError::SelfTransfer(request.sender_id));
        }
        total += share.amount;
    }

    Ok(total)
}

/// Validates an external-payment credit before it reaches the wallet.
///
/// # Errors
///
/// Returns an error if the amount is not strictly positive or the external
/// reference is blank.
pub fn validate_top_up(amount: Decimal, reference: &str) -> Result<(), ValidationError> {
    if amount <= Decimal::ZERO {
        return Err(ValidationError::NonPositiveAmount(amount));
    }
    if reference.trim().is_empty() {
        return Err(ValidationError::EmptyReference);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::types::Distribution;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn transfer(amount: Decimal) -> TransferRequest {
        TransferRequest {
            sender_id: Uuid::new_v4(),
            recipient_id: Uuid::new_v4(),
            amount,
            idempotency_key: None,
        }
    }

    #[test]
    fn test_valid_transfer() {
        assert!(validate_transfer(&transfer(dec!(10))).is_ok());
    }

    #[rstest::rstest]
    #[case(dec!(0))]
    #[case(dec!(-5))]
    #[case(dec!(-0.01))]
    fn test_non_positive_amounts_rejected(#[case] amount: Decimal) {
        assert_eq!(
            validate_transfer(&transfer(amount)),
            Err(ValidationError::NonPositiveAmount(amount))
        );
    }

    #[test]
    fn test_self_transfer_rejected() {
        let user = Uuid::new_v4();
        let request = TransferRequest {
            sender_id: user,
            recipient_id: user,
            amount: dec!(10),
            idempotency_key: None,
        };
        assert_eq!(
            validate_transfer(&request),
            Err(ValidationError::SelfTransfer(user))
        );
    }

    #[test]
    fn test_blank_idempotency_key_rejected() {
        let mut request = transfer(dec!(10));
        request.idempotency_key = Some("  ".to_string());
        assert_eq!(
            validate_transfer(&request),
            Err(ValidationError::EmptyReference)
        );

        request.idempotency_key = Some("client-key-1".to_string());
        assert!(validate_transfer(&request).is_ok());
    }

    #[test]
    fn test_distribution_total() {
        let request = DistributionRequest {
            sender_id: Uuid::new_v4(),
            distributions: vec![
                Distribution {
                    recipient_id: Uuid::new_v4(),
                    amount: dec!(30),
                },
                Distribution {
                    recipient_id: Uuid::new_v4(),
                    amount: dec!(20),
                },
                Distribution {
                    recipient_id: Uuid::new_v4(),
                    amount: dec!(10),
                },
            ],
        };
        assert_eq!(validate_distribution(&request), Ok(dec!(60)));
    }

    #[test]
    fn test_empty_distribution_rejected() {
        let request = DistributionRequest {
            sender_id: Uuid::new_v4(),
            distributions: vec![],
        };
        assert_eq!(
            validate_distribution(&request),
            Err(ValidationError::EmptyDistribution)
        );
    }

    #[test]
    fn test_distribution_with_one_bad_share_rejected() {
        let request = DistributionRequest {
            sender_id: Uuid::new_v4(),
            distributions: vec![
                Distribution {
                    recipient_id: Uuid::new_v4(),
                    amount: dec!(30),
                },
                Distribution {
                    recipient_id: Uuid::new_v4(),
                    amount: dec!(0),
                },
            ],
        };
        assert_eq!(
            validate_distribution(&request),
            Err(ValidationError::NonPositiveAmount(dec!(0)))
        );
    }

    #[test]
    fn test_distribution_to_self_rejected() {
        let sender = Uuid::new_v4();
        let request = DistributionRequest {
            sender_id: sender,
            distributions: vec![Distribution {
                recipient_id: sender,
                amount: dec!(10),
            }],
        };
        assert_eq!(
            validate_distribution(&request),
            Err(ValidationError::SelfTransfer(sender))
        );
    }

    #[test]
    fn test_top_up_validation() {
        assert!(validate_top_up(dec!(50), "ref-1").is_ok());
        assert_eq!(
            validate_top_up(dec!(0), "ref-1"),
            Err(ValidationError::NonPositiveAmount(dec!(0)))
        );
        assert_eq!(
            validate_top_up(dec!(50), "   "),
            Err(ValidationError::EmptyReference)
        );
    }
}
