//! Log-entry description formatting.
//!
//! Descriptions are display text only. Counterparty identity is carried in
//! the structured `counterparty_user_id` column, never recovered by parsing
//! these strings.

use rust_decimal::Decimal;
use uuid::Uuid;

use pesa_shared::types::Currency;

/// Description for the sender's debit entry of a transfer.
#[must_use]
pub fn transfer_debit(
    recipient_name: &str,
    recipient_id: Uuid,
    amount: Decimal,
    currency: Currency,
) -> String {
    format!("Transfer to {recipient_name} ({recipient_id}) {amount} {currency}")
}

/// Description for the recipient's credit entry of a transfer or a
/// distribution share.
#[must_use]
pub fn transfer_credit(
    sender_name: &str,
    sender_id: Uuid,
    amount: Decimal,
    currency: Currency,
) -> String {
    format!("Received from {sender_name} ({sender_id}) {amount} {currency}")
}

/// Description for the sender's aggregate debit entry of a distribution,
/// listing every recipient and share.
#[must_use]
pub fn distribution_debit(shares: &[(String, Uuid, Decimal)], currency: Currency) -> String {
    let details: Vec<String> = shares
        .iter()
        .map(|(name, id, amount)| format!("{name} ({id}) - {amount} {currency}"))
        .collect();
    format!("Distributed funds to: {}", details.join(", "))
}

/// Description for an external-payment wallet credit.
#[must_use]
pub fn top_up() -> &'static str {
    "Mobile Money Load"
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_transfer_descriptions() {
        let id = Uuid::nil();
        assert_eq!(
            transfer_debit("Aminata Kamara", id, dec!(25.50), Currency::Sle),
            format!("Transfer to Aminata Kamara ({id}) 25.50 SLE")
        );
        assert_eq!(
            transfer_credit("Ibrahim Sesay", id, dec!(25.50), Currency::Sle),
            format!("Received from Ibrahim Sesay ({id}) 25.50 SLE")
        );
    }

    #[test]
    fn test_distribution_debit_lists_every_share() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let description = distribution_debit(
            &[
                ("Fatmata".to_string(), a, dec!(30)),
                ("Mohamed".to_string(), b, dec!(20)),
            ],
            Currency::Sle,
        );
        assert_eq!(
            description,
            format!("Distributed funds to: Fatmata ({a}) - 30 SLE, Mohamed ({b}) - 20 SLE")
        );
    }

    #[test]
    fn test_top_up_description() {
        assert_eq!(top_up(), "Mobile Money Load");
    }
}
