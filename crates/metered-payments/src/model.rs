//! Provider-neutral views of Stripe objects

use serde::{Deserialize, Serialize};

/// A customer with their default payment method, if any
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerSummary {
    pub id: String,
    pub email: Option<String>,
    pub name: Option<String>,
    pub default_payment_method: Option<PaymentMethodSummary>,
}

/// A saved payment method
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentMethodSummary {
    pub id: String,

    /// Payment method type, e.g. `card`
    pub kind: String,

    pub brand: Option<String>,
    pub last4: Option<String>,
    pub exp_month: Option<i64>,
    pub exp_year: Option<i64>,
}

impl PaymentMethodSummary {
    /// Short label such as `visa •••• 4242`
    pub fn label(&self) -> String {
        match (&self.brand, &self.last4) {
            (Some(brand), Some(last4)) => format!("{brand} •••• {last4}"),
            _ => self.kind.clone(),
        }
    }
}

/// An in-progress attempt to save a payment method
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetupIntentSummary {
    pub id: String,

    /// Handed to Stripe.js to confirm the intent in the browser
    pub client_secret: String,

    pub status: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payment_method_label() {
        let card = PaymentMethodSummary {
            id: "pm_123".into(),
            kind: "card".into(),
            brand: Some("visa".into()),
            last4: Some("4242".into()),
            exp_month: Some(12),
            exp_year: Some(2030),
        };
        assert_eq!(card.label(), "visa •••• 4242");

        let bank = PaymentMethodSummary {
            brand: None,
            last4: None,
            kind: "us_bank_account".into(),
            ..card
        };
        assert_eq!(bank.label(), "us_bank_account");
    }
}
