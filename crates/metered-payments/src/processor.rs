//! Stripe Integration
//!
//! Saves a card for future charges: look the customer up, create a setup
//! intent for Stripe.js to confirm, then make the confirmed payment method the
//! customer's default.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use stripe::{
    AccountId, Client, CreateSetupIntent, Customer, CustomerId, CustomerInvoiceSettings,
    Expandable, PaymentMethod, SetupIntent, SetupIntentId, StripeError, UpdateCustomer,
};

use crate::error::{PaymentError, Result};
use crate::model::{CustomerSummary, PaymentMethodSummary, SetupIntentSummary};

/// Payment processor operations used by the payment pages
#[async_trait]
pub trait PaymentProcessor: Send + Sync {
    /// Customer record with the default payment method expanded
    async fn fetch_customer(&self, customer_id: &str) -> Result<CustomerSummary>;

    /// Start saving a payment method for the customer
    async fn create_setup_intent(&self, customer_id: &str) -> Result<SetupIntentSummary>;

    /// Make the payment method collected by a confirmed setup intent the
    /// customer's default. Returns the payment method id.
    async fn attach_payment_method(&self, customer_id: &str, setup_intent_id: &str)
    -> Result<String>;

    /// Key the browser uses to load Stripe.js
    fn publishable_key(&self) -> &str;
}

/// Stripe configuration
#[derive(Clone, Debug)]
pub struct StripeConfig {
    pub secret_key: String,
    pub publishable_key: String,

    /// Connected account every call is scoped to (`Stripe-Account` header)
    pub account: Option<String>,

    pub timeout_secs: u64,
}

impl StripeConfig {
    /// Create from environment variables
    pub fn from_env() -> Result<Self> {
        let secret_key = std::env::var("STRIPE_SECRET_KEY")
            .map_err(|_| PaymentError::Config("STRIPE_SECRET_KEY not set".into()))?;
        let publishable_key = std::env::var("STRIPE_PUBLISHABLE_KEY")
            .map_err(|_| PaymentError::Config("STRIPE_PUBLISHABLE_KEY not set".into()))?;
        let account = std::env::var("STRIPE_ACCOUNT").ok().filter(|a| !a.is_empty());
        let timeout_secs = std::env::var("STRIPE_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(10);

        Ok(Self {
            secret_key,
            publishable_key,
            account,
            timeout_secs,
        })
    }
}

/// Stripe client wrapper
pub struct StripePayments {
    client: Client,
    publishable_key: String,
    timeout: Duration,
}

impl StripePayments {
    pub fn new(config: StripeConfig) -> Result<Self> {
        let mut client = Client::new(config.secret_key);
        if let Some(account) = config.account {
            let account: AccountId = account
                .parse()
                .map_err(|_| PaymentError::InvalidId(account.clone()))?;
            client = client.with_stripe_account(account);
        }

        Ok(Self {
            client,
            publishable_key: config.publishable_key,
            timeout: Duration::from_secs(config.timeout_secs),
        })
    }

    pub fn from_env() -> Result<Self> {
        Self::new(StripeConfig::from_env()?)
    }

    async fn bounded<T, F>(&self, call: F) -> Result<T>
    where
        F: Future<Output = std::result::Result<T, StripeError>> + Send,
    {
        tokio::time::timeout(self.timeout, call)
            .await
            .map_err(|_| PaymentError::Timeout(self.timeout.as_secs()))?
            .map_err(PaymentError::from)
    }
}

fn customer_id(id: &str) -> Result<CustomerId> {
    id.parse().map_err(|_| PaymentError::InvalidId(id.to_string()))
}

fn setup_intent_id(id: &str) -> Result<SetupIntentId> {
    id.parse().map_err(|_| PaymentError::InvalidId(id.to_string()))
}

fn summarize_payment_method(method: &PaymentMethod) -> PaymentMethodSummary {
    let card = method.card.as_ref();
    PaymentMethodSummary {
        id: method.id.to_string(),
        kind: method.type_.to_string(),
        brand: card.map(|c| c.brand.clone()),
        last4: card.map(|c| c.last4.clone()),
        exp_month: card.map(|c| c.exp_month),
        exp_year: card.map(|c| c.exp_year),
    }
}

#[async_trait]
impl PaymentProcessor for StripePayments {
    async fn fetch_customer(&self, customer_id_str: &str) -> Result<CustomerSummary> {
        let id = customer_id(customer_id_str)?;
        let customer = self
            .bounded(Customer::retrieve(
                &self.client,
                &id,
                &["invoice_settings.default_payment_method"],
            ))
            .await?;

        let default_payment_method = customer
            .invoice_settings
            .as_ref()
            .and_then(|settings| settings.default_payment_method.as_ref())
            .and_then(|method| match method {
                Expandable::Object(method) => Some(summarize_payment_method(method)),
                Expandable::Id(_) => None,
            });

        Ok(CustomerSummary {
            id: customer.id.to_string(),
            email: customer.email.clone(),
            name: customer.name.clone(),
            default_payment_method,
        })
    }

    async fn create_setup_intent(&self, customer_id_str: &str) -> Result<SetupIntentSummary> {
        let mut params = CreateSetupIntent::new();
        params.customer = Some(customer_id(customer_id_str)?);

        let intent = self.bounded(SetupIntent::create(&self.client, params)).await?;
        let client_secret = intent
            .client_secret
            .clone()
            .ok_or(PaymentError::MissingField("client_secret"))?;

        tracing::info!(
            customer_id = %customer_id_str,
            setup_intent = %intent.id,
            "Created setup intent"
        );

        Ok(SetupIntentSummary {
            id: intent.id.to_string(),
            client_secret,
            status: intent.status.to_string(),
        })
    }

    async fn attach_payment_method(
        &self,
        customer_id_str: &str,
        setup_intent_id_str: &str,
    ) -> Result<String> {
        let customer = customer_id(customer_id_str)?;
        let intent_id = setup_intent_id(setup_intent_id_str)?;

        let intent = self
            .bounded(SetupIntent::retrieve(&self.client, &intent_id, &[]))
            .await?;
        let payment_method = match intent.payment_method {
            Some(Expandable::Id(id)) => id.to_string(),
            Some(Expandable::Object(method)) => method.id.to_string(),
            None => return Err(PaymentError::MissingField("payment_method")),
        };

        let update = UpdateCustomer {
            invoice_settings: Some(CustomerInvoiceSettings {
                default_payment_method: Some(payment_method.clone()),
                ..Default::default()
            }),
            ..Default::default()
        };
        self.bounded(Customer::update(&self.client, &customer, update))
            .await?;

        tracing::info!(
            customer_id = %customer_id_str,
            payment_method = %payment_method,
            "Attached default payment method"
        );

        Ok(payment_method)
    }

    fn publishable_key(&self) -> &str {
        &self.publishable_key
    }
}
