//! Fund administration.

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use tracing::{info, warn};
use tsnt_shared::types::money::validate_balance;
use tsnt_shared::types::{Amount, DEFAULT_CURRENCY, FundId, normalize_currency};

use super::error::FinanceError;
use super::store::FundRepository;
use super::types::{CreateFundInput, Fund, UpdateFundInput};

/// Service for creating, editing and removing funds.
///
/// Balances only change through the ledger, except for the explicit
/// [`FundService::override_balance`] escape hatch.
pub struct FundService<R: FundRepository> {
    repo: Arc<R>,
    default_currency: String,
}

impl<R: FundRepository> FundService<R> {
    /// Create a new fund service.
    #[must_use]
    pub fn new(repo: Arc<R>) -> Self {
        Self {
            repo,
            default_currency: DEFAULT_CURRENCY.to_string(),
        }
    }

    /// Sets the currency used when a fund is created without one.
    #[must_use]
    pub fn with_default_currency(mut self, currency: impl Into<String>) -> Self {
        self.default_currency = currency.into();
        self
    }

    /// Create a fund with an initial balance.
    ///
    /// # Errors
    ///
    /// Returns `FinanceError::Validation` if the name is blank, the initial
    /// balance is negative or too precise, or the currency code is malformed.
    pub async fn create(&self, input: CreateFundInput) -> Result<Fund, FinanceError> {
        let name = validate_name(&input.name)?;
        let balance = validate_balance(input.initial_balance)?;
        let currency = normalize_currency(input.currency.as_deref(), &self.default_currency)
            .map_err(FinanceError::Validation)?;

        let now = Utc::now();
        let fund = Fund {
            id: FundId::new(),
            name,
            balance,
            opening_balance: balance,
            currency,
            account_num: clean_optional(input.account_num),
            created_at: now,
            updated_at: now,
        };

        let fund = self.repo.insert_fund(fund).await?;
        info!(fund_id = %fund.id, balance = %fund.balance, currency = %fund.currency, "fund created");
        Ok(fund)
    }

    /// Get a fund by ID.
    pub async fn get(&self, id: FundId) -> Result<Fund, FinanceError> {
        self.repo
            .find_fund(id)
            .await?
            .ok_or(FinanceError::FundNotFound(id))
    }

    /// List all funds sorted by name.
    pub async fn list(&self) -> Result<Vec<Fund>, FinanceError> {
        self.repo.list_funds().await
    }

    /// Edit name, currency or account number.
    pub async fn update(&self, id: FundId, input: UpdateFundInput) -> Result<Fund, FinanceError> {
        let mut fund = self.get(id).await?;

        if let Some(name) = input.name {
            fund.name = validate_name(&name)?;
        }
        if let Some(currency) = input.currency {
            fund.currency = normalize_currency(Some(&currency), &self.default_currency)
                .map_err(FinanceError::Validation)?;
        }
        if input.account_num.is_some() {
            fund.account_num = clean_optional(input.account_num);
        }
        fund.updated_at = Utc::now();

        let fund = self.repo.update_fund_metadata(fund).await?;
        info!(fund_id = %fund.id, "fund updated");
        Ok(fund)
    }

    /// Delete a fund no ledger entry references.
    ///
    /// # Errors
    ///
    /// Returns `FinanceError::FundHasTransactions` when entries still point at it.
    pub async fn remove(&self, id: FundId) -> Result<(), FinanceError> {
        self.repo.delete_fund(id).await?;
        info!(fund_id = %id, "fund deleted");
        Ok(())
    }

    /// Atomically add to a fund balance.
    pub async fn increment_balance(&self, id: FundId, amount: Amount) -> Result<Fund, FinanceError> {
        self.repo.increment_balance(id, amount).await
    }

    /// Atomically subtract from a fund balance.
    ///
    /// # Errors
    ///
    /// Returns `FinanceError::InsufficientBalance` if the balance does not
    /// cover `amount`; the balance is then unchanged.
    pub async fn decrement_balance(&self, id: FundId, amount: Amount) -> Result<Fund, FinanceError> {
        self.repo.decrement_balance(id, amount).await
    }

    /// Administrative balance override.
    ///
    /// The opening balance moves by the same delta so audits stay consistent.
    pub async fn override_balance(
        &self,
        id: FundId,
        new_balance: Decimal,
    ) -> Result<Fund, FinanceError> {
        let new_balance = validate_balance(new_balance)?;
        let before = self.get(id).await?;
        let fund = self.repo.override_balance(id, new_balance).await?;
        warn!(
            fund_id = %id,
            previous = %before.balance,
            balance = %fund.balance,
            "fund balance overridden"
        );
        Ok(fund)
    }
}

fn validate_name(name: &str) -> Result<String, FinanceError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(FinanceError::validation("Fund name is required"));
    }
    Ok(name.to_string())
}

fn clean_optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
