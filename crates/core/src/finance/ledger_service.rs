//! Transaction ledger service.
//!
//! Records income and expense entries and drives balance reconciliation:
//! - creation in `completed` applies the entry's effect
//! - status changes into or out of `completed` apply or revert it
//! - deleting a `completed` entry reverts it
//!
//! The effect and the record write always go to storage as one call, so a
//! refused effect (e.g. insufficient balance) aborts the whole operation.

use std::sync::Arc;

use chrono::Utc;
use tracing::info;
use tsnt_shared::types::{Amount, FinanceTransactionId, PageRequest, PageResponse};

use super::error::FinanceError;
use super::reconciliation::{creation_effect, removal_effect, transition_effect};
use super::store::TransactionRepository;
use super::types::{
    CreateTransactionInput, FinanceTransaction, PublicContribution, RefObject, TopContributor,
    TransactionFilter, TransactionStatus, TransactionType, TransactionView,
};

/// Default number of entries on the top contributors board.
pub const DEFAULT_TOP_CONTRIBUTORS: u32 = 3;

/// Ledger service over a transaction repository.
pub struct LedgerService<R: TransactionRepository> {
    repo: Arc<R>,
    top_contributors_limit: u32,
}

impl<R: TransactionRepository> LedgerService<R> {
    /// Create a new ledger service.
    #[must_use]
    pub fn new(repo: Arc<R>) -> Self {
        Self {
            repo,
            top_contributors_limit: DEFAULT_TOP_CONTRIBUTORS,
        }
    }

    /// Sets the board size used when no limit is requested.
    #[must_use]
    pub fn with_top_contributors_limit(mut self, limit: u32) -> Self {
        self.top_contributors_limit = limit.max(1);
        self
    }

    /// Record a new entry.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - the amount is not positive or has more than two decimals
    /// - the description is blank
    /// - the initial status is `rejected`
    /// - the fund does not exist
    /// - the entry is a completed expense the fund cannot cover
    pub async fn create(
        &self,
        input: CreateTransactionInput,
    ) -> Result<FinanceTransaction, FinanceError> {
        let amount = Amount::new(input.amount)?;
        let description = input.description.trim().to_string();
        if description.is_empty() {
            return Err(FinanceError::validation("Description is required"));
        }
        let status = input.status.unwrap_or_default();
        if status == TransactionStatus::Rejected {
            return Err(FinanceError::validation(
                "Transactions can only be created as pending or completed",
            ));
        }

        let now = Utc::now();
        let tx = FinanceTransaction {
            id: FinanceTransactionId::new(),
            fund_id: input.fund_id,
            user_id: input.user_id,
            kind: input.kind,
            amount,
            description,
            status,
            invoice: input.invoice.filter(|invoice| !invoice.is_empty()),
            ref_obj: input.ref_obj,
            created_at: now,
            updated_at: now,
        };

        let effect = creation_effect(tx.kind, tx.amount, tx.status);
        let tx = self.repo.insert_transaction(tx, effect).await?;
        info!(
            transaction_id = %tx.id,
            fund_id = %tx.fund_id,
            kind = %tx.kind,
            amount = %tx.amount,
            status = %tx.status,
            "transaction recorded"
        );
        Ok(tx)
    }

    /// Get an entry with fund and user populated.
    pub async fn get(&self, id: FinanceTransactionId) -> Result<TransactionView, FinanceError> {
        self.repo
            .find_transaction_view(id)
            .await?
            .ok_or(FinanceError::TransactionNotFound(id))
    }

    /// Change an entry's status, applying or reverting its balance effect.
    ///
    /// Writing the status an entry already has changes nothing.
    ///
    /// # Errors
    ///
    /// Returns `FinanceError::ConcurrentModification` if another caller changed
    /// the status first, and `FinanceError::InsufficientBalance` if the
    /// effect cannot be funded. Neither is retried.
    pub async fn update_status(
        &self,
        id: FinanceTransactionId,
        status: TransactionStatus,
    ) -> Result<FinanceTransaction, FinanceError> {
        let current = self
            .repo
            .find_transaction(id)
            .await?
            .ok_or(FinanceError::TransactionNotFound(id))?;

        if current.status == status {
            return Ok(current);
        }

        let effect = transition_effect(current.kind, current.amount, current.status, status);
        let tx = self
            .repo
            .update_status(id, current.status, status, effect)
            .await?;
        info!(
            transaction_id = %id,
            fund_id = %tx.fund_id,
            from = %current.status,
            to = %tx.status,
            amount = %tx.amount,
            "transaction status changed"
        );
        Ok(tx)
    }

    /// Delete an entry, reverting its effect if it was completed.
    pub async fn remove(&self, id: FinanceTransactionId) -> Result<(), FinanceError> {
        let current = self
            .repo
            .find_transaction(id)
            .await?
            .ok_or(FinanceError::TransactionNotFound(id))?;

        let effect = removal_effect(current.kind, current.amount, current.status);
        self.repo
            .delete_transaction(id, current.status, effect)
            .await?;
        info!(
            transaction_id = %id,
            fund_id = %current.fund_id,
            status = %current.status,
            amount = %current.amount,
            "transaction deleted"
        );
        Ok(())
    }

    /// List entries with filters, sorting and pagination.
    ///
    /// A search term matches populated user fields, so it is applied after
    /// the query over the full filtered set; `total` then counts matches.
    pub async fn list(
        &self,
        filter: &TransactionFilter,
    ) -> Result<PageResponse<TransactionView>, FinanceError> {
        match filter.search_term() {
            None => {
                let (views, total) = self
                    .repo
                    .query_transactions(filter, Some(filter.page))
                    .await?;
                Ok(PageResponse::new(views, filter.page, total))
            }
            Some(term) => {
                let (views, _) = self.repo.query_transactions(filter, None).await?;
                let matching = views
                    .into_iter()
                    .filter(|view| view.matches_search(&term))
                    .collect();
                Ok(PageResponse::from_full_set(matching, filter.page))
            }
        }
    }

    /// Completed income, newest first, in public form.
    pub async fn public_contributions(
        &self,
        page: PageRequest,
    ) -> Result<PageResponse<PublicContribution>, FinanceError> {
        let filter = TransactionFilter {
            kind: Some(TransactionType::Income),
            status: Some(TransactionStatus::Completed),
            page,
            ..Default::default()
        };
        let (views, total) = self.repo.query_transactions(&filter, Some(page)).await?;
        Ok(PageResponse::new(views, page, total).map(PublicContribution::from))
    }

    /// Users ranked by total completed income.
    pub async fn top_contributors(
        &self,
        limit: Option<u32>,
    ) -> Result<Vec<TopContributor>, FinanceError> {
        let limit = limit.unwrap_or(self.top_contributors_limit).max(1);
        self.repo.top_contributors(limit).await
    }

    /// Entries created for a business object.
    pub async fn by_reference(
        &self,
        reference: RefObject,
    ) -> Result<Vec<FinanceTransaction>, FinanceError> {
        self.repo.find_by_reference(reference).await
    }
}
