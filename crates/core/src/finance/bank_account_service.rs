//! Donation bank accounts.

use std::sync::Arc;

use chrono::Utc;
use tracing::info;
use tsnt_shared::types::BankAccountId;

use super::error::FinanceError;
use super::store::BankAccountRepository;
use super::types::{BankAccount, CreateBankAccountInput, UpdateBankAccountInput};

const MIN_BANK_NAME_LEN: usize = 2;
const MIN_ACCOUNT_NUMBER_LEN: usize = 8;
const MIN_ACCOUNT_HOLDER_LEN: usize = 2;

/// Service for the bank accounts shown to donors.
pub struct BankAccountService<R: BankAccountRepository> {
    repo: Arc<R>,
}

impl<R: BankAccountRepository> BankAccountService<R> {
    /// Create a new bank account service.
    #[must_use]
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    /// Create a bank account.
    pub async fn create(&self, input: CreateBankAccountInput) -> Result<BankAccount, FinanceError> {
        let now = Utc::now();
        let account = BankAccount {
            id: BankAccountId::new(),
            bank_name: min_len("Bank name", &input.bank_name, MIN_BANK_NAME_LEN)?,
            account_number: min_len(
                "Account number",
                &input.account_number,
                MIN_ACCOUNT_NUMBER_LEN,
            )?,
            account_holder: min_len(
                "Account holder",
                &input.account_holder,
                MIN_ACCOUNT_HOLDER_LEN,
            )?,
            qr_code_url: clean_optional(input.qr_code_url),
            status: input.status.unwrap_or_default(),
            note: clean_optional(input.note),
            created_at: now,
            updated_at: now,
        };

        let account = self.repo.insert_bank_account(account).await?;
        info!(bank_account_id = %account.id, bank = %account.bank_name, "bank account created");
        Ok(account)
    }

    /// List bank accounts, optionally only active ones.
    pub async fn list(&self, active_only: bool) -> Result<Vec<BankAccount>, FinanceError> {
        self.repo.list_bank_accounts(active_only).await
    }

    /// Get a bank account by ID.
    pub async fn get(&self, id: BankAccountId) -> Result<BankAccount, FinanceError> {
        self.repo
            .find_bank_account(id)
            .await?
            .ok_or(FinanceError::BankAccountNotFound(id))
    }

    /// Apply a partial update.
    pub async fn update(
        &self,
        id: BankAccountId,
        input: UpdateBankAccountInput,
    ) -> Result<BankAccount, FinanceError> {
        let mut account = self.get(id).await?;

        if let Some(bank_name) = input.bank_name {
            account.bank_name = min_len("Bank name", &bank_name, MIN_BANK_NAME_LEN)?;
        }
        if let Some(number) = input.account_number {
            account.account_number = min_len("Account number", &number, MIN_ACCOUNT_NUMBER_LEN)?;
        }
        if let Some(holder) = input.account_holder {
            account.account_holder = min_len("Account holder", &holder, MIN_ACCOUNT_HOLDER_LEN)?;
        }
        if input.qr_code_url.is_some() {
            account.qr_code_url = clean_optional(input.qr_code_url);
        }
        if let Some(status) = input.status {
            account.status = status;
        }
        if input.note.is_some() {
            account.note = clean_optional(input.note);
        }
        account.updated_at = Utc::now();

        let account = self.repo.update_bank_account(account).await?;
        info!(bank_account_id = %id, "bank account updated");
        Ok(account)
    }

    /// Delete a bank account.
    pub async fn remove(&self, id: BankAccountId) -> Result<(), FinanceError> {
        self.repo.delete_bank_account(id).await?;
        info!(bank_account_id = %id, "bank account deleted");
        Ok(())
    }
}

fn min_len(field: &str, value: &str, min: usize) -> Result<String, FinanceError> {
    let value = value.trim();
    if value.chars().count() < min {
        return Err(FinanceError::Validation(format!(
            "{field} must be at least {min} characters"
        )));
    }
    Ok(value.to_string())
}

fn clean_optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finance::memory::InMemoryFinanceStore;
    use crate::finance::types::BankAccountStatus;

    fn service() -> BankAccountService<InMemoryFinanceStore> {
        BankAccountService::new(Arc::new(InMemoryFinanceStore::new()))
    }

    fn input(bank: &str, status: Option<BankAccountStatus>) -> CreateBankAccountInput {
        CreateBankAccountInput {
            bank_name: bank.to_string(),
            account_number: "0071000123456".to_string(),
            account_holder: "QUY THAP SANG NIEM TIN".to_string(),
            status,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_defaults_to_active() {
        let accounts = service();
        let account = accounts.create(input("Vietcombank", None)).await.unwrap();
        assert_eq!(account.status, BankAccountStatus::Active);
        assert_eq!(accounts.get(account.id).await.unwrap(), account);
    }

    #[tokio::test]
    async fn test_create_validates_lengths() {
        let accounts = service();
        assert!(accounts.create(input("V", None)).await.is_err());

        let short_number = CreateBankAccountInput {
            account_number: "1234567".to_string(),
            ..input("Vietcombank", None)
        };
        let err = accounts.create(short_number).await.unwrap_err();
        assert_eq!(
            err,
            FinanceError::Validation("Account number must be at least 8 characters".to_string())
        );
    }

    #[tokio::test]
    async fn test_list_active_only_sorted() {
        let accounts = service();
        accounts.create(input("Techcombank", None)).await.unwrap();
        accounts
            .create(input("Agribank", Some(BankAccountStatus::Inactive)))
            .await
            .unwrap();
        accounts.create(input("BIDV", None)).await.unwrap();

        let all: Vec<String> = accounts
            .list(false)
            .await
            .unwrap()
            .into_iter()
            .map(|a| a.bank_name)
            .collect();
        assert_eq!(all, vec!["Agribank", "BIDV", "Techcombank"]);

        let active = accounts.list(true).await.unwrap();
        assert_eq!(active.len(), 2);
        assert!(active.iter().all(|a| a.status == BankAccountStatus::Active));
    }

    #[tokio::test]
    async fn test_update_and_remove() {
        let accounts = service();
        let account = accounts.create(input("Vietcombank", None)).await.unwrap();

        let updated = accounts
            .update(
                account.id,
                UpdateBankAccountInput {
                    status: Some(BankAccountStatus::Inactive),
                    note: Some("Closed for maintenance".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.status, BankAccountStatus::Inactive);
        assert_eq!(updated.bank_name, "Vietcombank");
        assert_eq!(updated.note.as_deref(), Some("Closed for maintenance"));

        accounts.remove(account.id).await.unwrap();
        assert_eq!(
            accounts.get(account.id).await.unwrap_err(),
            FinanceError::BankAccountNotFound(account.id)
        );
        assert!(accounts.remove(account.id).await.is_err());
    }
}
