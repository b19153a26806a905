//! Conversions between `SeaORM` models and finance domain types.

use chrono::{DateTime, Utc};
use sea_orm::DbErr;
use sea_orm::prelude::DateTimeWithTimeZone;
use tsnt_core::finance::{
    BankAccount, BankAccountStatus, FinanceError, FinanceTransaction, Fund, FundSummary, Invoice,
    RefObject, TransactionStatus, TransactionType, UserSummary,
};
use tsnt_shared::types::{Amount, BankAccountId, FinanceTransactionId, FundId, UserId};

use crate::entities::{
    bank_accounts, finance_transactions, funds, sea_orm_active_enums, users,
};

/// Maps a database error onto the finance error space.
pub(crate) fn storage(err: DbErr) -> FinanceError {
    FinanceError::Storage(err.to_string())
}

pub(crate) fn utc(value: DateTimeWithTimeZone) -> DateTime<Utc> {
    value.with_timezone(&Utc)
}

impl From<TransactionType> for sea_orm_active_enums::FinanceTransactionType {
    fn from(kind: TransactionType) -> Self {
        match kind {
            TransactionType::Income => Self::Income,
            TransactionType::Expense => Self::Expense,
        }
    }
}

impl From<sea_orm_active_enums::FinanceTransactionType> for TransactionType {
    fn from(kind: sea_orm_active_enums::FinanceTransactionType) -> Self {
        match kind {
            sea_orm_active_enums::FinanceTransactionType::Income => Self::Income,
            sea_orm_active_enums::FinanceTransactionType::Expense => Self::Expense,
        }
    }
}

impl From<TransactionStatus> for sea_orm_active_enums::FinanceTransactionStatus {
    fn from(status: TransactionStatus) -> Self {
        match status {
            TransactionStatus::Pending => Self::Pending,
            TransactionStatus::Completed => Self::Completed,
            TransactionStatus::Rejected => Self::Rejected,
        }
    }
}

impl From<sea_orm_active_enums::FinanceTransactionStatus> for TransactionStatus {
    fn from(status: sea_orm_active_enums::FinanceTransactionStatus) -> Self {
        match status {
            sea_orm_active_enums::FinanceTransactionStatus::Pending => Self::Pending,
            sea_orm_active_enums::FinanceTransactionStatus::Completed => Self::Completed,
            sea_orm_active_enums::FinanceTransactionStatus::Rejected => Self::Rejected,
        }
    }
}

impl From<BankAccountStatus> for sea_orm_active_enums::BankAccountStatus {
    fn from(status: BankAccountStatus) -> Self {
        match status {
            BankAccountStatus::Active => Self::Active,
            BankAccountStatus::Inactive => Self::Inactive,
        }
    }
}

impl From<sea_orm_active_enums::BankAccountStatus> for BankAccountStatus {
    fn from(status: sea_orm_active_enums::BankAccountStatus) -> Self {
        match status {
            sea_orm_active_enums::BankAccountStatus::Active => Self::Active,
            sea_orm_active_enums::BankAccountStatus::Inactive => Self::Inactive,
        }
    }
}

pub(crate) fn fund_from_model(model: funds::Model) -> Fund {
    Fund {
        id: FundId::from_uuid(model.id),
        name: model.name,
        balance: model.balance,
        opening_balance: model.opening_balance,
        currency: model.currency,
        account_num: model.account_num,
        created_at: utc(model.created_at),
        updated_at: utc(model.updated_at),
    }
}

pub(crate) fn fund_summary(model: &funds::Model) -> FundSummary {
    FundSummary {
        id: FundId::from_uuid(model.id),
        name: model.name.clone(),
        currency: model.currency.clone(),
    }
}

pub(crate) fn user_summary(model: &users::Model) -> UserSummary {
    UserSummary {
        id: UserId::from_uuid(model.id),
        username: model.username.clone(),
        email: model.email.clone(),
        full_name: model.full_name.clone(),
        avatar: model.avatar.clone(),
    }
}

/// Rebuilds a ledger entry from its row.
///
/// Fails if the stored amount or reference is not representable, which the
/// table checks rule out.
pub(crate) fn transaction_from_model(
    model: finance_transactions::Model,
) -> Result<FinanceTransaction, FinanceError> {
    let amount = Amount::new(model.amount)?;
    let invoice = Invoice {
        url: model.invoice_url,
        code: model.invoice_code,
    };
    let ref_obj = match (model.ref_model.as_deref(), model.ref_id) {
        (Some(name), Some(id)) => Some(RefObject::from_parts(name, id).ok_or_else(|| {
            FinanceError::Storage(format!("Unknown reference model '{name}'"))
        })?),
        _ => None,
    };

    Ok(FinanceTransaction {
        id: FinanceTransactionId::from_uuid(model.id),
        fund_id: FundId::from_uuid(model.fund_id),
        user_id: UserId::from_uuid(model.user_id),
        kind: model.kind.into(),
        amount,
        description: model.description,
        status: model.status.into(),
        invoice: (!invoice.is_empty()).then_some(invoice),
        ref_obj,
        created_at: utc(model.created_at),
        updated_at: utc(model.updated_at),
    })
}

pub(crate) fn transaction_to_active(tx: &FinanceTransaction) -> finance_transactions::ActiveModel {
    use sea_orm::Set;

    let invoice = tx.invoice.clone().unwrap_or_default();
    finance_transactions::ActiveModel {
        id: Set(tx.id.into_inner()),
        fund_id: Set(tx.fund_id.into_inner()),
        user_id: Set(tx.user_id.into_inner()),
        kind: Set(tx.kind.into()),
        amount: Set(tx.amount.value()),
        description: Set(tx.description.clone()),
        status: Set(tx.status.into()),
        invoice_url: Set(invoice.url),
        invoice_code: Set(invoice.code),
        ref_model: Set(tx.ref_obj.map(|r| r.model().to_string())),
        ref_id: Set(tx.ref_obj.map(|r| r.id())),
        created_at: Set(tx.created_at.into()),
        updated_at: Set(tx.updated_at.into()),
    }
}

pub(crate) fn bank_account_from_model(model: bank_accounts::Model) -> BankAccount {
    BankAccount {
        id: BankAccountId::from_uuid(model.id),
        bank_name: model.bank_name,
        account_number: model.account_number,
        account_holder: model.account_holder,
        qr_code_url: model.qr_code_url,
        status: model.status.into(),
        note: model.note,
        created_at: utc(model.created_at),
        updated_at: utc(model.updated_at),
    }
}

pub(crate) fn bank_account_to_active(account: &BankAccount) -> bank_accounts::ActiveModel {
    use sea_orm::Set;

    bank_accounts::ActiveModel {
        id: Set(account.id.into_inner()),
        bank_name: Set(account.bank_name.clone()),
        account_number: Set(account.account_number.clone()),
        account_holder: Set(account.account_holder.clone()),
        qr_code_url: Set(account.qr_code_url.clone()),
        status: Set(account.status.into()),
        note: Set(account.note.clone()),
        created_at: Set(account.created_at.into()),
        updated_at: Set(account.updated_at.into()),
    }
}
