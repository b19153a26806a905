//! Finance domain types: funds, ledger entries, bank accounts, and views.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use tsnt_shared::types::{
    Amount, BankAccountId, FinanceTransactionId, FundId, PageRequest, ScholarshipApplicationId, UserId,
};

/// Direction of a ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    /// Money received by the fund.
    Income,
    /// Money paid out of the fund.
    Expense,
}

impl TransactionType {
    /// Returns the string representation of the type.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }

    /// Parses a type from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "income" => Some(Self::Income),
            "expense" => Some(Self::Expense),
            _ => None,
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Lifecycle status of a ledger entry.
///
/// Only `Completed` entries affect a fund balance. Any status can move to any
/// other; the balance effect is derived from whether the move enters or
/// leaves `Completed`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    /// Recorded but not yet settled.
    #[default]
    Pending,
    /// Settled; counted in the fund balance.
    Completed,
    /// Refused; never counted.
    Rejected,
}

impl TransactionStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Rejected => "rejected",
        }
    }

    /// Parses a status from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "completed" => Some(Self::Completed),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }

    /// Returns true if entries in this status count toward the balance.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed)
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Invoice attached to a ledger entry.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Invoice {
    /// Link to the scanned invoice.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Invoice or tax code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl Invoice {
    /// Returns true if neither field is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.url.is_none() && self.code.is_none()
    }
}

/// Business object a ledger entry was created for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "model", content = "id")]
pub enum RefObject {
    /// A scholarship payout or application fee.
    ScholarshipApplication(ScholarshipApplicationId),
}

impl RefObject {
    /// Model name as persisted.
    #[must_use]
    pub fn model(&self) -> &'static str {
        match self {
            Self::ScholarshipApplication(_) => "ScholarshipApplication",
        }
    }

    /// Raw id of the referenced object.
    #[must_use]
    pub fn id(&self) -> uuid::Uuid {
        match self {
            Self::ScholarshipApplication(id) => id.into_inner(),
        }
    }

    /// Rebuilds a reference from its persisted parts.
    pub fn from_parts(model: &str, id: uuid::Uuid) -> Option<Self> {
        match model {
            "ScholarshipApplication" => Some(Self::ScholarshipApplication(
                ScholarshipApplicationId::from_uuid(id),
            )),
            _ => None,
        }
    }
}

/// A named monetary account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fund {
    /// Fund ID.
    pub id: FundId,
    /// Display name.
    pub name: String,
    /// Current balance, never negative.
    pub balance: Decimal,
    /// Balance the fund started from (shifted by administrative overrides).
    pub opening_balance: Decimal,
    /// Currency code.
    pub currency: String,
    /// Bank account number the fund is held in.
    pub account_num: Option<String>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

/// A single income or expense event against a fund.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinanceTransaction {
    /// Transaction ID.
    pub id: FinanceTransactionId,
    /// Fund the entry belongs to.
    pub fund_id: FundId,
    /// Acting user.
    pub user_id: UserId,
    /// Income or expense.
    #[serde(rename = "type")]
    pub kind: TransactionType,
    /// Strictly positive amount.
    pub amount: Amount,
    /// Free-text description.
    #[serde(rename = "desc")]
    pub description: String,
    /// Lifecycle status.
    pub status: TransactionStatus,
    /// Optional invoice.
    pub invoice: Option<Invoice>,
    /// Optional business reference.
    pub ref_obj: Option<RefObject>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

/// Bank account status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BankAccountStatus {
    /// Shown to donors.
    #[default]
    Active,
    /// Hidden from donors.
    Inactive,
}

impl BankAccountStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
        }
    }
}

/// An account donors can transfer money to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankAccount {
    /// Bank account ID.
    pub id: BankAccountId,
    /// Bank name.
    pub bank_name: String,
    /// Account number.
    pub account_number: String,
    /// Account holder name.
    pub account_holder: String,
    /// Link to a QR code image for transfers.
    pub qr_code_url: Option<String>,
    /// Visibility status.
    pub status: BankAccountStatus,
    /// Internal note.
    pub note: Option<String>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

// ========== Inputs ==========

/// Input for creating a fund.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateFundInput {
    /// Display name.
    pub name: String,
    /// Starting balance, zero when omitted.
    #[serde(default, alias = "balance", with = "rust_decimal::serde::str")]
    pub initial_balance: Decimal,
    /// Currency code, the configured default when omitted.
    #[serde(default)]
    pub currency: Option<String>,
    /// Bank account number.
    #[serde(default)]
    pub account_num: Option<String>,
}

/// Partial update of fund metadata. The balance is not editable here.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateFundInput {
    /// New name.
    #[serde(default)]
    pub name: Option<String>,
    /// New currency code.
    #[serde(default)]
    pub currency: Option<String>,
    /// New bank account number.
    #[serde(default)]
    pub account_num: Option<String>,
}

/// Input for recording a ledger entry.
#[derive(Debug, Clone)]
pub struct CreateTransactionInput {
    /// Target fund.
    pub fund_id: FundId,
    /// Acting user.
    pub user_id: UserId,
    /// Income or expense.
    pub kind: TransactionType,
    /// Raw amount, validated by the ledger.
    pub amount: Decimal,
    /// Description.
    pub description: String,
    /// Initial status, `Pending` when omitted.
    pub status: Option<TransactionStatus>,
    /// Optional invoice.
    pub invoice: Option<Invoice>,
    /// Optional business reference.
    pub ref_obj: Option<RefObject>,
}

/// Input for creating a bank account.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateBankAccountInput {
    /// Bank name.
    pub bank_name: String,
    /// Account number.
    pub account_number: String,
    /// Account holder name.
    pub account_holder: String,
    /// QR code image link.
    #[serde(default)]
    pub qr_code_url: Option<String>,
    /// Status, active when omitted.
    #[serde(default)]
    pub status: Option<BankAccountStatus>,
    /// Internal note.
    #[serde(default)]
    pub note: Option<String>,
}

/// Partial update of a bank account.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateBankAccountInput {
    /// Bank name.
    #[serde(default)]
    pub bank_name: Option<String>,
    /// Account number.
    #[serde(default)]
    pub account_number: Option<String>,
    /// Account holder name.
    #[serde(default)]
    pub account_holder: Option<String>,
    /// QR code image link.
    #[serde(default)]
    pub qr_code_url: Option<String>,
    /// Status.
    #[serde(default)]
    pub status: Option<BankAccountStatus>,
    /// Internal note.
    #[serde(default)]
    pub note: Option<String>,
}

// ========== Queries ==========

/// Sortable columns for transaction listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    /// Creation time.
    #[default]
    #[serde(alias = "createdAt")]
    CreatedAt,
    /// Modification time.
    #[serde(alias = "updatedAt")]
    UpdatedAt,
    /// Amount.
    Amount,
    /// Status.
    Status,
    /// Type.
    #[serde(rename = "type")]
    Kind,
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Ascending.
    Asc,
    /// Descending.
    #[default]
    Desc,
}

/// Filters for listing ledger entries.
#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    /// Only entries of this fund.
    pub fund_id: Option<FundId>,
    /// Only entries of this type.
    pub kind: Option<TransactionType>,
    /// Only entries in this status.
    pub status: Option<TransactionStatus>,
    /// Created on or after this day.
    pub start_date: Option<NaiveDate>,
    /// Created on or before this day.
    pub end_date: Option<NaiveDate>,
    /// Case-insensitive term matched against user fields and description.
    pub search: Option<String>,
    /// Sort column.
    pub sort_by: SortField,
    /// Sort direction.
    pub sort_order: SortOrder,
    /// Page window.
    pub page: PageRequest,
}

impl TransactionFilter {
    /// Returns the normalized search term, if any.
    #[must_use]
    pub fn search_term(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase)
    }

    /// Inclusive lower bound on `created_at`.
    #[must_use]
    pub fn created_from(&self) -> Option<DateTime<Utc>> {
        self.start_date
            .map(|d| d.and_time(NaiveTime::MIN).and_utc())
    }

    /// Exclusive upper bound on `created_at` (the day after `end_date`).
    #[must_use]
    pub fn created_before(&self) -> Option<DateTime<Utc>> {
        self.end_date
            .map(|d| d.and_time(NaiveTime::MIN).and_utc() + Duration::days(1))
    }

    /// Returns true if the entry passes every non-search filter.
    #[must_use]
    pub fn accepts(&self, tx: &FinanceTransaction) -> bool {
        self.fund_id.is_none_or(|id| tx.fund_id == id)
            && self.kind.is_none_or(|k| tx.kind == k)
            && self.status.is_none_or(|s| tx.status == s)
            && self.created_from().is_none_or(|from| tx.created_at >= from)
            && self.created_before().is_none_or(|to| tx.created_at < to)
    }

    /// Orders two entries according to `sort_by` and `sort_order`.
    ///
    /// Status and type compare in declaration order, as Postgres enums do.
    #[must_use]
    pub fn compare(&self, a: &FinanceTransaction, b: &FinanceTransaction) -> std::cmp::Ordering {
        let ordering = match self.sort_by {
            SortField::CreatedAt => a.created_at.cmp(&b.created_at),
            SortField::UpdatedAt => a.updated_at.cmp(&b.updated_at),
            SortField::Amount => a.amount.cmp(&b.amount),
            SortField::Status => a.status.cmp(&b.status),
            SortField::Kind => a.kind.cmp(&b.kind),
        };
        match self.sort_order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    }
}

// ========== Views ==========

/// Fund fields shown next to a ledger entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FundSummary {
    /// Fund ID.
    pub id: FundId,
    /// Display name.
    pub name: String,
    /// Currency code.
    pub currency: String,
}

/// User fields shown next to a ledger entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    /// User ID.
    pub id: UserId,
    /// Login name.
    pub username: String,
    /// Email address.
    pub email: Option<String>,
    /// Full name from the profile.
    pub full_name: Option<String>,
    /// Avatar link.
    pub avatar: Option<String>,
}

impl UserSummary {
    /// Name to display: full name, falling back to the username.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.full_name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(&self.username)
    }
}

/// A ledger entry with its fund and user populated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionView {
    /// The entry itself.
    #[serde(flatten)]
    pub transaction: FinanceTransaction,
    /// Owning fund.
    pub fund: Option<FundSummary>,
    /// Acting user.
    pub user: Option<UserSummary>,
}

impl TransactionView {
    /// Returns true if `term` (already lowercased) occurs in the user's
    /// username, email, or full name, or in the description.
    #[must_use]
    pub fn matches_search(&self, term: &str) -> bool {
        let hit = |value: Option<&str>| value.is_some_and(|v| v.to_lowercase().contains(term));
        let user = self.user.as_ref();
        hit(user.map(|u| u.username.as_str()))
            || hit(user.and_then(|u| u.email.as_deref()))
            || hit(user.and_then(|u| u.full_name.as_deref()))
            || hit(Some(self.transaction.description.as_str()))
    }
}

/// A completed donation as shown publicly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicContribution {
    /// Transaction ID.
    pub id: FinanceTransactionId,
    /// Contributor display name.
    pub contributor_name: Option<String>,
    /// Contributor avatar.
    pub contributor_avatar: Option<String>,
    /// Amount donated.
    pub amount: Amount,
    /// Currency of the receiving fund.
    pub currency: Option<String>,
    /// Description.
    #[serde(rename = "desc")]
    pub description: String,
    /// When the donation was recorded.
    pub created_at: DateTime<Utc>,
}

impl From<TransactionView> for PublicContribution {
    fn from(view: TransactionView) -> Self {
        Self {
            id: view.transaction.id,
            contributor_name: view.user.as_ref().map(|u| u.display_name().to_string()),
            contributor_avatar: view.user.and_then(|u| u.avatar),
            amount: view.transaction.amount,
            currency: view.fund.map(|f| f.currency),
            description: view.transaction.description,
            created_at: view.transaction.created_at,
        }
    }
}

/// Aggregated completed income per user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopContributor {
    /// Contributor.
    pub user_id: UserId,
    /// Sum of completed income.
    pub total_amount: Decimal,
    /// Number of completed income entries.
    pub count: u64,
    /// Login name.
    pub username: String,
    /// Full name, falling back to the username.
    pub name: String,
    /// Avatar link.
    pub avatar: Option<String>,
}

/// Sums of completed entries for one fund.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CompletedTotals {
    /// Sum of completed income.
    pub income: Decimal,
    /// Sum of completed expense.
    pub expense: Decimal,
}

/// A fund's balances and completed totals, read together.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FundLedgerSnapshot {
    /// Fund read.
    pub fund_id: FundId,
    /// Stored balance.
    pub balance: Decimal,
    /// Stored opening balance.
    pub opening_balance: Decimal,
    /// Completed totals as of the same read.
    pub totals: CompletedTotals,
}

/// Result of comparing a stored balance with the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FundAudit {
    /// Audited fund.
    pub fund_id: FundId,
    /// Balance as stored.
    pub stored_balance: Decimal,
    /// Balance derived from the opening balance and completed entries.
    pub expected_balance: Decimal,
    /// True when both agree.
    pub consistent: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn tx(created_at: DateTime<Utc>, amount: Decimal) -> FinanceTransaction {
        FinanceTransaction {
            id: FinanceTransactionId::new(),
            fund_id: FundId::new(),
            user_id: UserId::new(),
            kind: TransactionType::Income,
            amount: Amount::new(amount).unwrap(),
            description: "Donation".to_string(),
            status: TransactionStatus::Completed,
            invoice: None,
            ref_obj: None,
            created_at,
            updated_at: created_at,
        }
    }

    #[test]
    fn test_ref_object_serialization() {
        let id = ScholarshipApplicationId::new();
        let reference = RefObject::ScholarshipApplication(id);
        let json = serde_json::to_value(reference).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "model": "ScholarshipApplication", "id": id.to_string() })
        );
        assert_eq!(RefObject::from_parts(reference.model(), reference.id()), Some(reference));
        assert_eq!(RefObject::from_parts("Post", reference.id()), None);
    }

    #[test]
    fn test_transaction_serializes_wire_names() {
        let json = serde_json::to_value(tx(Utc::now(), dec!(10.5))).unwrap();
        assert_eq!(json["type"], "income");
        assert_eq!(json["desc"], "Donation");
        assert_eq!(json["amount"], "10.5");
        assert_eq!(json["status"], "completed");
    }

    #[test]
    fn test_status_parse() {
        assert_eq!(TransactionStatus::parse("COMPLETED"), Some(TransactionStatus::Completed));
        assert_eq!(TransactionStatus::parse("done"), None);
        assert_eq!(TransactionType::parse("expense"), Some(TransactionType::Expense));
    }

    #[test]
    fn test_date_range_is_inclusive() {
        let day = NaiveDate::from_ymd_opt(2026, 3, 10).unwrap();
        let filter = TransactionFilter {
            start_date: Some(day),
            end_date: Some(day),
            ..Default::default()
        };
        let late = day.and_hms_opt(23, 59, 59).unwrap().and_utc();
        let next = (day + Duration::days(1)).and_time(NaiveTime::MIN).and_utc();
        assert!(filter.accepts(&tx(late, dec!(1))));
        assert!(!filter.accepts(&tx(next, dec!(1))));
    }

    #[test]
    fn test_search_matches_user_fields_and_description() {
        let view = TransactionView {
            transaction: tx(Utc::now(), dec!(1)),
            fund: None,
            user: Some(UserSummary {
                id: UserId::new(),
                username: "nguyenvan".to_string(),
                email: Some("Van@Example.org".to_string()),
                full_name: Some("Nguyễn Văn A".to_string()),
                avatar: None,
            }),
        };
        assert!(view.matches_search("example"));
        assert!(view.matches_search("văn a"));
        assert!(view.matches_search("donat"));
        assert!(!view.matches_search("tran"));
    }

    #[test]
    fn test_display_name_falls_back_to_username() {
        let mut user = UserSummary {
            id: UserId::new(),
            username: "donor1".to_string(),
            email: None,
            full_name: None,
            avatar: None,
        };
        assert_eq!(user.display_name(), "donor1");
        user.full_name = Some("Trần Thị B".to_string());
        assert_eq!(user.display_name(), "Trần Thị B");
    }
}
