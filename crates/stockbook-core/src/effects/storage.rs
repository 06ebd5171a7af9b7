//! Row storage interfaces
//!
//! The storage collaborator offers row-level CRUD over typed tables keyed
//! by auto-increment integer ids, with equality filtering and created-at
//! ordering. Every method is fallible: when the store is unavailable each
//! call fails fast with a `Storage` error before any business logic runs.
//!
//! Update methods return whether a row actually matched. Updating a
//! nonexistent id is a silent no-op that reports `false`, which is what
//! lets the bulk operators count affected rows rather than attempts.

use crate::authorization::Role;
use crate::domain::{
    Certificate, Company, CompanyStatus, DtcRequest, DtcStatus, Holding, Invitation, NewCertificate,
    NewCompany, NewDtcRequest, NewHolding, NewShareClass, NewShareholder, NewTransaction, NewUser,
    ShareClass, Shareholder, ShareholderStatus, Transaction, TransactionStatus, User,
};
use crate::errors::Result;
use crate::identifiers::{
    CertificateId, CompanyId, DtcRequestId, HoldingId, InvitationId, ShareClassId, ShareholderId,
    TransactionId, UserId,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Storage over the shareholder record tables.
///
/// The conditional update methods encode their row predicate in the
/// contract: `cancel_certificate` matches only `active` rows,
/// `approve_transaction` and `reject_transaction` match only `pending`
/// rows, `set_dtc_status` matches any existing row.
#[async_trait]
pub trait RegistryStorage: Send + Sync {
    // ------------------------------------------------------------------
    // Companies
    // ------------------------------------------------------------------

    /// Insert a company row, assigning the next id
    async fn insert_company(&self, company: NewCompany, created_at_ms: u64) -> Result<Company>;

    /// Fetch one company by id
    async fn company(&self, id: CompanyId) -> Result<Option<Company>>;

    /// All companies, ordered by creation time
    async fn companies(&self) -> Result<Vec<Company>>;

    /// Set a company's status; `false` when no row matched
    async fn set_company_status(&self, id: CompanyId, status: CompanyStatus) -> Result<bool>;

    /// Delete a company row; `false` when no row matched
    async fn delete_company(&self, id: CompanyId) -> Result<bool>;

    // ------------------------------------------------------------------
    // Shareholders
    // ------------------------------------------------------------------

    /// Insert a shareholder row, assigning the next id
    async fn insert_shareholder(
        &self,
        shareholder: NewShareholder,
        created_at_ms: u64,
    ) -> Result<Shareholder>;

    /// Fetch one shareholder by id
    async fn shareholder(&self, id: ShareholderId) -> Result<Option<Shareholder>>;

    /// Shareholders belonging to a company, ordered by creation time
    async fn shareholders_by_company(&self, company_id: CompanyId) -> Result<Vec<Shareholder>>;

    /// Set a shareholder's status; `false` when no row matched
    async fn set_shareholder_status(
        &self,
        id: ShareholderId,
        status: ShareholderStatus,
    ) -> Result<bool>;

    /// Delete a shareholder row; `false` when no row matched
    async fn delete_shareholder(&self, id: ShareholderId) -> Result<bool>;

    // ------------------------------------------------------------------
    // Share classes
    // ------------------------------------------------------------------

    /// Insert a share class row, assigning the next id
    async fn insert_share_class(
        &self,
        share_class: NewShareClass,
        created_at_ms: u64,
    ) -> Result<ShareClass>;

    /// Fetch one share class by id
    async fn share_class(&self, id: ShareClassId) -> Result<Option<ShareClass>>;

    /// Share classes registered for a company
    async fn share_classes_by_company(&self, company_id: CompanyId) -> Result<Vec<ShareClass>>;

    // ------------------------------------------------------------------
    // Holdings
    // ------------------------------------------------------------------

    /// Insert a holding row, assigning the next id
    async fn insert_holding(&self, holding: NewHolding, created_at_ms: u64) -> Result<Holding>;

    /// Fetch one holding by id
    async fn holding(&self, id: HoldingId) -> Result<Option<Holding>>;

    /// Holdings on a shareholder account, ordered by creation time
    async fn holdings_by_shareholder(&self, shareholder_id: ShareholderId)
        -> Result<Vec<Holding>>;

    /// Set a holding's share count; `false` when no row matched
    async fn set_holding_shares(&self, id: HoldingId, shares: u64) -> Result<bool>;

    // ------------------------------------------------------------------
    // Certificates
    // ------------------------------------------------------------------

    /// Insert a certificate row in `pending` status, assigning the next id
    async fn insert_certificate(
        &self,
        certificate: NewCertificate,
        issued_at_ms: u64,
    ) -> Result<Certificate>;

    /// Fetch one certificate by id
    async fn certificate(&self, id: CertificateId) -> Result<Option<Certificate>>;

    /// Certificates held by a shareholder, ordered by issue time
    async fn certificates_by_shareholder(
        &self,
        shareholder_id: ShareholderId,
    ) -> Result<Vec<Certificate>>;

    /// Mark a certificate `active` (delivered); matches `pending` rows only
    async fn activate_certificate(&self, id: CertificateId) -> Result<bool>;

    /// Cancel a certificate, stamping the cancel date.
    ///
    /// Matches rows currently `active` only; a second cancellation of the
    /// same id matches nothing and leaves the original cancel date intact.
    async fn cancel_certificate(&self, id: CertificateId, cancelled_at_ms: u64) -> Result<bool>;

    // ------------------------------------------------------------------
    // Transactions
    // ------------------------------------------------------------------

    /// Insert a transaction row in `pending` status, assigning the next id
    async fn insert_transaction(
        &self,
        transaction: NewTransaction,
        created_at_ms: u64,
    ) -> Result<Transaction>;

    /// Fetch one transaction by id
    async fn transaction(&self, id: TransactionId) -> Result<Option<Transaction>>;

    /// Transactions for a company, optionally filtered by status
    async fn transactions_by_company(
        &self,
        company_id: CompanyId,
        status: Option<TransactionStatus>,
    ) -> Result<Vec<Transaction>>;

    /// Approve a transaction, stamping approver and timestamp; matches
    /// `pending` rows only
    async fn approve_transaction(
        &self,
        id: TransactionId,
        approved_by: UserId,
        approved_at_ms: u64,
    ) -> Result<bool>;

    /// Reject a transaction, recording the optional reason; matches
    /// `pending` rows only
    async fn reject_transaction(&self, id: TransactionId, reason: Option<String>) -> Result<bool>;

    // ------------------------------------------------------------------
    // DTC/DWAC requests
    // ------------------------------------------------------------------

    /// Insert a depository request row in `pending` status
    async fn insert_dtc_request(
        &self,
        request: NewDtcRequest,
        created_at_ms: u64,
    ) -> Result<DtcRequest>;

    /// Fetch one depository request by id
    async fn dtc_request(&self, id: DtcRequestId) -> Result<Option<DtcRequest>>;

    /// Depository requests for a company, ordered by creation time
    async fn dtc_requests_by_company(&self, company_id: CompanyId) -> Result<Vec<DtcRequest>>;

    /// Set a request's status regardless of its current status; `false`
    /// when no row matched
    async fn set_dtc_status(&self, id: DtcRequestId, status: DtcStatus) -> Result<bool>;
}

/// Fully computed invitation row, ready for insertion.
///
/// The service computes the token and the expiry instant; storage only
/// assigns the id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewInvitationRow {
    /// Invitee email address
    pub email: String,
    /// Role granted on acceptance
    pub role: Role,
    /// Company the role is scoped to, if any
    pub company_id: Option<CompanyId>,
    /// Optional message shown to the invitee
    pub message: Option<String>,
    /// Opaque acceptance token
    pub token: String,
    /// Creation timestamp (ms)
    pub created_at_ms: u64,
    /// Expiry instant (ms)
    pub expires_at_ms: u64,
}

/// Storage over invitations and user accounts.
///
/// The `mark_*` and `reissue_*` methods match `pending` rows only, so a
/// raced second transition reports `false` instead of overwriting a
/// terminal state.
#[async_trait]
pub trait DirectoryStorage: Send + Sync {
    /// Insert an invitation row in `pending` status, assigning the next id
    async fn insert_invitation(&self, row: NewInvitationRow) -> Result<Invitation>;

    /// Fetch one invitation by id
    async fn invitation(&self, id: InvitationId) -> Result<Option<Invitation>>;

    /// Look an invitation up by its current token
    async fn invitation_by_token(&self, token: &str) -> Result<Option<Invitation>>;

    /// All invitations, ordered by creation time
    async fn invitations(&self) -> Result<Vec<Invitation>>;

    /// The stored-`pending` invitation for an email, if one exists
    async fn pending_invitation_by_email(&self, email: &str) -> Result<Option<Invitation>>;

    /// Flip a `pending` invitation to `expired`
    async fn mark_invitation_expired(&self, id: InvitationId) -> Result<bool>;

    /// Flip a `pending` invitation to `revoked`
    async fn mark_invitation_revoked(&self, id: InvitationId) -> Result<bool>;

    /// Flip a `pending` invitation to `accepted`, stamping the acceptor
    async fn mark_invitation_accepted(
        &self,
        id: InvitationId,
        accepted_by: UserId,
        accepted_at_ms: u64,
    ) -> Result<bool>;

    /// Replace a `pending` invitation's token and expiry window
    async fn reissue_invitation_token(
        &self,
        id: InvitationId,
        token: String,
        expires_at_ms: u64,
    ) -> Result<bool>;

    /// Insert a user row, assigning the next id
    async fn insert_user(&self, user: NewUser, created_at_ms: u64) -> Result<User>;

    /// Fetch one user by id
    async fn user(&self, id: UserId) -> Result<Option<User>>;

    /// Fetch one user by email
    async fn user_by_email(&self, email: &str) -> Result<Option<User>>;

    /// Apply an invited role and company scope to a user row
    async fn apply_user_grant(
        &self,
        id: UserId,
        role: Role,
        company_id: Option<CompanyId>,
    ) -> Result<bool>;
}
