//! In-memory row store
//!
//! One `MemoryStore` holds every table behind a single async lock, hands
//! out auto-increment integer ids per table, and implements all three
//! effect interfaces from `stockbook-core`. Rows are kept in insertion
//! order, which for an auto-increment store is also id and created-at
//! order.
//!
//! Conditional updates encode their row predicate inline: a cancel only
//! matches an `active` certificate, an approval only matches a `pending`
//! transaction. A missing id matches nothing and reports `false`.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;

use stockbook_core::domain::{
    AuditEvent, AuditRecord, Certificate, CertificateStatus, Company, CompanyStatus, DtcRequest,
    DtcStatus, Holding, Invitation, InvitationStatus, NewCertificate, NewCompany, NewDtcRequest,
    NewHolding, NewShareClass, NewShareholder, NewTransaction, NewUser, ShareClass, Shareholder,
    ShareholderStatus, Transaction, TransactionStatus, User,
};
use stockbook_core::effects::{AuditEffects, DirectoryStorage, NewInvitationRow, RegistryStorage};
use stockbook_core::{
    CertificateId, CompanyId, DtcRequestId, HoldingId, InvitationId, RegistryError, Result, Role,
    ShareClassId, ShareholderId, TransactionId, UserId,
};

/// One table of rows plus its id counter
#[derive(Debug)]
struct Table<T> {
    rows: Vec<T>,
    next_id: u64,
}

impl<T> Table<T> {
    fn allocate_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            rows: Vec::new(),
            next_id: 0,
        }
    }
}

#[derive(Debug, Default)]
struct State {
    companies: Table<Company>,
    shareholders: Table<Shareholder>,
    share_classes: Table<ShareClass>,
    holdings: Table<Holding>,
    certificates: Table<Certificate>,
    transactions: Table<Transaction>,
    dtc_requests: Table<DtcRequest>,
    invitations: Table<Invitation>,
    users: Table<User>,
    audit_log: Table<AuditRecord>,
}

/// In-memory implementation of the storage, directory, and audit
/// interfaces.
///
/// The availability flag turns every subsequent call into a fast
/// `Storage` error, which is how outage behavior is exercised in tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<State>,
    unavailable: AtomicBool,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggle availability; while unavailable every operation fails fast
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn ensure_available(&self) -> Result<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            Err(RegistryError::storage("store unavailable"))
        } else {
            Ok(())
        }
    }

    /// Snapshot of the audit log, in append order
    pub async fn audit_records(&self) -> Vec<AuditRecord> {
        self.state.read().await.audit_log.rows.clone()
    }

    /// Audit records touching one entity
    pub async fn audit_records_for(
        &self,
        entity_kind: stockbook_core::domain::EntityKind,
        entity_id: u64,
    ) -> Vec<AuditRecord> {
        self.state
            .read()
            .await
            .audit_log
            .rows
            .iter()
            .filter(|r| r.event.entity_kind == entity_kind && r.event.entity_id == entity_id)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl RegistryStorage for MemoryStore {
    async fn insert_company(&self, company: NewCompany, created_at_ms: u64) -> Result<Company> {
        self.ensure_available()?;
        let mut state = self.state.write().await;
        let id = CompanyId::new(state.companies.allocate_id());
        let row = Company {
            id,
            name: company.name,
            ticker: company.ticker,
            status: CompanyStatus::Active,
            created_at_ms,
        };
        state.companies.rows.push(row.clone());
        Ok(row)
    }

    async fn company(&self, id: CompanyId) -> Result<Option<Company>> {
        self.ensure_available()?;
        let state = self.state.read().await;
        Ok(state.companies.rows.iter().find(|c| c.id == id).cloned())
    }

    async fn companies(&self) -> Result<Vec<Company>> {
        self.ensure_available()?;
        Ok(self.state.read().await.companies.rows.clone())
    }

    async fn set_company_status(&self, id: CompanyId, status: CompanyStatus) -> Result<bool> {
        self.ensure_available()?;
        let mut state = self.state.write().await;
        match state.companies.rows.iter_mut().find(|c| c.id == id) {
            Some(row) => {
                row.status = status;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_company(&self, id: CompanyId) -> Result<bool> {
        self.ensure_available()?;
        let mut state = self.state.write().await;
        let before = state.companies.rows.len();
        state.companies.rows.retain(|c| c.id != id);
        Ok(state.companies.rows.len() < before)
    }

    async fn insert_shareholder(
        &self,
        shareholder: NewShareholder,
        created_at_ms: u64,
    ) -> Result<Shareholder> {
        self.ensure_available()?;
        let mut state = self.state.write().await;
        let id = ShareholderId::new(state.shareholders.allocate_id());
        let row = Shareholder {
            id,
            company_id: shareholder.company_id,
            name: shareholder.name,
            email: shareholder.email,
            status: ShareholderStatus::Active,
            created_at_ms,
        };
        state.shareholders.rows.push(row.clone());
        Ok(row)
    }

    async fn shareholder(&self, id: ShareholderId) -> Result<Option<Shareholder>> {
        self.ensure_available()?;
        let state = self.state.read().await;
        Ok(state.shareholders.rows.iter().find(|s| s.id == id).cloned())
    }

    async fn shareholders_by_company(&self, company_id: CompanyId) -> Result<Vec<Shareholder>> {
        self.ensure_available()?;
        let state = self.state.read().await;
        Ok(state
            .shareholders
            .rows
            .iter()
            .filter(|s| s.company_id == company_id)
            .cloned()
            .collect())
    }

    async fn set_shareholder_status(
        &self,
        id: ShareholderId,
        status: ShareholderStatus,
    ) -> Result<bool> {
        self.ensure_available()?;
        let mut state = self.state.write().await;
        match state.shareholders.rows.iter_mut().find(|s| s.id == id) {
            Some(row) => {
                row.status = status;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_shareholder(&self, id: ShareholderId) -> Result<bool> {
        self.ensure_available()?;
        let mut state = self.state.write().await;
        let before = state.shareholders.rows.len();
        state.shareholders.rows.retain(|s| s.id != id);
        Ok(state.shareholders.rows.len() < before)
    }

    async fn insert_share_class(
        &self,
        share_class: NewShareClass,
        created_at_ms: u64,
    ) -> Result<ShareClass> {
        self.ensure_available()?;
        let mut state = self.state.write().await;
        let id = ShareClassId::new(state.share_classes.allocate_id());
        let row = ShareClass {
            id,
            company_id: share_class.company_id,
            name: share_class.name,
            votes_per_share: share_class.votes_per_share,
            created_at_ms,
        };
        state.share_classes.rows.push(row.clone());
        Ok(row)
    }

    async fn share_class(&self, id: ShareClassId) -> Result<Option<ShareClass>> {
        self.ensure_available()?;
        let state = self.state.read().await;
        Ok(state.share_classes.rows.iter().find(|c| c.id == id).cloned())
    }

    async fn share_classes_by_company(&self, company_id: CompanyId) -> Result<Vec<ShareClass>> {
        self.ensure_available()?;
        let state = self.state.read().await;
        Ok(state
            .share_classes
            .rows
            .iter()
            .filter(|c| c.company_id == company_id)
            .cloned()
            .collect())
    }

    async fn insert_holding(&self, holding: NewHolding, created_at_ms: u64) -> Result<Holding> {
        self.ensure_available()?;
        let mut state = self.state.write().await;
        let id = HoldingId::new(state.holdings.allocate_id());
        let row = Holding {
            id,
            shareholder_id: holding.shareholder_id,
            share_class_id: holding.share_class_id,
            shares: holding.shares,
            restricted: holding.restricted,
            created_at_ms,
        };
        state.holdings.rows.push(row.clone());
        Ok(row)
    }

    async fn holding(&self, id: HoldingId) -> Result<Option<Holding>> {
        self.ensure_available()?;
        let state = self.state.read().await;
        Ok(state.holdings.rows.iter().find(|h| h.id == id).cloned())
    }

    async fn holdings_by_shareholder(
        &self,
        shareholder_id: ShareholderId,
    ) -> Result<Vec<Holding>> {
        self.ensure_available()?;
        let state = self.state.read().await;
        Ok(state
            .holdings
            .rows
            .iter()
            .filter(|h| h.shareholder_id == shareholder_id)
            .cloned()
            .collect())
    }

    async fn set_holding_shares(&self, id: HoldingId, shares: u64) -> Result<bool> {
        self.ensure_available()?;
        let mut state = self.state.write().await;
        match state.holdings.rows.iter_mut().find(|h| h.id == id) {
            Some(row) => {
                row.shares = shares;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn insert_certificate(
        &self,
        certificate: NewCertificate,
        issued_at_ms: u64,
    ) -> Result<Certificate> {
        self.ensure_available()?;
        let mut state = self.state.write().await;
        let id = CertificateId::new(state.certificates.allocate_id());
        let row = Certificate {
            id,
            shareholder_id: certificate.shareholder_id,
            share_class_id: certificate.share_class_id,
            certificate_number: certificate.certificate_number,
            shares: certificate.shares,
            status: CertificateStatus::Pending,
            issued_at_ms,
            cancelled_at_ms: None,
        };
        state.certificates.rows.push(row.clone());
        Ok(row)
    }

    async fn certificate(&self, id: CertificateId) -> Result<Option<Certificate>> {
        self.ensure_available()?;
        let state = self.state.read().await;
        Ok(state.certificates.rows.iter().find(|c| c.id == id).cloned())
    }

    async fn certificates_by_shareholder(
        &self,
        shareholder_id: ShareholderId,
    ) -> Result<Vec<Certificate>> {
        self.ensure_available()?;
        let state = self.state.read().await;
        Ok(state
            .certificates
            .rows
            .iter()
            .filter(|c| c.shareholder_id == shareholder_id)
            .cloned()
            .collect())
    }

    async fn activate_certificate(&self, id: CertificateId) -> Result<bool> {
        self.ensure_available()?;
        let mut state = self.state.write().await;
        match state
            .certificates
            .rows
            .iter_mut()
            .find(|c| c.id == id && c.status == CertificateStatus::Pending)
        {
            Some(row) => {
                row.status = CertificateStatus::Active;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn cancel_certificate(&self, id: CertificateId, cancelled_at_ms: u64) -> Result<bool> {
        self.ensure_available()?;
        let mut state = self.state.write().await;
        match state
            .certificates
            .rows
            .iter_mut()
            .find(|c| c.id == id && c.status == CertificateStatus::Active)
        {
            Some(row) => {
                row.status = CertificateStatus::Cancelled;
                row.cancelled_at_ms = Some(cancelled_at_ms);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn insert_transaction(
        &self,
        transaction: NewTransaction,
        created_at_ms: u64,
    ) -> Result<Transaction> {
        self.ensure_available()?;
        let mut state = self.state.write().await;
        let id = TransactionId::new(state.transactions.allocate_id());
        let row = Transaction {
            id,
            company_id: transaction.company_id,
            kind: transaction.kind,
            shares: transaction.shares,
            status: TransactionStatus::Pending,
            approved_by: None,
            approved_at_ms: None,
            rejection_reason: None,
            created_at_ms,
        };
        state.transactions.rows.push(row.clone());
        Ok(row)
    }

    async fn transaction(&self, id: TransactionId) -> Result<Option<Transaction>> {
        self.ensure_available()?;
        let state = self.state.read().await;
        Ok(state.transactions.rows.iter().find(|t| t.id == id).cloned())
    }

    async fn transactions_by_company(
        &self,
        company_id: CompanyId,
        status: Option<TransactionStatus>,
    ) -> Result<Vec<Transaction>> {
        self.ensure_available()?;
        let state = self.state.read().await;
        Ok(state
            .transactions
            .rows
            .iter()
            .filter(|t| t.company_id == company_id)
            .filter(|t| status.map_or(true, |s| t.status == s))
            .cloned()
            .collect())
    }

    async fn approve_transaction(
        &self,
        id: TransactionId,
        approved_by: UserId,
        approved_at_ms: u64,
    ) -> Result<bool> {
        self.ensure_available()?;
        let mut state = self.state.write().await;
        match state
            .transactions
            .rows
            .iter_mut()
            .find(|t| t.id == id && t.status == TransactionStatus::Pending)
        {
            Some(row) => {
                row.status = TransactionStatus::Approved;
                row.approved_by = Some(approved_by);
                row.approved_at_ms = Some(approved_at_ms);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn reject_transaction(&self, id: TransactionId, reason: Option<String>) -> Result<bool> {
        self.ensure_available()?;
        let mut state = self.state.write().await;
        match state
            .transactions
            .rows
            .iter_mut()
            .find(|t| t.id == id && t.status == TransactionStatus::Pending)
        {
            Some(row) => {
                row.status = TransactionStatus::Rejected;
                row.rejection_reason = reason;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn insert_dtc_request(
        &self,
        request: NewDtcRequest,
        created_at_ms: u64,
    ) -> Result<DtcRequest> {
        self.ensure_available()?;
        let mut state = self.state.write().await;
        let id = DtcRequestId::new(state.dtc_requests.allocate_id());
        let row = DtcRequest {
            id,
            company_id: request.company_id,
            shareholder_id: request.shareholder_id,
            direction: request.direction,
            shares: request.shares,
            status: DtcStatus::Pending,
            created_at_ms,
        };
        state.dtc_requests.rows.push(row.clone());
        Ok(row)
    }

    async fn dtc_request(&self, id: DtcRequestId) -> Result<Option<DtcRequest>> {
        self.ensure_available()?;
        let state = self.state.read().await;
        Ok(state.dtc_requests.rows.iter().find(|r| r.id == id).cloned())
    }

    async fn dtc_requests_by_company(&self, company_id: CompanyId) -> Result<Vec<DtcRequest>> {
        self.ensure_available()?;
        let state = self.state.read().await;
        Ok(state
            .dtc_requests
            .rows
            .iter()
            .filter(|r| r.company_id == company_id)
            .cloned()
            .collect())
    }

    async fn set_dtc_status(&self, id: DtcRequestId, status: DtcStatus) -> Result<bool> {
        self.ensure_available()?;
        let mut state = self.state.write().await;
        match state.dtc_requests.rows.iter_mut().find(|r| r.id == id) {
            Some(row) => {
                row.status = status;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[async_trait]
impl DirectoryStorage for MemoryStore {
    async fn insert_invitation(&self, row: NewInvitationRow) -> Result<Invitation> {
        self.ensure_available()?;
        let mut state = self.state.write().await;
        let id = InvitationId::new(state.invitations.allocate_id());
        let invitation = Invitation {
            id,
            email: row.email,
            role: row.role,
            company_id: row.company_id,
            message: row.message,
            token: row.token,
            status: InvitationStatus::Pending,
            created_at_ms: row.created_at_ms,
            expires_at_ms: row.expires_at_ms,
            accepted_by: None,
            accepted_at_ms: None,
        };
        state.invitations.rows.push(invitation.clone());
        Ok(invitation)
    }

    async fn invitation(&self, id: InvitationId) -> Result<Option<Invitation>> {
        self.ensure_available()?;
        let state = self.state.read().await;
        Ok(state.invitations.rows.iter().find(|i| i.id == id).cloned())
    }

    async fn invitation_by_token(&self, token: &str) -> Result<Option<Invitation>> {
        self.ensure_available()?;
        let state = self.state.read().await;
        Ok(state
            .invitations
            .rows
            .iter()
            .find(|i| i.token == token)
            .cloned())
    }

    async fn invitations(&self) -> Result<Vec<Invitation>> {
        self.ensure_available()?;
        Ok(self.state.read().await.invitations.rows.clone())
    }

    async fn pending_invitation_by_email(&self, email: &str) -> Result<Option<Invitation>> {
        self.ensure_available()?;
        let state = self.state.read().await;
        Ok(state
            .invitations
            .rows
            .iter()
            .find(|i| i.email == email && i.status == InvitationStatus::Pending)
            .cloned())
    }

    async fn mark_invitation_expired(&self, id: InvitationId) -> Result<bool> {
        self.ensure_available()?;
        let mut state = self.state.write().await;
        match state
            .invitations
            .rows
            .iter_mut()
            .find(|i| i.id == id && i.status == InvitationStatus::Pending)
        {
            Some(row) => {
                row.status = InvitationStatus::Expired;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn mark_invitation_revoked(&self, id: InvitationId) -> Result<bool> {
        self.ensure_available()?;
        let mut state = self.state.write().await;
        match state
            .invitations
            .rows
            .iter_mut()
            .find(|i| i.id == id && i.status == InvitationStatus::Pending)
        {
            Some(row) => {
                row.status = InvitationStatus::Revoked;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn mark_invitation_accepted(
        &self,
        id: InvitationId,
        accepted_by: UserId,
        accepted_at_ms: u64,
    ) -> Result<bool> {
        self.ensure_available()?;
        let mut state = self.state.write().await;
        match state
            .invitations
            .rows
            .iter_mut()
            .find(|i| i.id == id && i.status == InvitationStatus::Pending)
        {
            Some(row) => {
                row.status = InvitationStatus::Accepted;
                row.accepted_by = Some(accepted_by);
                row.accepted_at_ms = Some(accepted_at_ms);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn reissue_invitation_token(
        &self,
        id: InvitationId,
        token: String,
        expires_at_ms: u64,
    ) -> Result<bool> {
        self.ensure_available()?;
        let mut state = self.state.write().await;
        match state
            .invitations
            .rows
            .iter_mut()
            .find(|i| i.id == id && i.status == InvitationStatus::Pending)
        {
            Some(row) => {
                row.token = token;
                row.expires_at_ms = expires_at_ms;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn insert_user(&self, user: NewUser, created_at_ms: u64) -> Result<User> {
        self.ensure_available()?;
        let mut state = self.state.write().await;
        let id = UserId::new(state.users.allocate_id());
        let row = User {
            id,
            email: user.email,
            role: user.role,
            company_id: user.company_id,
            created_at_ms,
        };
        state.users.rows.push(row.clone());
        Ok(row)
    }

    async fn user(&self, id: UserId) -> Result<Option<User>> {
        self.ensure_available()?;
        let state = self.state.read().await;
        Ok(state.users.rows.iter().find(|u| u.id == id).cloned())
    }

    async fn user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.ensure_available()?;
        let state = self.state.read().await;
        Ok(state.users.rows.iter().find(|u| u.email == email).cloned())
    }

    async fn apply_user_grant(
        &self,
        id: UserId,
        role: Role,
        company_id: Option<CompanyId>,
    ) -> Result<bool> {
        self.ensure_available()?;
        let mut state = self.state.write().await;
        match state.users.rows.iter_mut().find(|u| u.id == id) {
            Some(row) => {
                row.role = role;
                if company_id.is_some() {
                    row.company_id = company_id;
                }
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[async_trait]
impl AuditEffects for MemoryStore {
    async fn append(&self, event: AuditEvent, created_at_ms: u64) -> Result<()> {
        self.ensure_available()?;
        let mut state = self.state.write().await;
        let id = state.audit_log.allocate_id();
        state.audit_log.rows.push(AuditRecord {
            id,
            event,
            created_at_ms,
        });
        Ok(())
    }
}
