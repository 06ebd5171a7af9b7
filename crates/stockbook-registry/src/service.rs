//! Registry Service
//!
//! Coordinator for the shareholder record. Every write is admin-gated by
//! the single elevated-role predicate, validated, then issued to storage
//! as one request-scoped sequence of reads and writes; successful writes
//! append an audit event.
//!
//! Deletes fetch the dependent rows first and evaluate the pure checks in
//! [`crate::guards`]; a rejected delete performs no write at all.

use std::sync::Arc;

use tracing::{debug, info, warn};

use stockbook_core::domain::{
    AuditAction, AuditEvent, Certificate, CertificateStatus, Company, CompanyStatus, DtcRequest,
    EntityKind, Holding, NewCertificate, NewCompany, NewDtcRequest, NewHolding, NewShareClass,
    NewShareholder, NewTransaction, ShareClass, Shareholder, ShareholderStatus, Transaction,
    TransactionStatus,
};
use stockbook_core::effects::{AuditEffects, RegistryStorage, TimeEffects};
use stockbook_core::{
    require_elevated, Caller, CertificateId, CompanyId, DtcRequestId, HoldingId, RegistryError,
    Result, ShareholderId, TransactionId,
};

use crate::guards::{check_company_deletable, check_shareholder_deletable};

/// Lifecycle service over the shareholder record tables
pub struct RegistryService {
    storage: Arc<dyn RegistryStorage>,
    audit: Arc<dyn AuditEffects>,
    clock: Arc<dyn TimeEffects>,
}

impl RegistryService {
    /// Create a service over the given collaborators
    pub fn new(
        storage: Arc<dyn RegistryStorage>,
        audit: Arc<dyn AuditEffects>,
        clock: Arc<dyn TimeEffects>,
    ) -> Self {
        Self {
            storage,
            audit,
            clock,
        }
    }

    pub(crate) fn storage(&self) -> &Arc<dyn RegistryStorage> {
        &self.storage
    }

    pub(crate) async fn now_ms(&self) -> u64 {
        self.clock.now_ms().await
    }

    /// Append an audit event; failures are logged and swallowed so the
    /// recorded operation stands.
    pub(crate) async fn record_audit(&self, event: AuditEvent) {
        let now_ms = self.clock.now_ms().await;
        if let Err(err) = self.audit.append(event, now_ms).await {
            warn!(%err, "audit append failed; operation result stands");
        }
    }

    fn snapshot<T: serde::Serialize>(value: &T) -> serde_json::Value {
        serde_json::to_value(value).unwrap_or(serde_json::Value::Null)
    }

    fn require_nonempty(value: &str, field: &str) -> Result<()> {
        if value.trim().is_empty() {
            Err(RegistryError::invalid(format!("{field} must not be empty")))
        } else {
            Ok(())
        }
    }

    fn require_positive_shares(shares: u64) -> Result<()> {
        if shares == 0 {
            Err(RegistryError::invalid("share count must be positive"))
        } else {
            Ok(())
        }
    }

    // =========================================================================
    // Companies
    // =========================================================================

    /// Create a company profile
    pub async fn create_company(&self, caller: &Caller, input: NewCompany) -> Result<Company> {
        let actor = require_elevated(caller)?;
        Self::require_nonempty(&input.name, "company name")?;

        let now_ms = self.clock.now_ms().await;
        let company = self.storage.insert_company(input, now_ms).await?;
        info!(company = %company.id, actor = %actor, "company created");
        self.record_audit(AuditEvent {
            user_id: actor,
            company_id: Some(company.id),
            action: AuditAction::Create,
            entity_kind: EntityKind::Company,
            entity_id: company.id.value(),
            old_values: None,
            new_values: Some(Self::snapshot(&company)),
        })
        .await;
        Ok(company)
    }

    /// Fetch one company
    pub async fn company(&self, id: CompanyId) -> Result<Company> {
        self.storage
            .company(id)
            .await?
            .ok_or_else(|| RegistryError::not_found(format!("company {id}")))
    }

    /// All companies on record
    pub async fn list_companies(&self) -> Result<Vec<Company>> {
        self.storage.companies().await
    }

    /// Set a company's servicing status
    pub async fn set_company_status(
        &self,
        caller: &Caller,
        id: CompanyId,
        status: CompanyStatus,
    ) -> Result<Company> {
        let actor = require_elevated(caller)?;
        if !self.storage.set_company_status(id, status).await? {
            return Err(RegistryError::not_found(format!("company {id}")));
        }
        let company = self.company(id).await?;
        self.record_audit(AuditEvent {
            user_id: actor,
            company_id: Some(id),
            action: AuditAction::StatusChange,
            entity_kind: EntityKind::Company,
            entity_id: id.value(),
            old_values: None,
            new_values: Some(serde_json::json!({ "status": status.as_str() })),
        })
        .await;
        Ok(company)
    }

    /// Delete a company.
    ///
    /// Guarded: fails with a precondition error while any shareholder
    /// still references the company. A successful delete appends one
    /// audit event carrying the pre-delete row.
    pub async fn delete_company(&self, caller: &Caller, id: CompanyId) -> Result<()> {
        let actor = require_elevated(caller)?;
        let company = self.company(id).await?;

        let dependents = self.storage.shareholders_by_company(id).await?;
        if let Some(reject) = check_company_deletable(&dependents) {
            debug!(company = %id, code = reject.code, "company delete rejected");
            return Err(RegistryError::precondition(reject.message));
        }

        if !self.storage.delete_company(id).await? {
            return Err(RegistryError::not_found(format!("company {id}")));
        }
        info!(company = %id, actor = %actor, "company deleted");
        self.record_audit(AuditEvent::deletion(
            actor,
            Some(id),
            EntityKind::Company,
            id.value(),
            Self::snapshot(&company),
        ))
        .await;
        Ok(())
    }

    // =========================================================================
    // Shareholders
    // =========================================================================

    /// Open a shareholder account under a company
    pub async fn create_shareholder(
        &self,
        caller: &Caller,
        input: NewShareholder,
    ) -> Result<Shareholder> {
        let actor = require_elevated(caller)?;
        Self::require_nonempty(&input.name, "shareholder name")?;
        // The owning company must exist before an account can reference it.
        self.company(input.company_id).await?;

        let now_ms = self.clock.now_ms().await;
        let shareholder = self.storage.insert_shareholder(input, now_ms).await?;
        info!(shareholder = %shareholder.id, actor = %actor, "shareholder created");
        self.record_audit(AuditEvent {
            user_id: actor,
            company_id: Some(shareholder.company_id),
            action: AuditAction::Create,
            entity_kind: EntityKind::Shareholder,
            entity_id: shareholder.id.value(),
            old_values: None,
            new_values: Some(Self::snapshot(&shareholder)),
        })
        .await;
        Ok(shareholder)
    }

    /// Fetch one shareholder
    pub async fn shareholder(&self, id: ShareholderId) -> Result<Shareholder> {
        self.storage
            .shareholder(id)
            .await?
            .ok_or_else(|| RegistryError::not_found(format!("shareholder {id}")))
    }

    /// Shareholders on a company's register
    pub async fn list_shareholders(&self, company_id: CompanyId) -> Result<Vec<Shareholder>> {
        self.storage.shareholders_by_company(company_id).await
    }

    /// Set a shareholder's account status
    pub async fn set_shareholder_status(
        &self,
        caller: &Caller,
        id: ShareholderId,
        status: ShareholderStatus,
    ) -> Result<Shareholder> {
        let actor = require_elevated(caller)?;
        if !self.storage.set_shareholder_status(id, status).await? {
            return Err(RegistryError::not_found(format!("shareholder {id}")));
        }
        let shareholder = self.shareholder(id).await?;
        self.record_audit(AuditEvent {
            user_id: actor,
            company_id: Some(shareholder.company_id),
            action: AuditAction::StatusChange,
            entity_kind: EntityKind::Shareholder,
            entity_id: id.value(),
            old_values: None,
            new_values: Some(serde_json::json!({ "status": status.as_str() })),
        })
        .await;
        Ok(shareholder)
    }

    /// Delete a shareholder account.
    ///
    /// Guarded: fails with a precondition error while the account's
    /// holdings still sum to a positive share count.
    pub async fn delete_shareholder(&self, caller: &Caller, id: ShareholderId) -> Result<()> {
        let actor = require_elevated(caller)?;
        let shareholder = self.shareholder(id).await?;

        let holdings = self.storage.holdings_by_shareholder(id).await?;
        if let Some(reject) = check_shareholder_deletable(&holdings) {
            debug!(shareholder = %id, code = reject.code, "shareholder delete rejected");
            return Err(RegistryError::precondition(reject.message));
        }

        if !self.storage.delete_shareholder(id).await? {
            return Err(RegistryError::not_found(format!("shareholder {id}")));
        }
        info!(shareholder = %id, actor = %actor, "shareholder deleted");
        self.record_audit(AuditEvent::deletion(
            actor,
            Some(shareholder.company_id),
            EntityKind::Shareholder,
            id.value(),
            Self::snapshot(&shareholder),
        ))
        .await;
        Ok(())
    }

    // =========================================================================
    // Share classes
    // =========================================================================

    /// Register a share class for a company
    pub async fn register_share_class(
        &self,
        caller: &Caller,
        input: NewShareClass,
    ) -> Result<ShareClass> {
        let actor = require_elevated(caller)?;
        Self::require_nonempty(&input.name, "share class name")?;
        self.company(input.company_id).await?;

        let now_ms = self.clock.now_ms().await;
        let share_class = self.storage.insert_share_class(input, now_ms).await?;
        self.record_audit(AuditEvent {
            user_id: actor,
            company_id: Some(share_class.company_id),
            action: AuditAction::Create,
            entity_kind: EntityKind::ShareClass,
            entity_id: share_class.id.value(),
            old_values: None,
            new_values: Some(Self::snapshot(&share_class)),
        })
        .await;
        Ok(share_class)
    }

    /// Share classes registered for a company
    pub async fn list_share_classes(&self, company_id: CompanyId) -> Result<Vec<ShareClass>> {
        self.storage.share_classes_by_company(company_id).await
    }

    // =========================================================================
    // Holdings
    // =========================================================================

    /// Record a book-entry holding on a shareholder account
    pub async fn record_holding(&self, caller: &Caller, input: NewHolding) -> Result<Holding> {
        let actor = require_elevated(caller)?;
        self.shareholder(input.shareholder_id).await?;

        let now_ms = self.clock.now_ms().await;
        let holding = self.storage.insert_holding(input, now_ms).await?;
        self.record_audit(AuditEvent {
            user_id: actor,
            company_id: None,
            action: AuditAction::Create,
            entity_kind: EntityKind::Holding,
            entity_id: holding.id.value(),
            old_values: None,
            new_values: Some(Self::snapshot(&holding)),
        })
        .await;
        Ok(holding)
    }

    /// Holdings on a shareholder account
    pub async fn list_holdings(&self, shareholder_id: ShareholderId) -> Result<Vec<Holding>> {
        self.storage.holdings_by_shareholder(shareholder_id).await
    }

    /// Set a holding's share count, e.g. after a transfer settles
    pub async fn set_holding_shares(
        &self,
        caller: &Caller,
        id: HoldingId,
        shares: u64,
    ) -> Result<()> {
        let actor = require_elevated(caller)?;
        if !self.storage.set_holding_shares(id, shares).await? {
            return Err(RegistryError::not_found(format!("holding {id}")));
        }
        self.record_audit(AuditEvent {
            user_id: actor,
            company_id: None,
            action: AuditAction::Update,
            entity_kind: EntityKind::Holding,
            entity_id: id.value(),
            old_values: None,
            new_values: Some(serde_json::json!({ "shares": shares })),
        })
        .await;
        Ok(())
    }

    // =========================================================================
    // Certificates
    // =========================================================================

    /// Issue a certificate; it starts `pending` until delivered
    pub async fn issue_certificate(
        &self,
        caller: &Caller,
        input: NewCertificate,
    ) -> Result<Certificate> {
        let actor = require_elevated(caller)?;
        Self::require_nonempty(&input.certificate_number, "certificate number")?;
        Self::require_positive_shares(input.shares)?;
        self.shareholder(input.shareholder_id).await?;

        let now_ms = self.clock.now_ms().await;
        let certificate = self.storage.insert_certificate(input, now_ms).await?;
        info!(certificate = %certificate.id, actor = %actor, "certificate issued");
        self.record_audit(AuditEvent {
            user_id: actor,
            company_id: None,
            action: AuditAction::Create,
            entity_kind: EntityKind::Certificate,
            entity_id: certificate.id.value(),
            old_values: None,
            new_values: Some(Self::snapshot(&certificate)),
        })
        .await;
        Ok(certificate)
    }

    /// Mark a delivered certificate `active`
    pub async fn activate_certificate(
        &self,
        caller: &Caller,
        id: CertificateId,
    ) -> Result<Certificate> {
        let actor = require_elevated(caller)?;
        if !self.storage.activate_certificate(id).await? {
            // Either missing or not in the pending state; report which.
            return match self.storage.certificate(id).await? {
                Some(cert) => Err(RegistryError::precondition(format!(
                    "only pending certificates can be activated (status: {})",
                    cert.status
                ))),
                None => Err(RegistryError::not_found(format!("certificate {id}"))),
            };
        }
        let certificate = self
            .storage
            .certificate(id)
            .await?
            .ok_or_else(|| RegistryError::not_found(format!("certificate {id}")))?;
        self.record_audit(AuditEvent {
            user_id: actor,
            company_id: None,
            action: AuditAction::StatusChange,
            entity_kind: EntityKind::Certificate,
            entity_id: id.value(),
            old_values: None,
            new_values: Some(serde_json::json!({
                "status": CertificateStatus::Active.as_str()
            })),
        })
        .await;
        Ok(certificate)
    }

    /// Fetch one certificate
    pub async fn certificate(&self, id: CertificateId) -> Result<Certificate> {
        self.storage
            .certificate(id)
            .await?
            .ok_or_else(|| RegistryError::not_found(format!("certificate {id}")))
    }

    /// Certificates held by a shareholder
    pub async fn list_certificates(
        &self,
        shareholder_id: ShareholderId,
    ) -> Result<Vec<Certificate>> {
        self.storage
            .certificates_by_shareholder(shareholder_id)
            .await
    }

    // =========================================================================
    // Transactions
    // =========================================================================

    /// Record a share transaction; it starts `pending` review
    pub async fn record_transaction(
        &self,
        caller: &Caller,
        input: NewTransaction,
    ) -> Result<Transaction> {
        let actor = require_elevated(caller)?;
        Self::require_positive_shares(input.shares)?;
        self.company(input.company_id).await?;

        let now_ms = self.clock.now_ms().await;
        let transaction = self.storage.insert_transaction(input, now_ms).await?;
        self.record_audit(AuditEvent {
            user_id: actor,
            company_id: Some(transaction.company_id),
            action: AuditAction::Create,
            entity_kind: EntityKind::Transaction,
            entity_id: transaction.id.value(),
            old_values: None,
            new_values: Some(Self::snapshot(&transaction)),
        })
        .await;
        Ok(transaction)
    }

    /// Fetch one transaction
    pub async fn transaction(&self, id: TransactionId) -> Result<Transaction> {
        self.storage
            .transaction(id)
            .await?
            .ok_or_else(|| RegistryError::not_found(format!("transaction {id}")))
    }

    /// Transactions for a company, optionally filtered by status
    pub async fn list_transactions(
        &self,
        company_id: CompanyId,
        status: Option<TransactionStatus>,
    ) -> Result<Vec<Transaction>> {
        self.storage.transactions_by_company(company_id, status).await
    }

    // =========================================================================
    // DTC/DWAC requests
    // =========================================================================

    /// File a depository request; it starts `pending`
    pub async fn file_dtc_request(
        &self,
        caller: &Caller,
        input: NewDtcRequest,
    ) -> Result<DtcRequest> {
        let actor = require_elevated(caller)?;
        Self::require_positive_shares(input.shares)?;
        self.company(input.company_id).await?;
        self.shareholder(input.shareholder_id).await?;

        let now_ms = self.clock.now_ms().await;
        let request = self.storage.insert_dtc_request(input, now_ms).await?;
        self.record_audit(AuditEvent {
            user_id: actor,
            company_id: Some(request.company_id),
            action: AuditAction::Create,
            entity_kind: EntityKind::DtcRequest,
            entity_id: request.id.value(),
            old_values: None,
            new_values: Some(Self::snapshot(&request)),
        })
        .await;
        Ok(request)
    }

    /// Fetch one depository request
    pub async fn dtc_request(&self, id: DtcRequestId) -> Result<DtcRequest> {
        self.storage
            .dtc_request(id)
            .await?
            .ok_or_else(|| RegistryError::not_found(format!("dtc request {id}")))
    }

    /// Depository requests for a company
    pub async fn list_dtc_requests(&self, company_id: CompanyId) -> Result<Vec<DtcRequest>> {
        self.storage.dtc_requests_by_company(company_id).await
    }
}
