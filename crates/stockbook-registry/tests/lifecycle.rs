//! Deletion guard flows against the in-memory store

use std::sync::Arc;

use assert_matches::assert_matches;
use stockbook_core::domain::{
    AuditAction, EntityKind, NewCompany, NewHolding, NewShareClass, NewShareholder,
};
use stockbook_core::{Caller, RegistryError, Role, UserId};
use stockbook_registry::RegistryService;
use stockbook_store::{FixedClock, MemoryStore};

const START_MS: u64 = 1_700_000_000_000;

struct Harness {
    store: Arc<MemoryStore>,
    service: RegistryService,
}

fn harness() -> Harness {
    let store = Arc::new(MemoryStore::new());
    let clock = Arc::new(FixedClock::new(START_MS));
    let service = RegistryService::new(store.clone(), store.clone(), clock);
    Harness { store, service }
}

fn admin() -> Caller {
    Caller::admin(UserId::new(1))
}

fn standard() -> Caller {
    Caller::authenticated(UserId::new(2), Role::Standard)
}

fn new_company(name: &str) -> NewCompany {
    NewCompany {
        name: name.to_string(),
        ticker: None,
    }
}

#[tokio::test]
async fn company_delete_blocked_while_shareholders_exist() {
    let h = harness();
    let company = h
        .service
        .create_company(&admin(), new_company("Acme Corp"))
        .await
        .unwrap();
    h.service
        .create_shareholder(
            &admin(),
            NewShareholder {
                company_id: company.id,
                name: "Ada Lovelace".to_string(),
                email: None,
            },
        )
        .await
        .unwrap();

    let err = h.service.delete_company(&admin(), company.id).await.unwrap_err();
    assert_matches!(err, RegistryError::Precondition { .. });
    assert!(err.to_string().contains("Cannot delete company"));

    // The company is still present after the rejected delete.
    assert!(h.service.company(company.id).await.is_ok());
}

#[tokio::test]
async fn company_delete_succeeds_once_shareholders_are_gone() {
    let h = harness();
    let company = h
        .service
        .create_company(&admin(), new_company("Acme Corp"))
        .await
        .unwrap();
    let holder = h
        .service
        .create_shareholder(
            &admin(),
            NewShareholder {
                company_id: company.id,
                name: "Ada Lovelace".to_string(),
                email: None,
            },
        )
        .await
        .unwrap();

    // No holdings on the account, so the shareholder delete is clean.
    h.service.delete_shareholder(&admin(), holder.id).await.unwrap();
    h.service.delete_company(&admin(), company.id).await.unwrap();

    assert_matches!(
        h.service.company(company.id).await,
        Err(RegistryError::NotFound { .. })
    );

    let audits = h
        .store
        .audit_records_for(EntityKind::Company, company.id.value())
        .await;
    let deletes: Vec<_> = audits
        .iter()
        .filter(|r| r.event.action == AuditAction::Delete)
        .collect();
    assert_eq!(deletes.len(), 1);
    assert_eq!(deletes[0].event.user_id, UserId::new(1));
    assert!(deletes[0].event.old_values.is_some());
}

#[tokio::test]
async fn shareholder_delete_follows_holdings_sum() {
    let h = harness();
    let company = h
        .service
        .create_company(&admin(), new_company("Acme Corp"))
        .await
        .unwrap();
    let holder = h
        .service
        .create_shareholder(
            &admin(),
            NewShareholder {
                company_id: company.id,
                name: "Grace Hopper".to_string(),
                email: Some("grace@example.com".to_string()),
            },
        )
        .await
        .unwrap();
    let class = h
        .service
        .register_share_class(
            &admin(),
            NewShareClass {
                company_id: company.id,
                name: "Common".to_string(),
                votes_per_share: 1,
            },
        )
        .await
        .unwrap();

    // Two holdings summing to 1,200 shares.
    let h1 = h
        .service
        .record_holding(
            &admin(),
            NewHolding {
                shareholder_id: holder.id,
                share_class_id: class.id,
                shares: 1_000,
                restricted: false,
            },
        )
        .await
        .unwrap();
    let h2 = h
        .service
        .record_holding(
            &admin(),
            NewHolding {
                shareholder_id: holder.id,
                share_class_id: class.id,
                shares: 200,
                restricted: true,
            },
        )
        .await
        .unwrap();

    let err = h
        .service
        .delete_shareholder(&admin(), holder.id)
        .await
        .unwrap_err();
    assert_matches!(err, RegistryError::Precondition { .. });
    assert!(err.to_string().contains("1200"));
    assert!(h.service.shareholder(holder.id).await.is_ok());

    // All shares transferred out; both holdings drop to zero.
    h.service.set_holding_shares(&admin(), h1.id, 0).await.unwrap();
    h.service.set_holding_shares(&admin(), h2.id, 0).await.unwrap();

    h.service.delete_shareholder(&admin(), holder.id).await.unwrap();
    assert_matches!(
        h.service.shareholder(holder.id).await,
        Err(RegistryError::NotFound { .. })
    );

    let deletes = h
        .store
        .audit_records_for(EntityKind::Shareholder, holder.id.value())
        .await
        .into_iter()
        .filter(|r| r.event.action == AuditAction::Delete)
        .count();
    assert_eq!(deletes, 1);
}

#[tokio::test]
async fn deletes_require_the_elevated_role() {
    let h = harness();
    let company = h
        .service
        .create_company(&admin(), new_company("Acme Corp"))
        .await
        .unwrap();

    for caller in [Caller::Anonymous, standard()] {
        let err = h.service.delete_company(&caller, company.id).await.unwrap_err();
        assert_matches!(err, RegistryError::Unauthorized { .. });
    }

    // The rejected calls touched nothing.
    assert!(h.service.company(company.id).await.is_ok());
    assert!(h
        .store
        .audit_records_for(EntityKind::Company, company.id.value())
        .await
        .iter()
        .all(|r| r.event.action != AuditAction::Delete));
}

#[tokio::test]
async fn delete_of_missing_company_is_not_found() {
    let h = harness();
    assert_matches!(
        h.service
            .delete_company(&admin(), stockbook_core::CompanyId::new(404))
            .await,
        Err(RegistryError::NotFound { .. })
    );
}

#[tokio::test]
async fn storage_outage_fails_before_guard_logic() {
    let h = harness();
    let company = h
        .service
        .create_company(&admin(), new_company("Acme Corp"))
        .await
        .unwrap();

    h.store.set_unavailable(true);
    let err = h.service.delete_company(&admin(), company.id).await.unwrap_err();
    assert_matches!(err, RegistryError::Storage { .. });

    h.store.set_unavailable(false);
    assert!(h.service.company(company.id).await.is_ok());
}

#[tokio::test]
async fn create_validations_fail_before_any_write() {
    let h = harness();
    let err = h
        .service
        .create_company(&admin(), new_company("   "))
        .await
        .unwrap_err();
    assert_matches!(err, RegistryError::Invalid { .. });
    assert!(h.service.list_companies().await.unwrap().is_empty());
}
