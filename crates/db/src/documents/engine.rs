//! Document engine, one instantiation per document family.
//!
//! Every operation resolves the actor's visibility afresh and runs under the
//! configured deadline. Create and update write the header, all details and
//! all ledger rows in a single transaction; any error rolls the whole
//! transaction back. A duplicate code re-runs the transaction with a freshly
//! minted code, up to `code_retry_attempts` times.

use std::collections::HashMap;
use std::marker::PhantomData;
use std::time::Duration;

use chrono::{NaiveDate, Utc};
use gudang_core::document::{
    DetailDraft, DetailReconciler, DetailView, Document, DocumentDetail, DocumentDraft,
    DocumentError, DocumentFilter, DocumentHeader, DocumentKind, DocumentSummary, ReturnBalance,
    ReturnableLine, check_line_codes, validate_draft,
};
use gudang_core::inventory::{LedgerKey, Posting};
use gudang_core::scope::Actor;
use gudang_shared::config::EngineConfig;
use gudang_shared::types::{BranchId, CompanyId, DetailId, DocumentId, PageResponse};
use rust_decimal::Decimal;
use sea_orm::{
    ConnectionTrait, DatabaseConnection, DatabaseTransaction, DbErr, TransactionTrait,
};
use tracing::{debug, info, instrument, warn};

use super::family::{
    Delivery, DeliveryReturn, DocumentFamily, Purchase, PurchaseReturn, Receive, ReceiveReturn,
    SalesOrder, SalesOrderReturn,
};
use super::rows::HeaderRow;
use super::store::DocumentStore;
use crate::error::document_error;
use crate::repositories::{CatalogRepository, CodeGenerator, InventoryLedger, ScopeRepository};

/// Purchase order engine.
pub type PurchaseEngine = DocumentEngine<Purchase>;
/// Purchase return engine.
pub type PurchaseReturnEngine = DocumentEngine<PurchaseReturn>;
/// Goods receipt engine.
pub type ReceiveEngine = DocumentEngine<Receive>;
/// Goods receipt return engine.
pub type ReceiveReturnEngine = DocumentEngine<ReceiveReturn>;
/// Delivery engine.
pub type DeliveryEngine = DocumentEngine<Delivery>;
/// Delivery return engine.
pub type DeliveryReturnEngine = DocumentEngine<DeliveryReturn>;
/// Sales order engine.
pub type SalesOrderEngine = DocumentEngine<SalesOrder>;
/// Sales order return engine.
pub type SalesOrderReturnEngine = DocumentEngine<SalesOrderReturn>;

/// Runtime tuning of the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineSettings {
    /// Retries after the first attempt when a code conflict occurs.
    pub code_retry_attempts: u32,
    /// Deadline of one operation, retries included.
    pub operation_timeout: Duration,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self::from(&EngineConfig::default())
    }
}

impl From<&EngineConfig> for EngineSettings {
    fn from(config: &EngineConfig) -> Self {
        Self {
            code_retry_attempts: config.code_retry_attempts,
            operation_timeout: Duration::from_millis(config.operation_timeout_ms),
        }
    }
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Header/detail/ledger engine of one family `F`.
#[derive(Debug, Clone)]
pub struct DocumentEngine<F: DocumentFamily> {
    db: DatabaseConnection,
    settings: EngineSettings,
    clock: fn() -> NaiveDate,
    store: DocumentStore,
    _family: PhantomData<fn() -> F>,
}

impl<F: DocumentFamily> DocumentEngine<F> {
    /// Creates an engine on `db`.
    #[must_use]
    pub const fn new(db: DatabaseConnection, settings: EngineSettings) -> Self {
        Self {
            db,
            settings,
            clock: today,
            store: DocumentStore::new(F::KIND),
            _family: PhantomData,
        }
    }

    /// Replaces the clock that decides the month of generated codes.
    #[must_use]
    pub fn with_clock(mut self, clock: fn() -> NaiveDate) -> Self {
        self.clock = clock;
        self
    }

    /// Family served by this engine.
    #[must_use]
    pub const fn kind(&self) -> DocumentKind {
        F::KIND
    }

    /// Lists headers visible to `actor`, newest first, with detail totals.
    ///
    /// # Errors
    ///
    /// Returns `Timeout` past the deadline, or a database error.
    #[instrument(skip_all, fields(kind = %F::KIND, company_id = %actor.company_id))]
    pub async fn list(
        &self,
        actor: &Actor,
        filter: &DocumentFilter,
    ) -> Result<PageResponse<DocumentSummary>, DocumentError> {
        self.deadline(async {
            let visibility = ScopeRepository::visibility_in(&self.db, actor).await?;
            let hidden_branch = filter
                .branch_id
                .is_some_and(|branch| !visibility.permits(branch));
            if visibility.is_empty() || hidden_branch {
                return Ok(PageResponse::empty(filter.page));
            }

            let company = actor.company_id;
            let total = self.store.count(&self.db, company, &visibility, filter).await?;
            let rows = self.store.page(&self.db, company, &visibility, filter).await?;

            let ids: Vec<DocumentId> =
                rows.iter().map(|row| DocumentId::from_uuid(row.id)).collect();
            let mut totals = self.store.aggregates(&self.db, &ids).await?;

            let summaries = rows
                .into_iter()
                .map(|row| {
                    let header = row.header(F::KIND);
                    let aggregate = totals.remove(&header.id);
                    DocumentSummary {
                        header,
                        parent_code: row.parent_code,
                        origin_code: row.origin_code,
                        line_count: aggregate
                            .as_ref()
                            .map_or(0, |a| u64::try_from(a.line_count).unwrap_or(0)),
                        total_qty: aggregate.as_ref().and_then(|a| a.total_qty).unwrap_or(0),
                        total_price: aggregate.as_ref().and_then(|a| a.total_price),
                        total_disc: aggregate.as_ref().and_then(|a| a.total_disc),
                    }
                })
                .collect();

            Ok(PageResponse::new(summaries, filter.page, total))
        })
        .await
    }

    /// Loads one document with its details.
    ///
    /// # Errors
    ///
    /// Returns `DocumentNotFound` when the document does not exist or is
    /// outside the actor's visible branches.
    #[instrument(
        skip_all,
        fields(kind = %F::KIND, company_id = %actor.company_id, document_id = %id)
    )]
    pub async fn get(&self, actor: &Actor, id: DocumentId) -> Result<Document, DocumentError> {
        self.deadline(async {
            let visibility = ScopeRepository::visibility_in(&self.db, actor).await?;
            let row = self
                .store
                .find(&self.db, actor.company_id, id)
                .await?
                .filter(|row| visibility.permits(row.branch()))
                .ok_or(DocumentError::DocumentNotFound { kind: F::KIND, id })?;

            self.load(&self.db, row).await
        })
        .await
    }

    /// Creates a document on the actor's branch.
    ///
    /// # Errors
    ///
    /// - `HeadOfficeActor` if the actor has no branch
    /// - `ParentNotFound` / `ParentOwnership` for a bad parent reference
    /// - BadRequest variants for an invalid draft or an exceeded return bound
    /// - `CodeConflict` once retries are spent
    #[instrument(skip_all, fields(kind = %F::KIND, company_id = %actor.company_id))]
    pub async fn create(
        &self,
        actor: &Actor,
        draft: DocumentDraft,
    ) -> Result<Document, DocumentError> {
        validate_draft(F::KIND, &draft)?;
        let branch = actor.owning_branch()?;

        self.deadline(async {
            let mut attempt = 0;
            loop {
                let txn = self.db.begin().await.map_err(document_error)?;
                match self.create_in(&txn, actor, branch, &draft).await {
                    Ok(document) => {
                        txn.commit().await.map_err(document_error)?;
                        info!(
                            document_id = %document.header.id,
                            code = %document.header.code,
                            lines = document.details.len(),
                            "document created"
                        );
                        return Ok(document);
                    }
                    Err(err) => {
                        let err = kept_over_rollback(err, txn.rollback().await);
                        if !self.should_retry(&err, &mut attempt) {
                            return Err(err);
                        }
                    }
                }
            }
        })
        .await
    }

    /// Replaces a document's header fields and detail set.
    ///
    /// Details with an id update the persisted line, details without one are
    /// inserted, and persisted lines absent from the draft are deleted. The
    /// ledger follows each change in the same transaction.
    ///
    /// # Errors
    ///
    /// - `DocumentNotFound` if the document is not in the actor's company
    /// - `BranchNotVisible` if its branch is outside the actor's reach
    /// - `DetailNotFound` for a detail id the document does not own
    /// - `LedgerEntryNotFound` if an updated or deleted line never posted
    #[instrument(
        skip_all,
        fields(kind = %F::KIND, company_id = %actor.company_id, document_id = %id)
    )]
    pub async fn update(
        &self,
        actor: &Actor,
        id: DocumentId,
        draft: DocumentDraft,
    ) -> Result<Document, DocumentError> {
        validate_draft(F::KIND, &draft)?;

        self.deadline(async {
            let mut attempt = 0;
            loop {
                let txn = self.db.begin().await.map_err(document_error)?;
                match self.update_in(&txn, actor, id, &draft).await {
                    Ok(document) => {
                        txn.commit().await.map_err(document_error)?;
                        info!(
                            code = %document.header.code,
                            lines = document.details.len(),
                            "document updated"
                        );
                        return Ok(document);
                    }
                    Err(err) => {
                        let err = kept_over_rollback(err, txn.rollback().await);
                        if !self.should_retry(&err, &mut attempt) {
                            return Err(err);
                        }
                    }
                }
            }
        })
        .await
    }

    /// Remaining returnable quantity per product of a parent document.
    ///
    /// # Errors
    ///
    /// Returns `NotAReturn` on a non-return family and `ParentNotFound` when
    /// the parent is absent or not visible.
    #[instrument(
        skip_all,
        fields(kind = %F::KIND, company_id = %actor.company_id, parent_id = %parent_id)
    )]
    pub async fn returnable(
        &self,
        actor: &Actor,
        parent_id: DocumentId,
    ) -> Result<Vec<ReturnableLine>, DocumentError> {
        let parent_kind = F::KIND
            .parent()
            .filter(|_| F::KIND.is_return())
            .ok_or(DocumentError::NotAReturn(F::KIND))?;

        self.deadline(async {
            let visibility = ScopeRepository::visibility_in(&self.db, actor).await?;
            let parent_store = DocumentStore::new(parent_kind);
            parent_store
                .find(&self.db, actor.company_id, parent_id)
                .await?
                .filter(|row| visibility.permits(row.branch()))
                .ok_or(DocumentError::ParentNotFound {
                    kind: parent_kind,
                    id: parent_id,
                })?;

            let balance = self.balance(&self.db, parent_kind, parent_id, None).await?;
            Ok(balance.lines())
        })
        .await
    }

    // ========================================================================
    // Transaction bodies
    // ========================================================================

    async fn create_in(
        &self,
        txn: &DatabaseTransaction,
        actor: &Actor,
        branch: BranchId,
        draft: &DocumentDraft,
    ) -> Result<Document, DocumentError> {
        let company = actor.company_id;
        self.check_parent(txn, company, branch, draft).await?;
        self.check_returns(txn, draft, None).await?;

        let today = (self.clock)();
        let code = CodeGenerator::next_document_code(txn, F::KIND, company, today).await?;
        let now = Utc::now();

        let header = DocumentHeader {
            id: DocumentId::new(),
            kind: F::KIND,
            code,
            date: draft.date,
            remark: draft.remark.clone(),
            disc: draft.disc,
            partner_id: F::TABLES.partner.and(draft.partner_id),
            parent_id: F::KIND.parent().and(draft.parent_id),
            company_id: company,
            branch_id: branch,
            created_by: actor.user_id,
            updated_by: actor.user_id,
            created_at: now,
            updated_at: now,
        };
        self.store.insert_header(txn, &header).await?;

        for line in &draft.details {
            self.insert_line(txn, &header, line, today).await?;
        }

        self.reload(txn, company, header.id).await
    }

    async fn update_in(
        &self,
        txn: &DatabaseTransaction,
        actor: &Actor,
        id: DocumentId,
        draft: &DocumentDraft,
    ) -> Result<Document, DocumentError> {
        let company = actor.company_id;
        let visibility = ScopeRepository::visibility_in(txn, actor).await?;
        let row = self
            .store
            .find(txn, company, id)
            .await?
            .ok_or(DocumentError::DocumentNotFound { kind: F::KIND, id })?;
        let branch = row.branch();
        visibility.ensure_permits(branch)?;
        self.check_parent(txn, company, branch, draft).await?;

        let existing = self.store.details(txn, id).await?;
        let existing_ids: Vec<DetailId> = existing.iter().map(|detail| detail.id).collect();
        let plan = DetailReconciler::reconcile(&existing_ids, &draft.details)?;
        debug!(
            inserts = plan.to_insert.len(),
            updates = plan.to_update.len(),
            deletes = plan.to_delete.len(),
            "details reconciled"
        );

        self.check_returns(txn, draft, Some(id)).await?;

        let header = DocumentHeader {
            date: draft.date,
            remark: draft.remark.clone(),
            disc: draft.disc,
            partner_id: F::TABLES.partner.and(draft.partner_id),
            parent_id: F::KIND.parent().and(draft.parent_id),
            updated_by: actor.user_id,
            updated_at: Utc::now(),
            ..row.header(F::KIND)
        };
        self.store.update_header(txn, &header).await?;

        let today = (self.clock)();
        let persisted: HashMap<DetailId, &DocumentDetail> =
            existing.iter().map(|detail| (detail.id, detail)).collect();

        for line in plan.to_insert {
            self.insert_line(txn, &header, line, today).await?;
        }
        for (detail_id, line) in plan.to_update {
            let previous = persisted
                .get(&detail_id)
                .ok_or(DocumentError::DetailNotFound(detail_id))?;
            self.update_line(txn, &header, previous, line, today).await?;
        }
        for detail_id in plan.to_delete {
            let previous = persisted
                .get(&detail_id)
                .ok_or(DocumentError::DetailNotFound(detail_id))?;
            if F::KIND.moves_stock() {
                InventoryLedger::reverse(txn, &ledger_key(F::KIND, previous)).await?;
            }
            self.store.delete_detail(txn, id, detail_id).await?;
        }

        self.check_returned_covered(txn, id).await?;
        self.reload(txn, company, id).await
    }

    // ========================================================================
    // Detail writes
    // ========================================================================

    async fn insert_line(
        &self,
        txn: &DatabaseTransaction,
        header: &DocumentHeader,
        line: &DetailDraft,
        today: NaiveDate,
    ) -> Result<(), DocumentError> {
        self.check_references(txn, header, line).await?;

        let code = if F::KIND.mints_line_codes() {
            CodeGenerator::next_line_code(txn, F::KIND, line.product_id, today).await?
        } else {
            draft_code(line)?
        };
        let detail = build_detail(F::KIND, DetailId::new(), header.id, line, code);

        self.store.insert_detail(txn, &detail).await?;
        if let Some(posting) = posting(header, &detail) {
            InventoryLedger::post(txn, &posting).await?;
        }
        Ok(())
    }

    async fn update_line(
        &self,
        txn: &DatabaseTransaction,
        header: &DocumentHeader,
        previous: &DocumentDetail,
        line: &DetailDraft,
        today: NaiveDate,
    ) -> Result<(), DocumentError> {
        self.check_references(txn, header, line).await?;

        let code = if !F::KIND.mints_line_codes() {
            draft_code(line)?
        } else if previous.product_id == line.product_id {
            previous.code.clone()
        } else {
            CodeGenerator::next_line_code(txn, F::KIND, line.product_id, today).await?
        };
        let detail = build_detail(F::KIND, previous.id, header.id, line, code);

        self.store.update_detail(txn, &detail).await?;
        if let Some(posting) = posting(header, &detail) {
            InventoryLedger::repost(txn, &ledger_key(F::KIND, previous), &posting).await?;
        }
        Ok(())
    }

    /// Product must be in the company; shelve in the document's branch.
    async fn check_references(
        &self,
        txn: &DatabaseTransaction,
        header: &DocumentHeader,
        line: &DetailDraft,
    ) -> Result<(), DocumentError> {
        CatalogRepository::product(txn, header.company_id, line.product_id).await?;
        if F::KIND.moves_stock() {
            let shelve = line.shelve_id.ok_or(DocumentError::MissingField("shelve_id"))?;
            CatalogRepository::shelve(txn, header.company_id, header.branch_id, shelve).await?;
        }
        Ok(())
    }

    // ========================================================================
    // Parent and return checks
    // ========================================================================

    async fn check_parent<C: ConnectionTrait>(
        &self,
        conn: &C,
        company: CompanyId,
        branch: BranchId,
        draft: &DocumentDraft,
    ) -> Result<(), DocumentError> {
        let Some(parent_kind) = F::KIND.parent() else {
            return Ok(());
        };
        let parent_id = draft.parent_id.ok_or(DocumentError::MissingField("parent_id"))?;

        let parent = DocumentStore::new(parent_kind)
            .find(conn, company, parent_id)
            .await?
            .ok_or(DocumentError::ParentNotFound {
                kind: parent_kind,
                id: parent_id,
            })?;
        if parent.branch() != branch {
            return Err(DocumentError::ParentOwnership {
                kind: parent_kind,
                id: parent_id,
            });
        }
        Ok(())
    }

    async fn check_returns<C: ConnectionTrait>(
        &self,
        conn: &C,
        draft: &DocumentDraft,
        excluding: Option<DocumentId>,
    ) -> Result<(), DocumentError> {
        let (Some(parent_kind), Some(parent_id)) = (F::KIND.parent(), draft.parent_id) else {
            return Ok(());
        };
        if !F::KIND.is_return() {
            return Ok(());
        }

        let parent_lines = DocumentStore::new(parent_kind).line_codes(conn, parent_id).await?;
        check_line_codes(
            parent_lines.iter().map(|(product, code)| (*product, code.as_str())),
            &draft.details,
        )?;

        self.balance(conn, parent_kind, parent_id, excluding)
            .await?
            .check(draft.details.iter().map(|line| (line.product_id, line.qty)))
    }

    /// An originating document may not shrink below what its returns took.
    async fn check_returned_covered<C: ConnectionTrait>(
        &self,
        conn: &C,
        id: DocumentId,
    ) -> Result<(), DocumentError> {
        let Some(return_kind) = F::KIND.returned_by() else {
            return Ok(());
        };
        let returned = DocumentStore::new(return_kind)
            .returned_against(conn, id, None)
            .await?;
        let ordered = self.store.quantities_by_product(conn, id).await?;
        ReturnBalance::new(ordered, returned).ensure_covered()
    }

    async fn balance<C: ConnectionTrait>(
        &self,
        conn: &C,
        parent_kind: DocumentKind,
        parent_id: DocumentId,
        excluding: Option<DocumentId>,
    ) -> Result<ReturnBalance, DocumentError> {
        let ordered = DocumentStore::new(parent_kind)
            .quantities_by_product(conn, parent_id)
            .await?;
        let returned = self.store.returned_against(conn, parent_id, excluding).await?;
        Ok(ReturnBalance::new(ordered, returned))
    }

    // ========================================================================
    // Reads
    // ========================================================================

    async fn reload<C: ConnectionTrait>(
        &self,
        conn: &C,
        company: CompanyId,
        id: DocumentId,
    ) -> Result<Document, DocumentError> {
        let row = self
            .store
            .find(conn, company, id)
            .await?
            .ok_or(DocumentError::DocumentNotFound { kind: F::KIND, id })?;
        self.load(conn, row).await
    }

    async fn load<C: ConnectionTrait>(
        &self,
        conn: &C,
        row: HeaderRow,
    ) -> Result<Document, DocumentError> {
        let header = row.header(F::KIND);
        let details = self.store.details(conn, header.id).await?;

        let products =
            CatalogRepository::product_snapshots(conn, details.iter().map(|d| d.product_id)).await?;
        let shelves =
            CatalogRepository::shelve_snapshots(conn, details.iter().filter_map(|d| d.shelve_id))
                .await?;

        let details = details
            .into_iter()
            .map(|detail| {
                let product = products
                    .get(&detail.product_id)
                    .cloned()
                    .ok_or(DocumentError::ProductNotFound(detail.product_id))?;
                let shelve = detail.shelve_id.and_then(|id| shelves.get(&id).cloned());
                Ok(DetailView {
                    id: detail.id,
                    product,
                    qty: detail.qty,
                    price: detail.price,
                    disc: detail.disc,
                    shelve,
                    code: detail.code,
                })
            })
            .collect::<Result<Vec<_>, DocumentError>>()?;

        Ok(Document {
            parent: row.parent(F::KIND),
            header,
            details,
        })
    }

    // ========================================================================
    // Execution policy
    // ========================================================================

    async fn deadline<T>(
        &self,
        operation: impl Future<Output = Result<T, DocumentError>>,
    ) -> Result<T, DocumentError> {
        tokio::time::timeout(self.settings.operation_timeout, operation)
            .await
            .map_err(|_| DocumentError::Timeout)?
    }

    fn should_retry(&self, err: &DocumentError, attempt: &mut u32) -> bool {
        if !err.is_retryable() || *attempt >= self.settings.code_retry_attempts {
            return false;
        }
        *attempt += 1;
        warn!(attempt = *attempt, error = %err, "code conflict, retrying");
        true
    }
}

/// The transaction is dropped either way, so a failed rollback is logged and
/// the error that caused it is kept.
fn kept_over_rollback(err: DocumentError, rollback: Result<(), DbErr>) -> DocumentError {
    if let Err(rollback) = rollback {
        warn!(error = %err, rollback_error = %rollback, "rollback failed");
    }
    err
}

fn draft_code(line: &DetailDraft) -> Result<String, DocumentError> {
    line.code.clone().ok_or(DocumentError::MissingField("code"))
}

fn build_detail(
    kind: DocumentKind,
    id: DetailId,
    document_id: DocumentId,
    line: &DetailDraft,
    code: String,
) -> DocumentDetail {
    let priced = kind.is_priced();
    DocumentDetail {
        id,
        document_id,
        product_id: line.product_id,
        qty: line.qty,
        price: if priced { line.price } else { None },
        disc: priced.then(|| line.disc.unwrap_or(Decimal::ZERO)),
        shelve_id: if kind.moves_stock() { line.shelve_id } else { None },
        code,
    }
}

fn posting(header: &DocumentHeader, detail: &DocumentDetail) -> Option<Posting> {
    let direction = header.kind.direction()?;
    let shelve_id = detail.shelve_id?;
    Some(Posting {
        key: LedgerKey {
            product_id: detail.product_id,
            product_code: detail.code.clone(),
            transaction_id: header.id,
            kind: header.kind,
        },
        company_id: header.company_id,
        branch_id: header.branch_id,
        shelve_id,
        transaction_code: header.code.clone(),
        transaction_date: header.date,
        direction,
        qty: detail.qty,
    })
}

fn ledger_key(kind: DocumentKind, detail: &DocumentDetail) -> LedgerKey {
    LedgerKey {
        product_id: detail.product_id,
        product_code: detail.code.clone(),
        transaction_id: detail.document_id,
        kind,
    }
}
