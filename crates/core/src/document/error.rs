//! Document engine error types.
//!
//! Every failure the engine can report is a [`DocumentError`]. Each variant
//! belongs to exactly one [`ErrorKind`], which is what callers branch on.

use gudang_shared::AppError;
use gudang_shared::types::{BranchId, DetailId, DocumentId, ProductId, ShelveId};
use thiserror::Error;

use super::kind::DocumentKind;

/// Coarse classification of a [`DocumentError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Row absent or outside the actor's scope.
    NotFound,
    /// Actor does not own the target.
    Forbidden,
    /// The request itself is invalid.
    BadRequest,
    /// Unique code collision; retry with a fresh code.
    Conflict,
    /// Any other storage or runtime failure.
    Internal,
}

/// Errors that can occur during document operations.
#[derive(Debug, Error)]
pub enum DocumentError {
    // ========== Not found ==========
    /// Document not found in the actor's company or visible branches.
    #[error("{kind} document not found: {id}")]
    DocumentNotFound {
        /// Family of the missing document.
        kind: DocumentKind,
        /// Requested id.
        id: DocumentId,
    },

    /// Parent document not found in the actor's company.
    #[error("Parent {kind} document not found: {id}")]
    ParentNotFound {
        /// Family of the parent.
        kind: DocumentKind,
        /// Requested parent id.
        id: DocumentId,
    },

    /// Detail id does not belong to the document being updated.
    #[error("Detail not found: {0}")]
    DetailNotFound(DetailId),

    /// Product not found in the company.
    #[error("Product not found: {0}")]
    ProductNotFound(ProductId),

    /// Shelve not found in the document's branch.
    #[error("Shelve not found: {0}")]
    ShelveNotFound(ShelveId),

    /// No inventory row matches the composite ledger key.
    #[error("Inventory entry not found for product {product_id} code {product_code} in {kind} {transaction_id}")]
    LedgerEntryNotFound {
        /// Product of the detail.
        product_id: ProductId,
        /// Product-scoped line code.
        product_code: String,
        /// Owning document.
        transaction_id: DocumentId,
        /// Owning document family.
        kind: DocumentKind,
    },

    // ========== Forbidden ==========
    /// Head-office actors cannot create branch-scoped documents.
    #[error("Head-office actor cannot create branch documents")]
    HeadOfficeActor,

    /// Target branch is outside the actor's visible branches.
    #[error("Branch {0} is outside the actor's scope")]
    BranchNotVisible(BranchId),

    /// Parent document belongs to another branch.
    #[error("Parent {kind} document {id} belongs to another branch")]
    ParentOwnership {
        /// Family of the parent.
        kind: DocumentKind,
        /// Parent id.
        id: DocumentId,
    },

    // ========== Bad request ==========
    /// Required field missing for this family.
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    /// Quantity must be positive.
    #[error("Quantity must be positive for product {product_id}, got {qty}")]
    InvalidQuantity {
        /// Product of the offending line.
        product_id: ProductId,
        /// Requested quantity.
        qty: i64,
    },

    /// Price or discount is negative.
    #[error("{0} cannot be negative")]
    NegativeAmount(&'static str),

    /// Same detail id appears twice in one request.
    #[error("Detail {0} appears more than once in the request")]
    DuplicateDetail(DetailId),

    /// Return code does not match any line of the parent document.
    #[error("Code {code} does not match any line of product {product_id} on the parent document")]
    UnknownLineCode {
        /// Product of the return line.
        product_id: ProductId,
        /// Correlation code supplied.
        code: String,
    },

    /// Same product and correlation code appear on two lines of one return.
    #[error("Code {code} for product {product_id} appears on more than one return line")]
    DuplicateLineCode {
        /// Product of the repeated line.
        product_id: ProductId,
        /// Correlation code supplied twice.
        code: String,
    },

    /// Return quantity exceeds what remains returnable.
    #[error("Return quantity {requested} for product {product_id} exceeds remaining {remaining}")]
    ReturnQuantityExceeded {
        /// Product of the return line.
        product_id: ProductId,
        /// Total quantity requested for the product.
        requested: i64,
        /// Quantity still returnable.
        remaining: i64,
    },

    /// Originating document would hold less than its returns already took back.
    #[error("Product {product_id} would drop to {ordered} but {returned} is already returned")]
    ReturnedBeyondParent {
        /// Product of the originating line.
        product_id: ProductId,
        /// Quantity the document would hold after the change.
        ordered: i64,
        /// Quantity already returned against it.
        returned: i64,
    },

    /// Stored code does not end in the expected numeric suffix.
    #[error("Malformed code: {0}")]
    MalformedCode(String),

    /// Operation only exists for return families.
    #[error("{0} is not a return document")]
    NotAReturn(DocumentKind),

    // ========== Conflict ==========
    /// Unique constraint on a generated code was violated.
    #[error("Code conflict, retry with a fresh code: {0}")]
    CodeConflict(String),

    // ========== Internal ==========
    /// Suffix space for the month is used up.
    #[error("Code sequence exhausted for prefix {0}")]
    CodeSequenceExhausted(String),

    /// Operation exceeded its deadline and was rolled back.
    #[error("Operation timed out")]
    Timeout,

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),
}

impl DocumentError {
    /// Returns the coarse kind of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::DocumentNotFound { .. }
            | Self::ParentNotFound { .. }
            | Self::DetailNotFound(_)
            | Self::ProductNotFound(_)
            | Self::ShelveNotFound(_)
            | Self::LedgerEntryNotFound { .. } => ErrorKind::NotFound,
            Self::HeadOfficeActor | Self::BranchNotVisible(_) | Self::ParentOwnership { .. } => {
                ErrorKind::Forbidden
            }
            Self::MissingField(_)
            | Self::InvalidQuantity { .. }
            | Self::NegativeAmount(_)
            | Self::DuplicateDetail(_)
            | Self::UnknownLineCode { .. }
            | Self::DuplicateLineCode { .. }
            | Self::ReturnQuantityExceeded { .. }
            | Self::ReturnedBeyondParent { .. }
            | Self::MalformedCode(_)
            | Self::NotAReturn(_) => ErrorKind::BadRequest,
            Self::CodeConflict(_) => ErrorKind::Conflict,
            Self::CodeSequenceExhausted(_) | Self::Timeout | Self::Database(_) => {
                ErrorKind::Internal
            }
        }
    }

    /// Returns true if the whole operation may be re-run.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self.kind(), ErrorKind::Conflict)
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::DocumentNotFound { .. } => "DOCUMENT_NOT_FOUND",
            Self::ParentNotFound { .. } => "PARENT_NOT_FOUND",
            Self::DetailNotFound(_) => "DETAIL_NOT_FOUND",
            Self::ProductNotFound(_) => "PRODUCT_NOT_FOUND",
            Self::ShelveNotFound(_) => "SHELVE_NOT_FOUND",
            Self::LedgerEntryNotFound { .. } => "LEDGER_ENTRY_NOT_FOUND",
            Self::HeadOfficeActor => "HEAD_OFFICE_ACTOR",
            Self::BranchNotVisible(_) => "BRANCH_NOT_VISIBLE",
            Self::ParentOwnership { .. } => "PARENT_OWNERSHIP",
            Self::MissingField(_) => "MISSING_FIELD",
            Self::InvalidQuantity { .. } => "INVALID_QUANTITY",
            Self::NegativeAmount(_) => "NEGATIVE_AMOUNT",
            Self::DuplicateDetail(_) => "DUPLICATE_DETAIL",
            Self::UnknownLineCode { .. } => "UNKNOWN_LINE_CODE",
            Self::DuplicateLineCode { .. } => "DUPLICATE_LINE_CODE",
            Self::ReturnQuantityExceeded { .. } => "RETURN_QUANTITY_EXCEEDED",
            Self::ReturnedBeyondParent { .. } => "RETURNED_BEYOND_PARENT",
            Self::MalformedCode(_) => "MALFORMED_CODE",
            Self::NotAReturn(_) => "NOT_A_RETURN",
            Self::CodeConflict(_) => "CODE_CONFLICT",
            Self::CodeSequenceExhausted(_) => "CODE_SEQUENCE_EXHAUSTED",
            Self::Timeout => "TIMEOUT",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }
}

/// NotFound and Forbidden collapse into one opaque denial so that callers
/// cannot learn which documents exist outside their scope.
impl From<DocumentError> for AppError {
    fn from(err: DocumentError) -> Self {
        match err.kind() {
            ErrorKind::NotFound | ErrorKind::Forbidden => {
                Self::NotFound("document not found".to_string())
            }
            ErrorKind::BadRequest => Self::Validation(err.to_string()),
            ErrorKind::Conflict => Self::Conflict(err.to_string()),
            ErrorKind::Internal => match err {
                DocumentError::Database(msg) => Self::Database(msg),
                other => Self::Internal(other.to_string()),
            },
        }
    }
}
