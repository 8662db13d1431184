//! Document families and their static properties.
//!
//! Everything that differs between the eight families and is known at compile
//! time lives here: the two-character tag used for codes and ledger rows, the
//! parent family, whether lines carry prices, and the stock direction.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Width of the numeric suffix of a document code (`PO20261000001`).
pub const DOCUMENT_CODE_WIDTH: usize = 5;

/// Width of the numeric suffix of a product-scoped line code.
pub const PRODUCT_CODE_WIDTH: usize = 14;

/// One of the eight header/detail document families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    /// Purchase order to a supplier.
    Purchase,
    /// Return of purchased goods against a purchase.
    PurchaseReturn,
    /// Goods receipt against a purchase.
    Receive,
    /// Return of received goods against a goods receipt.
    ReceiveReturn,
    /// Delivery against a sales order.
    Delivery,
    /// Return of delivered goods against a delivery.
    DeliveryReturn,
    /// Sales order from a customer.
    SalesOrder,
    /// Return against a sales order.
    SalesOrderReturn,
}

/// Direction of a stock movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Stock enters the branch.
    In,
    /// Stock leaves the branch.
    Out,
}

impl Direction {
    /// Returns the opposite direction.
    #[must_use]
    pub const fn reverse(self) -> Self {
        match self {
            Self::In => Self::Out,
            Self::Out => Self::In,
        }
    }

    /// The persisted `in_out` flag: `true` for stock in.
    #[must_use]
    pub const fn as_flag(self) -> bool {
        matches!(self, Self::In)
    }

    /// Reads a persisted `in_out` flag.
    #[must_use]
    pub const fn from_flag(flag: bool) -> Self {
        if flag { Self::In } else { Self::Out }
    }
}

impl DocumentKind {
    /// All families, parents before their dependents.
    pub const ALL: [Self; 8] = [
        Self::Purchase,
        Self::SalesOrder,
        Self::PurchaseReturn,
        Self::Receive,
        Self::SalesOrderReturn,
        Self::Delivery,
        Self::ReceiveReturn,
        Self::DeliveryReturn,
    ];

    /// Two-character tag used as code prefix and ledger transaction type.
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Purchase => "PO",
            Self::PurchaseReturn => "PR",
            Self::Receive => "GR",
            Self::ReceiveReturn => "RR",
            Self::Delivery => "DO",
            Self::DeliveryReturn => "DR",
            Self::SalesOrder => "SO",
            Self::SalesOrderReturn => "SR",
        }
    }

    /// Looks a family up by its tag.
    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.tag() == tag)
    }

    /// The upstream family a document of this family is created against.
    #[must_use]
    pub const fn parent(self) -> Option<Self> {
        match self {
            Self::Purchase | Self::SalesOrder => None,
            Self::PurchaseReturn | Self::Receive => Some(Self::Purchase),
            Self::ReceiveReturn => Some(Self::Receive),
            Self::Delivery | Self::SalesOrderReturn => Some(Self::SalesOrder),
            Self::DeliveryReturn => Some(Self::Delivery),
        }
    }

    /// The return family that takes goods back from this one.
    #[must_use]
    pub const fn returned_by(self) -> Option<Self> {
        match self {
            Self::Purchase => Some(Self::PurchaseReturn),
            Self::Receive => Some(Self::ReceiveReturn),
            Self::Delivery => Some(Self::DeliveryReturn),
            Self::SalesOrder => Some(Self::SalesOrderReturn),
            Self::PurchaseReturn
            | Self::ReceiveReturn
            | Self::DeliveryReturn
            | Self::SalesOrderReturn => None,
        }
    }

    /// True for the four return families.
    #[must_use]
    pub const fn is_return(self) -> bool {
        matches!(
            self,
            Self::PurchaseReturn
                | Self::ReceiveReturn
                | Self::DeliveryReturn
                | Self::SalesOrderReturn
        )
    }

    /// True when detail lines carry a price and a discount.
    #[must_use]
    pub const fn is_priced(self) -> bool {
        matches!(
            self,
            Self::Purchase | Self::PurchaseReturn | Self::SalesOrder | Self::SalesOrderReturn
        )
    }

    /// True when this family mints product-scoped line codes itself rather
    /// than copying them from the originating document.
    #[must_use]
    pub const fn mints_line_codes(self) -> bool {
        !self.is_return()
    }

    /// Stock direction posted by each detail, or `None` for commercial
    /// documents that never touch the inventory ledger.
    ///
    /// Returns post the reverse of their parent.
    #[must_use]
    pub const fn direction(self) -> Option<Direction> {
        match self {
            Self::Receive => Some(Direction::In),
            Self::Delivery => Some(Direction::Out),
            Self::ReceiveReturn => Some(Direction::In.reverse()),
            Self::DeliveryReturn => Some(Direction::Out.reverse()),
            Self::Purchase | Self::PurchaseReturn | Self::SalesOrder | Self::SalesOrderReturn => {
                None
            }
        }
    }

    /// True when detail inserts, updates and deletes must be mirrored in the
    /// inventory ledger.
    #[must_use]
    pub const fn moves_stock(self) -> bool {
        self.direction().is_some()
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for DocumentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_tag(s).ok_or_else(|| format!("unknown document type: {s}"))
    }
}
