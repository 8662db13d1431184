//! Family bindings: table layout per document family and the marker types
//! that instantiate [`DocumentEngine`](super::DocumentEngine).

use gudang_core::document::DocumentKind;

/// Physical layout of one family's header and detail tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FamilyTables {
    /// Header table.
    pub header: &'static str,
    /// Detail table.
    pub detail: &'static str,
    /// Column on the detail table (and on child headers) referencing a header.
    pub fk: &'static str,
    /// Supplier or customer column on the header, if any.
    pub partner: Option<&'static str>,
}

/// Returns the table layout of `kind`.
#[must_use]
pub const fn tables_for(kind: DocumentKind) -> FamilyTables {
    match kind {
        DocumentKind::Purchase => FamilyTables {
            header: "purchases",
            detail: "purchase_details",
            fk: "purchase_id",
            partner: Some("supplier_id"),
        },
        DocumentKind::PurchaseReturn => FamilyTables {
            header: "purchase_returns",
            detail: "purchase_return_details",
            fk: "purchase_return_id",
            partner: None,
        },
        DocumentKind::Receive => FamilyTables {
            header: "good_receivings",
            detail: "good_receiving_details",
            fk: "good_receiving_id",
            partner: None,
        },
        DocumentKind::ReceiveReturn => FamilyTables {
            header: "receive_returns",
            detail: "receive_return_details",
            fk: "receive_return_id",
            partner: None,
        },
        DocumentKind::Delivery => FamilyTables {
            header: "deliveries",
            detail: "delivery_details",
            fk: "delivery_id",
            partner: None,
        },
        DocumentKind::DeliveryReturn => FamilyTables {
            header: "delivery_returns",
            detail: "delivery_return_details",
            fk: "delivery_return_id",
            partner: None,
        },
        DocumentKind::SalesOrder => FamilyTables {
            header: "sales_orders",
            detail: "sales_order_details",
            fk: "sales_order_id",
            partner: Some("customer_id"),
        },
        DocumentKind::SalesOrderReturn => FamilyTables {
            header: "sales_order_returns",
            detail: "sales_order_return_details",
            fk: "sales_order_return_id",
            partner: None,
        },
    }
}

/// Column on the header of `kind` that references its parent, e.g.
/// `good_receivings.purchase_id`.
#[must_use]
pub const fn parent_column(kind: DocumentKind) -> Option<&'static str> {
    match kind.parent() {
        Some(parent) => Some(tables_for(parent).fk),
        None => None,
    }
}

/// Compile-time binding of a document family.
pub trait DocumentFamily: Send + Sync + 'static {
    /// Family bound by this type.
    const KIND: DocumentKind;

    /// Table layout of the family.
    const TABLES: FamilyTables = tables_for(Self::KIND);
}

macro_rules! family {
    ($name:ident, $kind:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Copy, Default)]
        pub struct $name;

        impl DocumentFamily for $name {
            const KIND: DocumentKind = DocumentKind::$kind;
        }
    };
}

family!(Purchase, Purchase, "Purchase orders (`PO`).");
family!(PurchaseReturn, PurchaseReturn, "Purchase returns (`PR`).");
family!(Receive, Receive, "Goods receipts (`GR`).");
family!(ReceiveReturn, ReceiveReturn, "Goods receipt returns (`RR`).");
family!(Delivery, Delivery, "Deliveries (`DO`).");
family!(DeliveryReturn, DeliveryReturn, "Delivery returns (`DR`).");
family!(SalesOrder, SalesOrder, "Sales orders (`SO`).");
family!(SalesOrderReturn, SalesOrderReturn, "Sales order returns (`SR`).");

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_tables_are_distinct() {
        let headers: HashSet<_> = DocumentKind::ALL.iter().map(|k| tables_for(*k).header).collect();
        let details: HashSet<_> = DocumentKind::ALL.iter().map(|k| tables_for(*k).detail).collect();
        let fks: HashSet<_> = DocumentKind::ALL.iter().map(|k| tables_for(*k).fk).collect();

        assert_eq!(headers.len(), 8);
        assert_eq!(details.len(), 8);
        assert_eq!(fks.len(), 8);
    }

    #[test]
    fn test_parent_columns() {
        assert_eq!(parent_column(DocumentKind::Receive), Some("purchase_id"));
        assert_eq!(parent_column(DocumentKind::ReceiveReturn), Some("good_receiving_id"));
        assert_eq!(parent_column(DocumentKind::Delivery), Some("sales_order_id"));
        assert_eq!(parent_column(DocumentKind::DeliveryReturn), Some("delivery_id"));
        assert_eq!(parent_column(DocumentKind::Purchase), None);
    }

    #[test]
    fn test_markers_bind_their_family() {
        assert_eq!(Receive::TABLES.header, "good_receivings");
        assert_eq!(<SalesOrder as DocumentFamily>::TABLES.partner, Some("customer_id"));
        assert_eq!(DeliveryReturn::KIND.tag(), "DR");
    }
}
