//! Integration tests for return documents: line-code correlation, the
//! returnable-quantity bound and the reversed ledger direction.

mod common;

use common::{Fixture, child_draft, doc_date, priced, setup, stocked};
use gudang_core::document::{
    DetailDraft, DocumentDraft, DocumentError, DocumentFilter, DocumentKind, ErrorKind,
};
use gudang_db::InventoryLedger;
use gudang_db::documents::{Purchase, PurchaseReturn, Receive, ReceiveReturn};
use gudang_shared::types::DocumentId;
use gudang_shared::AppError;

/// Receipt of 10 soap on the north branch, returning `(receive id, soap line code)`.
async fn received_soap(fx: &Fixture) -> (DocumentId, String) {
    let purchase = fx
        .engine::<Purchase>()
        .create(
            &fx.north_actor(),
            DocumentDraft::new(doc_date(), vec![priced(fx.soap, 10, 1500)]),
        )
        .await
        .unwrap();
    let receive = fx
        .engine::<Receive>()
        .create(
            &fx.north_actor(),
            child_draft(purchase.header.id, vec![stocked(fx.soap, 10, fx.north_shelf)]),
        )
        .await
        .unwrap();

    (receive.header.id, receive.details[0].code.clone())
}

fn return_line(fx: &Fixture, qty: i64, code: &str) -> DetailDraft {
    DetailDraft {
        code: Some(code.to_string()),
        ..stocked(fx.soap, qty, fx.north_shelf)
    }
}

#[tokio::test]
async fn test_return_over_bound_is_rejected_before_any_write() {
    let fx = setup().await;
    let (receive, code) = received_soap(&fx).await;
    let engine = fx.engine::<ReceiveReturn>();

    let err = engine
        .create(&fx.north_actor(), child_draft(receive, vec![return_line(&fx, 11, &code)]))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        DocumentError::ReturnQuantityExceeded { requested: 11, remaining: 10, .. }
    ));
    assert_eq!(err.kind(), ErrorKind::BadRequest);
    assert!(matches!(AppError::from(err), AppError::Validation(_)));

    let listed = engine.list(&fx.north_actor(), &DocumentFilter::default()).await.unwrap();
    assert_eq!(listed.meta.total, 0);
    let ledger = InventoryLedger::new(fx.db.clone());
    assert_eq!(ledger.stock_on_hand(fx.company, fx.north, fx.soap).await.unwrap(), 10);
}

#[tokio::test]
async fn test_return_bound_counts_earlier_returns() {
    let fx = setup().await;
    let (receive, code) = received_soap(&fx).await;
    let engine = fx.engine::<ReceiveReturn>();

    let first = engine
        .create(&fx.north_actor(), child_draft(receive, vec![return_line(&fx, 4, &code)]))
        .await
        .expect("Failed to create first return");
    assert_eq!(first.header.code, "RR20261000001");
    assert_eq!(first.details[0].code, code);

    let remaining = engine.returnable(&fx.north_actor(), receive).await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].product_id, fx.soap);
    assert_eq!(remaining[0].ordered, 10);
    assert_eq!(remaining[0].returned, 4);
    assert_eq!(remaining[0].remaining, 6);

    let err = engine
        .create(&fx.north_actor(), child_draft(receive, vec![return_line(&fx, 7, &code)]))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        DocumentError::ReturnQuantityExceeded { requested: 7, remaining: 6, .. }
    ));

    engine
        .create(&fx.north_actor(), child_draft(receive, vec![return_line(&fx, 6, &code)]))
        .await
        .expect("Returning the exact remainder succeeds");

    let remaining = engine.returnable(&fx.north_actor(), receive).await.unwrap();
    assert_eq!(remaining[0].remaining, 0);

    let ledger = InventoryLedger::new(fx.db.clone());
    assert_eq!(ledger.stock_on_hand(fx.company, fx.north, fx.soap).await.unwrap(), 0);

    let entries = ledger
        .entries_for_transaction(DocumentKind::ReceiveReturn, first.header.id)
        .await
        .unwrap();
    assert_eq!(entries.len(), 1);
    assert!(!entries[0].in_out);
    assert_eq!(entries[0].transaction_type, "RR");
}

#[tokio::test]
async fn test_return_lines_of_one_product_are_summed() {
    let fx = setup().await;
    let purchase = fx
        .engine::<Purchase>()
        .create(
            &fx.north_actor(),
            DocumentDraft::new(doc_date(), vec![priced(fx.soap, 10, 1500)]),
        )
        .await
        .unwrap();
    let receive = fx
        .engine::<Receive>()
        .create(
            &fx.north_actor(),
            child_draft(
                purchase.header.id,
                vec![stocked(fx.soap, 4, fx.north_shelf), stocked(fx.soap, 6, fx.north_overflow)],
            ),
        )
        .await
        .unwrap();
    let code_of = |qty| {
        receive
            .details
            .iter()
            .find(|detail| detail.qty == qty)
            .map(|detail| detail.code.clone())
            .unwrap()
    };
    let (shelf_code, overflow_code) = (code_of(4), code_of(6));
    assert_ne!(shelf_code, overflow_code);
    let engine = fx.engine::<ReceiveReturn>();

    let overflow_line = |qty| DetailDraft {
        code: Some(overflow_code.clone()),
        ..stocked(fx.soap, qty, fx.north_overflow)
    };

    let err = engine
        .create(
            &fx.north_actor(),
            child_draft(
                receive.header.id,
                vec![return_line(&fx, 5, &shelf_code), overflow_line(6)],
            ),
        )
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        DocumentError::ReturnQuantityExceeded { requested: 11, remaining: 10, .. }
    ));

    let created = engine
        .create(
            &fx.north_actor(),
            child_draft(
                receive.header.id,
                vec![return_line(&fx, 4, &shelf_code), overflow_line(6)],
            ),
        )
        .await
        .expect("Failed to return both lines");
    assert_eq!(created.details.len(), 2);

    let ledger = InventoryLedger::new(fx.db.clone());
    assert_eq!(ledger.stock_on_hand(fx.company, fx.north, fx.soap).await.unwrap(), 0);
}

#[tokio::test]
async fn test_return_rejects_repeated_line_code() {
    let fx = setup().await;
    let (receive, code) = received_soap(&fx).await;
    let engine = fx.engine::<ReceiveReturn>();

    let err = engine
        .create(
            &fx.north_actor(),
            child_draft(receive, vec![return_line(&fx, 1, &code), return_line(&fx, 1, &code)]),
        )
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        DocumentError::DuplicateLineCode { product_id, .. } if product_id == fx.soap
    ));
    assert_eq!(err.kind(), ErrorKind::BadRequest);
    assert!(!err.is_retryable());
    let listed = engine.list(&fx.north_actor(), &DocumentFilter::default()).await.unwrap();
    assert_eq!(listed.meta.total, 0);

    let created = engine
        .create(&fx.north_actor(), child_draft(receive, vec![return_line(&fx, 2, &code)]))
        .await
        .unwrap();
    let err = engine
        .update(
            &fx.north_actor(),
            created.header.id,
            child_draft(
                receive,
                vec![
                    DetailDraft {
                        id: Some(created.details[0].id),
                        ..return_line(&fx, 2, &code)
                    },
                    return_line(&fx, 1, &code),
                ],
            ),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, DocumentError::DuplicateLineCode { .. }));

    let unchanged = engine.get(&fx.north_actor(), created.header.id).await.unwrap();
    assert_eq!(unchanged.details.len(), 1);
    assert_eq!(unchanged.details[0].qty, 2);
    let ledger = InventoryLedger::new(fx.db.clone());
    assert_eq!(ledger.stock_on_hand(fx.company, fx.north, fx.soap).await.unwrap(), 8);
}

#[tokio::test]
async fn test_receipt_cannot_shrink_below_returned() {
    let fx = setup().await;
    let (receive, code) = received_soap(&fx).await;
    fx.engine::<ReceiveReturn>()
        .create(&fx.north_actor(), child_draft(receive, vec![return_line(&fx, 4, &code)]))
        .await
        .unwrap();

    let engine = fx.engine::<Receive>();
    let current = engine.get(&fx.north_actor(), receive).await.unwrap();
    let purchase = current.header.parent_id.unwrap();
    let line = current.details[0].id;
    let resized = |qty| {
        child_draft(
            purchase,
            vec![DetailDraft {
                id: Some(line),
                ..stocked(fx.soap, qty, fx.north_shelf)
            }],
        )
    };

    let err = engine
        .update(&fx.north_actor(), receive, resized(3))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        DocumentError::ReturnedBeyondParent { ordered: 3, returned: 4, .. }
    ));
    assert_eq!(err.kind(), ErrorKind::BadRequest);

    let err = engine
        .update(&fx.north_actor(), receive, child_draft(purchase, Vec::new()))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        DocumentError::ReturnedBeyondParent { ordered: 0, returned: 4, .. }
    ));

    let ledger = InventoryLedger::new(fx.db.clone());
    assert_eq!(ledger.stock_on_hand(fx.company, fx.north, fx.soap).await.unwrap(), 6);

    let updated = engine
        .update(&fx.north_actor(), receive, resized(4))
        .await
        .expect("Shrinking to the returned quantity succeeds");
    assert_eq!(updated.details[0].qty, 4);
    assert_eq!(updated.details[0].code, code);
    assert_eq!(ledger.stock_on_hand(fx.company, fx.north, fx.soap).await.unwrap(), 0);
}

#[tokio::test]
async fn test_return_update_excludes_its_own_lines() {
    let fx = setup().await;
    let (receive, code) = received_soap(&fx).await;
    let engine = fx.engine::<ReceiveReturn>();

    let first = engine
        .create(&fx.north_actor(), child_draft(receive, vec![return_line(&fx, 4, &code)]))
        .await
        .unwrap();
    engine
        .create(&fx.north_actor(), child_draft(receive, vec![return_line(&fx, 3, &code)]))
        .await
        .unwrap();
    let line = first.details[0].id;

    // 10 - 3 returned elsewhere leaves 7 for this document.
    let err = engine
        .update(
            &fx.north_actor(),
            first.header.id,
            child_draft(
                receive,
                vec![DetailDraft {
                    id: Some(line),
                    ..return_line(&fx, 8, &code)
                }],
            ),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, DocumentError::ReturnQuantityExceeded { remaining: 7, .. }));

    let updated = engine
        .update(
            &fx.north_actor(),
            first.header.id,
            child_draft(
                receive,
                vec![DetailDraft {
                    id: Some(line),
                    ..return_line(&fx, 7, &code)
                }],
            ),
        )
        .await
        .expect("Failed to update return");
    assert_eq!(updated.details[0].qty, 7);

    let ledger = InventoryLedger::new(fx.db.clone());
    assert_eq!(ledger.stock_on_hand(fx.company, fx.north, fx.soap).await.unwrap(), 0);
}

#[tokio::test]
async fn test_return_line_must_match_parent_line_code() {
    let fx = setup().await;
    let (receive, code) = received_soap(&fx).await;
    let engine = fx.engine::<ReceiveReturn>();

    let err = engine
        .create(
            &fx.north_actor(),
            child_draft(receive, vec![return_line(&fx, 1, "GR20261000000000000099")]),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, DocumentError::UnknownLineCode { .. }));
    assert_eq!(err.kind(), ErrorKind::BadRequest);

    // Right code, wrong product.
    let err = engine
        .create(
            &fx.north_actor(),
            child_draft(
                receive,
                vec![DetailDraft {
                    code: Some(code),
                    ..stocked(fx.rice, 1, fx.north_shelf)
                }],
            ),
        )
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        DocumentError::UnknownLineCode { product_id, .. } if product_id == fx.rice
    ));
}

#[tokio::test]
async fn test_purchase_return_moves_no_stock() {
    let fx = setup().await;
    let purchase = fx
        .engine::<Purchase>()
        .create(
            &fx.north_actor(),
            DocumentDraft::new(doc_date(), vec![priced(fx.rice, 5, 9000)]),
        )
        .await
        .unwrap();

    let purchase_return = fx
        .engine::<PurchaseReturn>()
        .create(
            &fx.north_actor(),
            child_draft(
                purchase.header.id,
                vec![DetailDraft {
                    code: Some(purchase.details[0].code.clone()),
                    ..priced(fx.rice, 2, 9000)
                }],
            ),
        )
        .await
        .expect("Failed to create purchase return");

    assert_eq!(purchase_return.header.code, "PR20261000001");
    assert_eq!(purchase_return.details[0].code, purchase.details[0].code);
    let ledger = InventoryLedger::new(fx.db.clone());
    let entries = ledger
        .entries_for_transaction(DocumentKind::PurchaseReturn, purchase_return.header.id)
        .await
        .unwrap();
    assert!(entries.is_empty());
}

#[tokio::test]
async fn test_returnable_rejects_non_return_family_and_hidden_parent() {
    let fx = setup().await;
    let (receive, _) = received_soap(&fx).await;

    let err = fx
        .engine::<Receive>()
        .returnable(&fx.north_actor(), receive)
        .await
        .unwrap_err();
    assert!(matches!(err, DocumentError::NotAReturn(DocumentKind::Receive)));

    let err = fx
        .engine::<ReceiveReturn>()
        .returnable(&fx.south_actor(), receive)
        .await
        .unwrap_err();
    assert!(matches!(err, DocumentError::ParentNotFound { .. }));
}
