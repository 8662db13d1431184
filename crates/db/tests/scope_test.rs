//! Integration tests for branch and region visibility across the engine.

mod common;

use common::{child_draft, doc_date, insert_branch, insert_company, priced, setup, stocked};
use gudang_core::document::{DocumentDraft, DocumentError, DocumentFilter, ErrorKind};
use gudang_core::scope::{Actor, Visibility};
use gudang_db::ScopeRepository;
use gudang_db::documents::{Purchase, Receive};
use gudang_shared::AppError;
use gudang_shared::types::UserId;

#[tokio::test]
async fn test_branch_actor_sees_only_its_branch() {
    let fx = setup().await;
    let engine = fx.engine::<Purchase>();

    let north = engine
        .create(
            &fx.north_actor(),
            DocumentDraft::new(doc_date(), vec![priced(fx.soap, 1, 100)]),
        )
        .await
        .unwrap();
    let south = engine
        .create(
            &fx.south_actor(),
            DocumentDraft::new(doc_date(), vec![priced(fx.soap, 1, 100)]),
        )
        .await
        .unwrap();

    let page = engine.list(&fx.north_actor(), &DocumentFilter::default()).await.unwrap();
    assert_eq!(page.meta.total, 1);
    assert_eq!(page.data[0].header.id, north.header.id);

    // Out-of-scope reads look exactly like absent documents.
    let err = engine.get(&fx.north_actor(), south.header.id).await.unwrap_err();
    assert!(matches!(err, DocumentError::DocumentNotFound { .. }));
    assert!(matches!(AppError::from(err), AppError::NotFound(_)));

    // Asking for another branch explicitly yields nothing.
    let filtered = engine
        .list(
            &fx.north_actor(),
            &DocumentFilter {
                branch_id: Some(fx.south),
                ..DocumentFilter::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(filtered.meta.total, 0);
    assert!(filtered.data.is_empty());
}

#[tokio::test]
async fn test_region_actor_sees_region_branches_only() {
    let fx = setup().await;
    let engine = fx.engine::<Purchase>();

    for actor in [fx.north_actor(), fx.south_actor(), fx.east_actor()] {
        engine
            .create(&actor, DocumentDraft::new(doc_date(), vec![priced(fx.rice, 1, 100)]))
            .await
            .unwrap();
    }

    let region = engine.list(&fx.region_actor(), &DocumentFilter::default()).await.unwrap();
    assert_eq!(region.meta.total, 2);
    assert!(region.data.iter().all(|s| s.header.branch_id != fx.east));

    let head_office = engine.list(&fx.head_office(), &DocumentFilter::default()).await.unwrap();
    assert_eq!(head_office.meta.total, 3);

    let empty = Actor::region(fx.user, fx.company, fx.empty_region);
    let nothing = engine.list(&empty, &DocumentFilter::default()).await.unwrap();
    assert_eq!(nothing.meta.total, 0);
}

#[tokio::test]
async fn test_region_membership_is_read_per_request() {
    let fx = setup().await;
    let scope = ScopeRepository::new(fx.db.clone());

    let before = scope.visibility(&fx.region_actor()).await.unwrap();
    assert_eq!(before, Visibility::branches([fx.north, fx.south]));

    let west = insert_branch(&fx.db, fx.company, Some(fx.region), "BDG").await;
    let after = scope.visibility(&fx.region_actor()).await.unwrap();
    assert!(after.permits(west));

    assert_eq!(scope.visibility(&fx.head_office()).await.unwrap(), Visibility::Company);
}

#[tokio::test]
async fn test_only_branch_actors_create() {
    let fx = setup().await;
    let engine = fx.engine::<Purchase>();
    let draft = DocumentDraft::new(doc_date(), vec![priced(fx.soap, 1, 100)]);

    for actor in [fx.head_office(), fx.region_actor()] {
        let err = engine.create(&actor, draft.clone()).await.unwrap_err();
        assert!(matches!(err, DocumentError::HeadOfficeActor));
        assert_eq!(err.kind(), ErrorKind::Forbidden);
    }
}

#[tokio::test]
async fn test_update_outside_reach_is_forbidden() {
    let fx = setup().await;
    let engine = fx.engine::<Purchase>();
    let purchase = engine
        .create(
            &fx.north_actor(),
            DocumentDraft::new(doc_date(), vec![priced(fx.soap, 1, 100)]),
        )
        .await
        .unwrap();

    let err = engine
        .update(
            &fx.east_actor(),
            purchase.header.id,
            DocumentDraft::new(doc_date(), vec![]),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, DocumentError::BranchNotVisible(branch) if branch == fx.north));
    assert_eq!(err.kind(), ErrorKind::Forbidden);

    // A region actor covering the branch may update.
    let updated = engine
        .update(
            &fx.region_actor(),
            purchase.header.id,
            DocumentDraft::new(doc_date(), vec![priced(fx.rice, 2, 100)]),
        )
        .await
        .expect("Region actor updates a branch in its region");
    assert_eq!(updated.header.branch_id, fx.north);
    assert_eq!(updated.details.len(), 1);
}

#[tokio::test]
async fn test_parent_of_another_branch_is_forbidden() {
    let fx = setup().await;
    let purchase = fx
        .engine::<Purchase>()
        .create(
            &fx.north_actor(),
            DocumentDraft::new(doc_date(), vec![priced(fx.soap, 5, 100)]),
        )
        .await
        .unwrap();

    let err = fx
        .engine::<Receive>()
        .create(
            &fx.south_actor(),
            child_draft(purchase.header.id, vec![stocked(fx.soap, 5, fx.south_shelf)]),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, DocumentError::ParentOwnership { id, .. } if id == purchase.header.id));
    assert_eq!(err.kind(), ErrorKind::Forbidden);
}

#[tokio::test]
async fn test_parent_of_another_company_is_not_found() {
    let fx = setup().await;
    let other = insert_company(&fx.db, "CV Lain").await;
    let other_branch = insert_branch(&fx.db, other, None, "XXX").await;
    let outsider = Actor::branch(UserId::new(), other, other_branch);

    let purchase = fx
        .engine::<Purchase>()
        .create(
            &fx.north_actor(),
            DocumentDraft::new(doc_date(), vec![priced(fx.soap, 5, 100)]),
        )
        .await
        .unwrap();

    let err = fx
        .engine::<Purchase>()
        .get(&outsider, purchase.header.id)
        .await
        .unwrap_err();
    assert!(matches!(err, DocumentError::DocumentNotFound { .. }));

    let err = fx
        .engine::<Receive>()
        .create(
            &outsider,
            child_draft(purchase.header.id, vec![stocked(fx.soap, 5, fx.north_shelf)]),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, DocumentError::ParentNotFound { .. }));
    assert_eq!(err.kind(), ErrorKind::NotFound);
}
