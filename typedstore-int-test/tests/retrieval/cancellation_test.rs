use crate::entity::Person;
use crate::retrieval::seed_people;
use std::time::Duration;
use typedstore::errors::ErrorKind;
use typedstore::query::ViewQuery;
use typedstore::store::StoreOperation;
use typedstore_int_test::test_util::create_test_context;

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_dropping_pending_future() {
    let ctx = create_test_context().unwrap();
    seed_people(&ctx).unwrap();
    ctx.store().set_latency(Some(Duration::from_secs(30)));

    let pending = ctx.template().future().unwrap().find_by_id::<Person>("a-1");
    assert_eq!(ctx.store().stats().count(StoreOperation::FetchById), 1);
    assert!(!pending.is_finished());
    drop(pending);

    ctx.store().set_latency(None);
    let person = ctx.template().future().unwrap().find_by_id::<Person>("a-1").await.unwrap();
    assert_eq!(person.id, "a-1");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_cancelled_future_reports_cancelled() {
    let ctx = create_test_context().unwrap();
    seed_people(&ctx).unwrap();
    ctx.store().set_latency(Some(Duration::from_secs(30)));

    let pending = ctx
        .template()
        .future()
        .unwrap()
        .find_by_query::<Person>(&ViewQuery::new("person", "by_age"));
    pending.cancel();

    let err = pending.await.unwrap_err();
    assert_eq!(err.kind(), &ErrorKind::Cancelled);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_future_completes_without_polling() {
    let ctx = create_test_context().unwrap();
    seed_people(&ctx).unwrap();
    ctx.store().set_latency(Some(Duration::from_millis(20)));

    let pending = ctx.template().future().unwrap().find_by_id::<Person>("b-2");
    tokio::task::block_in_place(|| {
        awaitility::at_most(Duration::from_secs(5)).until(|| pending.is_finished());
    });

    assert_eq!(pending.await.unwrap().name, "Bob");
}
