use crate::entity::{generate_person, Person};
use crate::retrieval::seed_people;
use futures_util::StreamExt;
use typedstore::doc;
use typedstore::errors::ErrorKind;
use typedstore::store::StoreOperation;
use typedstore_int_test::test_util::{create_test_context, insert_entity, run_test};

#[test]
fn test_find_by_id() {
    run_test(
        || create_test_context(),
        |ctx| {
            let people = seed_people(&ctx)?;
            let ops = ctx.template().blocking();
            for expected in &people {
                let person = ops.find_by_id::<Person>(&expected.id)?;
                assert_eq!(person.id, expected.id);
                assert_eq!(person.name, expected.name);
                assert_eq!(person.address, expected.address);
                assert_eq!(person.location, expected.location);
            }
            assert_eq!(ctx.store().stats().count(StoreOperation::FetchById), 4);
            Ok(())
        },
    )
}

#[test]
fn test_find_by_id_generated_people() {
    run_test(
        || create_test_context(),
        |ctx| {
            let people: Vec<Person> = (0..20).map(|_| generate_person()).collect();
            for person in &people {
                insert_entity(&ctx, &person.id, person)?;
            }

            let ops = ctx.template().blocking();
            for expected in &people {
                let person = ops.find_by_id::<Person>(&expected.id)?;
                assert_eq!(person.id, expected.id);
                assert_eq!(person.age, expected.age);
            }
            Ok(())
        },
    )
}

#[test]
fn test_id_comes_from_record() {
    run_test(
        || create_test_context(),
        |ctx| {
            ctx.store()
                .put_document("doc-7", doc! { name: "No id in content", age: 3 })?;
            ctx.store()
                .put_document("doc-8", doc! { id: "stale-id", name: "Stale id", age: 4 })?;

            let ops = ctx.template().blocking();
            assert_eq!(ops.find_by_id::<Person>("doc-7")?.id, "doc-7");
            assert_eq!(ops.find_by_id::<Person>("doc-8")?.id, "doc-8");
            Ok(())
        },
    )
}

#[test]
fn test_version_comes_from_cas() {
    run_test(
        || create_test_context(),
        |ctx| {
            let first = ctx.store().put_document("doc-1", doc! { name: "Ada" })?;
            let second = ctx.store().put_document("doc-1", doc! { name: "Ada L." })?;
            assert!(second > first);

            let person = ctx.template().blocking().find_by_id::<Person>("doc-1")?;
            assert_eq!(person.cas, second);
            assert_eq!(person.name, "Ada L.");
            Ok(())
        },
    )
}

#[test]
fn test_non_string_id_in_content_is_mapping_error() {
    run_test(
        || create_test_context(),
        |ctx| {
            ctx.store().put_document("doc-1", doc! { id: 42, name: "Numeric" })?;
            let err = ctx
                .template()
                .blocking()
                .find_by_id::<Person>("doc-1")
                .unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::ObjectMappingError);
            Ok(())
        },
    )
}

#[test]
fn test_not_found_in_blocking_mode() {
    run_test(
        || create_test_context(),
        |ctx| {
            seed_people(&ctx)?;
            let err = ctx
                .template()
                .blocking()
                .find_by_id::<Person>("missing")
                .unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::NotFound);
            Ok(())
        },
    )
}

#[test]
fn test_empty_id_is_rejected_before_store_call() {
    run_test(
        || create_test_context(),
        |ctx| {
            let err = ctx.template().blocking().find_by_id::<Person>("").unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::InvalidId);
            assert_eq!(ctx.store().stats().total(), 0);
            Ok(())
        },
    )
}

#[test]
fn test_store_failure_is_propagated() {
    run_test(
        || create_test_context(),
        |ctx| {
            seed_people(&ctx)?;
            ctx.store().set_unavailable(true);
            let err = ctx
                .template()
                .blocking()
                .find_by_id::<Person>("a-1")
                .unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::StoreCommunicationError);
            Ok(())
        },
    )
}

#[tokio::test]
async fn test_find_by_id_future() {
    let ctx = create_test_context().unwrap();
    seed_people(&ctx).unwrap();
    let ops = ctx.template().future().unwrap();

    let person = ops.find_by_id::<Person>("c-3").await.unwrap();
    assert_eq!(person.id, "c-3");
    assert_eq!(person.name, "Carol");

    let err = ops.find_by_id::<Person>("missing").await.unwrap_err();
    assert_eq!(err.kind(), &ErrorKind::NotFound);

    let err = ops.find_by_id::<Person>("").await.unwrap_err();
    assert_eq!(err.kind(), &ErrorKind::InvalidId);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_concurrent_futures() {
    let ctx = create_test_context().unwrap();
    let people = seed_people(&ctx).unwrap();
    let ops = ctx.template().future().unwrap();

    let pending: Vec<_> = people
        .iter()
        .map(|p| ops.find_by_id::<Person>(&p.id))
        .collect();
    assert_eq!(ctx.store().stats().count(StoreOperation::FetchById), people.len());

    for (future, expected) in pending.into_iter().zip(people.iter()) {
        assert_eq!(future.await.unwrap().id, expected.id);
    }
}

#[tokio::test]
async fn test_find_by_id_stream() {
    let ctx = create_test_context().unwrap();
    seed_people(&ctx).unwrap();
    let ops = ctx.template().stream();

    let items: Vec<_> = ops.find_by_id::<Person>("b-2").collect().await;
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].as_ref().unwrap().id, "b-2");

    let items: Vec<_> = ops.find_by_id::<Person>("missing").collect().await;
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].as_ref().unwrap_err().kind(), &ErrorKind::NotFound);

    let items: Vec<_> = ops.find_by_id::<Person>("").collect().await;
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].as_ref().unwrap_err().kind(), &ErrorKind::InvalidId);
}
