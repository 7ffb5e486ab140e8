use crate::entity::Person;
use crate::retrieval::seed_people;
use futures_util::stream::FusedStream;
use futures_util::StreamExt;
use std::time::Duration;
use typedstore::doc;
use typedstore::errors::ErrorKind;
use typedstore::query::ViewQuery;
use typedstore_int_test::test_util::{create_test_context, insert_entity};

#[tokio::test]
async fn test_stream_yields_every_match_then_ends() {
    let ctx = create_test_context().unwrap();
    seed_people(&ctx).unwrap();
    insert_entity(&ctx, "f-6", &Person::new("f-6", "Frank", 50, "Oslo")).unwrap();

    let mut stream = ctx
        .template()
        .stream()
        .find_by_query::<Person>(&ViewQuery::new("person", "by_city").key("Oslo"));

    let mut ids = Vec::new();
    while let Some(person) = stream.next().await {
        ids.push(person.unwrap().id);
    }
    assert_eq!(ids, vec!["a-1", "b-2", "f-6"]);
    assert_eq!(stream.emitted(), 3);
    assert!(stream.is_terminated());
    assert!(stream.next().await.is_none());
}

#[tokio::test]
async fn test_stream_stops_at_malformed_record() {
    let ctx = create_test_context().unwrap();
    insert_entity(&ctx, "a-1", &Person::new("a-1", "Alice", 30, "Tromsø")).unwrap();
    ctx.store()
        .put_document("b-2", doc! { name: "Bob", age: "old", address: { city: "Tromsø" } })
        .unwrap();

    let mut stream = ctx
        .template()
        .stream()
        .find_by_query::<Person>(&ViewQuery::new("person", "by_city").key("Tromsø"));

    let first = stream.next().await.unwrap().unwrap();
    assert_eq!(first.id, "a-1");

    let err = stream.next().await.unwrap().unwrap_err();
    assert_eq!(err.kind(), &ErrorKind::ObjectMappingError);

    assert!(stream.next().await.is_none());
    assert_eq!(stream.emitted(), 1);
}

#[tokio::test]
async fn test_stream_stops_at_store_failure() {
    let ctx = create_test_context().unwrap();
    seed_people(&ctx).unwrap();
    ctx.store().fail_streams_after(Some(2));

    let items: Vec<_> = ctx
        .template()
        .stream()
        .find_by_query::<Person>(&ViewQuery::new("person", "by_age"))
        .collect()
        .await;

    assert_eq!(items.len(), 3);
    assert_eq!(items[0].as_ref().unwrap().name, "Bob");
    assert_eq!(items[1].as_ref().unwrap().name, "Dave");
    assert_eq!(
        items[2].as_ref().unwrap_err().kind(),
        &ErrorKind::StoreCommunicationError
    );
}

#[tokio::test]
async fn test_stream_of_empty_query() {
    let ctx = create_test_context().unwrap();
    seed_people(&ctx).unwrap();

    let items: Vec<_> = ctx
        .template()
        .stream()
        .find_by_query::<Person>(&ViewQuery::new("person", "by_city").key("Narvik"))
        .collect()
        .await;
    assert!(items.is_empty());
}

#[tokio::test]
async fn test_stream_with_store_latency() {
    let ctx = create_test_context().unwrap();
    seed_people(&ctx).unwrap();
    ctx.store().set_latency(Some(Duration::from_millis(5)));

    let names: Vec<String> = ctx
        .template()
        .stream()
        .find_by_query::<Person>(&ViewQuery::new("person", "by_age").descending(true))
        .map(|person| person.map(|p| p.name))
        .collect::<Vec<_>>()
        .await
        .into_iter()
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(names, vec!["Carol", "Alice", "Dave", "Bob"]);
}

#[tokio::test]
async fn test_dropping_stream_keeps_delivered_entities() {
    let ctx = create_test_context().unwrap();
    seed_people(&ctx).unwrap();

    let mut stream = ctx
        .template()
        .stream()
        .find_by_query::<Person>(&ViewQuery::new("person", "by_age"));
    let first = stream.next().await.unwrap().unwrap();
    drop(stream);

    assert_eq!(first.name, "Bob");
    assert_eq!(first.age, 20);
}
