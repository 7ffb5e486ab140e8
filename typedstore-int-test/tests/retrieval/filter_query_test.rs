use crate::entity::{Airline, Person, Status};
use crate::retrieval::{names, seed_people};
use futures_util::TryStreamExt;
use typedstore::doc;
use typedstore::errors::ErrorKind;
use typedstore::query::{field, FilterQuery};
use typedstore::store::StoreOperation;
use typedstore_int_test::test_util::{create_test_context, insert_entity, run_test};

#[test]
fn test_filter_returns_whole_entities() {
    run_test(
        || create_test_context(),
        |ctx| {
            let seeded = seed_people(&ctx)?;
            let query = FilterQuery::new(field("address.city").eq("Bergen"));
            let people = ctx.template().blocking().find_by_filter::<Person>(&query)?;

            assert_eq!(names(&people), vec!["Carol", "Dave"]);
            assert_eq!(people[0].age, 40);
            assert_eq!(people[1].location, seeded[3].location);
            assert_eq!(people[1].address, seeded[3].address);
            assert!(people.iter().all(|p| p.cas > 0));
            assert_eq!(ctx.store().stats().count(StoreOperation::FetchByFilter), 1);
            Ok(())
        },
    )
}

#[test]
fn test_filter_skip_limit_and_empty_result() {
    run_test(
        || create_test_context(),
        |ctx| {
            seed_people(&ctx)?;
            let ops = ctx.template().blocking();

            let query = FilterQuery::new(field("age").gte(25)).skip(1).limit(1);
            let people = ops.find_by_filter::<Person>(&query)?;
            assert_eq!(names(&people), vec!["Carol"]);

            let people = ops.find_by_filter::<Person>(&FilterQuery::new(field("age").gt(90)))?;
            assert!(people.is_empty());

            let people = ops.find_by_filter::<Person>(&FilterQuery::all())?;
            assert_eq!(people.len(), 4);
            Ok(())
        },
    )
}

#[test]
fn test_filter_on_id_field_uses_document_id() {
    run_test(
        || create_test_context(),
        |ctx| {
            seed_people(&ctx)?;
            ctx.store().put_document(
                "e-5",
                doc! { name: "Eve", age: 50, address: { city: "Oslo" } },
            )?;

            let ops = ctx.template().blocking();
            let people = ops.find_by_filter::<Person>(&FilterQuery::new(field("id").eq("e-5")))?;
            assert_eq!(names(&people), vec!["Eve"]);
            assert_eq!(people[0].id, "e-5");

            let query = FilterQuery::new(field("id").in_array(vec!["a-1", "e-5"]));
            let people = ops.find_by_filter::<Person>(&query)?;
            assert_eq!(names(&people), vec!["Alice", "Eve"]);

            let airline = Airline {
                code: Some("NW".to_string()),
                name: "Northwind".to_string(),
                country: "Norway".to_string(),
                status: Status::Active,
                hubs: vec!["OSL".to_string()],
                rank: 3,
            };
            insert_entity(&ctx, "NW", &airline)?;
            let airlines = ops.find_by_filter::<Airline>(&FilterQuery::new(field("code").eq("NW")))?;
            assert_eq!(airlines.len(), 1);
            assert_eq!(airlines[0].code.as_deref(), Some("NW"));
            assert_eq!(airlines[0].rank, 0);
            Ok(())
        },
    )
}

#[test]
fn test_filter_with_blank_id_field_is_invalid_query() {
    run_test(
        || create_test_context(),
        |ctx| {
            let err = ctx
                .template()
                .blocking()
                .find_by_filter::<Person>(&FilterQuery::all().id_field(""))
                .unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::InvalidQuery);
            assert_eq!(ctx.store().stats().total(), 0);
            Ok(())
        },
    )
}

#[tokio::test]
async fn test_filter_in_future_and_stream_modes() {
    let ctx = create_test_context().unwrap();
    seed_people(&ctx).unwrap();
    let template = ctx.template();
    let query = FilterQuery::new(field("address.city").eq("Oslo"));

    let people = template
        .future()
        .unwrap()
        .find_by_filter::<Person>(&query)
        .await
        .unwrap();
    assert_eq!(names(&people), vec!["Alice", "Bob"]);
    assert_eq!(people[1].age, 20);

    let people: Vec<Person> = template
        .stream()
        .find_by_filter::<Person>(&query)
        .try_collect()
        .await
        .unwrap();
    assert_eq!(names(&people), vec!["Alice", "Bob"]);
    assert!(people.iter().all(|p| p.address.city == "Oslo"));
    assert_eq!(ctx.store().stats().count(StoreOperation::FetchByFilter), 2);
}

#[tokio::test]
async fn test_filter_stream_stops_at_first_bad_record() {
    let ctx = create_test_context().unwrap();
    seed_people(&ctx).unwrap();
    ctx.store()
        .put_document("b-3", doc! { name: 7, address: { city: "Oslo" } })
        .unwrap();

    let query = FilterQuery::new(field("address.city").eq("Oslo"));
    let mut stream = ctx.template().stream().find_by_filter::<Person>(&query);
    let mut ok = Vec::new();
    let mut errors = Vec::new();
    while let Some(item) = futures_util::StreamExt::next(&mut stream).await {
        match item {
            Ok(person) => ok.push(person),
            Err(err) => errors.push(err),
        }
    }
    assert_eq!(names(&ok), vec!["Alice", "Bob"]);
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].kind(), &ErrorKind::ObjectMappingError);
}
