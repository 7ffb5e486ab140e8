use crate::entity::Person;
use crate::retrieval::{names, seed_people};
use futures_util::TryStreamExt;
use typedstore::errors::ErrorKind;
use typedstore::query::{and, field, ProjectionQuery};
use typedstore_int_test::test_util::{create_test_context, run_test};

#[test]
fn test_projection_keeps_defaults_outside_projection() {
    run_test(
        || create_test_context(),
        |ctx| {
            seed_people(&ctx)?;
            let query = ProjectionQuery::new(vec!["name", "address.city"]);
            let people = ctx
                .template()
                .blocking()
                .find_by_query_projection::<Person>(&query)?;

            assert_eq!(names(&people), vec!["Alice", "Bob", "Carol", "Dave"]);
            for person in &people {
                assert!(!person.id.is_empty());
                assert_eq!(person.age, 0);
                assert!(person.location.is_none());
                assert!(person.address.street.is_empty());
                assert!(!person.address.city.is_empty());
            }
            assert_eq!(people[0].id, "a-1");
            Ok(())
        },
    )
}

#[test]
fn test_projection_with_filter() {
    run_test(
        || create_test_context(),
        |ctx| {
            seed_people(&ctx)?;
            let query = ProjectionQuery::new(vec!["name", "age"]).filter(and(vec![
                field("address.city").eq("Bergen"),
                field("age").gt(30),
            ]));
            let people = ctx
                .template()
                .blocking()
                .find_by_query_projection::<Person>(&query)?;
            assert_eq!(names(&people), vec!["Carol"]);
            assert_eq!(people[0].age, 40);

            let query = ProjectionQuery::new(vec!["name"])
                .filter(field("age").lt(30).or(field("name").eq("Carol")))
                .skip(1)
                .limit(2);
            let people = ctx
                .template()
                .blocking()
                .find_by_query_projection::<Person>(&query)?;
            assert_eq!(names(&people), vec!["Carol", "Dave"]);
            Ok(())
        },
    )
}

#[test]
fn test_projection_without_fields_is_invalid_query() {
    run_test(
        || create_test_context(),
        |ctx| {
            let err = ctx
                .template()
                .blocking()
                .find_by_query_projection::<Person>(&ProjectionQuery::new(vec![]))
                .unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::InvalidQuery);
            assert_eq!(ctx.store().stats().total(), 0);
            Ok(())
        },
    )
}

#[tokio::test]
async fn test_projection_in_future_and_stream_modes() {
    let ctx = create_test_context().unwrap();
    seed_people(&ctx).unwrap();
    let template = ctx.template();
    let query = ProjectionQuery::new(vec!["name"]).filter(field("address.city").eq("Oslo"));

    let people = template
        .future()
        .unwrap()
        .find_by_query_projection::<Person>(&query)
        .await
        .unwrap();
    assert_eq!(names(&people), vec!["Alice", "Bob"]);

    let people: Vec<Person> = template
        .stream()
        .find_by_query_projection::<Person>(&query)
        .try_collect()
        .await
        .unwrap();
    assert_eq!(names(&people), vec!["Alice", "Bob"]);
    assert!(people.iter().all(|p| p.address.city.is_empty()));
}
