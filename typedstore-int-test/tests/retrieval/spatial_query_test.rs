use crate::entity::Person;
use crate::retrieval::{names, seed_people};
use futures_util::TryStreamExt;
use typedstore::errors::ErrorKind;
use typedstore::query::{BoundingBox, SpatialQuery};
use typedstore_int_test::test_util::{create_test_context, run_test};

fn near_origin() -> SpatialQuery {
    SpatialQuery::new("person", "by_location").within(BoundingBox::new(0.0, 0.0, 2.0, 2.0))
}

#[test]
fn test_find_within_bounding_box() {
    run_test(
        || create_test_context(),
        |ctx| {
            seed_people(&ctx)?;
            let people = ctx
                .template()
                .blocking()
                .find_by_spatial_query::<Person>(&near_origin())?;
            assert_eq!(names(&people), vec!["Alice", "Dave"]);
            for person in &people {
                let location = person.location.as_ref().unwrap();
                assert!(location.x <= 2.0 && location.y <= 2.0);
            }
            Ok(())
        },
    )
}

#[test]
fn test_documents_without_location_are_not_indexed() {
    run_test(
        || create_test_context(),
        |ctx| {
            seed_people(&ctx)?;
            let everything = SpatialQuery::new("person", "by_location")
                .within(BoundingBox::new(-1000.0, -1000.0, 1000.0, 1000.0));
            let people = ctx
                .template()
                .blocking()
                .find_by_spatial_query::<Person>(&everything)?;
            assert_eq!(people.len(), 3);
            assert!(!names(&people).contains(&"Carol"));
            Ok(())
        },
    )
}

#[test]
fn test_skip_and_limit() {
    run_test(
        || create_test_context(),
        |ctx| {
            seed_people(&ctx)?;
            let people = ctx
                .template()
                .blocking()
                .find_by_spatial_query::<Person>(&near_origin().skip(1).limit(5))?;
            assert_eq!(names(&people), vec!["Dave"]);

            let empty = ctx.template().blocking().find_by_spatial_query::<Person>(
                &SpatialQuery::new("person", "by_location")
                    .within(BoundingBox::new(100.0, 100.0, 200.0, 200.0)),
            )?;
            assert!(empty.is_empty());
            Ok(())
        },
    )
}

#[test]
fn test_inverted_bounding_box_is_invalid_query() {
    run_test(
        || create_test_context(),
        |ctx| {
            let err = ctx
                .template()
                .blocking()
                .find_by_spatial_query::<Person>(
                    &SpatialQuery::new("person", "by_location")
                        .within(BoundingBox::new(5.0, 5.0, 1.0, 1.0)),
                )
                .unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::InvalidQuery);
            assert_eq!(ctx.store().stats().total(), 0);
            Ok(())
        },
    )
}

#[tokio::test]
async fn test_spatial_query_in_future_and_stream_modes() {
    let ctx = create_test_context().unwrap();
    seed_people(&ctx).unwrap();
    let template = ctx.template();

    let people = template
        .future()
        .unwrap()
        .find_by_spatial_query::<Person>(&near_origin())
        .await
        .unwrap();
    assert_eq!(names(&people), vec!["Alice", "Dave"]);

    let people: Vec<Person> = template
        .stream()
        .find_by_spatial_query::<Person>(&near_origin())
        .try_collect()
        .await
        .unwrap();
    assert_eq!(names(&people), vec!["Alice", "Dave"]);
}
