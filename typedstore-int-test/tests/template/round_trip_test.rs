use crate::entity::{generate_person, Airline, Person, Status};
use futures_util::StreamExt;
use typedstore::errors::ErrorKind;
use typedstore::store::StoreOperation;
use typedstore_int_test::test_util::{create_test_context, run_test};

#[tokio::test]
async fn test_round_trip_in_every_mode() {
    let ctx = create_test_context().unwrap();
    let template = ctx.template();
    let mut person = generate_person();
    person.id = "doc-1".to_string();
    template.save(&person).unwrap();

    let blocking = template.blocking().find_by_id::<Person>("doc-1").unwrap();
    assert_eq!(blocking.id, "doc-1");

    let deferred = template
        .future()
        .unwrap()
        .find_by_id::<Person>("doc-1")
        .await
        .unwrap();
    assert_eq!(deferred.id, "doc-1");

    let streamed: Vec<_> = template.stream().find_by_id::<Person>("doc-1").collect().await;
    assert_eq!(streamed.len(), 1);
    let streamed = streamed.into_iter().next().unwrap().unwrap();
    assert_eq!(streamed.id, "doc-1");

    assert_eq!(blocking, deferred);
    assert_eq!(deferred, streamed);
    assert_eq!(blocking.name, person.name);
}

#[test]
fn test_save_returns_stored_version() {
    run_test(
        || create_test_context(),
        |ctx| {
            let template = ctx.template();
            let person = generate_person();

            let first = template.save(&person)?;
            assert!(first.cas > 0);
            assert_eq!(person.cas, 0);

            let mut changed = first.clone();
            changed.age += 1;
            let second = template.save(&changed)?;
            assert!(second.cas > first.cas);

            let found = template.find_by_id::<Person>(&person.id)?;
            assert_eq!(found.cas, second.cas);
            assert_eq!(found.age, person.age + 1);
            assert_eq!(ctx.store().stats().count(StoreOperation::Upsert), 2);
            Ok(())
        },
    )
}

#[test]
fn test_save_without_id_is_invalid_id() {
    run_test(
        || create_test_context(),
        |ctx| {
            let template = ctx.template();
            let err = template.save(&Person::default()).unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::InvalidId);

            let err = template.save(&Airline::default()).unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::InvalidId);

            assert_eq!(ctx.store().stats().total(), 0);
            Ok(())
        },
    )
}

#[test]
fn test_exists_and_remove() {
    run_test(
        || create_test_context(),
        |ctx| {
            let template = ctx.template();
            let airline = Airline {
                code: Some("NW".to_string()),
                name: "Northwind".to_string(),
                country: "Norway".to_string(),
                status: Status::Merged("Fjord Air".to_string()),
                hubs: vec![],
                rank: 0,
            };
            template.save(&airline)?;
            assert!(template.exists("NW")?);

            let found = template.find_by_id::<Airline>("NW")?;
            assert_eq!(found, airline);

            assert!(template.remove_by_id("NW")?);
            assert!(!template.remove_by_id("NW")?);
            assert!(!template.exists("NW")?);

            let err = template.find_by_id::<Airline>("NW").unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::NotFound);
            Ok(())
        },
    )
}

#[test]
fn test_store_failure_on_save_is_propagated() {
    run_test(
        || create_test_context(),
        |ctx| {
            ctx.store().set_unavailable(true);
            let err = ctx.template().save(&generate_person()).unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::StoreCommunicationError);
            assert!(ctx.store().is_empty());
            Ok(())
        },
    )
}
