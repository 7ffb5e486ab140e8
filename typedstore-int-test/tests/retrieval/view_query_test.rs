use crate::entity::{Airline, Person, Status};
use crate::retrieval::{names, seed_people};
use typedstore::doc;
use typedstore::errors::ErrorKind;
use typedstore::query::{ScanConsistency, ViewQuery};
use typedstore::template::DocumentTemplate;
use typedstore_int_test::test_util::{create_test_context, insert_entity, run_test};

#[test]
fn test_find_by_key() {
    run_test(
        || create_test_context(),
        |ctx| {
            seed_people(&ctx)?;
            let people = ctx
                .template()
                .blocking()
                .find_by_query::<Person>(&ViewQuery::new("person", "by_city").key("Oslo"))?;
            assert_eq!(names(&people), vec!["Alice", "Bob"]);
            assert!(people.iter().all(|p| p.address.city == "Oslo"));
            Ok(())
        },
    )
}

#[test]
fn test_float_key_finds_integer_keyed_rows() {
    run_test(
        || create_test_context(),
        |ctx| {
            seed_people(&ctx)?;
            let ops = ctx.template().blocking();

            let exact = ops.find_by_query::<Person>(&ViewQuery::new("person", "by_age").key(30.0))?;
            let point = ops.find_by_query::<Person>(
                &ViewQuery::new("person", "by_age").start_key(30.0).end_key(30.0),
            )?;
            assert_eq!(names(&exact), vec!["Alice"]);
            assert_eq!(names(&exact), names(&point));

            let keys = ops.find_by_query::<Person>(
                &ViewQuery::new("person", "by_age").keys(vec![20.0, 40.0, 41.5]),
            )?;
            assert_eq!(names(&keys), vec!["Bob", "Carol"]);
            Ok(())
        },
    )
}

#[test]
fn test_find_by_keys_range_and_order() {
    run_test(
        || create_test_context(),
        |ctx| {
            seed_people(&ctx)?;
            let ops = ctx.template().blocking();

            let people = ops.find_by_query::<Person>(&ViewQuery::new("person", "by_age"))?;
            assert_eq!(names(&people), vec!["Bob", "Dave", "Alice", "Carol"]);

            let people = ops.find_by_query::<Person>(
                &ViewQuery::new("person", "by_age").keys(vec![40, 20]),
            )?;
            assert_eq!(names(&people), vec!["Bob", "Carol"]);

            let people = ops.find_by_query::<Person>(
                &ViewQuery::new("person", "by_age")
                    .range(25, 40)
                    .inclusive_end(false),
            )?;
            assert_eq!(names(&people), vec!["Dave", "Alice"]);

            let people = ops.find_by_query::<Person>(
                &ViewQuery::new("person", "by_age")
                    .descending(true)
                    .skip(1)
                    .limit(2),
            )?;
            assert_eq!(names(&people), vec!["Alice", "Dave"]);
            Ok(())
        },
    )
}

#[test]
fn test_empty_result_is_not_an_error() {
    run_test(
        || create_test_context(),
        |ctx| {
            seed_people(&ctx)?;
            let people = ctx
                .template()
                .blocking()
                .find_by_query::<Person>(&ViewQuery::new("person", "by_city").key("Tromsø"))?;
            assert!(people.is_empty());
            Ok(())
        },
    )
}

#[test]
fn test_invalid_query_is_rejected_before_store_call() {
    run_test(
        || create_test_context(),
        |ctx| {
            let ops = ctx.template().blocking();

            let err = ops
                .find_by_query::<Person>(&ViewQuery::new("", "by_city"))
                .unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::InvalidQuery);

            let err = ops
                .find_by_query::<Person>(&ViewQuery::new("person", "by_age").range(40, 20))
                .unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::InvalidQuery);

            assert_eq!(ctx.store().stats().total(), 0);
            Ok(())
        },
    )
}

#[test]
fn test_undefined_view_is_store_error() {
    run_test(
        || create_test_context(),
        |ctx| {
            let err = ctx
                .template()
                .blocking()
                .find_by_query::<Person>(&ViewQuery::new("person", "by_shoe_size"))
                .unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::StoreCommunicationError);
            Ok(())
        },
    )
}

#[test]
fn test_malformed_record_fails_whole_query() {
    run_test(
        || create_test_context(),
        |ctx| {
            seed_people(&ctx)?;
            ctx.store().put_document(
                "e-5",
                doc! { name: "Eve", age: 33, address: { city: "Oslo", street: 12 } },
            )?;
            let err = ctx
                .template()
                .blocking()
                .find_by_query::<Person>(&ViewQuery::new("person", "by_city").key("Oslo"))
                .unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::ObjectMappingError);
            Ok(())
        },
    )
}

#[test]
fn test_scan_consistency() {
    run_test(
        || create_test_context(),
        |ctx| {
            seed_people(&ctx)?;
            let ops = ctx.template().blocking();
            let query = ViewQuery::new("person", "by_city").key("Oslo");
            assert_eq!(ops.find_by_query::<Person>(&query)?.len(), 2);

            insert_entity(&ctx, "f-6", &Person::new("f-6", "Frank", 50, "Oslo"))?;

            let stale = ops.find_by_query::<Person>(
                &query.clone().consistency(ScanConsistency::NotBounded),
            )?;
            assert_eq!(stale.len(), 2);

            let fresh = ops.find_by_query::<Person>(&query)?;
            assert_eq!(fresh.len(), 3);
            Ok(())
        },
    )
}

#[test]
fn test_template_default_consistency() {
    run_test(
        || create_test_context(),
        |ctx| {
            seed_people(&ctx)?;
            let template = DocumentTemplate::builder()
                .store(ctx.store())
                .default_consistency(ScanConsistency::NotBounded)
                .build()?;
            let query = ViewQuery::new("person", "by_age");
            assert_eq!(template.blocking().find_by_query::<Person>(&query)?.len(), 4);

            insert_entity(&ctx, "f-6", &Person::new("f-6", "Frank", 50, "Oslo"))?;
            assert_eq!(template.blocking().find_by_query::<Person>(&query)?.len(), 4);

            let explicit = query.consistency(ScanConsistency::RequestPlus);
            assert_eq!(template.blocking().find_by_query::<Person>(&explicit)?.len(), 5);
            Ok(())
        },
    )
}

#[test]
fn test_removed_document_is_skipped() {
    run_test(
        || create_test_context(),
        |ctx| {
            seed_people(&ctx)?;
            let ops = ctx.template().blocking();
            let query = ViewQuery::new("person", "by_city")
                .key("Bergen")
                .consistency(ScanConsistency::NotBounded);
            assert_eq!(ops.find_by_query::<Person>(&query)?.len(), 2);

            assert!(ctx.template().remove_by_id("c-3")?);
            let people = ops.find_by_query::<Person>(&query)?;
            assert_eq!(names(&people), vec!["Dave"]);
            Ok(())
        },
    )
}

#[test]
fn test_enum_fields_through_view() {
    run_test(
        || create_test_context(),
        |ctx| {
            let template = ctx.template();
            template.save(&Airline {
                code: Some("NW".to_string()),
                name: "Northwind".to_string(),
                country: "Norway".to_string(),
                status: Status::Active,
                hubs: vec!["OSL".to_string(), "BGO".to_string()],
                rank: 1,
            })?;
            template.save(&Airline {
                code: Some("FJ".to_string()),
                name: "Fjord Air".to_string(),
                country: "Norway".to_string(),
                status: Status::Suspended {
                    reason: "safety audit".to_string(),
                },
                hubs: vec![],
                rank: 2,
            })?;

            let airlines = template
                .blocking()
                .find_by_query::<Airline>(&ViewQuery::new("airline", "by_country").key("Norway"))?;
            assert_eq!(airlines.len(), 2);
            assert_eq!(airlines[0].code.as_deref(), Some("FJ"));
            assert_eq!(
                airlines[0].status,
                Status::Suspended {
                    reason: "safety audit".to_string()
                }
            );
            assert_eq!(airlines[1].hubs, vec!["OSL".to_string(), "BGO".to_string()]);
            assert!(airlines.iter().all(|a| a.rank == 0));
            Ok(())
        },
    )
}
