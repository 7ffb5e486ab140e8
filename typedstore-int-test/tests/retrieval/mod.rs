mod cancellation_test;
mod filter_query_test;
mod find_by_id_test;
mod projection_test;
mod spatial_query_test;
mod stream_test;
mod view_query_test;

use crate::entity::Person;
use typedstore::errors::TypedStoreResult;
use typedstore_int_test::test_util::{insert_entity, TestContext};

/// Stores four people: two in Oslo, two in Bergen, three of them with a location.
pub fn seed_people(ctx: &TestContext) -> TypedStoreResult<Vec<Person>> {
    let people = vec![
        Person::new("a-1", "Alice", 30, "Oslo").at(1.0, 1.0),
        Person::new("b-2", "Bob", 20, "Oslo").at(5.0, 5.0),
        Person::new("c-3", "Carol", 40, "Bergen"),
        Person::new("d-4", "Dave", 25, "Bergen").at(1.5, 0.5),
    ];
    for person in &people {
        insert_entity(ctx, &person.id, person)?;
    }
    Ok(people)
}

pub fn names(people: &[Person]) -> Vec<&str> {
    people.iter().map(|p| p.name.as_str()).collect()
}
