use crate::entity::{Airline, Person, Status, WithoutId};
use typedstore::common::{Convertible, Value};
use typedstore::doc;
use typedstore::entity::DocumentEntity;
use typedstore::errors::ErrorKind;

#[test]
fn test_entity_metadata() {
    let person = Person::default();
    assert_eq!(person.entity_name(), "person");
    assert_eq!(person.entity_id().unwrap().field_name(), "id");
    assert_eq!(person.entity_version(), Some("cas".to_string()));
    assert_eq!(
        person.entity_fields(),
        vec!["id", "name", "age", "address", "location", "cas"]
    );
}

#[test]
fn test_entity_name_defaults_to_struct_name() {
    let entity = WithoutId::default();
    assert_eq!(entity.entity_name(), "WithoutId");
    assert!(entity.entity_id().is_none());
    assert!(entity.entity_version().is_none());
}

#[test]
fn test_ignored_fields_are_not_persisted() {
    let airline = Airline {
        code: Some("NW".to_string()),
        name: "Northwind".to_string(),
        country: "Norway".to_string(),
        status: Status::Active,
        hubs: vec!["OSL".to_string()],
        rank: 7,
    };
    assert!(!airline.entity_fields().contains(&"rank".to_string()));

    let value = airline.to_value().unwrap();
    let doc = value.as_document().unwrap();
    assert!(!doc.contains_key("rank"));

    let back = Airline::from_value(&value).unwrap();
    assert_eq!(back.rank, 0);
    assert_eq!(back.hubs, vec!["OSL".to_string()]);
}

#[test]
fn test_missing_fields_fall_back_to_default() {
    let value = Value::Document(doc! { id: "p-1", name: "Ada" });
    let person = Person::from_value(&value).unwrap();
    assert_eq!(person.id, "p-1");
    assert_eq!(person.age, 0);
    assert_eq!(person.address.city, "");
    assert!(person.location.is_none());
}

#[test]
fn test_nested_struct_conversion() {
    let value = Value::Document(doc! {
        id: "p-2",
        name: "Linus",
        age: 54,
        address: { street: "Main", city: "Portland" },
        location: { x: 1.5, y: (-2.0) },
    });
    let person = Person::from_value(&value).unwrap();
    assert_eq!(person.address.city, "Portland");
    let location = person.location.unwrap();
    assert_eq!(location.x, 1.5);
    assert_eq!(location.y, -2.0);
}

#[test]
fn test_enum_variants_round_trip() {
    for status in [
        Status::Active,
        Status::Suspended {
            reason: "audit".to_string(),
        },
        Status::Merged("Northwind".to_string()),
    ] {
        let value = status.to_value().unwrap();
        assert_eq!(Status::from_value(&value).unwrap(), status);
    }
}

#[test]
fn test_unknown_enum_variant_is_mapping_error() {
    let value = Value::Document(doc! { variant: "Bankrupt", value: (Value::Null) });
    let err = Status::from_value(&value).unwrap_err();
    assert_eq!(err.kind(), &ErrorKind::ObjectMappingError);
}

#[test]
fn test_wrong_field_type_is_mapping_error() {
    let value = Value::Document(doc! { id: "p-3", age: "old" });
    let err = Person::from_value(&value).unwrap_err();
    assert_eq!(err.kind(), &ErrorKind::ObjectMappingError);

    let err = Person::from_value(&Value::from("not a document")).unwrap_err();
    assert_eq!(err.kind(), &ErrorKind::ObjectMappingError);
}
