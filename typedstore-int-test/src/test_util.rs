use fake::faker::address::en::{CityName, StreetName};
use fake::faker::name::en::Name;
use fake::Fake;
use typedstore::common::{Convertible, Value};
use typedstore::errors::{ErrorKind, TypedStoreError, TypedStoreResult};
use typedstore::store::memory::{InMemoryStore, SpatialViewDefinition, ViewDefinition};
use typedstore::template::DocumentTemplate;
use std::backtrace::Backtrace;
use std::time::Instant;

/// Runs a test against a fresh context and reports failures with their backtrace.
pub fn run_test<T, B>(before: B, test: T)
where
    T: Fn(TestContext) -> TypedStoreResult<()> + std::panic::UnwindSafe + std::panic::RefUnwindSafe,
    B: Fn() -> TypedStoreResult<TestContext> + std::panic::UnwindSafe + std::panic::RefUnwindSafe,
{
    let start_time = Instant::now();
    let result = std::panic::catch_unwind(|| {
        let backtrace = Backtrace::capture();
        match before() {
            Ok(ctx) => test(ctx).map_err(|e| (format!("Test failed: {:?}", e), backtrace.to_string())),
            Err(e) => Err((format!("Before run failed: {:?}", e), backtrace.to_string())),
        }
    });

    let failure = match result {
        Ok(Ok(_)) => return,
        Ok(Err((e, bt))) => (e, bt),
        Err(panic_err) => {
            let err_msg = if let Some(s) = panic_err.downcast_ref::<&str>() {
                s.to_string()
            } else if let Some(s) = panic_err.downcast_ref::<String>() {
                s.clone()
            } else {
                "Unknown panic".to_string()
            };
            (format!("Panic: {}", err_msg), Backtrace::capture().to_string())
        }
    };

    eprintln!("\n==================== TEST FAILED ====================");
    eprintln!("Failed after {:?}", start_time.elapsed());
    eprintln!("Error: {}", failure.0);
    if !failure.1.is_empty() && !failure.1.contains("disabled") {
        eprintln!("\nBacktrace:\n{}", failure.1);
    }
    eprintln!("=====================================================\n");

    panic!("Test failed. Error: {}", failure.0);
}

/// A store with the people and airline views defined, and a template over it.
#[derive(Clone)]
pub struct TestContext {
    store: InMemoryStore,
    template: DocumentTemplate,
}

impl TestContext {
    pub fn new(store: InMemoryStore, template: DocumentTemplate) -> Self {
        Self { store, template }
    }

    pub fn store(&self) -> InMemoryStore {
        self.store.clone()
    }

    pub fn template(&self) -> DocumentTemplate {
        self.template.clone()
    }
}

pub fn create_test_context() -> TypedStoreResult<TestContext> {
    let store = create_test_store();
    let template = DocumentTemplate::new(store.clone())?;
    Ok(TestContext::new(store, template))
}

pub fn create_test_store() -> InMemoryStore {
    let store = InMemoryStore::new();
    store.define_view(ViewDefinition::new("person", "by_city", "address.city"));
    store.define_view(ViewDefinition::new("person", "by_age", "age"));
    store.define_spatial_view(SpatialViewDefinition::new(
        "person",
        "by_location",
        "location.x",
        "location.y",
    ));
    store.define_view(ViewDefinition::new("airline", "by_country", "country"));
    store
}

/// Stores `entity` under `id` without going through the template, so the store's call
/// counters stay untouched.
pub fn insert_entity<T: Convertible>(ctx: &TestContext, id: &str, entity: &T) -> TypedStoreResult<u64> {
    match entity.to_value()? {
        Value::Document(doc) => ctx.store().put_document(id, doc),
        other => Err(TypedStoreError::new(
            &format!("Cannot store a {} as a document", other.type_name()),
            ErrorKind::ObjectMappingError,
        )),
    }
}

pub fn random_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

pub fn random_name() -> String {
    Name().fake()
}

pub fn random_city() -> String {
    CityName().fake()
}

pub fn random_street() -> String {
    StreetName().fake()
}

pub fn random_age() -> u32 {
    (18..90).fake()
}
