use crate::entity::Person;
use crate::retrieval::seed_people;
use typedstore::errors::ErrorKind;
use typedstore::query::ScanConsistency;
use typedstore::store::Store;
use typedstore::template::DocumentTemplate;
use typedstore_int_test::test_util::{create_test_context, create_test_store, run_test};

#[test]
fn test_builder_requires_store() {
    let err = DocumentTemplate::builder().build().err().unwrap();
    assert_eq!(err.kind(), &ErrorKind::ConfigurationError);
}

#[test]
fn test_shared_store_across_templates() {
    run_test(
        || create_test_context(),
        |ctx| {
            seed_people(&ctx)?;
            let shared = Store::new(ctx.store());
            let first = DocumentTemplate::builder()
                .shared_store(shared.clone())
                .build()?;
            let second = DocumentTemplate::builder()
                .shared_store(shared)
                .descriptor_cache(false)
                .build()?;

            assert_eq!(first.find_by_id::<Person>("a-1")?.name, "Alice");
            assert_eq!(second.find_by_id::<Person>("a-1")?.name, "Alice");
            second.find_by_id::<Person>("b-2")?;

            assert_eq!(first.resolver().cached_count(), 1);
            assert!(!second.resolver().is_cache_enabled());
            assert_eq!(second.resolver().resolution_count(), 2);
            Ok(())
        },
    )
}

#[test]
fn test_configuration_is_frozen_after_build() {
    let template = DocumentTemplate::builder()
        .store(create_test_store())
        .default_consistency(ScanConsistency::StatementPlus)
        .build()
        .unwrap();

    let config = template.config();
    assert!(config.is_configured());
    assert_eq!(config.default_consistency(), ScanConsistency::StatementPlus);
    let err = config
        .set_default_consistency(ScanConsistency::NotBounded)
        .unwrap_err();
    assert_eq!(err.kind(), &ErrorKind::InvalidOperation);
}

#[test]
fn test_future_mode_needs_runtime() {
    let template = DocumentTemplate::new(create_test_store()).unwrap();
    let err = template.future().err().unwrap();
    assert_eq!(err.kind(), &ErrorKind::ConfigurationError);
}

#[test]
fn test_future_mode_on_configured_runtime() {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .enable_time()
        .build()
        .unwrap();
    let ctx = create_test_context().unwrap();
    seed_people(&ctx).unwrap();

    let template = DocumentTemplate::builder()
        .store(ctx.store())
        .runtime(runtime.handle().clone())
        .build()
        .unwrap();

    let pending = template.future().unwrap().find_by_id::<Person>("d-4");
    let person = runtime.block_on(pending).unwrap();
    assert_eq!(person.name, "Dave");
}
