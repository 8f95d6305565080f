use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Once};
use std::thread;

use wiring::prelude::*;

fn init_tracing() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

// === Fixtures ===

trait User: Send + Sync {
    fn id(&self) -> u32;
    fn name(&self) -> Option<&str>;
}

#[derive(Injectable)]
#[injectable(provides = "dyn User")]
struct MockUser {
    #[inject(default)]
    id: u32,
    #[inject(default)]
    name: Option<String>,
}

impl User for MockUser {
    fn id(&self) -> u32 {
        self.id
    }
    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

#[derive(Injectable)]
struct Engine;

#[derive(Injectable)]
struct Car {
    engine: Arc<Engine>,
}

trait Wheels: Send + Sync {
    fn count(&self) -> usize;
}

#[derive(Injectable)]
#[injectable(provides = "dyn Wheels")]
struct FourWheels;

impl Wheels for FourWheels {
    fn count(&self) -> usize {
        4
    }
}

struct Truck {
    engine: Option<Arc<Engine>>,
    wheels: Option<Arc<dyn Wheels>>,
    built_with: &'static str,
}

impl Injectable for Truck {
    fn constructors() -> Vec<Constructor<Self>> {
        vec![
            Constructor::new("bare", vec![], |_| {
                Ok(Truck {
                    engine: None,
                    wheels: None,
                    built_with: "bare",
                })
            }),
            Constructor::new(
                "full",
                vec![TypeKey::of::<Engine>(), TypeKey::of::<dyn Wheels>()],
                |args| {
                    Ok(Truck {
                        engine: args.optional()?,
                        wheels: args.optional()?,
                        built_with: "full",
                    })
                },
            ),
        ]
    }
}

#[derive(Injectable)]
#[injectable(constructor = "with_optional")]
struct Dashboard {
    wheels: Option<Arc<dyn Wheels>>,
}

// === Core properties ===

#[test]
fn duplicate_key_keeps_first_entry() {
    init_tracing();
    let container = Container::new();
    container.register_transient::<dyn User, MockUser>("User").unwrap();

    let err = container.register_singleton::<Engine, Engine>("User").unwrap_err();
    match err {
        WiringError::DuplicateRegistration(dup) => {
            assert_eq!(dup.key, "User");
            assert_eq!(dup.existing, TypeKey::of::<dyn User>());
            assert_eq!(dup.attempted, TypeKey::of::<Engine>());
        }
        other => panic!("unexpected error: {other}"),
    }

    assert_eq!(container.len(), 1);
    let info = container.registration("User").unwrap();
    assert_eq!(info.concrete, TypeKey::of::<MockUser>());
    assert_eq!(info.lifecycle, Lifecycle::Transient);
}

#[test]
fn transient_user_end_to_end() {
    init_tracing();
    let container = Container::new();
    container.register_transient::<dyn User, MockUser>("User").unwrap();

    let first = container.get::<dyn User>().unwrap().unwrap();
    let second = container.get::<dyn User>().unwrap().unwrap();

    assert!(!Arc::ptr_eq(&first, &second));
    for user in [&first, &second] {
        assert_eq!(user.id(), 0);
        assert_eq!(user.name(), None);
    }

    let by_key = container.resolve_by_key("User").unwrap().unwrap();
    assert_eq!(by_key.contract(), TypeKey::of::<dyn User>());
    assert_eq!(by_key.concrete(), TypeKey::of::<MockUser>());
    assert!(by_key.downcast::<dyn User>().is_some());
}

#[test]
fn singleton_identity() {
    init_tracing();
    let container = Container::new();
    container.register_self_singleton::<Engine>().unwrap();

    let a = container.get::<Engine>().unwrap().unwrap();
    let b = container.get_by_key::<Engine>("Engine").unwrap().unwrap();
    assert!(Arc::ptr_eq(&a, &b));
}

#[test]
fn not_found_is_none() {
    init_tracing();
    let container = Container::new();
    assert!(container.get::<Engine>().unwrap().is_none());
    assert!(container.resolve_by_type(&TypeKey::of::<dyn User>()).unwrap().is_none());
    assert!(container.resolve_by_key("nobody").unwrap().is_none());
    assert!(container.get_by_key::<Engine>("nobody").unwrap().is_none());
}

#[test]
fn constructor_injection_shares_singleton() {
    init_tracing();
    let container = Container::builder()
        .singleton_self::<Engine>()
        .transient_self::<Car>()
        .build()
        .unwrap();

    let car = container.get::<Car>().unwrap().unwrap();
    let engine = container.get::<Engine>().unwrap().unwrap();
    assert!(Arc::ptr_eq(&car.engine, &engine));
}

#[test]
fn constructor_injection_with_transient_dependency() {
    init_tracing();
    let container = Container::builder()
        .transient_self::<Engine>()
        .transient_self::<Car>()
        .build()
        .unwrap();

    let car = container.get::<Car>().unwrap().unwrap();
    let engine = container.get::<Engine>().unwrap().unwrap();
    assert!(!Arc::ptr_eq(&car.engine, &engine));
}

#[test]
fn widest_constructor_is_used() {
    init_tracing();
    let container = Container::builder()
        .singleton_self::<Engine>()
        .singleton::<dyn Wheels, FourWheels>("wheels")
        .transient_self::<Truck>()
        .build()
        .unwrap();

    let truck = container.get::<Truck>().unwrap().unwrap();
    assert_eq!(truck.built_with, "full");
    assert!(truck.engine.is_some());
    assert_eq!(truck.wheels.as_ref().map(|w| w.count()), Some(4));
}

#[test]
fn prebuilt_instance_is_shared_as_is() {
    init_tracing();
    let wheels: Arc<dyn Wheels> = Arc::new(FourWheels);
    let container = Container::new();
    container.register_instance("wheels", Arc::clone(&wheels)).unwrap();

    let resolved = container.get::<dyn Wheels>().unwrap().unwrap();
    assert!(Arc::ptr_eq(&resolved, &wheels));

    let info = container.registration("wheels").unwrap();
    assert_eq!(info.lifecycle, Lifecycle::Singleton);
    assert!(info.instantiated);
}

#[test]
fn instantiated_only_flips_for_singletons() {
    init_tracing();
    let container = Container::builder()
        .singleton_self::<Engine>()
        .transient::<dyn Wheels, FourWheels>("wheels")
        .build()
        .unwrap();

    assert!(!container.registration("Engine").unwrap().instantiated);
    container.get::<Engine>().unwrap();
    container.get::<dyn Wheels>().unwrap();

    assert!(container.registration("Engine").unwrap().instantiated);
    assert!(!container.registration("wheels").unwrap().instantiated);
}

// === Policies ===

#[test]
fn unresolved_dependency_fails_by_default() {
    init_tracing();
    let container = Container::new();
    container.register_self_transient::<Car>().unwrap();

    match container.get::<Car>() {
        Err(WiringError::UnresolvedDependency(err)) => {
            assert_eq!(err.requested, TypeKey::of::<Engine>());
            assert_eq!(err.required_by, TypeKey::of::<Car>());
        }
        other => panic!("unexpected result: {:?}", other.map(|_| ())),
    }
}

#[test]
fn unresolved_optional_dependency_is_empty_when_configured() {
    init_tracing();
    let container = Container::builder()
        .missing_dependency(MissingDependencyPolicy::Empty)
        .transient_self::<Dashboard>()
        .build()
        .unwrap();

    let dashboard = container.get::<Dashboard>().unwrap().unwrap();
    assert!(dashboard.wheels.is_none());
}

#[test]
fn ambiguity_policies() {
    init_tracing();
    let build = |policy| {
        Container::builder()
            .ambiguity(policy)
            .transient::<dyn Wheels, FourWheels>("front")
            .instance::<dyn Wheels>("spare", Arc::new(FourWheels))
            .build()
            .unwrap()
    };

    let strict = build(AmbiguityPolicy::Error);
    match strict.get::<dyn Wheels>() {
        Err(WiringError::AmbiguousLookup(err)) => assert_eq!(err.keys, ["front", "spare"]),
        other => panic!("unexpected result: {:?}", other.map(|_| ())),
    }

    let last = build(AmbiguityPolicy::LastRegistered);
    let spare = last.get_by_key::<dyn Wheels>("spare").unwrap().unwrap();
    let picked = last.get::<dyn Wheels>().unwrap().unwrap();
    assert!(Arc::ptr_eq(&spare, &picked));

    let first = build(AmbiguityPolicy::FirstRegistered);
    let picked = first.get::<dyn Wheels>().unwrap().unwrap();
    let spare = first.get_by_key::<dyn Wheels>("spare").unwrap().unwrap();
    assert!(!Arc::ptr_eq(&spare, &picked));
}

#[test]
fn settings_from_json() {
    init_tracing();
    let settings: ContainerSettings = serde_json::from_str(
        r#"{ "ambiguity": "first_registered", "missing_dependency": "empty" }"#,
    )
    .unwrap();

    let container = Container::builder().settings(settings).build().unwrap();
    assert_eq!(container.settings().ambiguity, AmbiguityPolicy::FirstRegistered);
    assert_eq!(container.settings().missing_dependency, MissingDependencyPolicy::Empty);
}

// === Modules and concurrency ===

struct Garage;

impl Module for Garage {
    fn register(&self, registrar: &mut dyn Registrar) -> Result<()> {
        registrar.singleton_self::<Engine>()?;
        registrar.transient_self::<Car>()?;
        Ok(())
    }
}

#[test]
fn module_installed_after_build() {
    init_tracing();
    let container = Container::builder()
        .singleton::<dyn Wheels, FourWheels>("wheels")
        .build()
        .unwrap();
    container.install(&Garage).unwrap();

    assert!(container.get::<Car>().unwrap().is_some());
    assert!(matches!(
        container.install(&Garage),
        Err(WiringError::DuplicateRegistration(_))
    ));
}

static BUILT: AtomicUsize = AtomicUsize::new(0);

struct Counted;

impl Injectable for Counted {
    fn constructors() -> Vec<Constructor<Self>> {
        vec![Constructor::new("new", vec![], |_| {
            BUILT.fetch_add(1, Ordering::SeqCst);
            thread::sleep(std::time::Duration::from_millis(10));
            Ok(Counted)
        })]
    }
}

#[test]
fn shared_container_builds_singleton_once() {
    init_tracing();
    let container = Arc::new(Container::new());
    container.register_self_singleton::<Counted>().unwrap();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let container = Arc::clone(&container);
            thread::spawn(move || container.get::<Counted>().unwrap().unwrap())
        })
        .collect();
    let instances: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    assert_eq!(BUILT.load(Ordering::SeqCst), 1);
    assert!(instances.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
}
