/// Load-generator tests
///
/// The generator must drive the mediator to its configured ceiling, and
/// cancellation must stop ticks without corrupting an in-flight update.
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;

use tiersim::prelude::*;
use tiersim::store::MemoryNodeStore;

fn mediator_with_one_load_balancer() -> (Arc<Mutex<TopologyMediator>>, NodeHandle) {
    let factory = Arc::new(CatalogNodeFactory::default());
    let store = Arc::new(MemoryNodeStore::new());
    let config = SimConfig::new().with_requests_per_user(1);
    let mut mediator = TopologyMediator::new(factory.clone(), store, config);

    let lb = factory.create_load_balancer().unwrap();
    mediator.add_server(lb.clone()).unwrap();
    (Arc::new(Mutex::new(mediator)), lb)
}

#[tokio::test]
async fn generator_drives_load_up_to_the_limit() {
    let (mediator, lb) = mediator_with_one_load_balancer();

    let handle = LoadGenerator::new(
        mediator.clone(),
        GeneratorConfig {
            step: 1000,
            limit: 3000,
            interval: Duration::from_millis(1),
        },
    )
    .start();
    handle.join().await;

    // last tick observed the full user count; the whole stream rolled over
    // to the only load balancer
    assert_eq!(lb.read().unwrap().requests(), 3000);
}

#[tokio::test]
async fn generator_clamps_the_final_step_to_the_limit() {
    let (mediator, lb) = mediator_with_one_load_balancer();

    let handle = LoadGenerator::new(
        mediator.clone(),
        GeneratorConfig {
            step: 2000,
            limit: 3000,
            interval: Duration::from_millis(1),
        },
    )
    .start();
    handle.join().await;

    assert_eq!(lb.read().unwrap().requests(), 3000);
}

#[tokio::test]
async fn cancellation_stops_ticks_cleanly() {
    let (mediator, lb) = mediator_with_one_load_balancer();

    let handle = LoadGenerator::new(
        mediator.clone(),
        GeneratorConfig {
            step: 1000,
            limit: 1_000_000,
            interval: Duration::from_secs(3600),
        },
    )
    .start();

    // cancelled long before the first slow tick fires
    handle.cancel();
    handle.join().await;

    assert_eq!(lb.read().unwrap().requests(), 0);
    assert!(lb.read().unwrap().health().is_idle());
}

#[tokio::test]
async fn mutations_and_routing_serialize_through_the_mediator_lock() {
    let factory = Arc::new(CatalogNodeFactory::default());
    let store = Arc::new(MemoryNodeStore::new());
    let config = SimConfig::new().with_requests_per_user(1);
    let mediator = Arc::new(Mutex::new(TopologyMediator::new(
        factory.clone(),
        store,
        config,
    )));

    let lb = factory.create_load_balancer().unwrap();
    mediator.lock().await.add_server(lb.clone()).unwrap();

    let handle = LoadGenerator::new(
        mediator.clone(),
        GeneratorConfig {
            step: 500,
            limit: 25_000,
            interval: Duration::from_millis(1),
        },
    )
    .start();

    // mutate topology while the generator is running; the shared lock
    // means no update ever observes a half-applied add
    let cdn = factory.create_cdn().unwrap();
    mediator.lock().await.add_server(cdn.clone()).unwrap();
    handle.join().await;

    // the final update saw both nodes: 70% at the edge, the rest rolled
    // through the load balancer
    assert_eq!(cdn.read().unwrap().requests(), 17_500);
    assert_eq!(lb.read().unwrap().requests(), 7500);
}
