//! Demo driver: wire a store, a factory, and a mediator together, spin the
//! load generator, and print a tier report. All simulation logic lives in
//! the library; this binary is bootstrap glue only.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tokio::sync::Mutex;

use tiersim::prelude::*;
use tiersim::store::MemoryNodeStore;

#[derive(Parser, Debug)]
#[command(name = "tiersim", about = "Layered-infrastructure load simulator")]
struct Args {
    /// Use the legacy percentage/capability tables
    #[arg(long)]
    legacy: bool,

    /// Persist topology to a JSON snapshot instead of memory
    #[arg(long)]
    store: Option<PathBuf>,

    /// Users added per generator tick
    #[arg(long, default_value_t = 5000)]
    step: u64,

    /// Stop once this many users are simulated
    #[arg(long, default_value_t = 200_000)]
    limit: u64,

    /// Milliseconds between generator ticks
    #[arg(long, default_value_t = 10)]
    interval_ms: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let config = if args.legacy {
        SimConfig::legacy()
    } else {
        SimConfig::new()
    }
    .with_generator(GeneratorConfig {
        step: args.step,
        limit: args.limit,
        interval: Duration::from_millis(args.interval_ms),
    });

    let store: Arc<dyn NodeStore> = match &args.store {
        Some(path) => Arc::new(
            FileNodeStore::open(path)
                .with_context(|| format!("opening store at {}", path.display()))?,
        ),
        None => Arc::new(MemoryNodeStore::new()),
    };
    let factory: Arc<dyn NodeFactory> = Arc::new(CatalogNodeFactory::for_lineage(config.lineage));

    let generator_config = config.generator.clone();
    let mut mediator = TopologyMediator::new(factory.clone(), store, config);

    // A small but valid topology when starting from an empty store.
    if mediator.gateway().read().unwrap().children().len() <= 1 {
        for node in [
            factory.create_cdn()?,
            factory.create_cdn()?,
            factory.create_load_balancer()?,
            factory.create_cache()?,
            factory.create_cache()?,
            factory.create_compute()?,
            factory.create_compute()?,
            factory.create_database()?,
        ] {
            mediator.add_server(node)?;
        }
    }

    println!("total cost: {}", mediator.total_cost());
    println!("topology ok: {}", mediator.is_ok());

    let mediator = Arc::new(Mutex::new(mediator));
    let handle = LoadGenerator::new(mediator.clone(), generator_config).start();
    handle.join().await;

    let mediator = mediator.lock().await;
    println!();
    println!(
        "{:<38} {:>13} {:>10} {:>8}  {}",
        "node", "type", "requests", "cost", "health"
    );
    for status in mediator.node_statuses() {
        println!(
            "{:<38} {:>13} {:>10} {:>8}  {}",
            status.id.to_string(),
            status.node_type.to_string(),
            status.requests,
            status.cost,
            status.health
        );
    }
    println!();
    println!("topology ok after load: {}", mediator.is_ok());

    Ok(())
}
