/// Benchmark for catalog mutation and lookup throughput
///
/// Measures durable CREATE throughput against the file edit log, name lookups
/// with and without a concurrent writer, and recovery time for the log that
/// the run produced.

use catalogmgr::{
    AllowAllPrivileges, CatalogConfig, CatalogProperties, CatalogStore, ConnectorRegistry,
    InMemoryConnector,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Instant;
use tempfile::tempdir;

fn open(config: &CatalogConfig) -> CatalogStore {
    let connectors = ConnectorRegistry::new().with("hive", Arc::new(InMemoryConnector::new()));
    let (store, report) = CatalogStore::open(config, connectors, Arc::new(AllowAllPrivileges))
        .expect("Failed to open catalog store");
    println!("  Recovery: {}", report);
    store
}

fn main() {
    println!("=== Catalog Throughput Benchmark ===\n");

    let temp_dir = tempdir().unwrap();
    let mut config = CatalogConfig::with_meta_dir(temp_dir.path().join("meta"));
    config.sync_on_append = false;
    let store = Arc::new(open(&config));

    // Benchmark: CREATE through the edit log
    println!("📊 Benchmark: create_catalog() - Sequential");
    let creates = 2_000;
    let create_start = Instant::now();
    for i in 0..creates {
        store
            .manager()
            .create_catalog(&format!("hive_{}", i), "hive", CatalogProperties::new(), false)
            .expect("create");
    }
    let create_duration = create_start.elapsed();
    let create_ops_per_sec = creates as f64 / create_duration.as_secs_f64();
    println!("  Catalogs: {}", creates);
    println!("  Time: {:?}", create_duration);
    println!("  Throughput: {:.0} creates/sec", create_ops_per_sec);
    println!();

    // Benchmark: name lookups, no writer
    println!("📊 Benchmark: get_catalog() - Idle Registry");
    let lookups = 200_000;
    let lookup_start = Instant::now();
    for i in 0..lookups {
        let _ = store.manager().get_catalog(&format!("hive_{}", i % creates));
    }
    let idle_ops_per_sec = lookups as f64 / lookup_start.elapsed().as_secs_f64();
    println!("  Throughput: {:.0} lookups/sec", idle_ops_per_sec);
    println!();

    // Benchmark: name lookups while a writer renames catalogs
    println!("📊 Benchmark: get_catalog() - Concurrent Writer");
    let done = Arc::new(AtomicBool::new(false));
    let writer = {
        let store = store.clone();
        let done = done.clone();
        thread::spawn(move || {
            let mut renames = 0usize;
            while !done.load(Ordering::SeqCst) {
                let (from, to) = if renames % 2 == 0 {
                    ("hive_0", "hive_0_renamed")
                } else {
                    ("hive_0_renamed", "hive_0")
                };
                store.manager().rename_catalog(from, to).expect("rename");
                renames += 1;
            }
            renames
        })
    };
    let busy_start = Instant::now();
    for i in 0..lookups {
        let _ = store.manager().get_catalog(&format!("hive_{}", i % creates));
    }
    let busy_ops_per_sec = lookups as f64 / busy_start.elapsed().as_secs_f64();
    done.store(true, Ordering::SeqCst);
    let renames = writer.join().unwrap();
    println!("  Throughput: {:.0} lookups/sec", busy_ops_per_sec);
    println!("  Renames applied meanwhile: {}", renames);
    println!();

    // Benchmark: recovery from the log written above
    println!("📊 Benchmark: Recovery");
    drop(store);
    let recovery_start = Instant::now();
    let recovered = open(&config);
    println!("  Time: {:?}", recovery_start.elapsed());
    println!("  Catalogs: {}", recovered.manager().list_catalogs().len());
    println!();

    println!("=== Summary ===");
    println!("  create_catalog(): {:.0} ops/sec", create_ops_per_sec);
    println!("  get_catalog() idle: {:.0} ops/sec", idle_ops_per_sec);
    println!("  get_catalog() with writer: {:.0} ops/sec", busy_ops_per_sec);
}
