//! Stash - An embeddable in-memory key/value cache engine
//!
//! Interactive exploration shell over a shared cache instance. Reads
//! line-oriented commands from stdin and prints results to stdout.

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use stash_cache::{CacheConfig, SharedCache};

/// Main entry point for the Stash exploration shell.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Create the shared cache (spawning the sweep task if configured)
/// 4. Run the command loop until EOF, `quit`, or Ctrl+C
/// 5. Dispose the cache on the way out
#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber with env filter
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "stash_cache=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Stash shell");

    // Load configuration from environment variables
    let config = CacheConfig::from_env();
    info!(
        "Configuration loaded: max_count={:?}, max_memory_bytes={:?}, default_ttl_ms={:?}, cleanup_interval_ms={}",
        config.max_count, config.max_memory_bytes, config.default_ttl_ms, config.cleanup_interval_ms
    );

    let mut cache: SharedCache<String> = SharedCache::new(config)?;
    info!("Cache initialized");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    println!("stash ready. Type 'help' for commands.");

    loop {
        tokio::select! {
            line = lines.next_line() => {
                match line? {
                    Some(line) => {
                        if !dispatch(&cache, line.trim()).await {
                            break;
                        }
                    }
                    None => break, // stdin closed
                }
            }
            _ = signal::ctrl_c() => {
                warn!("Received Ctrl+C, shutting down");
                break;
            }
        }
    }

    cache.dispose().await;
    info!("Shutdown complete");
    Ok(())
}

/// Executes one command line. Returns false when the shell should exit.
async fn dispatch(cache: &SharedCache<String>, line: &str) -> bool {
    let mut parts = line.splitn(3, char::is_whitespace);
    let command = parts.next().unwrap_or("");

    match command {
        "" => {}
        "set" => match (parts.next(), parts.next()) {
            (Some(key), Some(value)) => {
                cache.set(key, value.to_string()).await;
                println!("OK");
            }
            _ => println!("usage: set <key> <value>"),
        },
        "setex" => match (parts.next(), parts.next()) {
            (Some(key), Some(rest)) => {
                let mut rest = rest.splitn(2, char::is_whitespace);
                match (rest.next().and_then(|t| t.parse::<u64>().ok()), rest.next()) {
                    (Some(ttl_ms), Some(value)) => {
                        cache.set_with_ttl(key, value.to_string(), ttl_ms).await;
                        println!("OK");
                    }
                    _ => println!("usage: setex <key> <ttl_ms> <value>"),
                }
            }
            _ => println!("usage: setex <key> <ttl_ms> <value>"),
        },
        "get" => match parts.next() {
            Some(key) => match cache.get(key).await {
                Some(value) => println!("{value}"),
                None => println!("(nil)"),
            },
            None => println!("usage: get <key>"),
        },
        "peek" => match parts.next() {
            Some(key) => match cache.peek(key).await {
                Some(value) => println!("{value}"),
                None => println!("(nil)"),
            },
            None => println!("usage: peek <key>"),
        },
        "del" => match parts.next() {
            Some(key) => println!("{}", u8::from(cache.remove(key).await)),
            None => println!("usage: del <key>"),
        },
        "has" => match parts.next() {
            Some(key) => println!("{}", cache.has(key).await),
            None => println!("usage: has <key>"),
        },
        "ttl" => match parts.next() {
            Some(key) => match cache.ttl_remaining(key).await {
                Some(Some(ms)) => println!("{ms}"),
                Some(None) => println!("(no expiry)"),
                None => println!("(nil)"),
            },
            None => println!("usage: ttl <key>"),
        },
        "keys" => {
            for key in cache.keys().await {
                println!("{key}");
            }
        }
        "len" => println!("{}", cache.len().await),
        "stats" => {
            let stats = cache.stats().await;
            println!(
                "hits={} misses={} evictions={} expirations={} hit_rate={:.3}",
                stats.hits,
                stats.misses,
                stats.evictions,
                stats.expirations,
                stats.hit_rate()
            );
        }
        "clear" => {
            cache.clear().await;
            println!("OK");
        }
        "sweep" => println!("{}", cache.prune_expired().await),
        "help" => {
            println!("commands:");
            println!("  set <key> <value>            store a value");
            println!("  setex <key> <ttl_ms> <value> store a value with a TTL");
            println!("  get <key>                    fetch a value (counts as a lookup)");
            println!("  peek <key>                   fetch without touching recency or stats");
            println!("  del <key>                    remove a key");
            println!("  has <key>                    check for a live key");
            println!("  ttl <key>                    remaining TTL in ms");
            println!("  keys                         list keys, oldest first");
            println!("  len                          number of live entries");
            println!("  stats                        lookup and eviction counters");
            println!("  clear                        remove every entry");
            println!("  sweep                        prune expired entries now");
            println!("  quit                         exit");
        }
        "quit" | "exit" => return false,
        other => println!("unknown command '{other}', try 'help'"),
    }

    true
}
