//! Drives a small save queue and logs every event through `tracing`.
//!
//! Run with `RUST_LOG=debug cargo run --example save_queue`.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use opqueue::{
    BackoffPolicy, Config, LogWriter, OperationError, OperationSpec, Priority, PriorityQueue,
    Subscribe,
};

fn save(name: &'static str, id: String, priority: Priority, ms: u64) -> OperationSpec {
    OperationSpec::builder(name)
        .id(id)
        .priority(priority)
        .build(move |ctx: CancellationToken| async move {
            tokio::select! {
                _ = tokio::time::sleep(Duration::from_millis(ms)) => Ok(()),
                _ = ctx.cancelled() => Err(OperationError::Canceled),
            }
        })
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug")),
        )
        .init();

    let cfg = Config {
        max_concurrent: 2,
        backoff: BackoffPolicy::constant(Duration::from_millis(200)),
        ..Config::default()
    };
    let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter::new())];
    let queue = PriorityQueue::builder(cfg).with_subscribers(subs).build();

    for i in 0..4 {
        queue.add(save("autosave", format!("auto-{i}"), Priority::Low, 150))?;
    }
    queue.add(save("settings", "settings".into(), Priority::Medium, 100))?;

    let tries = Arc::new(AtomicU32::new(0));
    let t = Arc::clone(&tries);
    let flaky = OperationSpec::builder("roster")
        .id("roster-1")
        .priority(Priority::High)
        .max_retries(2)
        .build(move |_ctx| {
            let n = t.fetch_add(1, Ordering::SeqCst) + 1;
            async move {
                if n < 2 {
                    return Err(OperationError::fail("write conflict"));
                }
                Ok(())
            }
        });
    queue.add(flaky)?;

    let hung = OperationSpec::builder("export")
        .priority(Priority::Medium)
        .timeout(Duration::from_millis(300))
        .build(|_ctx| async {
            std::future::pending::<()>().await;
            Ok(())
        });
    queue.add(hung)?;

    // Preempts whatever is still queued below critical.
    queue.add(save("lineup", "lineup-3".into(), Priority::Critical, 50))?;
    println!("after critical: {}", queue.stats());

    queue.wait_idle().await;
    println!("idle: {} (roster tries: {})", queue.stats(), tries.load(Ordering::SeqCst));

    queue.shutdown(Duration::from_secs(1)).await?;
    Ok(())
}
