// src/lib.rs

pub mod build;
pub mod cli;
pub mod config;
pub mod deploy;
pub mod engine;
pub mod errors;
pub mod fs;
pub mod logging;
pub mod report;
pub mod trigger;
pub mod watch;

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::build::CommandBuildRunner;
use crate::cli::CliArgs;
use crate::config::{load_effective, ConfigFile};
use crate::deploy::FsArtifactCopier;
use crate::engine::{CycleOrchestrator, Runtime, RuntimeEvent, TriggerReason};
use crate::fs::{FileSystem, RealFileSystem};
use crate::report::Reporter;
use crate::trigger::spawn_manual_listener;
use crate::watch::{spawn_poller, Fingerprinter};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading (file + CLI overrides)
/// - build runner, artifact copier, orchestrator
/// - the startup cycle
/// - fingerprint poller and manual (stdin) listener
/// - Ctrl-C handling
pub async fn run(args: CliArgs) -> Result<()> {
    let cfg = load_effective(&args)?;

    if args.dry_run {
        print_dry_run(&cfg);
        return Ok(());
    }

    let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem);

    let builder = CommandBuildRunner::new(cfg.build_cmd(), cfg.build_dir());
    let copier = FsArtifactCopier::new(cfg.artifact(), cfg.targets().to_vec(), Arc::clone(&fs));
    let mut orchestrator =
        CycleOrchestrator::new(builder, copier, Reporter::stdout(), cfg.summary_every());

    // Build and deploy once before watching, so the baseline fingerprint is
    // taken after whatever the first build touched.
    orchestrator.run_cycle(TriggerReason::Startup).await;

    if args.once {
        debug!("--once: not watching");
        return Ok(());
    }

    let (rt_tx, rt_rx) = mpsc::channel::<RuntimeEvent>(64);

    let fingerprinter = Fingerprinter::with_excludes(cfg.watch_dir(), cfg.exclude())?;
    let _poller = spawn_poller(fingerprinter, fs, cfg.poll_interval(), rt_tx.clone()).await?;

    if !args.no_input {
        spawn_manual_listener(std::io::stdin(), rt_tx.clone())
            .context("spawning manual trigger listener")?;
        info!("press Enter to rebuild and redeploy");
    }

    // Ctrl-C → graceful shutdown.
    {
        let tx = rt_tx.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                eprintln!("failed to listen for Ctrl+C: {e}");
                return;
            }
            let _ = tx.send(RuntimeEvent::ShutdownRequested).await;
        });
    }
    drop(rt_tx);

    let runtime = Runtime::new(orchestrator, rt_rx, cfg.queue_length());
    let orchestrator = runtime.run().await;

    let stats = orchestrator.statistics();
    info!(
        successes = stats.successes(),
        failures = stats.failures(),
        "wad stopped"
    );
    Ok(())
}

/// Print the effective configuration without building anything.
fn print_dry_run(cfg: &ConfigFile) {
    println!("wad dry-run");
    println!("  watch.dir            = {}", cfg.watch_dir().display());
    println!("  watch.poll_interval  = {:?}", cfg.poll_interval());
    if !cfg.exclude().is_empty() {
        println!("  watch.exclude        = {:?}", cfg.exclude());
    }
    println!("  build.cmd            = {}", cfg.build_cmd());
    println!("  build.dir            = {}", cfg.build_dir().display());
    println!("  build.artifact       = {}", cfg.artifact().display());
    println!("  stats.summary_every  = {}", cfg.summary_every());
    println!("  runtime.queue_length = {}", cfg.queue_length());
    println!();

    println!("targets ({}):", cfg.targets().len());
    for target in cfg.targets() {
        println!("  - {}", target.display());
    }

    debug!("dry-run complete (no execution)");
}
