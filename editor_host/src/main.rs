//! Sandpit - headless host for the buffer cache and analysis workers.
//!
//! Usage: sandpit <manifest.json> [--edit DOC=TEXT]... [--format] [--save DIR] [--timeout MS]
//!
//! A sample manifest lives in `editor_host/demo/workspace.json`.

mod cli;
mod headless;
mod manifest;

use clap::Parser;
use cli::Cli;
use headless::{DirectorySink, LoggingSurface, WhitespaceFormatter};
use manifest::Manifest;
use sandpit_analysis::WorkerPool;
use sandpit_core::{
    ActiveDocumentController, AnalysisDispatcher, AnalysisKind, BufferCache, FormatOptions,
    Freshness, SessionEvent,
};
use std::error::Error;
use std::thread;
use std::time::{Duration, Instant};

type Controller = ActiveDocumentController<LoggingSurface, WorkerPool>;

const TICK: Duration = Duration::from_millis(10);

fn describe(event: &SessionEvent) -> String {
    match event {
        SessionEvent::DecorationsUpdated {
            document,
            version,
            count,
        } => format!("decorations {} @ {}: {}", document, version, count),
        SessionEvent::DiagnosticsUpdated {
            document,
            version,
            count,
        } => format!("diagnostics {} @ {}: {}", document, version, count),
        SessionEvent::WorkerUnavailable { kind } => format!("worker unavailable: {}", kind),
    }
}

/// True once no edit is waiting and no request is outstanding.
fn settled(controller: &Controller) -> bool {
    let dispatcher = controller.dispatcher();
    if dispatcher.has_pending_edit() {
        return false;
    }
    controller.cache().documents().iter().all(|document| {
        AnalysisKind::ALL.iter().all(|&kind| {
            !dispatcher.is_available(kind)
                || !matches!(dispatcher.freshness(document, kind), Freshness::Pending(_))
        })
    })
}

/// Drives the main loop until analysis settles or `timeout` elapses.
fn pump(controller: &mut Controller, timeout: Duration) {
    let deadline = Instant::now() + timeout;
    loop {
        for event in controller.poll(Instant::now()) {
            println!("{}", describe(&event));
        }
        if settled(controller) {
            return;
        }
        if Instant::now() >= deadline {
            log::warn!("Analysis did not settle within {:?}", timeout);
            return;
        }
        thread::sleep(TICK);
    }
}

fn report_diagnostics(controller: &Controller) {
    for document in controller.cache().documents() {
        let Some(record) = controller.cache().get(&document) else {
            continue;
        };
        for d in record.diagnostics() {
            println!(
                "{}:{}:{}: {:?}: {}",
                record.path(),
                d.start_line,
                d.start_col,
                d.severity,
                d.message
            );
        }
    }
}

fn run(options: Cli) -> Result<(), Box<dyn Error>> {
    let manifest = Manifest::load(&options.manifest)?;
    let config = manifest.config.clone();

    let dispatcher = AnalysisDispatcher::new(WorkerPool::new(config.lint.clone()), &config);
    let mut controller: Controller =
        ActiveDocumentController::new(BufferCache::new(), dispatcher, LoggingSurface::default());
    controller.start();

    let report = controller.reset_workspace(manifest.modules.clone(), manifest.directories.clone());
    for failure in &report.failed {
        log::warn!("Skipped module: {}", failure);
    }
    log::info!("Loaded {} documents", report.created.len());

    if let Some(document) = manifest.initial_document() {
        controller.activate(&document)?;
        pump(&mut controller, options.timeout);
    }

    for edit in &options.edits {
        controller.activate(&edit.document)?;
        controller.edit_active(&edit.text, Instant::now())?;
        pump(&mut controller, options.timeout);
    }

    if options.format {
        controller.format_active(&WhitespaceFormatter, &FormatOptions::default())?;
        log::debug!("Formatted text:\n{}", controller.surface().text());
        pump(&mut controller, options.timeout);
    }

    if let Some(dir) = options.save_dir {
        controller.save_active(&mut DirectorySink::new(dir))?;
    }

    report_diagnostics(&controller);
    log::info!(
        "Surface shows {} decorations",
        controller.surface().decorations().len()
    );
    let stats = controller.cache().stats();
    log::info!(
        "Buffers created: {}, disposed: {}",
        stats.created,
        stats.disposed
    );
    controller.shutdown();
    Ok(())
}

fn main() {
    let options = Cli::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("Starting Sandpit");
    if let Err(e) = run(options) {
        log::error!("{}", e);
        std::process::exit(1);
    }
    log::info!("Sandpit exited");
}
