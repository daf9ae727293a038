// src/main.rs
//! Sentra Lab Redirect Plan Checker
//!
//! Validates every redirection in a plan file against the in-memory engine
//! and reports the resulting shift mode or the reason it was rejected.
//!
//! Usage: `sentra-redirect <plan.yaml|plan.json> [config-file]`

use anyhow::{bail, Context, Result};
use sentra_lab_redirect::metadata::RedirectPlan;
use sentra_lab_redirect::observability::{init_metrics, init_tracing};
use sentra_lab_redirect::utils::config::RedirectConfig;
use sentra_lab_redirect::{InMemoryEngine, Redirection, RedirectionRegistry, Redirector};
use std::sync::Arc;
use tracing::{error, info};

fn main() -> Result<()> {
    let mut args = std::env::args().skip(1);
    let plan_path = match args.next() {
        Some(path) => path,
        None => bail!("usage: sentra-redirect <plan.yaml|plan.json> [config-file]"),
    };

    // Load configuration
    let config = match args.next() {
        Some(path) => RedirectConfig::load_from(&path).with_context(|| format!("loading config {}", path))?,
        None => RedirectConfig::load().context("loading config")?,
    };

    // Initialize observability
    init_tracing(&config.logging)?;
    let _metrics = init_metrics(&config.metrics)?;

    info!("Starting Sentra Lab redirect checker v{}", sentra_lab_redirect::VERSION);

    let plan = RedirectPlan::load(&plan_path).with_context(|| format!("loading plan {}", plan_path))?;

    let registry = Arc::new(RedirectionRegistry::new());
    let engine = Arc::new(InMemoryEngine::new(Arc::clone(&registry)));
    let redirector = Redirector::new(engine).with_config(config.redirector.clone());

    let mut failures = 0;
    for planned in &plan.redirections {
        match redirector.redirect_path(&plan.members, &planned.original, &planned.replacement) {
            Ok(redirection) => {
                let detail = match &redirection {
                    Redirection::Method(m) => format!("method, {}", m.shift_mode()),
                    other => other.kind_name().to_string(),
                };
                info!("{}: {} -> {} ok ({})", planned.name, planned.original, planned.replacement, detail);
                println!("ok    {} ({})", planned.name, detail);
            }
            Err(e) => {
                failures += 1;
                error!("{}: {} -> {} rejected: {}", planned.name, planned.original, planned.replacement, e);
                println!("FAIL  {}: {}", planned.name, e);
            }
        }
    }

    if failures > 0 {
        bail!("{} of {} redirections rejected", failures, plan.redirections.len());
    }

    info!("All {} redirections valid", plan.redirections.len());
    Ok(())
}
