//! Server: pipeline configuration API plus the execution loop.
//!
//! Usage: `visionweave [--bind ADDR] [--store-dir DIR] [--fps N]
//! [--funcs-instead-of-mods BOOL] [--links-instead-of-inputs BOOL]`
//!
//! Set RUST_LOG=visionweave=trace for span-level detail.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use clap::builder::BoolishValueParser;
use clap::{ArgAction, Parser};
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use visionweave::{
  ExecutionLoop, FileStore, FunctionRegistry, PlanEvaluator, Program, WireConfig, router,
};

const STORE_DIR: &str = ".visionweave";

/// Serve the pipeline configuration API.
#[derive(Parser, Debug)]
#[command(name = "visionweave")]
#[command(
  after_help = r#"Boolean switches accept true/false, yes/no, on/off and 1/0.

Examples:
  visionweave --fps 60
  FUNC_INSTEAD_OF_MODS=false visionweave --store-dir /var/lib/visionweave"#
)]
struct Args {
  /// Address to listen on.
  #[arg(long, env = "VISIONWEAVE_BIND", default_value = "0.0.0.0:8080")]
  bind: SocketAddr,

  /// Directory holding the stored node tree of each profile.
  #[arg(long, env = "VISIONWEAVE_STORE_DIR", value_name = "DIR", default_value = STORE_DIR)]
  store_dir: PathBuf,

  /// Execution loop frame rate; 0 runs frames back to back.
  #[arg(long, env = "VISIONWEAVE_FPS", default_value_t = 30)]
  fps: u32,

  /// List functions flat instead of grouped by module.
  #[arg(
    long,
    env = "FUNC_INSTEAD_OF_MODS",
    value_name = "BOOL",
    default_value_t = true,
    action = ArgAction::Set,
    value_parser = BoolishValueParser::new()
  )]
  funcs_instead_of_mods: bool,

  /// Send node inputs as bare links instead of link-or-value objects.
  #[arg(
    long,
    env = "LINKS_INSTEAD_OF_INPUTS",
    value_name = "BOOL",
    default_value_t = true,
    action = ArgAction::Set,
    value_parser = BoolishValueParser::new()
  )]
  links_instead_of_inputs: bool,
}

impl Args {
  fn wire_config(&self) -> WireConfig {
    WireConfig {
      funcs_instead_of_mods: self.funcs_instead_of_mods,
      links_instead_of_inputs: self.links_instead_of_inputs,
    }
  }
}

async fn shutdown_signal() {
  if let Err(e) = tokio::signal::ctrl_c().await {
    warn!(error = %e, "cannot listen for ctrl-c");
    std::future::pending::<()>().await;
  }
  info!("shutting down");
}

#[tokio::main]
async fn main() {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .init();

  let args = Args::parse();
  let config = args.wire_config();
  info!(bind = %args.bind, store_dir = %args.store_dir.display(), fps = args.fps, ?config, "options");

  let store = match FileStore::open(&args.store_dir) {
    Ok(s) => s,
    Err(e) => {
      eprintln!("Error opening store {}: {}", args.store_dir.display(), e);
      process::exit(1);
    }
  };

  let program = match Program::new(Arc::new(FunctionRegistry::builtin()), config, store) {
    Ok(p) => Arc::new(p),
    Err(e) => {
      eprintln!("Error building program: {}", e);
      process::exit(1);
    }
  };
  info!(funcs = program.registry().funcs().count(), "function registry loaded");

  // A stored tree that no longer imports cleanly leaves whatever was applied.
  match program.load_current().await {
    Ok(profile) => info!(profile, "stored node tree loaded"),
    Err(e) => warn!(error = %e, "stored node tree not loaded"),
  }

  let exec = match ExecutionLoop::spawn(program.pipeline(), PlanEvaluator::new(), args.fps) {
    Ok(l) => l,
    Err(e) => {
      eprintln!("Error starting execution loop: {}", e);
      process::exit(1);
    }
  };

  let listener = match TcpListener::bind(args.bind).await {
    Ok(l) => l,
    Err(e) => {
      eprintln!("Error binding {}: {}", args.bind, e);
      process::exit(1);
    }
  };
  info!(addr = %args.bind, "listening");

  let served = axum::serve(listener, router(program))
    .with_graceful_shutdown(shutdown_signal())
    .await;

  tokio::task::spawn_blocking(move || exec.stop()).await.ok();
  if let Err(e) = served {
    eprintln!("Server error: {}", e);
    process::exit(1);
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn wire_switches_default_to_flat_and_link_only() {
    let args = Args::try_parse_from(["visionweave"]).unwrap();
    assert_eq!(args.wire_config(), WireConfig::default());
    assert_eq!(args.fps, 30);
  }

  #[test]
  fn wire_switches_accept_boolish_values() {
    let args = Args::try_parse_from([
      "visionweave",
      "--funcs-instead-of-mods",
      "no",
      "--links-instead-of-inputs",
      "0",
    ])
    .unwrap();
    assert!(!args.wire_config().funcs_instead_of_mods);
    assert!(!args.wire_config().links_instead_of_inputs);
  }

  #[test]
  fn wire_switches_reject_other_words() {
    assert!(Args::try_parse_from(["visionweave", "--links-instead-of-inputs", "maybe"]).is_err());
  }
}
