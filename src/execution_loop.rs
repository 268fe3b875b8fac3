//! The frame loop: once per frame, wait for the pipeline lock in turn with
//! API requests and hand the pipeline to a [FrameEvaluator].

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::fifo_lock::FifoLock;
use crate::types::{NodeId, Pipeline};

/// Runs one frame over a consistent pipeline. Called with the lock held, so
/// implementations should not block on anything that needs it.
pub trait FrameEvaluator: Send + 'static {
  fn evaluate(&mut self, frame: u64, pipeline: &Pipeline);
}

/// Evaluator that only plans: computes the dependency order each frame and
/// reports when it changes or cannot be computed.
#[derive(Debug, Default)]
pub struct PlanEvaluator {
  plan: Vec<NodeId>,
  cycle_reported: bool,
}

impl PlanEvaluator {
  pub fn new() -> Self {
    Self::default()
  }

  /// Order from the last successful plan; empty while the pipeline has a
  /// cycle.
  pub fn plan(&self) -> &[NodeId] {
    &self.plan
  }
}

impl FrameEvaluator for PlanEvaluator {
  fn evaluate(&mut self, frame: u64, pipeline: &Pipeline) {
    match pipeline.evaluation_order() {
      Ok(order) => {
        if order != self.plan {
          debug!(frame, nodes = order.len(), "evaluation plan changed");
          self.plan = order;
        }
        self.cycle_reported = false;
      }
      Err(e) => {
        if !self.cycle_reported {
          warn!(frame, error = %e, "pipeline cannot be evaluated");
          self.cycle_reported = true;
        }
        self.plan.clear();
      }
    }
  }
}

/// Handle to the running loop thread. Dropping it stops the loop.
#[derive(Debug)]
pub struct ExecutionLoop {
  running: Arc<AtomicBool>,
  frames: Arc<AtomicU64>,
  handle: Option<JoinHandle<()>>,
}

impl ExecutionLoop {
  /// Starts the loop on its own thread. `fps == 0` runs frames back to back.
  pub fn spawn<E: FrameEvaluator>(
    pipeline: Arc<FifoLock<Pipeline>>,
    evaluator: E,
    fps: u32,
  ) -> std::io::Result<Self> {
    let running = Arc::new(AtomicBool::new(true));
    let frames = Arc::new(AtomicU64::new(0));
    let handle = std::thread::Builder::new()
      .name("execution-loop".to_string())
      .spawn({
        let running = running.clone();
        let frames = frames.clone();
        move || run(pipeline, evaluator, fps, running, frames)
      })?;
    info!(fps, "execution loop started");
    Ok(Self {
      running,
      frames,
      handle: Some(handle),
    })
  }

  /// Frames completed so far.
  pub fn frames(&self) -> u64 {
    self.frames.load(Ordering::Relaxed)
  }

  pub fn is_running(&self) -> bool {
    self.running.load(Ordering::SeqCst)
  }

  /// Signals the loop and waits for the current frame to finish.
  pub fn stop(mut self) {
    self.shutdown();
  }

  fn shutdown(&mut self) {
    self.running.store(false, Ordering::SeqCst);
    if let Some(handle) = self.handle.take() {
      if handle.join().is_err() {
        warn!("execution loop thread panicked");
      } else {
        info!(frames = self.frames(), "execution loop stopped");
      }
    }
  }
}

impl Drop for ExecutionLoop {
  fn drop(&mut self) {
    self.shutdown();
  }
}

fn run<E: FrameEvaluator>(
  pipeline: Arc<FifoLock<Pipeline>>,
  mut evaluator: E,
  fps: u32,
  running: Arc<AtomicBool>,
  frames: Arc<AtomicU64>,
) {
  let interval = (fps > 0).then(|| Duration::from_micros(1_000_000 / u64::from(fps)));
  let mut last_frame = Instant::now();
  while running.load(Ordering::SeqCst) {
    let frame = frames.load(Ordering::Relaxed);
    {
      let pipeline = pipeline.lock_blocking();
      evaluator.evaluate(frame, &pipeline);
    }
    frames.fetch_add(1, Ordering::Relaxed);

    match interval {
      Some(interval) => {
        let elapsed = last_frame.elapsed();
        if elapsed < interval {
          std::thread::sleep(interval - elapsed);
        }
      }
      None => std::thread::yield_now(),
    }
    last_frame = Instant::now();
  }
}
