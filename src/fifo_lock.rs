//! First-in-first-out mutual exclusion.
//!
//! Requesters are admitted strictly in arrival order. The frame loop
//! reacquires the pipeline tens of times per second; with a barging lock it
//! could starve configuration requests indefinitely.
//!
//! Each waiter parks on a oneshot ticket in a queue. Releasing hands the lock
//! straight to the head ticket, so no later arrival can slip in between.

use std::collections::VecDeque;
use std::ops::{Deref, DerefMut};
use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::oneshot;

#[derive(Debug, Default)]
struct Queue {
  held: bool,
  waiters: VecDeque<oneshot::Sender<()>>,
}

enum Entry {
  Now,
  Queued(oneshot::Receiver<()>),
}

/// FIFO lock around a single value.
#[derive(Debug)]
pub struct FifoLock<T> {
  queue: Mutex<Queue>,
  // Only the admitted holder touches this, so it is never contended.
  data: tokio::sync::Mutex<T>,
}

impl<T> FifoLock<T> {
  pub fn new(value: T) -> Self {
    Self {
      queue: Mutex::new(Queue::default()),
      data: tokio::sync::Mutex::new(value),
    }
  }

  fn queue(&self) -> MutexGuard<'_, Queue> {
    self.queue.lock().unwrap_or_else(PoisonError::into_inner)
  }

  fn enter(&self) -> Entry {
    let mut queue = self.queue();
    if queue.held {
      let (tx, rx) = oneshot::channel();
      queue.waiters.push_back(tx);
      Entry::Queued(rx)
    } else {
      queue.held = true;
      Entry::Now
    }
  }

  /// Passes the lock to the oldest live waiter, or frees it.
  fn release(&self) {
    let mut queue = self.queue();
    while let Some(next) = queue.waiters.pop_front() {
      if next.send(()).is_ok() {
        return;
      }
    }
    queue.held = false;
  }

  /// Number of requesters queued behind the current holder.
  pub fn waiting(&self) -> usize {
    self.queue().waiters.len()
  }

  pub fn is_locked(&self) -> bool {
    self.queue().held
  }

  /// Waits for this caller's turn. Dropping the future gives up the place in
  /// the queue, passing the lock on if it had already been handed over.
  pub async fn lock(&self) -> FifoGuard<'_, T> {
    let admission = loop {
      match self.enter() {
        Entry::Now => break Admission { lock: self },
        Entry::Queued(rx) => {
          let ticket = Ticket {
            lock: self,
            rx: Some(rx),
          };
          if let Some(admission) = ticket.granted().await {
            break admission;
          }
        }
      }
    };
    let data = self.data.lock().await;
    FifoGuard {
      data,
      _admission: admission,
    }
  }

  /// Blocking variant of [FifoLock::lock] for threads outside the async
  /// runtime. Panics if called from within an async context.
  pub fn lock_blocking(&self) -> FifoGuard<'_, T> {
    let admission = loop {
      match self.enter() {
        Entry::Now => break Admission { lock: self },
        Entry::Queued(rx) => {
          if rx.blocking_recv().is_ok() {
            break Admission { lock: self };
          }
        }
      }
    };
    FifoGuard {
      data: self.data.blocking_lock(),
      _admission: admission,
    }
  }
}

/// Proof of being the current holder; releases on drop.
#[derive(Debug)]
struct Admission<'a, T> {
  lock: &'a FifoLock<T>,
}

impl<T> Drop for Admission<'_, T> {
  fn drop(&mut self) {
    self.lock.release();
  }
}

/// A queued request that has not been granted yet.
struct Ticket<'a, T> {
  lock: &'a FifoLock<T>,
  rx: Option<oneshot::Receiver<()>>,
}

impl<'a, T> Ticket<'a, T> {
  async fn granted(mut self) -> Option<Admission<'a, T>> {
    let rx = self.rx.as_mut()?;
    let granted = rx.await.is_ok();
    self.rx = None;
    granted.then(|| Admission { lock: self.lock })
  }
}

impl<T> Drop for Ticket<'_, T> {
  fn drop(&mut self) {
    if let Some(mut rx) = self.rx.take() {
      rx.close();
      if rx.try_recv().is_ok() {
        self.lock.release();
      }
    }
  }
}

/// Exclusive access to the value; the lock passes on when this is dropped.
#[derive(Debug)]
pub struct FifoGuard<'a, T> {
  // Declared first so the value is unlocked before the hand-off.
  data: tokio::sync::MutexGuard<'a, T>,
  _admission: Admission<'a, T>,
}

impl<T> Deref for FifoGuard<'_, T> {
  type Target = T;

  fn deref(&self) -> &T {
    &self.data
  }
}

impl<T> DerefMut for FifoGuard<'_, T> {
  fn deref_mut(&mut self) -> &mut T {
    &mut self.data
  }
}
