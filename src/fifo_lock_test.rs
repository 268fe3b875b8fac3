//! Tests for `FifoLock`.

use std::sync::Arc;
use std::time::Duration;

use futures::poll;

use crate::fifo_lock::FifoLock;

async fn wait_for_waiters<T>(lock: &FifoLock<T>, n: usize) {
  while lock.waiting() < n {
    tokio::time::sleep(Duration::from_millis(1)).await;
  }
}

#[tokio::test]
async fn guard_gives_exclusive_mutable_access() {
  let lock = FifoLock::new(1);
  {
    let mut g = lock.lock().await;
    *g += 1;
    assert!(lock.is_locked());
  }
  assert!(!lock.is_locked());
  assert_eq!(*lock.lock().await, 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn grants_in_arrival_order() {
  let lock = Arc::new(FifoLock::new(Vec::<usize>::new()));
  let held = lock.lock().await;

  let mut tasks = Vec::new();
  for i in 0..8 {
    let task_lock = lock.clone();
    tasks.push(tokio::spawn(async move {
      let mut g = task_lock.lock().await;
      // Alternate short "reads" with longer "writes"; order must not care.
      if i % 2 == 1 {
        tokio::task::yield_now().await;
      }
      g.push(i);
    }));
    wait_for_waiters(&lock, i + 1).await;
  }

  drop(held);
  for t in tasks {
    t.await.unwrap();
  }
  assert_eq!(*lock.lock().await, (0..8).collect::<Vec<_>>());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn hot_loop_cannot_starve_a_queued_request() {
  let lock = Arc::new(FifoLock::new(Vec::<char>::new()));
  let held = lock.lock().await;

  let hot = {
    let lock = lock.clone();
    std::thread::spawn(move || {
      for _ in 0..3 {
        lock.lock_blocking().push('L');
      }
    })
  };
  wait_for_waiters(&lock, 1).await;

  let request = {
    let lock = lock.clone();
    tokio::spawn(async move { lock.lock().await.push('A') })
  };
  wait_for_waiters(&lock, 2).await;

  drop(held);
  request.await.unwrap();
  tokio::task::spawn_blocking(move || hot.join().unwrap())
    .await
    .unwrap();
  assert_eq!(*lock.lock().await, vec!['L', 'A', 'L', 'L']);
}

#[tokio::test]
async fn abandoned_waiter_leaves_the_queue() {
  let lock = FifoLock::new(());
  let held = lock.lock().await;
  let timed_out = tokio::time::timeout(Duration::from_millis(5), lock.lock()).await;
  assert!(timed_out.is_err());
  drop(held);
  let again = tokio::time::timeout(Duration::from_secs(1), lock.lock()).await;
  assert!(again.is_ok());
}

#[tokio::test]
async fn waiter_dropped_after_hand_off_passes_the_lock_on() {
  let lock = FifoLock::new(());
  let held = lock.lock().await;
  let mut pending = Box::pin(lock.lock());
  assert!(poll!(&mut pending).is_pending());
  assert_eq!(lock.waiting(), 1);

  drop(held);
  // The lock now belongs to `pending`, which is dropped before observing it.
  assert!(lock.is_locked());
  drop(pending);
  assert!(!lock.is_locked());
}

#[tokio::test]
async fn guard_released_on_error_path() {
  let lock = FifoLock::new(0);
  async fn fails(lock: &FifoLock<i32>) -> Result<(), String> {
    let mut g = lock.lock().await;
    *g = 7;
    let parsed: Result<i32, String> = Err("boom".to_string());
    *g += parsed?;
    Ok(())
  }
  assert!(fails(&lock).await.is_err());
  assert!(!lock.is_locked());
  assert_eq!(*lock.lock().await, 7);
}

#[test]
fn blocking_callers_share_the_queue() {
  let lock = Arc::new(FifoLock::new(0u32));
  let threads: Vec<_> = (0..4)
    .map(|_| {
      let lock = lock.clone();
      std::thread::spawn(move || {
        for _ in 0..100 {
          *lock.lock_blocking() += 1;
        }
      })
    })
    .collect();
  for t in threads {
    t.join().unwrap();
  }
  assert_eq!(*lock.lock_blocking(), 400);
}
