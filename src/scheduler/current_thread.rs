use std::{
  cell::RefCell,
  collections::VecDeque,
  marker::PhantomData,
  thread,
  time::{Duration, Instant},
};

use tracing::{trace, warn};

use super::{cancellable, Job, Scheduler};
use crate::subscription::Subscription;

struct Pending {
  job: Job,
  due: Option<Instant>,
}

impl Pending {
  fn run(self) {
    if let Some(due) = self.due {
      let now = Instant::now();
      if due > now {
        thread::sleep(due - now);
      }
    }
    (self.job)()
  }
}

thread_local! {
  static QUEUE: RefCell<Option<VecDeque<Pending>>> = const { RefCell::new(None) };
}

/// Trampoline scheduler for the calling thread.
///
/// At most one frame per thread owns the queue. Jobs scheduled while the
/// queue is owned are appended and run in FIFO order when the owner lets go,
/// so a job that schedules another job finishes before the second one
/// starts. Scheduling without an owner makes the caller the owner: the job
/// runs inline and the queue is drained before `schedule` returns.
///
/// Delayed jobs block the thread until they are due.
#[derive(Clone, Copy, Debug, Default)]
pub struct CurrentThread;

impl CurrentThread {
  /// Takes ownership of this thread's queue if nobody holds it.
  ///
  /// Returns `None` if an outer frame already owns the queue. Dropping the
  /// returned owner drains every queued job, including jobs those jobs
  /// schedule, and then releases the queue.
  #[must_use = "dropping the owner drains the queue immediately"]
  pub fn own_queue() -> Option<QueueOwner> {
    QUEUE.with(|queue| {
      let mut queue = queue.borrow_mut();
      if queue.is_some() {
        return None;
      }
      *queue = Some(VecDeque::new());
      trace!("current-thread queue owned");
      Some(QueueOwner { _not_send: PhantomData })
    })
  }

  /// Whether some frame on this thread owns the queue.
  pub fn is_queue_owned() -> bool { QUEUE.with(|queue| queue.borrow().is_some()) }

  /// Appends to the owned queue, or gives `pending` back if there is none.
  fn enqueue(pending: Pending) -> Result<(), Pending> {
    QUEUE.with(|queue| match queue.borrow_mut().as_mut() {
      Some(queue) => {
        queue.push_back(pending);
        Ok(())
      }
      None => Err(pending),
    })
  }
}

impl Scheduler for CurrentThread {
  fn schedule(&self, job: Job, delay: Option<Duration>) -> Subscription {
    let (handle, job) = cancellable(job);
    let pending = Pending { job, due: delay.map(|d| Instant::now() + d) };
    if let Err(pending) = Self::enqueue(pending) {
      let _owner = Self::own_queue();
      pending.run();
    }
    handle
  }
}

/// Proof of queue ownership for the current thread. See
/// [`CurrentThread::own_queue`].
pub struct QueueOwner {
  _not_send: PhantomData<*const ()>,
}

/// Releases the queue even if a job panics mid-drain.
struct Release;

impl Drop for Release {
  fn drop(&mut self) { QUEUE.with(|queue| *queue.borrow_mut() = None); }
}

impl Drop for QueueOwner {
  fn drop(&mut self) {
    let _release = Release;
    if thread::panicking() {
      let dropped = QUEUE.with(|queue| queue.borrow().as_ref().map_or(0, VecDeque::len));
      if dropped > 0 {
        warn!(dropped, "discarding current-thread jobs while unwinding");
      }
      return;
    }
    loop {
      let next = QUEUE.with(|queue| queue.borrow_mut().as_mut().and_then(VecDeque::pop_front));
      match next {
        Some(pending) => pending.run(),
        None => break,
      }
    }
    trace!("current-thread queue drained");
  }
}
