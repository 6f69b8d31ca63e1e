//! Integration tests for rxcore
//!
//! Exercises merge, connectable sharing and the schedulers together, with
//! producers running on real threads.

use std::{
  convert::Infallible,
  sync::{
    atomic::{AtomicBool, AtomicUsize, Ordering},
    mpsc, Arc, Barrier, Mutex,
  },
  thread,
  time::Duration,
};

use rxcore::prelude::*;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
  let _ = tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::from_default_env())
    .with_test_writer()
    .try_init();
}

#[derive(Debug, PartialEq)]
enum Event<Item, Err> {
  Next(Item),
  Error(Err),
  Complete,
}

type Events<Item, Err> = Arc<Mutex<Vec<Event<Item, Err>>>>;

/// Subscribes and records every signal. The channel fires on the terminal.
fn record<S, Item, Err>(source: S) -> (Events<Item, Err>, mpsc::Receiver<()>, Subscription)
where
  S: Observable<Item, Err>,
  Item: Send + 'static,
  Err: Send + 'static,
{
  let events: Events<Item, Err> = Arc::default();
  let (tx, rx) = mpsc::channel();
  let tx_err = tx.clone();
  let (e1, e2, e3) = (events.clone(), events.clone(), events.clone());
  let subscription = source.subscribe_all(
    move |v| e1.lock().unwrap().push(Event::Next(v)),
    move |e| {
      e2.lock().unwrap().push(Event::Error(e));
      let _ = tx_err.send(());
    },
    move || {
      e3.lock().unwrap().push(Event::Complete);
      let _ = tx.send(());
    },
  );
  (events, rx, subscription)
}

#[rxcore_macro::test]
fn merge_sync_list_with_delayed_sibling() {
  init_tracing();
  let (events, done, _subscription) = record(
    observable::from_iter(vec![1, 2, 3])
      .merge(observable::of(4).delay_subscription(Duration::from_millis(20), NewThread)),
  );

  done.recv_timeout(Duration::from_secs(5)).unwrap();
  assert_eq!(
    *events.lock().unwrap(),
    vec![Event::Next(1), Event::Next(2), Event::Next(3), Event::Next(4), Event::Complete]
  );
}

#[rxcore_macro::test]
fn merge_many_threaded_siblings_completes_once() {
  const N: usize = 16;
  let barrier = Arc::new(Barrier::new(N));
  let sources = (0..N).map(|i| {
    let barrier = barrier.clone();
    observable::create(move |mut s: Subscriber<usize, Infallible>| {
      let barrier = barrier.clone();
      thread::spawn(move || {
        barrier.wait();
        s.next(i);
        s.complete();
      });
    })
  });
  let (events, done, subscription) = record(observable::merge_iter(sources));

  done.recv_timeout(Duration::from_secs(5)).unwrap();
  thread::sleep(Duration::from_millis(20));
  let events = events.lock().unwrap();
  let mut values: Vec<_> = events
    .iter()
    .filter_map(|e| match e {
      Event::Next(v) => Some(*v),
      _ => None,
    })
    .collect();
  values.sort_unstable();
  assert_eq!(values, (0..N).collect::<Vec<_>>());
  assert_eq!(events.iter().filter(|e| **e == Event::Complete).count(), 1);
  assert_eq!(events.last(), Some(&Event::Complete));
  assert!(subscription.is_disposed());
}

#[rxcore_macro::test]
fn merge_never_overlaps_downstream_calls() {
  const PRODUCERS: usize = 4;
  const PER_PRODUCER: usize = 200;
  let subjects: Vec<Subject<usize, Infallible>> =
    (0..PRODUCERS).map(|_| Subject::new()).collect();

  let in_call = Arc::new(AtomicBool::new(false));
  let overlaps = Arc::new(AtomicUsize::new(0));
  let received = Arc::new(AtomicUsize::new(0));
  let (c_in_call, c_overlaps, c_received) = (in_call.clone(), overlaps.clone(), received.clone());
  observable::merge_iter(subjects.clone()).subscribe(move |_| {
    if c_in_call.swap(true, Ordering::SeqCst) {
      c_overlaps.fetch_add(1, Ordering::SeqCst);
    }
    thread::yield_now();
    c_received.fetch_add(1, Ordering::SeqCst);
    c_in_call.store(false, Ordering::SeqCst);
  });

  let handles: Vec<_> = subjects
    .into_iter()
    .map(|mut subject| {
      thread::spawn(move || {
        for i in 0..PER_PRODUCER {
          subject.next(i);
        }
      })
    })
    .collect();
  for h in handles {
    h.join().unwrap();
  }

  assert_eq!(overlaps.load(Ordering::SeqCst), 0);
  assert_eq!(received.load(Ordering::SeqCst), PRODUCERS * PER_PRODUCER);
}

#[rxcore_macro::test]
fn merge_error_stops_everything() {
  let mut a: Subject<i32, String> = Subject::new();
  let mut b: Subject<i32, String> = Subject::new();
  let (events, _done, subscription) = record(a.clone().merge(b.clone()));

  a.next(1);
  b.next(2);
  a.error("first".to_string());
  b.error("second".to_string());
  b.next(3);

  assert_eq!(
    *events.lock().unwrap(),
    vec![Event::Next(1), Event::Next(2), Event::Error("first".to_string())]
  );
  assert!(subscription.is_disposed());
  assert_eq!(b.observer_count(), 0);
}

#[rxcore_macro::test]
fn merge_error_wins_over_racing_producers() {
  const PRODUCERS: usize = 4;
  for _ in 0..20 {
    let producers: Vec<Subject<usize, String>> =
      (0..PRODUCERS).map(|_| Subject::new()).collect();
    let failing: Subject<usize, String> = Subject::new();
    let sources = producers.iter().cloned().chain(std::iter::once(failing.clone()));
    let (events, done, subscription) = record(observable::merge_iter(sources));

    let barrier = Arc::new(Barrier::new(PRODUCERS + 1));
    let mut handles: Vec<_> = producers
      .into_iter()
      .map(|mut subject| {
        let barrier = barrier.clone();
        thread::spawn(move || {
          barrier.wait();
          for i in 0..500 {
            subject.next(i);
          }
        })
      })
      .collect();
    handles.push({
      let mut failing = failing.clone();
      let barrier = barrier.clone();
      thread::spawn(move || {
        barrier.wait();
        thread::yield_now();
        failing.error("failed".to_string());
      })
    });
    for h in handles {
      h.join().unwrap();
    }

    done.recv_timeout(Duration::from_secs(5)).unwrap();
    let events = events.lock().unwrap();
    assert_eq!(events.last(), Some(&Event::Error("failed".to_string())));
    assert_eq!(events.iter().filter(|e| matches!(e, Event::Error(_))).count(), 1);
    assert!(!events.contains(&Event::Complete));
    assert!(subscription.is_disposed());
  }
}

#[rxcore_macro::test]
fn merge_of_nothing_completes_without_values() {
  let sources: Vec<BoxedObservable<i32, Infallible>> = vec![];
  let (events, done, _subscription) = record(observable::merge_iter(sources));
  done.try_recv().unwrap();
  assert_eq!(*events.lock().unwrap(), vec![Event::Complete]);
}

#[rxcore_macro::test]
fn merge_heterogeneous_sources_through_boxing() {
  let sources = vec![
    observable::of(1).box_it(),
    observable::from_iter(2..4).box_it(),
    observable::empty().box_it(),
  ];
  let (events, _done, _subscription) = record(observable::merge_iter(sources));
  assert_eq!(
    *events.lock().unwrap(),
    vec![Event::Next(1), Event::Next(2), Event::Next(3), Event::Complete]
  );
}

#[rxcore_macro::test]
fn connect_twice_then_dispose_twice() {
  let subscribes = Arc::new(AtomicUsize::new(0));
  let teardowns = Arc::new(AtomicUsize::new(0));
  let (c_subscribes, c_teardowns) = (subscribes.clone(), teardowns.clone());
  let connectable = observable::create(move |s: Subscriber<i32, Infallible>| {
    c_subscribes.fetch_add(1, Ordering::SeqCst);
    let c_teardowns = c_teardowns.clone();
    s.subscription().add_teardown(move || {
      c_teardowns.fetch_add(1, Ordering::SeqCst);
    });
  })
  .publish();

  let first = connectable.connect();
  let second = connectable.connect();
  assert_eq!(subscribes.load(Ordering::SeqCst), 1);

  first.dispose();
  second.dispose();
  assert_eq!(teardowns.load(Ordering::SeqCst), 1);
}

#[rxcore_macro::test]
fn published_merge_feeds_every_subscriber() {
  let mut a: Subject<i32, Infallible> = Subject::new();
  let mut b: Subject<i32, Infallible> = Subject::new();
  let connectable = a.clone().merge(b.clone()).publish();
  let (first, _, _) = record(connectable.clone());
  let (second, _, _) = record(connectable.clone());
  let connection = connectable.connect();

  a.next(1);
  b.next(2);
  connection.dispose();
  a.next(3);

  for events in [first, second] {
    assert_eq!(*events.lock().unwrap(), vec![Event::Next(1), Event::Next(2)]);
  }
}

#[cfg(feature = "futures-scheduler")]
#[rxcore_macro::test]
fn merge_across_a_thread_pool() {
  let pool = ThreadPoolScheduler::with_config(ThreadPoolConfig {
    pool_size: 4,
    name_prefix: "merge-it-".to_string(),
  })
  .unwrap();
  let sources: Vec<_> = (0..8)
    .map(|i| observable::from_iter(i * 10..i * 10 + 10).subscribe_on(pool.clone()))
    .collect();
  let (events, done, _subscription) = record(observable::merge_iter(sources));

  done.recv_timeout(Duration::from_secs(5)).unwrap();
  let events = events.lock().unwrap();
  assert_eq!(events.len(), 81);
  assert_eq!(events.last(), Some(&Event::Complete));
}

#[cfg(feature = "tokio-scheduler")]
#[rxcore_macro::test(shared)]
async fn merge_on_tokio() {
  let scheduler = TokioScheduler::try_current().unwrap();
  let (events, done, _subscription) = record(
    observable::of(1)
      .subscribe_on(scheduler.clone())
      .merge(observable::of(2).subscribe_on(scheduler)),
  );
  tokio::task::spawn_blocking(move || done.recv_timeout(Duration::from_secs(5)))
    .await
    .unwrap()
    .unwrap();
  let events = events.lock().unwrap();
  assert_eq!(events.len(), 3);
  assert_eq!(events.last(), Some(&Event::Complete));
}
