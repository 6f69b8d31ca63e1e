use std::time::Duration;

use crate::{
  observable::Observable,
  observer::Observer,
  scheduler::Scheduler,
  subscription::{Disposable, Subscription},
};

/// Subscribes to the source from a job on a scheduler. Created by
/// [`ObservableExt::subscribe_on`](crate::observable::ObservableExt::subscribe_on)
/// and
/// [`ObservableExt::delay_subscription`](crate::observable::ObservableExt::delay_subscription).
///
/// The returned subscription cancels the job if it has not started yet, and
/// the source's own subscription once it has.
#[derive(Clone)]
pub struct SubscribeOnOp<S, Sch> {
  source: S,
  scheduler: Sch,
  delay: Option<Duration>,
}

impl<S, Sch> SubscribeOnOp<S, Sch> {
  #[inline]
  pub(crate) fn new(source: S, scheduler: Sch, delay: Option<Duration>) -> Self {
    SubscribeOnOp { source, scheduler, delay }
  }
}

impl<Item, Err, S, Sch> Observable<Item, Err> for SubscribeOnOp<S, Sch>
where
  S: Observable<Item, Err> + Send + 'static,
  Sch: Scheduler,
{
  fn actual_subscribe<O>(self, observer: O) -> Subscription
  where
    O: Observer<Item, Err> + Send + 'static,
  {
    let subscription = Subscription::new();
    let c_subscription = subscription.clone();
    let source = self.source;
    let job = self.scheduler.schedule(
      Box::new(move || {
        if !c_subscription.is_disposed() {
          let upstream = source.actual_subscribe(observer);
          c_subscription.add(upstream);
        }
      }),
      self.delay,
    );
    subscription.add(job);
    subscription
  }
}
