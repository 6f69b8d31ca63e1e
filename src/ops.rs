//! Operators built on the core: the merge family, ref-counted sharing and
//! scheduled subscription.

pub mod merge;
pub mod merge_all;
pub mod ref_count;
pub mod subscribe_on;
