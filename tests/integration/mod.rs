//! Integration test harness

mod helpers;
mod test_list;
mod test_run;
