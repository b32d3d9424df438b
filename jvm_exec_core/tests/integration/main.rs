mod test_monitor_scheduling;
mod test_wide_under_scheduler;
mod utils;
