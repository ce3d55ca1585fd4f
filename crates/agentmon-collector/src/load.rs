use crate::{Collector, Reading};
use anyhow::Result;
use sysinfo::System;

/// Load averages; all zero on platforms without them.
pub struct LoadCollector;

impl Collector for LoadCollector {
    fn name(&self) -> &str {
        "load"
    }

    fn collect(&mut self) -> Result<Vec<Reading>> {
        let load_avg = System::load_average();
        Ok(vec![
            Reading::new("system.load_1", load_avg.one),
            Reading::new("system.load_5", load_avg.five),
            Reading::new("system.load_15", load_avg.fifteen),
        ])
    }
}
