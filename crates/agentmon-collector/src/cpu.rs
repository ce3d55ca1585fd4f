use crate::{Collector, Reading};
use anyhow::Result;
use sysinfo::System;

pub struct CpuCollector {
    system: System,
}

impl CpuCollector {
    pub fn new() -> Self {
        let mut system = System::new();
        system.refresh_cpu_all();
        Self { system }
    }
}

impl Default for CpuCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl Collector for CpuCollector {
    fn name(&self) -> &str {
        "cpu"
    }

    fn collect(&mut self) -> Result<Vec<Reading>> {
        self.system.refresh_cpu_all();

        let mut readings = vec![Reading::new(
            "cpu.usage",
            self.system.global_cpu_usage() as f64,
        )];
        for (i, cpu) in self.system.cpus().iter().enumerate() {
            readings.push(
                Reading::new("cpu.core_usage", cpu.cpu_usage() as f64)
                    .with_tag("core", i.to_string()),
            );
        }
        Ok(readings)
    }
}
