//! The work the service performs while running: a short beep.

use anyhow::{Context, Result};
use async_trait::async_trait;
use windows::Win32::System::Diagnostics::Debug::Beep;

use beeper_core::config::ServiceConfig;
use beeper_core::worker::Workload;

pub struct BeepWorkload {
    frequency_hz: u32,
    duration_ms: u32,
}

impl BeepWorkload {
    pub fn new(frequency_hz: u32, duration_ms: u32) -> Self {
        Self {
            frequency_hz,
            duration_ms,
        }
    }

    pub fn from_config(config: &ServiceConfig) -> Self {
        Self::new(config.beep_frequency_hz, config.beep_duration_ms)
    }
}

#[async_trait]
impl Workload for BeepWorkload {
    async fn perform(&mut self) -> Result<()> {
        let (frequency, duration) = (self.frequency_hz, self.duration_ms);
        // Beep blocks for the whole tone
        tokio::task::spawn_blocking(move || unsafe { Beep(frequency, duration) })
            .await
            .context("beep task panicked")?
            .context("Beep failed")
    }
}
