//! Service metrics, exposed in Prometheus text format at `/metrics`.

use prometheus::{Encoder, IntCounterVec, Opts, Registry, TextEncoder};

pub struct Metrics {
    registry: Registry,
    pub rows_migrated: IntCounterVec,
}

impl Metrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();
        let rows_migrated = IntCounterVec::new(
            Opts::new(
                "saludplus_rows_migrated",
                "Spreadsheet rows processed by the migration pipeline",
            ),
            &["outcome"],
        )?;
        registry.register(Box::new(rows_migrated.clone()))?;

        Ok(Self {
            registry,
            rows_migrated,
        })
    }

    pub fn encode(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}
