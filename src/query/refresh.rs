//! Per-resource polling intervals.

use crate::api::Resource;
use crate::settings::Settings;
use std::collections::HashMap;
use std::time::Duration;

/// Maps each resource to its automatic refresh interval, if any.
///
/// Volatile operational signals poll; configuration-like data is fetched
/// once per subscription and refreshed only by explicit invalidation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshTable {
    intervals: HashMap<Resource, Option<Duration>>,
}

impl Default for RefreshTable {
    fn default() -> Self {
        let mut intervals: HashMap<Resource, Option<Duration>> =
            Resource::all().iter().map(|r| (*r, None)).collect();
        intervals.insert(Resource::SystemHealth, Some(Duration::from_secs(30)));
        intervals.insert(Resource::ProcessingJobs, Some(Duration::from_secs(5)));
        intervals.insert(Resource::ResourceUsage, Some(Duration::from_secs(10)));
        Self { intervals }
    }
}

impl RefreshTable {
    /// Defaults with the overrides from `settings` applied.
    pub fn from_settings(settings: &Settings) -> Self {
        let mut table = Self::default();
        for (resource, secs) in &settings.refresh_overrides {
            let interval = (*secs > 0).then(|| Duration::from_secs(*secs));
            table.set(*resource, interval);
        }
        table
    }

    pub fn interval(&self, resource: Resource) -> Option<Duration> {
        self.intervals.get(&resource).copied().flatten()
    }

    pub fn set(&mut self, resource: Resource, interval: Option<Duration>) {
        self.intervals.insert(resource, interval);
    }

    /// Resources that poll, sorted for stable output.
    pub fn polled(&self) -> Vec<(Resource, Duration)> {
        let mut polled: Vec<_> = self
            .intervals
            .iter()
            .filter_map(|(r, i)| i.map(|i| (*r, i)))
            .collect();
        polled.sort();
        polled
    }
}
