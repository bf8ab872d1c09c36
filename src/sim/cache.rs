//! Report reuse across identical requests.
//!
//! A report depends only on the request and the sampling settings, so a
//! content hash of both is a sufficient key.

use crate::config::EngineConfig;
use crate::error::{Result, ShadowError};
use crate::sim::engine::EvaluationRequest;
use crate::sim::report::ComplianceReport;
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Mutex;
use xxhash_rust::xxh3::xxh3_64;

/// Content hash of an evaluation's inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheKey(pub u64);

/// Settings that change the report. `parallel` does not and is left out.
#[derive(Serialize)]
struct KeyedInputs<'a> {
    request: &'a EvaluationRequest,
    step_minutes: u32,
    coarse_step_fraction: f64,
    fallback_measurement_height: f64,
    fallback_window_start: NaiveTime,
    fallback_window_end: NaiveTime,
}

impl CacheKey {
    pub fn for_request(request: &EvaluationRequest, config: &EngineConfig) -> Result<Self> {
        let inputs = KeyedInputs {
            request,
            step_minutes: config.step_minutes,
            coarse_step_fraction: config.coarse_step_fraction,
            fallback_measurement_height: config.fallback_measurement_height,
            fallback_window_start: config.fallback_window_start,
            fallback_window_end: config.fallback_window_end,
        };
        let bytes =
            serde_json::to_vec(&inputs).map_err(|e| ShadowError::Serialization(e.to_string()))?;
        Ok(Self(xxh3_64(&bytes)))
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

/// Storage for finished reports.
pub trait ReportCache {
    fn get(&self, key: &CacheKey) -> Option<ComplianceReport>;
    fn put(&self, key: CacheKey, report: ComplianceReport);
}

/// Process-local cache.
#[derive(Debug, Default)]
pub struct MemoryReportCache {
    entries: Mutex<HashMap<CacheKey, ComplianceReport>>,
}

impl MemoryReportCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        if let Ok(mut m) = self.entries.lock() {
            m.clear();
        }
    }
}

impl ReportCache for MemoryReportCache {
    fn get(&self, key: &CacheKey) -> Option<ComplianceReport> {
        self.entries.lock().ok()?.get(key).cloned()
    }

    fn put(&self, key: CacheKey, report: ComplianceReport) {
        match self.entries.lock() {
            Ok(mut m) => {
                m.insert(key, report);
            }
            Err(_) => tracing::warn!("Report cache lock poisoned, entry {} dropped", key),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MassingBuilder;
    use crate::sim::solar::GeoCoordinate;
    use chrono::NaiveDate;

    fn request(height: f64) -> EvaluationRequest {
        let massing = MassingBuilder::rectangle(10., 10., (0., 0.))
            .with_height(height)
            .build()
            .unwrap();
        EvaluationRequest::new(
            GeoCoordinate::new(35.6, 139.7).unwrap(),
            NaiveDate::from_ymd_opt(2025, 12, 21).unwrap(),
            massing,
        )
    }

    #[test]
    fn test_key_is_content_based() -> anyhow::Result<()> {
        let config = EngineConfig::default();
        let a = CacheKey::for_request(&request(15.), &config)?;
        let b = CacheKey::for_request(&request(15.), &config)?;
        let c = CacheKey::for_request(&request(16.), &config)?;
        assert_eq!(a, b);
        assert_ne!(a, c);
        Ok(())
    }

    #[test]
    fn test_key_ignores_parallel_toggle() -> anyhow::Result<()> {
        let par = EngineConfig::default();
        let seq = EngineConfig {
            parallel: false,
            ..EngineConfig::default()
        };
        let coarse = EngineConfig {
            step_minutes: 30,
            ..EngineConfig::default()
        };
        let req = request(15.);
        assert_eq!(
            CacheKey::for_request(&req, &par)?,
            CacheKey::for_request(&req, &seq)?
        );
        assert_ne!(
            CacheKey::for_request(&req, &par)?,
            CacheKey::for_request(&req, &coarse)?
        );
        Ok(())
    }

    #[test]
    fn test_key_tracks_advisory_threshold() -> anyhow::Result<()> {
        let strict = EngineConfig::default();
        let lax = EngineConfig {
            coarse_step_fraction: 0.5,
            ..EngineConfig::default()
        };
        let req = request(15.);
        assert_ne!(
            CacheKey::for_request(&req, &strict)?,
            CacheKey::for_request(&req, &lax)?
        );
        Ok(())
    }

    #[test]
    fn test_memory_cache() {
        let cache = MemoryReportCache::new();
        assert!(cache.is_empty());
        let report = crate::Engine::default()
            .evaluate(&request(15.).with_points(crate::PointSet::Explicit(vec![[5., 18.]])))
            .unwrap();
        cache.put(CacheKey(7), report.clone());
        assert_eq!(cache.get(&CacheKey(7)), Some(report));
        assert_eq!(cache.get(&CacheKey(8)), None);
        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_key_display() {
        assert_eq!(format!("{}", CacheKey(0xab)), "00000000000000ab");
    }
}
