//! Per-variant conversion tallies.
//!
//! Each backend keeps its own counters and timing extremes, so a batch or a
//! comparison run can show which tool is failing, which is timing out, and
//! how far apart their wall-clock times are.

use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConversionError;
use crate::models::ConversionOutcome;
use crate::variants::ConverterVariant;

#[derive(Debug, Clone, Copy, Default)]
struct Tally {
    started: u64,
    succeeded: u64,
    failed: u64,
    timed_out: u64,
    output_bytes: u64,
    busy: Duration,
    fastest: Option<Duration>,
    slowest: Option<Duration>,
}

impl Tally {
    fn succeed(&mut self, elapsed: Duration, output_bytes: u64) {
        self.succeeded += 1;
        self.output_bytes += output_bytes;
        self.busy += elapsed;
        self.fastest = Some(self.fastest.map_or(elapsed, |f| f.min(elapsed)));
        self.slowest = Some(self.slowest.map_or(elapsed, |s| s.max(elapsed)));
    }
}

/// Conversion counters, one tally per [`ConverterVariant`].
#[derive(Debug, Default)]
pub struct ConversionMetrics {
    tallies: Mutex<[Tally; ConverterVariant::ALL.len()]>,
}

impl ConversionMetrics {
    /// Empty tallies.
    pub fn new() -> Self {
        Self::default()
    }

    /// Count an attempt that is about to run.
    pub fn record_started(&self, variant: ConverterVariant) {
        self.with_tally(variant, |t| t.started += 1);
    }

    /// Count the result of an attempt. Timeouts also count as failures.
    pub fn record(
        &self,
        variant: ConverterVariant,
        result: &Result<ConversionOutcome, ConversionError>,
    ) {
        self.with_tally(variant, |t| match result {
            Ok(outcome) => t.succeed(outcome.elapsed, outcome.output_bytes),
            Err(e) => {
                t.failed += 1;
                if e.is_timeout() {
                    t.timed_out += 1;
                }
            }
        });
    }

    fn with_tally(&self, variant: ConverterVariant, f: impl FnOnce(&mut Tally)) {
        let mut tallies = self.tallies.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut tallies[variant as usize]);
    }

    /// Totals plus one entry per variant that has been tried.
    pub fn snapshot(&self) -> MetricsSnapshot {
        let tallies = *self.tallies.lock().unwrap_or_else(PoisonError::into_inner);

        let variants: Vec<VariantMetrics> = ConverterVariant::ALL
            .into_iter()
            .zip(tallies)
            .filter(|(_, t)| t.started > 0)
            .map(|(variant, t)| VariantMetrics {
                variant,
                started: t.started,
                succeeded: t.succeeded,
                failed: t.failed,
                timed_out: t.timed_out,
                output_bytes: t.output_bytes,
                mean_ms: (t.succeeded > 0)
                    .then(|| (t.busy.as_millis() / u128::from(t.succeeded)) as u64),
                fastest_ms: t.fastest.map(|d| d.as_millis() as u64),
                slowest_ms: t.slowest.map(|d| d.as_millis() as u64),
            })
            .collect();

        MetricsSnapshot {
            conversions_started: variants.iter().map(|v| v.started).sum(),
            conversions_succeeded: variants.iter().map(|v| v.succeeded).sum(),
            conversions_failed: variants.iter().map(|v| v.failed).sum(),
            conversions_timed_out: variants.iter().map(|v| v.timed_out).sum(),
            total_output_bytes: variants.iter().map(|v| v.output_bytes).sum(),
            variants,
        }
    }
}

/// Tallies for one backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantMetrics {
    pub variant: ConverterVariant,
    pub started: u64,
    pub succeeded: u64,
    /// Includes timeouts.
    pub failed: u64,
    pub timed_out: u64,
    pub output_bytes: u64,
    /// Mean time of successful attempts.
    pub mean_ms: Option<u64>,
    pub fastest_ms: Option<u64>,
    pub slowest_ms: Option<u64>,
}

/// Point-in-time view of [`ConversionMetrics`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub conversions_started: u64,
    pub conversions_succeeded: u64,
    pub conversions_failed: u64,
    pub conversions_timed_out: u64,
    pub total_output_bytes: u64,
    /// Tried variants, in [`ConverterVariant::ALL`] order.
    pub variants: Vec<VariantMetrics>,
}

impl MetricsSnapshot {
    /// Tallies for `variant`, if it was tried.
    pub fn variant(&self, variant: ConverterVariant) -> Option<&VariantMetrics> {
        self.variants.iter().find(|v| v.variant == variant)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::path::PathBuf;

    fn success(
        variant: ConverterVariant,
        millis: u64,
        bytes: u64,
    ) -> Result<ConversionOutcome, ConversionError> {
        Ok(ConversionOutcome {
            variant,
            output: PathBuf::from("out.stl"),
            output_bytes: bytes,
            elapsed: Duration::from_millis(millis),
        })
    }

    #[test]
    fn test_tallies_kept_per_variant() {
        let m = ConversionMetrics::new();
        for millis in [100, 300] {
            m.record_started(ConverterVariant::Occt);
            m.record(ConverterVariant::Occt, &success(ConverterVariant::Occt, millis, 50));
        }
        m.record_started(ConverterVariant::FreeCad);
        m.record(
            ConverterVariant::FreeCad,
            &Err(ConversionError::Killed {
                variant: ConverterVariant::FreeCad,
            }),
        );

        let snap = m.snapshot();
        assert_eq!(snap.conversions_started, 3);
        assert_eq!(snap.conversions_succeeded, 2);
        assert_eq!(snap.conversions_failed, 1);
        assert_eq!(snap.total_output_bytes, 100);

        let occt = snap.variant(ConverterVariant::Occt).expect("occt");
        assert_eq!(occt.mean_ms, Some(200));
        assert_eq!(occt.fastest_ms, Some(100));
        assert_eq!(occt.slowest_ms, Some(300));
        assert_eq!(occt.failed, 0);

        let freecad = snap.variant(ConverterVariant::FreeCad).expect("freecad");
        assert_eq!(freecad.failed, 1);
        assert!(freecad.mean_ms.is_none());
    }

    #[test]
    fn test_timeout_counts_as_failure_for_its_variant() {
        let m = ConversionMetrics::new();
        m.record_started(ConverterVariant::PyVista);
        m.record(
            ConverterVariant::PyVista,
            &Err(ConversionError::Timeout {
                variant: ConverterVariant::PyVista,
                timeout_seconds: 30,
            }),
        );

        let snap = m.snapshot();
        let pyvista = snap.variant(ConverterVariant::PyVista).expect("pyvista");
        assert_eq!((pyvista.failed, pyvista.timed_out), (1, 1));
        assert_eq!(snap.conversions_timed_out, 1);
    }

    #[test]
    fn test_untried_variants_omitted_in_canonical_order() {
        let m = ConversionMetrics::new();
        m.record_started(ConverterVariant::StepLib);
        m.record_started(ConverterVariant::Occt);

        let snap = m.snapshot();
        let order: Vec<ConverterVariant> = snap.variants.iter().map(|v| v.variant).collect();
        assert_eq!(order, [ConverterVariant::Occt, ConverterVariant::StepLib]);
        assert!(snap.variant(ConverterVariant::Assimp).is_none());
    }
}
