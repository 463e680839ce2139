use chrono::NaiveDate;
use log::{debug, error, info};
use std::sync::Arc;
use std::time::Instant;

use ledgerfolio_market_data::PriceOracle;

use super::pipeline_model::{PipelineInputs, PipelineReport};
use crate::errors::Result;
use crate::portfolio::benchmark::{BenchmarkComparison, BenchmarkService};
use crate::portfolio::history::{HoldingsReconstructor, ReconstructionPlan};
use crate::portfolio::ledger::{FlowRuleTable, LedgerBuilder};
use crate::portfolio::performance::{PerformanceCalculator, PerformanceSeries};
use crate::settings::PipelineSettings;
use crate::warnings::{DataQualityWarning, WarningKind};

/// Runs Ledger Builder, Metrics Engine and Reconstructor in order.
///
/// Every run recomputes all tables from the inputs; nothing is cached
/// between runs, so a failed run can simply be retried.
pub struct PortfolioPipeline {
    settings: PipelineSettings,
    oracle: Arc<dyn PriceOracle>,
}

impl PortfolioPipeline {
    pub fn new(settings: PipelineSettings, oracle: Arc<dyn PriceOracle>) -> Result<Self> {
        settings.validate()?;
        Ok(Self { settings, oracle })
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    pub fn valuation_date(&self) -> NaiveDate {
        self.settings.valuation_date()
    }

    /// Builds the ledger (fatal without anchors), queries the oracle for the
    /// reconstruction plan, computes metrics, then assembles holdings with
    /// the cash plug.
    pub async fn run(&self, inputs: &PipelineInputs) -> Result<PipelineReport> {
        let started = Instant::now();
        let as_of = self.valuation_date();

        let builder = LedgerBuilder::new(FlowRuleTable::for_policy(self.settings.flow_policy));
        let ledger_result = builder
            .build(&inputs.transactions, &inputs.anchors, as_of)
            .map_err(|e| {
                error!("Ledger stage failed: {}", e);
                e
            })?;
        let ledger = ledger_result.ledger;
        debug!("Ledger stage done in {:?}", started.elapsed());

        let reconstructor = HoldingsReconstructor::from_settings(&self.settings);
        let plan = match &inputs.holdings {
            Some(snapshot) => reconstructor.plan(&inputs.transactions, snapshot, as_of),
            None => ReconstructionPlan::empty(vec![DataQualityWarning::new(
                WarningKind::MissingInput,
                "holdings",
                "no holdings snapshot, reconstruction skipped",
            )]),
        };

        let market = reconstructor.fetch(&plan, self.oracle.as_ref()).await;
        debug!("Oracle fetch done in {:?}", started.elapsed());

        let performance = PerformanceCalculator::new(self.settings.irr).compute(&ledger);
        debug!("Metrics stage done in {:?}", started.elapsed());

        let holdings = reconstructor.assemble(plan, market, Some(&ledger));

        let mut warnings = ledger_result.warnings;
        warnings.extend(performance.warnings.iter().cloned());
        warnings.extend(holdings.warnings.iter().cloned());

        info!(
            "Pipeline run as of {}: {} ledger days, {} holdings rows, {} warnings in {:?}",
            as_of,
            ledger.len(),
            holdings.len(),
            warnings.len(),
            started.elapsed()
        );

        Ok(PipelineReport {
            ledger,
            performance,
            holdings,
            warnings,
        })
    }

    /// Compares the configured benchmarks over the period of `performance`.
    pub async fn compare_benchmarks(
        &self,
        performance: &PerformanceSeries,
    ) -> Result<BenchmarkComparison> {
        let (Some(start), Some(end)) = (
            performance.summary.period_start_date,
            performance.summary.period_end_date,
        ) else {
            return Ok(BenchmarkComparison {
                benchmarks: Vec::new(),
                warnings: vec![DataQualityWarning::new(
                    WarningKind::MissingInput,
                    "performance",
                    "no performance period, benchmarks skipped",
                )],
            });
        };
        BenchmarkService::new(self.settings.fetch_concurrency)
            .compare(self.oracle.as_ref(), &self.settings.benchmarks, start, end)
            .await
    }
}
