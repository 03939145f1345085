use moka::ops::compute::Op;
use moka::sync::Cache;
use std::sync::Arc;

use crate::error::AppError;
use crate::models::{CsvData, DatasetInfo};
use crate::services::analysis::types::{ChartType, ColumnSummary};

/// Analysed datasets kept in memory for the dashboard. Entries are evicted
/// once `capacity` is reached and nothing survives a restart.
#[derive(Clone)]
pub struct DatasetStore {
    datasets: Cache<String, Arc<CsvData>>,
}

impl DatasetStore {
    pub fn new(capacity: u64) -> Self {
        Self {
            datasets: Cache::new(capacity),
        }
    }

    pub fn insert(&self, data: CsvData) -> Arc<CsvData> {
        let data = Arc::new(data);
        tracing::info!("Storing dataset {} ({})", data.id, data.filename);
        self.datasets.insert(data.id.clone(), Arc::clone(&data));
        data
    }

    pub fn get(&self, id: &str) -> Result<Arc<CsvData>, AppError> {
        self.datasets
            .get(id)
            .ok_or_else(|| AppError::NotFound(format!("Dataset {} not found", id)))
    }

    pub fn list(&self) -> Vec<DatasetInfo> {
        let mut infos: Vec<DatasetInfo> = self
            .datasets
            .iter()
            .map(|(_, data)| DatasetInfo::from(data.as_ref()))
            .collect();
        infos.sort_by(|a, b| a.filename.cmp(&b.filename).then_with(|| a.id.cmp(&b.id)));
        infos
    }

    pub fn remove(&self, id: &str) -> Result<(), AppError> {
        match self.datasets.remove(id) {
            Some(data) => {
                tracing::info!("Removed dataset {} ({})", data.id, data.filename);
                Ok(())
            }
            None => Err(AppError::NotFound(format!("Dataset {} not found", id))),
        }
    }

    /// Replaces the recommended chart of one column. Every other summary
    /// field stays as analysed. The update runs under the cache's per-key lock.
    pub fn override_chart(
        &self,
        id: &str,
        column: &str,
        chart: ChartType,
    ) -> Result<ColumnSummary, AppError> {
        let mut outcome = Err(AppError::NotFound(format!("Dataset {} not found", id)));

        self.datasets.entry_by_ref(id).and_compute_with(|entry| {
            let Some(entry) = entry else {
                return Op::Nop;
            };
            let mut updated = CsvData::clone(entry.value());
            let Some(summary) = updated.summary.iter_mut().find(|s| s.name == column) else {
                outcome = Err(AppError::NotFound(format!(
                    "Column {} not found in dataset {}",
                    column, id
                )));
                return Op::Nop;
            };

            tracing::info!(
                "Overriding chart for {}/{}: {} -> {}",
                id,
                column,
                summary.recommended_chart,
                chart
            );
            summary.recommended_chart = chart;
            outcome = Ok(summary.clone());
            Op::Put(Arc::new(updated))
        });

        outcome
    }
}
