// ============================================================
// Layer 4 — Dataset Builder
// ============================================================
// Encodes every record into two parallel matrices:
//
//   inputs  N × dimensions   (row-major, one encoded record per row)
//   labels  N × 1            (normalised target per row)
//
// and remembers the positional split point between the
// training and validation partitions.
//
// The partitions are exposed as RegressionDataset values,
// which implement Burn's Dataset trait so the DataLoader can
// call .get(index) and .len() on them.

use burn::data::dataset::Dataset;
use serde::{Deserialize, Serialize};

use crate::data::encoder::{encode, encode_target};
use crate::data::splitter::split_index;
use crate::domain::encoding::EncodingContext;
use crate::domain::error::PipelineError;
use crate::domain::record::Record;

/// One encoded row and its label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionSample {
    pub features: Vec<f32>,
    pub target: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EncodedDataset {
    inputs: Vec<f32>,
    labels: Vec<f32>,
    dimensions: usize,
    split_index: usize,
}

impl EncodedDataset {
    /// Encode `records` with `context` and split at floor(N * train_fraction).
    pub fn build(
        records: &[Record],
        context: &EncodingContext,
        train_fraction: f64,
    ) -> Result<Self, PipelineError> {
        let mut inputs = Vec::with_capacity(records.len() * context.dimensions);
        let mut labels = Vec::with_capacity(records.len());

        for record in records {
            inputs.extend(encode(record, context)?);
            labels.push(encode_target(record, context)?);
        }

        Ok(Self {
            inputs,
            labels,
            dimensions: context.dimensions,
            split_index: split_index(records.len(), train_fraction),
        })
    }

    pub fn rows(&self) -> usize {
        self.labels.len()
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    pub fn split_index(&self) -> usize {
        self.split_index
    }

    pub fn row(&self, index: usize) -> Option<&[f32]> {
        let start = index.checked_mul(self.dimensions)?;
        self.inputs.get(start..start + self.dimensions)
    }

    pub fn labels(&self) -> &[f32] {
        &self.labels
    }

    fn samples(&self, rows: std::ops::Range<usize>) -> Vec<RegressionSample> {
        rows.filter_map(|i| {
            Some(RegressionSample {
                features: self.row(i)?.to_vec(),
                target: self.labels[i],
            })
        })
        .collect()
    }

    /// Rows [0, split_index).
    pub fn train_partition(&self) -> RegressionDataset {
        RegressionDataset::new(self.samples(0..self.split_index))
    }

    /// Rows [split_index, N).
    pub fn validation_partition(&self) -> RegressionDataset {
        RegressionDataset::new(self.samples(self.split_index..self.rows()))
    }
}

pub struct RegressionDataset {
    samples: Vec<RegressionSample>,
}

impl RegressionDataset {
    pub fn new(samples: Vec<RegressionSample>) -> Self {
        Self { samples }
    }
}

impl Dataset<RegressionSample> for RegressionDataset {
    fn get(&self, index: usize) -> Option<RegressionSample> {
        self.samples.get(index).cloned()
    }

    fn len(&self) -> usize {
        self.samples.len()
    }
}
