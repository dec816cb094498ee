// ============================================================
// Layer 4 — Regression Batcher
// ============================================================
// Implements Burn's Batcher trait to stack a Vec of
// RegressionSamples into two tensors:
//
//   features: [batch_size, dimensions]
//   targets:  [batch_size, 1]
//
// All encoded rows have the same width (context.dimensions),
// so no padding is needed: flatten, then reshape.
//
// Reference: Burn Book §4 (Batcher)

use burn::{data::dataloader::batcher::Batcher, prelude::*};

use crate::data::dataset::RegressionSample;

#[derive(Debug, Clone)]
pub struct RegressionBatch<B: Backend> {
    pub features: Tensor<B, 2>,
    pub targets: Tensor<B, 2>,
}

/// Holds the target device so tensors are created on the right backend.
#[derive(Clone, Debug)]
pub struct RegressionBatcher<B: Backend> {
    pub device: B::Device,
}

impl<B: Backend> RegressionBatcher<B> {
    pub fn new(device: B::Device) -> Self {
        Self { device }
    }
}

impl<B: Backend> Batcher<RegressionSample, RegressionBatch<B>> for RegressionBatcher<B> {
    fn batch(&self, items: Vec<RegressionSample>) -> RegressionBatch<B> {
        let batch_size = items.len();
        let dimensions = items.first().map_or(0, |s| s.features.len());

        let features_flat: Vec<f32> = items
            .iter()
            .flat_map(|s| s.features.iter().copied())
            .collect();
        let targets: Vec<f32> = items.iter().map(|s| s.target).collect();

        let features = Tensor::<B, 1>::from_floats(features_flat.as_slice(), &self.device)
            .reshape([batch_size, dimensions]);
        let targets = Tensor::<B, 1>::from_floats(targets.as_slice(), &self.device)
            .reshape([batch_size, 1]);

        RegressionBatch { features, targets }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    #[test]
    fn test_batch_shapes_and_values() {
        let batcher = RegressionBatcher::<NdArray>::new(Default::default());
        let batch = batcher.batch(vec![
            RegressionSample { features: vec![0.0, 0.5, 1.0], target: 0.25 },
            RegressionSample { features: vec![1.0, 0.0, 0.0], target: 0.75 },
        ]);

        assert_eq!(batch.features.dims(), [2, 3]);
        assert_eq!(batch.targets.dims(), [2, 1]);

        let targets = batch.targets.into_data().to_vec::<f32>().unwrap();
        assert_eq!(targets, vec![0.25f32, 0.75]);
        let features = batch.features.into_data().to_vec::<f32>().unwrap();
        assert_eq!(features, vec![0.0f32, 0.5, 1.0, 1.0, 0.0, 0.0]);
    }
}
