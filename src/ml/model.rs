use burn::{
    nn::{Dropout, DropoutConfig, Linear, LinearConfig},
    prelude::*,
    tensor::activation::{relu, sigmoid},
};

// NOTE: #[derive(Config)] already generates Clone and Serialize/Deserialize
// internally — do NOT add them again or you get conflicting impls.
#[derive(Config, Debug)]
pub struct RegressorConfig {
    /// Width of the encoded input vector (context.dimensions)
    pub input_dim: usize,
    #[config(default = 128)]
    pub hidden1: usize,
    #[config(default = 64)]
    pub hidden2: usize,
    #[config(default = 32)]
    pub hidden3: usize,
    #[config(default = 0.2)]
    pub dropout: f64,
}

impl RegressorConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> ProductivityRegressor<B> {
        ProductivityRegressor {
            input: LinearConfig::new(self.input_dim, self.hidden1).init(device),
            dropout1: DropoutConfig::new(self.dropout).init(),
            hidden1: LinearConfig::new(self.hidden1, self.hidden2).init(device),
            dropout2: DropoutConfig::new(self.dropout).init(),
            hidden2: LinearConfig::new(self.hidden2, self.hidden3).init(device),
            output: LinearConfig::new(self.hidden3, 1).init(device),
        }
    }
}

/// dense(relu) → dropout → dense(relu) → dropout → dense(relu) → dense(sigmoid)
///
/// The sigmoid bounds the output to [0, 1], matching the
/// min-max normalised target.
#[derive(Module, Debug)]
pub struct ProductivityRegressor<B: Backend> {
    pub input: Linear<B>,
    pub dropout1: Dropout,
    pub hidden1: Linear<B>,
    pub dropout2: Dropout,
    pub hidden2: Linear<B>,
    pub output: Linear<B>,
}

impl<B: Backend> ProductivityRegressor<B> {
    /// features: [batch, input_dim] → scores: [batch, 1]
    pub fn forward(&self, features: Tensor<B, 2>) -> Tensor<B, 2> {
        let x = self.dropout1.forward(relu(self.input.forward(features)));
        let x = self.dropout2.forward(relu(self.hidden1.forward(x)));
        let x = relu(self.hidden2.forward(x));
        sigmoid(self.output.forward(x))
    }
}
