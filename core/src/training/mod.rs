//! training/mod.rs
//! Configuration training over a sample of the trace.
//!
//! Responsibilities:
//! - Build the baseline graph template (entry transform + codec candidates)
//! - Delegate candidate search to an `Optimizer`
//! - Select the top-ranked configuration and persist it
//!
//! Non-responsibilities:
//! - Running the compression pipeline
//! - Inventing new search strategies (the built-in optimizer scores by trial)

pub mod types;
pub mod optimizer;
pub mod trial;
pub mod driver;

pub use types::{
    GraphTemplate,
    TrainError,
    TrainParams,
};
pub use optimizer::Optimizer;
pub use trial::{
    Score,
    TrialOptimizer,
    TRADEOFF_WEIGHTS,
};
pub use driver::{
    load_sample,
    train_config,
    train_file,
};
