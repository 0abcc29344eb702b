pub mod pair_classification;
pub(crate) mod stats;
pub(crate) mod utils;
