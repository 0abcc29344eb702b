pub(crate) mod bert;

pub use bert::{SiameseBertModel, SiameseBertOptions};
