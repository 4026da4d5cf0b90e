pub mod extraction;
pub mod uncertainty;

pub use extraction::extract_masked_pixels;
pub use uncertainty::UncertaintyModel;
