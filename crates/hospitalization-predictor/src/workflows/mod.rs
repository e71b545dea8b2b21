mod banner;
pub mod prediction;
pub mod reporting;
