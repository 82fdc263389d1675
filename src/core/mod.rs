pub mod classifier;
pub mod etl;
pub mod map_reduce;
pub mod mapper;
pub mod pipeline;
pub mod reducer;

pub use crate::domain::model::{
    AgeCategory, AgeHistogram, CategorizedSignal, IntermediateSignal, Player,
};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
