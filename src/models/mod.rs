pub mod bed;
pub mod job;
pub mod loaders;
pub mod params;
pub mod payload;
pub mod task;

pub use bed::{CoordinateRange, CoordinateSet};
pub use job::DesignJob;
pub use loaders::{load_all_toml_files, load_toml_to_design_job};
pub use params::{Constraint, ConstraintTable, ParameterSet};
pub use payload::RequestPayload;
pub use task::{TaskHandle, TaskResult};
