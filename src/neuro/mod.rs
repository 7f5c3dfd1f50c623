pub mod builder;
pub mod mechanism;
pub mod model;
pub mod region;
pub mod section;
