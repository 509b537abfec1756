pub mod etl;
pub mod recommendation;
pub mod serving;
pub mod simulator;
pub mod store;
pub mod training;
