pub mod chart;
pub mod rainfall;
