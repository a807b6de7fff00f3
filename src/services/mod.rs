pub mod optimization;
pub mod topology;
pub mod worker;
