//! Command execution for frontfill

pub mod dispatch;
pub mod report;
