pub mod agreement;
pub mod award;
pub mod eligibility;
pub mod money;
pub mod overaward;
pub mod ports;
pub mod remittance;
pub mod schedule;
