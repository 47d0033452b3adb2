// Data models for the Diliguard research workflow

pub mod account;
pub mod research;

pub use account::{Account, AccountUsage};
pub use research::{
    EntityType, ResearchRecord, ResearchStatus, ResearchSubmission, RiskCategoryScore, RiskReport,
};
