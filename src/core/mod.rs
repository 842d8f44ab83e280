pub mod aggregator;
pub mod audit;
pub mod date_chunker;
pub mod phone;
pub mod summary;

pub use crate::domain::model::{DateWindow, Order, Organization, SummaryRecord};
pub use crate::domain::ports::{
    ConfigProvider, CredentialProvider, OrderFetcher, OrganizationLister, Presenter, Selector,
    Storage,
};
pub use crate::utils::error::Result;
