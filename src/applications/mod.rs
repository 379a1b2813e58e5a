pub mod service;
pub mod store;

pub use service::ApplicationService;
pub use store::{
    InMemoryLoanApplicationStore, LoanApplicationStore, PgLoanApplicationStore, StoreError,
};
