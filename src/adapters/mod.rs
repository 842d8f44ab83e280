// Adapters layer: concrete implementations for external systems (http api, console, storage).

pub mod http;
pub mod report;
pub mod selector;
pub mod storage;

pub use http::SyrveClient;
pub use report::ConsolePresenter;
pub use selector::{ConsoleSelector, FixedSelector};
pub use storage::LocalStorage;
