pub mod fallback;
pub mod feed;
pub mod filter;
pub mod normalizer;
pub mod scheduler;
pub mod source;

pub use fallback::fallback_transactions;
pub use feed::WhaleFeed;
pub use filter::filter_transactions;
pub use normalizer::{normalize, normalize_batch, RawTransaction};
pub use scheduler::{RefreshHandle, RefreshScheduler, RefreshSettings};
pub use source::{BitquerySource, OfflineSource, RestSource, TransactionSource};
