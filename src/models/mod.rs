pub mod listing;
pub mod response;
pub mod transaction;

pub use listing::*;
pub use response::*;
pub use transaction::*;
