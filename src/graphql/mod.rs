pub mod mutation;
pub mod query;
pub mod schema;
pub mod types;

pub use mutation::*;
pub use query::*;
pub use schema::*;
pub use types::*;
