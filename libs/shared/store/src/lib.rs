pub mod table;

pub use table::{Revision, StoreError, Table, TableFile};
