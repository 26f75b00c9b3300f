//! Edits as values: every change to a sheet is a [`Transaction`] applied to an immutable
//! snapshot, producing the next snapshot.

pub mod history;
pub mod state;
pub mod transaction;

pub use history::History;
pub use state::GridState;
pub use transaction::Transaction;

#[cfg(test)]
mod test;
