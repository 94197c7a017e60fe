//! The validation board: drives a comparator panel from parsing to the
//! report documents.

pub mod state;
pub mod validation_board;

pub use state::{BoardState, Category};
pub use validation_board::ValidationBoard;
