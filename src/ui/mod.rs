pub mod select;

pub use select::SelectState;
