pub mod medicine;
pub mod objective;
pub mod sales;
