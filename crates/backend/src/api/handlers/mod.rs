// Dashboard handlers (d100)
pub mod d100_pharmacy_overview;
