pub mod d100_pharmacy_overview;
