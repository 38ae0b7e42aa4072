pub mod analysis;
pub mod panels;
pub mod plot;
pub mod reports;
pub mod table;
