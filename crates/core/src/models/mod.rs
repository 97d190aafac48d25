pub mod chart;
pub mod coin;
pub mod detail;
pub mod price;
pub mod settings;
