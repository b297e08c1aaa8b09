pub mod chart;
pub mod currencies;
pub mod plot;
pub mod setup;
pub mod ui;
