//! egui rendering: side panel, data input, table preview and charts.

pub mod panels;
pub mod plot;
pub mod table;
