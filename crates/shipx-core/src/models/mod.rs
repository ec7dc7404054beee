pub mod config;
pub mod shipment;

pub use config::{BatchConfig, ExportConfig, ExtractionConfig, ShipxConfig};
pub use shipment::{
    Aggregate, DueDate, OrderId, OrderRecord, ShipmentEntry, TrackingId, TradeInDescription,
};
