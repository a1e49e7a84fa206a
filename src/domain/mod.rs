// Domain layer: GeoReport v2 records and the transport port.

pub mod model;
pub mod ports;
