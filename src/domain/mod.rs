// Domain layer: records, signals and the ports the pipeline is built against.

pub mod model;
pub mod ports;
