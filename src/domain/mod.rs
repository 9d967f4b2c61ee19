// Domain layer: request/response models and the ports the transport and front ends implement.

pub mod model;
pub mod ports;
