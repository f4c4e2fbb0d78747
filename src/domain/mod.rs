// Domain layer: lookup models and ports. Concrete HTTP and storage code lives in adapters.

pub mod model;
pub mod ports;
