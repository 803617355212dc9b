pub mod aerodynamics;
pub mod atmosphere;
pub mod gas;
pub mod thrust;

pub use aerodynamics::drag_force;
pub use atmosphere::Environment;
pub use gas::ExpansionLaw;
pub use thrust::Propulsion;
