pub mod event;
pub mod integrator;
pub mod phase_machine;
pub mod recorder;
pub mod runner;
pub mod sweep;

pub use event::{EventKind, SimEvent};
pub use integrator::rk4_step;
pub use phase_machine::{PhaseStateMachine, StepCheck, Transition};
pub use recorder::{Trajectory, TrajectoryRecorder, TrajectorySample};
pub use runner::{simulate, Flight};
pub use sweep::{water_fraction_sweep, SweepPoint};
