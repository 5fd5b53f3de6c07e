#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Build planning and execution for vintner
//!
//! [`plan`] composes a [`BuildRequest`], resolved layout, selected
//! source, and toolchain decision into an ordered list of external
//! process steps. [`exec`] runs that list strictly in order with
//! fail-fast semantics, so an outer ranged/bisect loop can trust the
//! first reported failure.
//!
//! [`BuildRequest`]: vintner_types::BuildRequest

pub mod exec;
pub mod plan;

pub use exec::{BuildOutcome, ExecutionDriver, FailedStep};
pub use plan::{build_plan, BuildPlan, Step, StepKind};
