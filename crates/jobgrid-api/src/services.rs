//! Domain services.

pub mod applications;

pub use applications::{
    ApplicationLifecycle, ApplicationWithJob, JobWithCompany, PopulatedJob, ResolvedApplication,
};
