pub mod application;
pub mod profile;

pub use application::{
    ApplicationStats, ApplicationStatus, DocumentKind, JobApplication, JobPosting,
};
pub use profile::UserProfile;
