pub mod certifier;
pub mod lesson;
pub mod location;
pub mod request;
pub mod status;
pub mod student;
