pub mod certificate_requests;
pub mod health;
