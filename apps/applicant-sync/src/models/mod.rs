pub mod applicant;
pub mod document;
pub mod record;
