pub mod registration_form;
pub mod submission;
