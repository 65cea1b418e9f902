pub mod draft;
pub mod national_id;
pub mod registration;
