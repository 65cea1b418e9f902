pub mod handlers;
pub mod terminal;
