/// UI module exports
pub mod bubble;
pub mod components;
pub mod settings;
