pub mod config;
pub mod controller;
pub mod document_model;
pub mod sync;
