mod metadata_service;

pub use metadata_service::*;
