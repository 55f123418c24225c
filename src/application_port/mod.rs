mod passport_service;

pub use passport_service::*;
