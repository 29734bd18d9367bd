pub mod certificate_service;
pub mod checksum;
pub mod validation_service;
