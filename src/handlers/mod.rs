pub mod certificate_handlers;
pub mod health_handlers;
pub mod validation_handlers;
