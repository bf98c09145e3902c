pub mod article_handlers;
pub mod delivery;
pub mod service_handler;
