pub mod health_handlers;
pub mod queue_handlers;
pub mod subtitle_handlers;
pub mod webhook_handlers;
