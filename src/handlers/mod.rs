/// Web API Handlers
///
/// This module contains the handlers for the RESTful API endpoints.
/// Each handler is responsible for processing a specific type of HTTP request,
/// extracting the necessary data, resolving the acting principal, calling the
/// appropriate form and repository functions, and returning a properly
/// formatted response.

mod kind_handlers;
mod media_handlers;
mod reference_handlers;
mod review_handlers;
mod settings_handlers;

// Re-export all handlers
pub use kind_handlers::*;
pub use media_handlers::*;
pub use reference_handlers::*;
pub use review_handlers::*;
pub use settings_handlers::*;
