/// Content Service Library
///
/// Core content/sharing/reaction subsystem for the TechSpot social platform:
/// profiles publish posts, re-share each other's posts, and attach comments
/// and reactions to any reaction-capable content. The HTTP layer, session
/// handling and schema migrations live outside this crate; it exposes the
/// operation contracts a presentation layer composes.
///
/// # Modules
///
/// - `domain`: Entity model and the polymorphic content views
/// - `repository`: Persistence collaborator (Postgres and in-memory stores)
/// - `services`: Business logic layer, one service per concern
/// - `visibility`: Privacy/visibility evaluation collaborator
/// - `error`: Error types and handling
/// - `config`: Configuration management
pub mod config;
pub mod domain;
pub mod error;
pub mod repository;
pub mod services;
pub mod visibility;

pub use config::Config;
pub use error::{AppError, Result};
