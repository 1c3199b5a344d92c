// Export components
pub mod graph;
pub mod identity;
pub mod photos;

pub use graph::{CalendarApi, GraphClient};
pub use identity::{IdentityProvider, MicrosoftIdentity};
pub use photos::PhotoStore;
