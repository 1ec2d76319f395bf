pub mod claims;
pub mod error;
pub mod extractors;
pub mod permissions;
pub mod revocation;
pub mod roles;
pub mod tokens;

pub use claims::Claims;
pub use error::{AuthError, AuthResult};
pub use extractors::AuthContext;
pub use permissions::{can_act, Action, Target};
pub use revocation::RevocationRegistry;
pub use roles::Role;
pub use tokens::{TokenConfig, TokenService, TokenSubject};
