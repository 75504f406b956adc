pub mod password;
pub use password::PasswordManager;

pub mod tokens;
pub use tokens::{Claims, TokenError, TokenIssuer, TokenKind};

pub mod user_service;
pub mod user_service_impl;
pub use user_service::{UserError, UserService};
pub use user_service_impl::SeaOrmUserService;

pub mod auth_service;
pub mod auth_service_impl;
pub use auth_service::{AuthError, AuthService, TokenPair};
pub use auth_service_impl::SeaOrmAuthService;
