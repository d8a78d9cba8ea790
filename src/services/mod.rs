//! Service layer: session lifecycle, user management, token codec and the
//! notification gateway.

mod accounts;
mod email;
pub mod jwt;
mod session;

pub use accounts::AccountService;
pub use email::{EmailProvider, MockEmailService, SmtpEmailService};
pub use jwt::{AccessTokenClaims, JwtService, RefreshTokenClaims, SessionTokens, TokenError};
pub use session::SessionManager;
