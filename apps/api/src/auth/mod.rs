//! Authentication for both kinds of principal.
//!
//! Companies log in with email and password and receive a signed, expiring
//! token minted here. Users are authenticated by the external identity
//! provider (see `identity`).

pub mod extract;
pub mod password;
pub mod token;

pub use extract::{AuthCompany, AuthUser, CatalogReader};
pub use token::CompanyTokens;
