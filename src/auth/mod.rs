//! Authentication and authorization module

pub mod jwt;
pub mod middleware;
pub mod password;

pub use jwt::JwtService;
pub use middleware::AuthContext;
