pub mod jwt;
pub mod middleware;

pub use jwt::{Claims, JwtManager};
pub use middleware::{auth_middleware, authorize_finance_mutation, AuthState};
