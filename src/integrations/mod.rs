//! External service integrations.

pub mod risk_client {
    pub use crate::risk_client::*;
}
