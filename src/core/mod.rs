// Domain-layer modules and shared errors/models
pub mod models {
    pub use crate::models::*;
}

pub mod validation {
    pub use crate::validation::*;
}

pub mod repository {
    pub use crate::repository::*;
}

pub mod errors {
    pub use crate::errors::*;
}
