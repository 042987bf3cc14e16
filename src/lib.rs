//! yardtrack - Motorcycle yard tracking
//!
//! An in-memory CRUD service for yards, motorcycles, markers, positions,
//! distance measurements and users, exposed over a JWT-protected REST API.
//! Its core is distance prediction: every request refits a linear model on
//! the stored measurements and predicts the distance between a position
//! and a fixed marker.
//!
//! # Modules
//!
//! - [`domain`] - Entities and validated input payloads
//! - [`store`] - Concurrent in-memory tables, paging and JSON snapshots
//! - [`prediction`] - Feature extraction, OLS/SGD trainers and the training worker
//! - [`auth`] - Password hashing, JWT tokens and the bearer middleware
//! - [`server`] - HTTP server with REST API
//! - [`cli`] - Command-line interface

pub mod error;

pub mod domain;
pub mod store;
pub mod prediction;

pub mod auth;
pub mod server;
pub mod cli;

pub use error::{Result, YardError};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::error::{Result, YardError};

    pub use crate::domain::{
        DistanceMeasurement, FixedMarker, Id, MobileMarker, Motorcycle, Position, Role, User,
        UserView, Yard,
    };

    pub use crate::store::{Page, PageRequest, Store, StoreSnapshot};

    pub use crate::prediction::{
        FeatureExtractor, FeatureVector, FittedModel, MissingCoordinatePolicy, OlsTrainer,
        PredictionConfig, PredictionRequest, PredictionResult, PredictionService, SgdTrainer,
        Trainer, TrainerKind, TrainingSample,
    };

    pub use crate::auth::{AuthService, JwtConfig, PasswordHasher, TokenService};

    pub use crate::server::{create_router, AppState, ServerConfig};
}
