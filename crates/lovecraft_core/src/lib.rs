pub mod dashboard;
pub mod domain;
pub mod matching;
pub mod ports;
pub mod reveal;
pub mod theme;

pub use dashboard::{Badge, DashboardStats};
pub use domain::{
    AuthSession, Surprise, SurpriseContent, User, UserCredentials, ValidationError,
    MAX_FINAL_MESSAGE_CHARS,
};
pub use ports::{AccountStore, BlobStorage, PortError, PortResult, SurpriseStore};
pub use reveal::{RevealController, RevealError, RevealStep, RevealView, StepOutcome};
pub use theme::{Theme, ThemeStyle};
