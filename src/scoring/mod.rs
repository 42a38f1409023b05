pub mod cancel;
pub mod engine;
pub mod measurement;
pub mod request;
pub mod types;

pub use cancel::CancelFlag;
pub use engine::{ScoreEngine, ScoreError};
pub use measurement::{default_rules, MeasurementKind, TypeRules};
pub use request::{check_request, parse_measurement, RequestError};
pub use types::{Measurement, ScoreResult, ValidationError, ValidationErrorKind};
