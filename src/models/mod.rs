//! Data models for the weather decision activity
//!
//! - Activity: Journey Builder request/response payloads
//! - Location: location input variants and resolved coordinates
//! - Weather: normalized observation and branch outcome

pub mod activity;
pub mod location;
pub mod weather;

pub use activity::{ActivityPayload, ExecuteResponse, InArguments, ReceivedLocation, WeatherSummary};
pub use location::{
    LocationFieldType, LocationInput, LocationQuery, OpaqueField, OpaqueValue, ResolvedCoordinate,
    ResolvedLocation,
};
pub use weather::{BranchResult, WeatherObservation};
