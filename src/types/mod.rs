//! Public types for the Huginn API.

mod generate;
mod outcome;
mod request;

pub use generate::{
    DEFAULT_MAX_OUTPUT_TOKENS, DEFAULT_PROVIDER_TIMEOUT, DEFAULT_TEMPERATURE, GenerateOptions,
    ProviderDescriptor,
};
pub use outcome::{AttemptFailure, FailureKind, Generated, GenerationOutcome};
pub use request::{CacheKey, GenerationRequest, ParamValue, Parameters, canonical_parameters};
