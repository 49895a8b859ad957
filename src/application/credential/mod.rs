//! Credential use cases

pub mod use_cases;

pub use use_cases::{
    CreateApiKeyUseCase, CredentialValidation, DeactivateApiKeyUseCase, IssuedApiKey,
    RecordUsageUseCase, ValidateApiKeyUseCase,
};
