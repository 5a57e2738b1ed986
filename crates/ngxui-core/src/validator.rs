// ABOUTME: The Credential Validator seam consumed by the auth gate, plus in-memory implementations.
// ABOUTME: A validator reports how many live sessions match a token; fewer than one means reject.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::credential::Credential;

/// Errors a validator backend can raise. The gate treats every error as a rejection.
#[derive(Debug, Error)]
pub enum ValidatorError {
    #[error("token backend unavailable: {0}")]
    Backend(String),
}

/// Checks a credential against the session store.
///
/// `validate` returns the number of sessions matching the credential. A count
/// below 1 means unknown, expired, or invalid.
#[async_trait]
pub trait CredentialValidator: Send + Sync {
    async fn validate(&self, credential: &Credential) -> Result<i64, ValidatorError>;
}

/// A fixed set of accepted tokens, e.g. an operator token from the environment.
#[derive(Debug, Default, Clone)]
pub struct StaticTokens {
    tokens: HashSet<String>,
}

impl StaticTokens {
    pub fn new<I, T>(tokens: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self {
            tokens: tokens
                .into_iter()
                .map(Into::into)
                .filter(|t: &String| !t.is_empty())
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

#[async_trait]
impl CredentialValidator for StaticTokens {
    async fn validate(&self, credential: &Credential) -> Result<i64, ValidatorError> {
        Ok(i64::from(self.tokens.contains(credential.as_str())))
    }
}

/// Sums the counts of several validators. Any backend error aborts the check.
#[derive(Default, Clone)]
pub struct ValidatorChain {
    validators: Vec<Arc<dyn CredentialValidator>>,
}

impl ValidatorChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, validator: Arc<dyn CredentialValidator>) -> Self {
        self.validators.push(validator);
        self
    }

    pub fn len(&self) -> usize {
        self.validators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }
}

#[async_trait]
impl CredentialValidator for ValidatorChain {
    async fn validate(&self, credential: &Credential) -> Result<i64, ValidatorError> {
        let mut total = 0i64;
        for validator in &self.validators {
            total = total.saturating_add(validator.validate(credential).await?);
        }
        Ok(total)
    }
}
