//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (attempts > 0, timeouts > 0)
//! - Check endpoint URLs parse
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>

use crate::config::schema::{AccountChainConfig, GatewayConfig, TronConfig, UtxoChainConfig};

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Check every section and collect all problems.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.polling.max_attempts == 0 {
        errors.push(ValidationError::new("polling.max_attempts", "must be at least 1"));
    }
    if config.retries.max_attempts == 0 {
        errors.push(ValidationError::new("retries.max_attempts", "must be at least 1"));
    }
    if config.retries.base_delay_ms > config.retries.max_delay_ms {
        errors.push(ValidationError::new(
            "retries.base_delay_ms",
            "must not exceed retries.max_delay_ms",
        ));
    }

    for (name, chain) in [
        ("bitcoin", &config.bitcoin),
        ("litecoin", &config.litecoin),
        ("dogecoin", &config.dogecoin),
    ] {
        if let Some(chain) = chain {
            check_utxo(name, chain, &mut errors);
        }
    }
    for (name, chain) in [("ethereum", &config.ethereum), ("bnb", &config.bnb)] {
        if let Some(chain) = chain {
            check_account(name, chain, &mut errors);
        }
    }
    if let Some(tron) = &config.tron {
        check_tron(tron, &mut errors);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_url(field: String, value: &str, errors: &mut Vec<ValidationError>) {
    if value.is_empty() {
        errors.push(ValidationError::new(field, "must not be empty"));
    } else if url::Url::parse(value).is_err() {
        errors.push(ValidationError::new(field, format!("'{}' is not a valid URL", value)));
    }
}

fn check_utxo(name: &str, chain: &UtxoChainConfig, errors: &mut Vec<ValidationError>) {
    check_url(format!("{}.rpc_url", name), &chain.rpc_url, errors);
    if chain.rpc_timeout_secs == 0 {
        errors.push(ValidationError::new(format!("{}.rpc_timeout_secs", name), "must be positive"));
    }
}

fn check_account(name: &str, chain: &AccountChainConfig, errors: &mut Vec<ValidationError>) {
    check_url(format!("{}.rpc_url", name), &chain.rpc_url, errors);
    if chain.rpc_timeout_secs == 0 {
        errors.push(ValidationError::new(format!("{}.rpc_timeout_secs", name), "must be positive"));
    }
    if let Some(contract) = &chain.token_contract {
        if contract.parse::<alloy::primitives::Address>().is_err() {
            errors.push(ValidationError::new(
                format!("{}.token_contract", name),
                format!("'{}' is not an address", contract),
            ));
        }
    }
    if chain.token_decimals > 28 {
        errors.push(ValidationError::new(
            format!("{}.token_decimals", name),
            "must be at most 28",
        ));
    }
}

fn check_tron(tron: &TronConfig, errors: &mut Vec<ValidationError>) {
    check_url("tron.api_url".to_string(), &tron.api_url, errors);
    if tron.usdt_contract.is_empty() {
        errors.push(ValidationError::new("tron.usdt_contract", "must not be empty"));
    }
    if tron.wait_attempts == 0 {
        errors.push(ValidationError::new("tron.wait_attempts", "must be at least 1"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(validate_config(&GatewayConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = GatewayConfig::default();
        config.polling.max_attempts = 0;
        config.bitcoin = Some(UtxoChainConfig {
            rpc_url: String::new(),
            rpc_timeout_secs: 0,
            ..Default::default()
        });
        config.ethereum = Some(AccountChainConfig {
            rpc_url: "not a url".to_string(),
            token_contract: Some("0x123".to_string()),
            ..Default::default()
        });

        let errors = validate_config(&config).unwrap_err();
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(
            fields,
            vec![
                "polling.max_attempts",
                "bitcoin.rpc_url",
                "bitcoin.rpc_timeout_secs",
                "ethereum.rpc_url",
                "ethereum.token_contract",
            ]
        );
    }

    #[test]
    fn test_retry_delays_ordered() {
        let mut config = GatewayConfig::default();
        config.retries.base_delay_ms = 5000;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors[0].field, "retries.base_delay_ms");
    }
}
