//! Contract artifact loading
//!
//! Parses the ignition deployment artifact once at startup. The ABI is
//! treated as opaque configuration; the only interpretation done here is
//! listing function names so a mismatched deployment fails loudly instead
//! of reverting on the first call.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;

/// Functions the registration flow depends on.
pub const REQUIRED_FUNCTIONS: &[&str] = &["rentPrice", "makeCommitment", "commit", "registerName"];

/// Ignition deployment artifact for the registrar contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContractArtifact {
    #[serde(rename = "contractName", default)]
    pub contract_name: String,
    #[serde(default)]
    pub abi: serde_json::Value,
}

impl ContractArtifact {
    /// Load the artifact document from disk.
    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read artifact file {}", path))?;

        serde_json::from_str(&contents).context("Failed to parse artifact JSON")
    }

    /// Names of all functions the ABI exposes.
    pub fn function_names(&self) -> Vec<String> {
        self.abi
            .as_array()
            .map(|entries| {
                entries
                    .iter()
                    .filter(|e| e.get("type").and_then(|t| t.as_str()) == Some("function"))
                    .filter_map(|e| e.get("name").and_then(|n| n.as_str()))
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn has_function(&self, name: &str) -> bool {
        self.function_names().iter().any(|f| f == name)
    }

    /// Functions the flow needs but the ABI does not expose.
    pub fn missing_functions(&self) -> Vec<&'static str> {
        let names = self.function_names();
        REQUIRED_FUNCTIONS
            .iter()
            .copied()
            .filter(|required| !names.iter().any(|f| f == required))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = r#"{
        "contractName": "AtlantaPayments",
        "abi": [
            {"type": "function", "name": "rentPrice", "inputs": []},
            {"type": "function", "name": "makeCommitment", "inputs": []},
            {"type": "function", "name": "commit", "inputs": []},
            {"type": "function", "name": "registerName", "inputs": []},
            {"type": "error", "name": "InsufficientValue", "inputs": []},
            {"type": "event", "name": "NameRegistered", "inputs": []}
        ]
    }"#;

    #[test]
    fn test_parse_and_list_functions() {
        let artifact: ContractArtifact = serde_json::from_str(SAMPLE).unwrap();
        assert_eq!(artifact.contract_name, "AtlantaPayments");

        let functions = artifact.function_names();
        assert_eq!(functions.len(), 4);
        assert!(artifact.has_function("registerName"));
        assert!(!artifact.has_function("NameRegistered"));
        assert!(artifact.missing_functions().is_empty());
    }

    #[test]
    fn test_missing_functions_reported() {
        let artifact: ContractArtifact =
            serde_json::from_str(r#"{"contractName": "X", "abi": []}"#).unwrap();
        assert_eq!(artifact.missing_functions(), REQUIRED_FUNCTIONS);
    }

    #[test]
    fn test_load_from_disk() {
        let path = std::env::temp_dir().join("regflow_artifact_test.json");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let artifact = ContractArtifact::load(path.to_str().unwrap()).unwrap();
        assert_eq!(artifact.contract_name, "AtlantaPayments");

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_load_missing_file_is_error() {
        assert!(ContractArtifact::load("/nonexistent/artifact.json").is_err());
    }
}
