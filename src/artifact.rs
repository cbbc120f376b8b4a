//! Compiled contract artifacts.
//!
//! An [`Artifact`] is the static half of a contract binding: the ABI exactly
//! as the compiler emitted it and the init code deployed to create an
//! instance. Artifacts are loaded from Hardhat (`"bytecode": "0x..."`) or
//! Foundry (`"bytecode": {"object": "0x..."}`) JSON and are never modified
//! afterwards.

use std::collections::HashMap;

use alloy_json_abi::{JsonAbi, StateMutability};
use alloy_primitives::{Bytes, Selector};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::{MockCoreError, Result};

/// Kind of an ABI entry, serialized as the JSON `type` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Function,
    Event,
    Error,
    Constructor,
    Fallback,
    Receive,
}

/// A function input/output or event field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Parameter {
    #[serde(default)]
    pub name: String,
    /// Canonical Solidity type, e.g. `uint32` or `tuple[]`.
    #[serde(rename = "type")]
    pub ty: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub internal_type: Option<String>,
    /// Only present on event fields.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub indexed: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub components: Option<Vec<Parameter>>,
}

impl Parameter {
    /// Whether this event field is stored in a log topic.
    pub fn is_indexed(&self) -> bool {
        self.indexed.unwrap_or(false)
    }
}

/// One entry of the interface descriptor, in compiler order.
///
/// Fields that are absent in the source JSON stay absent when the entry is
/// serialized again, so a list of entries round-trips to the original ABI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterfaceEntry {
    #[serde(rename = "type")]
    pub kind: EntryKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inputs: Option<Vec<Parameter>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outputs: Option<Vec<Parameter>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_mutability: Option<StateMutability>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anonymous: Option<bool>,
}

impl InterfaceEntry {
    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or_default()
    }

    pub fn inputs(&self) -> &[Parameter] {
        self.inputs.as_deref().unwrap_or_default()
    }

    pub fn outputs(&self) -> &[Parameter] {
        self.outputs.as_deref().unwrap_or_default()
    }

    /// `nonpayable` when the JSON omits the field, as solc does for
    /// constructors of older compilers.
    pub fn mutability(&self) -> StateMutability {
        self.state_mutability
            .unwrap_or(StateMutability::NonPayable)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawBytecode {
    Hex(Bytes),
    Object { object: Bytes },
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawArtifact {
    #[serde(default)]
    contract_name: Option<String>,
    abi: Value,
    bytecode: Option<RawBytecode>,
}

/// ABI and init code of a compiled contract.
#[derive(Debug, Clone)]
pub struct Artifact {
    name: String,
    entries: Vec<InterfaceEntry>,
    abi: JsonAbi,
    bytecode: Bytes,
}

impl Artifact {
    /// Parses a compiler artifact.
    ///
    /// `fallback_name` is used when the artifact does not carry a
    /// `contractName` (Foundry output).
    ///
    /// # Errors
    ///
    /// - [`MockCoreError::Json`] if the document or its ABI is malformed
    /// - [`MockCoreError::InvalidArtifact`] if it has no bytecode
    /// - [`MockCoreError::DuplicateSelector`] if two functions share a selector
    pub fn from_json(json: &str, fallback_name: &str) -> Result<Self> {
        let raw: RawArtifact = serde_json::from_str(json)?;
        // JsonAbi borrows while deserializing, so it is parsed from text.
        let abi: JsonAbi = serde_json::from_str(&raw.abi.to_string())?;
        let entries: Vec<InterfaceEntry> = serde_json::from_value(raw.abi)?;

        let bytecode = match raw.bytecode {
            Some(RawBytecode::Hex(bytes)) | Some(RawBytecode::Object { object: bytes }) => bytes,
            None => {
                return Err(MockCoreError::InvalidArtifact(
                    "artifact has no bytecode".to_string(),
                ))
            }
        };

        let artifact = Self {
            name: raw
                .contract_name
                .unwrap_or_else(|| fallback_name.to_string()),
            entries,
            abi,
            bytecode,
        };
        artifact.check_selectors()?;

        debug!(
            contract = %artifact.name,
            entries = artifact.entries.len(),
            bytecode_len = artifact.bytecode.len(),
            event = "artifact_loaded"
        );

        Ok(artifact)
    }

    fn check_selectors(&self) -> Result<()> {
        let mut seen: HashMap<Selector, String> = HashMap::new();
        for function in self.abi.functions() {
            let signature = function.signature();
            if let Some(first) = seen.insert(function.selector(), signature.clone()) {
                return Err(MockCoreError::DuplicateSelector {
                    selector: function.selector(),
                    first,
                    second: signature,
                });
            }
        }
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Interface entries in the order the compiler emitted them.
    pub fn entries(&self) -> &[InterfaceEntry] {
        &self.entries
    }

    pub fn abi(&self) -> &JsonAbi {
        &self.abi
    }

    /// Init code, exactly as found in the artifact.
    pub fn bytecode(&self) -> &Bytes {
        &self.bytecode
    }

    /// The ABI as a JSON array, entry order preserved.
    pub fn abi_json(&self) -> Result<Value> {
        Ok(serde_json::to_value(&self.entries)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOKEN: &str = r#"{
        "abi": [
            {"type": "function", "name": "burn", "inputs": [{"name": "amount", "type": "uint256"}], "outputs": [], "stateMutability": "nonpayable"},
            {"type": "event", "name": "Burned", "anonymous": false, "inputs": [{"name": "from", "type": "address", "indexed": true}]}
        ],
        "bytecode": {"object": "0x6080"}
    }"#;

    #[test]
    fn test_foundry_artifact_uses_fallback_name() {
        let artifact = Artifact::from_json(TOKEN, "Token").unwrap();

        assert_eq!(artifact.name(), "Token");
        assert_eq!(artifact.bytecode().as_ref(), &[0x60, 0x80]);
        assert_eq!(artifact.entries().len(), 2);
        assert_eq!(artifact.entries()[0].kind, EntryKind::Function);
        assert_eq!(artifact.entries()[1].kind, EntryKind::Event);
        assert!(artifact.entries()[1].inputs()[0].is_indexed());
    }

    #[test]
    fn test_hardhat_artifact_bytecode_string() {
        let json = r#"{"contractName": "Empty", "abi": [], "bytecode": "0x00"}"#;
        let artifact = Artifact::from_json(json, "Ignored").unwrap();

        assert_eq!(artifact.name(), "Empty");
        assert_eq!(artifact.bytecode().as_ref(), &[0x00]);
        assert!(artifact.entries().is_empty());
    }

    #[test]
    fn test_missing_bytecode_is_rejected() {
        let json = r#"{"abi": []}"#;
        let result = Artifact::from_json(json, "Interface");

        assert!(matches!(
            result.unwrap_err(),
            MockCoreError::InvalidArtifact(_)
        ));
    }

    #[test]
    fn test_colliding_selectors_are_rejected() {
        // burn(uint256) and collate_propagate_storage(bytes16) both hash to 0x42966c68.
        let json = r#"{
            "abi": [
                {"type": "function", "name": "burn", "inputs": [{"name": "", "type": "uint256"}], "outputs": [], "stateMutability": "nonpayable"},
                {"type": "function", "name": "collate_propagate_storage", "inputs": [{"name": "", "type": "bytes16"}], "outputs": [], "stateMutability": "nonpayable"}
            ],
            "bytecode": "0x"
        }"#;

        match Artifact::from_json(json, "Clash").unwrap_err() {
            MockCoreError::DuplicateSelector { selector, .. } => {
                assert_eq!(selector, Selector::from([0x42, 0x96, 0x6c, 0x68]));
            }
            other => panic!("expected DuplicateSelector, got {other:?}"),
        }
    }

    #[test]
    fn test_omitted_mutability_defaults_to_nonpayable() {
        let entry: InterfaceEntry =
            serde_json::from_str(r#"{"type": "constructor", "inputs": []}"#).unwrap();

        assert_eq!(entry.mutability(), StateMutability::NonPayable);
        assert_eq!(entry.name(), "");
        assert!(entry.outputs().is_empty());
    }
}
