//! Interface introspection.
//!
//! [`Interface`] is the read-only view of a contract's ABI used to encode
//! calls and decode results independently of any deployed instance. It is
//! cheap to clone and every clone observes the same immutable artifact.

use std::sync::Arc;

use alloy_dyn_abi::{DynSolValue, FunctionExt, JsonAbiExt};
use alloy_json_abi::{Event, Function, JsonAbi, StateMutability};
use alloy_primitives::{Bytes, Selector, B256};

use crate::artifact::{Artifact, EntryKind, InterfaceEntry};
use crate::error::{MockCoreError, Result};

/// Interface descriptor accessor for a compiled contract.
///
/// Functions and events can be looked up by bare name (`"dispatch"`) or by
/// full signature (`"dispatch(uint32,bytes32,bytes)"`). A bare name that
/// matches several overloads is rejected as ambiguous.
#[derive(Debug, Clone)]
pub struct Interface {
    artifact: Arc<Artifact>,
}

impl PartialEq for Interface {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.artifact, &other.artifact)
            || (self.artifact.name() == other.artifact.name()
                && self.artifact.entries() == other.artifact.entries())
    }
}

impl Eq for Interface {}

impl Interface {
    pub fn new(artifact: Arc<Artifact>) -> Self {
        Self { artifact }
    }

    /// Contract name the interface was compiled from.
    pub fn name(&self) -> &str {
        self.artifact.name()
    }

    /// Entries in compiler order.
    pub fn entries(&self) -> &[InterfaceEntry] {
        self.artifact.entries()
    }

    /// The parsed ABI, for use with the wider Alloy ecosystem.
    pub fn abi(&self) -> &JsonAbi {
        self.artifact.abi()
    }

    pub(crate) fn artifact(&self) -> &Artifact {
        &self.artifact
    }

    /// Canonical signatures of all functions, in compiler order.
    pub fn function_signatures(&self) -> Vec<String> {
        self.entries()
            .iter()
            .filter(|entry| entry.kind == EntryKind::Function)
            .map(|entry| {
                let types: Vec<&str> = entry.inputs().iter().map(|p| p.ty.as_str()).collect();
                self.abi()
                    .function(entry.name())
                    .into_iter()
                    .flatten()
                    .find(|f| f.inputs.iter().map(|p| p.ty.as_str()).eq(types.iter().copied()))
                    .map(Function::signature)
                    .unwrap_or_else(|| format!("{}({})", entry.name(), types.join(",")))
            })
            .collect()
    }

    /// Looks up a function by name or signature.
    pub fn function(&self, name: &str) -> Result<&Function> {
        if name.contains('(') {
            let wanted: String = name.split_whitespace().collect();
            return self
                .abi()
                .functions()
                .find(|f| f.signature() == wanted)
                .ok_or_else(|| MockCoreError::UnknownFunction {
                    name: name.to_string(),
                });
        }

        match self.abi().function(name).map(Vec::as_slice) {
            Some([function]) => Ok(function),
            Some(overloads) if !overloads.is_empty() => Err(MockCoreError::AmbiguousFunction {
                name: name.to_string(),
                candidates: overloads.iter().map(Function::signature).collect(),
            }),
            _ => Err(MockCoreError::UnknownFunction {
                name: name.to_string(),
            }),
        }
    }

    /// Looks up an event by name or signature.
    ///
    /// A bare name shared by overloaded events is ambiguous; pass the full
    /// signature instead.
    pub fn event(&self, name: &str) -> Result<&Event> {
        if name.contains('(') {
            let wanted: String = name.split_whitespace().collect();
            return self
                .abi()
                .events()
                .find(|e| e.signature() == wanted)
                .ok_or_else(|| MockCoreError::UnknownEvent {
                    name: name.to_string(),
                });
        }

        match self.abi().event(name).map(Vec::as_slice) {
            Some([event]) => Ok(event),
            Some(overloads) if !overloads.is_empty() => Err(MockCoreError::AmbiguousEvent {
                name: name.to_string(),
                candidates: overloads.iter().map(Event::signature).collect(),
            }),
            _ => Err(MockCoreError::UnknownEvent {
                name: name.to_string(),
            }),
        }
    }

    /// 4-byte selector of a function.
    pub fn selector(&self, function: &str) -> Result<Selector> {
        Ok(self.function(function)?.selector())
    }

    /// First log topic of a non-anonymous event.
    pub fn event_topic(&self, event: &str) -> Result<B256> {
        Ok(self.event(event)?.selector())
    }

    /// Calldata for `function` with `args`: selector followed by the
    /// ABI-encoded arguments.
    pub fn encode_function_data(&self, function: &str, args: &[DynSolValue]) -> Result<Bytes> {
        let encoded = self.function(function)?.abi_encode_input(args)?;
        Ok(encoded.into())
    }

    /// Decodes the return data of `function`.
    pub fn decode_function_result(&self, function: &str, data: &[u8]) -> Result<Vec<DynSolValue>> {
        Ok(self.function(function)?.abi_decode_output(data)?)
    }

    /// Whether `function` accepts ether.
    pub fn is_payable(&self, function: &str) -> Result<bool> {
        Ok(self.function(function)?.state_mutability == StateMutability::Payable)
    }

    /// Whether the constructor accepts ether. Contracts without an explicit
    /// constructor get a non-payable default one.
    pub fn constructor_is_payable(&self) -> bool {
        self.abi()
            .constructor()
            .is_some_and(|c| c.state_mutability == StateMutability::Payable)
    }

    /// Init code followed by the ABI-encoded constructor arguments.
    ///
    /// # Errors
    ///
    /// [`MockCoreError::ConstructorArguments`] if the number of arguments does
    /// not match the constructor, which for a contract without one means any
    /// argument at all.
    pub fn encode_deploy(&self, args: &[DynSolValue]) -> Result<Bytes> {
        let bytecode = self.artifact.bytecode();
        let Some(constructor) = self.abi().constructor() else {
            if !args.is_empty() {
                return Err(MockCoreError::ConstructorArguments {
                    expected: 0,
                    got: args.len(),
                });
            }
            return Ok(bytecode.clone());
        };

        if constructor.inputs.len() != args.len() {
            return Err(MockCoreError::ConstructorArguments {
                expected: constructor.inputs.len(),
                got: args.len(),
            });
        }

        let mut code = bytecode.to_vec();
        code.extend(constructor.abi_encode_input(args)?);
        Ok(code.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::U256;

    const REGISTRY: &str = r#"{
        "contractName": "Registry",
        "abi": [
            {"type": "constructor", "inputs": [{"name": "owner", "type": "address"}, {"name": "fee", "type": "uint256"}], "stateMutability": "payable"},
            {"type": "function", "name": "set", "inputs": [{"name": "key", "type": "uint256"}], "outputs": [], "stateMutability": "nonpayable"},
            {"type": "function", "name": "set", "inputs": [{"name": "key", "type": "bytes32"}], "outputs": [], "stateMutability": "payable"},
            {"type": "function", "name": "get", "inputs": [], "outputs": [{"name": "", "type": "uint256"}], "stateMutability": "view"},
            {"type": "event", "name": "Set", "anonymous": false, "inputs": [{"name": "key", "type": "uint256", "indexed": true}]},
            {"type": "event", "name": "Moved", "anonymous": false, "inputs": [{"name": "to", "type": "address", "indexed": true}]},
            {"type": "event", "name": "Moved", "anonymous": false, "inputs": [{"name": "to", "type": "address", "indexed": true}, {"name": "amount", "type": "uint256", "indexed": false}]}
        ],
        "bytecode": "0xfe"
    }"#;

    fn registry() -> Interface {
        Interface::new(Arc::new(Artifact::from_json(REGISTRY, "Registry").unwrap()))
    }

    #[test]
    fn test_overloaded_name_is_ambiguous() {
        let interface = registry();

        match interface.function("set").unwrap_err() {
            MockCoreError::AmbiguousFunction { candidates, .. } => {
                assert_eq!(candidates.len(), 2);
                assert!(candidates.contains(&"set(uint256)".to_string()));
                assert!(candidates.contains(&"set(bytes32)".to_string()));
            }
            other => panic!("expected AmbiguousFunction, got {other:?}"),
        }
    }

    #[test]
    fn test_signature_lookup_resolves_overload() {
        let interface = registry();

        assert!(!interface.is_payable("set(uint256)").unwrap());
        assert!(interface.is_payable("set(bytes32)").unwrap());
        assert!(interface.function("set( bytes32 )").is_ok());
    }

    #[test]
    fn test_unknown_names() {
        let interface = registry();

        assert!(matches!(
            interface.function("missing"),
            Err(MockCoreError::UnknownFunction { .. })
        ));
        assert!(matches!(
            interface.event("Missing"),
            Err(MockCoreError::UnknownEvent { .. })
        ));
    }

    #[test]
    fn test_function_signatures_follow_entry_order() {
        assert_eq!(
            registry().function_signatures(),
            vec!["set(uint256)", "set(bytes32)", "get()"]
        );
    }

    #[test]
    fn test_encode_and_decode_get() {
        let interface = registry();
        let selector = interface.selector("get").unwrap();

        let calldata = interface.encode_function_data("get", &[]).unwrap();
        assert_eq!(calldata.as_ref(), selector.as_slice());

        let output = U256::from(42).to_be_bytes::<32>();
        let decoded = interface.decode_function_result("get", &output).unwrap();
        assert_eq!(decoded, vec![DynSolValue::Uint(U256::from(42), 256)]);
    }

    #[test]
    fn test_encode_deploy_appends_constructor_args() {
        let interface = registry();
        let owner = alloy_primitives::Address::repeat_byte(0x11);

        let code = interface
            .encode_deploy(&[
                DynSolValue::Address(owner),
                DynSolValue::Uint(U256::from(5), 256),
            ])
            .unwrap();

        assert_eq!(code.len(), 1 + 64);
        assert_eq!(code[0], 0xfe);
        assert_eq!(&code[13..33], owner.as_slice());
        assert_eq!(code[64], 5);
        assert!(interface.constructor_is_payable());
    }

    #[test]
    fn test_encode_deploy_checks_argument_count() {
        let result = registry().encode_deploy(&[]);

        assert!(matches!(
            result.unwrap_err(),
            MockCoreError::ConstructorArguments {
                expected: 2,
                got: 0
            }
        ));
    }

    #[test]
    fn test_event_topic_is_signature_hash() {
        let topic = registry().event_topic("Set(uint256)").unwrap();
        assert_eq!(topic, alloy_primitives::keccak256("Set(uint256)"));
        assert_eq!(topic, registry().event_topic("Set").unwrap());
    }

    #[test]
    fn test_overloaded_event_name_is_ambiguous() {
        let interface = registry();

        match interface.event("Moved").unwrap_err() {
            MockCoreError::AmbiguousEvent { candidates, .. } => {
                assert_eq!(candidates, vec!["Moved(address)", "Moved(address,uint256)"]);
            }
            other => panic!("expected AmbiguousEvent, got {other:?}"),
        }
        assert_eq!(
            interface.event_topic("Moved(address,uint256)").unwrap(),
            alloy_primitives::keccak256("Moved(address,uint256)")
        );
    }
}
