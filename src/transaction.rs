//! Programmable transaction assembly
//!
//! A Sui programmable transaction is a list of inputs plus a list of commands.
//! Commands reference inputs, the gas coin, or the results of earlier
//! commands. [`TransactionData::to_wallet_json`] renders the wallet-standard
//! serialized form; the wallet resolves objects and gas, then signs. Keys
//! never pass through this crate.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::account::SuiAddress;
use crate::error::SwapError;

/// Reference to a value inside the transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Argument {
    GasCoin,
    Input(u16),
    Result(u16),
    NestedResult(u16, u16),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "camelCase")]
pub enum PureValue {
    U64(u64),
    Address(SuiAddress),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CallArg {
    Pure(PureValue),
    /// Object input, resolved to its version and mutability by the wallet
    Object(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveCall {
    pub package: String,
    pub module: String,
    pub function: String,
    pub type_arguments: Vec<String>,
    pub arguments: Vec<Argument>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    SplitCoins {
        coin: Argument,
        amounts: Vec<Argument>,
    },
    MoveCall(MoveCall),
    TransferObjects {
        objects: Vec<Argument>,
        address: Argument,
    },
}

/// Unsigned transaction handed to the wallet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionData {
    pub sender: SuiAddress,
    pub inputs: Vec<CallArg>,
    pub commands: Vec<Command>,
}

impl TransactionData {
    /// Amounts passed to `SplitCoins` commands, in base units
    pub fn split_amounts(&self) -> Vec<u64> {
        self.commands
            .iter()
            .filter_map(|cmd| match cmd {
                Command::SplitCoins { amounts, .. } => Some(amounts),
                _ => None,
            })
            .flatten()
            .filter_map(|arg| match arg {
                Argument::Input(i) => self.inputs.get(*i as usize),
                _ => None,
            })
            .filter_map(|input| match input {
                CallArg::Pure(PureValue::U64(v)) => Some(*v),
                _ => None,
            })
            .collect()
    }

    pub fn move_calls(&self) -> impl Iterator<Item = &MoveCall> {
        self.commands.iter().filter_map(|cmd| match cmd {
            Command::MoveCall(call) => Some(call),
            _ => None,
        })
    }

    /// Version 2 serialized transaction data, as read by `Transaction.from`
    /// in the Sui TypeScript SDK. Gas is left for the wallet to fill in and
    /// object inputs are unresolved.
    pub fn to_wallet_json(&self) -> Result<Value, SwapError> {
        let inputs = self
            .inputs
            .iter()
            .map(CallArg::to_wallet_json)
            .collect::<Result<Vec<_>, _>>()?;
        let commands: Vec<Value> = self.commands.iter().map(Command::to_wallet_json).collect();

        Ok(json!({
            "version": 2,
            "sender": self.sender.as_str(),
            "expiration": null,
            "gasData": {
                "budget": null,
                "price": null,
                "owner": null,
                "payment": null,
            },
            "inputs": inputs,
            "commands": commands,
        }))
    }

    pub fn to_wallet_string(&self) -> Result<String, SwapError> {
        Ok(self.to_wallet_json()?.to_string())
    }
}

impl Argument {
    fn to_wallet_json(self) -> Value {
        match self {
            Argument::GasCoin => json!({ "GasCoin": true }),
            Argument::Input(i) => json!({ "Input": i }),
            Argument::Result(i) => json!({ "Result": i }),
            Argument::NestedResult(i, j) => json!({ "NestedResult": [i, j] }),
        }
    }
}

fn wallet_arguments(arguments: &[Argument]) -> Vec<Value> {
    arguments.iter().map(|a| a.to_wallet_json()).collect()
}

impl PureValue {
    /// BCS encoding: `u64` little-endian, `address` as its 32 raw bytes
    pub fn to_bcs(&self) -> Result<Vec<u8>, SwapError> {
        match self {
            PureValue::U64(v) => Ok(v.to_le_bytes().to_vec()),
            PureValue::Address(address) => Ok(address.to_bytes()?.to_vec()),
        }
    }
}

impl CallArg {
    fn to_wallet_json(&self) -> Result<Value, SwapError> {
        Ok(match self {
            CallArg::Pure(value) => json!({ "Pure": { "bytes": BASE64.encode(value.to_bcs()?) } }),
            CallArg::Object(id) => json!({ "UnresolvedObject": { "objectId": id } }),
        })
    }
}

impl Command {
    fn to_wallet_json(&self) -> Value {
        match self {
            Command::SplitCoins { coin, amounts } => json!({
                "SplitCoins": {
                    "coin": coin.to_wallet_json(),
                    "amounts": wallet_arguments(amounts),
                }
            }),
            Command::MoveCall(call) => json!({
                "MoveCall": {
                    "package": call.package,
                    "module": call.module,
                    "function": call.function,
                    "typeArguments": call.type_arguments,
                    "arguments": wallet_arguments(&call.arguments),
                }
            }),
            Command::TransferObjects { objects, address } => json!({
                "TransferObjects": {
                    "objects": wallet_arguments(objects),
                    "address": address.to_wallet_json(),
                }
            }),
        }
    }
}

/// Incremental builder; each method returns the argument for its result
#[derive(Debug, Default)]
pub struct TransactionBuilder {
    sender: Option<SuiAddress>,
    inputs: Vec<CallArg>,
    commands: Vec<Command>,
}

impl TransactionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_sender(&mut self, sender: SuiAddress) -> &mut Self {
        self.sender = Some(sender);
        self
    }

    pub fn gas(&self) -> Argument {
        Argument::GasCoin
    }

    pub fn pure_u64(&mut self, value: u64) -> Argument {
        self.push_input(CallArg::Pure(PureValue::U64(value)))
    }

    pub fn pure_address(&mut self, address: SuiAddress) -> Argument {
        self.push_input(CallArg::Pure(PureValue::Address(address)))
    }

    /// Object inputs are deduplicated; referencing the same object twice
    /// yields the same input slot.
    pub fn object(&mut self, object_id: &str) -> Argument {
        let existing = self.inputs.iter().position(|input| match input {
            CallArg::Object(id) => id == object_id,
            _ => false,
        });
        match existing {
            Some(i) => Argument::Input(i as u16),
            None => self.push_input(CallArg::Object(object_id.to_string())),
        }
    }

    /// Split `amounts` off `coin`; returns one argument per new coin
    pub fn split_coins(&mut self, coin: Argument, amounts: Vec<Argument>) -> Vec<Argument> {
        let count = amounts.len() as u16;
        let index = self.push_command(Command::SplitCoins { coin, amounts });
        (0..count)
            .map(|i| Argument::NestedResult(index, i))
            .collect()
    }

    /// `target` is `<package>::<module>::<function>`
    pub fn move_call(
        &mut self,
        target: &str,
        type_arguments: Vec<String>,
        arguments: Vec<Argument>,
    ) -> Result<Argument, SwapError> {
        let mut parts = target.splitn(3, "::");
        let (package, module, function) = match (parts.next(), parts.next(), parts.next()) {
            (Some(p), Some(m), Some(f)) if !p.is_empty() && !m.is_empty() && !f.is_empty() => {
                (p, m, f)
            }
            _ => {
                return Err(SwapError::Config(format!(
                    "invalid move call target '{}'",
                    target
                )))
            }
        };

        let index = self.push_command(Command::MoveCall(MoveCall {
            package: package.to_string(),
            module: module.to_string(),
            function: function.to_string(),
            type_arguments,
            arguments,
        }));
        Ok(Argument::Result(index))
    }

    pub fn transfer_objects(&mut self, objects: Vec<Argument>, address: Argument) {
        self.push_command(Command::TransferObjects { objects, address });
    }

    pub fn build(self) -> Result<TransactionData, SwapError> {
        let sender = self.sender.ok_or(SwapError::NotConnected)?;
        if self.commands.is_empty() {
            return Err(SwapError::Config("transaction has no commands".to_string()));
        }
        Ok(TransactionData {
            sender,
            inputs: self.inputs,
            commands: self.commands,
        })
    }

    fn push_input(&mut self, input: CallArg) -> Argument {
        self.inputs.push(input);
        Argument::Input((self.inputs.len() - 1) as u16)
    }

    fn push_command(&mut self, command: Command) -> u16 {
        self.commands.push(command);
        (self.commands.len() - 1) as u16
    }
}

/// Response detail requested from the wallet on execution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecuteOptions {
    pub show_effects: bool,
    pub show_object_changes: bool,
}

impl Default for ExecuteOptions {
    fn default() -> Self {
        Self {
            show_effects: true,
            show_object_changes: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sender() -> SuiAddress {
        "0xa11ce".parse().unwrap()
    }

    #[test]
    fn test_build_requires_sender() {
        let mut tx = TransactionBuilder::new();
        let gas = tx.gas();
        let amount = tx.pure_u64(1);
        tx.split_coins(gas, vec![amount]);
        assert!(matches!(tx.build(), Err(SwapError::NotConnected)));
    }

    #[test]
    fn test_build_requires_commands() {
        let mut tx = TransactionBuilder::new();
        tx.set_sender(sender());
        assert!(matches!(tx.build(), Err(SwapError::Config(_))));
    }

    #[test]
    fn test_result_indices_follow_command_order() {
        let mut tx = TransactionBuilder::new();
        tx.set_sender(sender());
        let gas = tx.gas();
        let a = tx.pure_u64(10);
        let b = tx.pure_u64(20);
        let coins = tx.split_coins(gas, vec![a, b]);
        assert_eq!(
            coins,
            vec![Argument::NestedResult(0, 0), Argument::NestedResult(0, 1)]
        );

        let out = tx.move_call("0x2::coin::join", vec![], coins).unwrap();
        assert_eq!(out, Argument::Result(1));

        let data = tx.build().unwrap();
        assert_eq!(data.split_amounts(), vec![10, 20]);
        assert_eq!(data.move_calls().count(), 1);
    }

    #[test]
    fn test_object_inputs_are_deduplicated() {
        let mut tx = TransactionBuilder::new();
        let first = tx.object("0x6");
        let second = tx.object("0x6");
        assert_eq!(first, second);
    }

    #[test]
    fn test_pure_values_are_bcs_encoded() {
        assert_eq!(
            PureValue::U64(5_000_000_000).to_bcs().unwrap(),
            vec![0x00, 0xf2, 0x05, 0x2a, 0x01, 0x00, 0x00, 0x00]
        );

        let bytes = PureValue::Address(sender()).to_bcs().unwrap();
        assert_eq!(bytes.len(), 32);
        assert_eq!(&bytes[29..], &[0x0a, 0x11, 0xce]);
        assert!(bytes[..29].iter().all(|b| *b == 0));
    }

    #[test]
    fn test_wallet_json_shape() {
        let mut tx = TransactionBuilder::new();
        tx.set_sender(sender());
        let gas = tx.gas();
        let amount = tx.pure_u64(1_000);
        let coins = tx.split_coins(gas, vec![amount]);
        let exchange = tx.object("0x6");
        let mut arguments = vec![exchange];
        arguments.extend(coins);
        let out = tx.move_call("0x2::wal_exchange::exchange_all_for_wal", vec![], arguments).unwrap();
        let to = tx.pure_address(sender());
        tx.transfer_objects(vec![out], to);

        let wallet = tx.build().unwrap().to_wallet_json().unwrap();
        assert_eq!(wallet["version"], 2);
        assert_eq!(wallet["sender"], sender().as_str());
        assert!(wallet["gasData"]["payment"].is_null());

        assert_eq!(wallet["inputs"][0]["Pure"]["bytes"], "6AMAAAAAAAA=");
        assert_eq!(wallet["inputs"][1]["UnresolvedObject"]["objectId"], "0x6");
        assert!(wallet["inputs"][2]["Pure"]["bytes"].is_string());

        assert_eq!(
            wallet["commands"][0],
            json!({ "SplitCoins": { "coin": { "GasCoin": true }, "amounts": [{ "Input": 0 }] } })
        );
        assert_eq!(
            wallet["commands"][1]["MoveCall"]["arguments"],
            json!([{ "Input": 1 }, { "NestedResult": [0, 0] }])
        );
        assert_eq!(
            wallet["commands"][2]["TransferObjects"],
            json!({ "objects": [{ "Result": 1 }], "address": { "Input": 2 } })
        );
    }

    #[test]
    fn test_move_call_rejects_malformed_target() {
        let mut tx = TransactionBuilder::new();
        assert!(tx.move_call("0x2::coin", vec![], vec![]).is_err());
        assert!(tx.move_call("::coin::join", vec![], vec![]).is_err());
    }
}
