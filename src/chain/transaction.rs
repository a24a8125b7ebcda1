//! Programmable transaction model.
//!
//! Settlement transactions are assembled here and handed to a
//! [`TransactionExecutor`](super::TransactionExecutor), which resolves
//! object references, gas and coin intents before signing. Read-only
//! queries built only from shared objects and pure values can be encoded
//! directly with [`Transaction::to_kind_bytes`] for dev-inspection.

use crate::deepbook::bcs::BcsWriter;
use crate::errors::{AppError, Result};

/// Reference to a transaction input or to the output of an earlier command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Argument {
    GasCoin,
    Input(u16),
    Result(u16),
    NestedResult(u16, u16),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallArg {
    /// BCS-encoded value.
    Pure(Vec<u8>),
    /// Object known only by id, resolved by whoever submits the transaction.
    Object(String),
    Shared {
        id: [u8; 32],
        initial_shared_version: u64,
        mutable: bool,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveCall {
    pub package: String,
    pub module: String,
    pub function: String,
    pub type_arguments: Vec<String>,
    pub arguments: Vec<Argument>,
}

impl MoveCall {
    /// `package::module::function`
    pub fn target(&self) -> String {
        format!("{}::{}::{}", self.package, self.module, self.function)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    MoveCall(MoveCall),
    TransferObjects {
        objects: Vec<Argument>,
        recipient: Argument,
    },
    /// A coin of `coin_type` holding exactly `amount`, gathered from the
    /// sender's coins at build time.
    CoinWithBalance { coin_type: String, amount: u64 },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transaction {
    inputs: Vec<CallArg>,
    commands: Vec<Command>,
    gas_budget: Option<u64>,
}

impl Transaction {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inputs(&self) -> &[CallArg] {
        &self.inputs
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    pub fn gas_budget(&self) -> Option<u64> {
        self.gas_budget
    }

    pub fn set_gas_budget(&mut self, budget: u64) {
        self.gas_budget = Some(budget);
    }

    /// Move calls in command order.
    pub fn move_calls(&self) -> impl Iterator<Item = &MoveCall> {
        self.commands.iter().filter_map(|c| match c {
            Command::MoveCall(call) => Some(call),
            _ => None,
        })
    }

    fn push_input(&mut self, arg: CallArg) -> Argument {
        self.inputs.push(arg);
        Argument::Input((self.inputs.len() - 1) as u16)
    }

    fn push_command(&mut self, command: Command) -> Argument {
        self.commands.push(command);
        Argument::Result((self.commands.len() - 1) as u16)
    }

    /// Object input by id; repeated ids share one input slot.
    pub fn object(&mut self, id: &str) -> Argument {
        if let Some(pos) = self
            .inputs
            .iter()
            .position(|i| matches!(i, CallArg::Object(existing) if existing == id))
        {
            return Argument::Input(pos as u16);
        }
        self.push_input(CallArg::Object(id.to_string()))
    }

    pub fn pure(&mut self, bytes: Vec<u8>) -> Argument {
        self.push_input(CallArg::Pure(bytes))
    }

    pub fn pure_u8(&mut self, v: u8) -> Argument {
        self.pure(vec![v])
    }

    pub fn pure_u64(&mut self, v: u64) -> Argument {
        self.pure(v.to_le_bytes().to_vec())
    }

    pub fn pure_bool(&mut self, v: bool) -> Argument {
        self.pure(vec![u8::from(v)])
    }

    pub fn pure_address(&mut self, address: &str) -> Result<Argument> {
        Ok(self.pure(parse_address(address)?.to_vec()))
    }

    /// `Option::none()` of any type encodes as a single zero byte.
    pub fn pure_none(&mut self) -> Argument {
        self.pure(vec![0])
    }

    pub fn move_call(
        &mut self,
        target: &str,
        type_arguments: &[&str],
        arguments: Vec<Argument>,
    ) -> Result<Argument> {
        let mut parts = target.splitn(3, "::");
        let (Some(package), Some(module), Some(function)) = (parts.next(), parts.next(), parts.next())
        else {
            return Err(AppError::Parse(format!("invalid move call target {target}")));
        };
        Ok(self.push_command(Command::MoveCall(MoveCall {
            package: package.to_string(),
            module: module.to_string(),
            function: function.to_string(),
            type_arguments: type_arguments.iter().map(|t| t.to_string()).collect(),
            arguments,
        })))
    }

    pub fn transfer_objects(&mut self, objects: Vec<Argument>, recipient: &str) -> Result<()> {
        let recipient = self.pure_address(recipient)?;
        self.push_command(Command::TransferObjects { objects, recipient });
        Ok(())
    }

    pub fn coin_with_balance(&mut self, coin_type: &str, amount: u64) -> Argument {
        self.push_command(Command::CoinWithBalance {
            coin_type: coin_type.to_string(),
            amount,
        })
    }

    /// Object ids still waiting for resolution.
    pub fn unresolved_objects(&self) -> Vec<String> {
        self.inputs
            .iter()
            .filter_map(|i| match i {
                CallArg::Object(id) => Some(id.clone()),
                _ => None,
            })
            .collect()
    }

    /// Replace an id-only object input with its shared-object reference.
    pub fn resolve_shared(&mut self, id: &str, initial_shared_version: u64, mutable: bool) -> Result<()> {
        let bytes = parse_address(id)?;
        for input in &mut self.inputs {
            if matches!(&*input, CallArg::Object(existing) if existing == id) {
                *input = CallArg::Shared {
                    id: bytes,
                    initial_shared_version,
                    mutable,
                };
            }
        }
        Ok(())
    }

    /// BCS `TransactionKind::ProgrammableTransaction`. Only resolved shared
    /// objects, pure inputs, move calls and transfers can be encoded.
    pub fn to_kind_bytes(&self) -> Result<Vec<u8>> {
        let mut w = BcsWriter::new();
        w.write_u8(0);

        w.write_uleb128(self.inputs.len());
        for input in &self.inputs {
            match input {
                CallArg::Pure(bytes) => {
                    w.write_u8(0).write_bytes(bytes);
                }
                CallArg::Shared {
                    id,
                    initial_shared_version,
                    mutable,
                } => {
                    w.write_u8(1)
                        .write_u8(1)
                        .write_address(id)
                        .write_u64(*initial_shared_version)
                        .write_bool(*mutable);
                }
                CallArg::Object(id) => {
                    return Err(AppError::Parse(format!("object input {id} is unresolved")));
                }
            }
        }

        w.write_uleb128(self.commands.len());
        for command in &self.commands {
            match command {
                Command::MoveCall(call) => {
                    w.write_u8(0)
                        .write_address(&parse_address(&call.package)?)
                        .write_str(&call.module)
                        .write_str(&call.function);
                    w.write_uleb128(call.type_arguments.len());
                    for tag in &call.type_arguments {
                        write_struct_tag(&mut w, tag)?;
                    }
                    w.write_uleb128(call.arguments.len());
                    for arg in &call.arguments {
                        write_argument(&mut w, *arg);
                    }
                }
                Command::TransferObjects { objects, recipient } => {
                    w.write_u8(1).write_uleb128(objects.len());
                    for arg in objects {
                        write_argument(&mut w, *arg);
                    }
                    write_argument(&mut w, *recipient);
                }
                Command::CoinWithBalance { coin_type, .. } => {
                    return Err(AppError::Parse(format!(
                        "coin intent for {coin_type} needs wallet resolution"
                    )));
                }
            }
        }
        Ok(w.into_bytes())
    }
}

fn write_argument(w: &mut BcsWriter, arg: Argument) {
    match arg {
        Argument::GasCoin => {
            w.write_u8(0);
        }
        Argument::Input(i) => {
            w.write_u8(1).write_u16(i);
        }
        Argument::Result(i) => {
            w.write_u8(2).write_u16(i);
        }
        Argument::NestedResult(i, j) => {
            w.write_u8(3).write_u16(i).write_u16(j);
        }
    }
}

/// `address::module::Name` without type parameters.
fn write_struct_tag(w: &mut BcsWriter, tag: &str) -> Result<()> {
    let parts: Vec<&str> = tag.split("::").collect();
    if parts.len() != 3 || tag.contains('<') {
        return Err(AppError::Parse(format!("unsupported type tag {tag}")));
    }
    w.write_u8(7)
        .write_address(&parse_address(parts[0])?)
        .write_str(parts[1])
        .write_str(parts[2])
        .write_uleb128(0);
    Ok(())
}

/// Parse a hex account/object id, left-padding short forms such as `0x2`.
pub fn parse_address(raw: &str) -> Result<[u8; 32]> {
    let digits = raw.strip_prefix("0x").unwrap_or(raw);
    if digits.is_empty() || digits.len() > 64 {
        return Err(AppError::Parse(format!("invalid address {raw}")));
    }
    let padded = format!("{digits:0>64}");
    let bytes = hex::decode(&padded).map_err(|e| AppError::Parse(format!("invalid address {raw}: {e}")))?;
    let mut out = [0u8; 32];
    out.copy_from_slice(&bytes);
    Ok(out)
}
