//! Call-chain building and lowering into ledger commands.
//!
//! # Responsibilities
//! - Hold an ordered list of move calls whose outputs feed later calls
//! - Reject references to results no earlier step produced
//! - Lower the chain into inputs and commands without touching the network
//!
//! # Design Decisions
//! - Result handles are indices into the chain's step table, not live values
//! - Every appended step gets a fresh id; a handle only resolves in chains
//!   that contain the exact step it came from
//! - Appending never mutates the receiver; it returns the extended chain
//! - The chain is submitted whole; steps are never reordered or split

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

use crate::blockchain::type_tag::{is_valid_identifier, TypeTag};
use crate::blockchain::types::{ChainBuildError, ObjectId};
use crate::blockchain::wire::{self, Command, ProgrammableMoveCall};

/// Fully qualified function: `package::module::function`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MoveTarget {
    package: ObjectId,
    module: String,
    function: String,
}

impl MoveTarget {
    pub fn new(package: ObjectId, module: &str, function: &str) -> Result<Self, ChainBuildError> {
        for ident in [module, function] {
            if !is_valid_identifier(ident) {
                return Err(ChainBuildError::InvalidTarget {
                    input: format!("{}::{}::{}", package, module, function),
                    reason: format!("'{}' is not a valid identifier", ident),
                });
            }
        }
        Ok(Self {
            package,
            module: module.to_string(),
            function: function.to_string(),
        })
    }

    pub fn package(&self) -> ObjectId {
        self.package
    }

    pub fn module(&self) -> &str {
        &self.module
    }

    pub fn function(&self) -> &str {
        &self.function
    }
}

impl FromStr for MoveTarget {
    type Err = ChainBuildError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: String| ChainBuildError::InvalidTarget {
            input: s.to_string(),
            reason,
        };
        let parts: Vec<&str> = s.trim().split("::").collect();
        let [package, module, function] = parts.as_slice() else {
            return Err(invalid("expected package::module::function".to_string()));
        };
        let package: ObjectId = package.parse().map_err(|e| invalid(format!("{}", e)))?;
        Self::new(package, module, function)
    }
}

impl fmt::Display for MoveTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}::{}", self.package, self.module, self.function)
    }
}

static NEXT_STEP_ID: AtomicU64 = AtomicU64::new(1);

fn next_step_id() -> u64 {
    NEXT_STEP_ID.fetch_add(1, Ordering::Relaxed)
}

/// Reference to one output of an earlier step in the same chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ResultHandle {
    step: usize,
    output: u16,
    /// Id of the producing step, distinguishing sibling chains that share a
    /// prefix.
    origin: u64,
}

impl ResultHandle {
    pub(crate) fn new(step: usize, output: u16, origin: u64) -> Self {
        Self { step, output, origin }
    }

    /// Index of the producing step.
    pub fn step(&self) -> usize {
        self.step
    }

    /// Index among the producing step's outputs.
    pub fn output(&self) -> u16 {
        self.output
    }
}

impl fmt::Display for ResultHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "result {} of step {}", self.output, self.step)
    }
}

/// A single call argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Argument {
    /// BCS-encoded pure value.
    Literal(Vec<u8>),
    /// On-ledger object, resolved to a concrete reference at submission.
    Object { id: ObjectId, mutable: bool },
    Result(ResultHandle),
    /// Homogeneous vector built in-transaction.
    TypedVector {
        element_type: TypeTag,
        elements: Vec<Argument>,
    },
}

impl Argument {
    /// BCS-encoded literal of any serializable value.
    pub fn pure<T: Serialize + ?Sized>(value: &T) -> Result<Self, ChainBuildError> {
        bcs::to_bytes(value)
            .map(Self::Literal)
            .map_err(|e| ChainBuildError::InvalidLiteral(e.to_string()))
    }

    /// `vector<u8>` literal.
    pub fn byte_vector(bytes: &[u8]) -> Result<Self, ChainBuildError> {
        Self::pure(bytes)
    }

    /// Object the call may mutate.
    pub fn object(id: ObjectId) -> Self {
        Self::Object { id, mutable: true }
    }

    /// Object the call only reads. Required for the system clock.
    pub fn object_read_only(id: ObjectId) -> Self {
        Self::Object { id, mutable: false }
    }

    pub fn typed_vector(element_type: TypeTag, elements: Vec<Argument>) -> Self {
        Self::TypedVector {
            element_type,
            elements,
        }
    }
}

impl From<ResultHandle> for Argument {
    fn from(handle: ResultHandle) -> Self {
        Self::Result(handle)
    }
}

/// One move call plus the number of results it yields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallStep {
    target: MoveTarget,
    type_arguments: Vec<TypeTag>,
    arguments: Vec<Argument>,
    outputs: u16,
}

impl CallStep {
    pub fn new(target: MoveTarget) -> Self {
        Self {
            target,
            type_arguments: Vec::new(),
            arguments: Vec::new(),
            outputs: 0,
        }
    }

    pub fn type_argument(mut self, tag: TypeTag) -> Self {
        self.type_arguments.push(tag);
        self
    }

    pub fn argument(mut self, argument: impl Into<Argument>) -> Self {
        self.arguments.push(argument.into());
        self
    }

    /// Number of results the target returns. The builder does not inspect the
    /// remote signature, so the caller declares it.
    pub fn outputs(mut self, count: u16) -> Self {
        self.outputs = count;
        self
    }

    pub fn target(&self) -> &MoveTarget {
        &self.target
    }

    pub fn arguments(&self) -> &[Argument] {
        &self.arguments
    }

    pub fn output_count(&self) -> u16 {
        self.outputs
    }
}

/// Ordered move calls submitted as one transaction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallChain {
    steps: Vec<CallStep>,
    /// Parallel to `steps`.
    step_ids: Vec<u64>,
}

impl CallChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn steps(&self) -> &[CallStep] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Returns the chain extended by `step` together with the step's output
    /// handles. `self` is left untouched.
    pub fn append_step(
        &self,
        step: CallStep,
    ) -> Result<(CallChain, Vec<ResultHandle>), ChainBuildError> {
        let index = self.steps.len();
        for argument in &step.arguments {
            self.check_references(index, argument)?;
        }

        let id = next_step_id();
        let handles = (0..step.outputs)
            .map(|output| ResultHandle::new(index, output, id))
            .collect();

        let mut chain = self.clone();
        chain.steps.push(step);
        chain.step_ids.push(id);
        Ok((chain, handles))
    }

    fn check_references(&self, step: usize, argument: &Argument) -> Result<(), ChainBuildError> {
        match argument {
            Argument::Result(handle) => {
                let produced = self
                    .steps
                    .get(handle.step)
                    .zip(self.step_ids.get(handle.step))
                    .is_some_and(|(producer, id)| {
                        *id == handle.origin && handle.output < producer.outputs
                    });
                if !produced {
                    return Err(ChainBuildError::DanglingHandleReference {
                        step,
                        handle: *handle,
                    });
                }
                Ok(())
            }
            Argument::TypedVector { elements, .. } => elements
                .iter()
                .try_for_each(|element| self.check_references(step, element)),
            Argument::Literal(_) | Argument::Object { .. } => Ok(()),
        }
    }

    /// Convert into ledger inputs and commands, preserving step order.
    pub fn lower(&self) -> Result<LoweredChain, ChainBuildError> {
        let mut lowering = Lowering::default();
        for (index, step) in self.steps.iter().enumerate() {
            let arguments = step
                .arguments
                .iter()
                .map(|argument| lowering.lower_argument(index, argument))
                .collect::<Result<Vec<_>, _>>()?;

            let call = ProgrammableMoveCall {
                package: step.target.package,
                module: step.target.module.clone(),
                function: step.target.function.clone(),
                type_arguments: step.type_arguments.clone(),
                arguments,
            };
            let command = lowering.push_command(Command::MoveCall(Box::new(call)))?;
            lowering.step_commands.push(command);
        }

        Ok(LoweredChain {
            inputs: lowering.inputs,
            commands: lowering.commands,
        })
    }
}

/// Transaction input before object references are resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSlot {
    Pure(Vec<u8>),
    Object { id: ObjectId, mutable: bool },
}

/// A chain flattened into ledger form, pending object resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoweredChain {
    pub inputs: Vec<InputSlot>,
    pub commands: Vec<Command>,
}

impl LoweredChain {
    /// Distinct objects referenced by the inputs, in input order.
    pub fn object_ids(&self) -> Vec<ObjectId> {
        self.inputs
            .iter()
            .filter_map(|slot| match slot {
                InputSlot::Object { id, .. } => Some(*id),
                InputSlot::Pure(_) => None,
            })
            .collect()
    }
}

#[derive(Default)]
struct Lowering {
    inputs: Vec<InputSlot>,
    object_inputs: HashMap<ObjectId, u16>,
    commands: Vec<Command>,
    step_commands: Vec<u16>,
}

fn wire_index(len: usize, what: &'static str) -> Result<u16, ChainBuildError> {
    u16::try_from(len).map_err(|_| ChainBuildError::LimitExceeded {
        what,
        limit: u16::MAX as usize,
    })
}

impl Lowering {
    fn push_input(&mut self, slot: InputSlot) -> Result<u16, ChainBuildError> {
        let index = wire_index(self.inputs.len(), "inputs")?;
        self.inputs.push(slot);
        Ok(index)
    }

    fn push_command(&mut self, command: Command) -> Result<u16, ChainBuildError> {
        let index = wire_index(self.commands.len(), "commands")?;
        self.commands.push(command);
        Ok(index)
    }

    fn lower_argument(
        &mut self,
        step: usize,
        argument: &Argument,
    ) -> Result<wire::Argument, ChainBuildError> {
        match argument {
            Argument::Literal(bytes) => {
                let index = self.push_input(InputSlot::Pure(bytes.clone()))?;
                Ok(wire::Argument::Input(index))
            }
            Argument::Object { id, mutable } => {
                if let Some(&index) = self.object_inputs.get(id) {
                    if let Some(InputSlot::Object { mutable: existing, .. }) =
                        self.inputs.get_mut(index as usize)
                    {
                        *existing |= *mutable;
                    }
                    return Ok(wire::Argument::Input(index));
                }
                let index = self.push_input(InputSlot::Object {
                    id: *id,
                    mutable: *mutable,
                })?;
                self.object_inputs.insert(*id, index);
                Ok(wire::Argument::Input(index))
            }
            Argument::Result(handle) => {
                let command = self.step_commands.get(handle.step).copied().ok_or(
                    ChainBuildError::DanglingHandleReference {
                        step,
                        handle: *handle,
                    },
                )?;
                Ok(wire::Argument::NestedResult(command, handle.output))
            }
            Argument::TypedVector {
                element_type,
                elements,
            } => {
                let elements = elements
                    .iter()
                    .map(|element| self.lower_argument(step, element))
                    .collect::<Result<Vec<_>, _>>()?;
                let command =
                    self.push_command(Command::MakeMoveVec(Some(element_type.clone()), elements))?;
                Ok(wire::Argument::Result(command))
            }
        }
    }
}
