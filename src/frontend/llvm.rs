use std::collections::HashMap;
use std::path::{Path, PathBuf};

use inkwell::basic_block::BasicBlock as LlvmBasicBlock;
use inkwell::context::Context;
use inkwell::llvm_sys::core::LLVMGetDebugLocLine;
use inkwell::memory_buffer::MemoryBuffer;
use inkwell::module::Module as LlvmModule;
use inkwell::values::{AnyValue, AnyValueEnum, FunctionValue, InstructionOpcode, InstructionValue};

use crate::error::LoadError;
use crate::ir::{
    is_llvm_intrinsic, is_memcpy_intrinsic, is_memset_intrinsic, BasicBlock, BasicBlockId,
    DebugLocation, Function, FunctionId, Instruction, Module, ModuleBuilder, ValueId, ValueKind,
};

/// Parses `path` as LLVM IR — textual (`.ll`) or bitcode (`.bc`) — and
/// lowers it into this crate's [`Module`].
///
/// # Errors
///
/// Returns [`LoadError::Io`] if `path` cannot be read, and
/// [`LoadError::Parse`] if the file is not well-formed LLVM IR.
pub fn load_module(path: &Path) -> Result<Module, LoadError> {
    let context = Context::create();
    let buffer = MemoryBuffer::create_from_file(path).map_err(|message| LoadError::Io {
        path: path.to_path_buf(),
        source: std::io::Error::other(message.to_string()),
    })?;
    let llvm_module = context
        .create_module_from_ir(buffer)
        .map_err(|message| LoadError::Parse {
            path: path.to_path_buf(),
            message: message.to_string(),
        })?;

    Lowering::new(path.to_path_buf()).lower(&llvm_module)
}

/// Lowering state threaded through one module's worth of functions.
///
/// Every LLVM value that ever shows up as an operand — a function
/// symbol, a parameter, an instruction result, a global, a constant —
/// is interned into a stable [`ValueId`] the first time it is seen, so
/// repeated uses (the common case for SSA operands) resolve to the
/// same identity.
struct Lowering<'ctx> {
    path: PathBuf,
    builder: ModuleBuilder,
    values: HashMap<AnyValueEnum<'ctx>, ValueId>,
    blocks: HashMap<LlvmBasicBlock<'ctx>, BasicBlockId>,
}

impl<'ctx> Lowering<'ctx> {
    fn new(path: PathBuf) -> Self {
        Self {
            path,
            builder: ModuleBuilder::new(),
            values: HashMap::new(),
            blocks: HashMap::new(),
        }
    }

    fn intern(&mut self, value: AnyValueEnum<'ctx>, kind: ValueKind) -> ValueId {
        if let Some(&id) = self.values.get(&value) {
            return id;
        }
        let id = self.builder.alloc_value(kind);
        self.values.insert(value, id);
        id
    }

    /// Looks up an already-interned value, falling back to
    /// [`ValueKind::Constant`] for operands never declared up front
    /// (integer/float literals, `null`, `undef`, inline constant
    /// expressions).
    fn operand_value(&mut self, value: AnyValueEnum<'ctx>) -> ValueId {
        if let Some(&id) = self.values.get(&value) {
            return id;
        }
        self.intern(value, ValueKind::Constant)
    }

    fn lower(mut self, llvm_module: &LlvmModule<'ctx>) -> Result<Module, LoadError> {
        // Pass 0: intern every global up front, so loading/storing through
        // one is recognized as its own cell rather than falling back to
        // `ValueKind::Constant`.
        for global in llvm_module.get_globals() {
            self.intern(global.as_any_value_enum(), ValueKind::Global);
        }

        // Pass 1: declare every function and its parameters up front, so
        // a call referencing a function defined later in the module — or
        // a function calling itself — resolves to a stable `FunctionId`.
        let mut function_ids = Vec::new();
        for function in llvm_module.get_functions() {
            let name = function_name(&function);
            let id = self.builder.alloc_function_id();
            self.intern(function.as_any_value_enum(), ValueKind::FunctionSymbol(id));
            for (index, param) in function.get_param_iter().enumerate() {
                let index = u32::try_from(index).unwrap_or(u32::MAX);
                self.intern(
                    param.as_any_value_enum(),
                    ValueKind::Parameter { function: id, index },
                );
            }
            function_ids.push((id, name, function));
        }

        // Pass 2: allocate a `ValueId` for every instruction result before
        // translating any instruction body, so backward references across
        // basic blocks (loop-carried phis) resolve.
        for (id, _, function) in &function_ids {
            for block in function.get_basic_blocks() {
                let block_id = BasicBlockId::new(
                    u32::try_from(self.blocks.len()).expect("block arena overflow"),
                );
                self.blocks.insert(block, block_id);
                for instruction in block.get_instructions() {
                    if produces_value(&instruction) {
                        self.intern(
                            instruction.as_any_value_enum(),
                            ValueKind::Instruction {
                                function: *id,
                                block: block_id,
                            },
                        );
                    }
                }
            }
        }

        // Pass 3: translate bodies now that every value has a stable id.
        for (id, name, function) in function_ids {
            let params: Vec<ValueId> = function
                .get_param_iter()
                .map(|p| self.operand_value(p.as_any_value_enum()))
                .collect();

            if function.get_basic_blocks().is_empty() {
                self.builder
                    .finish_function(Function::declaration(id, name, params));
                continue;
            }

            let mut blocks = Vec::new();
            for block in function.get_basic_blocks() {
                blocks.push(self.lower_block(block)?);
            }
            self.builder.finish_function(Function::new(id, name, params, blocks));
        }

        Ok(self.builder.build())
    }

    fn lower_block(&mut self, block: LlvmBasicBlock<'ctx>) -> Result<BasicBlock, LoadError> {
        let id = self.blocks[&block];
        let mut instructions = Vec::new();
        let mut successors = Vec::new();

        for instruction in block.get_instructions() {
            if is_branch(&instruction) {
                successors.extend(
                    terminator_successors(&instruction)
                        .into_iter()
                        .filter_map(|target| self.blocks.get(&target).copied()),
                );
            }
            if let Some(lowered) = self.lower_instruction(&instruction)? {
                instructions.push(lowered);
            }
        }

        Ok(BasicBlock::new(id, instructions, successors))
    }

    fn lower_instruction(
        &mut self,
        instruction: &InstructionValue<'ctx>,
    ) -> Result<Option<Instruction>, LoadError> {
        let result_id =
            produces_value(instruction).then(|| self.operand_value(instruction.as_any_value_enum()));

        let lowered = match instruction.get_opcode() {
            InstructionOpcode::Alloca => Instruction::Alloca {
                result: result_id.expect("alloca produces a value"),
            },
            InstructionOpcode::BitCast => Instruction::BitCast {
                result: result_id.expect("bitcast produces a value"),
                operand: self.operand(instruction, 0)?,
            },
            InstructionOpcode::GetElementPtr => Instruction::GetElementPtr {
                result: result_id.expect("getelementptr produces a value"),
                base: self.operand(instruction, 0)?,
                indices: (1..instruction.get_num_operands())
                    .filter_map(|i| self.try_operand(instruction, i))
                    .collect(),
            },
            InstructionOpcode::Load => Instruction::Load {
                result: result_id.expect("load produces a value"),
                pointer: self.operand(instruction, 0)?,
            },
            InstructionOpcode::Store => Instruction::Store {
                value: self.operand(instruction, 0)?,
                pointer: self.operand(instruction, 1)?,
            },
            InstructionOpcode::Phi => {
                let result = result_id.expect("phi produces a value");
                let num_incoming = instruction.get_num_operands() / 2;
                let mut incoming = Vec::with_capacity(num_incoming as usize);
                for i in 0..num_incoming {
                    let value = self.operand(instruction, i)?;
                    if let Some(block) = instruction
                        .get_operand(num_incoming + i)
                        .and_then(|op| op.right())
                        .and_then(|b| self.blocks.get(&b).copied())
                    {
                        incoming.push((block, value));
                    }
                }
                Instruction::Phi { result, incoming }
            }
            InstructionOpcode::Call => return self.lower_call(instruction, result_id),
            InstructionOpcode::Return => Instruction::Return {
                value: self.try_operand(instruction, 0),
            },
            opcode => Instruction::Other {
                result: result_id,
                opcode_name: format!("{opcode:?}"),
            },
        };

        Ok(Some(lowered))
    }

    fn lower_call(
        &mut self,
        instruction: &InstructionValue<'ctx>,
        result_id: Option<ValueId>,
    ) -> Result<Option<Instruction>, LoadError> {
        let num_operands = instruction.get_num_operands();
        let Some(callee_operand) = instruction.get_operand(num_operands.saturating_sub(1)) else {
            return Err(LoadError::Unsupported {
                path: self.path.clone(),
                message: "call instruction with no callee operand".to_owned(),
            });
        };
        let Some(callee_value) = callee_operand.left() else {
            return Err(LoadError::Unsupported {
                path: self.path.clone(),
                message: "call instruction's callee operand is not a value".to_owned(),
            });
        };

        let callee = self.operand_value(callee_value.as_any_value_enum());
        let args = (0..num_operands.saturating_sub(1))
            .filter_map(|i| self.try_operand(instruction, i))
            .collect::<Vec<_>>();
        let debug_location = debug_location_of(instruction);

        if let AnyValueEnum::FunctionValue(callee_fn) = callee_value.as_any_value_enum() {
            let name = function_name(&callee_fn);
            if is_memcpy_intrinsic(&name) {
                return Ok(Some(Instruction::MemCpy {
                    dst: args.first().copied().unwrap_or(callee),
                    src: args.get(1).copied().unwrap_or(callee),
                }));
            }
            if is_memset_intrinsic(&name) {
                return Ok(Some(Instruction::MemSet {
                    dst: args.first().copied().unwrap_or(callee),
                }));
            }
            // Every other `llvm.*` intrinsic (`llvm.dbg.*`, `llvm.lifetime.*`,
            // `llvm.assume`, ...) is dropped entirely rather than lowered to
            // an ordinary call — none of them are modeled targets and none
            // should show up in the call-target report.
            if is_llvm_intrinsic(&name) {
                return Ok(None);
            }
        }

        Ok(Some(Instruction::Call {
            result: result_id,
            callee,
            args,
            debug_location,
        }))
    }

    fn operand(
        &mut self,
        instruction: &InstructionValue<'ctx>,
        index: u32,
    ) -> Result<ValueId, LoadError> {
        self.try_operand(instruction, index).ok_or_else(|| LoadError::Unsupported {
            path: self.path.clone(),
            message: format!("operand {index} of {instruction:?} is not a value"),
        })
    }

    fn try_operand(&mut self, instruction: &InstructionValue<'ctx>, index: u32) -> Option<ValueId> {
        let operand = instruction.get_operand(index)?.left()?;
        Some(self.operand_value(operand.as_any_value_enum()))
    }
}

fn function_name(function: &FunctionValue<'_>) -> String {
    function.get_name().to_string_lossy().into_owned()
}

/// Whether this instruction produces an SSA value (as opposed to a
/// terminator or a `store`, which do not).
fn produces_value(instruction: &InstructionValue<'_>) -> bool {
    !matches!(
        instruction.get_opcode(),
        InstructionOpcode::Store
            | InstructionOpcode::Return
            | InstructionOpcode::Br
            | InstructionOpcode::Switch
            | InstructionOpcode::Unreachable
    )
}

fn is_branch(instruction: &InstructionValue<'_>) -> bool {
    matches!(
        instruction.get_opcode(),
        InstructionOpcode::Br | InstructionOpcode::Switch | InstructionOpcode::IndirectBr
    )
}

fn terminator_successors<'ctx>(instruction: &InstructionValue<'ctx>) -> Vec<LlvmBasicBlock<'ctx>> {
    (0..instruction.get_num_operands())
        .filter_map(|i| instruction.get_operand(i))
        .filter_map(|op| op.right())
        .collect()
}

fn debug_location_of(instruction: &InstructionValue<'_>) -> Option<DebugLocation> {
    let line = unsafe { LLVMGetDebugLocLine(instruction.as_value_ref()) };
    (line != 0).then(|| DebugLocation::new(line))
}
