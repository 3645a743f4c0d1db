//! The instruction dispatch loop.

use std::io::{self, BufRead, Write};

use crate::block::OpCode;
use crate::error::RuntimeError;
use crate::value::Value;

use super::{ops, Vm};

/// Execute instructions starting at the VM's current instruction pointer
/// until `OP_RETURN` or the instruction stream is exhausted.
#[tracing::instrument(skip(vm))]
pub fn run(vm: &mut Vm) -> Result<(), RuntimeError> {
    while step(vm)?.is_continue() {}
    Ok(())
}

/// Whether dispatch should keep fetching instructions.
pub enum Flow {
    Continue,
    Halt,
}

impl Flow {
    fn is_continue(&self) -> bool {
        matches!(self, Flow::Continue)
    }
}

/// Execute exactly one instruction, or report that the VM has already
/// halted (`OP_RETURN` seen, or the instruction stream exhausted).
pub fn step(vm: &mut Vm) -> Result<Flow, RuntimeError> {
    if vm.ip >= vm.block.code().len() {
        return Ok(Flow::Halt);
    }

    let ip = vm.ip;
    let byte = vm.read_u8();
    let Some(op) = OpCode::from_byte(byte) else {
        return Err(RuntimeError::type_error(format!(
            "unrecognised opcode byte {byte:#04x} at offset {ip}"
        )));
    };

    tracing::trace!(ip, ?op, "dispatch");

    match op {
        OpCode::Nop => {}
        OpCode::Constant => {
            let index = u32::from(vm.read_u8());
            vm.push(vm.constant(index))?;
        }
        OpCode::ConstantLong => {
            let a = vm.read_u8();
            let b = vm.read_u8();
            let c = vm.read_u8();
            let index = u32::from_le_bytes([a, b, c, 0]);
            vm.push(vm.constant(index))?;
        }
        OpCode::Neg1 => vm.push(Value::Int(-1))?,
        OpCode::Zero => vm.push(Value::Int(0))?,
        OpCode::One => vm.push(Value::Int(1))?,
        OpCode::Two => vm.push(Value::Int(2))?,
        OpCode::True => vm.push(Value::Bool(true))?,
        OpCode::False => vm.push(Value::Bool(false))?,
        OpCode::Null => vm.push(Value::Null)?,
        OpCode::Print => {
            let value = vm.pop()?;
            println!("{}", value.display(&vm.strings));
        }
        OpCode::Pop => {
            vm.pop()?;
        }
        OpCode::Negate => {
            let value = vm.pop()?;
            vm.push(ops::negate(value)?)?;
        }
        OpCode::Not => {
            let value = vm.pop()?;
            vm.push(ops::not(value, &vm.strings))?;
        }
        OpCode::Fact => {
            let value = vm.pop()?;
            vm.push(ops::factorial(value)?)?;
        }
        OpCode::Add => {
            let b = vm.pop()?;
            let a = vm.pop()?;
            let result = ops::add(a, b, &mut vm.strings)?;
            vm.push(result)?;
        }
        OpCode::Sub => {
            let b = vm.pop()?;
            let a = vm.pop()?;
            vm.push(ops::sub(a, b)?)?;
        }
        OpCode::Mul => {
            let b = vm.pop()?;
            let a = vm.pop()?;
            let result = ops::mul(a, b, &mut vm.strings)?;
            vm.push(result)?;
        }
        OpCode::Div => {
            let b = vm.pop()?;
            let a = vm.pop()?;
            vm.push(ops::div(a, b)?)?;
        }
        OpCode::Mod => {
            let b = vm.pop()?;
            let a = vm.pop()?;
            vm.push(ops::rem(a, b)?)?;
        }
        OpCode::Pow => {
            let b = vm.pop()?;
            let a = vm.pop()?;
            vm.push(ops::pow(a, b)?)?;
        }
        OpCode::Eq => {
            let b = vm.pop()?;
            let a = vm.pop()?;
            vm.push(Value::Bool(a.equals(b, &vm.strings)))?;
        }
        OpCode::Lt => {
            let b = vm.pop()?;
            let a = vm.pop()?;
            vm.push(Value::Bool(a.less_than(b, &vm.strings)))?;
        }
        OpCode::Gt => {
            let b = vm.pop()?;
            let a = vm.pop()?;
            vm.push(Value::Bool(a.greater_than(b, &vm.strings)))?;
        }
        OpCode::And => {
            let b = vm.pop()?;
            let a = vm.pop()?;
            vm.push(Value::Bool(a.truth(&vm.strings) && b.truth(&vm.strings)))?;
        }
        OpCode::Or => {
            let b = vm.pop()?;
            let a = vm.pop()?;
            vm.push(Value::Bool(a.truth(&vm.strings) || b.truth(&vm.strings)))?;
        }
        OpCode::JumpIfFalse => {
            let offset = vm.read_u16();
            let top = vm.peek(0)?;
            if !top.truth(&vm.strings) {
                vm.ip += offset as usize;
            }
        }
        OpCode::Jump => {
            let offset = vm.read_u16();
            vm.ip += offset as usize;
        }
        OpCode::Loop => {
            let offset = vm.read_u16();
            vm.ip -= offset as usize;
        }
        OpCode::DefineGlobal => {
            let index = vm.read_name_index();
            let name = name_handle(vm.constant(index));
            let value = vm.peek(0)?;
            let hash = vm.strings.object(name).hash();
            vm.globals.set(name, hash, value);
            vm.pop()?;
        }
        OpCode::GetGlobal => {
            let index = vm.read_name_index();
            let name = name_handle(vm.constant(index));
            let hash = vm.strings.object(name).hash();
            match vm.globals.get(name, hash) {
                Some(value) => vm.push(value)?,
                None => {
                    return Err(RuntimeError::UndefinedGlobal(
                        String::from_utf8_lossy(vm.strings.get(name)).into_owned(),
                    ))
                }
            }
        }
        OpCode::SetGlobal => {
            let index = vm.read_name_index();
            let name = name_handle(vm.constant(index));
            let hash = vm.strings.object(name).hash();
            let value = vm.peek(0)?;
            if vm.globals.set(name, hash, value) {
                vm.globals.delete(name, hash);
                return Err(RuntimeError::UndefinedGlobal(
                    String::from_utf8_lossy(vm.strings.get(name)).into_owned(),
                ));
            }
        }
        OpCode::GetLocal => {
            let slot = vm.read_name_index();
            vm.push(vm.stack[slot as usize])?;
        }
        OpCode::SetLocal => {
            let slot = vm.read_name_index();
            let value = vm.peek(0)?;
            vm.stack[slot as usize] = value;
        }
        OpCode::GetInput => {
            let prompt = vm.pop()?;
            print!("{}", prompt.display(&vm.strings));
            io::stdout().flush().map_err(RuntimeError::from)?;

            let mut line = String::new();
            io::stdin().lock().read_line(&mut line).map_err(RuntimeError::from)?;
            if line.ends_with('\n') {
                line.pop();
                if line.ends_with('\r') {
                    line.pop();
                }
            }
            let handle = vm.strings.make_string(line.into_bytes());
            vm.push(Value::Object(handle))?;
        }
        OpCode::Subscript => {
            let index = vm.pop()?;
            let iterable = vm.pop()?;
            let result = ops::subscript(iterable, index, &mut vm.strings)?;
            vm.push(result)?;
        }
        OpCode::Return => return Ok(Flow::Halt),
    }

    Ok(Flow::Continue)
}

fn name_handle(value: Value) -> crate::object::StringHandle {
    value
        .as_string_handle()
        .expect("loader only emits name operands pointing at string constants")
}
