//! Parses a raw bytecode buffer into a [`Block`].

use crate::block::{Block, OpCode};
use crate::error::LoadError;
use crate::object::StringArena;
use crate::value::Value;

const SENTINEL: [u8; 2] = [0xFA, 0xCC];

const TAG_INT: u8 = 0x00;
const TAG_FLOAT: u8 = 0x01;
const TAG_STRING: u8 = 0x02;

/// Parse `bytes` into a [`Block`], interning any string constants into
/// `strings`.
///
/// The buffer is a constant section (a sequence of typed records) followed
/// by the two-byte sentinel `0xFA 0xCC`, followed by a raw instruction
/// section copied through unchanged.
pub fn load(bytes: &[u8], strings: &mut StringArena) -> Result<Block, LoadError> {
    let mut block = Block::new();
    let mut cursor = 0usize;

    loop {
        if cursor + 1 < bytes.len() && bytes[cursor] == SENTINEL[0] && bytes[cursor + 1] == SENTINEL[1] {
            cursor += 2;
            break;
        }

        let Some(&tag) = bytes.get(cursor) else {
            return Err(LoadError::MissingSentinel);
        };

        match tag {
            TAG_INT => {
                let raw = read_array::<8>(bytes, cursor + 1)?;
                block.add_constant(Value::Int(i64::from_le_bytes(raw)));
                cursor += 1 + 8;
            }
            TAG_FLOAT => {
                let raw = read_array::<8>(bytes, cursor + 1)?;
                block.add_constant(Value::Float(f64::from_le_bytes(raw)));
                cursor += 1 + 8;
            }
            TAG_STRING => {
                let len_bytes = read_array::<4>(bytes, cursor + 1)?;
                let len = u32::from_le_bytes(len_bytes) as usize;
                let start = cursor + 1 + 4;
                let end = start + len;
                let content = bytes
                    .get(start..end)
                    .ok_or(LoadError::UnexpectedEof { offset: start })?;
                let handle = strings.make_string(content.to_vec());
                block.add_constant(Value::Object(handle));
                cursor = end;
            }
            other => {
                return Err(LoadError::InvalidConstantTag {
                    tag: other,
                    offset: cursor,
                });
            }
        }
    }

    load_instructions(bytes, cursor, &mut block)?;
    Ok(block)
}

/// Copy the instruction section verbatim, widening only enough to validate
/// that every operand the dispatcher will read is actually present.
fn load_instructions(bytes: &[u8], mut cursor: usize, block: &mut Block) -> Result<(), LoadError> {
    while cursor < bytes.len() {
        let byte = bytes[cursor];
        block.write(byte);
        cursor += 1;

        let Some(opcode) = OpCode::from_byte(byte) else {
            continue;
        };

        let operand_len = match opcode {
            OpCode::Constant => 1,
            OpCode::ConstantLong => 3,
            OpCode::JumpIfFalse | OpCode::Jump | OpCode::Loop => 2,
            _ if opcode.carries_name_subform() => {
                let subform = *bytes
                    .get(cursor)
                    .ok_or(LoadError::UnexpectedEof { offset: cursor })?;
                block.write(subform);
                cursor += 1;
                match OpCode::from_byte(subform) {
                    Some(OpCode::ConstantLong) => 3,
                    _ => 1,
                }
            }
            _ => 0,
        };

        let operand = bytes
            .get(cursor..cursor + operand_len)
            .ok_or(LoadError::UnexpectedEof { offset: cursor })?;
        for &b in operand {
            block.write(b);
        }
        cursor += operand_len;
    }

    Ok(())
}

fn read_array<const N: usize>(bytes: &[u8], offset: usize) -> Result<[u8; N], LoadError> {
    let slice = bytes
        .get(offset..offset + N)
        .ok_or(LoadError::UnexpectedEof { offset })?;
    Ok(slice.try_into().expect("slice length matches N"))
}
