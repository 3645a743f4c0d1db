//! Property-based tests for the invariants the interning, table, and
//! constant-pool machinery are supposed to hold for all inputs, not just the
//! hand-picked examples in `end_to_end.rs`.

use quickcheck::TestResult;
use quickcheck_macros::quickcheck;

use timid_vm::block::{Block, OpCode};
use timid_vm::object::StringArena;
use timid_vm::table::Table;
use timid_vm::value::Value;
use timid_vm::vm::Vm;

#[quickcheck]
fn interning_the_same_bytes_twice_returns_the_same_handle(bytes: Vec<u8>) -> bool {
    let mut arena = StringArena::new();
    let a = arena.make_string(bytes.clone());
    let before = arena.len();
    let b = arena.make_string(bytes);
    a == b && arena.len() == before
}

#[quickcheck]
fn interning_distinct_byte_sequences_grows_the_arena_by_one(a: Vec<u8>, b: Vec<u8>) -> TestResult {
    if a == b {
        return TestResult::discard();
    }
    let mut arena = StringArena::new();
    arena.make_string(a);
    let before = arena.len();
    arena.make_string(b);
    TestResult::from_bool(arena.len() == before + 1)
}

#[quickcheck]
fn integer_add_then_subtract_round_trips(a: i64, b: i64) -> TestResult {
    if b.checked_neg().is_none() {
        return TestResult::discard();
    }
    match a.checked_add(b) {
        Some(sum) => TestResult::from_bool(sum.wrapping_sub(b) == a),
        None => TestResult::discard(),
    }
}

#[quickcheck]
fn float_multiply_then_divide_is_within_an_ulp(a: f64, b: f64) -> TestResult {
    if b == 0.0 || !a.is_finite() || !b.is_finite() {
        return TestResult::discard();
    }
    let product = a * b;
    if !product.is_finite() {
        return TestResult::discard();
    }
    let round_tripped = product / b;
    TestResult::from_bool((round_tripped - a).abs() <= a.abs() * 1e-9 + 1e-12)
}

#[quickcheck]
fn table_get_after_set_returns_the_last_inserted_value(key_bytes: Vec<u8>, a: i64, b: i64) -> bool {
    let mut arena = StringArena::new();
    let key = arena.make_string(key_bytes);
    let hash = arena.object(key).hash();

    let mut table = Table::new();
    table.set(key, hash, Value::Int(a));
    table.set(key, hash, Value::Int(b));
    table.get(key, hash) == Some(Value::Int(b))
}

#[quickcheck]
fn table_delete_then_set_is_visible_under_the_new_value(key_bytes: Vec<u8>, v: i64) -> bool {
    let mut arena = StringArena::new();
    let key = arena.make_string(key_bytes);
    let hash = arena.object(key).hash();

    let mut table = Table::new();
    table.set(key, hash, Value::Int(0));
    table.delete(key, hash);
    table.set(key, hash, Value::Int(v));
    table.get(key, hash) == Some(Value::Int(v))
}

#[quickcheck]
fn constant_pool_index_round_trips_through_write_constant(values: Vec<i64>) -> bool {
    let mut block = Block::new();
    for &v in &values {
        block.write_constant(Value::Int(v));
    }

    let mut cursor = 0;
    let code = block.code();
    for &expected in &values {
        let opcode = OpCode::from_byte(code[cursor]).expect("a valid opcode byte");
        let (index, width) = match opcode {
            OpCode::Constant => (code[cursor + 1] as u32, 2),
            OpCode::ConstantLong => {
                let bytes = [code[cursor + 1], code[cursor + 2], code[cursor + 3], 0];
                (u32::from_le_bytes(bytes), 4)
            }
            _ => panic!("unexpected opcode in constant stream"),
        };
        if block.constants()[index as usize] != Value::Int(expected) {
            return false;
        }
        cursor += width;
    }
    true
}

#[quickcheck]
fn jump_advances_the_instruction_pointer_by_three_plus_the_offset(offset: u16) -> bool {
    let mut block = Block::new();
    block.write(OpCode::Jump as u8);
    let bytes = offset.to_le_bytes();
    block.write(bytes[0]);
    block.write(bytes[1]);

    let mut vm = Vm::new(block, StringArena::new());
    vm.step().expect("a single jump never errors");
    vm.ip() == 3 + offset as usize
}

#[quickcheck]
fn loop_retreats_the_instruction_pointer_by_the_offset(padding: u16, offset: u16) -> TestResult {
    // Pad with enough leading no-ops that `ip - offset` never underflows,
    // independent of how large `offset` is; a single `step()` call (rather
    // than `run()`) means the loop is never actually re-entered.
    let padding = padding as usize;
    if offset as usize > padding {
        return TestResult::discard();
    }

    let mut block = Block::new();
    for _ in 0..padding {
        block.write(OpCode::Nop as u8);
    }
    let loop_at = block.code().len();
    block.write(OpCode::Loop as u8);
    let bytes = offset.to_le_bytes();
    block.write(bytes[0]);
    block.write(bytes[1]);

    let mut vm = Vm::new(block, StringArena::new());
    for _ in 0..padding {
        vm.step().expect("a no-op never errors");
    }
    vm.step().expect("a padded loop never errors");
    TestResult::from_bool(vm.ip() == loop_at + 3 - offset as usize)
}

#[quickcheck]
fn truth_of_zero_and_empty_values_is_always_false() -> bool {
    let mut strings = StringArena::new();
    let empty = strings.make_string(Vec::new());
    !Value::Int(0).truth(&strings)
        && !Value::Float(0.0).truth(&strings)
        && !Value::Bool(false).truth(&strings)
        && !Value::Null.truth(&strings)
        && !Value::Object(empty).truth(&strings)
}
