//! Error types surfaced by the loader and the dispatcher.

/// Failures that can occur while parsing a bytecode buffer into a [`crate::block::Block`].
///
/// A load error aborts interpretation before any instruction executes.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum LoadError {
    /// A constant record's leading byte wasn't a recognised type tag, and the
    /// two preceding bytes weren't the `0xFA 0xCC` sentinel either.
    #[display(fmt = "invalid constant tag {tag:#04x} at offset {offset}")]
    InvalidConstantTag {
        /// The offending tag byte.
        tag: u8,
        /// Byte offset of the tag within the input buffer.
        offset: usize,
    },
    /// The constant section ran to the end of the buffer without ever
    /// hitting the `0xFA 0xCC` sentinel.
    #[display(fmt = "constant section never reached the 0xFA 0xCC sentinel")]
    MissingSentinel,
    /// A record or instruction operand needed more bytes than remained in
    /// the buffer.
    #[display(fmt = "unexpected end of bytecode at offset {offset}")]
    UnexpectedEof {
        /// Byte offset at which the buffer ran out.
        offset: usize,
    },
}

impl std::error::Error for LoadError {}

/// Failures that can occur while dispatching instructions.
///
/// Every variant is recoverable only in the sense that it is a typed value:
/// the dispatcher itself always unwinds entirely on `Err`, matching the
/// source language's lack of a try/catch mechanism.
#[derive(Debug, Clone, PartialEq, derive_more::Display)]
pub enum RuntimeError {
    /// An operand had the wrong shape for the operation (arithmetic,
    /// `OP_NEGATE`, `OP_FACT`, `OP_SUBSCRIPT`).
    #[display(fmt = "{0}")]
    TypeError(String),
    /// Division or modulo by a zero divisor.
    #[display(fmt = "division by zero")]
    DivisionByZero,
    /// `0 ** 0`, which the source language treats as undefined rather than `1`.
    #[display(fmt = "Zero to zero")]
    ZeroToZero,
    /// `OP_FACT` applied to a negative integer.
    #[display(fmt = "cannot factorial negative number '{0}'")]
    NegativeFactorial(i64),
    /// `OP_SUBSCRIPT` index was out of bounds after wrapping.
    #[display(fmt = "string index out of range")]
    IndexOutOfBounds,
    /// `OP_GET_GLOBAL`/`OP_SET_GLOBAL` referenced a name with no binding.
    #[display(fmt = "undefined variable '{0}'")]
    UndefinedGlobal(String),
    /// The operand stack had no room for another push.
    #[display(fmt = "stack overflow")]
    StackOverflow,
    /// A pop or peek was attempted against an empty operand stack.
    #[display(fmt = "stack underflow")]
    StackUnderflow,
    /// Reading a line from standard input failed.
    #[display(fmt = "input error: {0}")]
    Io(String),
}

impl std::error::Error for RuntimeError {}

impl From<std::io::Error> for RuntimeError {
    fn from(err: std::io::Error) -> Self {
        RuntimeError::Io(err.to_string())
    }
}

impl RuntimeError {
    pub(crate) fn type_error(message: impl Into<String>) -> Self {
        RuntimeError::TypeError(message.into())
    }
}
