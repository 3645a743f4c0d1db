//! A stack-based bytecode virtual machine for a small dynamically-typed
//! scripting language.
//!
//! Loading and running a program is a two-step pipeline: [`loader::load`]
//! parses a raw byte buffer into a [`block::Block`], then [`vm::Vm::run`]
//! executes it.

pub mod block;
pub mod error;
pub mod loader;
pub mod object;
pub mod table;
pub mod value;
pub mod vm;

use error::{LoadError, RuntimeError};
use object::StringArena;
use vm::Vm;

/// Failure of either loading or running a program.
#[derive(Debug, derive_more::Display)]
pub enum Error {
    /// The bytecode buffer was malformed.
    #[display(fmt = "{0}")]
    Load(LoadError),
    /// Dispatch failed while executing a loaded program.
    #[display(fmt = "{0}")]
    Runtime(RuntimeError),
}

impl std::error::Error for Error {}

impl From<LoadError> for Error {
    fn from(err: LoadError) -> Self {
        Error::Load(err)
    }
}

impl From<RuntimeError> for Error {
    fn from(err: RuntimeError) -> Self {
        Error::Runtime(err)
    }
}

/// Load and run a complete bytecode buffer, returning its runtime error if
/// dispatch fails.
#[tracing::instrument(skip(bytes))]
pub fn run(bytes: &[u8]) -> Result<(), Error> {
    let mut strings = StringArena::new();
    let block = loader::load(bytes, &mut strings)?;
    let mut machine = Vm::new(block, strings);
    machine.run()?;
    Ok(())
}
