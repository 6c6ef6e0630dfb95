//! Script opcodes and a push-aware operation parser.

use std::fmt;

/// Opcode values used by the standard script templates.
pub mod op {
    // Opcodes for pushing to the stack
    pub const OP_0: u8 = 0x00;
    pub const OP_PUSHDATA1: u8 = 0x4c;
    pub const OP_PUSHDATA2: u8 = 0x4d;
    pub const OP_PUSHDATA4: u8 = 0x4e;
    pub const OP_1NEGATE: u8 = 0x4f;
    pub const OP_RESERVED: u8 = 0x50;
    pub const OP_1: u8 = 0x51;
    pub const OP_16: u8 = 0x60;

    pub const OP_RETURN: u8 = 0x6a;
    pub const OP_DUP: u8 = 0x76;
    pub const OP_EQUAL: u8 = 0x87;
    pub const OP_EQUALVERIFY: u8 = 0x88;
    pub const OP_HASH160: u8 = 0xa9;
    pub const OP_CHECKSIG: u8 = 0xac;
    pub const OP_CHECKMULTISIG: u8 = 0xae;
}

/// A single parsed script operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operation<'a> {
    /// A data push: a direct push (`0x01..=0x4b`), `OP_PUSHDATA1/2/4`, or `OP_0`, which
    /// pushes the empty byte string.
    PushBytes(&'a [u8]),
    /// Any other opcode, including the small-integer opcodes `OP_1NEGATE..=OP_16`.
    Opcode(u8),
}

impl<'a> Operation<'a> {
    /// Returns `true` if this operation only pushes a value onto the stack.
    ///
    /// The small-integer opcodes count as pushes; `OP_RESERVED` does not.
    pub fn is_push(&self) -> bool {
        match self {
            Operation::PushBytes(_) => true,
            Operation::Opcode(opcode) => {
                *opcode <= op::OP_16 && *opcode != op::OP_RESERVED
            }
        }
    }

    /// Returns the value of a small-integer opcode `OP_1..=OP_16`.
    pub fn small_int(&self) -> Option<u8> {
        match self {
            Operation::Opcode(opcode) if (op::OP_1..=op::OP_16).contains(opcode) => {
                Some(opcode - op::OP_1 + 1)
            }
            _ => None,
        }
    }
}

/// A push operation declared more bytes than the script contains.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReadError {
    pub expected_bytes: usize,
    pub available_bytes: usize,
}

impl fmt::Display for ReadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Script push expected {} bytes but only {} are available",
            self.expected_bytes, self.available_bytes
        )
    }
}

impl std::error::Error for ReadError {}

fn take<'a>(script: &mut &'a [u8], needed_bytes: usize) -> Result<&'a [u8], ReadError> {
    if script.len() < needed_bytes {
        Err(ReadError {
            expected_bytes: needed_bytes,
            available_bytes: script.len(),
        })
    } else {
        let (head, tail) = script.split_at(needed_bytes);
        *script = tail;
        Ok(head)
    }
}

/// Parses the operation at the start of `script`, advancing it past the operation.
///
/// Returns `Ok(None)` once the script is exhausted.
pub fn parse_operation<'a>(script: &mut &'a [u8]) -> Result<Option<Operation<'a>>, ReadError> {
    let (&leading_byte, rest) = match script.split_first() {
        Some(split) => split,
        None => return Ok(None),
    };
    *script = rest;

    let size = match leading_byte {
        op::OP_0 => 0,
        n if n < op::OP_PUSHDATA1 => usize::from(n),
        op::OP_PUSHDATA1 => usize::from(take(script, 1)?[0]),
        op::OP_PUSHDATA2 => {
            let len = take(script, 2)?;
            usize::from(u16::from_le_bytes([len[0], len[1]]))
        }
        op::OP_PUSHDATA4 => {
            let len = take(script, 4)?;
            let len = u32::from_le_bytes([len[0], len[1], len[2], len[3]]);
            usize::try_from(len).map_err(|_| ReadError {
                expected_bytes: usize::MAX,
                available_bytes: script.len(),
            })?
        }
        opcode => return Ok(Some(Operation::Opcode(opcode))),
    };

    take(script, size).map(|data| Some(Operation::PushBytes(data)))
}

/// Parses every operation in `script`.
///
/// Fails if any push runs past the end of the script.
pub fn parse_operations(mut script: &[u8]) -> Result<Vec<Operation<'_>>, ReadError> {
    let mut ops = vec![];
    while let Some(operation) = parse_operation(&mut script)? {
        ops.push(operation);
    }
    Ok(ops)
}
