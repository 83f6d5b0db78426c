//! Branch-target resolution
//!
//! Function bodies arrive as flat instruction sequences with zeroed
//! continuation fields. A single pass pairs `block`/`loop`/`if`/`else` with
//! their matching `end` and patches the targets, so the interpreter can jump
//! without scanning for block boundaries at run time.

use super::instruction::Instruction;
use crate::runtime::SetupError;

enum Open {
    Block(usize),
    Loop,
    If { at: usize, else_at: Option<usize> },
}

/// Resolve the continuation targets of every structured-control instruction
/// in `code`.
///
/// The body must be terminated by a function-level `end` with no trailing
/// instructions, and every `block`/`loop`/`if` must be closed.
///
/// # Errors
///
/// Returns `MalformedCode` on an unpaired `else`, an unclosed block, or a
/// missing function-level `end`.
pub fn resolve_branch_targets(code: &[Instruction]) -> Result<Box<[Instruction]>, SetupError> {
    let mut out: Vec<Instruction> = code.to_vec();
    let mut opens: Vec<Open> = Vec::new();
    let mut function_closed = false;

    for pc in 0..out.len() {
        match out[pc] {
            Instruction::Block { .. } => opens.push(Open::Block(pc)),
            Instruction::Loop { .. } => opens.push(Open::Loop),
            Instruction::If { .. } => opens.push(Open::If { at: pc, else_at: None }),
            Instruction::Else { .. } => match opens.last_mut() {
                Some(Open::If { else_at, .. }) if else_at.is_none() => *else_at = Some(pc),
                _ => {
                    return Err(SetupError::MalformedCode(format!(
                        "else without matching if at {pc}"
                    )));
                }
            },
            Instruction::End => {
                // The continuation of a block or if is the instruction just
                // past this end; a loop's continuation is the loop head.
                let continuation = (pc + 1) as u32;
                match opens.pop() {
                    Some(Open::Block(at)) => {
                        if let Instruction::Block { end, .. } = &mut out[at] {
                            *end = continuation;
                        }
                    }
                    Some(Open::Loop) => {}
                    Some(Open::If { at, else_at }) => {
                        if let Some(else_pc) = else_at {
                            if let Instruction::Else { end } = &mut out[else_pc] {
                                *end = continuation;
                            }
                        }
                        if let Instruction::If { else_target, end, .. } = &mut out[at] {
                            *else_target = else_at.map(|e| (e + 1) as u32);
                            *end = continuation;
                        }
                    }
                    None => {
                        // Function-level end closes the body.
                        if pc + 1 != out.len() {
                            return Err(SetupError::MalformedCode(format!(
                                "code continues after function end at {pc}"
                            )));
                        }
                        function_closed = true;
                    }
                }
            }
            _ => {}
        }
    }

    if !opens.is_empty() {
        return Err(SetupError::MalformedCode("unclosed block".to_string()));
    }
    if !function_closed {
        return Err(SetupError::MalformedCode(
            "function body does not end with end".to_string(),
        ));
    }
    Ok(out.into_boxed_slice())
}
