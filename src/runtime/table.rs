//! WebAssembly tables
//!
//! A table is a resizable vector of optional function handles, the dispatch
//! target of `call_indirect`. Slots start out empty; element segments and
//! hosts fill them with Store function addresses.

use super::store::FuncAddr;
use super::Trap;

/// A table of function references.
#[derive(Debug)]
pub struct Table {
    elements: Vec<Option<FuncAddr>>,
    max: Option<u32>,
}

impl Table {
    /// Create a table with `initial` empty slots.
    pub fn new(initial: u32, max: Option<u32>) -> Self {
        Table {
            elements: vec![None; initial as usize],
            max,
        }
    }

    /// Current number of slots.
    pub fn size(&self) -> u32 {
        self.elements.len() as u32
    }

    /// Declared maximum, if any.
    pub fn max(&self) -> Option<u32> {
        self.max
    }

    /// Read the slot at `index`.
    ///
    /// # Errors
    /// Traps with `OutOfBoundsTableAccess` past the current size.
    pub fn get(&self, index: u32) -> Result<Option<FuncAddr>, Trap> {
        self.elements
            .get(index as usize)
            .copied()
            .ok_or(Trap::OutOfBoundsTableAccess)
    }

    /// Write the slot at `index`.
    ///
    /// # Errors
    /// Traps with `OutOfBoundsTableAccess` past the current size.
    pub fn set(&mut self, index: u32, value: Option<FuncAddr>) -> Result<(), Trap> {
        match self.elements.get_mut(index as usize) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(Trap::OutOfBoundsTableAccess),
        }
    }

    /// Grow by `delta` slots filled with `fill`, returning the previous size
    /// or -1 if the new size would exceed the maximum.
    pub fn grow(&mut self, delta: u32, fill: Option<FuncAddr>) -> i32 {
        let old_size = self.size();
        let Some(new_size) = old_size.checked_add(delta) else {
            return -1;
        };
        if let Some(max) = self.max {
            if new_size > max {
                return -1;
            }
        }
        self.elements.resize(new_size as usize, fill);
        old_size as i32
    }
}
