use std::collections::HashMap;

use mbasic_core::errors::{BasicError, BasicResult};
use mbasic_core::value::Value;

/// The implicit size of an auto-allocated array dimension (indices `0`
/// through `10`), used the first time a variable is subscripted without a
/// preceding `DIM`.
pub const DEFAULT_ARRAY_SIZE: usize = 11;

#[derive(Debug, Default)]
pub struct VariableStore {
    vars: HashMap<String, Value>,
}

impl VariableStore {
    pub fn new() -> Self {
        VariableStore::default()
    }

    pub fn get(&self, name: &str) -> Value {
        self.vars
            .get(name)
            .cloned()
            .unwrap_or_else(|| Value::default_for(name.ends_with('$')))
    }

    pub fn set(&mut self, name: &str, value: Value) {
        let is_string = name.ends_with('$');
        self.vars.insert(name.to_string(), value.coerce_to(is_string));
    }

    pub fn clear(&mut self) {
        self.vars.clear();
    }
}

#[derive(Debug, Clone)]
pub struct ArrayDescriptor {
    pub name: String,
    pub dims: Vec<usize>,
    pub is_string: bool,
    data: HashMap<usize, Value>,
}

impl ArrayDescriptor {
    fn new(name: &str, dims: Vec<usize>, is_string: bool) -> Self {
        ArrayDescriptor {
            name: name.to_string(),
            dims,
            is_string,
            data: HashMap::new(),
        }
    }

    fn flat_offset(&self, indices: &[i32], line: usize) -> BasicResult<usize> {
        if indices.len() != self.dims.len() {
            return Err(BasicError::runtime(
                format!("Array {} expects {} dimensions", self.name, self.dims.len()),
                line,
            ));
        }
        let mut offset = 0usize;
        for (idx, &size) in indices.iter().zip(self.dims.iter()) {
            if *idx < 0 || *idx as usize >= size {
                return Err(BasicError::runtime(format!("Index out of range for {}", self.name), line));
            }
            offset = offset * size + *idx as usize;
        }
        Ok(offset)
    }

    pub fn get(&self, indices: &[i32], line: usize) -> BasicResult<Value> {
        let offset = self.flat_offset(indices, line)?;
        Ok(self
            .data
            .get(&offset)
            .cloned()
            .unwrap_or_else(|| Value::default_for(self.is_string)))
    }

    pub fn set(&mut self, indices: &[i32], value: Value, line: usize) -> BasicResult<()> {
        let offset = self.flat_offset(indices, line)?;
        self.data.insert(offset, value.coerce_to(self.is_string));
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct ArrayStore {
    arrays: HashMap<String, ArrayDescriptor>,
}

impl ArrayStore {
    pub fn new() -> Self {
        ArrayStore::default()
    }

    pub fn clear(&mut self) {
        self.arrays.clear();
    }

    /// `DIM name(bounds...)`. Redimensioning an already-dimensioned array
    /// (explicitly or via auto-allocation) is a runtime error.
    pub fn dim(&mut self, name: &str, bounds: &[i32], line: usize) -> BasicResult<()> {
        if self.arrays.contains_key(name) {
            return Err(BasicError::runtime(format!("Array {name} already dimensioned"), line));
        }
        let dims: Vec<usize> = bounds.iter().map(|&b| b.max(0) as usize + 1).collect();
        self.arrays.insert(name.to_string(), ArrayDescriptor::new(name, dims, name.ends_with('$')));
        Ok(())
    }

    fn auto_allocate(&mut self, name: &str, rank: usize) -> &mut ArrayDescriptor {
        self.arrays
            .entry(name.to_string())
            .or_insert_with(|| ArrayDescriptor::new(name, vec![DEFAULT_ARRAY_SIZE; rank], name.ends_with('$')))
    }

    pub fn get(&mut self, name: &str, indices: &[i32], line: usize) -> BasicResult<Value> {
        let array = self.auto_allocate(name, indices.len());
        array.get(indices, line)
    }

    pub fn set(&mut self, name: &str, indices: &[i32], value: Value, line: usize) -> BasicResult<()> {
        let array = self.auto_allocate(name, indices.len());
        array.set(indices, value, line)
    }
}
