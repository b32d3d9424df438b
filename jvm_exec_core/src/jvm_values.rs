use std::fmt::{Display, Formatter};

///https://docs.oracle.com/javase/specs/jvms/se21/html/jvms-2.html#jvms-2.2
///
/// Values living on the operand stack or in a local variable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    Int(i32),
    Float(f32),
    Long(i64),
    Double(f64),
    ObjectRef(ObjectReference),
    Null,
    /// Saved by `jsr`, consumed by `ret`. Never usable as arithmetic data.
    ReturnAddress(u32),
}

/// Handle of an object owned by the `ObjectHeap`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectReference(pub(crate) u32);

impl ObjectReference {
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

impl Display for ObjectReference {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "@{}", self.0)
    }
}

///https://docs.oracle.com/javase/specs/jvms/se21/html/jvms-2.html#jvms-2.11.1
///
/// Computational type category: how many abstract slots a value occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    One,
    Two,
}

impl Category {
    pub fn slots(&self) -> usize {
        match self {
            Category::One => 1,
            Category::Two => 2,
        }
    }
}

pub fn category_of(value: &Value) -> Category {
    match value {
        Value::Long(_) | Value::Double(_) => Category::Two,
        Value::Int(_)
        | Value::Float(_)
        | Value::ObjectRef(_)
        | Value::Null
        | Value::ReturnAddress(_) => Category::One,
    }
}

impl Value {
    pub fn category(&self) -> Category {
        category_of(self)
    }

    pub fn is_reference_or_null(&self) -> bool {
        matches!(self, Value::ObjectRef(_) | Value::Null)
    }
}
