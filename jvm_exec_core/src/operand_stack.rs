use crate::jvm_error::{VmError, VmExecResult};
use crate::jvm_values::Category::{One, Two};
use crate::jvm_values::{Category, Value};
use log::trace;

/// Operand stack of one frame.
///
/// Capacity is counted in slots: a category 2 value takes two of them even though it is a
/// single entry of the stack.
///
/// The shuffle instructions (`pop` .. `swap`) look at the categories of the topmost values
/// first and commit to the first form that matches, narrowest form first. Nothing is popped
/// when no form matches or when the result would not fit.
#[derive(Debug)]
pub struct OperandStack {
    stack: Vec<Value>,
    used_slots: usize,
    max_slots: usize,
}

impl OperandStack {
    pub fn new(max_slots: usize) -> OperandStack {
        OperandStack {
            stack: Vec::with_capacity(max_slots),
            used_slots: 0,
            max_slots,
        }
    }

    pub fn pop(&mut self) -> VmExecResult<Value> {
        let value = self.stack.pop().ok_or(VmError::PopFromEmptyStack)?;
        self.used_slots -= value.category().slots();
        trace!("--- value stack --- {:?}", self.stack);
        Ok(value)
    }

    pub fn push(&mut self, value: Value) -> VmExecResult<()> {
        let slots = value.category().slots();
        self.reserve(slots)?;
        self.stack.push(value);
        self.used_slots += slots;
        trace!("--- value stack --- {:?}", self.stack);
        Ok(())
    }

    /// Values from bottom to top.
    pub fn values(&self) -> &[Value] {
        &self.stack
    }

    pub fn len(&self) -> usize {
        self.stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    pub fn used_slots(&self) -> usize {
        self.used_slots
    }

    /// Categories of the `N` topmost values, top first.
    fn top_categories<const N: usize>(&self) -> Option<[Category; N]> {
        if self.stack.len() < N {
            return None;
        }
        let mut categories = [One; N];
        for (category, value) in categories.iter_mut().zip(self.stack.iter().rev()) {
            *category = value.category();
        }
        Some(categories)
    }

    /// Pops `N` values, top first.
    fn pop_top<const N: usize>(&mut self) -> VmExecResult<[Value; N]> {
        let mut values = [Value::Null; N];
        for value in values.iter_mut() {
            *value = self.pop()?;
        }
        Ok(values)
    }

    /// Fails with `StackOverFlow` unless `slots` more slots are free.
    fn reserve(&self, slots: usize) -> VmExecResult<()> {
        if self.used_slots + slots > self.max_slots {
            return Err(VmError::StackOverFlow);
        }
        Ok(())
    }

    fn push_all(&mut self, values: &[Value]) -> VmExecResult<()> {
        for value in values {
            self.push(*value)?;
        }
        Ok(())
    }

    fn no_matching_form(&self, instruction: &str, min_values: usize) -> VmError {
        if self.stack.len() < min_values {
            return VmError::PopFromEmptyStack;
        }
        let observed: Vec<Category> = self
            .stack
            .iter()
            .rev()
            .take(4)
            .map(Value::category)
            .collect();
        VmError::InternalInconsistency(format!(
            "{instruction}: no form matches top of stack categories {observed:?}"
        ))
    }

    pub fn pop_category1(&mut self) -> VmExecResult<()> {
        if let Some([One]) = self.top_categories::<1>() {
            self.pop()?;
            Ok(())
        } else {
            Err(self.no_matching_form("pop", 1))
        }
    }

    pub fn pop2(&mut self) -> VmExecResult<()> {
        if let Some([Two]) = self.top_categories::<1>() {
            self.pop()?;
        } else if let Some([One, One]) = self.top_categories::<2>() {
            self.pop_top::<2>()?;
        } else {
            return Err(self.no_matching_form("pop2", 1));
        }
        Ok(())
    }

    pub fn dup(&mut self) -> VmExecResult<()> {
        if let Some([One]) = self.top_categories::<1>() {
            self.reserve(1)?;
            let [value1] = self.pop_top::<1>()?;
            self.push_all(&[value1, value1])
        } else {
            Err(self.no_matching_form("dup", 1))
        }
    }

    pub fn dup_x1(&mut self) -> VmExecResult<()> {
        if let Some([One, One]) = self.top_categories::<2>() {
            self.reserve(1)?;
            let [value1, value2] = self.pop_top::<2>()?;
            self.push_all(&[value1, value2, value1])
        } else {
            Err(self.no_matching_form("dup_x1", 2))
        }
    }

    pub fn dup_x2(&mut self) -> VmExecResult<()> {
        if let Some([One, Two]) = self.top_categories::<2>() {
            // form 2
            self.reserve(1)?;
            let [value1, value2] = self.pop_top::<2>()?;
            self.push_all(&[value1, value2, value1])
        } else if let Some([One, One, One]) = self.top_categories::<3>() {
            // form 1
            self.reserve(1)?;
            let [value1, value2, value3] = self.pop_top::<3>()?;
            self.push_all(&[value1, value3, value2, value1])
        } else {
            Err(self.no_matching_form("dup_x2", 2))
        }
    }

    pub fn dup2(&mut self) -> VmExecResult<()> {
        if let Some([Two]) = self.top_categories::<1>() {
            // form 2
            self.reserve(2)?;
            let [value1] = self.pop_top::<1>()?;
            self.push_all(&[value1, value1])
        } else if let Some([One, One]) = self.top_categories::<2>() {
            // form 1
            self.reserve(2)?;
            let [value1, value2] = self.pop_top::<2>()?;
            self.push_all(&[value2, value1, value2, value1])
        } else {
            Err(self.no_matching_form("dup2", 1))
        }
    }

    pub fn dup2_x1(&mut self) -> VmExecResult<()> {
        if let Some([Two, One]) = self.top_categories::<2>() {
            // form 2
            self.reserve(2)?;
            let [value1, value2] = self.pop_top::<2>()?;
            self.push_all(&[value1, value2, value1])
        } else if let Some([One, One, One]) = self.top_categories::<3>() {
            // form 1
            self.reserve(2)?;
            let [value1, value2, value3] = self.pop_top::<3>()?;
            self.push_all(&[value2, value1, value3, value2, value1])
        } else {
            Err(self.no_matching_form("dup2_x1", 2))
        }
    }

    pub fn dup2_x2(&mut self) -> VmExecResult<()> {
        if let Some([Two, Two]) = self.top_categories::<2>() {
            // form 4
            self.reserve(2)?;
            let [value1, value2] = self.pop_top::<2>()?;
            self.push_all(&[value1, value2, value1])
        } else if let Some([One, One, Two]) = self.top_categories::<3>() {
            // form 3
            self.reserve(2)?;
            let [value1, value2, value3] = self.pop_top::<3>()?;
            self.push_all(&[value2, value1, value3, value2, value1])
        } else if let Some([Two, One, One]) = self.top_categories::<3>() {
            // form 2
            self.reserve(2)?;
            let [value1, value2, value3] = self.pop_top::<3>()?;
            self.push_all(&[value1, value3, value2, value1])
        } else if let Some([One, One, One, One]) = self.top_categories::<4>() {
            // form 1
            self.reserve(2)?;
            let [value1, value2, value3, value4] = self.pop_top::<4>()?;
            self.push_all(&[value2, value1, value4, value3, value2, value1])
        } else {
            Err(self.no_matching_form("dup2_x2", 2))
        }
    }

    pub fn swap(&mut self) -> VmExecResult<()> {
        if let Some([One, One]) = self.top_categories::<2>() {
            let [value1, value2] = self.pop_top::<2>()?;
            self.push_all(&[value1, value2])
        } else {
            Err(self.no_matching_form("swap", 2))
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::jvm_error::VmError;
    use crate::jvm_values::ObjectReference;
    use crate::jvm_values::Value::{self, Double, Float, Int, Long, Null, ObjectRef};
    use crate::operand_stack::OperandStack;

    fn stack_of(values: &[Value]) -> OperandStack {
        let mut stack = OperandStack::new(32);
        for value in values {
            stack.push(*value).unwrap();
        }
        stack
    }

    fn is_internal_inconsistency<T>(result: Result<T, VmError>) -> bool {
        matches!(result, Err(VmError::InternalInconsistency(_)))
    }

    #[test]
    fn capacity_counts_slots() {
        let mut stack = OperandStack::new(3);
        stack.push(Long(1)).unwrap();
        stack.push(Int(2)).unwrap();
        assert_eq!(stack.used_slots(), 3);
        assert_eq!(stack.push(Int(3)), Err(VmError::StackOverFlow));
        stack.pop().unwrap();
        assert_eq!(stack.push(Double(1.0)), Err(VmError::StackOverFlow));
        stack.push(Float(1.0)).unwrap();
        assert_eq!(stack.len(), 2);
    }

    #[test]
    fn overflowing_shuffle_leaves_stack_untouched() {
        let mut stack = OperandStack::new(2);
        stack.push(Int(2)).unwrap();
        stack.push(Int(1)).unwrap();
        assert_eq!(stack.dup_x1(), Err(VmError::StackOverFlow));
        assert_eq!(stack.values(), &[Int(2), Int(1)]);
        assert_eq!(stack.dup(), Err(VmError::StackOverFlow));
        assert_eq!(stack.used_slots(), 2);

        let mut stack = OperandStack::new(5);
        for value in [Int(4), Int(3), Int(2), Int(1)] {
            stack.push(value).unwrap();
        }
        assert_eq!(stack.dup2_x2(), Err(VmError::StackOverFlow));
        assert_eq!(stack.values(), &[Int(4), Int(3), Int(2), Int(1)]);

        let mut stack = OperandStack::new(5);
        stack.push(Long(2)).unwrap();
        stack.push(Int(1)).unwrap();
        stack.push(Int(0)).unwrap();
        assert_eq!(stack.dup2_x2(), Err(VmError::StackOverFlow));
        assert_eq!(stack.values(), &[Long(2), Int(1), Int(0)]);
        stack.swap().unwrap();
        assert_eq!(stack.values(), &[Long(2), Int(0), Int(1)]);
    }

    #[test]
    fn pop_from_empty_stack() {
        let mut stack = OperandStack::new(4);
        assert_eq!(stack.pop(), Err(VmError::PopFromEmptyStack));
        assert_eq!(stack.pop_category1(), Err(VmError::PopFromEmptyStack));
        assert_eq!(stack.pop2(), Err(VmError::PopFromEmptyStack));
    }

    #[test]
    fn pop_requires_category1() {
        let mut stack = stack_of(&[Int(1), Null]);
        stack.pop_category1().unwrap();
        assert_eq!(stack.values(), &[Int(1)]);

        let mut stack = stack_of(&[Long(1)]);
        assert!(is_internal_inconsistency(stack.pop_category1()));
        assert_eq!(stack.values(), &[Long(1)]);
    }

    #[test]
    fn pop2_forms() {
        let mut stack = stack_of(&[Int(0), Double(1.0)]);
        stack.pop2().unwrap();
        assert_eq!(stack.values(), &[Int(0)]);

        let mut stack = stack_of(&[Long(0), Int(1), Float(2.0)]);
        stack.pop2().unwrap();
        assert_eq!(stack.values(), &[Long(0)]);

        let mut stack = stack_of(&[Long(0), Int(1)]);
        assert!(is_internal_inconsistency(stack.pop2()));
        assert_eq!(stack.values(), &[Long(0), Int(1)]);
    }

    #[test]
    fn dup_then_two_pops_restores_depth() {
        let mut stack = stack_of(&[Long(7), Int(3)]);
        stack.dup().unwrap();
        assert_eq!(stack.values(), &[Long(7), Int(3), Int(3)]);
        stack.pop_category1().unwrap();
        stack.pop_category1().unwrap();
        assert_eq!(stack.len(), 1);

        assert!(is_internal_inconsistency(stack.dup()));
    }

    #[test]
    fn swap_inverts_order_once() {
        let object = ObjectRef(ObjectReference(1));
        for (a, b) in [(Int(1), Int(2)), (Float(1.5), object), (Null, Int(9))] {
            let mut stack = stack_of(&[b, a]);
            stack.swap().unwrap();
            assert_eq!(stack.values(), &[a, b]);
        }
        let mut stack = stack_of(&[Int(1), Long(2)]);
        assert!(is_internal_inconsistency(stack.swap()));
    }

    #[test]
    fn dup_x1_inserts_below_second() {
        let mut stack = stack_of(&[Int(2), Int(1)]);
        stack.dup_x1().unwrap();
        assert_eq!(stack.values(), &[Int(1), Int(2), Int(1)]);

        let mut stack = stack_of(&[Double(2.0), Int(1)]);
        assert!(is_internal_inconsistency(stack.dup_x1()));
    }

    #[test]
    fn dup_x2_forms() {
        let mut stack = stack_of(&[Long(2), Int(1)]);
        stack.dup_x2().unwrap();
        assert_eq!(stack.values(), &[Int(1), Long(2), Int(1)]);

        let mut stack = stack_of(&[Int(3), Int(2), Int(1)]);
        stack.dup_x2().unwrap();
        assert_eq!(stack.values(), &[Int(1), Int(3), Int(2), Int(1)]);

        let mut stack = stack_of(&[Long(3), Int(2), Int(1)]);
        assert!(is_internal_inconsistency(stack.dup_x2()));
    }

    #[test]
    fn dup2_forms() {
        let mut stack = stack_of(&[Double(1.0)]);
        stack.dup2().unwrap();
        assert_eq!(stack.values(), &[Double(1.0), Double(1.0)]);

        let mut stack = stack_of(&[Int(2), Int(1)]);
        stack.dup2().unwrap();
        assert_eq!(stack.values(), &[Int(2), Int(1), Int(2), Int(1)]);

        let mut stack = stack_of(&[Long(2), Int(1)]);
        assert!(is_internal_inconsistency(stack.dup2()));
    }

    #[test]
    fn dup2_x1_forms() {
        let mut stack = stack_of(&[Int(2), Long(1)]);
        stack.dup2_x1().unwrap();
        assert_eq!(stack.values(), &[Long(1), Int(2), Long(1)]);

        let mut stack = stack_of(&[Int(3), Int(2), Int(1)]);
        stack.dup2_x1().unwrap();
        assert_eq!(
            stack.values(),
            &[Int(2), Int(1), Int(3), Int(2), Int(1)]
        );

        let mut stack = stack_of(&[Long(3), Int(2), Int(1)]);
        assert!(is_internal_inconsistency(stack.dup2_x1()));
    }

    #[test]
    fn dup2_x2_forms() {
        // form 4
        let mut stack = stack_of(&[Double(2.0), Long(1)]);
        stack.dup2_x2().unwrap();
        assert_eq!(stack.values(), &[Long(1), Double(2.0), Long(1)]);

        // form 3
        let mut stack = stack_of(&[Long(3), Int(2), Int(1)]);
        stack.dup2_x2().unwrap();
        assert_eq!(
            stack.values(),
            &[Int(2), Int(1), Long(3), Int(2), Int(1)]
        );

        // form 2
        let mut stack = stack_of(&[Int(3), Int(2), Double(1.0)]);
        stack.dup2_x2().unwrap();
        assert_eq!(
            stack.values(),
            &[Double(1.0), Int(3), Int(2), Double(1.0)]
        );

        // form 1
        let mut stack = stack_of(&[Int(4), Int(3), Int(2), Int(1)]);
        stack.dup2_x2().unwrap();
        assert_eq!(
            stack.values(),
            &[Int(2), Int(1), Int(4), Int(3), Int(2), Int(1)]
        );
    }

    #[test]
    fn dup2_x2_rejects_unknown_forms() {
        for values in [
            vec![Long(2), Int(1)],
            vec![Int(3), Long(2), Int(1)],
            vec![Long(4), Int(3), Int(2), Int(1)],
            vec![Int(2), Long(1)],
        ] {
            let mut stack = stack_of(&values);
            assert!(is_internal_inconsistency(stack.dup2_x2()));
            assert_eq!(stack.values(), values.as_slice());
        }
        let mut stack = stack_of(&[Int(1)]);
        assert_eq!(stack.dup2_x2(), Err(VmError::PopFromEmptyStack));
    }
}
