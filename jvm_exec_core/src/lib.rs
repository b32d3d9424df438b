pub mod java_thread;
pub mod jvm_error;
pub mod jvm_values;
pub mod local_variables;
pub mod monitor;
pub mod object_heap;
pub mod operand_stack;
pub mod scheduler;
pub mod stack_frame;
