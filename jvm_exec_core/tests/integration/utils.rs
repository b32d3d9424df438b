use jvm_exec_core::stack_frame::MethodCode;

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn method(code: &[u8], max_stack: u16, max_locals: u16) -> MethodCode<'_> {
    MethodCode {
        code,
        max_stack,
        max_locals,
    }
}
