use crate::utils::{init_logger, method};
use jvm_exec_core::jvm_error::VmError;
use jvm_exec_core::jvm_values::Value::{Int, Long, ReturnAddress};
use jvm_exec_core::scheduler::{Scheduler, SchedulerConfig};

#[test]
fn wide_local_access_above_255() {
    init_logger();
    let code = [
        0xc4, 0x15, 0x01, 0x04, // wide iload 260
        0xc4, 0x36, 0x01, 0x05, // wide istore 261
        0xc4, 0x84, 0x01, 0x05, 0x03, 0xe8, // wide iinc 261 1000
        0x00, // nop
    ];
    let method = method(&code, 1, 262);
    let mut scheduler = Scheduler::new(SchedulerConfig {
        quantum: 3,
        heap_capacity: 1,
    });
    let mut args = vec![Int(0); 260];
    args.push(Int(-1));
    let thread = scheduler.spawn(&method, args).unwrap();

    scheduler.run_round().unwrap();
    let frame = scheduler.thread(thread).unwrap().current_frame().unwrap();
    assert_eq!(frame.get_local(261).unwrap(), Int(999));
    assert_eq!(frame.get_local(260).unwrap(), Int(-1));
    assert!(frame.op_stack().is_empty());

    assert_eq!(scheduler.run().unwrap(), 1);
}

#[test]
fn subroutine_return_skips_ahead() {
    init_logger();
    let code = [
        0xa9, 0x01, // ret 1
        0xfe, // impdep1, never reached
        0x16, 0x02, // lload 2
        0x58, // pop2
    ];
    let method = method(&code, 2, 4);
    let mut scheduler = Scheduler::new(SchedulerConfig::default());
    scheduler
        .spawn(&method, vec![Int(0), ReturnAddress(3), Long(8)])
        .unwrap();
    assert_eq!(scheduler.run().unwrap(), 1);
}

#[test]
fn reserved_op_code_aborts_the_run() {
    init_logger();
    let code = [0x00, 0xca];
    let method = method(&code, 0, 0);
    let mut scheduler = Scheduler::new(SchedulerConfig::default());
    scheduler.spawn(&method, vec![]).unwrap();
    assert!(matches!(
        scheduler.run(),
        Err(VmError::MalformedBytecode(_))
    ));
}
