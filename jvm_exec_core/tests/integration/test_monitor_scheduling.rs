use crate::utils::{init_logger, method};
use jvm_exec_core::java_thread::ThreadId;
use jvm_exec_core::jvm_error::VmError;
use jvm_exec_core::jvm_values::Value::{Int, ObjectRef};
use jvm_exec_core::scheduler::{Scheduler, SchedulerConfig};

// synchronized (lock) { synchronized (lock) { work } }
const NESTED_SYNCHRONIZED: [u8; 10] = [
    0x2a, 0xc2, // aload_0 monitorenter
    0x2a, 0xc2, // aload_0 monitorenter
    0x1b, 0x57, // iload_1 pop
    0x2a, 0xc3, // aload_0 monitorexit
    0x2a, 0xc3, // aload_0 monitorexit
];

// synchronized (first) { synchronized (second) {} }
const LOCK_TWO: [u8; 8] = [
    0x2a, 0xc2, // aload_0 monitorenter
    0x2b, 0xc2, // aload_1 monitorenter
    0x2b, 0xc3, // aload_1 monitorexit
    0x2a, 0xc3, // aload_0 monitorexit
];

#[test]
fn contending_threads_take_turns_on_a_monitor() {
    init_logger();
    let code = NESTED_SYNCHRONIZED;
    let method = method(&code, 2, 2);
    let mut scheduler = Scheduler::new(SchedulerConfig {
        quantum: 3,
        heap_capacity: 4,
    });
    let lock = scheduler.heap_mut().allocate_object("java/lang/Object").unwrap();
    let first = scheduler.spawn(&method, vec![ObjectRef(lock), Int(1)]).unwrap();
    let second = scheduler.spawn(&method, vec![ObjectRef(lock), Int(2)]).unwrap();

    let report = scheduler.run_round().unwrap();
    assert_eq!(report.executed, 4);
    assert_eq!(report.waiting, vec![second]);
    let monitor = *scheduler.heap().get(lock).unwrap().monitor().unwrap();
    assert_eq!(monitor.owner(), first);

    // the waiting thread kept the reference and sits on its monitorenter
    let waiting_frame = scheduler.thread(second).unwrap().current_frame().unwrap();
    assert_eq!(waiting_frame.op_stack().values(), &[ObjectRef(lock)]);
    assert_eq!(waiting_frame.pc(), 1);

    scheduler.run().unwrap();
    assert_eq!(scheduler.live_threads(), 0);
    assert!(!scheduler.heap().get(lock).unwrap().is_locked());
}

#[test]
fn independent_monitors_do_not_contend() {
    init_logger();
    let code = NESTED_SYNCHRONIZED;
    let method = method(&code, 2, 2);
    let mut scheduler = Scheduler::new(SchedulerConfig {
        quantum: 2,
        heap_capacity: 4,
    });
    let first_lock = scheduler.heap_mut().allocate_object("A").unwrap();
    let second_lock = scheduler.heap_mut().allocate_object("B").unwrap();
    scheduler.spawn(&method, vec![ObjectRef(first_lock), Int(0)]).unwrap();
    scheduler.spawn(&method, vec![ObjectRef(second_lock), Int(0)]).unwrap();

    while scheduler.live_threads() > 0 {
        let report = scheduler.run_round().unwrap();
        assert!(report.waiting.is_empty());
    }
    assert!(!scheduler.heap().get(first_lock).unwrap().is_locked());
    assert!(!scheduler.heap().get(second_lock).unwrap().is_locked());
}

#[test]
fn opposite_lock_order_is_a_deadlock() {
    init_logger();
    let code = LOCK_TWO;
    let method = method(&code, 1, 2);
    let mut scheduler = Scheduler::new(SchedulerConfig {
        quantum: 2,
        heap_capacity: 4,
    });
    let a = scheduler.heap_mut().allocate_object("A").unwrap();
    let b = scheduler.heap_mut().allocate_object("B").unwrap();
    let first = scheduler.spawn(&method, vec![ObjectRef(a), ObjectRef(b)]).unwrap();
    let second = scheduler.spawn(&method, vec![ObjectRef(b), ObjectRef(a)]).unwrap();

    assert_eq!(
        scheduler.run(),
        Err(VmError::Deadlock(vec![first, second]))
    );
    let heap = scheduler.heap();
    assert_eq!(heap.get(a).unwrap().monitor().unwrap().owner(), first);
    assert_eq!(heap.get(b).unwrap().monitor().unwrap().owner(), second);
    assert_eq!(first, ThreadId(0));
}
