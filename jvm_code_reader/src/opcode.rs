use strum_macros::{Display, FromRepr};

/// Op codes understood by the execution core.
///
/// https://docs.oracle.com/javase/specs/jvms/se21/html/jvms-7.html
#[allow(non_camel_case_types)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, FromRepr)]
#[strum(serialize_all = "lowercase")]
#[repr(u8)]
pub enum Opcode {
    Nop = 0x00,

    Iload = 0x15,
    Lload = 0x16,
    Fload = 0x17,
    Dload = 0x18,
    Aload = 0x19,
    Iload_0 = 0x1a,
    Iload_1 = 0x1b,
    Iload_2 = 0x1c,
    Iload_3 = 0x1d,
    Lload_0 = 0x1e,
    Lload_1 = 0x1f,
    Lload_2 = 0x20,
    Lload_3 = 0x21,
    Fload_0 = 0x22,
    Fload_1 = 0x23,
    Fload_2 = 0x24,
    Fload_3 = 0x25,
    Dload_0 = 0x26,
    Dload_1 = 0x27,
    Dload_2 = 0x28,
    Dload_3 = 0x29,
    Aload_0 = 0x2a,
    Aload_1 = 0x2b,
    Aload_2 = 0x2c,
    Aload_3 = 0x2d,

    Istore = 0x36,
    Lstore = 0x37,
    Fstore = 0x38,
    Dstore = 0x39,
    Astore = 0x3a,
    Istore_0 = 0x3b,
    Istore_1 = 0x3c,
    Istore_2 = 0x3d,
    Istore_3 = 0x3e,
    Lstore_0 = 0x3f,
    Lstore_1 = 0x40,
    Lstore_2 = 0x41,
    Lstore_3 = 0x42,
    Fstore_0 = 0x43,
    Fstore_1 = 0x44,
    Fstore_2 = 0x45,
    Fstore_3 = 0x46,
    Dstore_0 = 0x47,
    Dstore_1 = 0x48,
    Dstore_2 = 0x49,
    Dstore_3 = 0x4a,
    Astore_0 = 0x4b,
    Astore_1 = 0x4c,
    Astore_2 = 0x4d,
    Astore_3 = 0x4e,

    Pop = 0x57,
    Pop2 = 0x58,
    Dup = 0x59,
    Dup_x1 = 0x5a,
    Dup_x2 = 0x5b,
    Dup2 = 0x5c,
    Dup2_x1 = 0x5d,
    Dup2_x2 = 0x5e,
    Swap = 0x5f,

    Iinc = 0x84,
    Ret = 0xa9,
    Invokedynamic = 0xba,
    Monitorenter = 0xc2,
    Monitorexit = 0xc3,
    Wide = 0xc4,

    // reserved
    Breakpoint = 0xca,
    Impdep1 = 0xfe,
    Impdep2 = 0xff,
}

impl Opcode {
    /// Op codes that may follow a `wide` prefix.
    pub fn is_widenable(&self) -> bool {
        matches!(
            self,
            Opcode::Iload
                | Opcode::Lload
                | Opcode::Fload
                | Opcode::Dload
                | Opcode::Aload
                | Opcode::Istore
                | Opcode::Lstore
                | Opcode::Fstore
                | Opcode::Dstore
                | Opcode::Astore
                | Opcode::Iinc
                | Opcode::Ret
        )
    }
}
