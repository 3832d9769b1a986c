//! Lua 5.3 instruction set.
//!
//! An instruction is a 32-bit word: the low 6 bits select the opcode, the
//! opcode's mode selects how the remaining 26 bits split into operands.

use std::fmt;

use crate::dispatch::TagTable;

/// Operand layout of an instruction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpMode {
    /// A(8) C(9) B(9)
    ABC,
    /// A(8) Bx(18)
    ABx,
    /// A(8) sBx(18, excess-K)
    AsBx,
    /// Ax(26)
    Ax,
}

const OPCODES: [(&str, OpMode); 47] = [
    ("MOVE", OpMode::ABC),
    ("LOADK", OpMode::ABx),
    ("LOADKX", OpMode::ABx),
    ("LOADBOOL", OpMode::ABC),
    ("LOADNIL", OpMode::ABC),
    ("GETUPVAL", OpMode::ABC),
    ("GETTABUP", OpMode::ABC),
    ("GETTABLE", OpMode::ABC),
    ("SETTABUP", OpMode::ABC),
    ("SETUPVAL", OpMode::ABC),
    ("SETTABLE", OpMode::ABC),
    ("NEWTABLE", OpMode::ABC),
    ("SELF", OpMode::ABC),
    ("ADD", OpMode::ABC),
    ("SUB", OpMode::ABC),
    ("MUL", OpMode::ABC),
    ("MOD", OpMode::ABC),
    ("POW", OpMode::ABC),
    ("DIV", OpMode::ABC),
    ("IDIV", OpMode::ABC),
    ("BAND", OpMode::ABC),
    ("BOR", OpMode::ABC),
    ("BXOR", OpMode::ABC),
    ("SHL", OpMode::ABC),
    ("SHR", OpMode::ABC),
    ("UNM", OpMode::ABC),
    ("BNOT", OpMode::ABC),
    ("NOT", OpMode::ABC),
    ("LEN", OpMode::ABC),
    ("CONCAT", OpMode::ABC),
    ("JMP", OpMode::AsBx),
    ("EQ", OpMode::ABC),
    ("LT", OpMode::ABC),
    ("LE", OpMode::ABC),
    ("TEST", OpMode::ABC),
    ("TESTSET", OpMode::ABC),
    ("CALL", OpMode::ABC),
    ("TAILCALL", OpMode::ABC),
    ("RETURN", OpMode::ABC),
    ("FORLOOP", OpMode::AsBx),
    ("FORPREP", OpMode::AsBx),
    ("TFORCALL", OpMode::ABC),
    ("TFORLOOP", OpMode::AsBx),
    ("SETLIST", OpMode::ABC),
    ("CLOSURE", OpMode::ABx),
    ("VARARG", OpMode::ABC),
    ("EXTRAARG", OpMode::Ax),
];

/// A known opcode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Opcode(u8);

impl Opcode {
    /// Load a constant into a register
    pub const LOADK: Opcode = Opcode(1);
    /// Copy an upvalue into a register
    pub const GETUPVAL: Opcode = Opcode(5);
    /// Index a table held in an upvalue
    pub const GETTABUP: Opcode = Opcode(6);
    /// Store into a table held in an upvalue
    pub const SETTABUP: Opcode = Opcode(8);
    /// Store a register into an upvalue
    pub const SETUPVAL: Opcode = Opcode(9);
    /// Return from the function
    pub const RETURN: Opcode = Opcode(38);
    /// Instantiate a nested prototype
    pub const CLOSURE: Opcode = Opcode(44);

    /// Raw opcode number
    pub fn number(self) -> u8 {
        self.0
    }

    /// Mnemonic
    pub fn name(self) -> &'static str {
        OPCODES[usize::from(self.0)].0
    }

    /// Operand layout
    pub fn mode(self) -> OpMode {
        OPCODES[usize::from(self.0)].1
    }
}

impl TagTable for Opcode {
    fn from_tag(tag: u32) -> Option<Self> {
        let number = u8::try_from(tag).ok()?;
        (usize::from(number) < OPCODES.len()).then_some(Opcode(number))
    }
}

const MAXARG_SBX: i32 = (1 << 17) - 1;

/// A decoded instruction word
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instruction {
    word:   u32,
    opcode: Opcode,
}

impl Instruction {
    /// Opcode bits of `word`
    pub fn opcode_bits(word: u32) -> u32 {
        word & 0x3F
    }

    /// Wrap a word whose opcode was already looked up.
    pub fn new(word: u32, opcode: Opcode) -> Self {
        Self { word, opcode }
    }

    /// Raw instruction word
    pub fn word(self) -> u32 {
        self.word
    }

    /// Opcode
    pub fn opcode(self) -> Opcode {
        self.opcode
    }

    /// Operand A
    pub fn a(self) -> u32 {
        (self.word >> 6) & 0xFF
    }

    /// Operand B
    pub fn b(self) -> u32 {
        self.word >> 23
    }

    /// Operand C
    pub fn c(self) -> u32 {
        (self.word >> 14) & 0x1FF
    }

    /// Operand Bx
    pub fn bx(self) -> u32 {
        self.word >> 14
    }

    /// Operand sBx
    pub fn sbx(self) -> i32 {
        self.bx() as i32 - MAXARG_SBX
    }

    /// Operand Ax
    pub fn ax(self) -> u32 {
        self.word >> 6
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.opcode.mode() {
            OpMode::ABC => write!(f, "{} {} {}", self.a(), self.b(), self.c()),
            OpMode::ABx => write!(f, "{} {}", self.a(), self.bx()),
            OpMode::AsBx => write!(f, "{} {}", self.a(), self.sbx()),
            OpMode::Ax => write!(f, "{}", self.ax()),
        }
    }
}
