use serde::Serialize;

/// Grouping used for documentation and for scheduling: only `Action`
/// instructions hand control back to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Stack,
    Mathematical,
    Flow,
    Action,
    Sensing,
    /// Extra host operations supplied for a particular program.
    Special,
    Custom,
}

impl Category {
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Stack => "stack",
            Category::Mathematical => "mathematical",
            Category::Flow => "flow",
            Category::Action => "action",
            Category::Sensing => "sensing",
            Category::Special => "special",
            Category::Custom => "custom",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
    Push,
    Pop,
    Dup,
    Swap,
    Rot3,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Rand,
    If,
    Move,
    Left,
    Up,
    Right,
    Down,
    Wait,
    Def,
    Look,
}

/// Static description of a built-in.
#[derive(Debug, Serialize)]
pub struct OpcodeInfo {
    pub name: &'static str,
    pub category: Category,
    pub min_depth: usize,
    pub syntax: &'static str,
    pub description: &'static str,
}

// Block delimiters. They are never dispatched, only matched.
pub const IF: &str = "IF";
pub const ELSE: &str = "ELSE";
pub const END: &str = "END";
pub const DEF: &str = "DEF";

/// Tokens that open a block closed by `END`.
pub fn opens_block(token: &str) -> bool {
    token == IF || token == DEF
}

pub fn is_delimiter(token: &str) -> bool {
    token == ELSE || token == END
}

impl Opcode {
    pub const ALL: [Opcode; 20] = [
        Opcode::Push,
        Opcode::Pop,
        Opcode::Dup,
        Opcode::Swap,
        Opcode::Rot3,
        Opcode::Add,
        Opcode::Sub,
        Opcode::Mul,
        Opcode::Div,
        Opcode::Mod,
        Opcode::Rand,
        Opcode::If,
        Opcode::Move,
        Opcode::Left,
        Opcode::Up,
        Opcode::Right,
        Opcode::Down,
        Opcode::Wait,
        Opcode::Def,
        Opcode::Look,
    ];

    pub fn from_name(name: &str) -> Option<Opcode> {
        Opcode::ALL.into_iter().find(|op| op.name() == name)
    }

    pub fn name(self) -> &'static str {
        self.info().name
    }

    pub fn category(self) -> Category {
        self.info().category
    }

    pub fn min_depth(self) -> usize {
        self.info().min_depth
    }

    pub fn info(self) -> &'static OpcodeInfo {
        match self {
            Opcode::Push => &PUSH,
            Opcode::Pop => &POP,
            Opcode::Dup => &DUP,
            Opcode::Swap => &SWAP,
            Opcode::Rot3 => &ROT3,
            Opcode::Add => &ADD,
            Opcode::Sub => &SUB,
            Opcode::Mul => &MUL,
            Opcode::Div => &DIV,
            Opcode::Mod => &MOD,
            Opcode::Rand => &RAND,
            Opcode::If => &IF_INFO,
            Opcode::Move => &MOVE,
            Opcode::Left => &LEFT,
            Opcode::Up => &UP,
            Opcode::Right => &RIGHT,
            Opcode::Down => &DOWN,
            Opcode::Wait => &WAIT,
            Opcode::Def => &DEF_INFO,
            Opcode::Look => &LOOK,
        }
    }
}

impl std::fmt::Display for Opcode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// ── Catalogue ───────────────────────────────────────────────────────

static PUSH: OpcodeInfo = OpcodeInfo {
    name: "PUSH",
    category: Category::Stack,
    min_depth: 0,
    syntax: "PUSH <value>",
    description: "Push a value (0-9) onto the stack.",
};
static POP: OpcodeInfo = OpcodeInfo {
    name: "POP",
    category: Category::Stack,
    min_depth: 1,
    syntax: "POP",
    description: "Pop the top value off the stack.",
};
static DUP: OpcodeInfo = OpcodeInfo {
    name: "DUP",
    category: Category::Stack,
    min_depth: 1,
    syntax: "DUP",
    description: "Duplicate the value on top of the stack.",
};
static SWAP: OpcodeInfo = OpcodeInfo {
    name: "SWAP",
    category: Category::Stack,
    min_depth: 2,
    syntax: "SWAP",
    description: "Swap the 2 values on top of the stack.",
};
static ROT3: OpcodeInfo = OpcodeInfo {
    name: "ROT3",
    category: Category::Stack,
    min_depth: 3,
    syntax: "ROT3",
    description: "Pop the 3rd value on the stack and put it on top.",
};
static ADD: OpcodeInfo = OpcodeInfo {
    name: "ADD",
    category: Category::Mathematical,
    min_depth: 2,
    syntax: "ADD",
    description: "Pop the top 2 values off the stack and push their sum to the top.",
};
static SUB: OpcodeInfo = OpcodeInfo {
    name: "SUB",
    category: Category::Mathematical,
    min_depth: 2,
    syntax: "SUB",
    description: "Pop the top 2 values off the stack and push their difference (a - b) to the top.",
};
static MUL: OpcodeInfo = OpcodeInfo {
    name: "MUL",
    category: Category::Mathematical,
    min_depth: 2,
    syntax: "MUL",
    description: "Pop the top 2 values off the stack and push their product to the top.",
};
static DIV: OpcodeInfo = OpcodeInfo {
    name: "DIV",
    category: Category::Mathematical,
    min_depth: 2,
    syntax: "DIV",
    description: "Pop the top 2 values off the stack and push their quotient (floor(a/b)) to the top.",
};
static MOD: OpcodeInfo = OpcodeInfo {
    name: "MOD",
    category: Category::Mathematical,
    min_depth: 2,
    syntax: "MOD",
    description: "Pop the top 2 values off the stack and push their modulus (a % b) to the top.",
};
static RAND: OpcodeInfo = OpcodeInfo {
    name: "RAND",
    category: Category::Mathematical,
    min_depth: 2,
    syntax: "RAND",
    description: "Pop the top 2 values (max, min) off the stack and push a random x with min <= x < max.",
};
static IF_INFO: OpcodeInfo = OpcodeInfo {
    name: "IF",
    category: Category::Flow,
    min_depth: 1,
    syntax: "IF <terms> END | IF <terms> ELSE <terms> END",
    description: "Pop the top value. If it is non-zero, run the first terms; otherwise run the ELSE terms, if any.",
};
static MOVE: OpcodeInfo = OpcodeInfo {
    name: "MOVE",
    category: Category::Action,
    min_depth: 1,
    syntax: "MOVE",
    description: "Pop the top value and move: 0=rest, 1=up, 2=right, 3=down, 4=left. Any other value does nothing.",
};
static LEFT: OpcodeInfo = OpcodeInfo {
    name: "LEFT",
    category: Category::Action,
    min_depth: 0,
    syntax: "LEFT",
    description: "Move left, if possible.",
};
static UP: OpcodeInfo = OpcodeInfo {
    name: "UP",
    category: Category::Action,
    min_depth: 0,
    syntax: "UP",
    description: "Move up, if possible.",
};
static RIGHT: OpcodeInfo = OpcodeInfo {
    name: "RIGHT",
    category: Category::Action,
    min_depth: 0,
    syntax: "RIGHT",
    description: "Move right, if possible.",
};
static DOWN: OpcodeInfo = OpcodeInfo {
    name: "DOWN",
    category: Category::Action,
    min_depth: 0,
    syntax: "DOWN",
    description: "Move down, if possible.",
};
static WAIT: OpcodeInfo = OpcodeInfo {
    name: "WAIT",
    category: Category::Action,
    min_depth: 0,
    syntax: "WAIT",
    description: "Wait for 1 turn.",
};
static DEF_INFO: OpcodeInfo = OpcodeInfo {
    name: "DEF",
    category: Category::Custom,
    min_depth: 0,
    syntax: "DEF <name> <terms> END",
    description: "Define a command with the given name. Whenever the program finds it, it is replaced with the given terms.",
};
static LOOK: OpcodeInfo = OpcodeInfo {
    name: "LOOK",
    category: Category::Sensing,
    min_depth: 1,
    syntax: "LOOK",
    description: "Pop a direction (1-4) and push what is next to you: -1=outside, 0=empty, 1=block, 2=exit, 3=spike.",
};
