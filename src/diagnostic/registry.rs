/// An entry in the error code registry.
pub struct ErrorEntry {
    pub code: &'static str,
    pub short: &'static str,
    pub long: &'static str,
}

/// All stable error codes reported by `stacked`.
pub static REGISTRY: &[ErrorEntry] = &[
    // ── Lexer ────────────────────────────────────────────────────────────────
    ErrorEntry {
        code: "STK-L001",
        short: "control character in program",
        long: r#"## STK-L001: control character in program

Programs are terms separated by whitespace. Anything between a pair of
`#`s, or from a `#` to the end of the line, is a comment. A term may use
any printable character, but control characters (escape, NUL, bell and
the like) are rejected before the program starts.

This usually means a binary file or pasted terminal escape codes.
"#,
    },

    // ── Runtime ──────────────────────────────────────────────────────────────
    ErrorEntry {
        code: "STK-R001",
        short: "unknown instruction",
        long: r#"## STK-R001: unknown instruction

The term is not an instruction available to this program. It is not a
built-in, it is not whitelisted for this level, or it names a function
that has not been defined with DEF yet.

Names are case-sensitive: `push` is not `PUSH`.

The same error is raised when PUSH is followed by something that is not
a number:

    PUSH RIGHT

and for an ELSE or END with no IF or DEF open:

    RIGHT END
"#,
    },
    ErrorEntry {
        code: "STK-R002",
        short: "stack underflow",
        long: r#"## STK-R002: stack underflow

The instruction needs more values on the stack than there are.

**Example:**

    PUSH 1 ADD      -- ADD needs two values

The program stops before the instruction runs, so nothing is popped.
"#,
    },
    ErrorEntry {
        code: "STK-R003",
        short: "literal out of range",
        long: r#"## STK-R003: literal out of range

PUSH only accepts the literals 0 to 9. Build larger values with
arithmetic:

    PUSH 9 PUSH 3 MUL   -- 27
"#,
    },
    ErrorEntry {
        code: "STK-R004",
        short: "division by zero",
        long: r#"## STK-R004: division by zero

DIV and MOD fail when the top of the stack (the divisor) is 0.
Both operands have already been popped when this happens.
"#,
    },
    ErrorEntry {
        code: "STK-R005",
        short: "empty random range",
        long: r#"## STK-R005: empty random range

RAND pops `max` and then `min` and needs `min < max`.

**Example:**

    PUSH 4 PUSH 4 RAND   -- fails: the range [4, 4) is empty
"#,
    },
    ErrorEntry {
        code: "STK-R006",
        short: "unterminated block",
        long: r#"## STK-R006: unterminated block

An IF or DEF has no matching END. Every nested IF and DEF needs its
own END.

**Example:**

    DEF HOP UP UP
"#,
    },
    ErrorEntry {
        code: "STK-R007",
        short: "program too long",
        long: r#"## STK-R007: program too long

The program ran for more steps than allowed. This usually means a
function calls itself with no way out:

    DEF LOOP RIGHT LOOP END LOOP

Guard recursive calls with IF, or raise the limit with `--max-steps`.
"#,
    },
    ErrorEntry {
        code: "STK-R008",
        short: "missing operand term",
        long: r#"## STK-R008: missing operand term

PUSH or DEF was the last term of the program, so its literal or name
is missing.
"#,
    },
    ErrorEntry {
        code: "STK-R009",
        short: "host operation failed",
        long: r#"## STK-R009: host operation failed

An extra instruction provided by the level reported a failure. The
message comes from that instruction.
"#,
    },

    // ── Config ───────────────────────────────────────────────────────────────
    ErrorEntry {
        code: "STK-C001",
        short: "cannot read config",
        long: r#"## STK-C001: cannot read config

The file given with `--config` could not be read.
"#,
    },
    ErrorEntry {
        code: "STK-C002",
        short: "invalid config",
        long: r#"## STK-C002: invalid config

The config file is not valid JSON or has an unknown key. Known keys are
`available`, `max_steps`, `seed`, `delay_ms`, `stack` and `world`.
"#,
    },
    ErrorEntry {
        code: "STK-C003",
        short: "unknown built-in in whitelist",
        long: r#"## STK-C003: unknown built-in in whitelist

A name in `available` or `--allow` is not a built-in instruction.
Run `stacked ops` for the full list.
"#,
    },
];

/// Look up an error entry by code (e.g. `"STK-R002"`).
pub fn lookup(code: &str) -> Option<&'static ErrorEntry> {
    REGISTRY.iter().find(|e| e.code.eq_ignore_ascii_case(code))
}
