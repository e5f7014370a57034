//! The stepping loop.
//!
//! The engine pulls one term at a time, resolves it against the active
//! instruction set and applies its effect. Branches and macro calls are
//! spliced back into the pending terms instead of being called, so there is
//! no native recursion and no return address; a runaway program hits the step
//! ceiling rather than the host's call stack.
//!
//! Control goes back to the host after every action instruction (see
//! [`Step::Suspend`]); everything in between runs without yielding.

use tracing::{debug, info, trace, warn};

use crate::blocks;
use crate::config::EngineConfig;
use crate::env::{CellKind, Direction, Environment};
use crate::error::{EngineError, Result};
use crate::opcode::{Category, Opcode};
use crate::stream::TokenStream;
use crate::table::{Entry, InstructionSet};

/// Values PUSH accepts.
pub const PUSH_MIN: i64 = 0;
pub const PUSH_MAX: i64 = 9;

/// Outcome of one unit of work, returned to the driving loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// A non-action term ran; keep going.
    Continue,
    /// An action ran; the host may animate before asking for more.
    Suspend,
    /// Nothing left to run.
    Done,
    Failed(EngineError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum State {
    Running,
    Suspended,
    Completed,
    Failed(EngineError),
}

pub struct Engine {
    stack: Vec<i64>,
    stream: TokenStream,
    table: InstructionSet,
    config: EngineConfig,
    rng: fastrand::Rng,
    steps: u64,
    state: State,
}

impl Engine {
    pub fn new<I, S>(program: I, table: InstructionSet) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Engine {
            stack: Vec::new(),
            stream: TokenStream::new(program),
            table,
            config: EngineConfig::default(),
            rng: fastrand::Rng::new(),
            steps: 0,
            state: State::Running,
        }
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        if let Some(seed) = config.seed {
            self.rng = fastrand::Rng::with_seed(seed);
        }
        self.config = config;
        self
    }

    pub fn with_stack(mut self, stack: Vec<i64>) -> Self {
        self.stack = stack;
        self
    }

    pub fn stack(&self) -> &[i64] {
        &self.stack
    }

    pub fn pending(&self) -> &TokenStream {
        &self.stream
    }

    pub fn table(&self) -> &InstructionSet {
        &self.table
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.state, State::Completed | State::Failed(_))
    }

    /// Run exactly one term. Once finished, keeps reporting the same outcome.
    pub fn step(&mut self, env: &mut dyn Environment) -> Step {
        match &self.state {
            State::Completed => return Step::Done,
            State::Failed(e) => return Step::Failed(e.clone()),
            State::Running | State::Suspended => {}
        }
        self.state = State::Running;
        match self.dispatch(env) {
            Ok(step) => step,
            Err(e) => {
                warn!(error = %e, steps = self.steps, "program failed");
                self.state = State::Failed(e.clone());
                Step::Failed(e)
            }
        }
    }

    /// Run up to and including the next action. Never returns `Continue`.
    pub fn advance(&mut self, env: &mut dyn Environment) -> Step {
        loop {
            match self.step(env) {
                Step::Continue => {}
                other => return other,
            }
        }
    }

    /// Drain the program, ignoring suspension points.
    pub fn run(&mut self, env: &mut dyn Environment) -> Result<&[i64]> {
        loop {
            match self.advance(env) {
                Step::Done => return Ok(&self.stack),
                Step::Failed(e) => return Err(e),
                Step::Continue | Step::Suspend => {}
            }
        }
    }

    fn dispatch(&mut self, env: &mut dyn Environment) -> Result<Step> {
        let Some(term) = self.stream.front() else {
            info!(steps = self.steps, depth = self.stack.len(), "program completed");
            self.state = State::Completed;
            return Ok(Step::Done);
        };
        let entry = self.table.resolve(term).ok_or_else(|| unresolved(term))?;
        let required = entry.min_depth();
        if self.stack.len() < required {
            return Err(EngineError::StackUnderflow {
                name: term.to_string(),
                required,
                actual: self.stack.len(),
            });
        }
        trace!(term, depth = self.stack.len(), "dispatch");
        let category = entry.category();
        let name = self.stream.pop_front().unwrap_or_default();

        match entry {
            Entry::Builtin(op) => self.apply(op, env)?,
            Entry::Host(op) => (op.effect)(&mut self.stack, &mut self.stream, env)?,
            Entry::Macro(body) => {
                trace!(name = %name, terms = body.len(), "expand");
                self.stream.splice_front(body.iter().cloned());
            }
        }

        self.steps += 1;
        env.step_counted(self.steps);
        env.stack_changed(&self.stack);
        if self.steps > self.config.max_steps {
            return Err(EngineError::ProgramTooLong { limit: self.config.max_steps });
        }

        if category == Category::Action {
            self.state = State::Suspended;
            Ok(Step::Suspend)
        } else {
            Ok(Step::Continue)
        }
    }

    fn apply(&mut self, op: Opcode, env: &mut dyn Environment) -> Result<()> {
        match op {
            Opcode::Push => {
                let literal = self.stream.next_term("PUSH")?;
                let value = parse_literal(&literal)?;
                self.stack.push(value);
            }
            Opcode::Pop => {
                self.pop();
            }
            Opcode::Dup => {
                let top = self.pop();
                self.stack.extend([top, top]);
            }
            Opcode::Swap => {
                let n = self.stack.len();
                self.stack.swap(n - 1, n - 2);
            }
            Opcode::Rot3 => {
                let third = self.stack.remove(self.stack.len() - 3);
                self.stack.push(third);
            }
            Opcode::Add => self.binary(|a, b| Ok(a.wrapping_add(b)))?,
            Opcode::Sub => self.binary(|a, b| Ok(a.wrapping_sub(b)))?,
            Opcode::Mul => self.binary(|a, b| Ok(a.wrapping_mul(b)))?,
            Opcode::Div => self.binary(|a, b| match b {
                0 => Err(EngineError::DivideByZero { name: "DIV" }),
                _ => Ok(floor_div(a, b)),
            })?,
            Opcode::Mod => self.binary(|a, b| match b {
                0 => Err(EngineError::DivideByZero { name: "MOD" }),
                _ => Ok(a.wrapping_rem(b)),
            })?,
            Opcode::Rand => {
                let max = self.pop();
                let min = self.pop();
                if max <= min {
                    return Err(EngineError::InvalidRange { min, max });
                }
                let value = self.rng.i64(min..max);
                self.stack.push(value);
            }
            Opcode::If => self.branch()?,
            Opcode::Def => self.define()?,
            Opcode::Move => {
                let code = self.pop();
                match Direction::from_code(code) {
                    Some(direction) => self.walk(direction, env),
                    None => debug!(code, "MOVE ignored"),
                }
            }
            Opcode::Left => self.walk(Direction::Left, env),
            Opcode::Up => self.walk(Direction::Up, env),
            Opcode::Right => self.walk(Direction::Right, env),
            Opcode::Down => self.walk(Direction::Down, env),
            Opcode::Wait => self.walk(Direction::None, env),
            Opcode::Look => {
                let code = self.pop();
                match Direction::from_code(code) {
                    Some(Direction::None) | None => debug!(code, "LOOK ignored"),
                    Some(direction) => {
                        let cell = match direction.step_from(env.current_position()) {
                            Some((x, y)) => env.look_at(x, y),
                            None => CellKind::Outside,
                        };
                        self.stack.push(cell.code());
                    }
                }
            }
        }
        Ok(())
    }

    /// Pops rhs then lhs and pushes `f(lhs, rhs)`.
    fn binary(&mut self, f: impl FnOnce(i64, i64) -> Result<i64>) -> Result<()> {
        let rhs = self.pop();
        let lhs = self.pop();
        let value = f(lhs, rhs)?;
        self.stack.push(value);
        Ok(())
    }

    // Depth is checked before dispatch, so this never sees an empty stack.
    fn pop(&mut self) -> i64 {
        self.stack.pop().unwrap_or_default()
    }

    fn branch(&mut self) -> Result<()> {
        let clause = blocks::split_if_clause(self.stream.iter())?;
        let condition = self.pop();
        let region = self.stream.take(clause.end + 1);
        let (then, otherwise) = clause.split(region);
        let taken = if condition != 0 { then } else { otherwise };
        debug!(condition, terms = taken.len(), "IF");
        self.stream.splice_front(taken);
        Ok(())
    }

    fn define(&mut self) -> Result<()> {
        let name = self.stream.next_term("DEF")?;
        let end = blocks::find_block_end(self.stream.iter(), "DEF")?;
        let body = self.stream.take(end);
        self.stream.pop_front();
        debug!(name = %name, terms = body.len(), "DEF");
        self.table.define_macro(name, body);
        Ok(())
    }

    fn walk(&mut self, direction: Direction, env: &mut dyn Environment) {
        trace!(%direction, "move");
        if let Some(value) = env.move_player(direction) {
            debug!(value, "picked up");
            self.stack.push(value);
        }
    }
}

// ELSE and END are never table entries, so a bare one lands here too.
fn unresolved(term: &str) -> EngineError {
    EngineError::UnknownInstruction { name: term.to_string() }
}

/// PUSH's operand: a decimal digit string in `PUSH_MIN..=PUSH_MAX`.
fn parse_literal(literal: &str) -> Result<i64> {
    let digits = literal.strip_prefix('-').unwrap_or(literal);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(EngineError::UnknownInstruction { name: literal.to_string() });
    }
    match literal.parse::<i64>() {
        Ok(value) if (PUSH_MIN..=PUSH_MAX).contains(&value) => Ok(value),
        _ => Err(EngineError::RangeError {
            literal: literal.to_string(),
            min: PUSH_MIN,
            max: PUSH_MAX,
        }),
    }
}

/// Quotient rounded towards negative infinity.
fn floor_div(lhs: i64, rhs: i64) -> i64 {
    let q = lhs.wrapping_div(rhs);
    if lhs.wrapping_rem(rhs) != 0 && ((lhs < 0) != (rhs < 0)) {
        q - 1
    } else {
        q
    }
}

/// Compact stack display: deep stacks show only the top four values.
pub fn render_stack(stack: &[i64]) -> String {
    let shown: Vec<String> = if stack.len() > 5 {
        std::iter::once("...".to_string())
            .chain(stack[stack.len() - 4..].iter().map(i64::to_string))
            .collect()
    } else {
        stack.iter().map(i64::to_string).collect()
    };
    format!("[ {} ]", shown.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::Recorder;
    use crate::table::HostOp;

    fn engine(src: &str) -> Engine {
        Engine::new(src.split_whitespace(), InstructionSet::all())
            .with_config(EngineConfig { max_steps: 10_000, seed: Some(42) })
    }

    fn run(src: &str) -> Result<Vec<i64>> {
        run_on(src, vec![])
    }

    fn run_on(src: &str, stack: Vec<i64>) -> Result<Vec<i64>> {
        let mut env = Recorder::default();
        engine(src).with_stack(stack).run(&mut env).map(<[i64]>::to_vec)
    }

    /// Negative numbers can only be built, not pushed.
    fn neg(n: u8) -> String {
        format!("PUSH 0 PUSH {n} SUB")
    }

    // ── stack ops ───────────────────────────────────────────────────

    #[test]
    fn push_each_digit() {
        for v in 0..=9 {
            assert_eq!(run(&format!("PUSH {v}")), Ok(vec![v]));
        }
    }

    #[test]
    fn push_out_of_range() {
        assert_eq!(
            run("PUSH 10"),
            Err(EngineError::RangeError { literal: "10".into(), min: 0, max: 9 })
        );
        assert!(matches!(run("PUSH -1"), Err(EngineError::RangeError { .. })));
        assert!(matches!(
            run("PUSH 99999999999999999999999"),
            Err(EngineError::RangeError { .. })
        ));
    }

    #[test]
    fn push_needs_a_number() {
        assert_eq!(
            run("PUSH UP"),
            Err(EngineError::UnknownInstruction { name: "UP".into() })
        );
        assert_eq!(
            run("PUSH"),
            Err(EngineError::EmptyStreamUnderflow { context: "PUSH" })
        );
    }

    #[test]
    fn swap_twice_restores_order() {
        assert_eq!(run("PUSH 1 PUSH 2 SWAP"), Ok(vec![2, 1]));
        assert_eq!(run("PUSH 1 PUSH 2 SWAP SWAP"), Ok(vec![1, 2]));
        assert_eq!(run_on("SWAP SWAP", vec![7, 3, 9]), Ok(vec![7, 3, 9]));
    }

    #[test]
    fn dup_pop_is_a_no_op() {
        for stack in [vec![0], vec![4, -2], vec![1, 2, 3]] {
            assert_eq!(run_on("DUP POP", stack.clone()), Ok(stack));
        }
        assert_eq!(run("PUSH 3 DUP"), Ok(vec![3, 3]));
    }

    #[test]
    fn rot3_brings_third_to_top() {
        assert_eq!(run("PUSH 1 PUSH 2 PUSH 3 ROT3"), Ok(vec![2, 3, 1]));
        assert_eq!(run_on("ROT3", vec![9, 1, 2, 3]), Ok(vec![9, 2, 3, 1]));
    }

    // ── arithmetic ──────────────────────────────────────────────────

    #[test]
    fn operand_order_is_lhs_op_rhs() {
        assert_eq!(run("PUSH 2 PUSH 5 SUB"), Ok(vec![-3]));
        assert_eq!(run("PUSH 5 PUSH 2 SUB"), Ok(vec![3]));
        assert_eq!(run("PUSH 7 PUSH 2 DIV"), Ok(vec![3]));
        assert_eq!(run("PUSH 7 PUSH 2 MOD"), Ok(vec![1]));
        assert_eq!(run("PUSH 4 PUSH 3 ADD PUSH 6 MUL"), Ok(vec![42]));
    }

    #[test]
    fn div_floors_and_mod_follows_dividend() {
        assert_eq!(run(&format!("{} PUSH 2 DIV", neg(7))), Ok(vec![-4]));
        assert_eq!(run(&format!("PUSH 7 {} DIV", neg(2))), Ok(vec![-4]));
        assert_eq!(run(&format!("{} {} DIV", neg(7), neg(2))), Ok(vec![3]));
        assert_eq!(run(&format!("{} PUSH 2 MOD", neg(7))), Ok(vec![-1]));
        assert_eq!(run(&format!("PUSH 7 {} MOD", neg(2))), Ok(vec![1]));
    }

    #[test]
    fn zero_divisor_always_fails() {
        for dividend in ["PUSH 0".to_string(), "PUSH 5".to_string(), neg(5)] {
            assert_eq!(
                run(&format!("{dividend} PUSH 0 DIV")),
                Err(EngineError::DivideByZero { name: "DIV" })
            );
            assert_eq!(
                run(&format!("{dividend} PUSH 0 MOD")),
                Err(EngineError::DivideByZero { name: "MOD" })
            );
        }
    }

    #[test]
    fn extremes_wrap_instead_of_panicking() {
        assert_eq!(floor_div(i64::MIN, -1), i64::MIN);
        assert_eq!(run_on("MUL", vec![i64::MAX, 2]), Ok(vec![-2]));
    }

    #[test]
    fn straight_line_programs_fold_left_to_right() {
        fn fold(src: &str) -> Vec<i64> {
            let mut stack = Vec::new();
            let mut terms = src.split_whitespace();
            while let Some(term) = terms.next() {
                match term {
                    "PUSH" => stack.push(terms.next().unwrap().parse().unwrap()),
                    "POP" => {
                        stack.pop();
                    }
                    "DUP" => stack.push(*stack.last().unwrap()),
                    "SWAP" => {
                        let n = stack.len();
                        stack.swap(n - 1, n - 2);
                    }
                    _ => {
                        let b = stack.pop().unwrap();
                        let a = stack.pop().unwrap();
                        stack.push(match term {
                            "ADD" => a + b,
                            "SUB" => a - b,
                            "MUL" => a * b,
                            _ => unreachable!(),
                        });
                    }
                }
            }
            stack
        }
        for src in [
            "PUSH 3 PUSH 4 ADD DUP MUL",
            "PUSH 1 PUSH 9 SUB PUSH 2 SWAP SUB",
            "PUSH 5 DUP DUP MUL MUL PUSH 0 POP",
            "PUSH 2 PUSH 3 PUSH 4 MUL ADD PUSH 8 SWAP SUB",
        ] {
            assert_eq!(run(src), Ok(fold(src)), "{src}");
        }
    }

    #[test]
    fn rand_is_in_range() {
        let mut e = engine("PUSH 3 PUSH 6 RAND");
        let stack = e.run(&mut Recorder::default()).unwrap().to_vec();
        assert_eq!(stack.len(), 1);
        assert!((3..6).contains(&stack[0]), "{stack:?}");
    }

    #[test]
    fn rand_is_reproducible_with_a_seed() {
        let src = "PUSH 0 PUSH 9 RAND PUSH 0 PUSH 9 RAND PUSH 0 PUSH 9 RAND";
        assert_eq!(run(src), run(src));
    }

    #[test]
    fn rand_rejects_empty_range() {
        assert_eq!(
            run("PUSH 4 PUSH 4 RAND"),
            Err(EngineError::InvalidRange { min: 4, max: 4 })
        );
        assert_eq!(
            run("PUSH 5 PUSH 2 RAND"),
            Err(EngineError::InvalidRange { min: 5, max: 2 })
        );
    }

    // ── flow ────────────────────────────────────────────────────────

    #[test]
    fn if_else_picks_a_branch() {
        let src = "IF PUSH 1 ELSE PUSH 2 END PUSH 9";
        assert_eq!(run_on(src, vec![0]), Ok(vec![2, 9]));
        assert_eq!(run_on(src, vec![5]), Ok(vec![1, 9]));
        assert_eq!(run_on(src, vec![-3]), Ok(vec![1, 9]));
    }

    #[test]
    fn if_consumes_exactly_the_condition() {
        assert_eq!(run_on("IF END", vec![4, 1]), Ok(vec![4]));
        assert_eq!(run_on("IF ELSE END", vec![4, 0]), Ok(vec![4]));
        assert_eq!(run_on("IF PUSH 1 END", vec![0]), Ok(vec![]));
    }

    #[test]
    fn nested_if_does_not_steal_outer_delimiters() {
        let src = "IF IF PUSH 1 ELSE PUSH 2 END ELSE PUSH 3 END";
        assert_eq!(run_on(src, vec![0, 5]), Ok(vec![2]));
        assert_eq!(run_on(src, vec![1, 5]), Ok(vec![1]));
        assert_eq!(run_on(src, vec![1, 0]), Ok(vec![1, 3]));
    }

    #[test]
    fn unterminated_blocks() {
        assert_eq!(
            run_on("IF PUSH 1 ELSE PUSH 2", vec![1]),
            Err(EngineError::UnterminatedBlock { opener: "IF" })
        );
        assert_eq!(
            run("DEF X UP IF END"),
            Err(EngineError::UnterminatedBlock { opener: "DEF" })
        );
        assert_eq!(run("DEF"), Err(EngineError::EmptyStreamUnderflow { context: "DEF" }));
    }

    #[test]
    fn stray_delimiters_are_unknown_instructions() {
        assert_eq!(run("END"), Err(EngineError::UnknownInstruction { name: "END".into() }));
        assert_eq!(
            run("PUSH 1 ELSE"),
            Err(EngineError::UnknownInstruction { name: "ELSE".into() })
        );
        // the IF closes at the first END, the second one is left over
        assert_eq!(
            run("PUSH 1 IF PUSH 2 END END"),
            Err(EngineError::UnknownInstruction { name: "END".into() })
        );
    }

    // ── macros ──────────────────────────────────────────────────────

    #[test]
    fn def_does_not_run_the_body() {
        let mut e = engine("DEF TWICE DUP ADD END");
        assert_eq!(e.run(&mut Recorder::default()), Ok(&[][..]));
        assert!(e.table().contains("TWICE"));
        assert!(e.pending().is_empty());
    }

    #[test]
    fn macro_is_spliced_at_call_site() {
        assert_eq!(run("DEF TWICE DUP ADD END PUSH 3 TWICE TWICE"), Ok(vec![12]));
    }

    #[test]
    fn redefinition_overwrites() {
        assert_eq!(run("DEF N PUSH 1 END DEF N PUSH 2 END N"), Ok(vec![2]));
    }

    #[test]
    fn self_recursive_countdown_terminates() {
        let src = "DEF LOOP DUP IF PUSH 1 SUB LOOP ELSE POP END END PUSH 5 LOOP";
        assert_eq!(run(src), Ok(vec![]));
    }

    #[test]
    fn mutual_recursion() {
        let src = "DEF EVEN DUP IF PUSH 1 SUB ODD ELSE POP PUSH 1 END END \
                   DEF ODD DUP IF PUSH 1 SUB EVEN ELSE POP PUSH 0 END END \
                   PUSH 7 EVEN";
        assert_eq!(run(src), Ok(vec![0]));
    }

    #[test]
    fn endless_recursion_hits_the_guard() {
        assert_eq!(
            run("DEF F F END F"),
            Err(EngineError::ProgramTooLong { limit: 10_000 })
        );
    }

    #[test]
    fn default_guard_is_one_million_steps() {
        let mut e = Engine::new("DEF F F END F".split_whitespace(), InstructionSet::all());
        assert_eq!(
            e.run(&mut Recorder::default()),
            Err(EngineError::ProgramTooLong { limit: 1_000_000 })
        );
        assert_eq!(e.steps(), 1_000_001);
    }

    #[test]
    fn growing_recursion_does_not_overflow_the_native_stack() {
        assert!(matches!(
            run("DEF F F F END F"),
            Err(EngineError::ProgramTooLong { .. })
        ));
    }

    // ── dispatch errors ─────────────────────────────────────────────

    #[test]
    fn unknown_instruction_is_named() {
        assert_eq!(
            run("PUSH 1 FOO PUSH 2"),
            Err(EngineError::UnknownInstruction { name: "FOO".into() })
        );
        assert_eq!(run("5"), Err(EngineError::UnknownInstruction { name: "5".into() }));
    }

    #[test]
    fn underflow_reports_depths() {
        assert_eq!(
            run("PUSH 1 ADD"),
            Err(EngineError::StackUnderflow { name: "ADD".into(), required: 2, actual: 1 })
        );
        assert_eq!(
            run("ROT3"),
            Err(EngineError::StackUnderflow { name: "ROT3".into(), required: 3, actual: 0 })
        );
    }

    #[test]
    fn whitelist_hides_other_builtins() {
        let set = InstructionSet::only(&["RIGHT"]).unwrap();
        let mut e = Engine::new(["RIGHT", "LEFT"], set);
        assert_eq!(
            e.run(&mut Recorder::default()),
            Err(EngineError::UnknownInstruction { name: "LEFT".into() })
        );
    }

    #[test]
    fn failure_is_permanent() {
        let mut e = engine("POP PUSH 1");
        let mut env = Recorder::default();
        let first = e.step(&mut env);
        assert!(matches!(first, Step::Failed(EngineError::StackUnderflow { .. })));
        assert_eq!(e.step(&mut env), first);
        assert!(e.is_finished());
        assert!(e.stack().is_empty());
    }

    // ── actions and suspension ──────────────────────────────────────

    #[test]
    fn suspends_once_per_action_in_order() {
        let mut e = engine("RIGHT UP LEFT WAIT DOWN");
        let mut env = Recorder::default();
        let expected = [
            Direction::Right,
            Direction::Up,
            Direction::Left,
            Direction::None,
            Direction::Down,
        ];
        for (i, dir) in expected.iter().enumerate() {
            assert_eq!(e.advance(&mut env), Step::Suspend);
            assert_eq!(env.moves.len(), i + 1);
            assert_eq!(env.moves[i], *dir);
            assert_eq!(*e.state(), State::Suspended);
        }
        assert_eq!(e.advance(&mut env), Step::Done);
        assert_eq!(e.advance(&mut env), Step::Done);
    }

    #[test]
    fn bookkeeping_between_actions_does_not_yield() {
        let mut e = engine("PUSH 2 PUSH 1 ADD MOVE DEF X UP END X");
        let mut env = Recorder::default();
        assert_eq!(e.step(&mut env), Step::Continue);
        assert_eq!(e.advance(&mut env), Step::Suspend);
        assert_eq!(env.moves, [Direction::Down]);
        assert_eq!(e.advance(&mut env), Step::Suspend);
        assert_eq!(env.moves, [Direction::Down, Direction::Up]);
        assert_eq!(e.advance(&mut env), Step::Done);
    }

    #[test]
    fn move_codes() {
        let mut env = Recorder::default();
        let mut e = engine("PUSH 0 MOVE PUSH 1 MOVE PUSH 2 MOVE PUSH 3 MOVE PUSH 4 MOVE PUSH 7 MOVE");
        e.run(&mut env).unwrap();
        assert_eq!(
            env.moves,
            [Direction::None, Direction::Up, Direction::Right, Direction::Down, Direction::Left]
        );
    }

    #[test]
    fn out_of_range_move_still_suspends() {
        let mut e = engine("PUSH 8 MOVE");
        let mut env = Recorder::default();
        assert_eq!(e.advance(&mut env), Step::Suspend);
        assert!(env.moves.is_empty());
    }

    #[test]
    fn look_reports_neighbours() {
        let mut env = Recorder::new((1, 1))
            .with_bounds(3, 3)
            .with_cell(1, 0, CellKind::Block)
            .with_cell(2, 1, CellKind::Exit)
            .with_cell(1, 2, CellKind::Spike)
            .with_cell(0, 1, CellKind::Pickup(5));
        let mut e = engine("PUSH 1 LOOK PUSH 2 LOOK PUSH 3 LOOK PUSH 4 LOOK");
        assert_eq!(e.run(&mut env), Ok(&[1, 2, 3, 0][..]));

        let mut corner = Recorder::new((0, 0)).with_bounds(3, 3);
        let mut e = engine("PUSH 4 LOOK PUSH 2 LOOK");
        assert_eq!(e.run(&mut corner), Ok(&[-1, 0][..]));
    }

    #[test]
    fn look_ignores_invalid_directions() {
        assert_eq!(run("PUSH 0 LOOK"), Ok(vec![]));
        assert_eq!(run("PUSH 9 LOOK"), Ok(vec![]));
    }

    #[test]
    fn look_does_not_suspend() {
        let mut e = engine("PUSH 1 LOOK");
        assert_eq!(e.advance(&mut Recorder::default()), Step::Done);
    }

    #[test]
    fn pickups_land_on_the_stack() {
        let mut env = Recorder::new((0, 0)).with_cell(1, 0, CellKind::Pickup(6));
        let mut e = engine("RIGHT RIGHT");
        assert_eq!(e.run(&mut env), Ok(&[6][..]));
        assert_eq!(env.current_position(), (2, 0));
    }

    #[test]
    fn notifications_follow_each_step() {
        let mut env = Recorder::default();
        engine("PUSH 1 DUP ADD").run(&mut env).unwrap();
        assert_eq!(env.steps, 3);
        assert_eq!(env.stack_updates, 3);
    }

    fn rightn() -> HostOp {
        HostOp {
            name: "RIGHTN".into(),
            category: Category::Special,
            min_depth: 1,
            description: "Pop the top value off the stack and move right that many times.".into(),
            effect: Box::new(|stack: &mut Vec<i64>, stream: &mut TokenStream, _: &mut dyn Environment| {
                let n = stack.pop().unwrap_or_default();
                if n < 0 {
                    return Err(EngineError::HostFailure {
                        name: "RIGHTN".into(),
                        message: "negative distance".into(),
                    });
                }
                stream.splice_front((0..n).map(|_| "RIGHT".to_string()));
                Ok(())
            }),
        }
    }

    #[test]
    fn host_op_moves_are_separate_steps() {
        let set = InstructionSet::only(&["PUSH", "RIGHT"]).unwrap().with_host_op(rightn());
        let mut env = Recorder::default();
        let mut e = Engine::new("PUSH 3 RIGHTN PUSH 1".split_whitespace(), set);
        for x in 1..=3 {
            assert_eq!(e.advance(&mut env), Step::Suspend);
            assert_eq!(env.current_position(), (x, 0));
        }
        assert_eq!(e.advance(&mut env), Step::Done);
        assert_eq!(e.stack(), [1]);
        // PUSH, RIGHTN, three RIGHTs, PUSH
        assert_eq!(e.steps(), 6);
    }

    #[test]
    fn host_op_failures_and_depth() {
        let set = InstructionSet::only(&["PUSH", "SUB", "RIGHT"]).unwrap().with_host_op(rightn());
        let mut env = Recorder::default();
        assert_eq!(
            Engine::new(["RIGHTN"], set.clone()).run(&mut env),
            Err(EngineError::StackUnderflow { name: "RIGHTN".into(), required: 1, actual: 0 })
        );
        assert_eq!(
            Engine::new("PUSH 0 PUSH 2 SUB RIGHTN".split_whitespace(), set).run(&mut env),
            Err(EngineError::HostFailure { name: "RIGHTN".into(), message: "negative distance".into() })
        );
        assert!(env.moves.is_empty());
    }

    #[test]
    fn look_off_the_edge_of_the_number_line() {
        let mut env = Recorder::new((i64::MAX, 0));
        let mut e = engine("PUSH 2 LOOK PUSH 4 LOOK");
        assert_eq!(e.run(&mut env), Ok(&[-1, 0][..]));
    }

    #[test]
    fn stack_rendering() {
        assert_eq!(render_stack(&[]), "[  ]");
        assert_eq!(render_stack(&[1, -2, 3]), "[ 1, -2, 3 ]");
        assert_eq!(render_stack(&[1, 2, 3, 4, 5]), "[ 1, 2, 3, 4, 5 ]");
        assert_eq!(render_stack(&[1, 2, 3, 4, 5, 6]), "[ ..., 3, 4, 5, 6 ]");
    }
}
