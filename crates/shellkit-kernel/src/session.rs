//! The shell session: line intake, control-block capture, and replay.
//!
//! A `Shell` owns everything one interpreter instance needs: the
//! variable store, the command registry, and a stack of open control
//! blocks. Lines arrive one at a time through [`Shell::run_line`],
//! from the interactive prompt and from scripts alike.
//!
//! Control flow works by capture and replay. An `if` or `while` at the
//! top level opens a block; from then on every line is buffered as raw
//! text instead of executing, with a depth counter tracking nested
//! openers and closers. Only depth-1 keywords (`elif`, `else`, and the
//! matching close) are interpreted by the session itself. When the
//! close brings the depth back to zero the block resolves: conditions
//! are parsed and evaluated in order, and the selected body is fed
//! line-by-line back through `run_line`, so nested blocks inside it
//! are interpreted afresh.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, error};

use crate::commands::registry::Registry;
use crate::commands::traits::{Command, CommandArgs, RegistryObserver};
use crate::error::{ExprError, FatalError, VarError};
use crate::eval::evaluate;
use crate::parser::parse;
use crate::result::{ExecResult, Flow, Outcome};
use crate::value::Value;
use crate::vars::{SetOutcome, VarStore};

/// Host-tunable session settings.
#[derive(Debug, Clone)]
pub struct ShellConfig {
    /// Prompt shown at the top level.
    pub prompt: String,
    /// Character the prompt is filled with while a block is open.
    pub fill: char,
    /// Where the interactive frontend persists history, if anywhere.
    pub history_path: Option<PathBuf>,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            prompt: "shellkit> ".into(),
            fill: '.',
            history_path: Some(PathBuf::from(".shellkit_history")),
        }
    }
}

impl ShellConfig {
    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    pub fn with_fill(mut self, fill: char) -> Self {
        self.fill = fill;
        self
    }

    pub fn with_history_path(mut self, path: Option<PathBuf>) -> Self {
        self.history_path = path;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BlockKind {
    Conditional,
    Loop,
}

impl BlockKind {
    fn open_keyword(self) -> &'static str {
        match self {
            BlockKind::Conditional => "if",
            BlockKind::Loop => "while",
        }
    }

    fn close_keyword(self) -> &'static str {
        match self {
            BlockKind::Conditional => "endif",
            BlockKind::Loop => "endwhile",
        }
    }
}

/// One condition/body pair inside an open block. An `else` arm has no
/// condition and always matches.
#[derive(Debug)]
struct Arm {
    condition: Option<String>,
    body: Vec<String>,
}

impl Arm {
    fn new(condition: Option<String>) -> Self {
        Self {
            condition,
            body: Vec::new(),
        }
    }
}

/// An open `if`-chain or `while` awaiting its close keyword.
#[derive(Debug)]
struct ControlBlock {
    kind: BlockKind,
    arms: Vec<Arm>,
    saved_prompt: String,
}

/// One interpreter session. See the module docs for the line
/// lifecycle.
pub struct Shell {
    config: ShellConfig,
    prompt: String,
    vars: VarStore,
    registry: Registry,
    blocks: Vec<ControlBlock>,
    depth: usize,
    observers: Vec<Arc<dyn RegistryObserver>>,
}

impl Shell {
    /// An empty session: no commands, no variables. Hosts that want
    /// the standard command set call
    /// [`register_builtins`](crate::commands::builtin::register_builtins)
    /// or use [`Shell::with_builtins`].
    pub fn new(config: ShellConfig) -> Self {
        let prompt = config.prompt.clone();
        Self {
            config,
            prompt,
            vars: VarStore::new(),
            registry: Registry::new(),
            blocks: Vec::new(),
            depth: 0,
            observers: Vec::new(),
        }
    }

    /// A session with the standard commands pre-registered.
    pub fn with_builtins(config: ShellConfig) -> Result<Self, FatalError> {
        let mut shell = Self::new(config);
        crate::commands::builtin::register_builtins(&mut shell)?;
        Ok(shell)
    }

    pub fn config(&self) -> &ShellConfig {
        &self.config
    }

    /// The prompt the frontend should show for the next line. Dots
    /// replace the usual prompt while a block is being captured.
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// True while an unfinished control block is buffering lines.
    pub fn capturing(&self) -> bool {
        self.depth > 0
    }

    pub fn vars(&self) -> &VarStore {
        &self.vars
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Seed a host variable that `unset` can never remove.
    pub fn define_builtin_var(&mut self, name: impl Into<String>, value: Value) {
        let name = name.into();
        for observer in &self.observers {
            observer.variable_added(&name);
        }
        self.vars.define_builtin(name, value);
    }

    /// Assign a variable, targeting the builtin namespace when the
    /// name already lives there.
    pub fn set_var(&mut self, name: &str, value: Value) {
        if self.vars.set(name, value) == SetOutcome::Created {
            for observer in &self.observers {
                observer.variable_added(name);
            }
        }
    }

    pub fn unset_var(&mut self, name: &str) -> Result<(), VarError> {
        self.vars.unset(name)?;
        for observer in &self.observers {
            observer.variable_removed(name);
        }
        Ok(())
    }

    /// Register a command, notifying observers on success.
    pub fn register(&mut self, command: Arc<dyn Command>) -> Result<(), FatalError> {
        let name = command.name().to_string();
        let hint = command.completion_hint();
        self.registry.register(command)?;
        for observer in &self.observers {
            observer.command_added(&name, &hint);
        }
        Ok(())
    }

    /// Attach an observer, replaying the commands and variables it
    /// missed so late observers still see the full picture.
    pub fn add_observer(&mut self, observer: Arc<dyn RegistryObserver>) {
        for (name, command) in self.registry.iter() {
            observer.command_added(name, &command.completion_hint());
        }
        let names: Vec<&str> = self
            .vars
            .builtin_names()
            .into_iter()
            .chain(self.vars.user_names())
            .collect();
        for name in names {
            observer.variable_added(name);
        }
        self.observers.push(observer);
    }

    /// Feed one logical line through the session.
    ///
    /// Fatal errors mean a host or engine bug (mismatched close kind,
    /// malformed loop block); the caller is expected to terminate. All
    /// user mistakes come back as an `Outcome` with a nonzero code.
    pub fn run_line(&mut self, line: &str) -> Result<Outcome, FatalError> {
        if self.depth > 0 {
            return self.capture_line(line);
        }
        let trimmed = line.trim();
        // Blanks and comments are skipped here, but captured verbatim
        // inside a block (see capture_line).
        if trimmed.is_empty() || trimmed.starts_with('#') {
            return Ok(Outcome::of(ExecResult::success()));
        }
        let (word, rest) = split_word(trimmed);
        match word {
            "if" => self.open_block(BlockKind::Conditional, rest),
            "while" => self.open_block(BlockKind::Loop, rest),
            "elif" => Ok(recoverable("elif without a matching if")),
            "else" => Ok(recoverable("else without a matching if")),
            _ if close_kind(trimmed).is_some() => {
                Ok(recoverable(format!("{trimmed} without an open block")))
            }
            _ => self.dispatch(word, rest),
        }
    }

    /// Run a script resource: one command per line, no return to
    /// interactive mode. An unreadable file is a user mistake, not a
    /// crash.
    pub fn run_script(&mut self, path: &Path) -> Result<Outcome, FatalError> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) => {
                return Ok(recoverable(format!("cannot read {}: {e}", path.display())));
            }
        };
        let mut acc = ExecResult::success();
        for line in text.lines() {
            let outcome = self.run_line(line)?;
            acc.accumulate(outcome.result);
            if let Flow::Exit(code) = outcome.flow {
                return Ok(Outcome {
                    flow: Flow::Exit(code),
                    result: acc,
                });
            }
        }
        Ok(Outcome::of(acc))
    }

    fn open_block(&mut self, kind: BlockKind, condition: &str) -> Result<Outcome, FatalError> {
        debug!(kind = kind.open_keyword(), condition, "opening block");
        let saved_prompt = std::mem::replace(
            &mut self.prompt,
            self.config
                .fill
                .to_string()
                .repeat(self.config.prompt.chars().count()),
        );
        self.blocks.push(ControlBlock {
            kind,
            arms: vec![Arm::new(Some(condition.to_string()))],
            saved_prompt,
        });
        self.depth = 1;
        Ok(Outcome::of(ExecResult::success()))
    }

    /// Handle one line while a block is open. Depth-1 keywords are
    /// interpreted; everything else is buffered verbatim, with nested
    /// openers and closers only adjusting the depth counter.
    fn capture_line(&mut self, line: &str) -> Result<Outcome, FatalError> {
        let trimmed = line.trim();
        let (word, rest) = split_word(trimmed);
        if let Some(kind) = close_kind(trimmed) {
            if self.depth > 1 {
                self.depth -= 1;
                self.capture(line);
                return Ok(Outcome::of(ExecResult::success()));
            }
            let Some(block) = self.blocks.pop() else {
                unreachable!("depth > 0 implies an open block");
            };
            if block.kind != kind {
                return Err(FatalError::MismatchedBlockClose {
                    open: block.kind.open_keyword(),
                    found: kind.close_keyword(),
                });
            }
            self.depth = 0;
            self.prompt = block.saved_prompt.clone();
            return self.resolve(block);
        }
        if word == "if" || word == "while" {
            self.depth += 1;
            self.capture(line);
            return Ok(Outcome::of(ExecResult::success()));
        }
        if self.depth == 1 && (word == "elif" || word == "else") {
            return Ok(self.add_arm(word, rest));
        }
        self.capture(line);
        Ok(Outcome::of(ExecResult::success()))
    }

    fn capture(&mut self, line: &str) {
        if let Some(block) = self.blocks.last_mut() {
            if let Some(arm) = block.arms.last_mut() {
                arm.body.push(line.to_string());
            }
        }
    }

    fn add_arm(&mut self, word: &str, rest: &str) -> Outcome {
        let Some(block) = self.blocks.last_mut() else {
            return recoverable(format!("{word} without a matching if"));
        };
        if block.kind == BlockKind::Loop {
            return recoverable(format!("{word} inside a while block"));
        }
        if block.arms.last().is_some_and(|arm| arm.condition.is_none()) {
            return recoverable(format!("{word} after else"));
        }
        match word {
            "elif" => {
                if rest.is_empty() {
                    return recoverable("elif needs a condition");
                }
                block.arms.push(Arm::new(Some(rest.to_string())));
            }
            _ => {
                if !rest.is_empty() {
                    return recoverable("unexpected text after else");
                }
                block.arms.push(Arm::new(None));
            }
        }
        Outcome::of(ExecResult::success())
    }

    /// Evaluate a closed block's condition(s) and replay the selected
    /// body.
    fn resolve(&mut self, block: ControlBlock) -> Result<Outcome, FatalError> {
        match block.kind {
            BlockKind::Conditional => {
                for arm in &block.arms {
                    match &arm.condition {
                        None => return self.replay(&arm.body),
                        Some(text) => match self.eval_condition(text) {
                            Ok(true) => return self.replay(&arm.body),
                            Ok(false) => continue,
                            // A bad condition skips the whole block.
                            Err(e) => return Ok(recoverable(format!("condition `{text}`: {e}"))),
                        },
                    }
                }
                Ok(Outcome::of(ExecResult::success()))
            }
            BlockKind::Loop => {
                let [arm] = block.arms.as_slice() else {
                    return Err(FatalError::LoopArmShape(block.arms.len()));
                };
                let Some(condition) = &arm.condition else {
                    return Err(FatalError::LoopArmShape(0));
                };
                let mut acc = ExecResult::success();
                loop {
                    match self.eval_condition(condition) {
                        Ok(true) => {
                            let outcome = self.replay(&arm.body)?;
                            acc.accumulate(outcome.result);
                            if let Flow::Exit(code) = outcome.flow {
                                return Ok(Outcome {
                                    flow: Flow::Exit(code),
                                    result: acc,
                                });
                            }
                        }
                        Ok(false) => break,
                        Err(e) => {
                            acc.accumulate(ExecResult::failure(
                                1,
                                format!("condition `{condition}`: {e}"),
                            ));
                            break;
                        }
                    }
                }
                Ok(Outcome::of(acc))
            }
        }
    }

    fn eval_condition(&self, text: &str) -> Result<bool, ExprError> {
        let ast = parse(text)?;
        Ok(evaluate(&ast, &self.vars)?.is_truthy())
    }

    /// Re-run captured lines through the ordinary intake path, so
    /// nested control keywords are interpreted afresh.
    fn replay(&mut self, body: &[String]) -> Result<Outcome, FatalError> {
        let mut acc = ExecResult::success();
        for line in body {
            let outcome = self.run_line(line)?;
            acc.accumulate(outcome.result);
            if let Flow::Exit(code) = outcome.flow {
                return Ok(Outcome {
                    flow: Flow::Exit(code),
                    result: acc,
                });
            }
        }
        Ok(Outcome::of(acc))
    }

    fn dispatch(&mut self, word: &str, rest: &str) -> Result<Outcome, FatalError> {
        let Some(command) = self.registry.lookup(word) else {
            return Ok(recoverable(format!("unknown command `{word}` (try `help`)")));
        };
        // A leading -h/--help prints usage and takes no action.
        let first = rest.split_whitespace().next();
        if matches!(first, Some("-h" | "--help")) {
            return Ok(Outcome::of(ExecResult::with_out(command.usage().trim_end())));
        }
        let args = CommandArgs::parse(rest, command.split_args());
        debug!(command = word, args = rest, "dispatch");
        command.execute(args, self)
    }
}

fn split_word(line: &str) -> (&str, &str) {
    match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    }
}

/// `endif` / `endwhile` detection, tolerant of interior spaces
/// (`end if` closes like `endif`).
fn close_kind(line: &str) -> Option<BlockKind> {
    let compact: String = line.chars().filter(|c| !c.is_whitespace()).collect();
    match compact.as_str() {
        "endif" => Some(BlockKind::Conditional),
        "endwhile" => Some(BlockKind::Loop),
        _ => None,
    }
}

fn recoverable(message: impl Into<String>) -> Outcome {
    let message = message.into();
    error!("{message}");
    Outcome::of(ExecResult::failure(1, message))
}
