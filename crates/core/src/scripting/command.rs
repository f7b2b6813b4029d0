//! Interpreter-to-command mapping.

use std::path::Path;

use super::executor::Invocation;
use crate::plugin::Interpreter;

impl Invocation {
    /// Build the command line that runs `script_path` under `interpreter`.
    ///
    /// - go: `go run <script>`
    /// - python: `python3 <script>`
    /// - bash: `bash <script>`
    pub fn for_interpreter(interpreter: Interpreter, script_path: &Path) -> Self {
        let script = script_path.to_string_lossy().into_owned();
        let (program, args) = match interpreter {
            Interpreter::Go => ("go", vec!["run".to_string(), script]),
            Interpreter::Python => ("python3", vec![script]),
            Interpreter::Bash => ("bash", vec![script]),
        };
        Self {
            program: program.to_string(),
            args,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
