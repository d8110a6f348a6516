// ─────────────────────────────────────────────────────────────────────
// Goal Arbiter — CLI Exit Codes
// ─────────────────────────────────────────────────────────────────────

use arbiter_types::ArbiterError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum CliExitCode {
    Success = 0,
    /// Invalid input, configuration or reference tables.
    Validation = 1,
    /// A file or stream could not be read or written.
    Io = 2,
}

impl From<CliExitCode> for i32 {
    fn from(code: CliExitCode) -> Self {
        code as i32
    }
}

pub fn exit_code_for_error(err: &ArbiterError) -> CliExitCode {
    match err {
        ArbiterError::Io(_) => CliExitCode::Io,
        _ => CliExitCode::Validation,
    }
}
