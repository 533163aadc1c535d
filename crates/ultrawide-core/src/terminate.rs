//! End-of-run exit side effect.

/// Receives the exit code a finished run asks for.
pub trait Terminator {
    fn terminate(&mut self, code: i32);
}

/// Ends the current process.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessExit;

impl Terminator for ProcessExit {
    fn terminate(&mut self, code: i32) {
        std::process::exit(code);
    }
}

/// Remembers the requested exit code instead of exiting.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RecordedExit {
    pub code: Option<i32>,
}

impl Terminator for RecordedExit {
    fn terminate(&mut self, code: i32) {
        self.code = Some(code);
    }
}
