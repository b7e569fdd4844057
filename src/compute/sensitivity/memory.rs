//! Low-memory confirmation before a sensitivity computation.

use std::fmt;
use std::fs;
use std::io::{self, BufRead, BufReader};
use std::sync::{Mutex, PoisonError};

/// Free-memory ratio below which the user is asked before continuing.
pub const LOW_MEMORY_RATIO: f64 = 0.25;

/// Number of answers read before giving up.
pub const MAX_ATTEMPTS: usize = 3;

/// Decides whether a memory-hungry computation may start.
pub trait MemoryGuard: fmt::Debug + Send + Sync {
    fn safe_to_proceed(&self) -> bool;
}

/// Always proceeds.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoGuard;

impl MemoryGuard for NoGuard {
    fn safe_to_proceed(&self) -> bool {
        true
    }
}

/// Asks for confirmation on `input` when free memory is low.
///
/// Answers starting with `y`/`Y` proceed and `n`/`N` decline. Anything else
/// is asked again, up to `MAX_ATTEMPTS` times; running out of attempts or
/// input declines.
pub struct InteractiveMemoryGuard {
    input: Mutex<Box<dyn BufRead + Send>>,
    free_ratio: fn() -> Option<f64>,
}

impl InteractiveMemoryGuard {
    pub fn new(input: Box<dyn BufRead + Send>, free_ratio: fn() -> Option<f64>) -> Self {
        Self {
            input: Mutex::new(input),
            free_ratio,
        }
    }

    /// Guard reading answers from standard input and free memory from the OS.
    pub fn stdin() -> Self {
        Self::new(Box::new(BufReader::new(io::stdin())), free_memory_ratio)
    }

    fn ask(&self) -> bool {
        let mut input = self.input.lock().unwrap_or_else(PoisonError::into_inner);

        eprintln!(
            "Sensitivity calculation consumes a lot of memory (more than {:.0}% of RAM is in use). \
             Please save all relevant data before continuing.",
            (1.0 - LOW_MEMORY_RATIO) * 100.0
        );
        eprintln!("Continue calculating the sensitivity at your own risk? [Y/N]");

        for _ in 0..MAX_ATTEMPTS {
            let mut answer = String::new();
            match input.read_line(&mut answer) {
                Ok(0) | Err(_) => {
                    log::warn!("No answer available, aborting sensitivity calculation");
                    return false;
                }
                Ok(_) => {}
            }

            match answer.trim_start().chars().next() {
                Some('y' | 'Y') => return true,
                Some('n' | 'N') => return false,
                _ => eprintln!(
                    "Please enter 'Y' to continue with the sensitivity calculation or 'N' to abort it"
                ),
            }
        }

        log::warn!(
            "Could not read an answer in {} attempts, aborting sensitivity calculation",
            MAX_ATTEMPTS
        );
        false
    }
}

impl fmt::Debug for InteractiveMemoryGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InteractiveMemoryGuard")
            .field("threshold", &LOW_MEMORY_RATIO)
            .finish_non_exhaustive()
    }
}

impl MemoryGuard for InteractiveMemoryGuard {
    fn safe_to_proceed(&self) -> bool {
        match (self.free_ratio)() {
            Some(ratio) if ratio < LOW_MEMORY_RATIO => {
                log::debug!("Free memory ratio {:.3} below threshold", ratio);
                self.ask()
            }
            _ => true,
        }
    }
}

/// Fraction of physical memory currently free, from `/proc/meminfo`.
///
/// Returns `None` where that file is unavailable.
pub fn free_memory_ratio() -> Option<f64> {
    let meminfo = fs::read_to_string("/proc/meminfo").ok()?;
    parse_meminfo(&meminfo)
}

fn parse_meminfo(meminfo: &str) -> Option<f64> {
    let field = |name: &str| -> Option<f64> {
        meminfo
            .lines()
            .find_map(|line| line.strip_prefix(name))
            .and_then(|rest| rest.trim_start_matches(':').split_whitespace().next())
            .and_then(|value| value.parse::<f64>().ok())
    };

    let total = field("MemTotal")?;
    let free = field("MemFree")?;
    (total > 0.0).then(|| free / total)
}
