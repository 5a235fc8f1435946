use std::sync::{Arc, Mutex, PoisonError};

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Picks one entry from a catalog list (institution or major).
pub trait Chooser: Send + Sync {
    fn choose<'a>(&self, options: &'a [String]) -> Option<&'a str>;
}

/// Uniform choice from the thread-local generator.
#[derive(Debug, Default, Clone, Copy)]
pub struct UniformChooser;

impl Chooser for UniformChooser {
    fn choose<'a>(&self, options: &'a [String]) -> Option<&'a str> {
        options.choose(&mut rand::thread_rng()).map(String::as_str)
    }
}

/// Always the first entry.
#[derive(Debug, Default, Clone, Copy)]
pub struct FirstChooser;

impl Chooser for FirstChooser {
    fn choose<'a>(&self, options: &'a [String]) -> Option<&'a str> {
        options.first().map(String::as_str)
    }
}

/// Uniform choice from a seeded generator shared across calls.
#[derive(Debug)]
pub struct SeededChooser {
    rng: Mutex<StdRng>,
}

impl SeededChooser {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl Chooser for SeededChooser {
    fn choose<'a>(&self, options: &'a [String]) -> Option<&'a str> {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        options.choose(&mut *rng).map(String::as_str)
    }
}

/// Configured selection behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionMode {
    #[default]
    Random,
    First,
    Seeded(u64),
}

impl SelectionMode {
    /// Parses `random`, `first` or `seeded`; the seed is supplied separately.
    pub fn parse(value: &str, seed: u64) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "random" | "uniform" => Some(SelectionMode::Random),
            "first" => Some(SelectionMode::First),
            "seeded" => Some(SelectionMode::Seeded(seed)),
            _ => None,
        }
    }

    pub fn chooser(self) -> Arc<dyn Chooser> {
        match self {
            SelectionMode::Random => Arc::new(UniformChooser),
            SelectionMode::First => Arc::new(FirstChooser),
            SelectionMode::Seeded(seed) => Arc::new(SeededChooser::new(seed)),
        }
    }
}
