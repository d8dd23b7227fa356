use std::fmt;

/// Terminal outcome of one title in a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemOutcome {
    Processed,
    NotFound,
    Errored,
    /// Local record missing or unusable; nothing fetched.
    Skipped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunSummary {
    pub processed: usize,
    pub not_found: usize,
    pub errors: usize,
    pub skipped: usize,
}

impl RunSummary {
    pub fn record(&mut self, outcome: ItemOutcome) {
        match outcome {
            ItemOutcome::Processed => self.processed += 1,
            ItemOutcome::NotFound => self.not_found += 1,
            ItemOutcome::Errored => self.errors += 1,
            ItemOutcome::Skipped => self.skipped += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.processed + self.not_found + self.errors + self.skipped
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "processed: {}, not found: {}, errors: {}",
            self.processed, self.not_found, self.errors
        )?;
        if self.skipped > 0 {
            write!(f, ", skipped: {}", self.skipped)?;
        }
        Ok(())
    }
}
