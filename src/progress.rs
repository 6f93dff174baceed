//! Progress reporting for the long-running copy and checksum loops.

use std::io::{self, Write};

/// Receives progress of a single long-running step.
pub trait Progress {
    /// Called once before the first update of a step.
    fn start(&mut self, _name: &str) {}

    /// Called after every processed chunk with the percentage done so far.
    fn update(&mut self, percent: u8);

    /// Called once after the last update of a step.
    fn finish(&mut self, _name: &str) {}
}

impl<F: FnMut(u8)> Progress for F {
    fn update(&mut self, percent: u8) {
        self(percent)
    }
}

/// Discards all progress.
#[cfg(test)]
#[derive(Copy, Clone, Default, Debug)]
pub struct Silent;

#[cfg(test)]
impl Progress for Silent {
    fn update(&mut self, _percent: u8) {}
}

/// Prints progress to stdout, rewriting the current line.
#[derive(Copy, Clone, Default, Debug)]
pub struct Console;

const PAD: &str = "     ";

impl Progress for Console {
    fn start(&mut self, name: &str) {
        print!("{}{}", PAD, name);
        let _ = io::stdout().flush();
    }

    fn update(&mut self, percent: u8) {
        print!("\r{}%", percent);
        let _ = io::stdout().flush();
    }

    fn finish(&mut self, name: &str) {
        println!("\r{}{}", name, PAD);
    }
}

/// Returns the percentage of `total` done when `left` bytes remain.
pub fn percent(left: u64, total: u64) -> u8 {
    if total == 0 {
        return 100;
    }
    (100 - u128::from(left) * 100 / u128::from(total)) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_bounds() {
        assert_eq!(percent(0, 10), 100);
        assert_eq!(percent(10, 10), 0);
        assert_eq!(percent(5, 10), 50);
        assert_eq!(percent(0, 0), 100);
        assert_eq!(percent(1 << 62, 1 << 63), 50);
    }

    #[test]
    fn closures_are_sinks() {
        let mut seen = Vec::new();
        {
            let mut sink = |p: u8| seen.push(p);
            sink.start("x");
            sink.update(7);
            Progress::update(&mut sink, 9);
            sink.finish("x");
        }
        assert_eq!(seen, [7, 9]);
    }
}
