use std::fs::File;
use std::io::{self, Write};

/// Left-justified column width the source hardcodes as `PRINT_WIDTH`.
const PRINT_WIDTH: usize = 12;

pub fn header_line() -> String {
    format!(
        "{:<width$}{:<width$}{:<width$}\n",
        "Episode",
        "Score",
        "Average",
        width = PRINT_WIDTH
    )
}

pub fn content_line(episode: u64, score: f64, average: f64) -> String {
    format!(
        "{:<width$}{:<width$}{:<width$}\n",
        episode,
        score,
        average,
        width = PRINT_WIDTH
    )
}

/// Running average update: `avg_k = avg_{k-1} + (score_k - avg_{k-1}) / k`.
pub fn running_average(episode: u64, score: f64, previous_average: f64) -> f64 {
    previous_average + (score - previous_average) / episode as f64
}

/// Writes the score table incrementally (flushed after every line), as
/// the source does with its `std::flush`-per-write `exportStringToFile`.
pub struct ScoreExporter {
    file: File,
}

impl ScoreExporter {
    pub fn create(path: impl AsRef<std::path::Path>) -> io::Result<Self> {
        let mut file = File::create(path)?;
        file.write_all(header_line().as_bytes())?;
        file.flush()?;
        Ok(Self { file })
    }

    pub fn write_episode(&mut self, episode: u64, score: f64, average: f64) -> io::Result<()> {
        self.file
            .write_all(content_line(episode, score, average).as_bytes())?;
        self.file.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn running_average_matches_incremental_definition() {
        let mut avg = 0.0;
        let scores = [1.0, 3.0, 2.0, 4.0];
        for (i, &s) in scores.iter().enumerate() {
            avg = running_average(i as u64 + 1, s, avg);
        }
        let expected: f64 = scores.iter().sum::<f64>() / scores.len() as f64;
        assert!((avg - expected).abs() < 1e-12);
    }

    #[test]
    fn header_has_three_padded_columns() {
        let header = header_line();
        assert!(header.starts_with("Episode"));
        assert!(header.contains("Score"));
        assert!(header.contains("Average"));
    }
}
