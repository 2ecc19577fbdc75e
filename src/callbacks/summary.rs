//! Run summaries for plotting training progress.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::Callback;
use crate::core::{compute_scores, Transition};
use crate::error::{ApproxError, Result};

/// Episode statistics recorded at one step of the run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub step: u64,
    pub min_reward: f64,
    pub max_reward: f64,
    pub average_reward: f64,
    pub games_completed: usize,
    pub timestamp: DateTime<Utc>,
}

/// Destination for run summaries.
pub trait SummaryWriter {
    fn write(&mut self, summary: &Summary) -> Result<()>;
}

impl SummaryWriter for Vec<Summary> {
    fn write(&mut self, summary: &Summary) -> Result<()> {
        self.push(summary.clone());
        Ok(())
    }
}

/// Writes one JSON object per line to `<folder>/summary.jsonl`.
#[derive(Debug)]
pub struct JsonLinesWriter {
    path: PathBuf,
    out: BufWriter<File>,
}

impl JsonLinesWriter {
    pub const FILE_NAME: &'static str = "summary.jsonl";

    /// Create the folder if needed and truncate any previous summary file.
    pub fn create(folder: impl AsRef<Path>) -> Result<Self> {
        let folder = folder.as_ref();
        fs::create_dir_all(folder)?;
        let path = folder.join(Self::FILE_NAME);
        let out = BufWriter::new(File::create(&path)?);
        Ok(Self { path, out })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SummaryWriter for JsonLinesWriter {
    fn write(&mut self, summary: &Summary) -> Result<()> {
        serde_json::to_writer(&mut self.out, summary)
            .map_err(|e| ApproxError::Io(e.to_string()))?;
        writeln!(self.out)?;
        self.out.flush()?;
        Ok(())
    }
}

/// Computes episode scores of each dataset and writes them as a summary.
#[derive(Debug)]
pub struct CollectSummary<W> {
    writer: W,
    global_step: u64,
}

impl<W: SummaryWriter> CollectSummary<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            global_step: 0,
        }
    }

    pub fn writer(&self) -> &W {
        &self.writer
    }

    /// Number of summaries written so far.
    pub fn global_step(&self) -> u64 {
        self.global_step
    }

    pub fn into_writer(self) -> W {
        self.writer
    }
}

impl CollectSummary<JsonLinesWriter> {
    /// Write summaries under `folder`.
    pub fn to_folder(folder: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::new(JsonLinesWriter::create(folder)?))
    }
}

impl<A: ?Sized, W: SummaryWriter> Callback<A> for CollectSummary<W> {
    fn call(&mut self, dataset: &[Transition], _approximator: &A) -> Result<()> {
        let scores = compute_scores(dataset);
        let summary = Summary {
            step: self.global_step,
            min_reward: scores.min,
            max_reward: scores.max,
            average_reward: scores.mean,
            games_completed: scores.episodes,
            timestamp: Utc::now(),
        };
        self.writer.write(&summary)?;
        info!(
            step = summary.step,
            min_reward = summary.min_reward,
            max_reward = summary.max_reward,
            average_reward = summary.average_reward,
            games_completed = summary.games_completed,
            "run summary"
        );

        self.global_step += 1;
        Ok(())
    }
}
