use std::io;
use std::process::{Output, Stdio};
use std::time::Duration;

use anyhow::{anyhow, Context as _};
use tokio::io::AsyncWriteExt as _;
use tokio::process::Command;
use tokio::time::{timeout, Instant};

use cfick_util::model::Sample;

use crate::Result;

mod diff;
mod status;

pub use diff::TextDiff;
pub use status::{Status, StatusKind, TotalStatus};

/// Runs one sample through a command and judges its output.
pub struct Judge<'a> {
    sample: &'a Sample,
    time_limit: Duration,
}

impl<'a> Judge<'a> {
    pub fn new(sample: &'a Sample, time_limit: Duration) -> Self {
        Self { sample, time_limit }
    }

    pub async fn test(&self, command: Command) -> Status {
        let Self { sample, time_limit } = *self;
        let name = sample.name().to_owned();
        let input = sample.input().as_bytes();

        let started_at = Instant::now();
        let result = timeout(time_limit, Self::exec_child(command, input)).await;
        let elapsed = started_at.elapsed();

        match result {
            Err(_) => Status::tle(name, elapsed),
            Ok(Err(err)) => Status::re(name, elapsed, err),
            Ok(Ok(output)) if !output.status.success() => {
                let stderr = String::from_utf8_lossy(&output.stderr);
                let err = anyhow!("{}\n{}", output.status, stderr.trim_end());
                Status::re(name, elapsed, err)
            }
            Ok(Ok(output)) => {
                let actual = String::from_utf8_lossy(&output.stdout).into_owned();
                let diff = TextDiff::new(sample.output().to_owned(), actual);
                Status::judged(name, elapsed, diff)
            }
        }
    }

    async fn exec_child(mut command: Command, input: &[u8]) -> Result<Output> {
        let mut child = command
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .context("Could not start run command")?;
        if let Some(mut stdin) = child.stdin.take() {
            match stdin.write_all(input).await {
                // the program may exit without reading all of its input
                Err(err) if err.kind() == io::ErrorKind::BrokenPipe => {}
                result => result.context("Could not write input to stdin")?,
            }
        }
        let output = child
            .wait_with_output()
            .await
            .context("Could not wait for run command")?;
        Ok(output)
    }
}
