use getset::Getters;
use serde::{Deserialize, Serialize};

use crate::abs_path::AbsPathBuf;
use crate::Result;

/// Example inputs and outputs of a problem statement.
///
/// Both sequences keep document order. Their lengths may differ.
#[derive(Serialize, Deserialize, Getters, Debug, Default, Clone, PartialEq, Eq, Hash)]
#[get = "pub"]
pub struct Samples {
    inputs: Vec<String>,
    outputs: Vec<String>,
}

impl Samples {
    pub fn new(inputs: Vec<String>, outputs: Vec<String>) -> Self {
        Self { inputs, outputs }
    }

    /// Writes `{n}.in` and `{n}.out` into `dir`, overwriting existing files.
    pub fn save(
        &self,
        dir: &AbsPathBuf,
        base_dir: Option<&AbsPathBuf>,
        cnsl: &mut dyn std::io::Write,
    ) -> Result<()> {
        for (i, input) in self.inputs.iter().enumerate() {
            dir.join(format!("{}.in", i))
                .write_pretty(input.as_bytes(), base_dir, cnsl)?;
        }
        for (i, output) in self.outputs.iter().enumerate() {
            dir.join(format!("{}.out", i))
                .write_pretty(output.as_bytes(), base_dir, cnsl)?;
        }
        Ok(())
    }
}

/// One paired example read back from a problem directory.
#[derive(Serialize, Deserialize, Getters, Debug, Clone, PartialEq, Eq, Hash)]
#[get = "pub"]
pub struct Sample {
    name: String,
    input: String,
    output: String,
}

impl Sample {
    pub fn new(
        name: impl Into<String>,
        input: impl Into<String>,
        output: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            input: input.into(),
            output: output.into(),
        }
    }

    /// Loads `0.in`/`0.out`, `1.in`/`1.out`, ... until an input is missing.
    ///
    /// An input without its output is paired with an empty expectation.
    pub fn load_all(dir: &AbsPathBuf) -> Result<Vec<Sample>> {
        let mut samples = Vec::new();
        for i in 0.. {
            let input_path = dir.join(format!("{}.in", i));
            if !input_path.is_file() {
                break;
            }
            let input = String::from_utf8(input_path.read_bytes()?)?;
            let output_path = dir.join(format!("{}.out", i));
            let output = if output_path.is_file() {
                String::from_utf8(output_path.read_bytes()?)?
            } else {
                String::new()
            };
            samples.push(Sample::new(i.to_string(), input, output));
        }
        Ok(samples)
    }
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn test_save_and_load_all() -> anyhow::Result<()> {
        let test_dir = tempdir()?;
        let dir = AbsPathBuf::try_new(test_dir.path())?.join("741").join("A");
        let samples = Samples::new(
            vec!["1\n".into(), "2\n".into(), "3\n".into()],
            vec!["one\n".into(), "two\n".into()],
        );
        samples.save(&dir, None, &mut std::io::sink())?;

        let loaded = Sample::load_all(&dir)?;
        assert_eq!(
            loaded,
            vec![
                Sample::new("0", "1\n", "one\n"),
                Sample::new("1", "2\n", "two\n"),
                Sample::new("2", "3\n", ""),
            ]
        );
        Ok(())
    }

    #[test]
    fn test_load_all_empty_dir() -> anyhow::Result<()> {
        let test_dir = tempdir()?;
        let dir = AbsPathBuf::try_new(test_dir.path())?;
        assert!(Sample::load_all(&dir)?.is_empty());
        Ok(())
    }
}
