use mb_matrix::{fill_seeded, SquareMatrix};
use tracing::info;

use crate::config::BenchConfig;
use crate::error::Result;
use crate::launcher::Launcher;
use crate::timing::{run_repeats, BenchReport, RepeatSample};

/// A configured benchmark that owns its launcher and all three matrices.
///
/// Buffers are allocated once, where the launcher needs them, and reused
/// across repeats. Workers only ever borrow them for one repeat.
#[derive(Debug)]
pub struct Benchmark {
    config: BenchConfig,
    launcher: Box<dyn Launcher>,
    a: SquareMatrix,
    b: SquareMatrix,
    c: SquareMatrix,
}

impl Benchmark {
    /// Validate `config`, allocate A, B and C, and seed the inputs.
    ///
    /// # Errors
    /// Returns `InvalidConfig` for a bad configuration, `Unsupported` if the
    /// strategy is unavailable, or a matrix error if allocation fails. No
    /// computation happens before these checks pass.
    pub fn new(config: BenchConfig) -> Result<Benchmark> {
        let launcher = config.strategy.launcher()?;
        Self::with_launcher(config, launcher)
    }

    /// Like [`Benchmark::new`] but with an explicit launcher.
    pub fn with_launcher(config: BenchConfig, launcher: Box<dyn Launcher>) -> Result<Benchmark> {
        config.validate()?;

        let placement = launcher.placement();
        let mut a = SquareMatrix::zeros(config.n, placement)?;
        let mut b = SquareMatrix::zeros(config.n, placement)?;
        let c = SquareMatrix::zeros(config.n, placement)?;
        fill_seeded(&mut a, &mut b, config.seed)?;

        info!(
            n = config.n,
            ?placement,
            launcher = launcher.name(),
            "matrices allocated"
        );

        Ok(Benchmark {
            config,
            launcher,
            a,
            b,
            c,
        })
    }

    pub fn config(&self) -> &BenchConfig {
        &self.config
    }

    /// Run every repeat, reporting each sample to `on_repeat`.
    pub fn run<F>(&mut self, on_repeat: F) -> Result<BenchReport>
    where
        F: FnMut(&RepeatSample),
    {
        run_repeats(
            self.launcher.as_ref(),
            self.config.workers,
            self.config.repeats,
            &self.a,
            &self.b,
            &mut self.c,
            on_repeat,
        )
    }

    /// The output matrix as left by the last repeat.
    pub fn output(&self) -> &SquareMatrix {
        &self.c
    }

    pub fn inputs(&self) -> (&SquareMatrix, &SquareMatrix) {
        (&self.a, &self.b)
    }
}
