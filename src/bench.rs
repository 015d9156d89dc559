use std::{fs::File, io, path::Path, time::Instant};

use log::info;
use serde::Serialize;

use crate::error::{Error, Result};

/// A decision strategy exposing a single operation to be timed
pub trait Strategy {
    fn run(&mut self) -> anyhow::Result<()>;
}

/// Builds a fresh strategy for every timed run
pub type StrategyFactory<'a> = Box<dyn Fn() -> Box<dyn Strategy + 'a> + 'a>;

/// Times repeated runs of interchangeable strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Benchmark {
    num_runs: usize,
}

impl Default for Benchmark {
    fn default() -> Self {
        Self { num_runs: 10 }
    }
}

impl Benchmark {
    pub fn new(num_runs: usize) -> Self {
        Self { num_runs }
    }

    /// Run every strategy `num_runs` times, in the order given
    ///
    /// Construction happens outside the timed region. The first failing strategy aborts the whole
    /// benchmark.
    pub fn run<'a, N>(
        &self,
        strategies: impl IntoIterator<Item = (N, StrategyFactory<'a>)>,
    ) -> Result<BenchmarkReport>
    where
        N: Into<String>,
    {
        if self.num_runs == 0 {
            return Err(Error::InvalidConfig("num_runs must be nonzero".into()));
        }

        let mut results = Vec::new();
        for (name, factory) in strategies {
            let name = name.into();
            info!("Running: {name}");

            let mut times = Vec::with_capacity(self.num_runs);
            for _ in 0..self.num_runs {
                let mut strategy = factory();
                let start = Instant::now();
                strategy.run().map_err(|cause| Error::Strategy {
                    name: name.clone(),
                    cause,
                })?;
                times.push(start.elapsed().as_secs_f64());
            }

            results.push(StrategyResult::from_runs(name, times)?);
        }

        Ok(BenchmarkReport { results })
    }
}

/// Timings of one strategy, in seconds
#[derive(Debug, Clone, PartialEq)]
pub struct StrategyResult {
    pub name: String,
    pub runs: Vec<f64>,
    pub min_time: f64,
    pub max_time: f64,
    pub avg_time: f64,
}

impl StrategyResult {
    /// Aggregate a nonempty list of run times
    pub fn from_runs(name: impl Into<String>, runs: Vec<f64>) -> Result<Self> {
        let name = name.into();
        if runs.is_empty() {
            return Err(Error::InvalidConfig(format!("no runs recorded for {name}")));
        }
        let min_time = runs.iter().copied().fold(f64::INFINITY, f64::min);
        let max_time = runs.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let avg_time = runs.iter().sum::<f64>() / runs.len() as f64;
        Ok(Self {
            name,
            runs,
            min_time,
            max_time,
            avg_time,
        })
    }
}

/// One CSV row: a single run alongside its strategy's aggregates
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BenchmarkRow {
    pub algorithim: String,
    pub run: usize,
    pub time: f64,
    pub min_time: f64,
    pub max_time: f64,
    pub avg_time: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BenchmarkReport {
    pub results: Vec<StrategyResult>,
}

impl BenchmarkReport {
    pub fn get(&self, name: &str) -> Option<&StrategyResult> {
        self.results.iter().find(|r| r.name == name)
    }

    /// Flatten into one row per run, runs numbered from 1
    pub fn rows(&self) -> Vec<BenchmarkRow> {
        self.results
            .iter()
            .flat_map(|r| {
                r.runs.iter().enumerate().map(|(i, &time)| BenchmarkRow {
                    algorithim: r.name.clone(),
                    run: i + 1,
                    time,
                    min_time: r.min_time,
                    max_time: r.max_time,
                    avg_time: r.avg_time,
                })
            })
            .collect()
    }

    pub fn write_csv(&self, path: impl AsRef<Path>) -> Result<()> {
        self.write_csv_to(File::create(path)?)
    }

    pub fn write_csv_to<W: io::Write>(&self, writer: W) -> Result<()> {
        let mut wtr = csv::Writer::from_writer(writer);
        for row in self.rows() {
            wtr.serialize(row)?;
        }
        wtr.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::Cell, rc::Rc};

    use anyhow::bail;

    use super::*;

    struct Counting(Rc<Cell<usize>>);

    impl Strategy for Counting {
        fn run(&mut self) -> anyhow::Result<()> {
            self.0.set(self.0.get() + 1);
            Ok(())
        }
    }

    struct Broken;

    impl Strategy for Broken {
        fn run(&mut self) -> anyhow::Result<()> {
            bail!("no obstacles visible")
        }
    }

    fn counting<'a>(count: &Rc<Cell<usize>>) -> StrategyFactory<'a> {
        let count = Rc::clone(count);
        Box::new(move || Box::new(Counting(Rc::clone(&count))) as Box<dyn Strategy>)
    }

    #[test]
    fn aggregating_no_runs_is_an_error() {
        let err = StrategyResult::from_runs("idle", Vec::new()).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(msg) if msg.contains("idle")));
    }

    #[test]
    fn aggregates_run_times() {
        let result = StrategyResult::from_runs("greedy", vec![0.1, 0.2, 0.3]).unwrap();
        assert_eq!(result.min_time, 0.1);
        assert_eq!(result.max_time, 0.3);
        assert!((result.avg_time - 0.2).abs() < 1e-12);

        let report = BenchmarkReport {
            results: vec![result],
        };
        let rows = report.rows();
        assert_eq!(rows.len(), 3);
        for (i, row) in rows.iter().enumerate() {
            assert_eq!(row.algorithim, "greedy");
            assert_eq!(row.run, i + 1);
            assert_eq!((row.min_time, row.max_time), (0.1, 0.3));
            assert!((row.avg_time - 0.2).abs() < 1e-12);
        }
    }

    #[test]
    fn runs_every_strategy_in_order() {
        let a = Rc::new(Cell::new(0));
        let b = Rc::new(Cell::new(0));
        let report = Benchmark::new(4)
            .run([("a", counting(&a)), ("b", counting(&b))])
            .unwrap();

        assert_eq!((a.get(), b.get()), (4, 4));
        let names = report.results.iter().map(|r| r.name.as_str()).collect::<Vec<_>>();
        assert_eq!(names, ["a", "b"]);
        let a = report.get("a").unwrap();
        assert_eq!(a.runs.len(), 4);
        assert!(a.min_time <= a.avg_time && a.avg_time <= a.max_time);
        assert_eq!(report.rows().len(), 8);
    }

    #[test]
    fn failing_strategy_aborts() {
        let after = Rc::new(Cell::new(0));
        let broken: StrategyFactory = Box::new(|| Box::new(Broken) as Box<dyn Strategy>);
        let err = Benchmark::default()
            .run([("broken", broken), ("after", counting(&after))])
            .unwrap_err();

        assert!(matches!(err, Error::Strategy { ref name, .. } if name == "broken"));
        assert_eq!(after.get(), 0, "later strategies never ran");
    }

    #[test]
    fn zero_runs_rejected() {
        let count = Rc::new(Cell::new(0));
        assert!(Benchmark::new(0).run([("a", counting(&count))]).is_err());
    }

    #[test]
    fn csv_layout() {
        let report = BenchmarkReport {
            results: vec![StrategyResult::from_runs("stay", vec![0.5, 1.5]).unwrap()],
        };
        let mut out = Vec::new();
        report.write_csv_to(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines = text.lines().collect::<Vec<_>>();

        assert_eq!(lines[0], "algorithim,run,time,min_time,max_time,avg_time");
        assert_eq!(lines[1], "stay,1,0.5,0.5,1.5,1.0");
        assert_eq!(lines[2], "stay,2,1.5,0.5,1.5,1.0");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn csv_to_file() {
        let dir = tempdir::TempDir::new("dodgebot").unwrap();
        let path = dir.path().join("benchmark_result.csv");
        let report = BenchmarkReport {
            results: vec![StrategyResult::from_runs("stay", vec![0.25]).unwrap()],
        };
        report.write_csv(&path).unwrap();
        assert!(std::fs::read_to_string(&path).unwrap().starts_with("algorithim,"));
    }
}
