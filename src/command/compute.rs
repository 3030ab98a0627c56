use std::{
    fs, io,
    path::{Path, PathBuf},
};

use derive_more::{Display, Error};

use crate::{
    elimination::BasicSolution,
    simplex::{Problem, SimplexError, SolutionReport},
};

use super::{load, LoadError};

#[derive(Debug, Display, Error)]
pub enum ComputeError {
    #[display(fmt = "cannot read {}: {}", "path.display()", source)]
    Io { path: PathBuf, source: io::Error },
    #[display(fmt = "{}", _0)]
    Load(#[error(source)] LoadError),
    #[display(fmt = "{}", _0)]
    Simplex(#[error(source)] SimplexError),
}

impl From<LoadError> for ComputeError {
    fn from(err: LoadError) -> Self {
        Self::Load(err)
    }
}

impl From<SimplexError> for ComputeError {
    fn from(err: SimplexError) -> Self {
        Self::Simplex(err)
    }
}

pub fn read_problem(path: impl AsRef<Path>) -> Result<Problem, ComputeError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| ComputeError::Io {
        path: path.to_owned(),
        source,
    })?;
    let problem = load(&text)?;
    log::info!("Problem formed:\n{problem}");
    Ok(problem)
}

pub fn compute(path: impl AsRef<Path>) -> Result<SolutionReport, ComputeError> {
    let report = read_problem(path)?.solve()?;
    log::info!("Solution:\n{}", report.outcome);
    Ok(report)
}

pub fn compute_basic_solutions(path: impl AsRef<Path>) -> Result<Vec<BasicSolution>, ComputeError> {
    let solutions = read_problem(path)?.basic_solutions()?;
    log::info!("{} basic solutions verified", solutions.len());
    Ok(solutions)
}
