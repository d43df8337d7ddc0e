use std::fmt;

use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

/// A finite status enum with an explicit transition table.
///
/// Every status change is checked against `allowed_next` before the record is
/// touched; there is no unconstrained reassignment.
pub trait StatusMachine:
    Copy + Eq + fmt::Debug + Serialize + DeserializeOwned + Send + Sync + 'static
{
    const ENTITY: &'static str;
    const INITIAL: Self;
    const VARIANTS: &'static [Self];

    fn as_str(self) -> &'static str;
    fn allowed_next(self) -> &'static [Self];

    fn can_transition_to(self, next: Self) -> bool {
        self.allowed_next().contains(&next)
    }

    fn is_terminal(self) -> bool {
        self.allowed_next().is_empty()
    }

    fn labels() -> Vec<&'static str> {
        Self::VARIANTS.iter().map(|s| s.as_str()).collect()
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("{entity} is already '{status}'")]
    Unchanged {
        entity: &'static str,
        status: &'static str,
    },

    #[error("{entity} cannot move from '{from}' to '{to}' (allowed: [{}])", .allowed.join(", "))]
    NotAllowed {
        entity: &'static str,
        from: &'static str,
        to: &'static str,
        allowed: Vec<&'static str>,
    },
}

pub fn check_transition<S: StatusMachine>(from: S, to: S) -> Result<(), TransitionError> {
    if from == to {
        return Err(TransitionError::Unchanged {
            entity: S::ENTITY,
            status: from.as_str(),
        });
    }
    if !from.can_transition_to(to) {
        return Err(TransitionError::NotAllowed {
            entity: S::ENTITY,
            from: from.as_str(),
            to: to.as_str(),
            allowed: from.allowed_next().iter().map(|s| s.as_str()).collect(),
        });
    }
    Ok(())
}
