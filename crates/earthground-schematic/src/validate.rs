use std::collections::BTreeMap;

use itertools::Itertools;
use log::{debug, error};

use crate::component::{Component, Refdes};
use crate::design::Design;
use crate::error::Result;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValidateOptions {
    /// Don't report components without a footprint.
    pub skip_footprints: bool,
    /// Report nets that have exactly one pin.
    pub check_single_connections: bool,
}

/// A single structural defect found by [`Design::validate`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Problem {
    #[error("No footprint: {name} ({refdes})")]
    MissingFootprint { refdes: Refdes, name: String },

    #[error("Ports changed after initialization! {names:?}")]
    PortsChanged { names: Vec<String> },

    #[error("Single connection! {net} - {pin}")]
    SingleConnection { net: String, pin: String },

    #[error("Duplicate refdes {refdes} ({count} components)")]
    DuplicateRefdes { refdes: Refdes, count: usize },
}

/// Every problem found in one validation pass.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{design} validation failed: {}", .problems.iter().join("; "))]
pub struct ValidationError {
    pub design: String,
    pub problems: Vec<Problem>,
}

impl Design {
    /// Check the design and all of its modules, collecting every problem
    /// before failing. On success returns the components that were checked.
    pub fn validate(&self, options: ValidateOptions) -> Result<Vec<&Component>> {
        let components = self.all_components();
        let mut problems = Vec::new();

        for component in &components {
            debug!("Validated: {component}");
            if component.footprint().is_none() && !options.skip_footprints {
                problems.push(Problem::MissingFootprint {
                    refdes: component.refdes().clone(),
                    name: component.name().to_owned(),
                });
            }
        }

        let counts = components
            .iter()
            .fold(BTreeMap::<&Refdes, usize>::new(), |mut counts, c| {
                *counts.entry(c.refdes()).or_default() += 1;
                counts
            });
        for (refdes, count) in counts {
            if count > 1 {
                problems.push(Problem::DuplicateRefdes {
                    refdes: refdes.clone(),
                    count,
                });
            }
        }

        let undeclared = self.port().undeclared();
        if !undeclared.is_empty() {
            problems.push(Problem::PortsChanged { names: undeclared });
        }

        if options.check_single_connections {
            for net in self.nets() {
                if let Ok(pin) = net.connections().iter().exactly_one() {
                    problems.push(Problem::SingleConnection {
                        net: net.name().to_owned(),
                        pin: pin.to_string(),
                    });
                }
            }
        }

        if problems.is_empty() {
            return Ok(components);
        }

        let header = format!(" {} VALIDATION FAILED ", self.name().to_uppercase());
        error!("");
        error!("{header:=^60}");
        for problem in &problems {
            error!(" - {problem}");
        }
        error!("");
        Err(ValidationError {
            design: self.name().to_owned(),
            problems,
        }
        .into())
    }
}
