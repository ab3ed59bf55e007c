use crate::bus::BusKind;
use crate::component::Refdes;
use crate::design::Design;
use crate::validate::ValidationError;

/// Errors raised while building or checking a [`crate::Design`].
#[derive(Debug, thiserror::Error)]
pub enum SchematicError {
    #[error("Unknown pin '{key}' on {component}. Options: {options:?}")]
    UnknownPin {
        component: String,
        key: String,
        options: Vec<String>,
    },

    #[error("Unknown port: {name}. Options {options:?}")]
    UnknownPort { name: String, options: Vec<String> },

    #[error("Port '{0}' has not been connected")]
    UnboundPort(String),

    #[error("Port '{name}' is a {found}, expected a {expected}")]
    PortKind {
        name: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("Unknown net: {name}. Options {options:?}")]
    UnknownNet { name: String, options: Vec<String> },

    #[error("Mismatched buses! Expected {expected}, found {found}")]
    BusMismatch { expected: BusKind, found: BusKind },

    #[error("Floating part {0}! Did you forget to add it?")]
    FloatingPart(Refdes),

    #[error("Component {refdes} was already added to design '{design}'")]
    AlreadyAdded { refdes: Refdes, design: String },

    #[error("Design '{design}' already contains a component {refdes}")]
    DuplicateComponent { refdes: Refdes, design: String },

    #[error("No {kind} package available in size {size}")]
    UnsupportedPackage { kind: &'static str, size: String },

    /// `add_module` refused the child; it is handed back untouched.
    #[error("Module '{name}' was not added: {source}")]
    RejectedModule {
        name: String,
        #[source]
        source: Box<SchematicError>,
        module: Box<Design>,
    },

    #[error("Invalid value '{value}': {reason}")]
    InvalidValue { value: String, reason: String },

    #[error("Cannot connect an empty list of {0}")]
    EmptyConnection(&'static str),

    #[error("Invalid design configuration: {0}")]
    Config(#[from] toml::de::Error),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl SchematicError {
    /// The design carried by a rejected `add_module` call.
    pub fn into_module(self) -> Option<Design> {
        match self {
            SchematicError::RejectedModule { module, .. } => Some(*module),
            _ => None,
        }
    }
}

pub type Result<T, E = SchematicError> = std::result::Result<T, E>;
