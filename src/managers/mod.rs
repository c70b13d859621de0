//! One manager per resource family. Each serves a fixed set of tools, calls
//! exactly one client method per tool and renders the result as text.

pub mod client_services;
pub mod clients;
pub mod contacts;
pub mod engagements;
pub mod notes;
pub mod packages;
pub mod services;
pub mod tasks;
pub mod templates;

use crate::services::logger::Logger;
use crate::services::sodium::ClientSlot;
use crate::services::validation::Validation;

/// What every manager is built from.
#[derive(Clone)]
pub struct ManagerDeps {
    pub logger: Logger,
    pub validation: Validation,
    pub slot: ClientSlot,
}

impl ManagerDeps {
    pub fn new(logger: Logger, validation: Validation, slot: ClientSlot) -> Self {
        Self {
            logger,
            validation,
            slot,
        }
    }
}
