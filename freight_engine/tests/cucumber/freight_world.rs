use std::collections::HashMap;

use cucumber::World;
use freight_engine::db_types::{Actor, EstimateId, MatchingId};

use crate::support::Pipeline;

#[derive(Default, Debug, World)]
pub struct FreightWorld {
    pub system: Option<Pipeline>,
    /// Estimates by the label the scenario gave them
    pub estimates: HashMap<String, EstimateId>,
    pub matchings: HashMap<String, MatchingId>,
}

impl FreightWorld {
    pub fn sys(&self) -> &Pipeline {
        self.system.as_ref().expect("Freight store not initialised")
    }

    pub fn estimate(&self, label: &str) -> EstimateId {
        *self.estimates.get(label).unwrap_or_else(|| panic!("No estimate called {label}"))
    }

    pub fn matching(&self, label: &str) -> MatchingId {
        *self.matchings.get(label).unwrap_or_else(|| panic!("No matching for estimate {label}"))
    }

    /// Maps the names used in the feature files onto the seeded profiles.
    pub fn actor(&self, name: &str) -> Actor {
        let who = &self.sys().who;
        match name {
            "alice" => who.alice(),
            "bob" => who.bob(),
            "X" => who.x(),
            "Y" => who.y(),
            "Z" => who.z(),
            _ => panic!("Unknown actor {name}"),
        }
    }
}
