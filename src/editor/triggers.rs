//! Texts that insert a layout skeleton instead of being parsed.
//!
//! The keys are opaque strings supplied by the host (a keyboard event's text, a toolbox
//! entry); the table only maps them to the skeleton to build.

use std::collections::HashMap;
use strum_macros::{EnumIter, IntoStaticStr};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum TriggerAction {
    Division,
    Exponential,
    Power,
    Square,
    SquareRoot,
    TenPower,
    Matrix,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TriggerTable {
    triggers: HashMap<String, TriggerAction>,
}

impl Default for TriggerTable {
    fn default() -> Self {
        let mut table = TriggerTable {
            triggers: HashMap::new(),
        };
        for (text, action) in [
            ("/", TriggerAction::Division),
            ("exp()", TriggerAction::Exponential),
            ("^", TriggerAction::Power),
            ("^2", TriggerAction::Square),
            ("√()", TriggerAction::SquareRoot),
            ("E", TriggerAction::TenPower),
            ("[", TriggerAction::Matrix),
            ("]", TriggerAction::Matrix),
        ] {
            table.set_trigger(text, action);
        }
        table
    }
}

impl TriggerTable {
    /// Table without any trigger: every text goes through the parser.
    pub fn empty() -> Self {
        TriggerTable {
            triggers: HashMap::new(),
        }
    }

    pub fn set_trigger(&mut self, text: &str, action: TriggerAction) {
        self.triggers.insert(text.to_string(), action);
    }

    /// Drops every text bound to `action`.
    pub fn remove_action(&mut self, action: TriggerAction) {
        self.triggers.retain(|_, bound| *bound != action);
    }

    pub fn action_for(&self, text: &str) -> Option<TriggerAction> {
        self.triggers.get(text).copied()
    }

    pub fn action_from_name(name: &str) -> Option<TriggerAction> {
        use strum::IntoEnumIterator;
        TriggerAction::iter().find(|action| {
            let action_name: &'static str = action.into();
            action_name == name
        })
    }

    pub fn len(&self) -> usize {
        self.triggers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triggers.is_empty()
    }
}
