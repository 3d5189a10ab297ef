//! Grammars bundled with this crate, covering the message types named in
//! the data model: X12 835 (healthcare claim payment/advice), X12 837P
//! (professional healthcare claim), and EDIFACT ORDERS.
//!
//! Each is a hand-authored [`crate::def::GrammarDocument`] serialized as
//! JSON under `fixtures/`, re-expressing the structure the sample 835/837
//! documents exercise rather than a full implementation-guide transcription.

use crate::error::GrammarError;
use crate::grammar::Grammar;

const X12_835: &str = include_str!("../fixtures/x12_835.json");
const X12_837P: &str = include_str!("../fixtures/x12_837p.json");
const EDIFACT_ORDERS: &str = include_str!("../fixtures/edifact_orders.json");

pub fn bundled_grammars() -> Result<Vec<Grammar>, GrammarError> {
    Ok(vec![
        Grammar::from_json(X12_835)?,
        Grammar::from_json(X12_837P)?,
        Grammar::from_json(EDIFACT_ORDERS)?,
    ])
}

pub fn x12_835() -> Result<Grammar, GrammarError> {
    Grammar::from_json(X12_835)
}

pub fn x12_837p() -> Result<Grammar, GrammarError> {
    Grammar::from_json(X12_837P)
}

pub fn edifact_orders() -> Result<Grammar, GrammarError> {
    Grammar::from_json(EDIFACT_ORDERS)
}
