//! Fixture graphs and helpers for hdm development.
//!
//! Builders here go through the public construction surface only
//! ([`Serializer::make`], [`Serializer::push`], [`Serializer::set_link`]),
//! so every fixture is a graph a client could have built.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

use std::cell::RefCell;
use std::rc::Rc;

use hdm_core::{ErrorKind, NodeRef};
use hdm_model::Arenas;
use hdm_serializer::Serializer;

pub use fixtures::{
    scenario_a, scenario_b, wide_design, GraphSpec, ModuleSpec, ScenarioA, ScenarioB,
};

/// Serializer bound to the model catalogue.
pub type Session = Serializer<Arenas>;

/// One condition delivered to the error callback.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reported {
    pub kind: ErrorKind,
    pub message: String,
    pub object: Option<NodeRef>,
    pub other: Option<NodeRef>,
}

/// Shared log filled by [`record_errors`].
pub type ErrorLog = Rc<RefCell<Vec<Reported>>>;

/// Install an error handler that appends every report to the returned log.
pub fn record_errors(ser: &mut Session) -> ErrorLog {
    let log = ErrorLog::default();
    let sink = Rc::clone(&log);
    ser.set_error_handler(move |kind, message, object, other| {
        sink.borrow_mut().push(Reported {
            kind,
            message: message.to_owned(),
            object,
            other,
        });
    });
    log
}

/// Reports of one kind in `log`.
pub fn count_kind(log: &ErrorLog, kind: ErrorKind) -> usize {
    log.borrow().iter().filter(|r| r.kind == kind).count()
}
