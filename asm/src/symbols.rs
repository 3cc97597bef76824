//! Symbol table with deferred reads.
//!
//! Every name owns one `watch` channel holding `None` while pending and
//! `Some(address)` once resolved. Readers get a [`Handle`] subscribed to that
//! channel and may await it before the definition has been scanned. All
//! creation and definition goes through one lock, so a reader creating a
//! placeholder and a writer defining the same name never race.

use crate::error::Error;
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;
use tracing::{debug, trace};

/// First address handed out to variables.
pub const VARIABLE_BASE: u16 = 16;

static PREDEFINED: Lazy<Vec<(String, u16)>> = Lazy::new(|| {
    let mut symbols: Vec<(String, u16)> = [
        ("SP", 0),
        ("LCL", 1),
        ("ARG", 2),
        ("THIS", 3),
        ("THAT", 4),
        ("SCREEN", 16384),
        ("KBD", 24576),
    ]
    .into_iter()
    .map(|(name, val)| (name.to_string(), val))
    .collect();
    symbols.extend((0..16).map(|n| (format!("R{n}"), n)));
    symbols
});

pub fn predefined() -> &'static [(String, u16)] {
    &PREDEFINED
}

// ----------------------------------------------------------------------------
// Handle

/// A symbol value that may not be known yet. Satisfied exactly once.
#[derive(Debug)]
pub struct Handle {
    name: String,
    rx: watch::Receiver<Option<u16>>,
}

impl Handle {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current value without waiting.
    pub fn get(&self) -> Option<u16> {
        *self.rx.borrow()
    }

    /// Wait until the symbol is defined or allocated. Fails if the table is
    /// dropped first.
    pub async fn value(mut self) -> Result<u16, Error> {
        let value = match self.rx.wait_for(Option::is_some).await {
            Ok(value) => *value,
            Err(_) => None,
        };
        value.ok_or(Error::Unresolved(self.name))
    }
}

// ----------------------------------------------------------------------------
// Table

struct Inner {
    // Insertion order is first-use order.
    entries: IndexMap<String, watch::Sender<Option<u16>>>,
    next_variable: u16,
}

impl Inner {
    fn entry(&mut self, name: &str) -> &mut watch::Sender<Option<u16>> {
        self.entries
            .entry(name.to_string())
            .or_insert_with(|| watch::channel(None).0)
    }
}

pub struct SymbolTable {
    inner: Mutex<Inner>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::with_variable_base(VARIABLE_BASE)
    }

    pub fn with_variable_base(base: u16) -> Self {
        let entries = predefined()
            .iter()
            .map(|(name, val)| (name.clone(), watch::channel(Some(*val)).0))
            .collect();
        SymbolTable {
            inner: Mutex::new(Inner {
                entries,
                next_variable: base,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Create a pending entry for `name` unless it exists already.
    pub fn reserve(&self, name: &str) {
        self.lock().entry(name);
    }

    /// Handle for `name`, creating a pending entry on first use.
    pub fn resolve(&self, name: &str) -> Handle {
        let mut inner = self.lock();
        let tx = inner.entry(name);
        let value = *tx.borrow();
        trace!(symbol = name, ?value, "resolve");
        Handle {
            name: name.to_string(),
            rx: tx.subscribe(),
        }
    }

    /// Bind `name` to `address` and wake everyone waiting on it.
    /// A symbol can be bound once, even to the value it already has.
    pub fn define(&self, name: &str, address: u16) -> Result<(), Error> {
        let mut inner = self.lock();
        let tx = inner.entry(name);
        let existing = *tx.borrow();
        if let Some(existing) = existing {
            return Err(Error::DuplicateSymbol {
                name: name.to_string(),
                existing,
                attempted: address,
            });
        }
        tx.send_replace(Some(address));
        debug!(symbol = name, address, "defined");
        Ok(())
    }

    /// Give every still-pending symbol the next variable address, in
    /// first-use order. Only sound once all labels have been defined.
    pub fn allocate_pending_variables(&self) -> Result<Vec<(String, u16)>, Error> {
        let mut inner = self.lock();
        let Inner {
            entries,
            next_variable,
        } = &mut *inner;

        let mut allocated = vec![];
        for (name, tx) in entries.iter() {
            if tx.borrow().is_some() {
                continue;
            }
            let address = *next_variable;
            *next_variable = address
                .checked_add(1)
                .ok_or_else(|| Error::Range(name.clone()))?;
            tx.send_replace(Some(address));
            debug!(symbol = name.as_str(), address, "allocated");
            allocated.push((name.clone(), address));
        }
        Ok(allocated)
    }

    pub fn get(&self, name: &str) -> Option<u16> {
        self.lock().entries.get(name).and_then(|tx| *tx.borrow())
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Program symbols (labels and variables) in first-use order, skipping
    /// the predefined ones. Pending symbols have no value yet.
    pub fn symbols(&self) -> Vec<(String, Option<u16>)> {
        self.lock()
            .entries
            .iter()
            .skip(predefined().len())
            .map(|(name, tx)| (name.clone(), *tx.borrow()))
            .collect()
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}
