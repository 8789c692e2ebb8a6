//! Premium entitlement
//!
//! Suggestion tracking and the free-tier item gate ask an
//! [`EntitlementProvider`] at call time instead of reading global state.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Reports whether the current user holds premium entitlement
pub trait EntitlementProvider: Send + Sync {
    fn is_entitled(&self) -> bool;
}

/// Fixed answer, for tests and builds without purchases
#[derive(Debug, Clone, Copy)]
pub struct StaticEntitlement(pub bool);

impl EntitlementProvider for StaticEntitlement {
    fn is_entitled(&self) -> bool {
        self.0
    }
}

/// Live premium flag shared between the settings layer and its readers
#[derive(Debug, Clone, Default)]
pub struct PremiumFlag(Arc<AtomicBool>);

impl PremiumFlag {
    pub fn new(premium: bool) -> Self {
        Self(Arc::new(AtomicBool::new(premium)))
    }

    pub fn set(&self, premium: bool) {
        self.0.store(premium, Ordering::SeqCst);
    }
}

impl EntitlementProvider for PremiumFlag {
    fn is_entitled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}
