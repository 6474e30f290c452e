/// Synchronous premium-access check. Must be free of side effects.
pub trait EntitlementSource: Send + Sync {
    fn has_premium_access(&self) -> bool;
}

/// Entitlement fixed at startup from configuration.
#[derive(Debug, Default, Clone, Copy)]
pub struct StaticEntitlement {
    premium: bool,
}

impl StaticEntitlement {
    pub fn new(premium: bool) -> Self {
        Self { premium }
    }
}

impl EntitlementSource for StaticEntitlement {
    fn has_premium_access(&self) -> bool {
        self.premium
    }
}
