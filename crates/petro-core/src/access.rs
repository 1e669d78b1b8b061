//! # Access Policy
//!
//! Role gating consulted by the boundary layer before it calls a service.
//! Services themselves only check identities that are business rules (the
//! accepting user must be the transfer's area manager), never roles.
//!
//! ```text
//! token ──► Actor { role } ──► policy.authorize(actor, op) ──► service
//!                                     │
//!                                     └── Forbidden
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::types::{Role, User};

/// The authenticated caller, as resolved from a bearer credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Actor {
    pub id: String,
    pub employee_id: String,
    pub role: Role,
    pub station_id: Option<String>,
}

impl From<&User> for Actor {
    fn from(user: &User) -> Self {
        Actor {
            id: user.id.clone(),
            employee_id: user.employee_id.clone(),
            role: user.role,
            station_id: user.station_id.clone(),
        }
    }
}

/// Every operation the boundary exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operation {
    // Cash custody
    CreateCashTransaction,
    InitiateTransfer,
    AcceptCash,
    DepositCash,
    ViewFloatingCash,
    ListCashTransactions,

    // Meter readings and shifts
    RecordReadings,
    UpdateReading,
    LockShift,
    UnlockShift,
    ResolveShift,

    // Sales
    UpdateSale,
    SubmitSales,

    // Inventory
    RecordDelivery,
    ViewInventory,

    // Prices
    SetFuelPrice,
    ViewPrices,

    // Administration
    RegisterUser,
    CreateStation,
    ConfigureEquipment,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Decides whether a role may perform an operation.
pub trait AccessPolicy: Send + Sync {
    fn permits(&self, role: Role, operation: Operation) -> bool;

    /// `Ok(())` when permitted, `Forbidden` otherwise.
    fn authorize(&self, actor: &Actor, operation: Operation) -> CoreResult<()> {
        if self.permits(actor.role, operation) {
            Ok(())
        } else {
            Err(CoreError::Forbidden {
                role: actor.role.to_string(),
                operation: operation.to_string(),
            })
        }
    }
}

/// The role gates the station dashboard has always enforced.
///
/// | Role  | Operations                                                        |
/// |-------|-------------------------------------------------------------------|
/// | SM    | cash entry, initiate transfer, readings, lock shift, sales        |
/// | AM    | accept cash, deposit cash                                         |
/// | Admin | floating cash, set price, unlock shift, users, stations, tanks    |
/// | any   | listings, inventory reads, deliveries, shift resolution           |
#[derive(Debug, Clone, Copy, Default)]
pub struct RouteAccessPolicy;

impl AccessPolicy for RouteAccessPolicy {
    fn permits(&self, role: Role, operation: Operation) -> bool {
        use Operation::*;

        match operation {
            CreateCashTransaction | InitiateTransfer | RecordReadings | UpdateReading
            | LockShift | UpdateSale | SubmitSales => role == Role::StationManager,
            AcceptCash | DepositCash => role == Role::AreaManager,
            ViewFloatingCash | SetFuelPrice | UnlockShift | RegisterUser | CreateStation
            | ConfigureEquipment => role == Role::Admin,
            ListCashTransactions | ResolveShift | RecordDelivery | ViewInventory | ViewPrices => {
                true
            }
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn actor(role: Role) -> Actor {
        Actor {
            id: "u1".into(),
            employee_id: "EMP-1".into(),
            role,
            station_id: None,
        }
    }

    #[test]
    fn test_custody_steps_gated_by_role() {
        let policy = RouteAccessPolicy;

        assert!(policy.permits(Role::StationManager, Operation::CreateCashTransaction));
        assert!(!policy.permits(Role::AreaManager, Operation::CreateCashTransaction));
        assert!(policy.permits(Role::AreaManager, Operation::AcceptCash));
        assert!(!policy.permits(Role::StationManager, Operation::AcceptCash));
        assert!(!policy.permits(Role::Admin, Operation::DepositCash));
        assert!(policy.permits(Role::Admin, Operation::ViewFloatingCash));
    }

    #[test]
    fn test_reads_open_to_everyone() {
        let policy = RouteAccessPolicy;
        for role in [Role::StationManager, Role::AreaManager, Role::Admin] {
            assert!(policy.permits(role, Operation::ViewInventory));
            assert!(policy.permits(role, Operation::RecordDelivery));
        }
    }

    #[test]
    fn test_authorize_returns_forbidden() {
        let err = RouteAccessPolicy
            .authorize(&actor(Role::StationManager), Operation::SetFuelPrice)
            .unwrap_err();
        assert!(matches!(err, CoreError::Forbidden { .. }));
        assert_eq!(err.kind(), ErrorKind::Unauthorized);
        assert_eq!(err.to_string(), "Role SM may not perform SetFuelPrice");

        assert!(RouteAccessPolicy
            .authorize(&actor(Role::Admin), Operation::UnlockShift)
            .is_ok());
    }
}
