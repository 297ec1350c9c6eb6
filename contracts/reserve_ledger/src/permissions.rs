use crate::storage::{DataKey, Role};
use soroban_sdk::{Address, Env};

/// Default-deny capability table keyed by (role, principal)
pub struct Permissions;

impl Permissions {
    pub fn is_granted(env: &Env, role: Role, principal: &Address) -> bool {
        env.storage()
            .persistent()
            .get::<DataKey, bool>(&DataKey::Permission(role, principal.clone()))
            .unwrap_or(false)
    }

    pub fn grant(env: &Env, role: Role, principal: &Address) {
        env.storage()
            .persistent()
            .set(&DataKey::Permission(role, principal.clone()), &true);
    }

    pub fn revoke(env: &Env, role: Role, principal: &Address) {
        env.storage()
            .persistent()
            .remove(&DataKey::Permission(role, principal.clone()));
    }

    /// Depositor role matching the asset's class, if the asset is enabled
    pub fn depositor_role_for(env: &Env, asset: &Address) -> Option<Role> {
        if Self::is_granted(env, Role::ReserveToken, asset) {
            Some(Role::ReserveDepositor)
        } else if Self::is_granted(env, Role::LiquidityToken, asset) {
            Some(Role::LiquidityDepositor)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ReserveLedger;
    use soroban_sdk::testutils::Address as _;

    #[test]
    fn test_default_deny_and_revoke() {
        let env = Env::default();
        let contract_id = env.register_contract(None, ReserveLedger);
        let principal = Address::generate(&env);

        env.as_contract(&contract_id, || {
            assert!(!Permissions::is_granted(&env, Role::ReserveDepositor, &principal));

            Permissions::grant(&env, Role::ReserveDepositor, &principal);
            Permissions::grant(&env, Role::ReserveDepositor, &principal);
            assert!(Permissions::is_granted(&env, Role::ReserveDepositor, &principal));
            assert!(!Permissions::is_granted(&env, Role::LiquidityDepositor, &principal));

            Permissions::revoke(&env, Role::ReserveDepositor, &principal);
            assert!(!Permissions::is_granted(&env, Role::ReserveDepositor, &principal));
        });
    }

    #[test]
    fn test_depositor_role_follows_asset_class() {
        let env = Env::default();
        let contract_id = env.register_contract(None, ReserveLedger);
        let stable = Address::generate(&env);
        let pair = Address::generate(&env);
        let unknown = Address::generate(&env);

        env.as_contract(&contract_id, || {
            Permissions::grant(&env, Role::ReserveToken, &stable);
            Permissions::grant(&env, Role::LiquidityToken, &pair);

            assert_eq!(
                Permissions::depositor_role_for(&env, &stable),
                Some(Role::ReserveDepositor)
            );
            assert_eq!(
                Permissions::depositor_role_for(&env, &pair),
                Some(Role::LiquidityDepositor)
            );
            assert_eq!(Permissions::depositor_role_for(&env, &unknown), None);
        });
    }
}
