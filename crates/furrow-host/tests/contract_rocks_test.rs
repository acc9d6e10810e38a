//! Contract invocations against a real RocksDB store.

use furrow_core::constants::{GROTH_PER_COIN, METHOD_UPDATE_FARMING};
use furrow_core::error::{FarmingError, FurrowError};
use furrow_core::types::{Height, PubKey};
use furrow_farming::PositionChange;
use furrow_host::records::UpdatePositionArgs;
use furrow_host::{DaoContract, Receipt, RocksKvStore};

const REWARD_ASSET: u32 = 11;

fn pk(seed: u8) -> PubKey {
    PubKey([seed; 32])
}

fn open(path: &std::path::Path) -> DaoContract<RocksKvStore> {
    DaoContract::new(RocksKvStore::open(path).unwrap())
}

fn call(
    c: &mut DaoContract<RocksKvStore>,
    who: u8,
    change: PositionChange,
    height: Height,
) -> Result<Receipt, FurrowError> {
    let args = UpdatePositionArgs::new(pk(who), &change).encode().unwrap();
    c.invoke(METHOD_UPDATE_FARMING, &args, height)
}

#[test]
fn state_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("contractdata");
    let amount = 1_000 * GROTH_PER_COIN;

    {
        let mut c = open(&path);
        c.initialize(REWARD_ASSET).unwrap();
        call(&mut c, 1, PositionChange::deposit(amount), 100).unwrap();
        c.store().flush().unwrap();
    }

    let mut c = open(&path);
    assert!(c.is_initialized().unwrap());
    assert_eq!(c.contract_state().unwrap().asset_id, REWARD_ASSET);
    let pos = c.position(&pk(1)).unwrap().unwrap();
    assert_eq!(pos.principal, amount);
    assert_eq!(c.pool_state().unwrap().h_last, 100);

    // Accrual continues from the persisted pool.
    let per_block = c.engine().schedule().emission_per_block();
    let r = call(&mut c, 1, PositionChange::default(), 110).unwrap();
    assert_eq!(r.reward_credited, 10 * per_block);
}

#[test]
fn rejected_invocation_leaves_db_unchanged() {
    let dir = tempfile::tempdir().unwrap();
    let mut c = open(&dir.path().join("contractdata"));
    c.initialize(REWARD_ASSET).unwrap();
    call(&mut c, 1, PositionChange::deposit(50 * GROTH_PER_COIN), 5).unwrap();
    let before = c.store().entries().unwrap();

    // Claim more than has accrued.
    let err = call(&mut c, 1, PositionChange::claim(u64::MAX), 6).unwrap_err();
    assert!(matches!(
        err,
        FurrowError::Farming(FarmingError::InsufficientRewardBalance { .. })
    ));
    // Height going backwards.
    let err = call(&mut c, 2, PositionChange::deposit(1), 4).unwrap_err();
    assert!(matches!(
        err,
        FurrowError::Farming(FarmingError::HeightRegression { last: 5, got: 4 })
    ));

    assert_eq!(c.store().entries().unwrap(), before);
}

#[test]
fn two_participants_drain_pool_exactly() {
    let dir = tempfile::tempdir().unwrap();
    let mut c = open(&dir.path().join("contractdata"));
    c.initialize(REWARD_ASSET).unwrap();

    call(&mut c, 1, PositionChange::deposit(20 * GROTH_PER_COIN), 0).unwrap();
    call(&mut c, 2, PositionChange::deposit(5_000 * GROTH_PER_COIN), 0).unwrap();

    let a = call(&mut c, 1, PositionChange::withdraw(20 * GROTH_PER_COIN), 1_000).unwrap();
    let b = call(&mut c, 2, PositionChange::withdraw(5_000 * GROTH_PER_COIN), 1_000).unwrap();

    let pool = c.pool_state().unwrap();
    let emitted = c.engine().emission_so_far(&pool);
    assert_eq!(a.reward_credited + b.reward_credited, emitted);
    assert_eq!(pool.total_distributed, emitted);
    assert_eq!(pool.weight_total, 0);
    // The larger deposit earns more, but sub-linearly.
    assert!(b.reward_credited > a.reward_credited);
    assert!(b.reward_credited < 250 * a.reward_credited);
}
