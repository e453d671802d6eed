#![allow(dead_code)]

use draft_backend::db::txn_policy::{set_txn_policy, TxnPolicy};

#[ctor::ctor]
fn init_logging() {
    backend_test_support::logging::init();
}

// Every test builds its own in-memory database, so committing is the
// default; `DRAFT_TXN_POLICY=rollback` flips a whole binary.
#[ctor::ctor]
fn init_txn_policy() {
    let policy = match std::env::var("DRAFT_TXN_POLICY")
        .unwrap_or_default()
        .to_ascii_lowercase()
        .as_str()
    {
        "rollback" => TxnPolicy::RollbackOnOk,
        _ => TxnPolicy::CommitOnOk,
    };
    set_txn_policy(policy);
}
