// Copyright 2025, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/stylus-sdk-rs/blob/main/licenses/COPYRIGHT.md

//! Process-wide access to the running network.

use std::sync::{Arc, PoisonError, RwLock};

use crate::hardhat::Hardhat;

static HARDHAT: RwLock<Option<Arc<Hardhat>>> = RwLock::new(None);

/// The network installed by the most recent setup, if it has not been torn down.
pub fn hardhat() -> Option<Arc<Hardhat>> {
    HARDHAT
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
}

/// Replaces the installed network.
pub(crate) fn install(hardhat: Arc<Hardhat>) {
    *HARDHAT.write().unwrap_or_else(PoisonError::into_inner) = Some(hardhat);
}

/// Uninstalls `hardhat` unless another network has replaced it.
pub(crate) fn release(hardhat: &Arc<Hardhat>) {
    let mut slot = HARDHAT.write().unwrap_or_else(PoisonError::into_inner);
    if slot.as_ref().is_some_and(|installed| Arc::ptr_eq(installed, hardhat)) {
        *slot = None;
    }
}
