// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn second_init_is_refused() {
    let _ = init();
    assert!(init().is_err());
    tracing::warn!("diagnostics still flow after a refused init");
}
