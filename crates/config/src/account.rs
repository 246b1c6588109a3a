// Copyright (C) 2026 Parity Technologies (UK) Ltd.
// SPDX-License-Identifier: GPL-3.0-or-later

/// Signing account settings.
///
/// The secret is not validated here: a malformed secret is reported when the
/// account is built and replaced by the development secret.
#[derive(Debug, Clone, Default)]
pub struct AccountConfig {
    /// 0x-prefixed 32-byte hex seed of the signing account
    ///
    /// Env: DOTS_ACCOUNT_SECRET
    /// Default: none (development account)
    pub secret: Option<String>,
}
