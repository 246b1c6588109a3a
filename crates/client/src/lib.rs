// Copyright (C) 2026 Parity Technologies (UK) Ltd.
// SPDX-License-Identifier: GPL-3.0-or-later

pub mod cache;
pub mod codec;
pub mod consts;
pub mod context;
pub mod crypto;
pub mod extrinsic;
pub mod logging;
pub mod metadata;
pub mod rpc;
pub mod storage;
pub mod types;

pub use context::{Context, ContextError, SubmitError};
