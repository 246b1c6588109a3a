// Copyright (C) 2026 Parity Technologies (UK) Ltd.
// SPDX-License-Identifier: GPL-3.0-or-later

use clap::Parser;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to .env file (e.g., .env.westend)
    #[arg(short, long, default_value = ".env")]
    pub env_file: String,

    /// Pallet to query storage from (e.g., System)
    #[arg(short, long)]
    pub pallet: Option<String>,

    /// Storage item within the pallet (e.g., Number or Account)
    #[arg(short, long, requires = "pallet")]
    pub item: Option<String>,

    /// Map key for map storage items: 0x-prefixed hex, an SS58 address, a number
    /// or a JSON array/object for composite keys
    #[arg(short, long, requires = "item")]
    pub key: Option<String>,
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
