// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
pub mod adapter;
pub mod auth;
pub mod broker_url;
pub mod cleanup;
pub mod commands;
pub mod config;
pub mod constants;
pub mod error;
pub mod poller;
pub mod transport;
pub mod types;

#[cfg(test)]
pub mod test_utils;
