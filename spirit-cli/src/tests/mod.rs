//! Shared test harness modules for the Spirit CLI.

use super::*;

mod helpers;
mod unit;
