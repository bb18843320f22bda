//! Instrument Bounded Context
//!
//! Symbol metadata and the conversion between strategy units and exchange
//! units (lots, price increments, bond quoting).

mod symbol_info;
mod translator;

pub use symbol_info::SymbolInfo;
pub use translator::{BOND_PRICE_FACTOR, PriceTranslator};
